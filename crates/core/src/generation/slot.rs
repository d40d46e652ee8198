//! One-job-at-a-time guard.
//!
//! Concurrent jobs would interleave their output in the shared generation
//! log, so launches are serialized through a [`JobSlot`]. Acquisition never
//! waits: a launch while another job holds the slot is rejected.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Errors raised when a job cannot be launched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    #[error("A video generation job is already running")]
    AlreadyRunning,
}

/// Non-reentrant launch guard shared by the session.
#[derive(Debug, Clone, Default)]
pub struct JobSlot {
    inner: Arc<Mutex<()>>,
}

/// Held for the duration of one job; releases the slot on drop.
#[derive(Debug)]
pub struct JobPermit {
    _guard: OwnedMutexGuard<()>,
}

impl JobSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot, or fail immediately if a job is in flight.
    pub fn try_acquire(&self) -> Result<JobPermit, JobError> {
        Arc::clone(&self.inner)
            .try_lock_owned()
            .map(|guard| JobPermit { _guard: guard })
            .map_err(|_| JobError::AlreadyRunning)
    }

    /// Whether a job currently holds the slot.
    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn second_acquire_is_rejected_while_held() {
        let slot = JobSlot::new();
        let permit = slot.try_acquire().expect("first acquire");
        assert!(slot.is_busy());
        assert_matches!(slot.try_acquire(), Err(JobError::AlreadyRunning));

        // Clones share the same slot.
        assert_matches!(slot.clone().try_acquire(), Err(JobError::AlreadyRunning));

        drop(permit);
        assert!(!slot.is_busy());
        assert!(slot.try_acquire().is_ok());
    }
}
