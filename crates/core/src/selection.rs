//! Reference-image selection state.
//!
//! [`SelectionStore`] is the single source of truth for which images a
//! generation job will use. It reconciles three input sources (the
//! pre-selected defaults, catalog clicks and uploads) into one ordered,
//! duplicate-free sequence. Every mutation returns the full updated
//! sequence so callers can re-render from one consistent snapshot.

use indexmap::IndexSet;

use crate::types::ImageReference;

/// Ordered set of selected image references.
///
/// Insertion order is preserved; the external generator associates
/// reference images positionally.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    entries: IndexSet<ImageReference>,
}

impl SelectionStore {
    /// Create a store seeded with `defaults`, dropping repeated entries.
    pub fn with_defaults(defaults: impl IntoIterator<Item = ImageReference>) -> Self {
        Self {
            entries: defaults.into_iter().collect(),
        }
    }

    /// Remove `reference` if selected, otherwise append it.
    ///
    /// Removal keeps the relative order of the remaining entries.
    pub fn toggle(&mut self, reference: ImageReference) -> Vec<ImageReference> {
        if !self.entries.shift_remove(&reference) {
            self.entries.insert(reference);
        }
        self.snapshot()
    }

    /// Remove the entry at `position`.
    ///
    /// An out-of-range position is ignored: the index may come from a view
    /// rendered before a concurrent mutation.
    pub fn remove_at(&mut self, position: usize) -> Vec<ImageReference> {
        if position < self.entries.len() {
            self.entries.shift_remove_index(position);
        } else {
            tracing::debug!(
                position,
                len = self.entries.len(),
                "Ignoring stale selection index"
            );
        }
        self.snapshot()
    }

    /// Append every reference in `references` that is not yet selected.
    pub fn add_unique(
        &mut self,
        references: impl IntoIterator<Item = ImageReference>,
    ) -> Vec<ImageReference> {
        for reference in references {
            self.entries.insert(reference);
        }
        self.snapshot()
    }

    /// Owned copy of the current ordered selection.
    pub fn snapshot(&self) -> Vec<ImageReference> {
        self.entries.iter().cloned().collect()
    }

    pub fn contains(&self, reference: &ImageReference) -> bool {
        self.entries.contains(reference)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
