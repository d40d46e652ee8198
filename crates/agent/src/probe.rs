//! GPU status probing.
//!
//! A [`StatusProbe`] runs one status query and returns its raw text
//! output. The output is never parsed; it is written as-is to the
//! telemetry log for display.
//!
//! [`CommandProbe`] shells out to a vendor tool (`rocm-smi` by default)
//! with a bounded wait. A query that outlives the bound is killed and
//! reported as [`ProbeError::Timeout`], which the sampler treats as
//! recoverable. Anything else (tool missing, spawn failure) is a
//! [`ProbeError::Failed`].

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// Default GPU status tool.
pub const DEFAULT_STATUS_TOOL: &str = "rocm-smi";

/// Default bound on a single status query.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Captured output of one status query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Why a status query produced no output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The query exceeded its time bound. Recoverable.
    #[error("status query timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The query could not run at all. Not retried.
    #[error("{0}")]
    Failed(String),
}

/// Source of GPU status text.
pub trait StatusProbe: Send + Sync {
    /// Name used in log notices (e.g. `rocm-smi`).
    fn name(&self) -> &str;

    /// Run one status query.
    fn probe(&self) -> impl Future<Output = Result<ProbeOutput, ProbeError>> + Send;
}

/// Runs an external status tool with no arguments.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    program: String,
    timeout: Duration,
}

impl Default for CommandProbe {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_TOOL, DEFAULT_PROBE_TIMEOUT)
    }
}

impl CommandProbe {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl StatusProbe for CommandProbe {
    fn name(&self) -> &str {
        &self.program
    }

    async fn probe(&self) -> Result<ProbeOutput, ProbeError> {
        let mut cmd = Command::new(&self.program);
        // `kill_on_drop` reaps the tool when the timeout drops the future.
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => {
                if !output.status.success() {
                    tracing::debug!(
                        tool = %self.program,
                        exit_code = output.status.code().unwrap_or(-1),
                        "Status tool exited non-zero",
                    );
                }
                Ok(ProbeOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            Ok(Err(e)) => Err(ProbeError::Failed(format!(
                "failed to execute {}: {e}",
                self.program
            ))),
            Err(_elapsed) => Err(ProbeError::Timeout(self.timeout)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use assert_matches::assert_matches;

    use super::*;

    /// Write an executable shell script into `dir`.
    fn write_tool(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-smi");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write tool");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod");
        path
    }

    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tool = write_tool(dir.path(), "echo 'GPU[0] 45.0c'; echo warn 1>&2");
        let probe = CommandProbe::new(tool.to_string_lossy(), Duration::from_secs(5));

        let out = probe.probe().await.expect("probe");
        assert_eq!(out.stdout, "GPU[0] 45.0c\n");
        assert_eq!(out.stderr, "warn\n");
    }

    #[tokio::test]
    async fn nonzero_exit_still_returns_output() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tool = write_tool(dir.path(), "echo partial; exit 3");
        let probe = CommandProbe::new(tool.to_string_lossy(), Duration::from_secs(5));

        let out = probe.probe().await.expect("probe");
        assert_eq!(out.stdout, "partial\n");
    }

    #[tokio::test]
    async fn slow_tool_times_out() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tool = write_tool(dir.path(), "sleep 30");
        let probe = CommandProbe::new(tool.to_string_lossy(), Duration::from_millis(200));

        assert_matches!(probe.probe().await, Err(ProbeError::Timeout(_)));
    }

    #[tokio::test]
    async fn missing_tool_fails() {
        let probe = CommandProbe::new("/nonexistent/status-tool", Duration::from_secs(1));
        assert_matches!(probe.probe().await, Err(ProbeError::Failed(_)));
        assert_eq!(probe.name(), "/nonexistent/status-tool");
    }
}
