//! Supervised execution of a generation command.
//!
//! [`JobRunner::run`] starts the generator as a child process, streams its
//! interleaved stdout/stderr into the append-only generation log, waits for
//! it to exit and classifies the outcome into a [`JobResult`]. Every fault
//! is contained: the call always returns a result and never panics.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::artifact::ArtifactResolver;
use crate::generation::command::CommandLine;
use crate::generation::result::JobResult;
use crate::logs;

/// Runs generation commands and reports their outcome.
pub struct JobRunner {
    working_dir: PathBuf,
    log_path: PathBuf,
    resolver: Arc<dyn ArtifactResolver>,
}

impl JobRunner {
    /// Create a runner that executes in `working_dir` and logs to `log_path`.
    pub fn new(
        working_dir: impl Into<PathBuf>,
        log_path: impl Into<PathBuf>,
        resolver: Arc<dyn ArtifactResolver>,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            log_path: log_path.into(),
            resolver,
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Execute `cmd` to completion and classify the outcome.
    ///
    /// No timeout is applied; the call returns only when the child exits.
    pub async fn run(&self, cmd: &CommandLine) -> JobResult {
        let start = Instant::now();
        tracing::info!(program = %cmd.program, working_dir = %self.working_dir.display(), "Starting generation job");

        match self.execute(cmd, start).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Generation job could not be run");
                if let Err(log_err) =
                    logs::append(&self.log_path, &format!("Error running command: {e}\n")).await
                {
                    tracing::warn!(error = %log_err, "Failed to record error in generation log");
                }
                JobResult::launch_fault(&e.to_string(), elapsed_ms(start))
            }
        }
    }

    async fn execute(&self, cmd: &CommandLine, start: Instant) -> io::Result<JobResult> {
        let status = {
            // The log handle lives only for the duration of the child so it
            // is closed on every path out of this block.
            let mut log = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_path)
                .await?;
            log.write_all(format!("Starting video generation...\nCommand: {cmd}\n").as_bytes())
                .await?;
            log.flush().await?;

            let log = log.into_std().await;
            let stdout = log.try_clone()?;
            let stderr = log.try_clone()?;

            let mut child = cmd
                .to_command(&self.working_dir)
                .stdin(Stdio::null())
                .stdout(Stdio::from(stdout))
                .stderr(Stdio::from(stderr))
                .spawn()?;

            tracing::debug!(pid = child.id(), "Generation process spawned");
            child.wait().await?
        };

        let exit_code = status.code().unwrap_or(-1);
        let duration_ms = elapsed_ms(start);

        if exit_code != 0 {
            logs::append(
                &self.log_path,
                &format!("\nVideo generation failed with return code: {exit_code}\n"),
            )
            .await?;
            tracing::warn!(exit_code, duration_ms, "Generation process failed");
            return Ok(JobResult::exit_failure(exit_code, duration_ms));
        }

        logs::append(&self.log_path, "\nVideo generation completed!\n").await?;

        // The lookup walks directories with blocking calls.
        let resolver = Arc::clone(&self.resolver);
        let artifact = tokio::task::spawn_blocking(move || resolver.resolve())
            .await
            .map_err(io::Error::other)?;

        match artifact {
            Some(artifact) => {
                logs::append(
                    &self.log_path,
                    &format!("Generated video: {}\n", artifact.display()),
                )
                .await?;
                tracing::info!(artifact = %artifact.display(), duration_ms, "Generation succeeded");
                Ok(JobResult::success(artifact, duration_ms))
            }
            None => {
                logs::append(
                    &self.log_path,
                    "No video files found. Please check the output directory manually.\n",
                )
                .await?;
                tracing::warn!(duration_ms, "Generation finished without a discoverable artifact");
                Ok(JobResult::no_output(duration_ms))
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
