//! Terminal outcome of one generation job.

use std::path::PathBuf;

use serde::Serialize;

use crate::types::Timestamp;

/// Status glyph for a successful run.
pub const GLYPH_SUCCESS: &str = "✅";
/// Status glyph for a run that succeeded without a discoverable artifact.
pub const GLYPH_WARNING: &str = "⚠️";
/// Status glyph for failures and rejected launches.
pub const GLYPH_FAILURE: &str = "❌";

/// How a job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    /// Exit code 0 and an artifact was found.
    Success,
    /// Non-zero exit, or the process could not be started or awaited.
    Failure,
    /// Exit code 0 but no artifact was found.
    NoOutput,
}

/// Result surfaced to the presentation layer. Never mutated after
/// construction.
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub outcome: JobOutcome,
    /// Operator-facing status, prefixed with a status glyph.
    pub message: String,
    pub artifact_path: Option<PathBuf>,
    /// Child exit code, `-1` if terminated by a signal, `None` if the
    /// child never ran to completion.
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    pub finished_at: Timestamp,
}

impl JobResult {
    pub fn success(artifact: PathBuf, duration_ms: u64) -> Self {
        Self {
            outcome: JobOutcome::Success,
            message: format!(
                "{GLYPH_SUCCESS} Video generation completed successfully!\n📹 Generated video: {}",
                artifact.display()
            ),
            artifact_path: Some(artifact),
            exit_code: Some(0),
            duration_ms,
            finished_at: chrono::Utc::now(),
        }
    }

    pub fn no_output(duration_ms: u64) -> Self {
        Self {
            outcome: JobOutcome::NoOutput,
            message: format!(
                "{GLYPH_WARNING} No video files found. Please check the output directory manually."
            ),
            artifact_path: None,
            exit_code: Some(0),
            duration_ms,
            finished_at: chrono::Utc::now(),
        }
    }

    pub fn exit_failure(exit_code: i32, duration_ms: u64) -> Self {
        Self {
            outcome: JobOutcome::Failure,
            message: format!(
                "{GLYPH_FAILURE} Video generation failed with return code: {exit_code}"
            ),
            artifact_path: None,
            exit_code: Some(exit_code),
            duration_ms,
            finished_at: chrono::Utc::now(),
        }
    }

    pub fn launch_fault(description: &str, duration_ms: u64) -> Self {
        Self {
            outcome: JobOutcome::Failure,
            message: format!("{GLYPH_FAILURE} Error running command: {description}"),
            artifact_path: None,
            exit_code: None,
            duration_ms,
            finished_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_glyphs() {
        assert!(JobResult::success(PathBuf::from("out.mp4"), 1)
            .message
            .starts_with(GLYPH_SUCCESS));
        assert!(JobResult::no_output(1).message.starts_with(GLYPH_WARNING));
        assert!(JobResult::exit_failure(3, 1).message.starts_with(GLYPH_FAILURE));
        assert!(JobResult::launch_fault("boom", 1).message.starts_with(GLYPH_FAILURE));
    }

    #[test]
    fn serializes_outcome_as_snake_case() {
        let json = serde_json::to_value(JobResult::no_output(5)).expect("serialize");
        assert_eq!(json["outcome"], "no_output");
        assert!(json["artifact_path"].is_null());
        assert_eq!(json["exit_code"], 0);
    }

    #[test]
    fn success_message_names_artifact() {
        let r = JobResult::success(PathBuf::from("outputs/clip.mp4"), 10);
        assert!(r.message.contains("outputs/clip.mp4"));
        assert_eq!(r.outcome, JobOutcome::Success);
    }
}
