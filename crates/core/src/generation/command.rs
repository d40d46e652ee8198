//! Generation command construction.
//!
//! [`CommandBuilder::build`] validates [`JobParameters`] and maps them onto
//! the argument vector of the external generator. Building is pure: no
//! process is started and no file is touched.

use std::fmt;
use std::path::Path;

use crate::error::CoreError;
use crate::generation::params::JobParameters;

/// Default distributed launcher executable.
pub const DEFAULT_LAUNCHER: &str = "torchrun";

/// Default generator entry script passed to the launcher.
pub const DEFAULT_GENERATE_SCRIPT: &str = "generate.py";

/// Default generator task identifier.
pub const DEFAULT_TASK: &str = "s2v-14B";

/// First violated rule of a [`JobParameters`] set.
///
/// The display text is the operator-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a prompt!")]
    BlankPrompt,

    #[error("Please select at least one reference image!")]
    NoReferences,

    #[error("Width and height must be positive!")]
    NonPositiveSize,

    #[error("Frames and FPS must be positive!")]
    NonPositiveTiming,

    #[error("Parallelism sizes and GPU count must be positive!")]
    NonPositiveParallelism,
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

/// A fully expanded external command: program plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Value following `flag` in the argument list, if present.
    pub fn arg_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Build a [`tokio::process::Command`] running in `working_dir`.
    ///
    /// Stdio is left to the caller.
    pub fn to_command(&self, working_dir: &Path) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args).current_dir(working_dir);
        cmd
    }
}

/// Space-joined rendering used for the audit line in the generation log.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Maps job parameters onto the generator's command line.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    launcher: String,
    script: String,
    task: String,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LAUNCHER, DEFAULT_GENERATE_SCRIPT, DEFAULT_TASK)
    }
}

impl CommandBuilder {
    pub fn new(
        launcher: impl Into<String>,
        script: impl Into<String>,
        task: impl Into<String>,
    ) -> Self {
        Self {
            launcher: launcher.into(),
            script: script.into(),
            task: task.into(),
        }
    }

    /// Check the rules in order and return the first violation.
    pub fn validate(params: &JobParameters) -> Result<(), ValidationError> {
        let s = &params.settings;

        if s.prompt.trim().is_empty() {
            return Err(ValidationError::BlankPrompt);
        }
        if params.references.is_empty() {
            return Err(ValidationError::NoReferences);
        }
        if s.width <= 0 || s.height <= 0 {
            return Err(ValidationError::NonPositiveSize);
        }
        if s.frames <= 0 || s.fps <= 0 {
            return Err(ValidationError::NonPositiveTiming);
        }
        if s.ulysses_size <= 0 || s.ring_size <= 0 || s.num_gpus <= 0 {
            return Err(ValidationError::NonPositiveParallelism);
        }
        Ok(())
    }

    /// Validate `params` and build the generator command line.
    ///
    /// Parallelism values are passed through unchanged; whether their
    /// product matches the device topology is the generator's concern.
    pub fn build(&self, params: &JobParameters) -> Result<CommandLine, ValidationError> {
        Self::validate(params)?;

        let s = &params.settings;
        let references = params
            .references
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let args = vec![
            format!("--nproc_per_node={}", s.num_gpus),
            self.script.clone(),
            "--task".to_string(),
            self.task.clone(),
            "--size".to_string(),
            format!("{}*{}", s.width, s.height),
            "--frame_num".to_string(),
            s.frames.to_string(),
            "--sample_fps".to_string(),
            s.fps.to_string(),
            "--ckpt_dir".to_string(),
            s.ckpt_dir.clone(),
            "--phantom_ckpt".to_string(),
            s.phantom_ckpt.clone(),
            "--ref_image".to_string(),
            references,
            "--dit_fsdp".to_string(),
            "--t5_fsdp".to_string(),
            "--ulysses_size".to_string(),
            s.ulysses_size.to_string(),
            "--ring_size".to_string(),
            s.ring_size.to_string(),
            "--prompt".to_string(),
            s.prompt.clone(),
        ];

        Ok(CommandLine::new(self.launcher.clone(), args))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::generation::params::GenerationSettings;
    use crate::types::ImageReference;

    fn refs(items: &[&str]) -> Vec<ImageReference> {
        items
            .iter()
            .map(|s| ImageReference::new(*s).expect("valid"))
            .collect()
    }

    fn valid_params() -> JobParameters {
        JobParameters::new(
            GenerationSettings::default(),
            refs(&["examples/ref14.png", "examples/ref15.png", "/tmp/up.png"]),
        )
    }

    #[test]
    fn rejects_blank_prompt_first() {
        let mut p = valid_params();
        p.settings.prompt = "   \n".to_string();
        p.references.clear();
        p.settings.width = 0;
        assert_matches!(CommandBuilder::default().build(&p), Err(ValidationError::BlankPrompt));
    }

    #[test]
    fn rejects_empty_references() {
        let mut p = valid_params();
        p.references.clear();
        p.settings.frames = -1;
        assert_matches!(CommandBuilder::default().build(&p), Err(ValidationError::NoReferences));
    }

    #[test]
    fn rejects_non_positive_size() {
        for (w, h) in [(0, 480), (832, 0), (-5, 480)] {
            let mut p = valid_params();
            p.settings.width = w;
            p.settings.height = h;
            p.settings.fps = 0;
            assert_matches!(
                CommandBuilder::default().build(&p),
                Err(ValidationError::NonPositiveSize)
            );
        }
    }

    #[test]
    fn rejects_non_positive_timing() {
        for (frames, fps) in [(0, 24), (121, 0), (121, -24)] {
            let mut p = valid_params();
            p.settings.frames = frames;
            p.settings.fps = fps;
            assert_matches!(
                CommandBuilder::default().build(&p),
                Err(ValidationError::NonPositiveTiming)
            );
        }
    }

    #[test]
    fn rejects_non_positive_parallelism() {
        let mut p = valid_params();
        p.settings.num_gpus = 0;
        assert_matches!(
            CommandBuilder::default().build(&p),
            Err(ValidationError::NonPositiveParallelism)
        );
    }

    #[test]
    fn validation_reasons_are_distinct() {
        let reasons = [
            ValidationError::BlankPrompt,
            ValidationError::NoReferences,
            ValidationError::NonPositiveSize,
            ValidationError::NonPositiveTiming,
            ValidationError::NonPositiveParallelism,
        ]
        .map(|e| e.to_string());
        let mut unique = reasons.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), reasons.len());
    }

    #[test]
    fn builds_full_argument_vector() {
        let cmd = CommandBuilder::default().build(&valid_params()).expect("valid");
        assert_eq!(cmd.program, "torchrun");
        assert_eq!(cmd.args[0], "--nproc_per_node=8");
        assert_eq!(cmd.args[1], "generate.py");
        assert_eq!(cmd.arg_value("--task"), Some("s2v-14B"));
        assert_eq!(cmd.arg_value("--frame_num"), Some("121"));
        assert_eq!(cmd.arg_value("--sample_fps"), Some("24"));
        assert_eq!(cmd.arg_value("--ckpt_dir"), Some("./Wan2.1-T2V-1.3B"));
        assert_eq!(cmd.arg_value("--phantom_ckpt"), Some("./Phantom-Wan-Models"));
        assert_eq!(cmd.arg_value("--ulysses_size"), Some("8"));
        assert_eq!(cmd.arg_value("--ring_size"), Some("1"));
        assert!(cmd.args.contains(&"--dit_fsdp".to_string()));
        assert!(cmd.args.contains(&"--t5_fsdp".to_string()));
        assert_eq!(cmd.args.last().map(String::as_str), Some(crate::generation::params::DEFAULT_PROMPT));
    }

    #[test]
    fn size_token_is_width_star_height() {
        let mut p = valid_params();
        p.settings.width = 832;
        p.settings.height = 480;
        let cmd = CommandBuilder::default().build(&p).expect("valid");
        assert_eq!(cmd.arg_value("--size"), Some("832*480"));
    }

    #[test]
    fn references_are_comma_joined_in_order() {
        let mut p = valid_params();
        p.references = refs(&["c.png", "a.png", "b.png"]);
        let cmd = CommandBuilder::default().build(&p).expect("valid");
        assert_eq!(cmd.arg_value("--ref_image"), Some("c.png,a.png,b.png"));
    }

    #[test]
    fn prompt_is_passed_verbatim_as_one_argument() {
        let mut p = valid_params();
        p.settings.prompt = "a \"quoted\" prompt; with $shell chars".to_string();
        let cmd = CommandBuilder::default().build(&p).expect("valid");
        assert_eq!(
            cmd.arg_value("--prompt"),
            Some("a \"quoted\" prompt; with $shell chars")
        );
    }

    #[test]
    fn custom_launcher_script_and_task() {
        let builder = CommandBuilder::new("python3", "gen.py", "t2v-1.3B");
        let cmd = builder.build(&valid_params()).expect("valid");
        assert_eq!(cmd.program, "python3");
        assert_eq!(cmd.args[1], "gen.py");
        assert_eq!(cmd.arg_value("--task"), Some("t2v-1.3B"));
    }

    #[test]
    fn display_joins_with_spaces() {
        let cmd = CommandLine::new("echo", vec!["a".into(), "b c".into()]);
        assert_eq!(cmd.to_string(), "echo a b c");
    }
}
