//! Job parameters supplied by the operator form.

use serde::{Deserialize, Serialize};

use crate::types::ImageReference;

/// Prompt pre-filled in the operator form.
pub const DEFAULT_PROMPT: &str = "A cartoon old grandfather wearing a yellow hat, a yellow top and \
brown suspenders is holding a blue steaming coffee cup in a fresh cartoon-style cafe decorated \
with pink and blue tables and chairs, colorful chandeliers and colorful balls. The picture style \
is cartoony and fresh.";

pub const DEFAULT_WIDTH: i64 = 832;
pub const DEFAULT_HEIGHT: i64 = 480;
pub const DEFAULT_FRAMES: i64 = 121;
pub const DEFAULT_FPS: i64 = 24;
pub const DEFAULT_CKPT_DIR: &str = "./Wan2.1-T2V-1.3B";
pub const DEFAULT_PHANTOM_CKPT: &str = "./Phantom-Wan-Models";
pub const DEFAULT_ULYSSES_SIZE: i64 = 8;
pub const DEFAULT_RING_SIZE: i64 = 1;
pub const DEFAULT_NUM_GPUS: i64 = 8;

/// Form values for one generation, excluding the reference images.
///
/// Numeric fields are signed so that out-of-range operator input reaches
/// validation instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub prompt: String,
    pub width: i64,
    pub height: i64,
    pub frames: i64,
    pub fps: i64,
    /// Base model checkpoint directory (existence is not checked).
    pub ckpt_dir: String,
    /// Phantom checkpoint directory (existence is not checked).
    pub phantom_ckpt: String,
    pub ulysses_size: i64,
    pub ring_size: i64,
    pub num_gpus: i64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            frames: DEFAULT_FRAMES,
            fps: DEFAULT_FPS,
            ckpt_dir: DEFAULT_CKPT_DIR.to_string(),
            phantom_ckpt: DEFAULT_PHANTOM_CKPT.to_string(),
            ulysses_size: DEFAULT_ULYSSES_SIZE,
            ring_size: DEFAULT_RING_SIZE,
            num_gpus: DEFAULT_NUM_GPUS,
        }
    }
}

/// Everything needed to build one generation command.
///
/// `references` is a snapshot of the selection taken at launch time; later
/// selection changes do not affect a job already being built.
#[derive(Debug, Clone, PartialEq)]
pub struct JobParameters {
    pub settings: GenerationSettings,
    pub references: Vec<ImageReference>,
}

impl JobParameters {
    pub fn new(settings: GenerationSettings, references: Vec<ImageReference>) -> Self {
        Self {
            settings,
            references,
        }
    }
}
