//! Generation job pipeline: parameters, command construction, the
//! one-job guard and supervised execution.

pub mod command;
pub mod params;
pub mod result;
pub mod runner;
pub mod slot;

pub use command::{CommandBuilder, CommandLine, ValidationError};
pub use params::{GenerationSettings, JobParameters};
pub use result::{JobOutcome, JobResult};
pub use runner::JobRunner;
pub use slot::{JobError, JobPermit, JobSlot};
