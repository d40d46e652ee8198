//! Domain logic for the Phantom generation studio.
//!
//! Pure selection state, command construction, artifact discovery and
//! supervised job execution. No HTTP concerns live here.

pub mod artifact;
pub mod catalog;
pub mod error;
pub mod generation;
pub mod logs;
pub mod selection;
pub mod types;
