pub mod generation;
pub mod logs;
pub mod selection;
