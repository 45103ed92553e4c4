pub mod common;
pub mod completions;
pub mod conflicts;
pub mod operations;
pub mod queue;
pub mod status;
pub mod sync;
