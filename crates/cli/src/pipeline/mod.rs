//! Run orchestration: rig assembly, the main loop and teardown.

mod main_loop;
mod orchestrator;
mod stats;

pub use orchestrator::{Pipeline, PipelineConfig};
pub use stats::PipelineStats;
