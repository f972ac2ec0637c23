//! Pipeline module.
//!
//! This module chains the processing stages and reports their progress.

mod builder;
pub mod progress;

pub use builder::{ProcessingPipeline, ProcessingPipelineBuilder, auto_process};
pub use progress::{ClosureProgressReporter, ProcessingStage, ProgressReporter, ProgressUpdate};
