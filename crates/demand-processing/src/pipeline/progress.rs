//! Progress reporting for the processing pipeline.
//!
//! The pipeline runs synchronously; a reporter is simply told which stage
//! is starting or has finished so a caller can surface it.
//!
//! # Example
//!
//! ```rust,ignore
//! use demand_processing::ProcessingPipeline;
//!
//! let processed = ProcessingPipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(&df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the processing pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    /// Filling missing values
    Cleaning,
    /// Parsing the date column
    DateNormalization,
    /// Appending calendar columns
    FeatureDerivation,
    /// Detecting article and target columns
    RoleDetection,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl ProcessingStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cleaning => "Cleaning Data",
            Self::DateNormalization => "Normalizing Dates",
            Self::FeatureDerivation => "Deriving Calendar Features",
            Self::RoleDetection => "Detecting Columns",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Cleaning => 0.0,
            Self::DateNormalization => 0.4,
            Self::FeatureDerivation => 0.6,
            Self::RoleDetection => 0.8,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: ProcessingStage,
    /// Overall progress (0.0 - 1.0)
    pub progress: f32,
    pub message: String,
}

impl ProgressUpdate {
    /// A stage is starting.
    pub fn new(stage: ProcessingStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: stage.base_progress(),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(ProcessingStage::Complete, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(ProcessingStage::Failed, message)
    }
}

/// Receives progress updates from the pipeline.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_stage_progress_is_monotonic() {
        let stages = [
            ProcessingStage::Cleaning,
            ProcessingStage::DateNormalization,
            ProcessingStage::FeatureDerivation,
            ProcessingStage::RoleDetection,
            ProcessingStage::Complete,
        ];
        for pair in stages.windows(2) {
            assert!(pair[0].base_progress() < pair[1].base_progress());
        }
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Mutex::new(Vec::new());
        let reporter = ClosureProgressReporter::new(|update: ProgressUpdate| {
            seen.lock().unwrap().push(update.stage);
        });

        reporter.report(ProgressUpdate::new(ProcessingStage::Cleaning, "cleaning"));
        reporter.report(ProgressUpdate::complete("done"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ProcessingStage::Cleaning, ProcessingStage::Complete]
        );
    }

    #[test]
    fn test_update_serializes_stage_in_snake_case() {
        let json = serde_json::to_value(ProgressUpdate::new(
            ProcessingStage::DateNormalization,
            "dates",
        ))
        .unwrap();
        assert_eq!(json["stage"], "date_normalization");
    }
}
