//! Main processing pipeline.
//!
//! This module provides the `ProcessingPipeline` struct and its builder,
//! which chain the cleaning, date normalization, calendar derivation and
//! role detection stages.

use std::sync::Arc;
use std::time::Instant;

use polars::prelude::*;
use tracing::{error, info};

use crate::calendar::{CalendarFeatureDeriver, DateNormalizer};
use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, ProcessingConfig};
use crate::error::Result;
use crate::pipeline::progress::{
    ClosureProgressReporter, ProcessingStage, ProgressReporter, ProgressUpdate,
};
use crate::roles::ColumnRoleDetector;
use crate::types::ProcessedTable;

/// The processing pipeline.
///
/// Use [`ProcessingPipeline::builder()`] to create one with a custom
/// configuration.
///
/// # Example
///
/// ```rust,ignore
/// use demand_processing::{ProcessingConfig, ProcessingPipeline};
///
/// let processed = ProcessingPipeline::builder()
///     .config(ProcessingConfig::builder().date_column("date").build()?)
///     .build()?
///     .process(&df)?;
///
/// println!("Article column: {:?}", processed.roles.article);
/// ```
pub struct ProcessingPipeline {
    config: ProcessingConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
    normalizer: DateNormalizer,
    deriver: CalendarFeatureDeriver,
    detector: ColumnRoleDetector,
}

impl Default for ProcessingPipeline {
    fn default() -> Self {
        Self::from_config(ProcessingConfig::default(), None)
    }
}

impl ProcessingPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> ProcessingPipelineBuilder {
        ProcessingPipelineBuilder::default()
    }

    fn from_config(
        config: ProcessingConfig,
        progress_reporter: Option<Arc<dyn ProgressReporter>>,
    ) -> Self {
        Self {
            cleaner: DataCleaner::new(&config),
            normalizer: DateNormalizer::new(&config),
            deriver: CalendarFeatureDeriver::new(&config),
            detector: ColumnRoleDetector::new(&config),
            config,
            progress_reporter,
        }
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Run every stage over `df`.
    ///
    /// The input frame is left untouched. Running the pipeline again over
    /// `processed.data` gives back the same table.
    pub fn process(&self, df: &DataFrame) -> Result<ProcessedTable> {
        match self.process_internal(df) {
            Ok(processed) => {
                self.report_progress(ProgressUpdate::complete("Processing completed"));
                Ok(processed)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Processing error: {}", e);
                Err(e)
            }
        }
    }

    fn process_internal(&self, df: &DataFrame) -> Result<ProcessedTable> {
        let start = Instant::now();
        info!(
            "Processing table with {} rows and {} columns",
            df.height(),
            df.width()
        );

        self.report_progress(ProgressUpdate::new(
            ProcessingStage::Cleaning,
            "Filling missing values",
        ));
        let (cleaned, cleaning) = self.cleaner.clean(df)?;

        self.report_progress(ProgressUpdate::new(
            ProcessingStage::DateNormalization,
            format!("Normalizing date column '{}'", self.normalizer.column()),
        ));
        let (normalized, date_status) = self.normalizer.normalize(&cleaned)?;

        self.report_progress(ProgressUpdate::new(
            ProcessingStage::FeatureDerivation,
            "Deriving calendar columns",
        ));
        let (data, calendar_features) = match self.deriver.derive(&normalized)? {
            Some(enriched) => (enriched, true),
            None => (normalized, false),
        };

        self.report_progress(ProgressUpdate::new(
            ProcessingStage::RoleDetection,
            "Detecting article and target columns",
        ));
        let roles = self.detector.detect(&data)?;

        info!(
            "Processing finished in {:?}: {} column(s) filled, calendar features: {}",
            start.elapsed(),
            cleaning.filled_columns().len(),
            calendar_features
        );

        Ok(ProcessedTable {
            data,
            cleaning,
            date_status,
            calendar_features,
            roles,
        })
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Run the default pipeline over `df`.
pub fn auto_process(df: &DataFrame) -> Result<ProcessedTable> {
    ProcessingPipeline::default().process(df)
}

/// Builder for [`ProcessingPipeline`].
#[derive(Default)]
pub struct ProcessingPipelineBuilder {
    config: Option<ProcessingConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl ProcessingPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: ProcessingConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<ProcessingPipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(ProcessingPipeline::from_config(config, self.progress_reporter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{COL_WEEKDAY, DateColumnStatus, SYSTEM_COLUMNS};
    use crate::roles::DetectionStrategy;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn sales_frame() -> DataFrame {
        let n = 40;
        let fecha: Vec<String> = (0..n).map(|i| format!("{:02}/03/2024", i % 28 + 1)).collect();
        let producto: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "pan" } else { "leche" }).collect();
        let demanda: Vec<Option<f64>> = (0..n)
            .map(|i| if i == 3 { None } else { Some(10.0 + i as f64) })
            .collect();
        df!["fecha" => fecha, "producto" => producto, "demanda" => demanda].unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = ProcessingPipeline::builder().build().unwrap();
        assert_eq!(pipeline.config(), &ProcessingConfig::default());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let mut config = ProcessingConfig::default();
        config.numeric_fill_threshold = 2.0;
        assert!(ProcessingPipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_process_runs_every_stage() {
        let df = sales_frame();
        let processed = auto_process(&df).unwrap();

        // 1 of 40 missing = 2.5%
        assert_eq!(processed.cleaning.filled_columns(), vec!["demanda"]);
        assert_eq!(
            processed.date_status,
            DateColumnStatus::Parsed {
                parsed: 40,
                failed: 0
            }
        );
        assert!(processed.calendar_features);
        assert_eq!(processed.data.width(), 3 + SYSTEM_COLUMNS.len());
        assert_eq!(processed.data.column("fecha").unwrap().dtype(), &DataType::Date);
        assert_eq!(
            processed.roles.article.as_ref().map(|a| a.strategy),
            Some(DetectionStrategy::ExactName)
        );
        assert_eq!(processed.roles.roster.entries(), &["All", "pan", "leche"]);
        assert_eq!(processed.processing_steps().len(), 3);

        // caller's frame untouched
        assert_eq!(df.column("demanda").unwrap().null_count(), 1);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_process_is_idempotent() {
        let once = auto_process(&sales_frame()).unwrap();
        let twice = auto_process(&once.data).unwrap();

        assert!(once.data.equals_missing(&twice.data));
        assert_eq!(twice.date_status, DateColumnStatus::AlreadyTyped);
        assert!(twice.cleaning.filled_columns().is_empty());
        assert_eq!(once.roles, twice.roles);
    }

    #[test]
    fn test_process_without_date_column() {
        let df = df!["producto" => ["pan", "leche"], "demanda" => [1.0, 2.0]].unwrap();
        let processed = auto_process(&df).unwrap();

        assert_eq!(processed.date_status, DateColumnStatus::Missing);
        assert!(!processed.calendar_features);
        assert!(processed.data.column(COL_WEEKDAY).is_err());
        assert!(processed.summary().system_columns.is_empty());
    }

    #[test]
    fn test_progress_updates_follow_stage_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stages);

        ProcessingPipeline::builder()
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap()
            .process(&sales_frame())
            .unwrap();

        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                ProcessingStage::Cleaning,
                ProcessingStage::DateNormalization,
                ProcessingStage::FeatureDerivation,
                ProcessingStage::RoleDetection,
                ProcessingStage::Complete,
            ]
        );
    }
}
