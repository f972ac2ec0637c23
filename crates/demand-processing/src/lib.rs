//! Demand Table Processing Library
//!
//! Loading, cleaning and calendar enrichment of historical demand tables,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! This library turns an uploaded spreadsheet into a table ready for
//! forecasting:
//!
//! - **Loading**: CSV (Polars reader) and Excel workbooks (calamine)
//! - **Cleaning**: median / mode imputation below fixed missing-value thresholds
//! - **Date Normalization**: the date column is parsed into a `Date` column
//! - **Calendar Features**: year, month, day, ISO week, weekday, weekday name
//!   and weekend flag appended as system columns
//! - **Role Detection**: article column (ordered strategies) and demand column
//! - **Summaries**: column groups, demand statistics, per-article aggregates
//!   and monthly trend
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use demand_processing::{ProcessingPipeline, TableLoader};
//!
//! let bytes = std::fs::read("ventas.csv")?;
//! let df = TableLoader::default().load("ventas.csv", &bytes)?;
//!
//! let processed = ProcessingPipeline::builder().build()?.process(&df)?;
//!
//! println!("Articles: {:?}", processed.roles.roster.entries());
//! println!("Steps: {:?}", processed.processing_steps());
//! ```
//!
//! # Configuration
//!
//! Use [`ProcessingConfig`] to change column names, thresholds or locales:
//!
//! ```rust,ignore
//! use demand_processing::config::*;
//!
//! let config = ProcessingConfig::builder()
//!     .date_column("date")
//!     .target_column("units")
//!     .numeric_fill_threshold(0.2)
//!     .date_order(DateOrder::MonthFirst)
//!     .weekday_language(WeekdayLanguage::English)
//!     .build()?;
//! ```

pub mod calendar;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod roles;
pub mod summary;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use calendar::{
    CalendarFeatureDeriver, CalendarFeatures, DateColumnStatus, DateNormalizer, SYSTEM_COLUMNS,
    is_system_column,
};
pub use cleaner::DataCleaner;
pub use config::{
    ConfigValidationError, DateOrder, ProcessingConfig, ProcessingConfigBuilder, WeekdayLanguage,
};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use loader::{FileFormat, TableLoader};
pub use pipeline::{
    ClosureProgressReporter, ProcessingPipeline, ProcessingPipelineBuilder, ProcessingStage,
    ProgressReporter, ProgressUpdate, auto_process,
};
pub use roles::{
    ALL_ARTICLES, ArticleDetection, ArticleRoster, ColumnRoleDetector, ColumnRoles,
    DetectionStrategy,
};
pub use summary::{DatasetSummary, ExploratoryStats, TablePreview};
pub use types::{CleaningReport, ImputationAction, MissingValuePolicy, ProcessedTable};
