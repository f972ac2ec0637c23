//! demand-learning: random-forest demand forecasting.
//!
//! This crate fits a random forest on the calendar features of a processed
//! demand table, predicts the following days, and writes the result as a
//! spreadsheet report.
//!
//! # Features
//!
//! - **Forecast Engine**: article filtering, date normalization, calendar
//!   features and a seeded random forest (100 trees, depth 10 by default)
//! - **Random Forest**: bootstrap-bagged regression trees with the
//!   squared-error criterion, written in plain Rust on `ndarray`
//! - **Report Export**: two-sheet `.xlsx` workbook with historical and
//!   predicted demand plus a run summary
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use demand_learning::{ArticleFilter, ForecastConfig, ForecastEngine, ReportExporter};
//! use demand_processing::{TableLoader, auto_process};
//!
//! let df = TableLoader::default().load("ventas.csv", &bytes)?;
//! let processed = auto_process(&df)?;
//!
//! let config = ForecastConfig::default();
//! let horizon = config.check_horizon(30)?;
//!
//! let article = processed.roles.article.as_ref().map(|a| a.column.as_str());
//! let result = ForecastEngine::new(config).forecast(
//!     &processed.data,
//!     article,
//!     &ArticleFilter::from_roster_entry("Huevos"),
//!     horizon,
//! )?;
//!
//! let bytes = ReportExporter::default().export(&result)?;
//! std::fs::write(demand_learning::DEFAULT_REPORT_NAME, bytes)?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  processed DataFrame                                         │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  ForecastEngine ──► RandomForestRegressor ──► ForecastResult │
//! │                                                   │          │
//! │                                                   ▼          │
//! │                                  ReportExporter ──► .xlsx    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod forecast;
pub mod forest;
pub mod types;

// Re-export main types at crate root for convenience
pub use config::{ForecastConfig, ForecastConfigBuilder};
pub use error::{LearningError, Result};
pub use export::{
    DEFAULT_REPORT_NAME, ReportExporter, ReportRow, XLSX_MIME_TYPE, read_forecast_sheet,
    read_summary_sheet,
};
pub use forecast::{FEATURE_COLUMNS, ForecastEngine};
pub use forest::{DecisionTreeRegressor, ForestError, RandomForestRegressor};
pub use types::{ArticleFilter, ForecastPoint, ForecastResult, PointKind};
