//! Error types for the demand-learning crate.
//!
//! This module defines [`LearningError`], the error type returned by the
//! forecast engine and the report exporter.
//!
//! # Error Handling
//!
//! Precondition failures (empty table, missing columns, too few rows) get
//! their own variants so a caller can tell the user what to fix. Anything
//! that goes wrong while fitting or predicting is reported as
//! [`LearningError::Forecast`] with the underlying cause; no partial result is
//! ever returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use demand_learning::{ArticleFilter, ForecastEngine, LearningError};
//!
//! match ForecastEngine::default().forecast(&df, Some("producto"), &ArticleFilter::All, 30) {
//!     Ok(result) => println!("{} predictions", result.forecast.len()),
//!     Err(LearningError::InsufficientData { available, required }) => {
//!         println!("Need {required} rows, only {available} available")
//!     }
//!     Err(e) => println!("Error: {e}"),
//! }
//! ```

use demand_processing::ProcessingError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::forest::ForestError;

/// The main error type for demand-learning operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// The table handed to the engine has no rows.
    #[error("The table is empty")]
    EmptyTable,

    /// A column the forecast needs is not in the table.
    ///
    /// Column names are case-sensitive.
    #[error("Column '{0}' not found")]
    MissingColumn(String),

    /// Fewer usable rows than the model needs.
    #[error("Insufficient data: {available} row(s) available, at least {required} required")]
    InsufficientData {
        /// Rows left after filtering.
        available: usize,
        /// Minimum row count.
        required: usize,
    },

    /// Fitting or prediction failed.
    ///
    /// Common causes:
    /// - The target column is not numeric
    /// - The target column has missing values
    #[error("Forecast failed: {0}")]
    Forecast(String),

    /// The report workbook could not be written or read back.
    #[error("Export failed: {0}")]
    Export(String),

    /// Invalid configuration or request parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A processing step (date parsing) failed.
    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

impl From<ForestError> for LearningError {
    fn from(err: ForestError) -> Self {
        LearningError::Forecast(err.to_string())
    }
}

impl From<polars::error::PolarsError> for LearningError {
    fn from(err: polars::error::PolarsError) -> Self {
        LearningError::Forecast(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for LearningError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        LearningError::Export(err.to_string())
    }
}

impl LearningError {
    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyTable => "EMPTY_TABLE",
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::Forecast(_) => "FORECAST_ERROR",
            Self::Export(_) => "EXPORT_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Processing(e) => e.error_code(),
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for LearningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("LearningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for demand-learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LearningError::InsufficientData {
            available: 4,
            required: 10,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data: 4 row(s) available, at least 10 required"
        );

        let err = LearningError::MissingColumn("demanda".to_string());
        assert!(err.to_string().contains("demanda"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(LearningError::EmptyTable.error_code(), "EMPTY_TABLE");
        assert_eq!(
            LearningError::Forecast("x".into()).error_code(),
            "FORECAST_ERROR"
        );
        let processing = LearningError::from(ProcessingError::UnsupportedFormat("a.txt".into()));
        assert_eq!(processing.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_forest_errors_become_forecast_errors() {
        let err: LearningError = ForestError::NotFitted.into();
        assert!(matches!(err, LearningError::Forecast(_)));
    }

    #[test]
    fn test_error_serialization() {
        let json = serde_json::to_value(LearningError::Export("disk full".into())).unwrap();
        assert_eq!(json["code"], "EXPORT_ERROR");
        assert_eq!(json["message"], "Export failed: disk full");
    }
}
