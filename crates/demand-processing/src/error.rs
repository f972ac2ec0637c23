//! Custom error types for loading and preparing demand tables.
//!
//! This module provides the error hierarchy using `thiserror` so every stage
//! (loader, cleaner, normalizer, feature deriver) can propagate failures with
//! context.
//!
//! Errors are serializable so a presentation layer can show them as
//! `{ code, message }` pairs.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the processing crate.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// The uploaded file has an extension the loader does not handle.
    #[error("Unsupported file format: '{0}' (expected .csv, .xlsx or .xls)")]
    UnsupportedFormat(String),

    /// The file content could not be parsed into a table.
    #[error("Failed to parse '{file}': {reason}")]
    ParseError { file: String, reason: String },

    /// The upload exceeds the configured size limit.
    #[error("File is too large: {size} bytes (limit is {limit} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Imputation failed for a column.
    #[error("Failed to impute missing values in column '{column}': {reason}")]
    ImputationFailed { column: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Build a parse error for the given file name.
    pub fn parse(file: impl Into<String>, reason: impl ToString) -> Self {
        ProcessingError::ParseError {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::ParseError { .. } => "PARSE_ERROR",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ImputationFailed { .. } => "IMPUTATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if the error came from the uploaded file itself rather than
    /// from the processing code (the user can fix it by choosing another file).
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::UnsupportedFormat(_) | Self::ParseError { .. } | Self::FileTooLarge { .. } => {
                true
            }
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}
