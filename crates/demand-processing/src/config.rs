//! Configuration types for loading and preparing demand tables.
//!
//! This module provides [`ProcessingConfig`] using the builder pattern so the
//! session layer can override column names, imputation thresholds and date
//! locale without touching the processing code.

use serde::{Deserialize, Serialize};

/// File extensions accepted by the loader (lowercase, with the leading dot).
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".xlsx", ".xls", ".csv"];

/// Default upload size limit: 50 MiB.
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Default name of the date column.
pub const DEFAULT_DATE_COLUMN: &str = "fecha";

/// Default name of the demand (target) column.
pub const DEFAULT_TARGET_COLUMN: &str = "demanda";

/// Column names recognised as the article column, in priority order.
pub const DEFAULT_ARTICLE_CANDIDATES: [&str; 12] = [
    "articulo",
    "artículo",
    "producto",
    "item",
    "sku",
    "descripcion",
    "descripción",
    "nombre",
    "article",
    "product",
    "description",
    "name",
];

/// How ambiguous `dd/mm` vs `mm/dd` dates are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DateOrder {
    /// `03/04/2024` is the 3rd of April (Spanish and most European locales)
    #[default]
    DayFirst,
    /// `03/04/2024` is the 4th of March (US locale)
    MonthFirst,
}

/// Language used for the weekday-name calendar column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WeekdayLanguage {
    /// lunes, martes, ...
    #[default]
    Spanish,
    /// Monday, Tuesday, ...
    English,
}

/// Configuration for the processing stages.
///
/// Use [`ProcessingConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use demand_processing::config::{DateOrder, ProcessingConfig};
///
/// let config = ProcessingConfig::builder()
///     .date_column("date")
///     .target_column("units")
///     .date_order(DateOrder::MonthFirst)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Name of the date column.
    /// Default: "fecha"
    pub date_column: String,

    /// Name of the demand column. Matched exactly and case-sensitively.
    /// Default: "demanda"
    pub target_column: String,

    /// Article column names to look for, in priority order.
    /// Default: [`DEFAULT_ARTICLE_CANDIDATES`]
    pub article_candidates: Vec<String>,

    /// Numeric columns are median-filled when their missing fraction is
    /// strictly between 0 and this value.
    /// Default: 0.10
    pub numeric_fill_threshold: f64,

    /// Text columns are mode-filled when their missing fraction is
    /// strictly between 0 and this value.
    /// Default: 0.05
    pub categorical_fill_threshold: f64,

    /// A text column qualifies as the article column by cardinality when its
    /// distinct count is above 1 and below this fraction of the row count.
    /// Default: 0.3
    pub article_cardinality_ratio: f64,

    /// Resolution of ambiguous day/month dates.
    /// Default: DayFirst
    pub date_order: DateOrder,

    /// Language of the weekday-name column.
    /// Default: Spanish
    pub weekday_language: WeekdayLanguage,

    /// Field separator for CSV uploads.
    /// Default: b','
    pub csv_separator: u8,

    /// Maximum accepted upload size in bytes.
    /// Default: 50 MiB
    pub max_upload_bytes: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            article_candidates: DEFAULT_ARTICLE_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            numeric_fill_threshold: 0.10,
            categorical_fill_threshold: 0.05,
            article_cardinality_ratio: 0.3,
            date_order: DateOrder::default(),
            weekday_language: WeekdayLanguage::default(),
            csv_separator: b',',
            max_upload_bytes: MAX_FILE_SIZE,
        }
    }
}

impl ProcessingConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("numeric_fill_threshold", self.numeric_fill_threshold),
            ("categorical_fill_threshold", self.categorical_fill_threshold),
            ("article_cardinality_ratio", self.article_cardinality_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.date_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName("date_column"));
        }
        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName("target_column"));
        }
        if self.date_column == self.target_column {
            return Err(ConfigValidationError::ConflictingColumns(
                self.date_column.clone(),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigValidationError::InvalidUploadLimit);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(&'static str),

    #[error("Date and target columns must differ (both are '{0}')")]
    ConflictingColumns(String),

    #[error("Upload limit must be greater than zero")]
    InvalidUploadLimit,
}

impl From<ConfigValidationError> for crate::error::ProcessingError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::ProcessingError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`ProcessingConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ProcessingConfigBuilder {
    date_column: Option<String>,
    target_column: Option<String>,
    article_candidates: Option<Vec<String>>,
    numeric_fill_threshold: Option<f64>,
    categorical_fill_threshold: Option<f64>,
    article_cardinality_ratio: Option<f64>,
    date_order: Option<DateOrder>,
    weekday_language: Option<WeekdayLanguage>,
    csv_separator: Option<u8>,
    max_upload_bytes: Option<usize>,
}

impl ProcessingConfigBuilder {
    /// Set the name of the date column.
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = Some(column.into());
        self
    }

    /// Set the name of the demand column.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Replace the list of article column names, in priority order.
    pub fn article_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.article_candidates = Some(candidates.into_iter().map(Into::into).collect());
        self
    }

    /// Set the missing-fraction ceiling for median imputation.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.1 = 10%)
    pub fn numeric_fill_threshold(mut self, threshold: f64) -> Self {
        self.numeric_fill_threshold = Some(threshold);
        self
    }

    /// Set the missing-fraction ceiling for mode imputation.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.05 = 5%)
    pub fn categorical_fill_threshold(mut self, threshold: f64) -> Self {
        self.categorical_fill_threshold = Some(threshold);
        self
    }

    /// Set the cardinality ratio used by the article fallback detection.
    pub fn article_cardinality_ratio(mut self, ratio: f64) -> Self {
        self.article_cardinality_ratio = Some(ratio);
        self
    }

    /// Set how ambiguous day/month dates are read.
    pub fn date_order(mut self, order: DateOrder) -> Self {
        self.date_order = Some(order);
        self
    }

    /// Set the weekday-name language.
    pub fn weekday_language(mut self, language: WeekdayLanguage) -> Self {
        self.weekday_language = Some(language);
        self
    }

    /// Set the CSV field separator.
    pub fn csv_separator(mut self, separator: u8) -> Self {
        self.csv_separator = Some(separator);
        self
    }

    /// Set the maximum accepted upload size in bytes.
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ProcessingConfig` or an error if validation fails.
    pub fn build(self) -> Result<ProcessingConfig, ConfigValidationError> {
        let defaults = ProcessingConfig::default();
        let config = ProcessingConfig {
            date_column: self.date_column.unwrap_or(defaults.date_column),
            target_column: self.target_column.unwrap_or(defaults.target_column),
            article_candidates: self
                .article_candidates
                .unwrap_or(defaults.article_candidates),
            numeric_fill_threshold: self
                .numeric_fill_threshold
                .unwrap_or(defaults.numeric_fill_threshold),
            categorical_fill_threshold: self
                .categorical_fill_threshold
                .unwrap_or(defaults.categorical_fill_threshold),
            article_cardinality_ratio: self
                .article_cardinality_ratio
                .unwrap_or(defaults.article_cardinality_ratio),
            date_order: self.date_order.unwrap_or_default(),
            weekday_language: self.weekday_language.unwrap_or_default(),
            csv_separator: self.csv_separator.unwrap_or(defaults.csv_separator),
            max_upload_bytes: self.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcessingConfig::default();
        assert_eq!(config.date_column, "fecha");
        assert_eq!(config.target_column, "demanda");
        assert_eq!(config.numeric_fill_threshold, 0.10);
        assert_eq!(config.categorical_fill_threshold, 0.05);
        assert_eq!(config.article_candidates[0], "articulo");
        assert_eq!(config.date_order, DateOrder::DayFirst);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_builder_defaults() {
        let config = ProcessingConfig::builder().build().unwrap();
        assert_eq!(config, ProcessingConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = ProcessingConfig::builder()
            .date_column("date")
            .target_column("units")
            .article_candidates(["sku"])
            .numeric_fill_threshold(0.2)
            .date_order(DateOrder::MonthFirst)
            .weekday_language(WeekdayLanguage::English)
            .csv_separator(b';')
            .build()
            .unwrap();

        assert_eq!(config.date_column, "date");
        assert_eq!(config.target_column, "units");
        assert_eq!(config.article_candidates, vec!["sku".to_string()]);
        assert_eq!(config.numeric_fill_threshold, 0.2);
        assert_eq!(config.date_order, DateOrder::MonthFirst);
        assert_eq!(config.weekday_language, WeekdayLanguage::English);
        assert_eq!(config.csv_separator, b';');
    }

    #[test]
    fn test_validation_invalid_threshold() {
        let result = ProcessingConfig::builder()
            .categorical_fill_threshold(1.5)
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_validation_conflicting_columns() {
        let result = ProcessingConfig::builder()
            .date_column("x")
            .target_column("x")
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ConflictingColumns(_)
        ));
    }

    #[test]
    fn test_validation_empty_column_name() {
        let result = ProcessingConfig::builder().target_column("  ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyColumnName("target_column")
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = ProcessingConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ProcessingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
