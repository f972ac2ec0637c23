//! Configuration for the forecast engine.
//!
//! This module provides [`ForecastConfig`] and its builder.
//!
//! # Example
//!
//! ```
//! use demand_learning::ForecastConfig;
//!
//! let config = ForecastConfig::builder()
//!     .n_estimators(50)
//!     .max_depth(8)
//!     .random_seed(7)
//!     .build()
//!     .expect("valid config");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::LearningError;

/// Configuration for [`ForecastEngine`](crate::ForecastEngine).
///
/// Use [`ForecastConfig::builder()`] to construct a configuration with the
/// builder pattern. The defaults reproduce the reference model: 100 trees of
/// depth at most 10, seed 42, at least 10 usable rows, horizon 7 to 365 days.
///
/// # Validation
///
/// The builder validates the following constraints on [`build()`](ForecastConfigBuilder::build):
/// - `n_estimators` must be at least 1
/// - `max_depth` must be at least 1
/// - `min_samples_split` must be at least 2
/// - `min_samples_leaf` must be at least 1
/// - `min_rows` must be at least 2
/// - `min_horizon` must be at least 1 and not above `max_horizon`
/// - column names must not be empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of trees in the forest (default: 100).
    pub n_estimators: usize,

    /// Maximum depth of each tree (default: 10).
    pub max_depth: usize,

    /// Minimum samples required to split a node (default: 2).
    pub min_samples_split: usize,

    /// Minimum samples in a leaf (default: 1).
    pub min_samples_leaf: usize,

    /// Seed for the bootstrap samples (default: 42).
    ///
    /// The same seed on the same table gives the same forecast.
    pub random_seed: u64,

    /// Minimum usable rows after filtering (default: 10).
    pub min_rows: usize,

    /// Shortest accepted horizon in days (default: 7).
    pub min_horizon: usize,

    /// Longest accepted horizon in days (default: 365).
    pub max_horizon: usize,

    /// Date column name (default: `"fecha"`).
    pub date_column: String,

    /// Demand column name (default: `"demanda"`).
    pub target_column: String,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            random_seed: 42,
            min_rows: 10,
            min_horizon: 7,
            max_horizon: 365,
            date_column: "fecha".to_string(),
            target_column: "demanda".to_string(),
        }
    }
}

impl ForecastConfig {
    /// Create a new builder for `ForecastConfig`.
    #[must_use]
    pub fn builder() -> ForecastConfigBuilder {
        ForecastConfigBuilder::default()
    }

    /// Model descriptor reported with every forecast.
    ///
    /// ```
    /// use demand_learning::ForecastConfig;
    ///
    /// assert_eq!(
    ///     ForecastConfig::default().model_descriptor(),
    ///     "RandomForest (n_estimators=100)"
    /// );
    /// ```
    #[must_use]
    pub fn model_descriptor(&self) -> String {
        format!("RandomForest (n_estimators={})", self.n_estimators)
    }

    /// Check a requested horizon against the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] when `horizon` is outside
    /// `min_horizon..=max_horizon`.
    pub fn check_horizon(&self, horizon: usize) -> Result<usize, LearningError> {
        if (self.min_horizon..=self.max_horizon).contains(&horizon) {
            Ok(horizon)
        } else {
            Err(LearningError::InvalidConfig(format!(
                "horizon must be between {} and {} days, got {}",
                self.min_horizon, self.max_horizon, horizon
            )))
        }
    }
}

/// Builder for [`ForecastConfig`].
///
/// Created via [`ForecastConfig::builder()`]. All setters return `self` to
/// allow method chaining.
#[derive(Debug, Clone, Default)]
pub struct ForecastConfigBuilder {
    config: ForecastConfig,
}

impl ForecastConfigBuilder {
    /// Set the number of trees (default: 100).
    #[must_use]
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.config.n_estimators = n;
        self
    }

    /// Set the maximum tree depth (default: 10).
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the minimum samples to split a node (default: 2).
    #[must_use]
    pub fn min_samples_split(mut self, n: usize) -> Self {
        self.config.min_samples_split = n;
        self
    }

    /// Set the minimum samples per leaf (default: 1).
    #[must_use]
    pub fn min_samples_leaf(mut self, n: usize) -> Self {
        self.config.min_samples_leaf = n;
        self
    }

    /// Set the random seed for reproducibility (default: 42).
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set the minimum number of usable rows (default: 10).
    #[must_use]
    pub fn min_rows(mut self, n: usize) -> Self {
        self.config.min_rows = n;
        self
    }

    /// Set the accepted horizon range in days (default: 7 to 365).
    #[must_use]
    pub fn horizon_range(mut self, min: usize, max: usize) -> Self {
        self.config.min_horizon = min;
        self.config.max_horizon = max;
        self
    }

    /// Set the date column name.
    #[must_use]
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.config.date_column = column.into();
        self
    }

    /// Set the demand column name.
    #[must_use]
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.config.target_column = column.into();
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] naming the first invalid
    /// setting.
    pub fn build(self) -> Result<ForecastConfig, LearningError> {
        let config = self.config;

        if config.n_estimators == 0 {
            return Err(LearningError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        if config.max_depth == 0 {
            return Err(LearningError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }

        if config.min_samples_split < 2 {
            return Err(LearningError::InvalidConfig(
                "min_samples_split must be at least 2".to_string(),
            ));
        }

        if config.min_samples_leaf == 0 {
            return Err(LearningError::InvalidConfig(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }

        if config.min_rows < 2 {
            return Err(LearningError::InvalidConfig(
                "min_rows must be at least 2".to_string(),
            ));
        }

        if config.min_horizon == 0 || config.min_horizon > config.max_horizon {
            return Err(LearningError::InvalidConfig(format!(
                "invalid horizon range {}..={}",
                config.min_horizon, config.max_horizon
            )));
        }

        if config.date_column.trim().is_empty() || config.target_column.trim().is_empty() {
            return Err(LearningError::InvalidConfig(
                "column names must not be empty".to_string(),
            ));
        }

        Ok(config)
    }
}
