//! Statistical imputation methods.
//!
//! Provides median and mode imputation for the cleaner.

use crate::error::{ProcessingError, Result};
use crate::utils::{fill_numeric_nulls, fill_string_nulls, string_mode};
use polars::prelude::*;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Apply median imputation to a numeric column.
    ///
    /// Returns the fill value, or `None` when the column has no present
    /// value (the column is left untouched). The filled column is `Float64`.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<f64>> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let Some(median_val) = series.median() else {
            return Ok(None);
        };

        let filled = fill_numeric_nulls(&series, median_val).map_err(|e| {
            ProcessingError::ImputationFailed {
                column: col_name.to_string(),
                reason: e.to_string(),
            }
        })?;
        df.replace(col_name, filled)?;

        processing_steps.push(format!(
            "Filled '{}' with median: {:.2}",
            col_name, median_val
        ));
        Ok(Some(median_val))
    }

    /// Apply mode imputation to a categorical column.
    ///
    /// Returns the fill value, or `None` when no mode exists.
    pub fn apply_mode_imputation(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<String>> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let Some(mode_val) = string_mode(&series) else {
            return Ok(None);
        };

        let filled = fill_string_nulls(&series, &mode_val).map_err(|e| {
            ProcessingError::ImputationFailed {
                column: col_name.to_string(),
                reason: e.to_string(),
            }
        })?;
        df.replace(col_name, filled)?;

        processing_steps.push(format!("Filled '{}' with mode: '{}'", col_name, mode_val));
        Ok(Some(mode_val))
    }
}
