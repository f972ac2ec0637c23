//! Missing-value cleaning.
//!
//! The cleaner walks every column and applies a single policy:
//!
//! - **Numeric** columns with a missing fraction strictly between 0 and the
//!   numeric threshold (10% by default) are filled with the median.
//! - **Text** columns with a missing fraction strictly between 0 and the
//!   categorical threshold (5% by default) are filled with the mode.
//!
//! Everything else is left alone: columns without gaps, columns at or above
//! the threshold, boolean and date columns, and the derived calendar columns.
//! The caller's frame is never mutated.

use polars::prelude::*;
use tracing::{debug, info};

use crate::calendar::is_system_column;
use crate::config::ProcessingConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::types::{CleaningReport, ColumnKind, ImputationAction, MissingValuePolicy};
use crate::utils::{DtypeCategory, get_dtype_category};

/// Applies the median/mode missing-value policy.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    numeric_threshold: f64,
    categorical_threshold: f64,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(&ProcessingConfig::default())
    }
}

impl DataCleaner {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            numeric_threshold: config.numeric_fill_threshold,
            categorical_threshold: config.categorical_fill_threshold,
        }
    }

    /// Clean a copy of `df` and report the decision taken for each column.
    pub fn clean(&self, df: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let mut out = df.clone();
        let mut report = CleaningReport::default();
        let rows = df.height();

        for column in df.get_columns() {
            let name = column.name().as_str();
            if is_system_column(name) {
                continue;
            }

            let (kind, threshold) = match get_dtype_category(column.dtype()) {
                DtypeCategory::Numeric => (ColumnKind::Numeric, self.numeric_threshold),
                DtypeCategory::Text => (ColumnKind::Categorical, self.categorical_threshold),
                _ => continue,
            };

            let missing_count = column.null_count();
            let missing_fraction = if rows == 0 {
                0.0
            } else {
                missing_count as f64 / rows as f64
            };

            let action = if missing_count == 0 {
                ImputationAction::NoMissing
            } else if missing_fraction >= threshold {
                debug!(
                    "Leaving '{}' as-is: {:.1}% missing (threshold {:.1}%)",
                    name,
                    missing_fraction * 100.0,
                    threshold * 100.0
                );
                ImputationAction::AboveThreshold
            } else {
                self.fill(&mut out, name, kind, &mut report.steps)
                    .context(format!("Cleaning column '{}'", name))?
            };

            report.decisions.push(MissingValuePolicy {
                column: name.to_string(),
                kind,
                missing_count,
                missing_fraction,
                threshold,
                action,
            });
        }

        info!(
            "Cleaning complete: {} column(s) filled",
            report.filled_columns().len()
        );
        Ok((out, report))
    }

    fn fill(
        &self,
        df: &mut DataFrame,
        name: &str,
        kind: ColumnKind,
        steps: &mut Vec<String>,
    ) -> Result<ImputationAction> {
        let action = match kind {
            ColumnKind::Numeric => StatisticalImputer::apply_numeric_median(df, name, steps)?
                .map(ImputationAction::FilledMedian),
            ColumnKind::Categorical => StatisticalImputer::apply_mode_imputation(df, name, steps)?
                .map(ImputationAction::FilledMode),
        };
        Ok(action.unwrap_or(ImputationAction::NoFillValue))
    }
}
