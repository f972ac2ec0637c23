//! Data types shared by the processing stages.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::calendar::DateColumnStatus;
use crate::roles::ColumnRoles;
use crate::summary::DatasetSummary;

/// How the cleaner treats a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Integer or float column, imputed with the median
    Numeric,
    /// Text column, imputed with the mode
    Categorical,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Outcome of the missing-value policy for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ImputationAction {
    /// Missing entries replaced with the column median
    FilledMedian(f64),
    /// Missing entries replaced with the column mode
    FilledMode(String),
    /// Nothing to fill
    NoMissing,
    /// Too many missing entries; column left as-is
    AboveThreshold,
    /// No present value to derive a fill value from
    NoFillValue,
}

/// The missing-value decision taken for a single column.
///
/// Derived on every cleaning run and reported back to the caller; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValuePolicy {
    pub column: String,
    pub kind: ColumnKind,
    pub missing_count: usize,
    /// Missing fraction in `[0.0, 1.0]`.
    pub missing_fraction: f64,
    /// Threshold the fraction was compared against.
    pub threshold: f64,
    pub action: ImputationAction,
}

impl MissingValuePolicy {
    /// Whether the column was modified.
    pub fn filled(&self) -> bool {
        matches!(
            self.action,
            ImputationAction::FilledMedian(_) | ImputationAction::FilledMode(_)
        )
    }
}

/// Summary of a cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// One decision per numeric or categorical column, in column order.
    pub decisions: Vec<MissingValuePolicy>,
    /// Human-readable log of the changes made.
    pub steps: Vec<String>,
}

impl CleaningReport {
    /// Columns whose missing values were filled.
    pub fn filled_columns(&self) -> Vec<&str> {
        self.decisions
            .iter()
            .filter(|d| d.filled())
            .map(|d| d.column.as_str())
            .collect()
    }

    /// Look up the decision for a column.
    pub fn decision(&self, column: &str) -> Option<&MissingValuePolicy> {
        self.decisions.iter().find(|d| d.column == column)
    }
}

// ============================================================================
// Pipeline Output
// ============================================================================

/// A table after cleaning, date normalization, calendar derivation and role
/// detection.
///
/// Every stage returns a new frame, so `data` never shares mutations with
/// the frame the pipeline was given.
#[derive(Debug, Clone)]
pub struct ProcessedTable {
    /// The enriched table: original columns (cleaned) plus calendar columns.
    pub data: DataFrame,
    pub cleaning: CleaningReport,
    pub date_status: DateColumnStatus,
    /// Whether the calendar columns were derived.
    pub calendar_features: bool,
    pub roles: ColumnRoles,
}

impl ProcessedTable {
    /// Shape and column groups of the enriched table.
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::from_frame(&self.data)
    }

    /// Human-readable log of every change the pipeline made.
    pub fn processing_steps(&self) -> Vec<String> {
        let mut steps = self.cleaning.steps.clone();
        match &self.date_status {
            DateColumnStatus::Parsed { parsed, failed } => steps.push(format!(
                "Parsed {} date value(s), {} unreadable",
                parsed, failed
            )),
            DateColumnStatus::AlreadyTyped | DateColumnStatus::Missing => {}
        }
        if self.calendar_features {
            steps.push("Derived calendar columns".to_string());
        }
        steps
    }
}
