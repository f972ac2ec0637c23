//! Article column detection strategies.

use polars::prelude::*;

use super::DetectionStrategy;
use crate::utils::{is_datetime_dtype, is_text_dtype};

/// One step of article column detection.
///
/// `columns` holds only the eligible columns, in table order; `rows` is the
/// table height. Returns the matching column name, if any.
pub trait ArticleStrategy: Send + Sync {
    fn kind(&self) -> DetectionStrategy;

    fn detect(&self, columns: &[&Column], rows: usize) -> Option<String>;
}

/// A column named exactly like one of the candidates, compared
/// case-insensitively. Candidates are tried in priority order.
pub struct ExactName {
    candidates: Vec<String>,
}

impl ExactName {
    /// `candidates` must already be lowercase.
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }
}

impl ArticleStrategy for ExactName {
    fn kind(&self) -> DetectionStrategy {
        DetectionStrategy::ExactName
    }

    fn detect(&self, columns: &[&Column], _rows: usize) -> Option<String> {
        self.candidates.iter().find_map(|candidate| {
            columns
                .iter()
                .find(|c| c.name().trim().to_lowercase() == *candidate)
                .map(|c| c.name().to_string())
        })
    }
}

/// A column whose name contains one of the candidates. Date-typed columns
/// are ignored.
pub struct NameContains {
    candidates: Vec<String>,
}

impl NameContains {
    /// `candidates` must already be lowercase.
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }
}

impl ArticleStrategy for NameContains {
    fn kind(&self) -> DetectionStrategy {
        DetectionStrategy::NameContains
    }

    fn detect(&self, columns: &[&Column], _rows: usize) -> Option<String> {
        self.candidates.iter().find_map(|candidate| {
            columns
                .iter()
                .filter(|c| !is_datetime_dtype(c.dtype()))
                .find(|c| c.name().to_lowercase().contains(candidate.as_str()))
                .map(|c| c.name().to_string())
        })
    }
}

/// The first text column whose distinct non-null count is above 1 and below
/// `ratio * rows`.
pub struct LowCardinalityText {
    ratio: f64,
}

impl LowCardinalityText {
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }
}

impl ArticleStrategy for LowCardinalityText {
    fn kind(&self) -> DetectionStrategy {
        DetectionStrategy::LowCardinalityText
    }

    fn detect(&self, columns: &[&Column], rows: usize) -> Option<String> {
        let limit = self.ratio * rows as f64;
        columns
            .iter()
            .filter(|c| is_text_dtype(c.dtype()))
            .find(|c| {
                let distinct = c
                    .as_materialized_series()
                    .drop_nulls()
                    .n_unique()
                    .unwrap_or(0);
                distinct > 1 && (distinct as f64) < limit
            })
            .map(|c| c.name().to_string())
    }
}
