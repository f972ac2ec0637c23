//! Common types returned by the forecast engine.
//!
//! # Overview
//!
//! - [`ArticleFilter`]: which rows of the table a forecast is fitted on
//! - [`ForecastPoint`]: one dated demand value
//! - [`PointKind`]: historical or predicted
//! - [`ForecastResult`]: complete result from [`ForecastEngine::forecast()`](crate::ForecastEngine::forecast)

use std::fmt;

use chrono::NaiveDate;
use demand_processing::ALL_ARTICLES;
use serde::{Deserialize, Serialize};

/// Row filter applied before fitting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleFilter {
    /// Every row of the table.
    #[default]
    All,
    /// Rows whose article column, in text form, equals the value.
    Article(String),
}

impl ArticleFilter {
    /// Turn a roster entry into a filter. The `"All"` sentinel selects every
    /// row.
    ///
    /// ```
    /// use demand_learning::ArticleFilter;
    ///
    /// assert_eq!(ArticleFilter::from_roster_entry("All"), ArticleFilter::All);
    /// assert_eq!(
    ///     ArticleFilter::from_roster_entry("Huevos"),
    ///     ArticleFilter::Article("Huevos".to_string())
    /// );
    /// ```
    pub fn from_roster_entry(entry: &str) -> Self {
        if entry == ALL_ARTICLES {
            Self::All
        } else {
            Self::Article(entry.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for ArticleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_ARTICLES),
            Self::Article(value) => f.write_str(value),
        }
    }
}

/// A dated demand value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ForecastPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Origin of a value in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointKind {
    Historical,
    Prediction,
}

impl PointKind {
    /// Tag written to the `Type` column of the report.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PointKind::Historical => "Historical",
            PointKind::Prediction => "Prediction",
        }
    }

    /// Parse a tag read back from a report.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Historical" => Some(PointKind::Historical),
            "Prediction" => Some(PointKind::Prediction),
            _ => None,
        }
    }
}

/// Result of one forecast run.
///
/// Returned by [`ForecastEngine::forecast()`](crate::ForecastEngine::forecast).
/// Immutable once created; the fitted model is not kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Observed demand, ascending by date.
    pub historical: Vec<ForecastPoint>,

    /// Predicted demand for `horizon` consecutive days after the last
    /// observed date.
    pub forecast: Vec<ForecastPoint>,

    /// Filter the model was fitted with.
    pub filter: ArticleFilter,

    /// Number of predicted days.
    pub horizon: usize,

    /// Human-readable model description, e.g. `"RandomForest (n_estimators=100)"`.
    pub model: String,

    /// Feature importance scores (feature name, importance), sorted in
    /// descending order. Values sum to 1.0 unless every tree is a single leaf.
    pub feature_importance: Vec<(String, f64)>,
}

impl ForecastResult {
    /// Historical and predicted points combined, sorted chronologically.
    ///
    /// The sort is stable and historical points come first, so on equal
    /// dates the historical value precedes the prediction.
    pub fn combined(&self) -> Vec<(ForecastPoint, PointKind)> {
        let mut rows: Vec<(ForecastPoint, PointKind)> = self
            .historical
            .iter()
            .map(|p| (*p, PointKind::Historical))
            .chain(self.forecast.iter().map(|p| (*p, PointKind::Prediction)))
            .collect();
        rows.sort_by_key(|(point, _)| point.date);
        rows
    }

    /// Total number of rows in the combined view.
    pub fn total_rows(&self) -> usize {
        self.historical.len() + self.forecast.len()
    }

    /// Date of the last observed value.
    pub fn last_historical_date(&self) -> Option<NaiveDate> {
        self.historical.last().map(|p| p.date)
    }
}
