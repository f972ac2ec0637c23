//! Exploratory demand statistics.

use std::collections::BTreeMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProcessingError, Result, ResultExt};
use crate::roles::ColumnRoles;
use crate::utils::{date_values, is_datetime_dtype, is_numeric_dtype, numeric_values, text_values};

/// Descriptive statistics of the target column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandStats {
    /// Non-null values the statistics are computed over.
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl DemandStats {
    /// Compute statistics over the non-null values of a numeric Series.
    /// `None` when there are none.
    pub fn from_series(series: &Series) -> PolarsResult<Option<Self>> {
        let count = series.len() - series.null_count();
        if count == 0 {
            return Ok(None);
        }

        let (Some(mean), Some(median), Some(min), Some(max)) = (
            series.mean(),
            series.median(),
            series.min::<f64>()?,
            series.max::<f64>()?,
        ) else {
            return Ok(None);
        };

        Ok(Some(Self {
            count,
            mean,
            median,
            min,
            max,
        }))
    }
}

/// Demand aggregated over one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleAggregate {
    pub article: String,
    pub sum: f64,
    /// `None` when every demand value of the article is missing.
    pub mean: Option<f64>,
    /// Rows with a present demand value.
    pub count: usize,
}

/// Total demand of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDemand {
    /// `YYYY-MM`
    pub month: String,
    pub total: f64,
}

/// Exploratory view of a processed table.
///
/// Each part is only filled in when the table supports it: demand statistics
/// need a numeric target column, per-article aggregates also need an article
/// column, and the monthly trend also needs a date-typed date column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExploratoryStats {
    pub demand: Option<DemandStats>,
    /// Sorted by article.
    pub by_article: Vec<ArticleAggregate>,
    /// Sorted by month.
    pub monthly: Vec<MonthlyDemand>,
}

impl ExploratoryStats {
    /// Compute the exploratory view of `df` from its detected roles.
    pub fn compute(df: &DataFrame, roles: &ColumnRoles, date_column: &str) -> Result<Self> {
        let Some(target) = roles.target.as_deref() else {
            debug!("No target column, skipping exploratory statistics");
            return Ok(Self::default());
        };
        let target_column = column(df, target)?;
        if !is_numeric_dtype(target_column.dtype()) {
            debug!("Target column '{}' is not numeric", target);
            return Ok(Self::default());
        }

        let target_series = target_column.as_materialized_series();
        let demand = numeric_values(target_series)
            .context(format!("Reading target column '{}'", target))?;
        let demand_stats = DemandStats::from_series(target_series)
            .context(format!("Summarizing target column '{}'", target))?;

        let by_article = match &roles.article {
            Some(detection) => {
                let articles = text_values(column(df, &detection.column)?.as_materialized_series())?;
                aggregate_by_article(&articles, &demand)
            }
            None => Vec::new(),
        };

        let monthly = match df.column(date_column) {
            Ok(dates) if is_datetime_dtype(dates.dtype()) => {
                let dates = date_values(dates.as_materialized_series())?;
                let months: Vec<Option<String>> = dates
                    .iter()
                    .map(|d| d.map(|d| d.format("%Y-%m").to_string()))
                    .collect();
                monthly_totals(&months, &demand)
            }
            _ => Vec::new(),
        };

        Ok(Self {
            demand: demand_stats,
            by_article,
            monthly,
        })
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| ProcessingError::ColumnNotFound(name.to_string()))
}

/// Group demand by article. Rows without an article are skipped.
fn aggregate_by_article(articles: &[Option<String>], demand: &[Option<f64>]) -> Vec<ArticleAggregate> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (article, value) in articles.iter().zip(demand) {
        let Some(article) = article.as_deref() else {
            continue;
        };
        let entry = groups.entry(article).or_insert((0.0, 0));
        if let Some(v) = value {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(article, (sum, count))| ArticleAggregate {
            article: article.to_string(),
            sum,
            mean: (count > 0).then(|| sum / count as f64),
            count,
        })
        .collect()
}

/// Sum demand per month. Rows without a date are skipped.
fn monthly_totals(months: &[Option<String>], demand: &[Option<f64>]) -> Vec<MonthlyDemand> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for (month, value) in months.iter().zip(demand) {
        if let Some(month) = month.as_deref() {
            *totals.entry(month).or_insert(0.0) += value.unwrap_or(0.0);
        }
    }

    totals
        .into_iter()
        .map(|(month, total)| MonthlyDemand {
            month: month.to_string(),
            total,
        })
        .collect()
}
