//! Forecast engine.
//!
//! Fits a [`RandomForestRegressor`] on calendar features of the historical
//! rows and predicts demand for the days following the last observation.
//!
//! # Stages
//!
//! 1. **Preconditions**: non-empty table, target and date columns present,
//!    article column present when filtering by article
//! 2. **Filtering**: rows of one article, compared on the text form
//! 3. **History**: dates normalized, undated rows dropped, ascending sort
//! 4. **Fitting**: year, month, day and weekday as features
//! 5. **Prediction**: one value per future day

use chrono::{Days, NaiveDate};
use demand_processing::calendar::{COL_DAY, COL_MONTH, COL_WEEKDAY, COL_YEAR};
use demand_processing::utils::{date_values, is_datetime_dtype, is_numeric_dtype, numeric_values, text_values};
use demand_processing::{CalendarFeatures, DateNormalizer, DateOrder, ProcessingConfig};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::config::ForecastConfig;
use crate::error::{LearningError, Result};
use crate::forest::RandomForestRegressor;
use crate::types::{ArticleFilter, ForecastPoint, ForecastResult};

/// Feature columns, in model order.
pub const FEATURE_COLUMNS: [&str; 4] = [COL_YEAR, COL_MONTH, COL_DAY, COL_WEEKDAY];

/// One usable historical row.
#[derive(Debug, Clone, Copy)]
struct HistoryRow {
    date: NaiveDate,
    features: [f64; 4],
    demand: f64,
}

fn date_features(date: NaiveDate) -> [f64; 4] {
    let f = CalendarFeatures::from_date(date);
    [
        f64::from(f.year),
        f64::from(f.month),
        f64::from(f.day),
        f64::from(f.weekday),
    ]
}

/// Demand forecaster.
///
/// # Example
///
/// ```rust,ignore
/// use demand_learning::{ArticleFilter, ForecastEngine};
///
/// let engine = ForecastEngine::default();
/// let result = engine.forecast(&df, Some("producto"), &ArticleFilter::All, 30)?;
/// for point in &result.forecast {
///     println!("{} {:.1}", point.date, point.value);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: ForecastConfig,
    date_order: DateOrder,
}

impl ForecastEngine {
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            config,
            date_order: DateOrder::default(),
        }
    }

    /// Set how text dates are read when the date column is not date-typed.
    #[must_use]
    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.date_order = order;
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Fit a model on `df` and predict `horizon` days past the last date.
    ///
    /// `article_column` is only needed when `filter` selects one article.
    /// The horizon range of the config is not enforced here; callers check
    /// it with [`ForecastConfig::check_horizon`].
    ///
    /// # Errors
    ///
    /// - [`LearningError::EmptyTable`] when `df` has no rows
    /// - [`LearningError::MissingColumn`] when the target, date or article
    ///   column is absent
    /// - [`LearningError::InsufficientData`] when fewer than `min_rows`
    ///   dated rows remain after filtering
    /// - [`LearningError::Forecast`] when the target is not numeric, has
    ///   missing values, or the model cannot be fitted
    pub fn forecast(
        &self,
        df: &DataFrame,
        article_column: Option<&str>,
        filter: &ArticleFilter,
        horizon: usize,
    ) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(LearningError::InvalidConfig(
                "horizon must be at least 1 day".to_string(),
            ));
        }
        if df.height() == 0 {
            return Err(LearningError::EmptyTable);
        }
        for name in [&self.config.target_column, &self.config.date_column] {
            if df.column(name).is_err() {
                return Err(LearningError::MissingColumn(name.clone()));
            }
        }

        let table = self.filter_rows(df, article_column, filter)?;
        self.ensure_rows(table.height())?;

        let history = self.history(&table)?;
        let (Some(first), Some(last)) = (history.first(), history.last()) else {
            return Err(LearningError::InsufficientData {
                available: 0,
                required: self.config.min_rows.max(1),
            });
        };
        let last = last.date;
        info!(
            "Fitting forecast for '{}' on {} rows ({} to {})",
            filter,
            history.len(),
            first.date,
            last
        );

        let x = Array2::from_shape_fn((history.len(), FEATURE_COLUMNS.len()), |(i, j)| {
            history[i].features[j]
        });
        let y: Array1<f64> = history.iter().map(|row| row.demand).collect();

        let mut forest = RandomForestRegressor::new(self.config.n_estimators)
            .with_max_depth(self.config.max_depth)
            .with_min_samples_split(self.config.min_samples_split)
            .with_min_samples_leaf(self.config.min_samples_leaf)
            .with_random_state(self.config.random_seed);
        forest.fit(&x, &y)?;

        let future = future_dates(last, horizon)?;
        let x_future = Array2::from_shape_fn((future.len(), FEATURE_COLUMNS.len()), |(i, j)| {
            date_features(future[i])[j]
        });
        let predictions = forest.predict(&x_future)?;

        let mut feature_importance: Vec<(String, f64)> = forest
            .feature_importances()
            .unwrap_or_default()
            .iter()
            .zip(FEATURE_COLUMNS)
            .map(|(imp, name)| (name.to_string(), *imp))
            .collect();
        feature_importance.sort_by(|a, b| b.1.total_cmp(&a.1));

        info!("Predicted {} day(s) after {}", horizon, last);

        Ok(ForecastResult {
            historical: history
                .iter()
                .map(|row| ForecastPoint::new(row.date, row.demand))
                .collect(),
            forecast: future
                .into_iter()
                .zip(predictions)
                .map(|(date, value)| ForecastPoint::new(date, value))
                .collect(),
            filter: filter.clone(),
            horizon,
            model: self.config.model_descriptor(),
            feature_importance,
        })
    }

    fn ensure_rows(&self, available: usize) -> Result<()> {
        if available < self.config.min_rows {
            return Err(LearningError::InsufficientData {
                available,
                required: self.config.min_rows,
            });
        }
        Ok(())
    }

    /// Keep the rows of the selected article.
    fn filter_rows(
        &self,
        df: &DataFrame,
        article_column: Option<&str>,
        filter: &ArticleFilter,
    ) -> Result<DataFrame> {
        let ArticleFilter::Article(article) = filter else {
            return Ok(df.clone());
        };

        let name = article_column.ok_or_else(|| LearningError::MissingColumn("article".to_string()))?;
        let column = df
            .column(name)
            .map_err(|_| LearningError::MissingColumn(name.to_string()))?;

        let mask: Vec<bool> = text_values(column.as_materialized_series())?
            .iter()
            .map(|value| value.as_deref() == Some(article.as_str()))
            .collect();
        let filtered = df.filter(&BooleanChunked::from_slice("mask".into(), &mask))?;

        debug!(
            "Article '{}' selects {} of {} rows",
            article,
            filtered.height(),
            df.height()
        );
        Ok(filtered)
    }

    /// Dated rows with their features and demand, ascending by date.
    fn history(&self, df: &DataFrame) -> Result<Vec<HistoryRow>> {
        let date_name = &self.config.date_column;
        let target_name = &self.config.target_column;

        let dates = {
            let series = df.column(date_name)?.as_materialized_series();
            if is_datetime_dtype(series.dtype()) {
                date_values(series)?
            } else {
                let normalizer = DateNormalizer::new(&ProcessingConfig {
                    date_column: date_name.clone(),
                    date_order: self.date_order,
                    ..ProcessingConfig::default()
                });
                let (parsed, _, failed) = normalizer.parse_series(series)?;
                if failed > 0 {
                    debug!("{} value(s) in '{}' are not dates", failed, date_name);
                }
                date_values(&parsed)?
            }
        };

        let target = df.column(target_name)?.as_materialized_series();
        if !is_numeric_dtype(target.dtype()) {
            return Err(LearningError::Forecast(format!(
                "target column '{}' is not numeric ({})",
                target_name,
                target.dtype()
            )));
        }
        let demand = numeric_values(target)?;

        let stored_features = if FEATURE_COLUMNS.iter().all(|c| df.column(c).is_ok()) {
            debug!("Reusing calendar columns as features");
            let columns = FEATURE_COLUMNS
                .iter()
                .map(|c| numeric_values(df.column(c)?.as_materialized_series()))
                .collect::<PolarsResult<Vec<_>>>()?;
            Some(columns)
        } else {
            None
        };

        let mut rows = Vec::with_capacity(df.height());
        let mut undated = 0;
        let mut missing_demand = 0;
        for (i, date) in dates.iter().enumerate() {
            let Some(date) = *date else {
                undated += 1;
                continue;
            };
            let Some(value) = demand[i] else {
                missing_demand += 1;
                continue;
            };
            let features = match &stored_features {
                Some(columns) => stored_row(columns, i).ok_or_else(|| {
                    LearningError::Forecast(format!("calendar features missing in row {}", i))
                })?,
                None => date_features(date),
            };
            rows.push(HistoryRow {
                date,
                features,
                demand: value,
            });
        }

        if undated > 0 {
            warn!("Dropped {} row(s) without a usable date", undated);
        }
        if missing_demand > 0 {
            return Err(LearningError::Forecast(format!(
                "target column '{}' has {} missing value(s)",
                target_name, missing_demand
            )));
        }
        self.ensure_rows(rows.len())?;

        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }
}

fn stored_row(columns: &[Vec<Option<f64>>], row: usize) -> Option<[f64; 4]> {
    Some([
        columns[0][row]?,
        columns[1][row]?,
        columns[2][row]?,
        columns[3][row]?,
    ])
}

/// `horizon` consecutive days starting the day after `last`.
fn future_dates(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as u64)
        .map(|offset| {
            last.checked_add_days(Days::new(offset)).ok_or_else(|| {
                LearningError::Forecast(format!("date {} + {} days is out of range", last, offset))
            })
        })
        .collect()
}
