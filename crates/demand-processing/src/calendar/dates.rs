//! Date column normalization.

use chrono::{DateTime, NaiveDate, NaiveTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{DateOrder, ProcessingConfig};
use crate::error::{Result, ResultExt};
use crate::utils::{date_series, is_datetime_dtype, text_values};

/// What the normalizer found in the date column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DateColumnStatus {
    /// The configured column does not exist; the step was skipped.
    Missing,
    /// The column was already `Date` / `Datetime` and left untouched.
    AlreadyTyped,
    /// The column was parsed from text.
    Parsed {
        /// Values converted to dates.
        parsed: usize,
        /// Non-null values that could not be read as dates (now null).
        failed: usize,
    },
}

/// ISO layouts, tried first regardless of locale.
const ISO_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Day-first layouts (Spanish source locale).
const DAY_FIRST_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Month-first layouts (US locale).
const MONTH_FIRST_FORMATS: [&str; 3] = ["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"];

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// Parse a single date string.
///
/// ISO forms win; ambiguous `a/b/yyyy` values are read according to `order`
/// and fall back to the other order when the first one is not a valid date
/// (so `13/01/2024` and `01/13/2024` both parse). A trailing time part is
/// accepted and discarded, as is an RFC 3339 offset.
pub fn parse_date(value: &str, order: DateOrder) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(date) = parse_date_only(value, order) {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    // "<date> <time>" or "<date>T<time>"
    let split_at = value.find([' ', 'T'])?;
    let (date_part, time_part) = (&value[..split_at], value[split_at + 1..].trim());
    let has_time = TIME_FORMATS
        .iter()
        .any(|fmt| NaiveTime::parse_from_str(time_part, fmt).is_ok());
    if has_time {
        parse_date_only(date_part, order)
    } else {
        None
    }
}

fn parse_date_only(value: &str, order: DateOrder) -> Option<NaiveDate> {
    let (first, second) = match order {
        DateOrder::DayFirst => (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS),
        DateOrder::MonthFirst => (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS),
    };

    ISO_FORMATS
        .iter()
        .chain(first.iter())
        .chain(second.iter())
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| parse_compact(value))
}

/// `YYYYMMDD`, as produced by some ERP exports.
fn parse_compact(value: &str) -> Option<NaiveDate> {
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        NaiveDate::parse_from_str(value, "%Y%m%d").ok()
    } else {
        None
    }
}

/// Converts the configured date column to a `Date` column.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    column: String,
    order: DateOrder,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(&ProcessingConfig::default())
    }
}

impl DateNormalizer {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            column: config.date_column.clone(),
            order: config.date_order,
        }
    }

    /// Name of the column this normalizer works on.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Return a copy of `df` whose date column is `Date`-typed.
    ///
    /// A missing column is not an error: the frame comes back unchanged with
    /// [`DateColumnStatus::Missing`]. Values that cannot be parsed become null.
    pub fn normalize(&self, df: &DataFrame) -> Result<(DataFrame, DateColumnStatus)> {
        let Ok(column) = df.column(&self.column) else {
            debug!("Date column '{}' not present, skipping", self.column);
            return Ok((df.clone(), DateColumnStatus::Missing));
        };

        if is_datetime_dtype(column.dtype()) {
            return Ok((df.clone(), DateColumnStatus::AlreadyTyped));
        }

        let series = column.as_materialized_series();
        let (parsed_series, parsed, failed) = self
            .parse_series(series)
            .context(format!("Parsing date column '{}'", self.column))?;

        if failed > 0 {
            warn!(
                "{} value(s) in '{}' could not be read as dates and were left empty",
                failed, self.column
            );
        }
        info!(
            "Normalized date column '{}': {} parsed, {} unreadable",
            self.column, parsed, failed
        );

        let mut out = df.clone();
        out.replace(&self.column, parsed_series)?;
        Ok((out, DateColumnStatus::Parsed { parsed, failed }))
    }

    /// Parse any Series into a `Date` Series, returning the parsed and failed
    /// counts alongside it.
    pub fn parse_series(&self, series: &Series) -> PolarsResult<(Series, usize, usize)> {
        let values = text_values(series)?;
        let mut parsed = 0;
        let mut failed = 0;

        let dates: Vec<Option<NaiveDate>> = values
            .iter()
            .map(|value| {
                let value = value.as_deref()?;
                let date = parse_date(value, self.order);
                match date {
                    Some(_) => parsed += 1,
                    None if value.trim().is_empty() => {}
                    None => failed += 1,
                }
                date
            })
            .collect();

        Ok((date_series(series.name().clone(), &dates)?, parsed, failed))
    }
}
