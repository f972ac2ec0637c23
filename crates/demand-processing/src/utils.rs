//! Shared utilities for the processing stages.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for cleaning and detection purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    Text,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date or datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Check if a DataType holds text (plain strings or categoricals).
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if is_text_dtype(dtype) {
        DtypeCategory::Text
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Read a numeric Series as `f64` values, keeping nulls.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Read any Series as text values, keeping nulls.
///
/// Values are rendered the way they would be shown to a user (no quotes).
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let cast = series.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Convert a day count since the Unix epoch into a calendar date.
#[inline]
pub fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Convert a calendar date into a day count since the Unix epoch.
#[inline]
pub fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Read a `Date` or `Datetime` Series as calendar dates, keeping nulls.
pub fn date_values(series: &Series) -> PolarsResult<Vec<Option<NaiveDate>>> {
    let as_date = match series.dtype() {
        DataType::Date => series.clone(),
        DataType::Datetime(_, _) => series.cast(&DataType::Date)?,
        other => polars_bail!(
            InvalidOperation: "column '{}' is not date-typed ({})", series.name(), other
        ),
    };
    let days = as_date.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(date_from_epoch_days))
        .collect())
}

/// Build a `Date` Series from calendar dates.
pub fn date_series(name: PlSmallStr, dates: &[Option<NaiveDate>]) -> PolarsResult<Series> {
    let days: Vec<Option<i32>> = dates.iter().map(|d| d.map(epoch_days)).collect();
    Series::new(name, days).cast(&DataType::Date)
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Calculate the mode (most frequent value) of a Series rendered as text.
///
/// Ties are resolved in favour of the lexicographically smallest value, so
/// the result never depends on hash ordering. Returns `None` when the Series
/// has no non-null values.
pub fn string_mode(series: &Series) -> Option<String> {
    let values = text_values(series).ok()?;

    let mut value_counts: BTreeMap<String, usize> = BTreeMap::new();
    for val in values.into_iter().flatten() {
        *value_counts.entry(val).or_insert(0) += 1;
    }

    let mut best: Option<(String, usize)> = None;
    for (val, count) in value_counts {
        match &best {
            Some((_, best_count)) if *best_count >= count => {}
            _ => best = Some((val, count)),
        }
    }
    best.map(|(val, _)| val)
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<f64> = numeric_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a text Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<String> = text_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Collect sample values from a Series (non-null values only).
pub fn collect_sample_values(series: &Series, max_samples: usize) -> Vec<String> {
    text_values(series)
        .map(|values| values.into_iter().flatten().take(max_samples).collect())
        .unwrap_or_default()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int32), DtypeCategory::Numeric);
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Datetime);
        assert_eq!(
            get_dtype_category(&DataType::Datetime(TimeUnit::Milliseconds, None)),
            DtypeCategory::Datetime
        );
        assert_eq!(get_dtype_category(&DataType::Boolean), DtypeCategory::Boolean);
        assert_eq!(get_dtype_category(&DataType::String), DtypeCategory::Text);
    }

    #[test]
    fn test_epoch_days_roundtrip_known_dates() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(epoch_days(epoch), 0);
        assert_eq!(date_from_epoch_days(0), Some(epoch));

        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(epoch_days(leap), 19_782);
    }

    #[test]
    fn test_date_series_and_values() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 1, 1),
            None,
            NaiveDate::from_ymd_opt(2024, 12, 31),
        ];
        let series = date_series("fecha".into(), &dates).unwrap();
        assert_eq!(series.dtype(), &DataType::Date);
        assert_eq!(series.null_count(), 1);
        assert_eq!(date_values(&series).unwrap(), dates);
    }

    #[test]
    fn test_date_values_rejects_text() {
        let series = Series::new("fecha".into(), &["2024-01-01"]);
        assert!(date_values(&series).is_err());
    }

    #[test]
    fn test_string_mode() {
        let series = Series::new("test".into(), &["a", "b", "a", "c", "a"]);
        assert_eq!(string_mode(&series), Some("a".to_string()));
    }

    #[test]
    fn test_string_mode_tie_takes_smallest() {
        let series = Series::new("test".into(), &[Some("pera"), Some("manzana"), None]);
        assert_eq!(string_mode(&series), Some("manzana".to_string()));
    }

    #[test]
    fn test_string_mode_all_null() {
        let series = Series::new("test".into(), &[None::<&str>, None]);
        assert_eq!(string_mode(&series), None);
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1i64), None, Some(3)]);
        let filled = fill_numeric_nulls(&series, 0.5).unwrap();

        assert_eq!(filled.dtype(), &DataType::Float64);
        assert_eq!(filled.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.5);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_fill_string_nulls() {
        let series = Series::new("test".into(), &[Some("a"), None]);
        let filled = fill_string_nulls(&series, "b").unwrap();
        let values: Vec<_> = filled.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("a"), Some("b")]);
    }

    #[test]
    fn test_collect_sample_values() {
        let series = Series::new("test".into(), &[Some("a"), None, Some("b"), Some("c")]);
        assert_eq!(collect_sample_values(&series, 2), vec!["a", "b"]);
    }
}
