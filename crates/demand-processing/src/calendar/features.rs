//! Calendar feature derivation.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    COL_DAY, COL_ISO_WEEK, COL_MONTH, COL_WEEKDAY, COL_WEEKDAY_NAME, COL_WEEKEND, COL_YEAR,
};
use crate::config::{ProcessingConfig, WeekdayLanguage};
use crate::error::{Result, ResultExt};
use crate::utils::date_values;

const SPANISH_WEEKDAYS: [&str; 7] = [
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];

const ENGLISH_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Calendar attributes of a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub iso_week: u32,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: u32,
    pub is_weekend: bool,
}

impl CalendarFeatures {
    pub fn from_date(date: NaiveDate) -> Self {
        let weekday = date.weekday().num_days_from_monday();
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            iso_week: date.iso_week().week(),
            weekday,
            is_weekend: weekday >= 5,
        }
    }

    /// Localized name of the weekday.
    pub fn weekday_name(&self, language: WeekdayLanguage) -> &'static str {
        let names = match language {
            WeekdayLanguage::Spanish => &SPANISH_WEEKDAYS,
            WeekdayLanguage::English => &ENGLISH_WEEKDAYS,
        };
        names[self.weekday as usize % 7]
    }
}

/// Appends the seven calendar columns derived from the date column.
#[derive(Debug, Clone)]
pub struct CalendarFeatureDeriver {
    date_column: String,
    language: WeekdayLanguage,
}

impl Default for CalendarFeatureDeriver {
    fn default() -> Self {
        Self::new(&ProcessingConfig::default())
    }
}

impl CalendarFeatureDeriver {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            date_column: config.date_column.clone(),
            language: config.weekday_language,
        }
    }

    /// Check that the date column exists, is date-typed and has at least one
    /// value.
    pub fn can_derive(&self, df: &DataFrame) -> bool {
        df.column(&self.date_column).is_ok_and(|c| {
            matches!(c.dtype(), DataType::Date | DataType::Datetime(_, _))
                && c.null_count() < c.len()
        })
    }

    /// Return a copy of `df` with the calendar columns added.
    ///
    /// Returns `Ok(None)` when the date column is missing, not date-typed or
    /// entirely empty. Existing calendar columns are overwritten in place, so
    /// running the deriver twice gives the same frame. Rows without a date get
    /// nulls in every derived column.
    pub fn derive(&self, df: &DataFrame) -> Result<Option<DataFrame>> {
        if !self.can_derive(df) {
            debug!(
                "Skipping calendar features: '{}' missing, untyped or empty",
                self.date_column
            );
            return Ok(None);
        }

        let dates = date_values(df.column(&self.date_column)?.as_materialized_series())
            .context(format!("Reading date column '{}'", self.date_column))?;
        let features: Vec<Option<CalendarFeatures>> = dates
            .iter()
            .map(|d| d.map(CalendarFeatures::from_date))
            .collect();

        let int_column = |name: &str, f: fn(&CalendarFeatures) -> i32| -> Series {
            let values: Vec<Option<i32>> = features.iter().map(|c| c.as_ref().map(f)).collect();
            Series::new(name.into(), values)
        };

        let names: Vec<Option<&str>> = features
            .iter()
            .map(|c| c.map(|c| c.weekday_name(self.language)))
            .collect();
        let weekend: Vec<Option<bool>> = features.iter().map(|c| c.map(|c| c.is_weekend)).collect();

        let derived = [
            int_column(COL_YEAR, |c| c.year),
            int_column(COL_MONTH, |c| c.month as i32),
            int_column(COL_DAY, |c| c.day as i32),
            int_column(COL_ISO_WEEK, |c| c.iso_week as i32),
            int_column(COL_WEEKDAY, |c| c.weekday as i32),
            Series::new(COL_WEEKDAY_NAME.into(), names),
            Series::new(COL_WEEKEND.into(), weekend),
        ];

        let mut out = df.clone();
        for series in derived {
            out.with_column(series)?;
        }

        info!(
            "Derived {} calendar columns from '{}'",
            super::SYSTEM_COLUMNS.len(),
            self.date_column
        );
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::SYSTEM_COLUMNS;
    use crate::utils::date_series;
    use pretty_assertions::assert_eq;

    fn frame(dates: &[Option<NaiveDate>]) -> DataFrame {
        let fecha = date_series("fecha".into(), dates).unwrap();
        let demanda = Series::new("demanda".into(), vec![1.0; dates.len()]);
        DataFrame::new(vec![fecha.into(), demanda.into()]).unwrap()
    }

    #[test]
    fn test_from_date() {
        // 2024-12-30 is a Monday in ISO week 1 of 2025
        let f = CalendarFeatures::from_date(NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
        assert_eq!(f.year, 2024);
        assert_eq!(f.month, 12);
        assert_eq!(f.day, 30);
        assert_eq!(f.iso_week, 1);
        assert_eq!(f.weekday, 0);
        assert!(!f.is_weekend);
        assert_eq!(f.weekday_name(WeekdayLanguage::Spanish), "Lunes");
    }

    #[test]
    fn test_weekday_index_and_weekend_for_a_full_week() {
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        for offset in 0..7u32 {
            let date = monday + chrono::Days::new(offset as u64);
            let f = CalendarFeatures::from_date(date);
            assert_eq!(f.weekday, offset);
            assert_eq!(f.is_weekend, offset >= 5);
        }
        let sunday = CalendarFeatures::from_date(monday + chrono::Days::new(6));
        assert_eq!(sunday.weekday_name(WeekdayLanguage::Spanish), "Domingo");
        assert_eq!(sunday.weekday_name(WeekdayLanguage::English), "Sunday");
    }

    #[test]
    fn test_derive_appends_system_columns() {
        let df = frame(&[
            NaiveDate::from_ymd_opt(2024, 3, 9),
            None,
            NaiveDate::from_ymd_opt(2024, 3, 11),
        ]);

        let out = CalendarFeatureDeriver::default().derive(&df).unwrap().unwrap();

        let mut expected = vec!["fecha", "demanda"];
        expected.extend(SYSTEM_COLUMNS);
        assert_eq!(out.get_column_names_str(), expected);

        let weekday: Vec<_> = out.column(COL_WEEKDAY).unwrap().as_materialized_series().i32().unwrap().into_iter().collect();
        assert_eq!(weekday, vec![Some(5), None, Some(0)]);

        let weekend: Vec<_> = out.column(COL_WEEKEND).unwrap().as_materialized_series().bool().unwrap().into_iter().collect();
        assert_eq!(weekend, vec![Some(true), None, Some(false)]);

        let names: Vec<_> = out
            .column(COL_WEEKDAY_NAME)
            .unwrap().as_materialized_series().str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(names, vec![Some("Sábado"), None, Some("Lunes")]);
    }

    #[test]
    fn test_derive_twice_is_stable() {
        let df = frame(&[NaiveDate::from_ymd_opt(2024, 1, 1), NaiveDate::from_ymd_opt(2024, 1, 2)]);
        let deriver = CalendarFeatureDeriver::default();

        let once = deriver.derive(&df).unwrap().unwrap();
        let twice = deriver.derive(&once).unwrap().unwrap();

        assert_eq!(once.width(), twice.width());
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_derive_skips_without_valid_dates() {
        let deriver = CalendarFeatureDeriver::default();

        let all_null = frame(&[None, None]);
        assert!(deriver.derive(&all_null).unwrap().is_none());

        let text = df!["fecha" => ["2024-01-01"]].unwrap();
        assert!(deriver.derive(&text).unwrap().is_none());

        let no_date = df!["demanda" => [1]].unwrap();
        assert!(deriver.derive(&no_date).unwrap().is_none());
    }
}
