//! Date normalization and calendar feature derivation.
//!
//! - [`DateNormalizer`] turns the configured date column into a `Date` column.
//! - [`CalendarFeatureDeriver`] appends the seven calendar columns derived
//!   from it.
//!
//! The derived columns are "system columns": they are produced here, never
//! imputed by the cleaner, and never considered as article or target
//! candidates.

mod dates;
mod features;

pub use dates::{DateColumnStatus, DateNormalizer, parse_date};
pub use features::{CalendarFeatureDeriver, CalendarFeatures};

/// Calendar year.
pub const COL_YEAR: &str = "año";
/// Month of the year, 1-12.
pub const COL_MONTH: &str = "mes";
/// Day of the month.
pub const COL_DAY: &str = "dia";
/// ISO-8601 week number.
pub const COL_ISO_WEEK: &str = "semana_año";
/// Weekday index, 0 = Monday .. 6 = Sunday.
pub const COL_WEEKDAY: &str = "dia_semana";
/// Localized weekday name.
pub const COL_WEEKDAY_NAME: &str = "nombre_dia";
/// Saturday or Sunday.
pub const COL_WEEKEND: &str = "es_fin_semana";

/// All derived calendar columns, in the order they are appended.
pub const SYSTEM_COLUMNS: [&str; 7] = [
    COL_YEAR,
    COL_MONTH,
    COL_DAY,
    COL_ISO_WEEK,
    COL_WEEKDAY,
    COL_WEEKDAY_NAME,
    COL_WEEKEND,
];

/// Check whether a column name is one of the derived calendar columns.
#[inline]
pub fn is_system_column(name: &str) -> bool {
    SYSTEM_COLUMNS.contains(&name)
}
