//! Head-of-table previews.

use polars::prelude::*;

use crate::calendar::is_system_column;

/// Rows of the original columns shown in a preview.
pub const PREVIEW_ORIGINAL_ROWS: usize = 30;

/// Rows of the derived calendar columns shown in a preview.
pub const PREVIEW_SYSTEM_ROWS: usize = 10;

/// The head of a table, split into uploaded and derived columns.
#[derive(Debug, Clone)]
pub struct TablePreview {
    /// Original columns, first [`PREVIEW_ORIGINAL_ROWS`] rows.
    pub original: DataFrame,
    /// Calendar columns, first [`PREVIEW_SYSTEM_ROWS`] rows. `None` when the
    /// table has none.
    pub system: Option<DataFrame>,
}

impl TablePreview {
    /// Build a preview with the default row counts.
    pub fn from_frame(df: &DataFrame) -> PolarsResult<Self> {
        Self::with_rows(df, PREVIEW_ORIGINAL_ROWS, PREVIEW_SYSTEM_ROWS)
    }

    /// Build a preview with custom row counts.
    pub fn with_rows(df: &DataFrame, original_rows: usize, system_rows: usize) -> PolarsResult<Self> {
        let (system, original): (Vec<&str>, Vec<&str>) = df
            .get_column_names_str()
            .into_iter()
            .partition(|name| is_system_column(name));

        let original = df.select(original)?.head(Some(original_rows));
        let system = if system.is_empty() {
            None
        } else {
            Some(df.select(system)?.head(Some(system_rows)))
        };

        Ok(Self { original, system })
    }
}
