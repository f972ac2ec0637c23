//! Dataset summaries for display.
//!
//! This module answers the questions a user asks right after an upload:
//! how big is the table, which columns are numeric, categorical or dates,
//! which columns came from the file and which were derived, and what the
//! demand looks like.
//!
//! - [`DatasetSummary`] - shape, column groups and per-column info
//! - [`ExploratoryStats`] - demand statistics, per-article aggregates and
//!   the monthly trend
//! - [`TablePreview`] - the head of the original and derived columns

mod exploratory;
mod preview;

pub use exploratory::{ArticleAggregate, DemandStats, ExploratoryStats, MonthlyDemand};
pub use preview::{PREVIEW_ORIGINAL_ROWS, PREVIEW_SYSTEM_ROWS, TablePreview};

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calendar::is_system_column;
use crate::utils::{DtypeCategory, collect_sample_values, get_dtype_category};

const SAMPLE_VALUES: usize = 3;

/// Information about a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Polars dtype as text, e.g. `"f64"` or `"date"`.
    pub dtype: String,
    pub category: DtypeCategory,
    pub null_count: usize,
    /// Derived calendar column.
    pub is_system: bool,
    /// First few non-null values, rendered as text.
    pub sample_values: Vec<String>,
}

/// Shape and column groups of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub date_columns: Vec<String>,
    /// Columns that came from the uploaded file.
    pub original_columns: Vec<String>,
    /// Derived calendar columns present in the table.
    pub system_columns: Vec<String>,
    pub column_info: Vec<ColumnInfo>,
}

impl DatasetSummary {
    /// Summarize `df`. Column lists keep table order.
    pub fn from_frame(df: &DataFrame) -> Self {
        let mut summary = Self {
            rows: df.height(),
            columns: df.width(),
            numeric_columns: Vec::new(),
            categorical_columns: Vec::new(),
            date_columns: Vec::new(),
            original_columns: Vec::new(),
            system_columns: Vec::new(),
            column_info: Vec::with_capacity(df.width()),
        };

        for column in df.get_columns() {
            let name = column.name().to_string();
            let category = get_dtype_category(column.dtype());
            let is_system = is_system_column(&name);

            match category {
                DtypeCategory::Numeric => summary.numeric_columns.push(name.clone()),
                DtypeCategory::Text => summary.categorical_columns.push(name.clone()),
                DtypeCategory::Datetime => summary.date_columns.push(name.clone()),
                DtypeCategory::Boolean | DtypeCategory::Other => {}
            }

            if is_system {
                summary.system_columns.push(name.clone());
            } else {
                summary.original_columns.push(name.clone());
            }

            summary.column_info.push(ColumnInfo {
                name,
                dtype: column.dtype().to_string(),
                category,
                null_count: column.null_count(),
                is_system,
                sample_values: collect_sample_values(column.as_materialized_series(), SAMPLE_VALUES),
            });
        }

        summary
    }

    /// Total missing cells across the table.
    pub fn total_nulls(&self) -> usize {
        self.column_info.iter().map(|c| c.null_count).sum()
    }

    /// Whether any calendar column has been derived.
    pub fn has_calendar_features(&self) -> bool {
        !self.system_columns.is_empty()
    }
}
