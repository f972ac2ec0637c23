//! Table Inspection Handlers
//!
//! Read-only views of the loaded table:
//! - Row slices (for scrolling through the whole table)
//! - The preview: first rows of the original columns and of the calendar
//!   columns, shown separately
//! - The dataset summary with exploratory statistics

use demand_processing::summary::{DatasetSummary, ExploratoryStats, TablePreview};
use polars::prelude::{AnyValue, DataFrame};
use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::{CommandError, CommandResult};
use crate::state::Session;

// ============================================================================
// TYPES
// ============================================================================

/// A single row of cell values.
pub type Row = Vec<Value>;

/// A slice of table rows.
///
/// * `rows` - 2D array of cell values: rows[rowIndex][colIndex]
/// * `start` - The starting row index (0-indexed) of this batch
/// * `total_rows` - Total rows in the table
#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub start: usize,
    pub total_rows: usize,
}

/// The two preview grids.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    /// First rows of the uploaded columns.
    pub original: RowsResponse,
    /// First rows of the calendar columns, when they were derived.
    pub system: Option<RowsResponse>,
}

/// Everything the overview screen shows.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub file_name: String,
    pub summary: DatasetSummary,
    pub statistics: ExploratoryStats,
    pub processing_steps: Vec<String>,
    pub article_column: Option<String>,
    pub article_strategy: Option<String>,
    pub target_column: Option<String>,
    pub roster: Vec<String>,
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Converts a Polars `AnyValue` to a JSON `Value`.
///
/// # Type Mapping
///
/// | Polars Type | JSON Type           |
/// |-------------|---------------------|
/// | Null        | null                |
/// | Boolean     | boolean             |
/// | Int / UInt  | number              |
/// | Float32/64  | number              |
/// | String      | string              |
/// | Date        | string (YYYY-MM-DD) |
/// | Other       | string              |
///
/// NaN and Infinity become `null`.
fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),

        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),
        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),

        AnyValue::Float32(f) => Number::from_f64(f64::from(f))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),

        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),

        // Date displays as YYYY-MM-DD; Datetime, Duration and nested types
        // use their Display form as well
        _ => Value::String(format!("{}", value)),
    }
}

/// Convert rows `start..start + count` of `df`, clamped to the table.
fn rows_response(df: &DataFrame, start: usize, count: usize) -> RowsResponse {
    let total_rows = df.height();
    let start = start.min(total_rows.saturating_sub(1));
    let actual_count = count.min(total_rows.saturating_sub(start));
    let columns = df
        .get_column_names_str()
        .into_iter()
        .map(str::to_string)
        .collect();

    let sliced = df.slice(start as i64, actual_count);
    let rows = (0..sliced.height())
        .map(|row_idx| {
            sliced
                .get_columns()
                .iter()
                .map(|col| col.get(row_idx).ok().map_or(Value::Null, any_value_to_json))
                .collect()
        })
        .collect();

    RowsResponse {
        columns,
        rows,
        start,
        total_rows,
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Fetch a slice of the loaded table.
///
/// Returns `None` when nothing is loaded. `start` past the end is clamped to
/// the last row and `count` to the rows available.
pub fn get_rows(session: &Session, start: usize, count: usize) -> Option<RowsResponse> {
    let loaded = session.loaded()?;
    Some(rows_response(&loaded.table.data, start, count))
}

/// The preview grids: 30 rows of original columns, 10 of calendar columns.
pub fn get_preview(session: &Session) -> CommandResult<PreviewResponse> {
    let loaded = session.loaded().ok_or(CommandError::NoDataLoaded)?;
    let preview = TablePreview::from_frame(&loaded.table.data)
        .map_err(demand_processing::ProcessingError::from)?;

    Ok(PreviewResponse {
        original: rows_response(&preview.original, 0, preview.original.height()),
        system: preview
            .system
            .as_ref()
            .map(|system| rows_response(system, 0, system.height())),
    })
}

/// Dataset summary, exploratory statistics and detected roles.
pub fn get_summary(session: &Session) -> CommandResult<SummaryResponse> {
    let loaded = session.loaded().ok_or(CommandError::NoDataLoaded)?;
    let table = &loaded.table;
    let statistics = ExploratoryStats::compute(
        &table.data,
        &table.roles,
        &session.processing_config.date_column,
    )?;

    Ok(SummaryResponse {
        file_name: loaded.file_info.name.clone(),
        summary: table.summary(),
        statistics,
        processing_steps: table.processing_steps(),
        article_column: table.roles.article.as_ref().map(|a| a.column.clone()),
        article_strategy: table
            .roles
            .article
            .as_ref()
            .map(|a| a.strategy.as_str().to_string()),
        target_column: table.roles.target.clone(),
        roster: session.roster().entries().to_vec(),
    })
}
