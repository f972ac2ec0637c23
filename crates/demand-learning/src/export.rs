//! Spreadsheet report of a forecast.
//!
//! The report is an in-memory `.xlsx` workbook with two sheets:
//!
//! - `Forecast`: `Date`, `Demand`, `Type` for every historical and predicted
//!   day, in chronological order, tagged `Historical` or `Prediction`
//! - `Summary`: `Metric` / `Value` pairs describing the run
//!
//! [`read_forecast_sheet`] and [`read_summary_sheet`] parse a report back,
//! which is how the round trip is tested.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LearningError, Result};
use crate::types::{ForecastResult, PointKind};

/// Suggested file name for downloads.
pub const DEFAULT_REPORT_NAME: &str = "prediccion_demanda.xlsx";

/// MIME type of the report.
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const FORECAST_SHEET: &str = "Forecast";
pub const SUMMARY_SHEET: &str = "Summary";

const FORECAST_HEADERS: [&str; 3] = ["Date", "Demand", "Type"];
const SUMMARY_HEADERS: [&str; 2] = ["Metric", "Value"];

/// One row of the `Forecast` sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub demand: f64,
    pub kind: PointKind,
}

/// Writes forecast reports.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    date_format: String,
}

impl Default for ReportExporter {
    fn default() -> Self {
        Self {
            date_format: "yyyy-mm-dd".to_string(),
        }
    }
}

impl ReportExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Excel number format for the `Date` column.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Serialize `result` into workbook bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::Export`] if the workbook cannot be written.
    /// No bytes are returned in that case.
    pub fn export(&self, result: &ForecastResult) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name(FORECAST_SHEET)?;
        self.write_forecast(sheet, result)?;

        let sheet = workbook.add_worksheet();
        sheet.set_name(SUMMARY_SHEET)?;
        write_summary(sheet, result)?;

        let bytes = workbook.save_to_buffer()?;
        info!(
            "Exported report with {} row(s) ({} bytes)",
            result.total_rows(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn write_forecast(&self, sheet: &mut Worksheet, result: &ForecastResult) -> Result<()> {
        let header = Format::new().set_bold();
        let date_format = Format::new().set_num_format(&self.date_format);

        for (col, name) in FORECAST_HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, &header)?;
        }

        for (i, (point, kind)) in result.combined().iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_datetime_with_format(row, 0, &point.date, &date_format)?;
            sheet.write_number(row, 1, point.value)?;
            sheet.write_string(row, 2, kind.as_str())?;
        }

        sheet.set_column_width(0, 12)?;
        Ok(())
    }
}

fn write_summary(sheet: &mut Worksheet, result: &ForecastResult) -> Result<()> {
    let header = Format::new().set_bold();
    for (col, name) in SUMMARY_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    sheet.write_string(1, 0, "Article")?;
    sheet.write_string(1, 1, result.filter.to_string())?;
    sheet.write_string(2, 0, "Horizon (days)")?;
    sheet.write_number(2, 1, result.horizon as f64)?;
    sheet.write_string(3, 0, "Model")?;
    sheet.write_string(3, 1, &result.model)?;
    sheet.write_string(4, 0, "Total rows")?;
    sheet.write_number(4, 1, result.total_rows() as f64)?;

    sheet.set_column_width(0, 16)?;
    sheet.set_column_width(1, 34)?;
    Ok(())
}

fn sheet_rows(bytes: &[u8], sheet: &str) -> Result<Vec<Vec<Data>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| LearningError::Export(e.to_string()))?;
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| LearningError::Export(format!("sheet '{}': {}", sheet, e)))?;
    Ok(range.rows().skip(1).map(<[Data]>::to_vec).collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Read the `Forecast` sheet of a report.
pub fn read_forecast_sheet(bytes: &[u8]) -> Result<Vec<ReportRow>> {
    sheet_rows(bytes, FORECAST_SHEET)?
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let bad = |what: &str| LearningError::Export(format!("row {}: bad {}", i + 2, what));
            let date = match row.first() {
                Some(Data::DateTime(dt)) => dt.as_datetime().map(|dt| dt.date()),
                Some(Data::DateTimeIso(s)) => s.get(..10).and_then(|s| s.parse().ok()),
                _ => None,
            }
            .ok_or_else(|| bad("date"))?;
            let demand = match row.get(1) {
                Some(Data::Float(f)) => Some(*f),
                Some(Data::Int(i)) => Some(*i as f64),
                _ => None,
            }
            .ok_or_else(|| bad("demand"))?;
            let kind = row
                .get(2)
                .and_then(|cell| PointKind::from_tag(&cell_text(cell)))
                .ok_or_else(|| bad("type tag"))?;
            Ok(ReportRow { date, demand, kind })
        })
        .collect()
}

/// Read the `Summary` sheet of a report as `(metric, value)` text pairs.
pub fn read_summary_sheet(bytes: &[u8]) -> Result<Vec<(String, String)>> {
    Ok(sheet_rows(bytes, SUMMARY_SHEET)?
        .iter()
        .map(|row| {
            let text = |idx: usize| row.get(idx).map(cell_text).unwrap_or_default();
            (text(0), text(1))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ArticleFilter, ForecastPoint};
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn result() -> ForecastResult {
        ForecastResult {
            historical: vec![ForecastPoint::new(date(1), 12.0), ForecastPoint::new(date(2), 14.5)],
            forecast: vec![
                ForecastPoint::new(date(3), 13.25),
                ForecastPoint::new(date(4), 13.75),
                ForecastPoint::new(date(5), 12.0),
            ],
            filter: ArticleFilter::Article("Huevos".into()),
            horizon: 3,
            model: "RandomForest (n_estimators=100)".to_string(),
            feature_importance: Vec::new(),
        }
    }

    #[test]
    fn test_forecast_sheet_round_trip() {
        let bytes = ReportExporter::default().export(&result()).unwrap();
        assert!(!bytes.is_empty());

        let rows = read_forecast_sheet(&bytes).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].date, date(1));
        assert_eq!(rows[1].demand, 14.5);
        assert_eq!(
            rows.iter().map(|r| r.kind).collect::<Vec<_>>(),
            vec![
                PointKind::Historical,
                PointKind::Historical,
                PointKind::Prediction,
                PointKind::Prediction,
                PointKind::Prediction,
            ]
        );
    }

    #[test]
    fn test_summary_sheet() {
        let bytes = ReportExporter::default().export(&result()).unwrap();
        let summary = read_summary_sheet(&bytes).unwrap();
        assert_eq!(
            summary,
            vec![
                ("Article".to_string(), "Huevos".to_string()),
                ("Horizon (days)".to_string(), "3".to_string()),
                (
                    "Model".to_string(),
                    "RandomForest (n_estimators=100)".to_string()
                ),
                ("Total rows".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_read_rejects_non_workbook() {
        let err = read_forecast_sheet(b"plain text").unwrap_err();
        assert_eq!(err.error_code(), "EXPORT_ERROR");
    }

    #[test]
    fn test_empty_forecast_still_has_headers() {
        let empty = ForecastResult {
            historical: Vec::new(),
            forecast: Vec::new(),
            ..result()
        };
        let bytes = ReportExporter::default().export(&empty).unwrap();
        assert!(read_forecast_sheet(&bytes).unwrap().is_empty());
    }
}
