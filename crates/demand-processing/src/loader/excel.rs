//! Excel (`.xlsx` / `.xls`) parsing with calamine.
//!
//! Only the first worksheet is read and its first row is the header. Each
//! column gets one typed representation picked from its non-empty cells:
//!
//! | Cells                         | Column dtype          |
//! |-------------------------------|-----------------------|
//! | numbers, all integral         | `Int64`               |
//! | numbers                       | `Float64`             |
//! | dates / date-times            | `Datetime(ms)`        |
//! | booleans                      | `Boolean`             |
//! | anything else, or mixed       | `String`              |
//!
//! Empty cells, error cells and text cells holding one of the CSV
//! [`MISSING_MARKERS`](super::csv::MISSING_MARKERS) are nulls.

use std::collections::HashSet;
use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

use super::csv::MISSING_MARKERS;

static EMPTY_CELL: Data = Data::Empty;

/// Parse workbook bytes into a DataFrame.
pub fn read_excel_bytes(bytes: &[u8]) -> Result<DataFrame, String> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| e.to_string())?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "workbook has no worksheets".to_string())?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| e.to_string())?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| format!("worksheet '{sheet_name}' is empty (no header row)"))?;

    let headers = header_names(header_row);
    let body: Vec<&[Data]> = rows.collect();

    let columns = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
                .collect();
            build_column(name, &cells)
        })
        .collect::<PolarsResult<Vec<Column>>>()
        .map_err(|e| e.to_string())?;

    DataFrame::new(columns).map_err(|e| e.to_string())
}

/// Header names from the first row; blanks become `column_{n}` and repeated
/// names get a numeric suffix so every column name is unique.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    row.iter()
        .enumerate()
        .map(|(idx, cell)| {
            let raw = cell_text(cell).unwrap_or_default();
            let base = if raw.trim().is_empty() {
                format!("column_{}", idx + 1)
            } else {
                raw.trim().to_string()
            };

            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}_{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Integer,
    Float,
    DateTime,
    Boolean,
    Text,
}

fn is_missing_marker(s: &str) -> bool {
    MISSING_MARKERS.contains(&s.trim())
}

fn cell_kind(cell: &Data) -> Option<CellKind> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if is_missing_marker(s) => None,
        Data::Int(_) => Some(CellKind::Integer),
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(CellKind::Integer),
        Data::Float(_) => Some(CellKind::Float),
        Data::Bool(_) => Some(CellKind::Boolean),
        Data::DateTime(dt) if !dt.is_duration() => Some(CellKind::DateTime),
        Data::DateTimeIso(s) if parse_iso_datetime(s).is_some() => Some(CellKind::DateTime),
        _ => Some(CellKind::Text),
    }
}

/// Pick the column kind from the kinds of its non-empty cells.
fn column_kind(cells: &[&Data]) -> CellKind {
    let mut kind: Option<CellKind> = None;
    for next in cells.iter().filter_map(|c| cell_kind(c)) {
        kind = Some(match (kind, next) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(CellKind::Integer), CellKind::Float) | (Some(CellKind::Float), CellKind::Integer) => {
                CellKind::Float
            }
            _ => return CellKind::Text,
        });
    }
    kind.unwrap_or(CellKind::Text)
}

fn build_column(name: &str, cells: &[&Data]) -> PolarsResult<Column> {
    let name: PlSmallStr = name.into();
    let series = match column_kind(cells) {
        CellKind::Integer => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    Data::Int(i) => Some(*i),
                    Data::Float(f) => Some(*f as i64),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        CellKind::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|c| match c {
                    Data::Int(i) => Some(*i as f64),
                    Data::Float(f) => Some(*f),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        CellKind::Boolean => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|c| match c {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        CellKind::DateTime => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| cell_datetime(c).map(|dt| dt.and_utc().timestamp_millis()))
                .collect();
            Series::new(name, values)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        CellKind::Text => {
            let values: Vec<Option<String>> = cells.iter().map(|c| cell_text(c)).collect();
            Series::new(name, values)
        }
    };
    Ok(series.into())
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn cell_datetime(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime(),
        Data::DateTimeIso(s) => parse_iso_datetime(s),
        _ => None,
    }
}

/// Text rendering of a cell, as shown to a user.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if is_missing_marker(s) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell_datetime(cell).map(|dt| {
            if dt.time() == chrono::NaiveTime::MIN {
                dt.format("%Y-%m-%d").to_string()
            } else {
                dt.format("%Y-%m-%d %H:%M:%S").to_string()
            }
        }),
        Data::DurationIso(s) => Some(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::{Format, Workbook};

    fn sample_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        sheet.set_name("ventas").unwrap();

        for (col, header) in ["fecha", "producto", "demanda", "precio"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *header).unwrap();
        }

        let rows = [
            (NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "pan", 10.0, 1.5),
            (NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(), "leche", 12.0, 0.9),
        ];
        for (i, (date, product, demand, price)) in rows.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet
                .write_datetime_with_format(row, 0, date, &date_format)
                .unwrap();
            sheet.write_string(row, 1, *product).unwrap();
            sheet.write_number(row, 2, *demand).unwrap();
            sheet.write_number(row, 3, *price).unwrap();
        }
        // third row with missing demand
        sheet
            .write_datetime_with_format(
                3,
                0,
                &NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
                &date_format,
            )
            .unwrap();
        sheet.write_string(3, 1, "pan").unwrap();
        sheet.write_number(3, 3, 1.5).unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_typed_columns() {
        let df = read_excel_bytes(&sample_workbook()).unwrap();

        assert_eq!(df.shape(), (3, 4));
        assert_eq!(
            df.get_column_names_str(),
            vec!["fecha", "producto", "demanda", "precio"]
        );
        assert!(matches!(
            df.column("fecha").unwrap().dtype(),
            DataType::Datetime(TimeUnit::Milliseconds, None)
        ));
        assert_eq!(df.column("producto").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("demanda").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("demanda").unwrap().null_count(), 1);
        assert_eq!(df.column("precio").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_header_names_dedup_and_blank() {
        let row = vec![
            Data::String("a".to_string()),
            Data::Empty,
            Data::String("a".to_string()),
            Data::Int(7),
        ];
        assert_eq!(header_names(&row), vec!["a", "column_2", "a_1", "7"]);
    }

    #[test]
    fn test_mixed_column_is_text() {
        let cells = [Data::Int(101), Data::String("A-7".to_string()), Data::Empty];
        let refs: Vec<&Data> = cells.iter().collect();
        assert_eq!(column_kind(&refs), CellKind::Text);

        let column = build_column("sku", &refs).unwrap();
        let values: Vec<_> = column
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some("101"), Some("A-7"), None]);
    }

    #[test]
    fn test_missing_marker_cells_keep_numeric_column() {
        let cells = [
            Data::Int(12),
            Data::String("NA".to_string()),
            Data::String(" n/a ".to_string()),
            Data::Int(9),
        ];
        let refs: Vec<&Data> = cells.iter().collect();
        assert_eq!(column_kind(&refs), CellKind::Integer);

        let column = build_column("demanda", &refs).unwrap();
        assert_eq!(column.dtype(), &DataType::Int64);
        assert_eq!(column.null_count(), 2);
    }

    #[test]
    fn test_int_and_float_widen_to_float() {
        let cells = [Data::Int(1), Data::Float(2.5)];
        let refs: Vec<&Data> = cells.iter().collect();
        assert_eq!(column_kind(&refs), CellKind::Float);
    }

    #[test]
    fn test_not_a_workbook() {
        assert!(read_excel_bytes(b"fecha,demanda\n").is_err());
    }
}
