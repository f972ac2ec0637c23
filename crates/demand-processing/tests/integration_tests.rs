//! Integration tests for loading and processing demand tables.
//!
//! These tests run the loader and the full pipeline over fixture files and
//! in-memory workbooks.

use demand_processing::calendar::{COL_WEEKDAY, COL_WEEKDAY_NAME, COL_WEEKEND, COL_YEAR};
use demand_processing::summary::{PREVIEW_ORIGINAL_ROWS, PREVIEW_SYSTEM_ROWS};
use demand_processing::{
    DateColumnStatus, DetectionStrategy, ExploratoryStats, ImputationAction, ProcessingConfig,
    ProcessingError, ProcessingPipeline, SYSTEM_COLUMNS, TableLoader, TablePreview, auto_process,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(loader: &TableLoader, filename: &str) -> DataFrame {
    let bytes = std::fs::read(fixtures_path().join(filename)).expect("Failed to read fixture");
    loader.load(filename, &bytes).expect("Failed to load fixture")
}

fn weekday_index(df: &DataFrame, row: usize) -> Option<i32> {
    df.column(COL_WEEKDAY)
        .unwrap()
        .as_materialized_series()
        .i32()
        .unwrap()
        .get(row)
}

// ============================================================================
// CSV Fixtures
// ============================================================================

#[test]
fn test_full_pipeline_on_sales_fixture() {
    let df = load_fixture(&TableLoader::default(), "ventas.csv");
    assert_eq!(df.shape(), (60, 5));
    assert_eq!(df.column("demanda").unwrap().null_count(), 2);

    let processed = auto_process(&df).unwrap();

    // 2 of 60 missing = 3.3% -> median fill
    let decision = processed.cleaning.decision("demanda").unwrap();
    assert!(matches!(decision.action, ImputationAction::FilledMedian(_)));
    assert_eq!(processed.data.column("demanda").unwrap().null_count(), 0);

    assert_eq!(
        processed.date_status,
        DateColumnStatus::Parsed {
            parsed: 60,
            failed: 0
        }
    );
    assert!(processed.calendar_features);
    for name in SYSTEM_COLUMNS {
        assert!(processed.data.column(name).is_ok(), "missing {name}");
    }

    // 01/01/2024 was a Monday
    assert_eq!(weekday_index(&processed.data, 0), Some(0));
    let names = processed.data.column(COL_WEEKDAY_NAME).unwrap();
    assert_eq!(
        names.as_materialized_series().str().unwrap().get(0),
        Some("Lunes")
    );

    let article = processed.roles.article.clone().unwrap();
    assert_eq!(article.column, "producto");
    assert_eq!(article.strategy, DetectionStrategy::ExactName);
    assert_eq!(
        processed.roles.roster.entries(),
        &["All", "Pan integral", "Leche entera", "Huevos"]
    );
    assert_eq!(processed.roles.target.as_deref(), Some("demanda"));
}

#[test]
fn test_weekday_and_weekend_match_dates() {
    let df = load_fixture(&TableLoader::default(), "ventas.csv");
    let processed = auto_process(&df).unwrap();

    let dates = processed.data.column("fecha").unwrap().as_materialized_series();
    let days = dates.cast(&DataType::Int32).unwrap();
    let weekend = processed.data.column(COL_WEEKEND).unwrap().as_materialized_series();

    for row in 0..processed.data.height() {
        let epoch_day = days.i32().unwrap().get(row).unwrap();
        // 1970-01-01 was a Thursday (index 3)
        let expected = (epoch_day + 3).rem_euclid(7);
        assert_eq!(weekday_index(&processed.data, row), Some(expected));
        assert_eq!(weekend.bool().unwrap().get(row), Some(expected >= 5));
    }
}

#[test]
fn test_pipeline_twice_is_stable() {
    let df = load_fixture(&TableLoader::default(), "ventas.csv");
    let once = auto_process(&df).unwrap();
    let twice = auto_process(&once.data).unwrap();

    assert_eq!(once.data.get_column_names(), twice.data.get_column_names());
    assert!(once.data.equals_missing(&twice.data));
    assert_eq!(once.roles, twice.roles);
}

#[test]
fn test_semicolon_file_without_dates() {
    let config = ProcessingConfig::builder().csv_separator(b';').build().unwrap();
    let df = load_fixture(&TableLoader::new(&config), "sin_fecha.csv");
    assert_eq!(df.shape(), (20, 3));

    let processed = ProcessingPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(&df)
        .unwrap();

    // 5 of 20 missing = 25% -> left alone
    assert_eq!(
        processed.cleaning.decision("unidades").unwrap().action,
        ImputationAction::AboveThreshold
    );
    assert_eq!(processed.date_status, DateColumnStatus::Missing);
    assert!(!processed.calendar_features);
    assert!(processed.data.column(COL_YEAR).is_err());
    assert_eq!(processed.roles.article.unwrap().column, "sku");
    assert_eq!(processed.roles.target, None);
}

#[test]
fn test_hundred_rows_three_products() {
    let products = ["pan", "leche", "huevos"];
    let mut csv = String::from("fecha,producto,demanda\n");
    for i in 0..100 {
        csv.push_str(&format!("2024-03-{:02},{},{}\n", i % 28 + 1, products[i % 3], i));
    }

    let df = TableLoader::default().load("ventas.csv", csv.as_bytes()).unwrap();
    let processed = auto_process(&df).unwrap();

    let article = processed.roles.article.unwrap();
    assert_eq!(article.column, "producto");
    assert_eq!(article.strategy, DetectionStrategy::ExactName);
    assert_eq!(processed.roles.roster.len(), 4);
}

// ============================================================================
// Summaries
// ============================================================================

#[test]
fn test_summary_and_preview_of_processed_table() {
    let df = load_fixture(&TableLoader::default(), "ventas.csv");
    let processed = auto_process(&df).unwrap();

    let summary = processed.summary();
    assert_eq!(summary.rows, 60);
    assert_eq!(summary.original_columns.len(), 5);
    assert_eq!(summary.system_columns.len(), SYSTEM_COLUMNS.len());
    assert_eq!(summary.date_columns, vec!["fecha"]);

    let preview = TablePreview::from_frame(&processed.data).unwrap();
    assert_eq!(preview.original.height(), PREVIEW_ORIGINAL_ROWS);
    assert_eq!(preview.system.unwrap().height(), PREVIEW_SYSTEM_ROWS);

    let stats = ExploratoryStats::compute(&processed.data, &processed.roles, "fecha").unwrap();
    assert_eq!(stats.demand.unwrap().count, 60);
    assert_eq!(stats.by_article.len(), 3);
    assert_eq!(stats.by_article.iter().map(|a| a.count).sum::<usize>(), 60);
    assert_eq!(stats.monthly.len(), 1);
    assert_eq!(stats.monthly[0].month, "2024-01");
}

// ============================================================================
// Excel and Error Cases
// ============================================================================

#[test]
fn test_workbook_upload_keeps_typed_dates() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "fecha").unwrap();
    sheet.write_string(0, 1, "sku").unwrap();
    sheet.write_string(0, 2, "demanda").unwrap();
    let date_format = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
    for row in 1..=12u32 {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 5, row).unwrap();
        sheet.write_datetime_with_format(row, 0, &date, &date_format).unwrap();
        sheet.write_string(row, 1, if row % 2 == 0 { "A" } else { "B" }).unwrap();
        sheet.write_number(row, 2, row as f64 * 1.5).unwrap();
    }
    let bytes = workbook.save_to_buffer().unwrap();

    let df = TableLoader::default().load("Ventas.XLSX", &bytes).unwrap();
    assert_eq!(df.height(), 12);

    let processed = auto_process(&df).unwrap();
    assert_eq!(processed.date_status, DateColumnStatus::AlreadyTyped);
    assert!(processed.calendar_features);
    assert_eq!(processed.roles.roster.entries(), &["All", "B", "A"]);
}

#[test]
fn test_loader_errors() {
    let loader = TableLoader::default();

    let err = loader.load("ventas.json", b"{}").unwrap_err();
    assert!(matches!(err, ProcessingError::UnsupportedFormat(_)));
    assert!(err.is_input_error());

    let err = loader.load("ventas.xlsx", b"not a workbook").unwrap_err();
    assert!(matches!(err, ProcessingError::ParseError { .. }));

    let err = loader.load("ventas.csv", b"").unwrap_err();
    assert_eq!(err.error_code(), "PARSE_ERROR");
}
