//! Integration tests for forecasting processed tables and exporting reports.

use chrono::{Days, NaiveDate};
use demand_learning::{
    ArticleFilter, ForecastConfig, ForecastEngine, LearningError, PointKind, ReportExporter,
    read_forecast_sheet, read_summary_sheet,
};
use demand_processing::{TableLoader, auto_process};
use pretty_assertions::assert_eq;

// ============================================================================
// Helper Functions
// ============================================================================

fn first_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

/// Daily CSV in `dd/mm/yyyy`, one row per article and day.
fn daily_csv(days: u64, articles: &[&str]) -> String {
    let mut csv = String::from("fecha,producto,demanda\n");
    for day in 0..days {
        let date = first_day() + Days::new(day);
        for (a, article) in articles.iter().enumerate() {
            let demand = 20 + (day % 7) * 3 + a as u64 * 10;
            csv.push_str(&format!("{},{},{}\n", date.format("%d/%m/%Y"), article, demand));
        }
    }
    csv
}

fn processed(csv: &str) -> demand_processing::ProcessedTable {
    let df = TableLoader::default().load("ventas.csv", csv.as_bytes()).unwrap();
    auto_process(&df).unwrap()
}

fn engine() -> ForecastEngine {
    ForecastEngine::new(ForecastConfig::builder().n_estimators(20).build().unwrap())
}

// ============================================================================
// Forecasting
// ============================================================================

#[test]
fn test_fifteen_days_horizon_seven() {
    let table = processed(&daily_csv(15, &["Pan"]));
    let result = ForecastEngine::default()
        .forecast(&table.data, Some("producto"), &ArticleFilter::All, 7)
        .unwrap();

    assert_eq!(result.historical.len(), 15);
    assert_eq!(result.forecast.len(), 7);
    assert_eq!(result.model, "RandomForest (n_estimators=100)");

    let last = result.last_historical_date().unwrap();
    assert_eq!(last, first_day() + Days::new(14));
    for (offset, point) in result.forecast.iter().enumerate() {
        assert_eq!(point.date, last + Days::new(offset as u64 + 1));
    }
}

#[test]
fn test_article_selected_from_roster() {
    let table = processed(&daily_csv(20, &["Pan", "Leche"]));
    assert_eq!(table.roles.roster.entries(), &["All", "Pan", "Leche"]);

    let article_column = table.roles.article.as_ref().map(|a| a.column.as_str());
    let filter = ArticleFilter::from_roster_entry(&table.roles.roster.entries()[2]);
    let result = engine()
        .forecast(&table.data, article_column, &filter, 10)
        .unwrap();

    assert_eq!(result.historical.len(), 20);
    // every 'Leche' value is at least 30
    assert!(result.historical.iter().all(|p| p.value >= 30.0));
    assert!(result.forecast.iter().all(|p| p.value >= 30.0));
}

#[test]
fn test_too_few_rows_for_article() {
    let table = processed(&daily_csv(9, &["Pan", "Leche"]));
    let err = engine()
        .forecast(
            &table.data,
            Some("producto"),
            &ArticleFilter::Article("Pan".into()),
            7,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        LearningError::InsufficientData {
            available: 9,
            required: 10
        }
    ));
    assert_eq!(err.error_code(), "INSUFFICIENT_DATA");
}

#[test]
fn test_processed_and_raw_tables_agree() {
    let csv = daily_csv(25, &["Pan"]);
    let raw = TableLoader::default().load("ventas.csv", csv.as_bytes()).unwrap();
    let table = processed(&csv);

    // stored calendar columns and freshly derived features are the same
    let from_raw = engine().forecast(&raw, None, &ArticleFilter::All, 14).unwrap();
    let from_processed = engine()
        .forecast(&table.data, None, &ArticleFilter::All, 14)
        .unwrap();
    assert_eq!(from_raw.forecast, from_processed.forecast);
}

#[test]
fn test_horizon_bounds_are_checked_by_config() {
    let config = ForecastConfig::default();
    assert!(config.check_horizon(6).is_err());
    assert!(config.check_horizon(7).is_ok());
    assert!(config.check_horizon(365).is_ok());
    assert!(config.check_horizon(366).is_err());
}

// ============================================================================
// Report Export
// ============================================================================

#[test]
fn test_export_then_read_back() {
    let table = processed(&daily_csv(15, &["Pan"]));
    let result = engine()
        .forecast(&table.data, None, &ArticleFilter::All, 7)
        .unwrap();

    let bytes = ReportExporter::default().export(&result).unwrap();
    let rows = read_forecast_sheet(&bytes).unwrap();

    assert_eq!(rows.len(), result.total_rows());
    let historical = rows.iter().filter(|r| r.kind == PointKind::Historical).count();
    let predicted = rows.iter().filter(|r| r.kind == PointKind::Prediction).count();
    assert_eq!((historical, predicted), (15, 7));
    assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));

    let summary = read_summary_sheet(&bytes).unwrap();
    assert_eq!(summary[0], ("Article".to_string(), "All".to_string()));
    assert_eq!(summary[3], ("Total rows".to_string(), "22".to_string()));
}
