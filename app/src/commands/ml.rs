//! Forecast Handlers
//!
//! - [`predict`] trains the forest on the loaded table (optionally filtered
//!   to one article) and stores the result in the session
//! - [`export_report`] renders the stored forecast as an xlsx workbook
//!
//! Forecasting is synchronous; callers that need a responsive UI run it on a
//! worker thread.

use demand_learning::{
    ArticleFilter, DEFAULT_REPORT_NAME, ForecastEngine, ForecastResult, ReportExporter,
    XLSX_MIME_TYPE,
};
use serde::Serialize;
use tracing::info;

use crate::error::{CommandError, CommandResult};
use crate::events::AppEventEmitter;
use crate::state::Session;

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// A rendered report, ready to be saved or downloaded.
#[derive(Debug, Clone, Serialize)]
pub struct ReportFile {
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub size_bytes: usize,
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn run_forecast(session: &Session, article: &str, horizon: usize) -> CommandResult<ForecastResult> {
    let config = &session.forecast_config;
    config
        .check_horizon(horizon)
        .map_err(|_| CommandError::InvalidHorizon {
            horizon,
            min: config.min_horizon,
            max: config.max_horizon,
        })?;

    let loaded = session.loaded().ok_or(CommandError::NoDataLoaded)?;
    if !session.roster().contains(article) {
        return Err(CommandError::UnknownArticle(article.to_string()));
    }

    let engine = ForecastEngine::new(config.clone())
        .with_date_order(session.processing_config.date_order);
    let filter = ArticleFilter::from_roster_entry(article);

    Ok(engine.forecast(&loaded.table.data, loaded.article_column(), &filter, horizon)?)
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Forecast `horizon` days of demand for `article` (`"All"` for every row).
///
/// The result replaces any previous forecast in the session and is also
/// returned.
///
/// # Errors
///
/// - `INVALID_HORIZON` outside the configured range (7..=365 by default)
/// - `NO_DATA_LOADED` before any upload
/// - `UNKNOWN_ARTICLE` for a name not in the roster
/// - `INSUFFICIENT_DATA` with fewer than the minimum rows after filtering
/// - `MISSING_COLUMN` without a date or demand column
pub fn predict<E: AppEventEmitter>(
    session: &mut Session,
    emitter: &E,
    article: &str,
    horizon: usize,
) -> CommandResult<ForecastResult> {
    emitter.emit_loading(true, Some(&format!("Forecasting {} day(s)", horizon)));
    let result = run_forecast(session, article, horizon);
    emitter.emit_loading(false, None);

    match result {
        Ok(forecast) => {
            info!(
                "Forecast for '{}': {} historical, {} predicted point(s)",
                forecast.filter,
                forecast.historical.len(),
                forecast.forecast.len()
            );
            emitter.emit_forecast_complete(&forecast);
            session.set_forecast(forecast.clone());
            Ok(forecast)
        }
        Err(e) => {
            emitter.emit_error(e.error_code(), &e.to_string());
            Err(e)
        }
    }
}

/// Render the last forecast as a two-sheet xlsx report.
pub fn export_report<E: AppEventEmitter>(session: &Session, emitter: &E) -> CommandResult<ReportFile> {
    let forecast = session.last_forecast().ok_or(CommandError::NoForecast)?;
    let bytes = ReportExporter::new().export(forecast).map_err(|e| {
        let err = CommandError::from(e);
        emitter.emit_error(err.error_code(), &err.to_string());
        err
    })?;

    emitter.emit_report_exported(DEFAULT_REPORT_NAME, bytes.len());
    Ok(ReportFile {
        file_name: DEFAULT_REPORT_NAME.to_string(),
        mime_type: XLSX_MIME_TYPE.to_string(),
        size_bytes: bytes.len(),
        bytes,
    })
}
