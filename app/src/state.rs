//! Session State
//!
//! All state of one user session lives in [`Session`]: the loaded table
//! with its metadata, the article roster, and the last forecast. Handlers
//! receive the session explicitly (`&Session` to read, `&mut Session` to
//! change it), so there is no global state and no locking.
//!
//! # Transitions
//!
//! ```text
//!              upload (replaces everything)
//!   ┌───────┐ ───────────────────────────► ┌────────┐ ── predict ──► ┌─────────────┐
//!   │ Empty │                              │ Loaded │                │ Forecasted  │
//!   └───────┘ ◄─────────────────────────── └────────┘ ◄── upload ─── └─────────────┘
//!       ▲              reset                                                │
//!       └───────────────────────────────── reset ───────────────────────────┘
//! ```

use demand_learning::{ForecastConfig, ForecastResult};
use demand_processing::summary::ColumnInfo;
use demand_processing::{ArticleRoster, FileFormat, ProcessedTable, ProcessingConfig};
use serde::{Deserialize, Serialize};

// ============================================================================
// FILE METADATA
// ============================================================================

/// Metadata about an uploaded file.
///
/// Computed once on upload and served from the session afterwards.
///
/// # Fields
///
/// * `name` - File name as uploaded (e.g., "ventas.xlsx")
/// * `format` - Reader chosen from the extension
/// * `size_bytes` - Upload size
/// * `row_count` / `column_count` - Shape of the processed table
/// * `columns` - Per-column metadata of the processed table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub format: FileFormat,
    pub size_bytes: u64,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnInfo>,
}

// ============================================================================
// LOADED TABLE
// ============================================================================

/// A processed table bundled with its file metadata.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    /// Cleaned, date-normalized and calendar-enriched table with its roles.
    pub table: ProcessedTable,

    /// Cached file metadata.
    pub file_info: FileInfo,
}

impl LoadedTable {
    /// Name of the detected article column, if any.
    pub fn article_column(&self) -> Option<&str> {
        self.table.roles.article.as_ref().map(|a| a.column.as_str())
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// State of one session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Settings for loading and processing uploads.
    pub processing_config: ProcessingConfig,

    /// Settings for the forecast engine.
    pub forecast_config: ForecastConfig,

    loaded: Option<LoadedTable>,
    roster: ArticleRoster,
    last_forecast: Option<ForecastResult>,
}

impl Session {
    pub fn new(processing_config: ProcessingConfig, forecast_config: ForecastConfig) -> Self {
        Self {
            processing_config,
            forecast_config,
            ..Self::default()
        }
    }

    /// Replace the session contents with a freshly uploaded table.
    ///
    /// The roster is taken from the table and any previous forecast is
    /// discarded.
    pub fn upload(&mut self, loaded: LoadedTable) {
        self.roster = loaded.table.roles.roster.clone();
        self.loaded = Some(loaded);
        self.last_forecast = None;
    }

    /// Return to the initial state: nothing loaded, roster `["All"]`.
    ///
    /// Configuration is kept.
    pub fn reset(&mut self) {
        self.loaded = None;
        self.roster = ArticleRoster::default();
        self.last_forecast = None;
    }

    pub fn loaded(&self) -> Option<&LoadedTable> {
        self.loaded.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn roster(&self) -> &ArticleRoster {
        &self.roster
    }

    pub fn last_forecast(&self) -> Option<&ForecastResult> {
        self.last_forecast.as_ref()
    }

    pub fn set_forecast(&mut self, forecast: ForecastResult) {
        self.last_forecast = Some(forecast);
    }
}
