//! Event System for Session → Presentation Communication
//!
//! Handlers push notifications about state changes through an
//! [`AppEventEmitter`]; the presentation layer decides what to do with them.
//! Large data (rows, reports) is never sent as an event, it is pulled with a
//! handler call instead.
//!
//! # Event Flow
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                              HANDLERS                                │
//! │                                                                      │
//! │   upload_file() ──► emit("processing:progress", ProgressUpdate)      │
//! │                 ──► emit("processing:complete", ProcessingPayload)   │
//! │                 ──► emit("file:loaded", FileLoadedPayload)           │
//! │   close_file()  ──► emit("file:closed", null)                        │
//! │   predict()     ──► emit("forecast:complete", ForecastPayload)       │
//! │   export()      ──► emit("report:exported", ReportPayload)           │
//! │   operations    ──► emit("app:loading", LoadingPayload)              │
//! │   errors        ──► emit("app:error", ErrorPayload)                  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two emitters ship with the crate: [`LogEmitter`] writes events to the
//! tracing log (used by the command-line driver) and [`RecordingEmitter`]
//! keeps them in memory.

use std::sync::Arc;

use demand_learning::ForecastResult;
use demand_processing::{ProcessedTable, ProgressUpdate};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::state::FileInfo;

// ============================================================================
// EVENT NAME CONSTANTS
// ============================================================================

/// Event emitted when a file is loaded and processed.
/// Payload: `FileLoadedPayload` containing `FileInfo`
pub const EVENT_FILE_LOADED: &str = "file:loaded";

/// Event emitted when the session is reset.
/// Payload: Empty (unit type serializes to `null`)
pub const EVENT_FILE_CLOSED: &str = "file:closed";

/// Event emitted when loading state changes.
/// Payload: `LoadingPayload` with status and optional message
pub const EVENT_LOADING: &str = "app:loading";

/// Event emitted when a handler fails.
/// Payload: `ErrorPayload` with error code and message
pub const EVENT_ERROR: &str = "app:error";

/// Event emitted by each processing stage.
/// Payload: `ProgressUpdate` from demand-processing
pub const EVENT_PROCESSING_PROGRESS: &str = "processing:progress";

/// Event emitted when processing of an upload finishes.
/// Payload: `ProcessingPayload`
pub const EVENT_PROCESSING_COMPLETE: &str = "processing:complete";

/// Event emitted when a forecast finishes.
/// Payload: `ForecastPayload`
pub const EVENT_FORECAST_COMPLETE: &str = "forecast:complete";

/// Event emitted when a report is written.
/// Payload: `ReportPayload`
pub const EVENT_REPORT_EXPORTED: &str = "report:exported";

// ============================================================================
// EVENT PAYLOADS
// ============================================================================

/// Payload for the `file:loaded` event.
#[derive(Debug, Clone, Serialize)]
pub struct FileLoadedPayload {
    pub file_info: FileInfo,
}

/// Payload for the `app:loading` event.
#[derive(Debug, Clone, Serialize)]
pub struct LoadingPayload {
    /// Whether an operation is in progress
    pub is_loading: bool,
    /// Optional message describing what's happening (e.g., "Reading ventas.csv")
    pub message: Option<String>,
}

/// Payload for the `app:error` event.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    /// Error code for programmatic handling (e.g., "PARSE_ERROR")
    pub code: String,
    /// Human-readable error message for display
    pub message: String,
}

/// Payload for the `processing:complete` event.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingPayload {
    pub steps: Vec<String>,
    pub article_column: Option<String>,
    pub roster: Vec<String>,
}

impl From<&ProcessedTable> for ProcessingPayload {
    fn from(table: &ProcessedTable) -> Self {
        Self {
            steps: table.processing_steps(),
            article_column: table.roles.article.as_ref().map(|a| a.column.clone()),
            roster: table.roles.roster.entries().to_vec(),
        }
    }
}

/// Payload for the `forecast:complete` event.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPayload {
    pub article: String,
    pub horizon: usize,
    pub model: String,
    pub historical_points: usize,
    pub forecast_points: usize,
}

impl From<&ForecastResult> for ForecastPayload {
    fn from(result: &ForecastResult) -> Self {
        Self {
            article: result.filter.to_string(),
            horizon: result.horizon,
            model: result.model.clone(),
            historical_points: result.historical.len(),
            forecast_points: result.forecast.len(),
        }
    }
}

/// Payload for the `report:exported` event.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    pub file_name: String,
    pub size_bytes: usize,
}

// ============================================================================
// EVENT EMISSION
// ============================================================================

/// Sink for session events.
///
/// Implementors only provide [`emit_event`](Self::emit_event); the typed
/// helpers build the payloads.
///
/// # Usage
///
/// ```rust,ignore
/// use demand_app::events::{AppEventEmitter, LogEmitter};
///
/// let emitter = LogEmitter;
/// emitter.emit_loading(true, Some("Reading ventas.csv"));
/// emitter.emit_error("PARSE_ERROR", "Invalid CSV format");
/// ```
pub trait AppEventEmitter: Send + Sync {
    /// Deliver one event.
    fn emit_event(&self, event: &'static str, payload: Value);

    /// Serialize `payload` and deliver it.
    fn emit_serialized<T: Serialize>(&self, event: &'static str, payload: &T)
    where
        Self: Sized,
    {
        match serde_json::to_value(payload) {
            Ok(value) => self.emit_event(event, value),
            Err(e) => error!("Failed to serialize {} payload: {}", event, e),
        }
    }

    /// Emit the `file:loaded` event with file metadata.
    fn emit_file_loaded(&self, file_info: &FileInfo)
    where
        Self: Sized,
    {
        self.emit_serialized(
            EVENT_FILE_LOADED,
            &FileLoadedPayload {
                file_info: file_info.clone(),
            },
        );
    }

    /// Emit the `file:closed` event.
    fn emit_file_closed(&self) {
        self.emit_event(EVENT_FILE_CLOSED, Value::Null);
    }

    /// Emit the `app:loading` event with loading state.
    fn emit_loading(&self, is_loading: bool, message: Option<&str>)
    where
        Self: Sized,
    {
        self.emit_serialized(
            EVENT_LOADING,
            &LoadingPayload {
                is_loading,
                message: message.map(String::from),
            },
        );
    }

    /// Emit the `app:error` event with error details.
    fn emit_error(&self, code: &str, message: &str)
    where
        Self: Sized,
    {
        self.emit_serialized(
            EVENT_ERROR,
            &ErrorPayload {
                code: code.to_string(),
                message: message.to_string(),
            },
        );
    }

    /// Emit the `processing:progress` event.
    fn emit_processing_progress(&self, update: &ProgressUpdate)
    where
        Self: Sized,
    {
        self.emit_serialized(EVENT_PROCESSING_PROGRESS, update);
    }

    /// Emit the `processing:complete` event.
    fn emit_processing_complete(&self, table: &ProcessedTable)
    where
        Self: Sized,
    {
        self.emit_serialized(EVENT_PROCESSING_COMPLETE, &ProcessingPayload::from(table));
    }

    /// Emit the `forecast:complete` event.
    fn emit_forecast_complete(&self, result: &ForecastResult)
    where
        Self: Sized,
    {
        self.emit_serialized(EVENT_FORECAST_COMPLETE, &ForecastPayload::from(result));
    }

    /// Emit the `report:exported` event.
    fn emit_report_exported(&self, file_name: &str, size_bytes: usize)
    where
        Self: Sized,
    {
        self.emit_serialized(
            EVENT_REPORT_EXPORTED,
            &ReportPayload {
                file_name: file_name.to_string(),
                size_bytes,
            },
        );
    }
}

/// Writes events to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmitter;

impl AppEventEmitter for LogEmitter {
    fn emit_event(&self, event: &'static str, payload: Value) {
        match event {
            EVENT_ERROR => error!("{}: {}", event, payload),
            EVENT_PROCESSING_PROGRESS | EVENT_LOADING => debug!("{}: {}", event, payload),
            _ => info!("{}: {}", event, payload),
        }
    }
}

/// An emitted event.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub name: &'static str,
    pub payload: Value,
}

/// Keeps every event in memory, in emission order.
///
/// Clones share the same buffer, so a clone can be moved into a progress
/// callback and the original still sees what it recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmitter {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Names of the recorded events, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.name).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AppEventEmitter for RecordingEmitter {
    fn emit_event(&self, event: &'static str, payload: Value) {
        self.events.lock().push(RecordedEvent {
            name: event,
            payload,
        });
    }
}

// ============================================================================
// ERROR CODES
// ============================================================================

/// Session-level error codes. Library errors bring their own codes.
pub mod error_codes {
    /// A handler that needs a table ran before any upload
    pub const NO_DATA_LOADED: &str = "NO_DATA_LOADED";

    /// Export requested before any forecast
    pub const NO_FORECAST: &str = "NO_FORECAST";

    /// Horizon outside the accepted range
    pub const INVALID_HORIZON: &str = "INVALID_HORIZON";

    /// Article filter not in the roster
    pub const UNKNOWN_ARTICLE: &str = "UNKNOWN_ARTICLE";

    /// Failed to read the file (I/O error, permissions, etc.)
    pub const FILE_READ_ERROR: &str = "FILE_READ_ERROR";
}
