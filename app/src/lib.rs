//! Demand Forecast - Session Layer
//!
//! This crate ties the two libraries to a user session. It:
//! 1. Holds the session state (loaded table, roster, last forecast)
//! 2. Exposes one handler per user action
//! 3. Pushes state changes through an event emitter
//!
//! # Architecture Overview
//!
//! ```text
//! -------------------------------------------------------------------
//! |                         demand-app                              |
//! |                                                                 |
//! |  ---------------  ---------------  ---------------------------  |
//! |  |   Emitters  |  |    State    |  |        Handlers         |  |
//! |  |  - log      |  |   Session   |  |  - upload_file          |  |
//! |  |  - record   |  |  (owned by  |  |  - load_file            |  |
//! |  ---------------  |   caller)   |  |  - close_file           |  |
//! |                   ---------------  |  - get_rows             |  |
//! |                                    |  - get_preview          |  |
//! |                                    |  - get_summary          |  |
//! |                                    |  - predict              |  |
//! |                                    |  - export_report        |  |
//! |                                    ---------------------------  |
//! |                                                                 |
//! |  -----------------------------------------------------------    |
//! |  |                      Libraries                          |    |
//! |  |   demand-processing: load, clean, dates, calendar, roles|    |
//! |  |   demand-learning:   forest, forecast, xlsx report      |    |
//! |  -----------------------------------------------------------    |
//! -------------------------------------------------------------------
//! ```
//!
//! # Event System
//!
//! - `file:loaded` - Upload processed and stored (contains FileInfo)
//! - `file:closed` - Session reset
//! - `app:loading` - Loading state changed
//! - `app:error` - A handler failed
//! - `processing:progress` - Processing stage update
//! - `processing:complete` - Processing finished
//! - `forecast:complete` - Forecast stored in the session
//! - `report:exported` - Report rendered
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use demand_app::commands::{export_report, load_file, predict};
//! use demand_app::events::LogEmitter;
//! use demand_app::state::Session;
//!
//! let mut session = Session::default();
//! load_file(&mut session, &LogEmitter, Path::new("ventas.csv"))?;
//! predict(&mut session, &LogEmitter, "All", 30)?;
//! let report = export_report(&session, &LogEmitter)?;
//! std::fs::write(&report.file_name, &report.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod commands;
pub mod error;
pub mod events;
pub mod state;

pub use error::{CommandError, CommandResult};
pub use events::{AppEventEmitter, LogEmitter, RecordingEmitter};
pub use state::{FileInfo, LoadedTable, Session};
