//! File I/O Handlers
//!
//! Uploading a file runs the whole processing chain and replaces the
//! session contents:
//!
//! 1. Parse the bytes with the loader picked by the extension
//! 2. Clean, normalize dates, derive calendar columns, detect roles
//! 3. Compute the file metadata
//! 4. Store everything in the session (previous table and forecast are gone)
//!
//! A failed upload leaves the session untouched.
//!
//! # Events Emitted
//!
//! - `app:loading` - When loading starts/ends
//! - `processing:progress` - Once per processing stage
//! - `processing:complete` - When the processed table is ready
//! - `file:loaded` - When the session holds the new table
//! - `file:closed` - When the session is reset
//! - `app:error` - When an error occurs

use std::fs;
use std::path::Path;

use demand_processing::summary::DatasetSummary;
use demand_processing::{FileFormat, ProcessedTable, ProcessingError, ProcessingPipeline, TableLoader};
use tracing::info;

use crate::error::{CommandError, CommandResult};
use crate::events::AppEventEmitter;
use crate::state::{FileInfo, LoadedTable, Session};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Build the file metadata of a processed upload.
fn file_info(file_name: &str, size_bytes: usize, table: &ProcessedTable) -> CommandResult<FileInfo> {
    let summary = DatasetSummary::from_frame(&table.data);
    Ok(FileInfo {
        name: file_name.to_string(),
        format: FileFormat::from_file_name(file_name)?,
        size_bytes: size_bytes as u64,
        row_count: summary.rows,
        column_count: summary.columns,
        columns: summary.column_info,
    })
}

fn process_upload<E>(
    session: &Session,
    emitter: &E,
    file_name: &str,
    bytes: &[u8],
) -> CommandResult<LoadedTable>
where
    E: AppEventEmitter + Clone + 'static,
{
    let df = TableLoader::new(&session.processing_config).load(file_name, bytes)?;

    let progress = emitter.clone();
    let pipeline = ProcessingPipeline::builder()
        .config(session.processing_config.clone())
        .on_progress(move |update| progress.emit_processing_progress(&update))
        .build()
        .map_err(ProcessingError::from)?;

    let table = pipeline.process(&df)?;
    emitter.emit_processing_complete(&table);

    let file_info = file_info(file_name, bytes.len(), &table)?;
    Ok(LoadedTable { table, file_info })
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Load and process an uploaded file, replacing the session contents.
///
/// # Parameters
///
/// - `session` - The session to replace
/// - `emitter` - Event sink; cloned into the progress callback
/// - `file_name` - Name as uploaded; its extension picks the reader
/// - `bytes` - File content
///
/// # Errors
///
/// - `UNSUPPORTED_FORMAT` for anything but `.csv`, `.xlsx`, `.xls`
/// - `FILE_TOO_LARGE` above the configured upload limit
/// - `PARSE_ERROR` for malformed content
pub fn upload_file<E>(
    session: &mut Session,
    emitter: &E,
    file_name: &str,
    bytes: &[u8],
) -> CommandResult<FileInfo>
where
    E: AppEventEmitter + Clone + 'static,
{
    emitter.emit_loading(true, Some(&format!("Reading {}", file_name)));
    let result = process_upload(session, emitter, file_name, bytes);
    emitter.emit_loading(false, None);

    match result {
        Ok(loaded) => {
            let file_info = loaded.file_info.clone();
            info!(
                "Session now holds '{}' ({} rows, {} article(s))",
                file_info.name,
                file_info.row_count,
                loaded.table.roles.roster.articles().len()
            );
            session.upload(loaded);
            emitter.emit_file_loaded(&file_info);
            Ok(file_info)
        }
        Err(e) => {
            emitter.emit_error(e.error_code(), &e.to_string());
            Err(e)
        }
    }
}

/// Read a file from disk and upload it.
pub fn load_file<E>(session: &mut Session, emitter: &E, path: &Path) -> CommandResult<FileInfo>
where
    E: AppEventEmitter + Clone + 'static,
{
    let bytes = fs::read(path).map_err(|e| {
        let err = CommandError::ReadError(format!("{}: {}", path.display(), e));
        emitter.emit_error(err.error_code(), &err.to_string());
        err
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    upload_file(session, emitter, &file_name, &bytes)
}

/// Reset the session ("no file" state).
pub fn close_file<E: AppEventEmitter>(session: &mut Session, emitter: &E) {
    session.reset();
    emitter.emit_file_closed();
}
