//! CSV parsing through the Polars CSV reader.

use std::io::Cursor;

use polars::prelude::*;
use tracing::debug;

/// Rows sampled for schema inference on the first attempt.
const INFER_SCHEMA_ROWS: usize = 100;

/// Field values read as missing, in addition to empty fields.
///
/// The same tokens pandas treats as NA by default.
pub const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn read_with_inference(
    bytes: &[u8],
    separator: u8,
    infer_schema_length: Option<usize>,
) -> PolarsResult<DataFrame> {
    let markers: Vec<PlSmallStr> = MISSING_MARKERS.iter().map(|m| PlSmallStr::from(*m)).collect();

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_length)
        .map_parse_options(|opts| {
            opts.with_separator(separator)
                .with_encoding(CsvEncoding::LossyUtf8)
                .with_null_values(Some(NullValues::AllColumns(markers.clone())))
        })
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
}

/// Parse CSV bytes into a DataFrame.
///
/// The first row is the header. Empty fields and [`MISSING_MARKERS`] become
/// nulls. Column types are inferred from the first [`INFER_SCHEMA_ROWS`]
/// rows; when a later value does not fit the inferred type, the file is read
/// again with every row scanned. Invalid UTF-8 is replaced rather than
/// rejected, since spreadsheet exports in Latin-1 are common.
pub fn read_csv_bytes(bytes: &[u8], separator: u8) -> Result<DataFrame, String> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err("file is empty (no header row)".to_string());
    }

    match read_with_inference(bytes, separator, Some(INFER_SCHEMA_ROWS)) {
        Ok(df) => Ok(df),
        Err(e) => {
            debug!("Sampled schema inference failed, scanning all rows: {}", e);
            read_with_inference(bytes, separator, None).map_err(|e| e.to_string())
        }
    }
}
