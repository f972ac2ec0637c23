//! Table loading from uploaded bytes.
//!
//! The loader turns `(file name, bytes)` into a Polars `DataFrame`. The file
//! extension picks the reader:
//!
//! - `.csv` - [`csv::read_csv_bytes`] (Polars CSV reader)
//! - `.xlsx` / `.xls` - [`excel::read_excel_bytes`] (calamine, first sheet)
//!
//! Loading has no side effects; it never touches the filesystem.

pub mod csv;
pub mod excel;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ALLOWED_EXTENSIONS, ProcessingConfig};
use crate::error::{ProcessingError, Result};

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    /// Resolve the format from a file name's extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let lower = file_name.trim().to_lowercase();
        let ext = lower
            .rfind('.')
            .map(|idx| &lower[idx..])
            .filter(|ext| ALLOWED_EXTENSIONS.contains(ext))
            .ok_or_else(|| ProcessingError::UnsupportedFormat(file_name.to_string()))?;

        match ext {
            ".csv" => Ok(FileFormat::Csv),
            ".xlsx" => Ok(FileFormat::Xlsx),
            _ => Ok(FileFormat::Xls),
        }
    }

    /// Check whether the format is a spreadsheet workbook.
    pub fn is_workbook(&self) -> bool {
        matches!(self, FileFormat::Xlsx | FileFormat::Xls)
    }
}

/// Parses uploaded files into tables.
#[derive(Debug, Clone)]
pub struct TableLoader {
    csv_separator: u8,
    max_upload_bytes: usize,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new(&ProcessingConfig::default())
    }
}

impl TableLoader {
    /// Create a loader using the separator and size limit from `config`.
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            csv_separator: config.csv_separator,
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Parse `bytes` according to the extension of `file_name`.
    ///
    /// # Errors
    ///
    /// - [`ProcessingError::UnsupportedFormat`] for any extension other than
    ///   `.csv`, `.xlsx` or `.xls`
    /// - [`ProcessingError::FileTooLarge`] when the upload exceeds the limit
    /// - [`ProcessingError::ParseError`] when the content is malformed
    pub fn load(&self, file_name: &str, bytes: &[u8]) -> Result<DataFrame> {
        let format = FileFormat::from_file_name(file_name)?;

        if bytes.len() > self.max_upload_bytes {
            return Err(ProcessingError::FileTooLarge {
                size: bytes.len(),
                limit: self.max_upload_bytes,
            });
        }

        debug!(
            "Loading '{}' as {:?} ({} bytes)",
            file_name,
            format,
            bytes.len()
        );

        let df = match format {
            FileFormat::Csv => csv::read_csv_bytes(bytes, self.csv_separator),
            FileFormat::Xlsx | FileFormat::Xls => excel::read_excel_bytes(bytes),
        }
        .map_err(|reason| ProcessingError::parse(file_name, reason))?;

        info!(
            "Loaded '{}': {} rows x {} columns",
            file_name,
            df.height(),
            df.width()
        );
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(FileFormat::from_file_name("ventas.csv").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_file_name("VENTAS.XLSX").unwrap(), FileFormat::Xlsx);
        assert_eq!(FileFormat::from_file_name("old.Xls").unwrap(), FileFormat::Xls);
        assert!(FileFormat::Xls.is_workbook());
        assert!(!FileFormat::Csv.is_workbook());
    }

    #[test]
    fn test_unsupported_extensions() {
        for name in ["data.txt", "data.json", "data", "data.csv.bak", ".xlsxx"] {
            let err = FileFormat::from_file_name(name).unwrap_err();
            assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT", "{name}");
        }
    }

    #[test]
    fn test_load_rejects_oversized_upload() {
        let config = ProcessingConfig::builder().max_upload_bytes(8).build().unwrap();
        let loader = TableLoader::new(&config);
        let err = loader.load("a.csv", b"fecha,demanda\n2024-01-01,3\n").unwrap_err();
        assert!(matches!(err, ProcessingError::FileTooLarge { limit: 8, .. }));
    }

    #[test]
    fn test_load_csv_dispatch() {
        let df = TableLoader::default()
            .load("a.csv", b"fecha,demanda\n2024-01-01,3\n2024-01-02,4\n")
            .unwrap();
        assert_eq!(df.shape(), (2, 2));
    }

    #[test]
    fn test_load_garbage_workbook_is_parse_error() {
        let err = TableLoader::default()
            .load("a.xlsx", b"definitely not a zip archive")
            .unwrap_err();
        assert_eq!(err.error_code(), "PARSE_ERROR");
        assert!(err.to_string().contains("a.xlsx"));
    }
}
