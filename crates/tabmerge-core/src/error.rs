//! Error types for tabmerge-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tabmerge-core
#[derive(Debug, Error)]
pub enum Error {
    /// Input folder does not exist or is not a directory
    #[error("input folder not found: {0}")]
    FolderNotFound(PathBuf),

    /// Folder contains no files with a supported extension
    #[error("no supported files (.xlsx/.xls/.csv/.tsv/.txt) found in '{0}'")]
    NoSupportedFiles(PathBuf),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Text file unreadable under UTF-8 and every fallback encoding
    #[error("failed to decode '{path}': not valid UTF-8 and fallback encodings ({tried}) did not match")]
    Decode { path: PathBuf, tried: String },

    /// Spreadsheet reading error from calamine
    #[error("spreadsheet error in '{path}': {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// Workbook writing error from rust_xlsxwriter
    #[error("failed to write workbook '{path}': {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
