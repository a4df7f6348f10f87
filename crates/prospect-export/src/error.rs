//! Error types for the CSV sink.

use thiserror::Error;

/// Errors that can occur while writing crawl output.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem failure opening or writing an output file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
