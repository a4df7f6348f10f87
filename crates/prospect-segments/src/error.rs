//! Segment error types.

use thiserror::Error;

/// Errors raised while loading search-parameter groups.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Segment file or directory does not exist.
    #[error("segment path not found: {path}")]
    NotFound {
        /// Path that was looked up
        path: String,
    },

    /// Failed to read a segment file.
    #[error("failed to read segment file {path}: {source}")]
    LoadError {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse segment TOML.
    #[error("failed to parse segment file {path}: {source}")]
    ParseError {
        /// Path of the file
        path: String,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// I/O error walking the segment directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for segment operations.
pub type Result<T> = std::result::Result<T, SegmentError>;
