//! Error types for the crawl driver and pipeline.

use thiserror::Error;

/// Errors that abort a crawl (or the current combination).
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Remote API call exhausted its retry budget or failed fatally.
    #[error("api error: {0}")]
    Api(#[from] prospect_api::ApiError),

    /// Checkpoint or exclusion persistence failure.
    #[error("database error: {0}")]
    Database(#[from] prospect_db::DatabaseError),

    /// The output sink rejected a delivery.
    ///
    /// Delivery failures abort the current combination rather than being
    /// skipped: results that never reached the sink must not land in the
    /// exclusion set.
    #[error("output sink error: {message}")]
    Sink {
        /// What the sink reported
        message: String,
    },
}

/// Result type alias for crawl operations.
pub type Result<T> = std::result::Result<T, CrawlError>;
