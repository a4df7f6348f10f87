//! Error types for the remote API client.

use thiserror::Error;

/// Errors that can occur while talking to the remote search/enrich API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credential acquisition or renewal exhausted its retry budget.
    #[error("authentication failed: {message}")]
    Auth {
        /// What went wrong
        message: String,
    },

    /// Provider-imposed throttling exhausted the retry budget.
    #[error("rate limited on {endpoint} after {attempts} attempts")]
    RateLimited {
        /// Endpoint that was throttled
        endpoint: String,
        /// How many attempts were made
        attempts: u32,
    },

    /// Provider signalled the requested page exceeds available results.
    ///
    /// Treated by callers as normal pagination termination, not a failure.
    #[error("page out of range on {endpoint}")]
    PageOutOfRange {
        /// Endpoint that rejected the page
        endpoint: String,
    },

    /// Any other non-success response.
    #[error("upstream error on {endpoint}: status {status}, {message}")]
    Upstream {
        /// Endpoint that failed
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },

    /// Response body didn't match the expected shape.
    #[error("failed to decode response from {endpoint}: {message}")]
    Decode {
        /// Endpoint whose response failed to decode
        endpoint: String,
        /// Decode failure detail
        message: String,
    },

    /// Network-level failure (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Credential cache persistence failure.
    #[error("credential store error: {0}")]
    Database(#[from] prospect_db::DatabaseError),

    /// Serialization failure building a request.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::RateLimited {
            endpoint: "companies/search".to_string(),
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "rate limited on companies/search after 3 attempts"
        );

        let err = ApiError::Upstream {
            endpoint: "contacts/enrich".to_string(),
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert!(err.to_string().contains("status 502"));
    }
}
