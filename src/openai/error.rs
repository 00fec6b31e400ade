//! Error types for upstream calls.

use std::time::Duration;

use thiserror::Error;

use super::types::RunStatus;

/// Upstream error type.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// HTTP request failed before a response was read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid base URL or path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A run did not reach a terminal state before the poll deadline.
    #[error("run {run_id} still {status} after {waited:?}")]
    RunTimeout {
        run_id: String,
        status: RunStatus,
        waited: Duration,
    },
}

impl UpstreamError {
    /// HTTP status reported by the upstream API, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidUrl(_) | Self::RunTimeout { .. } => None,
        }
    }
}

/// Result type alias for upstream operations.
pub type Result<T> = std::result::Result<T, UpstreamError>;
