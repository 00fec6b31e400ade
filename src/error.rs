//! Request-level errors and their HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::openai::UpstreamError;

/// Everything a handler can fail with.
///
/// Each variant maps to one HTTP status; the message becomes the
/// `{"error": "..."}` body.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed request body or message shape.
    #[error("{0}")]
    InvalidInput(String),

    /// Unknown assistant name.
    #[error("{0}")]
    NotFound(String),

    /// A session field the operation needs has not been set.
    #[error("{0}")]
    MissingState(String),

    /// The upstream API failed or answered with something unusable.
    /// `status` is forwarded to the caller when set.
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },

    /// An assistant run did not finish before the poll deadline.
    #[error("{0}")]
    RunTimeout(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Wrap an upstream failure, always reporting it as a server error.
    pub fn upstream(context: &str, err: UpstreamError) -> Self {
        let message = format!("{context}: {err}");
        if matches!(err, UpstreamError::RunTimeout { .. }) {
            Self::RunTimeout(message)
        } else {
            Self::Upstream {
                status: None,
                message,
            }
        }
    }

    /// Wrap an upstream failure, forwarding the API's status code when it
    /// reported one.
    pub fn upstream_with_status(context: &str, err: UpstreamError) -> Self {
        let status = err.status();
        match Self::upstream(context, err) {
            Self::Upstream { message, .. } => Self::Upstream { status, message },
            other => other,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::MissingState(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::RunTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(name: "request.failed", status = status.as_u16(), error = %message, "Request failed");
        } else {
            warn!(name: "request.rejected", status = status.as_u16(), error = %message, "Request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
