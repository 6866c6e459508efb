//! Normalized error representation shared by the validator and upstream client.

use axum::http::StatusCode;
use thiserror::Error;

/// Title used whenever a call site does not override it.
pub const DEFAULT_TITLE: &str = "API Error Occurred";

/// Structured failure raised by the validator or the upstream client.
///
/// The status is typed as [`StatusCode`], so it is always a valid HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {detail}")]
pub struct NormalizedError {
    pub title: String,
    pub detail: String,
    pub status: StatusCode,
}

impl NormalizedError {
    /// Create an error with the default title.
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            detail: detail.into(),
            status,
        }
    }

    /// 400 raised for malformed caller input.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    /// 500 raised for failures with no upstream status attached.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    /// Error for an upstream 4xx/5xx response.
    ///
    /// The raw response body becomes the detail; a blank body falls back to
    /// the canonical status line, e.g. `404 Not Found`.
    pub fn from_upstream_status(status: StatusCode, body: &str) -> Self {
        let detail = if body.trim().is_empty() {
            canonical_status_line(status)
        } else {
            body.to_string()
        };
        Self::new(status, detail)
    }

    /// Override the default title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }
}

/// `"<code> <reason>"`, or just the code for non-standard statuses.
pub fn canonical_status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Result type for validator and upstream operations.
pub type GatewayResult<T> = Result<T, NormalizedError>;
