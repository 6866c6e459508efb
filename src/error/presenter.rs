//! Boundary error presentation.
//!
//! # Responsibilities
//! - Render any boundary error into the `{status, title, detail}` wire shape
//! - Log every presented error as a problem-detail block
//! - Render caught handler panics through the same path
//!
//! Presentation never fails; anything unrecognized becomes a 500.

use std::any::Any;

use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::normalized::{NormalizedError, DEFAULT_TITLE};

/// Detail used when an unhandled failure carries no message.
pub const FALLBACK_DETAIL: &str = "API Error occurred. Please contact support or administrator.";

/// Every failure that can reach the HTTP boundary.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Raised by the validator or the upstream client.
    #[error(transparent)]
    Normalized(#[from] NormalizedError),

    /// Known path, unsupported method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// No route matched the request path.
    #[error("route not found")]
    RouteNotFound,

    /// Anything else, with its message when one exists.
    #[error("unhandled error: {}", .0.as_deref().unwrap_or(FALLBACK_DETAIL))]
    Unhandled(Option<String>),
}

/// JSON error body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    pub status: u16,
    pub title: String,
    pub detail: String,
}

/// Convert a boundary error into its wire representation.
pub fn present(error: &GatewayError) -> WireError {
    match error {
        GatewayError::Normalized(e) => WireError {
            status: e.status.as_u16(),
            title: e.title.clone(),
            detail: e.detail.clone(),
        },
        GatewayError::MethodNotAllowed => standard_phrase(StatusCode::METHOD_NOT_ALLOWED),
        GatewayError::RouteNotFound => standard_phrase(StatusCode::NOT_FOUND),
        GatewayError::Unhandled(message) => WireError {
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            title: DEFAULT_TITLE.to_string(),
            detail: message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(FALLBACK_DETAIL)
                .to_string(),
        },
    }
}

fn standard_phrase(status: StatusCode) -> WireError {
    let phrase = status.canonical_reason().unwrap_or(DEFAULT_TITLE).to_string();
    WireError {
        status: status.as_u16(),
        title: phrase.clone(),
        detail: phrase,
    }
}

/// Multi-line block used when logging a presented error.
pub fn problem_detail_message(wire: &WireError) -> String {
    format!(
        "Problem Detail:\n  Status: {}\n  Title: {}\n  Detail: {}\n",
        wire.status, wire.title, wire.detail
    )
}

impl IntoResponse for WireError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let wire = present(&self);
        if wire.status >= 500 {
            tracing::error!("{}", problem_detail_message(&wire));
        } else {
            tracing::warn!("{}", problem_detail_message(&wire));
        }
        wire.into_response()
    }
}

/// Panic handler for `CatchPanicLayer`: the panic is presented as an
/// unhandled 500.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        Some(s.clone())
    } else {
        payload.downcast_ref::<&str>().map(|s| s.to_string())
    };
    tracing::error!(panic = ?message, "Handler panicked");

    let wire = present(&GatewayError::Unhandled(message));
    // Built by hand so rendering cannot fail inside the panic path.
    let body = serde_json::to_vec(&wire).unwrap_or_default();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
