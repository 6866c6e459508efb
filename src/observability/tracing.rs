//! Trace-context propagation.
//!
//! # Responsibilities
//! - Build a [`TraceContext`] at request entry (continue an incoming W3C
//!   `traceparent`, or start a new root trace)
//! - Hand the context to handlers through request extensions
//! - Stamp trace/span id headers on every response at request exit
//!
//! # Design Decisions
//! - The context is an explicit per-request value, never global state
//! - Runs outside the panic catcher, so error and panic responses are
//!   stamped the same as successes
//! - Missing or invalid ids are omitted; propagation never fails a request

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use rand::Rng;
use tracing::Instrument;

use crate::config::TracingConfig;

/// W3C Trace Context header name.
pub const TRACEPARENT: &str = "traceparent";

/// Trace and span identifiers for one request, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
}

impl TraceContext {
    pub fn new(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
        }
    }

    /// Fresh root trace.
    pub fn generate() -> Self {
        Self::new(generate_trace_id(), generate_span_id())
    }

    /// New span within an existing trace.
    pub fn child_of(trace_id: impl Into<String>) -> Self {
        Self::new(trace_id, generate_span_id())
    }

    pub fn is_trace_id_valid(&self) -> bool {
        is_valid_id(&self.trace_id, 32)
    }

    pub fn is_span_id_valid(&self) -> bool {
        is_valid_id(&self.span_id, 16)
    }

    pub fn is_valid(&self) -> bool {
        self.is_trace_id_valid() && self.is_span_id_valid()
    }
}

/// Trace state of the current request, as seen by handlers.
///
/// `None` when tracing is disabled.
#[derive(Debug, Clone, Default)]
pub struct ActiveTrace(pub Option<TraceContext>);

impl ActiveTrace {
    pub fn trace_id(&self) -> Option<&str> {
        self.0.as_ref().map(|c| c.trace_id.as_str())
    }
}

/// Builds contexts at entry and injects headers at exit.
#[derive(Debug, Clone)]
pub struct TracePropagator {
    enabled: bool,
    trace_id_header: HeaderName,
    span_id_header: HeaderName,
}

impl TracePropagator {
    pub fn from_config(config: &TracingConfig) -> Result<Self, axum::http::header::InvalidHeaderName> {
        Ok(Self {
            enabled: config.enabled,
            trace_id_header: HeaderName::from_bytes(config.trace_id_header.as_bytes())?,
            span_id_header: HeaderName::from_bytes(config.span_id_header.as_bytes())?,
        })
    }

    /// Context for an inbound request, or `None` if tracing is off.
    pub fn extract(&self, headers: &HeaderMap) -> Option<TraceContext> {
        if !self.enabled {
            return None;
        }

        let parent = headers
            .get(TRACEPARENT)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_traceparent);

        Some(match parent {
            Some(trace_id) => TraceContext::child_of(trace_id),
            None => TraceContext::generate(),
        })
    }

    /// Set the id headers that can be populated; skip the rest.
    pub fn inject(&self, context: Option<&TraceContext>, headers: &mut HeaderMap) {
        let Some(context) = context else {
            return;
        };

        if context.is_trace_id_valid() {
            if let Ok(value) = HeaderValue::from_str(&context.trace_id) {
                headers.insert(self.trace_id_header.clone(), value);
            }
        }
        if context.is_span_id_valid() {
            if let Ok(value) = HeaderValue::from_str(&context.span_id) {
                headers.insert(self.span_id_header.clone(), value);
            }
        }
    }
}

impl Default for TracePropagator {
    fn default() -> Self {
        Self {
            enabled: true,
            trace_id_header: HeaderName::from_static("x-trace-id"),
            span_id_header: HeaderName::from_static("x-span-id"),
        }
    }
}

/// Middleware wrapping every route, fallback, and caught panic.
pub async fn propagate_trace_context(
    State(propagator): State<Arc<TracePropagator>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let context = propagator.extract(request.headers());

    let span = match &context {
        Some(c) => tracing::info_span!("request", trace_id = %c.trace_id, span_id = %c.span_id),
        None => tracing::info_span!(
            "request",
            trace_id = tracing::field::Empty,
            span_id = tracing::field::Empty
        ),
    };

    request.extensions_mut().insert(ActiveTrace(context.clone()));
    let mut response = next.run(request).instrument(span).await;

    propagator.inject(context.as_ref(), response.headers_mut());
    response
}

/// Trace id from a `traceparent` value (`{version}-{trace_id}-{parent_id}-{flags}`).
pub fn parse_traceparent(value: &str) -> Option<String> {
    let parts: Vec<&str> = value.trim().split('-').collect();
    if parts.len() < 4 {
        return None;
    }

    let version = parts[0];
    if !is_lower_hex(version, 2) || version == "ff" {
        return None;
    }
    if version == "00" && parts.len() != 4 {
        return None;
    }
    if !is_valid_id(parts[1], 32) || !is_valid_id(parts[2], 16) || !is_lower_hex(parts[3], 2) {
        return None;
    }
    Some(parts[1].to_string())
}

fn generate_trace_id() -> String {
    format!("{:032x}", rand::thread_rng().gen_range(1..=u128::MAX))
}

fn generate_span_id() -> String {
    format!("{:016x}", rand::thread_rng().gen_range(1..=u64::MAX))
}

fn is_lower_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn is_valid_id(s: &str, len: usize) -> bool {
    is_lower_hex(s, len) && s.bytes().any(|b| b != b'0')
}
