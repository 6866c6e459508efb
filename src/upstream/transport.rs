//! Transport seam between the upstream client and the network.
//!
//! # Responsibilities
//! - Issue a GET and hand back status and body text
//! - Log each outbound call and its response
//!
//! # Design Decisions
//! - 4xx/5xx responses are returned as data, not errors; classification
//!   belongs to the client's error mapping
//! - No retries or timeout overrides: the reqwest defaults apply

use async_trait::async_trait;
use axum::http::StatusCode;
use thiserror::Error;
use url::Url;

/// Status and body of a completed upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The call failed before a complete response was read.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response at all (connect failure, timeout, I/O).
    #[error("{}", error_chain(.0))]
    Http(reqwest::Error),

    /// Status line arrived but the body could not be read.
    #[error("{message}")]
    Body { status: StatusCode, message: String },

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        TransportError::Http(error)
    }
}

/// Join an error and all of its sources with `": "`, skipping repeats.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Blocking-per-request GET against the upstream API.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<UpstreamResponse, TransportError>;
}

/// Production transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<UpstreamResponse, TransportError> {
        tracing::debug!(method = "GET", url = %url, "Upstream request");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await.map_err(|e| TransportError::Body {
            status,
            message: error_chain(&e),
        })?;

        tracing::debug!(
            url = %url,
            status = %status,
            body_len = body.len(),
            "Upstream response"
        );
        Ok(UpstreamResponse { status, body })
    }
}
