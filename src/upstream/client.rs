//! Upstream API client with error translation.
//!
//! # Responsibilities
//! - Build upstream URLs for the four read operations
//! - Decode payloads into [`Post`] / [`Comment`]
//! - Map every failure into a [`NormalizedError`]
//!
//! # Error Mapping
//! - Upstream 4xx/5xx → same status, detail = response body (or the
//!   canonical status line when the body is blank)
//! - Error status with an unreadable body → same status, detail = read
//!   error message
//! - No response at all → 500, detail = transport error message and causes
//! - Undecodable or missing payload → 500, detail = decoder message
//!
//! The same rule applies at every call site, including the comments
//! sub-call of [`UpstreamClient::get_post_with_comments`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::{GatewayResult, NormalizedError};
use crate::observability::metrics;
use crate::upstream::transport::{ReqwestTransport, TransportError, UpstreamTransport};
use crate::upstream::types::{Comment, Post, PostWithComments};

/// Failure while constructing the client from configuration.
#[derive(Debug, Error)]
pub enum ClientSetupError {
    #[error("Invalid upstream base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP transport: {0}")]
    Transport(#[from] TransportError),
}

/// Stateless client for the upstream blog API. Cheap to clone.
#[derive(Clone)]
pub struct UpstreamClient {
    base_url: Url,
    transport: Arc<dyn UpstreamTransport>,
}

impl UpstreamClient {
    pub fn new(base_url: Url, transport: Arc<dyn UpstreamTransport>) -> Self {
        Self { base_url, transport }
    }

    /// Build a client with the reqwest transport.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ClientSetupError> {
        let base_url = parse_base_url(&config.base_url)?;
        let transport = ReqwestTransport::new(&config.user_agent)?;

        tracing::info!(base_url = %base_url, "Upstream client initialized");
        Ok(Self::new(base_url, Arc::new(transport)))
    }

    /// All posts, optionally narrowed to titles containing `title_filter`.
    pub async fn list_posts(&self, title_filter: Option<&str>) -> GatewayResult<Vec<Post>> {
        let url = self.endpoint(&["posts"])?;
        let body = self.fetch("list_posts", &url).await?;
        let posts: Vec<Post> = decode_list("list_posts", &body)?;
        Ok(filter_by_title(posts, title_filter))
    }

    /// A single post. `id` is used verbatim as the path segment.
    pub async fn get_post(&self, id: &str) -> GatewayResult<Post> {
        let url = self.endpoint(&["posts", id])?;
        let body = self.fetch("get_post", &url).await?;
        decode_one("get_post", &body, || format!("Upstream returned no post for id {}", id))
    }

    /// A post joined with the comments from the per-post endpoint.
    ///
    /// Fails as a whole when either fetch fails.
    pub async fn get_post_with_comments(&self, id: &str) -> GatewayResult<PostWithComments> {
        let post = self.get_post(id).await?;

        let url = self.endpoint(&["posts", id, "comments"])?;
        let body = self.fetch("get_post_comments", &url).await?;
        let comments: Vec<Comment> = decode_list("get_post_comments", &body)?;

        Ok(PostWithComments::new(post, comments))
    }

    /// Comments for a post via the global endpoint's `postId` filter.
    pub async fn get_comments_for_post(&self, id: &str) -> GatewayResult<Vec<Comment>> {
        let mut url = self.endpoint(&["comments"])?;
        url.query_pairs_mut().append_pair("postId", id);
        let body = self.fetch("get_comments_for_post", &url).await?;
        decode_list("get_comments_for_post", &body)
    }

    fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NormalizedError::internal("Upstream base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch(&self, operation: &'static str, url: &Url) -> GatewayResult<String> {
        match self.transport.get(url).await {
            Ok(response) if response.status.is_client_error() || response.status.is_server_error() => {
                tracing::error!(
                    operation,
                    url = %url,
                    status = %response.status,
                    "Upstream returned an error status"
                );
                metrics::record_upstream_request(operation, response.status.as_str());
                Err(NormalizedError::from_upstream_status(response.status, &response.body))
            }
            Ok(response) => {
                metrics::record_upstream_request(operation, response.status.as_str());
                Ok(response.body)
            }
            Err(TransportError::Body { status, message })
                if status.is_client_error() || status.is_server_error() =>
            {
                tracing::error!(
                    operation,
                    url = %url,
                    status = %status,
                    error = %message,
                    "Upstream error body unreadable"
                );
                metrics::record_upstream_request(operation, status.as_str());
                Err(NormalizedError::new(status, message))
            }
            Err(e) => {
                tracing::error!(operation, url = %url, error = %e, "Upstream request failed");
                metrics::record_upstream_request(operation, "transport_error");
                Err(NormalizedError::internal(e.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Parse and check an upstream base URL.
pub fn parse_base_url(raw: &str) -> Result<Url, ClientSetupError> {
    let invalid = |reason: String| ClientSetupError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    Ok(url)
}

/// Keep posts whose title contains `title` (case-sensitive substring).
/// A missing or blank filter keeps everything.
pub fn filter_by_title(posts: Vec<Post>, title: Option<&str>) -> Vec<Post> {
    match title {
        Some(t) if !t.trim().is_empty() => posts
            .into_iter()
            .filter(|post| post.title.contains(t))
            .collect(),
        _ => posts,
    }
}

/// Empty bodies and JSON `null` decode as an empty list.
fn decode_list<T: DeserializeOwned>(operation: &'static str, body: &str) -> GatewayResult<Vec<T>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Option<Vec<T>>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| decode_error(operation, e))
}

fn decode_one<T: DeserializeOwned>(
    operation: &'static str,
    body: &str,
    missing: impl FnOnce() -> String,
) -> GatewayResult<T> {
    if body.trim().is_empty() {
        return Err(NormalizedError::internal(missing()));
    }
    match serde_json::from_str::<Option<T>>(body) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(NormalizedError::internal(missing())),
        Err(e) => Err(decode_error(operation, e)),
    }
}

fn decode_error(operation: &'static str, error: serde_json::Error) -> NormalizedError {
    tracing::error!(operation, error = %error, "Failed to decode upstream payload");
    NormalizedError::internal(error.to_string())
}
