//! Route handlers.
//!
//! Thin adapters: extract inputs, call [`PostService`], return JSON or a
//! [`GatewayError`]. Extractor rejections are turned into gateway errors so
//! every failure leaves in the wire format.
//!
//! [`PostService`]: crate::service::PostService

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::HeaderMap,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, NormalizedError};
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::ActiveTrace;
use crate::upstream::{Comment, Post, PostWithComments};

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    #[serde(rename = "postId")]
    pub post_id: Option<String>,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Extension(trace): Extension<ActiveTrace>,
    headers: HeaderMap,
    query: Result<Query<PostsQuery>, QueryRejection>,
) -> Result<Json<Vec<Post>>, GatewayError> {
    let Query(query) = query.map_err(query_rejected)?;
    tracing::debug!(
        request_id = %request_id(&headers),
        trace_id = ?trace.trace_id(),
        title = ?query.title,
        "Listing posts"
    );

    let posts = state.service.posts(query.title.as_deref()).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    Extension(trace): Extension<ActiveTrace>,
    headers: HeaderMap,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Post>, GatewayError> {
    let Path(id) = id.map_err(path_rejected)?;
    tracing::debug!(
        request_id = %request_id(&headers),
        trace_id = ?trace.trace_id(),
        post_id = %id,
        "Fetching post"
    );

    let post = state.service.post(Some(&id)).await?;
    Ok(Json(post))
}

pub async fn get_post_with_comments(
    State(state): State<AppState>,
    Extension(trace): Extension<ActiveTrace>,
    headers: HeaderMap,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<PostWithComments>, GatewayError> {
    let Path(id) = id.map_err(path_rejected)?;
    tracing::debug!(
        request_id = %request_id(&headers),
        trace_id = ?trace.trace_id(),
        post_id = %id,
        "Fetching post with comments"
    );

    let composed = state.service.post_with_comments(Some(&id)).await?;
    Ok(Json(composed))
}

pub async fn get_comments_for_post(
    State(state): State<AppState>,
    Extension(trace): Extension<ActiveTrace>,
    headers: HeaderMap,
    query: Result<Query<CommentsQuery>, QueryRejection>,
) -> Result<Json<Vec<Comment>>, GatewayError> {
    let Query(query) = query.map_err(query_rejected)?;
    tracing::debug!(
        request_id = %request_id(&headers),
        trace_id = ?trace.trace_id(),
        post_id = ?query.post_id,
        "Fetching comments for post"
    );

    let comments = state.service.comments_for_post(query.post_id.as_deref()).await?;
    Ok(Json(comments))
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "UP" })
}

pub async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn route_not_found() -> GatewayError {
    GatewayError::RouteNotFound
}

pub async fn method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}

fn query_rejected(rejection: QueryRejection) -> GatewayError {
    NormalizedError::new(rejection.status(), rejection.body_text()).into()
}

fn path_rejected(rejection: PathRejection) -> GatewayError {
    NormalizedError::new(rejection.status(), rejection.body_text()).into()
}
