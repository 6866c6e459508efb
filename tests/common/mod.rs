//! Shared utilities for gateway integration tests.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use httpmock::MockServer;
use serde_json::{json, Value};
use tower::ServiceExt;

use post_gateway::config::GatewayConfig;
use post_gateway::HttpServer;

/// Config pointing the gateway at `upstream`.
pub fn config_for(upstream: &MockServer) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = upstream.base_url();
    config.listener.bind_address = "127.0.0.1:0".into();
    config
}

/// Fully layered gateway router backed by `upstream`.
pub fn gateway(upstream: &MockServer) -> Router {
    gateway_with(config_for(upstream))
}

pub fn gateway_with(config: GatewayConfig) -> Router {
    HttpServer::new(config).unwrap().router()
}

/// Status, headers, and JSON body of one response.
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(router: &Router, method: Method, uri: &str, headers: &[(&str, &str)]) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let response = router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply { status, headers, body }
}

pub async fn get(router: &Router, uri: &str) -> Reply {
    send(router, Method::GET, uri, &[]).await
}

pub fn sample_posts() -> Value {
    json!([
        {"userId": 1, "id": 1, "title": "Title 1", "body": "Body 1"},
        {"userId": 1, "id": 2, "title": "Title 2", "body": "Body 2"}
    ])
}

pub fn sample_post(id: i64) -> Value {
    json!({"userId": 1, "id": id, "title": format!("Title {}", id), "body": "Body"})
}

pub fn sample_comments(post_id: i64) -> Value {
    json!([
        {"postId": post_id, "id": 5, "name": "fifth", "email": "five@example.com", "body": "c5"},
        {"postId": post_id, "id": 2, "name": "second", "email": "two@example.com", "body": "c2"}
    ])
}

/// Assert both trace headers are present and well formed.
pub fn assert_traced(reply: &Reply) {
    let trace_id = reply
        .headers
        .get("x-trace-id")
        .expect("missing x-trace-id")
        .to_str()
        .unwrap();
    let span_id = reply
        .headers
        .get("x-span-id")
        .expect("missing x-span-id")
        .to_str()
        .unwrap();
    assert_eq!(trace_id.len(), 32);
    assert_eq!(span_id.len(), 16);
}

pub fn assert_wire_error(reply: &Reply, status: u16, detail: &str) {
    assert_eq!(reply.status.as_u16(), status);
    assert_eq!(reply.body["status"], status);
    assert_eq!(reply.body["title"], "API Error Occurred");
    assert_eq!(reply.body["detail"], detail);
}
