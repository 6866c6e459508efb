//! Trace headers on success and failure paths, with tracing on and off.

use axum::http::StatusCode;
use httpmock::prelude::*;
use std::time::Duration;

use post_gateway::lifecycle::Shutdown;
use post_gateway::HttpServer;

mod common;
use common::{assert_traced, get, send};

const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

async fn upstream_with_everything() -> MockServer {
    let upstream = MockServer::start_async().await;
    upstream
        .mock_async(|when, then| {
            when.method(GET).path("/posts");
            then.status(200).json_body(common::sample_posts());
        })
        .await;
    upstream
        .mock_async(|when, then| {
            when.method(GET).path("/posts/1");
            then.status(200).json_body(common::sample_post(1));
        })
        .await;
    upstream
        .mock_async(|when, then| {
            when.method(GET).path("/posts/1/comments");
            then.status(200).json_body(common::sample_comments(1));
        })
        .await;
    upstream
        .mock_async(|when, then| {
            when.method(GET).path("/comments");
            then.status(200).json_body(common::sample_comments(1));
        })
        .await;
    upstream
        .mock_async(|when, then| {
            when.method(GET).path("/posts/2");
            then.status(404).body("{}");
        })
        .await;
    upstream
}

const ENDPOINTS: [(&str, u16); 8] = [
    ("/posts", 200),
    ("/posts/1", 200),
    ("/posts/1/comments", 200),
    ("/comments?postId=1", 200),
    ("/posts/2", 404),
    ("/posts/abc", 400),
    ("/posts/2/comments", 404),
    ("/comments", 400),
];

#[tokio::test]
async fn test_every_endpoint_is_stamped_when_tracing_is_active() {
    let upstream = upstream_with_everything().await;
    let gateway = common::gateway(&upstream);

    for (uri, status) in ENDPOINTS {
        let reply = get(&gateway, uri).await;
        assert_eq!(reply.status.as_u16(), status, "uri {}", uri);
        assert_traced(&reply);
    }
}

#[tokio::test]
async fn test_headers_omitted_when_tracing_is_disabled() {
    let upstream = upstream_with_everything().await;
    let mut config = common::config_for(&upstream);
    config.tracing.enabled = false;
    let gateway = common::gateway_with(config);

    for (uri, status) in ENDPOINTS {
        let reply = get(&gateway, uri).await;
        assert_eq!(reply.status.as_u16(), status, "uri {}", uri);
        assert!(!reply.headers.contains_key("x-trace-id"), "uri {}", uri);
        assert!(!reply.headers.contains_key("x-span-id"), "uri {}", uri);
    }
}

#[tokio::test]
async fn test_incoming_traceparent_is_continued() {
    let upstream = upstream_with_everything().await;
    let gateway = common::gateway(&upstream);

    let reply = send(
        &gateway,
        axum::http::Method::GET,
        "/posts/abc",
        &[("traceparent", TRACEPARENT)],
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.headers.get("x-trace-id").unwrap(),
        "4bf92f3577b34da6a3ce929d0e0e4736"
    );
    let span_id = reply.headers.get("x-span-id").unwrap().to_str().unwrap();
    assert_eq!(span_id.len(), 16);
    assert_ne!(span_id, "00f067aa0ba902b7");
}

#[tokio::test]
async fn test_malformed_traceparent_starts_new_trace() {
    let upstream = upstream_with_everything().await;
    let gateway = common::gateway(&upstream);

    let reply = send(
        &gateway,
        axum::http::Method::GET,
        "/posts",
        &[("traceparent", "garbage")],
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_traced(&reply);
}

#[tokio::test]
async fn test_each_request_gets_its_own_trace() {
    let upstream = upstream_with_everything().await;
    let gateway = common::gateway(&upstream);

    let first = get(&gateway, "/posts/1").await;
    let second = get(&gateway, "/posts/1").await;
    assert_ne!(
        first.headers.get("x-trace-id"),
        second.headers.get("x-trace-id")
    );
}

#[tokio::test]
async fn test_custom_header_names() {
    let upstream = upstream_with_everything().await;
    let mut config = common::config_for(&upstream);
    config.tracing.trace_id_header = "X-Correlation-Trace".into();
    config.tracing.span_id_header = "X-Correlation-Span".into();
    let gateway = common::gateway_with(config);

    let reply = get(&gateway, "/posts/abc").await;
    assert!(reply.headers.contains_key("x-correlation-trace"));
    assert!(reply.headers.contains_key("x-correlation-span"));
    assert!(!reply.headers.contains_key("x-trace-id"));
}

#[tokio::test]
async fn test_served_over_tcp_until_shutdown() {
    let upstream = upstream_with_everything().await;
    let config = common::config_for(&upstream);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .get(format!("http://{}/posts/2", addr))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 404);
    assert!(res.headers().contains_key("x-trace-id"));
    assert!(res.headers().contains_key("x-span-id"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "{}");

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
