//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, access log, metrics, trace context,
//!   panic catching)
//! - Bind server to listener
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::error::presenter::panic_response;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::metrics;
use crate::observability::tracing::{propagate_trace_context, TracePropagator};
use crate::service::PostService;
use crate::upstream::{ClientSetupError, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: PostService,
}

/// Failure while assembling the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Upstream(#[from] ClientSetupError),

    #[error("Invalid trace header name: {0}")]
    TraceHeader(#[from] axum::http::header::InvalidHeaderName),
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server talking to the configured upstream.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let client = UpstreamClient::from_config(&config.upstream)?;
        Self::with_client(config, client)
    }

    /// Create a server around an already-built upstream client.
    pub fn with_client(config: GatewayConfig, client: UpstreamClient) -> Result<Self, ServerError> {
        let propagator = Arc::new(TracePropagator::from_config(&config.tracing)?);
        let state = AppState {
            service: PostService::new(client),
        };

        let router = build_router(state, propagator);
        Ok(Self { router, config })
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all routes and middleware layers.
pub fn build_router(state: AppState, propagator: Arc<TracePropagator>) -> Router {
    let routes = Router::new()
        .route("/posts", get(handlers::list_posts))
        .route("/posts/{id}", get(handlers::get_post))
        .route("/posts/{id}/comments", get(handlers::get_post_with_comments))
        .route("/comments", get(handlers::get_comments_for_post))
        .route("/health", get(handlers::health))
        .route("/info", get(handlers::info))
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state);

    with_boundary_layers(routes, propagator)
}

/// Layers applied outside the routes, innermost first.
///
/// The trace propagator wraps the panic catcher so panic responses are
/// stamped too, and wraps the access log so its spans carry the ids.
fn with_boundary_layers(router: Router, propagator: Arc<TracePropagator>) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(propagator, propagate_trace_context))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use std::sync::Mutex;
    use tower::ServiceExt;
    use tracing::span::{Attributes, Id};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;

    use crate::error::WireError;

    async fn boom() -> &'static str {
        panic!("handler exploded")
    }

    fn panicking_router() -> Router {
        let routes: Router = Router::new().route("/boom", get(boom));
        with_boundary_layers(routes, Arc::new(TracePropagator::default()))
    }

    #[tokio::test]
    async fn test_panic_is_presented_and_stamped() {
        let response = panicking_router()
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key("x-trace-id"));
        assert!(response.headers().contains_key("x-span-id"));
        assert!(response.headers().contains_key("x-request-id"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let wire: WireError = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(wire.status, 500);
        assert_eq!(wire.title, "API Error Occurred");
        assert_eq!(wire.detail, "handler exploded");
    }

    /// Records each new span's target and its parent's target.
    #[derive(Clone, Default)]
    struct SpanParents(Arc<Mutex<Vec<(String, Option<String>)>>>);

    impl<S> Layer<S> for SpanParents
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(&self, _attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            if let Some(span) = ctx.span(id) {
                let parent = span.parent().map(|p| p.metadata().target().to_string());
                self.0
                    .lock()
                    .unwrap()
                    .push((span.metadata().target().to_string(), parent));
            }
        }
    }

    #[tokio::test]
    async fn test_access_log_span_is_inside_trace_span() {
        let spans = SpanParents::default();
        let subscriber = tracing_subscriber::registry().with(spans.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let _ = panicking_router()
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let recorded = spans.0.lock().unwrap().clone();
        let access = recorded
            .iter()
            .find(|(target, _)| target.starts_with("tower_http"))
            .expect("no tower_http span recorded");
        assert_eq!(
            access.1.as_deref(),
            Some("post_gateway::observability::tracing")
        );
    }

    #[tokio::test]
    async fn test_caller_request_id_is_echoed() {
        let response = panicking_router()
            .oneshot(
                Request::get("/missing")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
    }
}
