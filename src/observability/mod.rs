//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (trace/span ids per request)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//!     → Callers (X-Trace-Id / X-Span-Id response headers)
//! ```
//!
//! # Design Decisions
//! - Trace ids flow through an explicit per-request value
//! - Every log line inside a request carries trace_id and span_id
//! - Metrics are opt-in

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use self::tracing::{ActiveTrace, TraceContext, TracePropagator};
