//! Read-only gateway for an upstream blog/comment API.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod service;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use error::{GatewayError, NormalizedError, WireError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
