//! Upstream integration subsystem.
//!
//! # Data Flow
//! ```text
//! service layer
//!     → client.rs (URL building, decoding, error mapping)
//!     → transport.rs (GET over reqwest, request/response logging)
//!     → upstream blog API
//! ```
//!
//! # Design Decisions
//! - Read-only: only GET is ever issued
//! - No caching, retries, or pagination
//! - Transport is a trait object so tests can swap in fakes

pub mod client;
pub mod transport;
pub mod types;

pub use client::{ClientSetupError, UpstreamClient};
pub use transport::{ReqwestTransport, TransportError, UpstreamResponse, UpstreamTransport};
pub use types::{Comment, Post, PostWithComments};
