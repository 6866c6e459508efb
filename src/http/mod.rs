//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, boundary layers)
//!     → request.rs (request ID)
//!     → observability::tracing (trace context in, headers out)
//!     → handlers.rs (validator → upstream client via the service layer)
//!     → error::presenter (any failure → WireError JSON)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, ServerError};
