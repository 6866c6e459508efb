//! Error model and presentation.
//!
//! # Data Flow
//! ```text
//! validator / upstream client
//!     → NormalizedError (normalized.rs)
//!     → GatewayError (boundary enum, presenter.rs)
//!     → present() → WireError JSON + matching HTTP status
//! ```
//!
//! # Design Decisions
//! - Errors are values; every layer returns `Result`
//! - Conversion to wire format happens exactly once, at the boundary
//! - Bodies never expose internal type names or backtraces

pub mod normalized;
pub mod presenter;

pub use normalized::{GatewayResult, NormalizedError, DEFAULT_TITLE};
pub use presenter::{present, GatewayError, WireError, FALLBACK_DETAIL};
