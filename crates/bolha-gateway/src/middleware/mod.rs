//! Middleware stack for the gateway.
//!
//! Layer order (outermost first): Tracing → CORS → Auth → Timeout →
//! body limit → handler.

pub mod auth;
pub mod cors;
pub mod timeout;
pub mod tracing;

pub use auth::{actor_from_headers, constant_time_compare, AuthLayer};
pub use cors::create_cors_layer;
pub use timeout::TimeoutLayer;
pub use tracing::TracingLayer;
