//! REST surface of the connection subsystem.

pub mod connections;
pub mod dto;
pub mod extract;

pub use extract::{Actor, JsonBody};

use axum::Json;
use serde_json::{json, Value};

/// `GET /health`
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
