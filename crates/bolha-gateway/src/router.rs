use crate::domain::config::GatewayConfig;
use crate::middleware::{create_cors_layer, AuthLayer, TimeoutLayer, TracingLayer};
use crate::rest::{connections, health_check};
use axum::{
    routing::{get, post},
    Router,
};
use bolha_connections::ConnectionApi;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ConnectionApi>,
    /// Header carrying the authenticated actor id
    pub actor_header: Arc<str>,
}

impl AppState {
    pub fn new(api: Arc<dyn ConnectionApi>, actor_header: impl Into<String>) -> Self {
        Self {
            api,
            actor_header: Arc::from(actor_header.into()),
        }
    }
}

/// Build the HTTP router with the full middleware stack.
///
/// Each `layer` call wraps everything added before it, so the body limit
/// sits closest to the handlers and tracing is outermost.
pub fn build_router(api: Arc<dyn ConnectionApi>, config: &GatewayConfig) -> Router {
    let state = AppState::new(api, config.auth.actor_header.clone());

    Router::new()
        .route("/connections", get(connections::list_connections))
        .route("/connections/pending", get(connections::list_pending))
        .route("/connections/status/:peer_id", get(connections::status))
        .route("/connections/request", post(connections::propose))
        .route("/connections/accept", post(connections::accept))
        .route("/connections/reject", post(connections::reject))
        .route("/connections/cancel", post(connections::cancel))
        .route("/connections/remove", post(connections::remove))
        .route("/health", get(health_check))
        .layer(RequestBodyLimitLayer::new(config.http.max_body_bytes))
        .layer(TimeoutLayer::new(config.http.request_timeout))
        .layer(AuthLayer::new(config.auth.api_key.clone()))
        .layer(create_cors_layer(&config.cors))
        .layer(TracingLayer::new(config.auth.actor_header.clone()))
        .with_state(state)
}
