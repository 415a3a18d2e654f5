//! Request extractors.

use crate::domain::error::ApiError;
use crate::middleware::actor_from_headers;
use crate::router::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared_types::UserId;

/// The authenticated account making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers, &state.actor_header).map(Actor)
    }
}

/// `axum::Json` with rejections rendered in the gateway error shape.
#[derive(Debug, axum::extract::FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
