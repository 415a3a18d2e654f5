//! Connection route handlers.
//!
//! Each handler resolves the actor, validates the other party's id and
//! makes one call on the `ConnectionApi`.

use super::dto::{
    ConnectionsBody, DataBody, PeerBody, PendingBody, ProposerBody, StatusBody, TargetBody,
};
use super::extract::{Actor, JsonBody};
use crate::domain::error::ApiError;
use crate::router::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use bolha_connections::StatusReport;
use shared_types::UserId;
use tracing::debug;

/// `POST /connections/request`
pub async fn propose(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(body): JsonBody<TargetBody>,
) -> Result<Json<StatusBody>, ApiError> {
    let target = UserId::new(body.target_id)?;
    let outcome = state.api.propose(actor, target).await?;
    debug!(actor = %actor, target = %target, outcome = outcome.as_str(), "Propose handled");
    Ok(Json(StatusBody::new(outcome.as_str())))
}

/// `POST /connections/accept`
pub async fn accept(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(body): JsonBody<ProposerBody>,
) -> Result<Json<StatusBody>, ApiError> {
    let proposer = UserId::new(body.proposer_id)?;
    state.api.accept(actor, proposer).await?;
    Ok(Json(StatusBody::new("connected")))
}

/// `POST /connections/reject`
pub async fn reject(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(body): JsonBody<ProposerBody>,
) -> Result<Json<StatusBody>, ApiError> {
    let proposer = UserId::new(body.proposer_id)?;
    state.api.reject(actor, proposer).await?;
    Ok(Json(StatusBody::new("rejected")))
}

/// `POST /connections/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(body): JsonBody<TargetBody>,
) -> Result<Json<StatusBody>, ApiError> {
    let target = UserId::new(body.target_id)?;
    state.api.cancel(actor, target).await?;
    Ok(Json(StatusBody::new("cancelled")))
}

/// `POST /connections/remove`
pub async fn remove(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(body): JsonBody<PeerBody>,
) -> Result<Json<StatusBody>, ApiError> {
    let peer = UserId::new(body.peer_id)?;
    state.api.remove(actor, peer).await?;
    Ok(Json(StatusBody::new("removed")))
}

/// `GET /connections`
pub async fn list_connections(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<ConnectionsBody>, ApiError> {
    let data = state.api.list_connections(actor).await?;
    Ok(Json(DataBody { data }))
}

/// `GET /connections/pending`
pub async fn list_pending(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<PendingBody>, ApiError> {
    let data = state.api.list_pending(actor).await?;
    Ok(Json(DataBody { data }))
}

/// `GET /connections/status/:peer_id`
pub async fn status(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(peer): Path<String>,
) -> Result<Json<StatusReport>, ApiError> {
    let peer: UserId = peer.parse()?;
    let report = state.api.status(actor, peer).await?;
    Ok(Json(report))
}
