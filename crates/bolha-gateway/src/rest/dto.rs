//! Wire shapes for the connection routes.
//!
//! Ids arrive as plain JSON numbers and are validated into `UserId` by the
//! handlers, so a zero id reports `invalid_user_id` rather than a generic
//! body error.

use bolha_connections::PendingRequests;
use serde::{Deserialize, Serialize};
use shared_types::UserProfile;

/// `POST /connections/request` and `/connections/cancel`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetBody {
    pub target_id: u64,
}

/// `POST /connections/accept` and `/connections/reject`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposerBody {
    pub proposer_id: u64,
}

/// `POST /connections/remove`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerBody {
    pub peer_id: u64,
}

/// `{ "status": ... }` answer of every mutating route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

impl StatusBody {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

/// `{ "data": ... }` envelope of the list routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataBody<T> {
    pub data: T,
}

pub type ConnectionsBody = DataBody<Vec<UserProfile>>;
pub type PendingBody = DataBody<PendingRequests>;
