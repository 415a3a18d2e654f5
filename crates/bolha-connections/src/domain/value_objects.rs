//! Operation results, query projections and tunables.

use super::entities::MAX_CONNECTIONS;
use serde::{Deserialize, Serialize};
use shared_types::UserProfile;
use std::time::Duration;

/// Relationship between an ordered pair (A asks about B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    /// No relationship.
    None,
    /// A proposed, awaiting B.
    OutgoingFromA,
    /// B proposed, awaiting A.
    IncomingToA,
    /// Mutually accepted.
    Connected,
}

impl RelationshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OutgoingFromA => "outgoing_from_a",
            Self::IncomingToA => "incoming_to_a",
            Self::Connected => "connected",
        }
    }
}

/// Successful result of a `propose` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposeOutcome {
    /// A new pending request was recorded.
    Requested,
    /// The same request was already pending; nothing was written.
    AlreadyRequested,
    /// The target had already proposed to the actor; `accept` completes it.
    /// Only produced under [`CollisionPolicy::Report`].
    ReciprocalPending,
    /// The target had already proposed to the actor and the crossing
    /// proposals were resolved into a connection.
    Connected,
}

impl ProposeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::AlreadyRequested => "already_requested",
            Self::ReciprocalPending => "reciprocal_pending",
            Self::Connected => "connected",
        }
    }
}

/// How `propose` treats a request that crosses an existing one in the
/// opposite direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Complete the connection inside `propose`.
    #[default]
    AutoAccept,
    /// Leave state untouched and return `ReciprocalPending`.
    Report,
}

/// Answer of the `status` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub status: RelationshipStatus,
    /// The asking account has no free connection slot.
    pub a_at_capacity: bool,
    /// The other account has no free connection slot.
    pub b_at_capacity: bool,
}

/// Pending requests of one account, as minimal profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequests {
    /// Requests other accounts sent to this one.
    pub incoming: Vec<UserProfile>,
    /// Requests this account sent.
    pub outgoing: Vec<UserProfile>,
}

/// Tunables of the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionPolicy {
    /// Connection ceiling per account.
    pub capacity: usize,
    /// Compare-and-swap attempts before giving up.
    pub max_retries: u32,
    /// Upper bound on waiting for the pair lock.
    pub lock_timeout: Duration,
    /// Backoff after the first version conflict; doubles per attempt.
    pub retry_backoff: Duration,
    /// Cap on a single backoff sleep.
    pub max_backoff: Duration,
    pub collision_policy: CollisionPolicy,
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        Self {
            capacity: MAX_CONNECTIONS,
            max_retries: 5,
            lock_timeout: Duration::from_secs(2),
            retry_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(200),
            collision_policy: CollisionPolicy::AutoAccept,
        }
    }
}

impl ConnectionPolicy {
    /// Sleep before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let delay = self.retry_backoff.saturating_mul(1u32 << shift);
        delay.min(self.max_backoff)
    }
}
