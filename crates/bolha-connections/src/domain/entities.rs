//! Per-user relationship state and its version token.

use super::value_objects::RelationshipStatus;
use serde::{Deserialize, Serialize};
use shared_types::UserId;
use std::collections::BTreeSet;

/// Maximum number of simultaneous accepted connections per account.
pub const MAX_CONNECTIONS: usize = 15;

/// Relationship state of one account.
///
/// The three sets are disjoint for every peer and never contain the owner.
/// Symmetry with the peer's own record is maintained by the lifecycle
/// engine, which always rewrites both records together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConnectionState {
    /// Mutually accepted peers.
    pub accepted: BTreeSet<UserId>,
    /// Peers this account asked to connect, not yet answered.
    pub outgoing_pending: BTreeSet<UserId>,
    /// Peers that asked this account to connect, not yet answered.
    pub incoming_pending: BTreeSet<UserId>,
}

impl UserConnectionState {
    /// Relationship with `peer` as seen from this account.
    #[must_use]
    pub fn relation_to(&self, peer: UserId) -> RelationshipStatus {
        if self.accepted.contains(&peer) {
            RelationshipStatus::Connected
        } else if self.outgoing_pending.contains(&peer) {
            RelationshipStatus::OutgoingFromA
        } else if self.incoming_pending.contains(&peer) {
            RelationshipStatus::IncomingToA
        } else {
            RelationshipStatus::None
        }
    }

    /// Number of accepted connections.
    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    /// Whether `peer` appears in any of the three sets.
    #[must_use]
    pub fn mentions(&self, peer: UserId) -> bool {
        self.accepted.contains(&peer)
            || self.outgoing_pending.contains(&peer)
            || self.incoming_pending.contains(&peer)
    }

    /// Remove `peer` from every set.
    pub(crate) fn forget(&mut self, peer: UserId) {
        self.accepted.remove(&peer);
        self.outgoing_pending.remove(&peer);
        self.incoming_pending.remove(&peer);
    }

    /// Remove `peer` from both pending sets, leaving `accepted` untouched.
    pub(crate) fn clear_pending(&mut self, peer: UserId) {
        self.outgoing_pending.remove(&peer);
        self.incoming_pending.remove(&peer);
    }

    /// True when no set holds anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.outgoing_pending.is_empty() && self.incoming_pending.is_empty()
    }
}

/// Opaque version token used for compare-and-swap commits.
///
/// A record that was never written has version zero; every successful
/// commit advances it by one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVersion(u64);

impl StateVersion {
    /// Version of a record that has never been committed.
    pub const INITIAL: Self = Self(0);

    /// Version following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A state together with the version it was read at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedState {
    pub state: UserConnectionState,
    pub version: StateVersion,
}
