//! Connection ceiling checks.

use super::entities::UserConnectionState;
use super::errors::{ConnectionError, Side};
use shared_types::UserId;

/// Enforces the per-account connection ceiling.
///
/// Only accepted connections count. Pending requests in either direction
/// never consume a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityEnforcer {
    capacity: usize,
}

impl CapacityEnforcer {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `state` has no free slot.
    pub fn is_full(&self, state: &UserConnectionState) -> bool {
        state.accepted_count() >= self.capacity
    }

    /// Whether a new accepted edge can be created between the two states.
    pub fn can_create_accepted(
        &self,
        actor: &UserConnectionState,
        peer: &UserConnectionState,
    ) -> bool {
        !self.is_full(actor) && !self.is_full(peer)
    }

    /// Fail with the first party that has no free slot, actor checked first.
    pub fn check(
        &self,
        actor_id: UserId,
        actor: &UserConnectionState,
        peer_id: UserId,
        peer: &UserConnectionState,
    ) -> Result<(), ConnectionError> {
        if self.is_full(actor) {
            return Err(ConnectionError::CapacityExceeded {
                user: actor_id,
                side: Side::Actor,
                capacity: self.capacity,
            });
        }
        if self.is_full(peer) {
            return Err(ConnectionError::CapacityExceeded {
                user: peer_id,
                side: Side::Peer,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
