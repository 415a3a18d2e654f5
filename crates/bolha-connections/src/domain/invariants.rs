//! Structural checks over relationship states.
//!
//! `check_pair` runs on every planned commit before it reaches the store.
//! `check_graph` walks a whole snapshot and is used by tests and diagnostics.

use super::entities::UserConnectionState;
use super::errors::ConnectionError;
use shared_types::UserId;
use std::collections::HashMap;
use std::fmt;

/// A broken structural rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// `b` is accepted by `a` but not the other way round.
    AsymmetricAcceptance { a: UserId, b: UserId },
    /// `a` has an outgoing request to `b` that `b` does not see as incoming,
    /// or the reverse.
    AsymmetricPending { a: UserId, b: UserId },
    /// `peer` sits in more than one of `user`'s sets.
    OverlappingRelation { user: UserId, peer: UserId },
    /// A state refers to its own owner.
    SelfReference(UserId),
    /// More accepted connections than allowed.
    OverCapacity { user: UserId, count: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsymmetricAcceptance { a, b } => {
                write!(f, "acceptance between {} and {} is one-sided", a, b)
            }
            Self::AsymmetricPending { a, b } => {
                write!(f, "pending request between {} and {} is one-sided", a, b)
            }
            Self::OverlappingRelation { user, peer } => {
                write!(f, "{} appears in several sets of {}", peer, user)
            }
            Self::SelfReference(user) => write!(f, "{} refers to itself", user),
            Self::OverCapacity { user, count } => {
                write!(f, "{} has {} accepted connections", user, count)
            }
        }
    }
}

impl From<InvariantViolation> for ConnectionError {
    fn from(v: InvariantViolation) -> Self {
        Self::InvariantViolation(v.to_string())
    }
}

fn check_local(owner: UserId, state: &UserConnectionState) -> Result<(), InvariantViolation> {
    if state.mentions(owner) {
        return Err(InvariantViolation::SelfReference(owner));
    }
    for peer in &state.accepted {
        if state.outgoing_pending.contains(peer) || state.incoming_pending.contains(peer) {
            return Err(InvariantViolation::OverlappingRelation { user: owner, peer: *peer });
        }
    }
    if let Some(peer) = state.outgoing_pending.intersection(&state.incoming_pending).next() {
        return Err(InvariantViolation::OverlappingRelation { user: owner, peer: *peer });
    }
    Ok(())
}

/// Check both states and the edge between them.
pub fn check_pair(
    a: UserId,
    a_state: &UserConnectionState,
    b: UserId,
    b_state: &UserConnectionState,
) -> Result<(), InvariantViolation> {
    check_local(a, a_state)?;
    check_local(b, b_state)?;

    if a_state.accepted.contains(&b) != b_state.accepted.contains(&a) {
        return Err(InvariantViolation::AsymmetricAcceptance { a, b });
    }
    if a_state.outgoing_pending.contains(&b) != b_state.incoming_pending.contains(&a) {
        return Err(InvariantViolation::AsymmetricPending { a, b });
    }
    if a_state.incoming_pending.contains(&b) != b_state.outgoing_pending.contains(&a) {
        return Err(InvariantViolation::AsymmetricPending { a: b, b: a });
    }
    Ok(())
}

/// Check every rule across a full snapshot.
///
/// Users absent from `states` are treated as having an empty state.
pub fn check_graph(
    states: &HashMap<UserId, UserConnectionState>,
    capacity: usize,
) -> Result<(), InvariantViolation> {
    let empty = UserConnectionState::default();
    for (user, state) in states {
        check_local(*user, state)?;
        if state.accepted.len() > capacity {
            return Err(InvariantViolation::OverCapacity {
                user: *user,
                count: state.accepted.len(),
            });
        }
        let peers = state
            .accepted
            .iter()
            .chain(&state.outgoing_pending)
            .chain(&state.incoming_pending);
        for peer in peers {
            let peer_state = states.get(peer).unwrap_or(&empty);
            check_pair(*user, state, *peer, peer_state)?;
        }
    }
    Ok(())
}
