//! Pure transition planning for the five mutating operations.
//!
//! Each `plan_*` function takes both parties' freshly loaded states and
//! either rejects the operation or describes the pair of states to commit
//! and the event to emit afterwards. Nothing here touches storage, so a
//! retry after a version conflict simply plans again from the new reads.
//!
//! ```text
//!              propose                accept
//!   [None] ───────────────→ [Outgoing] ─────────→ [Connected]
//!     ↑                        │    │                  │
//!     └──── reject / cancel ───┘    │                  │
//!     └──────────────────────── remove ────────────────┘
//! ```

use super::capacity::CapacityEnforcer;
use super::entities::UserConnectionState;
use super::errors::ConnectionError;
use super::value_objects::{CollisionPolicy, ProposeOutcome, RelationshipStatus};
use shared_bus::ConnectionEvent;
use shared_types::UserId;

/// Both parties' states as read for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub actor: UserId,
    pub peer: UserId,
    pub actor_state: UserConnectionState,
    pub peer_state: UserConnectionState,
}

impl Pair {
    /// Relationship as seen from the actor.
    pub fn relation(&self) -> RelationshipStatus {
        self.actor_state.relation_to(self.peer)
    }
}

/// Result of planning one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan<T> {
    pub outcome: T,
    /// New `(actor, peer)` states, or `None` when nothing changes.
    pub next: Option<(UserConnectionState, UserConnectionState)>,
    /// Event to emit once the commit succeeded.
    pub event: Option<ConnectionEvent>,
}

impl<T> Plan<T> {
    fn unchanged(outcome: T) -> Self {
        Self {
            outcome,
            next: None,
            event: None,
        }
    }

    fn write(
        outcome: T,
        actor_state: UserConnectionState,
        peer_state: UserConnectionState,
        event: ConnectionEvent,
    ) -> Self {
        Self {
            outcome,
            next: Some((actor_state, peer_state)),
            event: Some(event),
        }
    }
}

/// Plan `propose(actor -> peer)`.
pub fn plan_propose(
    pair: &Pair,
    enforcer: &CapacityEnforcer,
    collision: CollisionPolicy,
) -> Result<Plan<ProposeOutcome>, ConnectionError> {
    match pair.relation() {
        RelationshipStatus::Connected => Err(ConnectionError::AlreadyConnected {
            actor: pair.actor,
            peer: pair.peer,
        }),
        RelationshipStatus::OutgoingFromA => Ok(Plan::unchanged(ProposeOutcome::AlreadyRequested)),
        RelationshipStatus::IncomingToA => match collision {
            CollisionPolicy::Report => Ok(Plan::unchanged(ProposeOutcome::ReciprocalPending)),
            CollisionPolicy::AutoAccept => {
                let (actor_state, peer_state) = connect(pair, enforcer)?;
                Ok(Plan::write(
                    ProposeOutcome::Connected,
                    actor_state,
                    peer_state,
                    ConnectionEvent::ConnectionAccepted {
                        a: pair.actor,
                        b: pair.peer,
                    },
                ))
            }
        },
        RelationshipStatus::None => {
            enforcer.check(pair.actor, &pair.actor_state, pair.peer, &pair.peer_state)?;
            let mut actor_state = pair.actor_state.clone();
            let mut peer_state = pair.peer_state.clone();
            actor_state.outgoing_pending.insert(pair.peer);
            peer_state.incoming_pending.insert(pair.actor);
            Ok(Plan::write(
                ProposeOutcome::Requested,
                actor_state,
                peer_state,
                ConnectionEvent::ConnectionRequested {
                    proposer: pair.actor,
                    target: pair.peer,
                },
            ))
        }
    }
}

/// Plan `accept(actor <- peer)`: the peer is the original proposer.
pub fn plan_accept(pair: &Pair, enforcer: &CapacityEnforcer) -> Result<Plan<()>, ConnectionError> {
    require_incoming(pair)?;
    let (actor_state, peer_state) = connect(pair, enforcer)?;
    Ok(Plan::write(
        (),
        actor_state,
        peer_state,
        ConnectionEvent::ConnectionAccepted {
            a: pair.actor,
            b: pair.peer,
        },
    ))
}

/// Plan `reject(actor <- peer)`.
pub fn plan_reject(pair: &Pair) -> Result<Plan<()>, ConnectionError> {
    require_incoming(pair)?;
    let (actor_state, peer_state) = drop_pending(pair);
    Ok(Plan::write(
        (),
        actor_state,
        peer_state,
        ConnectionEvent::ConnectionRejected {
            target: pair.actor,
            proposer: pair.peer,
        },
    ))
}

/// Plan `cancel(actor -> peer)`: withdraws the actor's own request.
pub fn plan_cancel(pair: &Pair) -> Result<Plan<()>, ConnectionError> {
    if !pair.actor_state.outgoing_pending.contains(&pair.peer) {
        return Err(ConnectionError::NoPendingRequest {
            actor: pair.actor,
            peer: pair.peer,
        });
    }
    let (actor_state, peer_state) = drop_pending(pair);
    Ok(Plan::write(
        (),
        actor_state,
        peer_state,
        ConnectionEvent::RequestCancelled {
            proposer: pair.actor,
            target: pair.peer,
        },
    ))
}

/// Plan `remove(actor, peer)`.
///
/// Accepts a half-recorded connection on either side so that a damaged
/// pair can still be torn down, and scrubs pending remnants in both
/// directions.
pub fn plan_remove(pair: &Pair) -> Result<Plan<()>, ConnectionError> {
    let connected = pair.actor_state.accepted.contains(&pair.peer)
        || pair.peer_state.accepted.contains(&pair.actor);
    if !connected {
        return Err(ConnectionError::NotConnected {
            actor: pair.actor,
            peer: pair.peer,
        });
    }
    let mut actor_state = pair.actor_state.clone();
    let mut peer_state = pair.peer_state.clone();
    actor_state.forget(pair.peer);
    peer_state.forget(pair.actor);
    Ok(Plan::write(
        (),
        actor_state,
        peer_state,
        ConnectionEvent::ConnectionRemoved {
            a: pair.actor,
            b: pair.peer,
        },
    ))
}

fn require_incoming(pair: &Pair) -> Result<(), ConnectionError> {
    if pair.actor_state.incoming_pending.contains(&pair.peer) {
        Ok(())
    } else {
        Err(ConnectionError::NoPendingRequest {
            actor: pair.actor,
            peer: pair.peer,
        })
    }
}

/// Capacity-checked move of the pair into `accepted` on both sides.
fn connect(
    pair: &Pair,
    enforcer: &CapacityEnforcer,
) -> Result<(UserConnectionState, UserConnectionState), ConnectionError> {
    enforcer.check(pair.actor, &pair.actor_state, pair.peer, &pair.peer_state)?;
    let mut actor_state = pair.actor_state.clone();
    let mut peer_state = pair.peer_state.clone();
    actor_state.forget(pair.peer);
    peer_state.forget(pair.actor);
    actor_state.accepted.insert(pair.peer);
    peer_state.accepted.insert(pair.actor);
    Ok((actor_state, peer_state))
}

fn drop_pending(pair: &Pair) -> (UserConnectionState, UserConnectionState) {
    let mut actor_state = pair.actor_state.clone();
    let mut peer_state = pair.peer_state.clone();
    actor_state.clear_pending(pair.peer);
    peer_state.clear_pending(pair.actor);
    (actor_state, peer_state)
}
