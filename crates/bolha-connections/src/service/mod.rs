//! # Connection Service
//!
//! Implements [`ConnectionApi`] over injected store, profile directory and
//! notifier.
//!
//! ## Mutation pipeline
//!
//! ```text
//! validate parties ──→ lock pair (ordered, bounded) ──┐
//!                                                     ▼
//!        ┌──── reload ←── version conflict ←── load both ──→ plan ──→ check invariants
//!        │                   (backoff)                                   │
//!        └────────────────────────────────────────────────→ commit_pair ─┴─→ notify
//! ```

mod lifecycle;
mod locks;
mod query;

pub use locks::{PairGuard, PairLockTable};

use crate::domain::{CapacityEnforcer, ConnectionError, ConnectionPolicy};
use crate::ports::{ConnectionNotifier, ConnectionStore, ProfileDirectory};
use shared_types::UserId;

/// The connection service.
pub struct ConnectionService<S, P, N>
where
    S: ConnectionStore,
    P: ProfileDirectory,
    N: ConnectionNotifier,
{
    pub(crate) store: S,
    pub(crate) profiles: P,
    pub(crate) notifier: N,
    pub(crate) policy: ConnectionPolicy,
    pub(crate) enforcer: CapacityEnforcer,
    pub(crate) locks: PairLockTable,
}

/// Dependencies for ConnectionService
pub struct ConnectionDependencies<S, P, N> {
    pub store: S,
    pub profiles: P,
    pub notifier: N,
}

impl<S, P, N> ConnectionService<S, P, N>
where
    S: ConnectionStore,
    P: ProfileDirectory,
    N: ConnectionNotifier,
{
    pub fn new(deps: ConnectionDependencies<S, P, N>, policy: ConnectionPolicy) -> Self {
        Self {
            store: deps.store,
            profiles: deps.profiles,
            notifier: deps.notifier,
            enforcer: CapacityEnforcer::new(policy.capacity),
            policy,
            locks: PairLockTable::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn profiles(&self) -> &P {
        &self.profiles
    }

    pub fn policy(&self) -> &ConnectionPolicy {
        &self.policy
    }

    /// Reject self-targeting and unknown accounts before any state is read.
    pub(crate) fn check_parties(&self, actor: UserId, other: UserId) -> Result<(), ConnectionError> {
        if actor == other {
            return Err(ConnectionError::SelfTarget(actor));
        }
        self.check_actor(actor)?;
        if !self.profiles.exists(other) {
            return Err(ConnectionError::UserNotFound(other));
        }
        Ok(())
    }

    pub(crate) fn check_actor(&self, actor: UserId) -> Result<(), ConnectionError> {
        if self.profiles.exists(actor) {
            Ok(())
        } else {
            Err(ConnectionError::UnknownActor(actor))
        }
    }
}
