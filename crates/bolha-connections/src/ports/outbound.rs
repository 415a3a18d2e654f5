//! Outbound (Driven) ports for the connection subsystem.
//!
//! These traits define the dependencies the lifecycle engine needs:
//! relationship storage, the profile formatter and the notification hook.

use crate::domain::{StateVersion, StoreError, UserConnectionState, VersionedState};
use shared_bus::ConnectionEvent;
use shared_types::{UserId, UserProfile};
use std::sync::Arc;

/// One half of a compare-and-swap write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub user: UserId,
    /// Full replacement state.
    pub state: UserConnectionState,
    /// Version the state was derived from.
    pub expected: StateVersion,
}

impl CommitRequest {
    pub fn new(user: UserId, state: UserConnectionState, expected: StateVersion) -> Self {
        Self {
            user,
            state,
            expected,
        }
    }
}

/// Versioned per-user relationship storage.
///
/// Records are replaced whole. There is no field-level update.
pub trait ConnectionStore: Send + Sync {
    /// Read a user's state.
    ///
    /// A user that was never written yields an empty state at
    /// [`StateVersion::INITIAL`]. Loading never creates a record.
    fn load(&self, user: UserId) -> Result<VersionedState, StoreError>;

    /// Replace one record if its stored version still equals `expected`.
    ///
    /// # Returns
    /// - `Ok(version)`: the new version
    /// - `Err(StoreError::VersionConflict)`: someone else committed first
    fn commit(
        &self,
        user: UserId,
        state: UserConnectionState,
        expected: StateVersion,
    ) -> Result<StateVersion, StoreError>;

    /// Replace two records together.
    ///
    /// Either both versions match and both records are written, or nothing
    /// is written and the first mismatching user is reported.
    fn commit_pair(
        &self,
        first: CommitRequest,
        second: CommitRequest,
    ) -> Result<(StateVersion, StateVersion), StoreError>;
}

/// Minimal profile formatter shared with the rest of the platform.
pub trait ProfileDirectory: Send + Sync {
    /// Profile for `user`, if the account exists.
    fn profile(&self, user: UserId) -> Option<UserProfile>;

    /// Whether the account exists.
    fn exists(&self, user: UserId) -> bool {
        self.profile(user).is_some()
    }
}

/// Notification hook fired after a transition commits.
///
/// Implementations must return promptly and must not fail the caller;
/// delivery problems are theirs to log.
pub trait ConnectionNotifier: Send + Sync {
    fn notify(&self, event: ConnectionEvent);
}

impl<T: ConnectionStore + ?Sized> ConnectionStore for Arc<T> {
    fn load(&self, user: UserId) -> Result<VersionedState, StoreError> {
        (**self).load(user)
    }

    fn commit(
        &self,
        user: UserId,
        state: UserConnectionState,
        expected: StateVersion,
    ) -> Result<StateVersion, StoreError> {
        (**self).commit(user, state, expected)
    }

    fn commit_pair(
        &self,
        first: CommitRequest,
        second: CommitRequest,
    ) -> Result<(StateVersion, StateVersion), StoreError> {
        (**self).commit_pair(first, second)
    }
}

impl<T: ProfileDirectory + ?Sized> ProfileDirectory for Arc<T> {
    fn profile(&self, user: UserId) -> Option<UserProfile> {
        (**self).profile(user)
    }

    fn exists(&self, user: UserId) -> bool {
        (**self).exists(user)
    }
}

impl<T: ConnectionNotifier + ?Sized> ConnectionNotifier for Arc<T> {
    fn notify(&self, event: ConnectionEvent) {
        (**self).notify(event)
    }
}
