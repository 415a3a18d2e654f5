//! Connection error types.
//!
//! Defines all error conditions for the connection subsystem, plus the
//! coarse [`ErrorKind`] the HTTP surface maps status codes from.

use shared_types::UserId;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which party of an operation an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The account performing the operation.
    Actor,
    /// The other account.
    Peer,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Actor => "actor",
            Self::Peer => "peer",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a [`ConnectionError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Capacity,
    Conflict,
    ConcurrentModification,
    Timeout,
    Auth,
    NotFound,
    Internal,
}

/// Connection error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Actor and target are the same account.
    #[error("user {0} cannot target themselves")]
    SelfTarget(UserId),

    /// One party already holds the maximum number of connections.
    #[error("user {user} ({side}) already has {capacity} connections")]
    CapacityExceeded {
        user: UserId,
        side: Side,
        capacity: usize,
    },

    /// The pair is already connected.
    #[error("users {actor} and {peer} are already connected")]
    AlreadyConnected { actor: UserId, peer: UserId },

    /// There is no pending request to accept, reject or cancel.
    #[error("no pending request between {actor} and {peer}")]
    NoPendingRequest { actor: UserId, peer: UserId },

    /// `remove` on a pair that is not connected.
    #[error("users {actor} and {peer} are not connected")]
    NotConnected { actor: UserId, peer: UserId },

    /// Target account does not exist.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// Authenticated actor has no profile.
    #[error("actor {0} has no profile")]
    UnknownActor(UserId),

    /// Version conflicts persisted through every retry.
    #[error("concurrent modification persisted after {attempts} attempts")]
    ConcurrentModification { attempts: u32 },

    /// Could not obtain the pair lock in time.
    #[error("timed out after {waited:?} waiting for the pair lock")]
    Timeout { waited: Duration },

    /// A computed next state broke a structural invariant. Nothing was written.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Persistence failed.
    #[error("store error: {0}")]
    Store(String),
}

impl ConnectionError {
    /// Coarse classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SelfTarget(_) => ErrorKind::Validation,
            Self::CapacityExceeded { .. } => ErrorKind::Capacity,
            Self::AlreadyConnected { .. } | Self::NotConnected { .. } => ErrorKind::Conflict,
            Self::NoPendingRequest { .. } | Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::UnknownActor(_) => ErrorKind::Auth,
            Self::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InvariantViolation(_) | Self::Store(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SelfTarget(_) => "self_target",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::AlreadyConnected { .. } => "already_connected",
            Self::NoPendingRequest { .. } => "no_pending_request",
            Self::NotConnected { .. } => "not_connected",
            Self::UserNotFound(_) => "user_not_found",
            Self::UnknownActor(_) => "unknown_actor",
            Self::ConcurrentModification { .. } => "concurrent_modification",
            Self::Timeout { .. } => "timeout",
            Self::InvariantViolation(_) | Self::Store(_) => "internal",
        }
    }

    /// Whether a client may reasonably retry the same call.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentModification { .. } | Self::Timeout { .. }
        )
    }
}

/// Errors from a [`ConnectionStore`](crate::ports::ConnectionStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Stored version differs from the expected one.
    #[error("version conflict on user {user}")]
    VersionConflict { user: UserId },

    /// Both halves of a pair commit name the same user.
    #[error("pair commit names user {0} twice")]
    SamePair(UserId),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("data directory lock: {0}")]
    Lock(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

impl From<StoreError> for ConnectionError {
    fn from(e: StoreError) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
