//! # Inbound Port - ConnectionApi
//!
//! Primary driving port exposing the connection lifecycle and queries.
//!
//! Every call receives an already-authenticated actor. The port checks that
//! the actor and the other party both exist and are distinct before any
//! state is read.
//!
//! | Method | Acting party | Other party |
//! |--------|--------------|-------------|
//! | `propose` | requester | target |
//! | `accept` / `reject` | target of the request | original proposer |
//! | `cancel` | original proposer | target |
//! | `remove` | either connected party | the other |

use crate::domain::{ConnectionError, PendingRequests, ProposeOutcome, StatusReport};
use async_trait::async_trait;
use shared_types::{UserId, UserProfile};

/// Primary API for the connection subsystem.
///
/// # Example
///
/// ```rust,ignore
/// use bolha_connections::ports::ConnectionApi;
///
/// async fn example(api: &dyn ConnectionApi, alice: UserId, bob: UserId) {
///     api.propose(alice, bob).await?;
///     api.accept(bob, alice).await?;
///     assert_eq!(api.status(alice, bob).await?.status, RelationshipStatus::Connected);
/// }
/// ```
#[async_trait]
pub trait ConnectionApi: Send + Sync {
    /// Ask `target` to connect.
    ///
    /// # Errors
    /// - `SelfTarget`: actor and target are the same
    /// - `AlreadyConnected`: the pair is connected
    /// - `CapacityExceeded`: either party is full
    async fn propose(&self, actor: UserId, target: UserId)
        -> Result<ProposeOutcome, ConnectionError>;

    /// Accept the request `proposer` sent to `actor`.
    ///
    /// # Errors
    /// - `NoPendingRequest`: no such request
    /// - `CapacityExceeded`: either party filled up since the request; the
    ///   request stays pending
    async fn accept(&self, actor: UserId, proposer: UserId) -> Result<(), ConnectionError>;

    /// Decline the request `proposer` sent to `actor`.
    async fn reject(&self, actor: UserId, proposer: UserId) -> Result<(), ConnectionError>;

    /// Withdraw the request `actor` sent to `target`.
    async fn cancel(&self, actor: UserId, target: UserId) -> Result<(), ConnectionError>;

    /// Remove an accepted connection.
    ///
    /// # Errors
    /// - `NotConnected`: the pair is not connected
    async fn remove(&self, actor: UserId, peer: UserId) -> Result<(), ConnectionError>;

    /// Profiles of every accepted connection of `user`, ordered by id.
    async fn list_connections(&self, user: UserId) -> Result<Vec<UserProfile>, ConnectionError>;

    /// Incoming and outgoing pending requests of `user`.
    async fn list_pending(&self, user: UserId) -> Result<PendingRequests, ConnectionError>;

    /// Relationship of `a` towards `b` plus both capacity flags.
    async fn status(&self, a: UserId, b: UserId) -> Result<StatusReport, ConnectionError>;
}
