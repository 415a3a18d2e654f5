//! Query service and the [`ConnectionApi`] implementation.
//!
//! Reads take no pair lock. Each record is read whole, and a pair commit
//! publishes both records at once, so no half-applied transition is ever
//! visible.

use super::ConnectionService;
use crate::domain::{ConnectionError, PendingRequests, ProposeOutcome, StatusReport};
use crate::ports::{ConnectionApi, ConnectionNotifier, ConnectionStore, ProfileDirectory};
use async_trait::async_trait;
use shared_types::{UserId, UserProfile};
use std::collections::BTreeSet;
use tracing::debug;

impl<S, P, N> ConnectionService<S, P, N>
where
    S: ConnectionStore,
    P: ProfileDirectory,
    N: ConnectionNotifier,
{
    /// Resolve ids to profiles, skipping accounts that no longer exist.
    fn profiles_of(&self, owner: UserId, ids: &BTreeSet<UserId>) -> Vec<UserProfile> {
        ids.iter()
            .filter_map(|id| {
                let profile = self.profiles.profile(*id);
                if profile.is_none() {
                    debug!(owner = %owner, peer = %id, "Skipping peer without profile");
                }
                profile
            })
            .collect()
    }
}

#[async_trait]
impl<S, P, N> ConnectionApi for ConnectionService<S, P, N>
where
    S: ConnectionStore,
    P: ProfileDirectory,
    N: ConnectionNotifier,
{
    async fn propose(
        &self,
        actor: UserId,
        target: UserId,
    ) -> Result<ProposeOutcome, ConnectionError> {
        self.do_propose(actor, target).await
    }

    async fn accept(&self, actor: UserId, proposer: UserId) -> Result<(), ConnectionError> {
        self.do_accept(actor, proposer).await
    }

    async fn reject(&self, actor: UserId, proposer: UserId) -> Result<(), ConnectionError> {
        self.do_reject(actor, proposer).await
    }

    async fn cancel(&self, actor: UserId, target: UserId) -> Result<(), ConnectionError> {
        self.do_cancel(actor, target).await
    }

    async fn remove(&self, actor: UserId, peer: UserId) -> Result<(), ConnectionError> {
        self.do_remove(actor, peer).await
    }

    async fn list_connections(&self, user: UserId) -> Result<Vec<UserProfile>, ConnectionError> {
        self.check_actor(user)?;
        let record = self.store.load(user)?;
        Ok(self.profiles_of(user, &record.state.accepted))
    }

    async fn list_pending(&self, user: UserId) -> Result<PendingRequests, ConnectionError> {
        self.check_actor(user)?;
        let record = self.store.load(user)?;
        Ok(PendingRequests {
            incoming: self.profiles_of(user, &record.state.incoming_pending),
            outgoing: self.profiles_of(user, &record.state.outgoing_pending),
        })
    }

    async fn status(&self, a: UserId, b: UserId) -> Result<StatusReport, ConnectionError> {
        self.check_parties(a, b)?;
        let a_record = self.store.load(a)?;
        let b_record = self.store.load(b)?;
        Ok(StatusReport {
            status: a_record.state.relation_to(b),
            a_at_capacity: self.enforcer.is_full(&a_record.state),
            b_at_capacity: self.enforcer.is_full(&b_record.state),
        })
    }
}
