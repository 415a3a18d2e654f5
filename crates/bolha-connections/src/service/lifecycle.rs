//! Request lifecycle engine: the five mutating operations.

use super::ConnectionService;
use crate::domain::{
    check_pair, plan_accept, plan_cancel, plan_propose, plan_reject, plan_remove,
    ConnectionError, Pair, Plan, ProposeOutcome,
};
use crate::ports::{CommitRequest, ConnectionNotifier, ConnectionStore, ProfileDirectory};
use shared_types::UserId;
use tracing::{debug, error, info, warn};

impl<S, P, N> ConnectionService<S, P, N>
where
    S: ConnectionStore,
    P: ProfileDirectory,
    N: ConnectionNotifier,
{
    /// Run one mutating operation to completion.
    ///
    /// The pair lock is held across every attempt. Each attempt reloads both
    /// records and plans from scratch, so a retry never applies an effect
    /// twice.
    async fn mutate<T, F>(
        &self,
        op: &'static str,
        actor: UserId,
        peer: UserId,
        plan: F,
    ) -> Result<T, ConnectionError>
    where
        F: Fn(&Pair) -> Result<Plan<T>, ConnectionError> + Send + Sync,
        T: Send,
    {
        self.check_parties(actor, peer)?;
        let _guard = self
            .locks
            .acquire(actor, peer, self.policy.lock_timeout)
            .await
            .map_err(|e| {
                warn!(op, actor = %actor, peer = %peer, error = %e, "Pair lock not acquired");
                e
            })?;

        let max_attempts = self.policy.max_retries.max(1);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let actor_record = self.store.load(actor)?;
            let peer_record = self.store.load(peer)?;
            let pair = Pair {
                actor,
                peer,
                actor_state: actor_record.state,
                peer_state: peer_record.state,
            };

            let Plan {
                outcome,
                next,
                event,
            } = plan(&pair).map_err(|e| {
                debug!(op, actor = %actor, peer = %peer, code = e.code(), "Operation refused");
                e
            })?;

            let Some((actor_next, peer_next)) = next else {
                debug!(op, actor = %actor, peer = %peer, "No change required");
                return Ok(outcome);
            };

            if let Err(violation) = check_pair(actor, &actor_next, peer, &peer_next) {
                error!(op, actor = %actor, peer = %peer, %violation, "Planned state rejected");
                return Err(violation.into());
            }

            let committed = self.store.commit_pair(
                CommitRequest::new(actor, actor_next, actor_record.version),
                CommitRequest::new(peer, peer_next, peer_record.version),
            );

            match committed {
                Ok(_) => {
                    info!(op, actor = %actor, peer = %peer, attempt, "Connection transition committed");
                    if let Some(event) = event {
                        self.notifier.notify(event);
                    }
                    return Ok(outcome);
                }
                Err(e) if e.is_conflict() => {
                    if attempt >= max_attempts {
                        warn!(op, actor = %actor, peer = %peer, attempt, "Retries exhausted");
                        return Err(ConnectionError::ConcurrentModification { attempts: attempt });
                    }
                    let delay = self.policy.backoff_delay(attempt);
                    debug!(op, attempt, ?delay, error = %e, "Version conflict, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(op, actor = %actor, peer = %peer, error = %e, "Store commit failed");
                    return Err(e.into());
                }
            }
        }
    }

    pub(crate) async fn do_propose(
        &self,
        actor: UserId,
        target: UserId,
    ) -> Result<ProposeOutcome, ConnectionError> {
        let enforcer = self.enforcer;
        let collision = self.policy.collision_policy;
        self.mutate("propose", actor, target, move |pair| {
            plan_propose(pair, &enforcer, collision)
        })
        .await
    }

    pub(crate) async fn do_accept(
        &self,
        actor: UserId,
        proposer: UserId,
    ) -> Result<(), ConnectionError> {
        let enforcer = self.enforcer;
        self.mutate("accept", actor, proposer, move |pair| {
            plan_accept(pair, &enforcer)
        })
        .await
    }

    pub(crate) async fn do_reject(
        &self,
        actor: UserId,
        proposer: UserId,
    ) -> Result<(), ConnectionError> {
        self.mutate("reject", actor, proposer, plan_reject).await
    }

    pub(crate) async fn do_cancel(&self, actor: UserId, target: UserId) -> Result<(), ConnectionError> {
        self.mutate("cancel", actor, target, plan_cancel).await
    }

    pub(crate) async fn do_remove(&self, actor: UserId, peer: UserId) -> Result<(), ConnectionError> {
        self.mutate("remove", actor, peer, plan_remove).await
    }
}
