//! Per-user async locks taken in ascending id order.
//!
//! Two operations on the same pair in opposite directions (A proposes to B
//! while B proposes to A) both lock the lower id first, so they serialize
//! instead of deadlocking.

use crate::domain::ConnectionError;
use parking_lot::Mutex;
use shared_types::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::{timeout_at, Instant};

type LockMap = HashMap<UserId, Arc<AsyncMutex<()>>>;

/// Lazily populated table of per-user locks.
#[derive(Debug, Default, Clone)]
pub struct PairLockTable {
    locks: Arc<Mutex<LockMap>>,
}

impl PairLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, user: UserId) -> Arc<AsyncMutex<()>> {
        Arc::clone(self.locks.lock().entry(user).or_default())
    }

    /// Lock both users, lower id first, giving up after `wait`.
    pub async fn acquire(
        &self,
        a: UserId,
        b: UserId,
        wait: Duration,
    ) -> Result<PairGuard, ConnectionError> {
        let deadline = Instant::now() + wait;
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let mut order = vec![first];
        if second != first {
            order.push(second);
        }

        // Built before waiting so a timed-out or cancelled acquire still
        // prunes its entries when this guard drops.
        let mut pair = PairGuard {
            table: self.clone(),
            guards: Vec::with_capacity(order.len()),
            users: order,
        };
        for i in 0..pair.users.len() {
            let lock = self.entry(pair.users[i]);
            match timeout_at(deadline, lock.lock_owned()).await {
                Ok(guard) => pair.guards.push(guard),
                Err(_) => return Err(ConnectionError::Timeout { waited: wait }),
            }
        }
        Ok(pair)
    }

    /// Drop lock entries no one else references.
    fn prune(&self, users: &[UserId]) {
        let mut locks = self.locks.lock();
        for user in users {
            if locks.get(user).is_some_and(|l| Arc::strong_count(l) == 1) {
                locks.remove(user);
            }
        }
    }

    /// Number of users with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds the locks of one pair until dropped.
#[derive(Debug)]
pub struct PairGuard {
    table: PairLockTable,
    users: Vec<UserId>,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl PairGuard {
    pub fn users(&self) -> &[UserId] {
        &self.users
    }
}

impl Drop for PairGuard {
    fn drop(&mut self) {
        self.guards.clear();
        self.table.prune(&self.users);
    }
}
