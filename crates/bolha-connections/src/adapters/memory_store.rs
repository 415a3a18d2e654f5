//! In-memory connection store.
//!
//! `VersionedTable` holds the compare-and-swap logic. `InMemoryConnectionStore`
//! wraps it behind a lock; the file store reuses it for its working copy.

use crate::domain::{StateVersion, StoreError, UserConnectionState, VersionedState};
use crate::ports::{CommitRequest, ConnectionStore};
use parking_lot::RwLock;
use shared_types::UserId;
use std::collections::HashMap;

/// Map of versioned records with CAS helpers.
#[derive(Debug, Clone, Default)]
pub struct VersionedTable {
    records: HashMap<UserId, VersionedState>,
}

impl VersionedTable {
    pub fn from_records(records: HashMap<UserId, VersionedState>) -> Self {
        Self { records }
    }

    pub fn get(&self, user: UserId) -> VersionedState {
        self.records.get(&user).cloned().unwrap_or_default()
    }

    pub fn version(&self, user: UserId) -> StateVersion {
        self.records
            .get(&user)
            .map(|r| r.version)
            .unwrap_or(StateVersion::INITIAL)
    }

    fn ensure(&self, req: &CommitRequest) -> Result<(), StoreError> {
        if self.version(req.user) == req.expected {
            Ok(())
        } else {
            Err(StoreError::VersionConflict { user: req.user })
        }
    }

    /// Check a single CAS without applying it.
    pub fn check(&self, req: &CommitRequest) -> Result<StateVersion, StoreError> {
        self.ensure(req)?;
        Ok(req.expected.next())
    }

    /// Check both halves of a pair CAS without applying it.
    pub fn check_pair(
        &self,
        first: &CommitRequest,
        second: &CommitRequest,
    ) -> Result<(StateVersion, StateVersion), StoreError> {
        if first.user == second.user {
            return Err(StoreError::SamePair(first.user));
        }
        self.ensure(first)?;
        self.ensure(second)?;
        Ok((first.expected.next(), second.expected.next()))
    }

    /// Write a request whose version was already checked.
    pub fn apply(&mut self, req: CommitRequest) -> StateVersion {
        let version = req.expected.next();
        self.records.insert(
            req.user,
            VersionedState {
                state: req.state,
                version,
            },
        );
        version
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &HashMap<UserId, VersionedState> {
        &self.records
    }

    /// Plain states without versions.
    pub fn states(&self) -> HashMap<UserId, UserConnectionState> {
        self.records
            .iter()
            .map(|(user, record)| (*user, record.state.clone()))
            .collect()
    }
}

/// Volatile store. All records live behind one `RwLock`, so a pair commit
/// is a single critical section.
#[derive(Debug, Default)]
pub struct InMemoryConnectionStore {
    table: RwLock<VersionedTable>,
}

impl InMemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a committed record.
    pub fn snapshot_len(&self) -> usize {
        self.table.read().len()
    }

    /// Copy of every committed state.
    pub fn snapshot(&self) -> HashMap<UserId, UserConnectionState> {
        self.table.read().states()
    }
}

impl ConnectionStore for InMemoryConnectionStore {
    fn load(&self, user: UserId) -> Result<VersionedState, StoreError> {
        Ok(self.table.read().get(user))
    }

    fn commit(
        &self,
        user: UserId,
        state: UserConnectionState,
        expected: StateVersion,
    ) -> Result<StateVersion, StoreError> {
        let mut table = self.table.write();
        let req = CommitRequest::new(user, state, expected);
        table.check(&req)?;
        Ok(table.apply(req))
    }

    fn commit_pair(
        &self,
        first: CommitRequest,
        second: CommitRequest,
    ) -> Result<(StateVersion, StateVersion), StoreError> {
        let mut table = self.table.write();
        table.check_pair(&first, &second)?;
        Ok((table.apply(first), table.apply(second)))
    }
}
