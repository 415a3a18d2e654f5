//! # Durable File Store
//!
//! Keeps the working table in memory and mirrors every committed write to a
//! JSON snapshot in the data directory.
//!
//! ## Write path
//!
//! ```text
//! check CAS ──→ clone table ──→ apply ──→ write tmp ──→ fsync ──→ rename ──→ publish
//!                                              │
//!                                              └── any failure: memory and disk unchanged
//! ```
//!
//! The directory is held with an exclusive [`DataDirLock`] for the lifetime
//! of the store.

use super::lock::DataDirLock;
use super::memory_store::VersionedTable;
use crate::domain::{StateVersion, StoreError, UserConnectionState, VersionedState};
use crate::ports::{CommitRequest, ConnectionStore};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::UserId;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const SNAPSHOT_FILE: &str = "connections.json";
const SNAPSHOT_TMP: &str = "connections.json.tmp";

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    user: UserId,
    version: StateVersion,
    #[serde(flatten)]
    state: UserConnectionState,
}

/// Store backed by a JSON snapshot file.
#[derive(Debug)]
pub struct FileConnectionStore {
    table: RwLock<VersionedTable>,
    dir: PathBuf,
    _lock: DataDirLock,
}

impl FileConnectionStore {
    /// Open (or create) the store in `data_dir`.
    ///
    /// # Errors
    /// - `StoreError::Lock`: another process owns the directory
    /// - `StoreError::Io` / `Serialization`: unreadable snapshot
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let lock = DataDirLock::acquire(&dir).map_err(|e| StoreError::Lock(e.to_string()))?;

        let snapshot = dir.join(SNAPSHOT_FILE);
        let table = if snapshot.exists() {
            let bytes = fs::read(&snapshot)?;
            let entries: Vec<SnapshotEntry> = serde_json::from_slice(&bytes)?;
            let records: HashMap<UserId, VersionedState> = entries
                .into_iter()
                .map(|e| {
                    (
                        e.user,
                        VersionedState {
                            state: e.state,
                            version: e.version,
                        },
                    )
                })
                .collect();
            VersionedTable::from_records(records)
        } else {
            VersionedTable::default()
        };

        info!(
            dir = %dir.display(),
            users = table.len(),
            "Opened connection snapshot"
        );

        Ok(Self {
            table: RwLock::new(table),
            dir,
            _lock: lock,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    /// Number of users with a committed record.
    pub fn snapshot_len(&self) -> usize {
        self.table.read().len()
    }

    /// Copy of every committed state.
    pub fn snapshot(&self) -> HashMap<UserId, UserConnectionState> {
        self.table.read().states()
    }

    fn persist(&self, table: &VersionedTable) -> Result<(), StoreError> {
        let mut entries: Vec<SnapshotEntry> = table
            .records()
            .iter()
            .map(|(user, record)| SnapshotEntry {
                user: *user,
                version: record.version,
                state: record.state.clone(),
            })
            .collect();
        entries.sort_by_key(|e| e.user);
        let bytes = serde_json::to_vec_pretty(&entries)?;

        let tmp = self.dir.join(SNAPSHOT_TMP);
        let result = (|| -> Result<(), StoreError> {
            let mut file = File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            fs::rename(&tmp, self.dir.join(SNAPSHOT_FILE))?;
            Ok(())
        })();

        if let Err(e) = &result {
            error!(error = %e, dir = %self.dir.display(), "Failed to persist connection snapshot");
            let _ = fs::remove_file(&tmp);
        }
        result
    }
}

impl ConnectionStore for FileConnectionStore {
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

        let mut next = table.clone();
        let version = next.apply(req);
        self.persist(&next)?;
        *table = next;
        Ok(version)
    }

    fn commit_pair(
        &self,
        first: CommitRequest,
        second: CommitRequest,
    ) -> Result<(StateVersion, StateVersion), StoreError> {
        let mut table = self.table.write();
        table.check_pair(&first, &second)?;

        let mut next = table.clone();
        let versions = (next.apply(first), next.apply(second));
        self.persist(&next)?;
        *table = next;
        Ok(versions)
    }
}
