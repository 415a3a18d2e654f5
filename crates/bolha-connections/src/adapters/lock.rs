//! # Data Directory Locking
//!
//! Keeps two gateway processes from sharing one connection snapshot.
//! Both would keep their own in-memory table and overwrite each other's
//! snapshot on every commit.
//!
//! Uses `fs2` for cross-platform advisory locking.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

/// Errors from data directory locking.
#[derive(Debug)]
pub enum LockError {
    /// Lock file could not be created.
    CreateFailed(io::Error),
    /// Another process holds the directory.
    AlreadyLocked { pid: Option<u32>, path: PathBuf },
    /// Failed to record our PID in the lock file.
    WriteFailed(io::Error),
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::CreateFailed(e) => write!(f, "Failed to create lock file: {}", e),
            LockError::AlreadyLocked { pid: Some(p), path } => write!(
                f,
                "Data directory already in use by process {} ({})",
                p,
                path.display()
            ),
            LockError::AlreadyLocked { pid: None, path } => {
                write!(f, "Data directory already in use ({})", path.display())
            }
            LockError::WriteFailed(e) => write!(f, "Failed to write PID to lock file: {}", e),
        }
    }
}

impl std::error::Error for LockError {}

/// Exclusive lock on a data directory, released on drop.
///
/// The LOCK file itself stays behind. Unlinking it would let a late opener
/// hold a lock on an orphaned inode while a newcomer locks a fresh file.
#[derive(Debug)]
pub struct DataDirLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl DataDirLock {
    const LOCK_FILE: &'static str = "LOCK";

    /// Acquire the lock without blocking.
    ///
    /// # Errors
    ///
    /// `LockError::AlreadyLocked` if another process holds it.
    pub fn acquire(data_dir: &Path) -> Result<Self, LockError> {
        let path = data_dir.join(Self::LOCK_FILE);

        // Not truncated here: the holder's PID must survive a failed attempt.
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(LockError::CreateFailed)?;

        if file.try_lock_exclusive().is_err() {
            let pid = Self::read_existing_pid(&path);
            return Err(LockError::AlreadyLocked { pid, path });
        }

        let pid = std::process::id();
        file.set_len(0).map_err(LockError::WriteFailed)?;
        writeln!(file, "{}", pid).map_err(LockError::WriteFailed)?;
        file.sync_all().map_err(LockError::WriteFailed)?;

        Ok(Self { file, path, pid })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
