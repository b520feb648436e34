//! Process-wide registry of held locks.
//!
//! The registry exists so that one refresh heartbeat and one shutdown hook
//! cover every lock held anywhere in the process, regardless of which
//! handle acquired it. It is an explicit service rather than a hidden
//! global: construct one at startup, wrap it in an `Arc`, and hand a clone
//! to every [`FileLock`](crate::FileLock).
//!
//! A single mutex guards all mutation and iteration, so `refresh_all` and
//! `clear_all` always observe a complete, consistent snapshot of the held
//! set, never a partial one mid-mutation.

use crate::fs;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Table of lock artifact paths currently held by this process.
#[derive(Debug, Default)]
pub struct LockRegistry {
    held: Mutex<BTreeSet<PathBuf>>,
}

impl LockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` as held by this process.
    pub fn register(&self, path: &Path) {
        self.locked().insert(path.to_path_buf());
    }

    /// Forget `path`. No-op if it was never registered.
    pub fn deregister(&self, path: &Path) {
        self.locked().remove(path);
    }

    /// Rewrite every held artifact's modification time to now, extending
    /// each staleness deadline.
    ///
    /// Meant to be driven by an externally-owned periodic timer at an
    /// interval strictly smaller than the staleness timeout (see
    /// [`LockConfig::suggested_refresh_interval`](crate::LockConfig::suggested_refresh_interval)).
    /// Failures are logged and skipped; a refresh pass never fails as a
    /// whole.
    ///
    /// The rewrite is blind: if another process already reclaimed a held
    /// path as stale, refreshing resurrects an artifact this process no
    /// longer legitimately owns, silently invalidating the new holder.
    /// Keeping the refresh interval well under the timeout is what keeps
    /// that window shut.
    pub fn refresh_all(&self) {
        let held = self.locked();
        for path in held.iter() {
            if let Err(e) = fs::touch(path) {
                warn!("failed to refresh lock file '{}': {}", path.display(), e);
            }
        }
        debug!("refreshed {} held lock(s)", held.len());
    }

    /// Best-effort removal of every held artifact, then empty the set.
    ///
    /// Intended to run at process shutdown so other participants need not
    /// wait out the staleness timeout after a clean exit. Removal failures
    /// are logged and skipped; shutdown must not be blocked by them.
    pub fn clear_all(&self) {
        let mut held = self.locked();
        for path in held.iter() {
            if let Err(e) = fs::remove_if_exists(path) {
                warn!("failed to remove lock file '{}': {}", path.display(), e);
            }
        }
        held.clear();
    }

    /// Number of locks currently registered.
    pub fn len(&self) -> usize {
        self.locked().len()
    }

    /// True when no locks are registered.
    pub fn is_empty(&self) -> bool {
        self.locked().is_empty()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, BTreeSet<PathBuf>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
