//! Per-acquisition lock handle.

use crate::claim;
use crate::config::LockConfig;
use crate::error::{LockError, Result};
use crate::registry::LockRegistry;
use crate::stale;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// A handle for acquiring and releasing one advisory lock at a time.
///
/// Each successful [`acquire`](FileLock::acquire) leaves a lock artifact
/// on disk whose existence plus mtime recency denotes ownership, and
/// records the path in the shared [`LockRegistry`] so the process-wide
/// refresh heartbeat and shutdown cleanup cover it.
///
/// A handle is either unlocked (holding no path) or locked (holding the
/// path it acquired). Note that a locked handle can be silently
/// dispossessed: if this process stops refreshing for longer than the
/// staleness timeout, another process may reclaim the path while the
/// handle still considers itself the owner.
#[derive(Debug)]
pub struct FileLock {
    registry: Arc<LockRegistry>,
    config: LockConfig,
    path: Option<PathBuf>,
}

impl FileLock {
    /// Create an unlocked handle backed by the given registry and
    /// staleness configuration.
    pub fn new(registry: Arc<LockRegistry>, config: LockConfig) -> Self {
        Self {
            registry,
            config,
            path: None,
        }
    }

    /// Attempt to acquire the lock at `path`.
    ///
    /// Non-blocking: a single attempt either takes the lock or fails.
    /// Returns [`LockError::Unavailable`] when another live holder exists
    /// or the claim race was lost; retry policy is the caller's business.
    /// Returns [`LockError::Io`] for unexpected filesystem failures.
    pub fn acquire(&mut self, path: &Path) -> Result<()> {
        if let Some(held) = &self.path {
            return Err(LockError::Unavailable(format!(
                "handle already holds '{}'; release it before acquiring '{}'",
                held.display(),
                path.display()
            )));
        }

        if path.exists() {
            if stale::is_lock_stale(path, self.config.timeout) {
                let age = stale::artifact_age(path)
                    .map(stale::age_string)
                    .unwrap_or_else(|| "unknown".to_string());
                // Several processes may race to remove an abandoned
                // artifact; losing that race is not fatal.
                if let Err(e) = crate::fs::remove_if_exists(path) {
                    warn!(
                        "failed to remove stale lock file '{}': {}",
                        path.display(),
                        e
                    );
                } else {
                    debug!("reclaimed stale lock file '{}' (age {})", path.display(), age);
                }
            } else {
                return Err(LockError::Unavailable(format!(
                    "'{}' is held by another process",
                    path.display()
                )));
            }
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LockError::Io(format!(
                    "failed to create lock directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        claim::link_lock_file(path)?;

        // Now that the lock is ours, garbage-collect orphans that crashed
        // attempts left next to it.
        if let Some(parent) = path.parent() {
            claim::sweep_stale_artifacts(parent, self.config.timeout);
        }

        self.registry.register(path);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Release the held lock.
    ///
    /// The handle transitions to unlocked and the path is deregistered
    /// even when removing the artifact fails; the failure is still
    /// returned so the caller can see it. Releasing a handle that holds
    /// nothing is a no-op.
    pub fn release(&mut self) -> Result<()> {
        let Some(path) = self.path.take() else {
            debug!("release on a handle that holds no lock");
            return Ok(());
        };

        self.registry.deregister(&path);
        crate::fs::remove_if_exists(&path).map_err(|e| {
            warn!("failed to remove lock file '{}': {}", path.display(), e);
            LockError::Io(format!(
                "failed to remove lock file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Whether someone currently holds the lock at `path`.
    ///
    /// True iff a lock artifact exists there and is not stale. This is a
    /// read-only query with no ownership implication: it answers "is
    /// anyone holding this", not "am I holding this".
    pub fn is_locked(&self, path: &Path) -> bool {
        path.exists() && !stale::is_lock_stale(path, self.config.timeout)
    }

    /// Path this handle currently holds, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
