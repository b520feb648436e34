//! The atomic claim protocol.
//!
//! On the shared filesystems this crate targets (old NFS in particular),
//! neither exclusive-create nor the hard-link call's return status can be
//! trusted. The one race-free observable is the link count: linking a
//! proxy file to the target path cannot leave two racers each believing
//! their own link brought the count from 1 to 2. So the protocol creates
//! a uniquely-named proxy, attempts the link while ignoring the call's
//! result, and stats the proxy afterward: a count of exactly 2 means the
//! proxy and the target now share one inode and the claim took effect.
//!
//! The proxy never outlives a single attempt; a drop-guard removes it on
//! every exit path, including early error returns.

use crate::error::{LockError, Result};
use crate::fs::remove_if_exists;
use crate::identity;
use crate::stale;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Removes the proxy artifact when the attempt ends, however it ends.
struct ProxyGuard {
    path: PathBuf,
}

impl ProxyGuard {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for ProxyGuard {
    fn drop(&mut self) {
        if let Err(e) = remove_if_exists(&self.path) {
            warn!(
                "failed to remove proxy file '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Claim `path` by linking a fresh proxy artifact to it.
///
/// Returns `Unavailable` when a competitor's link already occupies the
/// target, `Io` when the proxy cannot be created or the verifying stat
/// fails. The caller is expected to have handled any pre-existing lock
/// artifact at `path` (stale removal or refusal) before calling this.
#[cfg(unix)]
pub(crate) fn link_lock_file(path: &Path) -> Result<()> {
    use std::fs;
    use std::os::unix::fs::MetadataExt;

    let parent = path.parent().unwrap_or(Path::new("."));
    let proxy = parent.join(identity::proxy_file_name());

    // The proxy name is unique per live attempt, so a collision can only
    // be a leftover from a crashed process, never a live race.
    if let Err(e) = remove_if_exists(&proxy) {
        warn!(
            "failed to remove leftover proxy file '{}': {}",
            proxy.display(),
            e
        );
    }

    let _guard = ProxyGuard::new(proxy.clone());
    fs::File::create(&proxy).map_err(|e| {
        // Logged here as well: callers treating contention as routine may
        // swallow the returned error.
        warn!(
            "failed to create proxy file '{}': {}",
            proxy.display(),
            e
        );
        LockError::Io(format!(
            "failed to create proxy file '{}': {}",
            proxy.display(),
            e
        ))
    })?;

    // The call's own status is unreliable here; the stat below is the
    // authoritative signal, so the result is deliberately discarded.
    let _ = fs::hard_link(&proxy, path);

    let metadata = fs::metadata(&proxy).map_err(|e| {
        warn!(
            "failed to stat proxy file '{}': {}",
            proxy.display(),
            e
        );
        LockError::Io(format!(
            "failed to stat proxy file '{}': {}",
            proxy.display(),
            e
        ))
    })?;

    if metadata.nlink() != 2 {
        return Err(LockError::Unavailable(format!(
            "'{}' was claimed by a competing process",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn link_lock_file(path: &Path) -> Result<()> {
    Err(LockError::Io(format!(
        "link-based locking is not supported on this platform: '{}'",
        path.display()
    )))
}

/// Remove stale artifacts left in `dir` by crashed acquisition attempts.
///
/// Only entries carrying the scheme's artifact prefix are candidates;
/// fresh entries (a live attempt's proxy, a held lock under a prefixed
/// name) are left alone. Every failure is logged and skipped.
pub(crate) fn sweep_stale_artifacts(dir: &Path, timeout: Duration) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                "failed to list lock directory '{}': {}",
                dir.display(),
                e
            );
            return;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !identity::has_artifact_prefix(name) {
            continue;
        }

        let path = entry.path();
        if !stale::is_lock_stale(&path, timeout) {
            continue;
        }

        let age = stale::artifact_age(&path)
            .map(stale::age_string)
            .unwrap_or_else(|| "unknown".to_string());
        if let Err(e) = remove_if_exists(&path) {
            warn!(
                "failed to sweep stale artifact '{}': {}",
                path.display(),
                e
            );
        } else {
            debug!("swept stale artifact '{}' (age {})", path.display(), age);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::os::unix::fs::MetadataExt;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn prefixed_entries(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|n| identity::has_artifact_prefix(n))
            .collect()
    }

    #[test]
    fn claim_of_a_free_path_succeeds_and_removes_the_proxy() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("res.lock");

        link_lock_file(&target).unwrap();

        assert!(target.exists());
        // The proxy is gone, so the target is the inode's only remaining link.
        assert_eq!(fs::metadata(&target).unwrap().nlink(), 1);
        assert!(prefixed_entries(dir.path()).is_empty());
    }

    #[test]
    fn claim_of_an_occupied_path_loses_regardless_of_the_link_call() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("res.lock");
        File::create(&target).unwrap();

        // The link call fails here, but the outcome must come from the
        // proxy's link count, reported as contention rather than I/O.
        let err = link_lock_file(&target).unwrap_err();
        assert!(err.is_unavailable());

        // Loser leaves nothing behind.
        assert!(prefixed_entries(dir.path()).is_empty());
        assert!(target.exists());
    }

    #[test]
    fn sweep_removes_only_stale_prefixed_artifacts() {
        let dir = TempDir::new().unwrap();
        let timeout = Duration::from_secs(30);

        let stale_orphan = dir.path().join(format!(
            "{}-otherhost-4242-7",
            identity::ARTIFACT_PREFIX
        ));
        let fresh_orphan = dir
            .path()
            .join(format!("{}-otherhost-4242-8", identity::ARTIFACT_PREFIX));
        let unrelated = dir.path().join("res.lock");

        for path in [&stale_orphan, &fresh_orphan, &unrelated] {
            File::create(path).unwrap();
        }
        for path in [&stale_orphan, &unrelated] {
            let file = File::options().append(true).open(path).unwrap();
            file.set_modified(SystemTime::now() - Duration::from_secs(3600))
                .unwrap();
        }

        sweep_stale_artifacts(dir.path(), timeout);

        assert!(!stale_orphan.exists());
        assert!(fresh_orphan.exists());
        // Stale but unprefixed entries are not this scheme's to remove.
        assert!(unrelated.exists());
    }

    #[test]
    fn sweep_of_a_missing_directory_is_harmless() {
        let dir = TempDir::new().unwrap();
        sweep_stale_artifacts(&dir.path().join("absent"), Duration::from_secs(30));
    }
}
