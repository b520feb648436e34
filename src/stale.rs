//! Staleness policy for lock artifacts.
//!
//! A lock artifact is stale once its modification time is at least the
//! configured timeout in the past. Staleness is the only abandonment
//! signal: the artifact carries no payload, so recency of its mtime is
//! what stands in for "the holder is still alive". Clocks across
//! participants are assumed to be loosely synchronized.

use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::Path;
use std::time::Duration as StdDuration;

/// Whether the artifact at `path` is abandoned under the given timeout.
///
/// An artifact whose metadata cannot be read (typically because a
/// concurrent reclaimer already removed it) counts as stale. A
/// modification time in the future counts as age zero, i.e. fresh.
pub fn is_lock_stale(path: &Path, timeout: StdDuration) -> bool {
    let Some(age) = artifact_age(path) else {
        return true;
    };
    let timeout = Duration::from_std(timeout).unwrap_or(Duration::MAX);
    age >= timeout
}

/// Age of the artifact at `path`, or `None` if its mtime is unreadable.
pub(crate) fn artifact_age(path: &Path) -> Option<Duration> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let modified = DateTime::<Utc>::from(modified);
    let age = Utc::now().signed_duration_since(modified);
    Some(age.max(Duration::zero()))
}

/// Format an age as a compact human-readable string for log messages.
pub(crate) fn age_string(age: Duration) -> String {
    let minutes = age.num_minutes();
    let hours = age.num_hours();
    let days = age.num_days();

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", age.num_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn backdate(path: &Path, by: StdDuration) {
        let file = File::options().append(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - by).unwrap();
    }

    #[test]
    fn fresh_artifact_is_not_stale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("res.lock");
        File::create(&path).unwrap();

        assert!(!is_lock_stale(&path, StdDuration::from_secs(30)));
    }

    #[test]
    fn old_artifact_is_stale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("res.lock");
        File::create(&path).unwrap();
        backdate(&path, StdDuration::from_secs(60));

        assert!(is_lock_stale(&path, StdDuration::from_secs(30)));
    }

    #[test]
    fn missing_artifact_is_stale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.lock");

        assert!(is_lock_stale(&path, StdDuration::from_secs(30)));
    }

    #[test]
    fn future_mtime_counts_as_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("res.lock");
        let file = File::create(&path).unwrap();
        file.set_modified(SystemTime::now() + StdDuration::from_secs(120))
            .unwrap();

        assert!(!is_lock_stale(&path, StdDuration::from_secs(30)));
        assert_eq!(artifact_age(&path), Some(Duration::zero()));
    }

    #[test]
    fn age_string_picks_the_largest_unit() {
        assert_eq!(age_string(Duration::seconds(42)), "42s");
        assert_eq!(age_string(Duration::minutes(12)), "12m");
        assert_eq!(age_string(Duration::minutes(127)), "2h 7m");
        assert_eq!(age_string(Duration::hours(50)), "2d 2h");
    }
}
