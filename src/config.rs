//! Configuration for lock staleness and refresh cadence.

use std::time::Duration;

/// Default staleness timeout applied when none is configured.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration shared by every lock handle built on top of it.
///
/// The single tunable is the staleness timeout: a lock artifact whose
/// modification time is at least this old is treated as abandoned and may
/// be reclaimed by any acquirer. Holders must refresh strictly more often
/// than this, or they will be dispossessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    /// Age at which an unrefreshed lock artifact is considered abandoned.
    pub timeout: Duration,
}

impl LockConfig {
    /// Create a configuration with the given staleness timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Interval at which an external timer should drive
    /// [`LockRegistry::refresh_all`](crate::LockRegistry::refresh_all).
    ///
    /// Two thirds of the timeout, so a single missed tick does not push a
    /// held lock past its staleness deadline. Any interval strictly smaller
    /// than the timeout satisfies the contract.
    pub fn suggested_refresh_interval(&self) -> Duration {
        self.timeout * 2 / 3
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
