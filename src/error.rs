//! Error types for the linklock library.
//!
//! Uses thiserror for derive macros. The two variants split expected
//! contention (safe to retry later) from unexpected I/O failure (likely a
//! configuration or permission problem, not safe to retry in a tight loop).

use thiserror::Error;

/// Main error type for lock operations.
#[derive(Error, Debug)]
pub enum LockError {
    /// Another live (non-stale) holder exists, or the claim race was lost.
    #[error("lock unavailable: {0}")]
    Unavailable(String),

    /// Filesystem failure while creating directories, the proxy file, or
    /// during the verifying stat call.
    #[error("lock I/O failure: {0}")]
    Io(String),
}

impl LockError {
    /// True for expected contention, false for real I/O faults.
    ///
    /// Callers polling for a lock should retry only when this returns true.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, LockError::Unavailable(_))
    }
}

/// Result type alias for lock operations.
pub type Result<T> = std::result::Result<T, LockError>;
