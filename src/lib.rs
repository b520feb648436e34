//! Advisory cross-process file locks for filesystems without reliable
//! exclusive-create semantics.
//!
//! Independent, uncoordinated processes (possibly on different hosts
//! sharing a network filesystem) use this crate to guarantee "only one
//! of us touches this resource right now" without a central coordination
//! service.
//!
//! # Lock model
//!
//! A lock is a plain filesystem entry (the lock artifact) whose existence
//! plus the recency of its modification time denotes ownership. The
//! artifact carries no payload. Because exclusive-create and hard-link
//! return codes are both unreliable on old NFS implementations, a claim
//! is made by linking a uniquely-named proxy file to the target and then
//! verifying the proxy's link count, the only race-free observable.
//!
//! A holder that crashes never runs cleanup; other participants recover
//! by reclaiming artifacts older than the configured staleness timeout.
//! Live holders therefore refresh their artifacts' mtimes strictly more
//! often than that timeout, via the process-wide [`LockRegistry`].
//!
//! # Non-blocking
//!
//! Acquisition attempts fail immediately on contention with
//! [`LockError::Unavailable`]; there is no wait queue, retry loop, or
//! fairness guarantee. Polling and backoff belong to the caller.
//!
//! # Usage
//!
//! ```no_run
//! use linklock::{FileLock, LockConfig, LockRegistry};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! // One registry per process, shared by every handle.
//! let registry = Arc::new(LockRegistry::new());
//!
//! let mut lock = FileLock::new(Arc::clone(&registry), LockConfig::default());
//! lock.acquire(Path::new("/shared/res.lock"))?;
//! // ... exclusive work ...
//! lock.release()?;
//!
//! // Drive from a periodic timer while the process runs:
//! registry.refresh_all();
//!
//! // And at shutdown:
//! registry.clear_all();
//! # Ok::<(), linklock::LockError>(())
//! ```

mod claim;
mod config;
mod error;
mod fs;
mod handle;
mod identity;
mod registry;
mod stale;


pub use config::LockConfig;
pub use error::{LockError, Result};
pub use handle::FileLock;
pub use registry::LockRegistry;
pub use stale::is_lock_stale;
