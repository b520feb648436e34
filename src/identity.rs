//! Identity naming for lock artifacts.
//!
//! Every acquisition attempt names its proxy file after the attempting
//! host, process, and thread, under a fixed literal prefix. The prefix is
//! part of the on-disk contract: all participants use the same one, and it
//! is the key by which orphaned artifacts from crashed attempts are
//! recognized and garbage-collected.

use std::thread;

/// Literal prefix shared by every proxy artifact this scheme creates.
pub(crate) const ARTIFACT_PREFIX: &str = ".linklock-5c21a";

fn host_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

fn pid_string() -> String {
    std::process::id().to_string()
}

/// Numeric token for the current thread, taken from the debug rendering of
/// its `ThreadId`.
fn thread_token() -> String {
    let id = format!("{:?}", thread::current().id());
    id.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Name for this attempt's proxy artifact: prefix, host, pid, and thread
/// token, hyphen-separated. Unique per live attempt, so a pre-existing
/// entry with this exact name can only be a leftover from a crashed
/// process.
pub(crate) fn proxy_file_name() -> String {
    format!(
        "{}-{}-{}-{}",
        ARTIFACT_PREFIX,
        host_name(),
        pid_string(),
        thread_token()
    )
}

/// Whether a directory entry name belongs to this locking scheme.
pub(crate) fn has_artifact_prefix(name: &str) -> bool {
    name.starts_with(ARTIFACT_PREFIX)
}
