//! Small filesystem helpers shared by the claim protocol and the registry.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Remove a file, treating "already gone" as success.
///
/// Best-effort cleanup paths race with other processes doing the same
/// cleanup, so a missing file is the desired end state, not an error.
pub(crate) fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        result => result,
    }
}

/// Rewrite a file's modification time to now, extending its staleness
/// deadline.
pub(crate) fn touch(path: &Path) -> io::Result<()> {
    let file = File::options().append(true).open(path)?;
    file.set_modified(SystemTime::now())
}
