//! Scratch directory naming and housekeeping.
//!
//! Two kinds of scratch directory live under the configured root:
//!
//! - `dl-<chapter>` stages pages for a library download and is always removed
//!   when that download finishes
//! - `read-<chapter>-<token>` holds a read-online session; the viewer may still
//!   have it open, so it outlives the flow and is swept by age on a later start

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::download::sanitize_filename;
use crate::error::Result;

const DOWNLOAD_PREFIX: &str = "dl-";
const READ_PREFIX: &str = "read-";

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Staging directory for a library download of `chapter_id`.
pub fn download_dir(root: &Path, chapter_id: &str) -> PathBuf {
    root.join(format!("{}{}", DOWNLOAD_PREFIX, sanitize_filename(chapter_id)))
}

/// A fresh directory name for one read-online session of `chapter_id`.
///
/// The token combines a timestamp, the process id and a per-process counter,
/// so two sessions of the same chapter never share a directory.
pub fn read_session_dir(root: &Path, chapter_id: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
    root.join(format!(
        "{}{}-{}-{}-{}",
        READ_PREFIX,
        sanitize_filename(chapter_id),
        nanos,
        std::process::id(),
        seq
    ))
}

/// Removes read-online session directories last modified more than `max_age` ago.
///
/// Returns how many were removed. A missing root is not an error. Entries that
/// cannot be inspected or removed are logged and skipped.
pub fn sweep_read_sessions(root: &Path, max_age: Duration) -> Result<usize> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let now = SystemTime::now();
    let mut removed = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        let is_session = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(READ_PREFIX));
        if !is_session || !path.is_dir() {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if !age.is_some_and(|age| age > max_age) {
            continue;
        }

        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed stale read session");
                removed += 1;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove read session"),
        }
    }

    Ok(removed)
}
