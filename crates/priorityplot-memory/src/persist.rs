//! Crash-safe persistence for the goal-memory file.
//!
//! The on-disk format is a single JSON document:
//!
//! ```json
//! {
//!   "entries": [
//!     { "name": "Write Report", "normalized": "write report",
//!       "value": 4.0, "time": 2.0, "updated_at": "2026-08-23T10:15:00Z" }
//!   ]
//! }
//! ```
//!
//! Loading is best-effort: a missing file, malformed JSON, or a wholesale
//! wrong shape all yield an empty entry list, and individually malformed
//! entries are discarded without aborting the rest.  Saving is atomic:
//! the document is written to a sibling `*.tmp` file and renamed over the
//! target, so the target is always a complete previous or complete new
//! file, never a partial write.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::store::GoalMemoryEntry;

/// Errors that can arise when persisting goal memory.
///
/// Load failures never surface here: corrupt or missing storage degrades to
/// an empty store by design.
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Top-level shape of the persisted document.
#[derive(Serialize)]
struct MemoryFileOut<'a> {
    entries: &'a [&'a GoalMemoryEntry],
}

/// Lenient counterpart for loading: entries are kept as raw JSON values so
/// one malformed entry cannot sink its well-formed neighbours.
#[derive(Deserialize)]
struct MemoryFileIn {
    #[serde(default)]
    entries: Vec<serde_json::Value>,
}

/// Load entries from `path`.
///
/// Returns an empty vec when the file does not exist or cannot be parsed;
/// entries with a missing or empty `normalized` key are dropped.
pub fn load(path: &Path) -> Vec<GoalMemoryEntry> {
    if !path.exists() {
        return Vec::new();
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read goal memory; starting empty");
            return Vec::new();
        }
    };
    let doc: MemoryFileIn = match serde_json::from_str(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt goal memory file; starting empty");
            return Vec::new();
        }
    };
    let total = doc.entries.len();
    let entries: Vec<GoalMemoryEntry> = doc
        .entries
        .into_iter()
        .filter_map(|v| serde_json::from_value::<GoalMemoryEntry>(v).ok())
        .filter(|e| !e.normalized.is_empty())
        .collect();
    if entries.len() < total {
        warn!(
            path = %path.display(),
            discarded = total - entries.len(),
            "discarded malformed goal-memory entries"
        );
    }
    debug!(path = %path.display(), loaded = entries.len(), "loaded goal memory");
    entries
}

/// Atomically write `entries` to `path` as the persisted document.
///
/// Creates the parent directory if needed.  The caller is expected to have
/// already ordered and truncated the entries (recency-first, capped).
pub fn save(path: &Path, entries: &[&GoalMemoryEntry]) -> Result<(), MemoryError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| MemoryError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let payload = serde_json::to_string_pretty(&MemoryFileOut { entries })?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, payload).map_err(|e| MemoryError::Io {
        path: tmp_path.clone(),
        source: e,
    })?;
    fs::rename(&tmp_path, path).map_err(|e| MemoryError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), saved = entries.len(), "saved goal memory");
    Ok(())
}

/// Sibling temp-file path used for the atomic rename (`<file>.tmp` in the
/// same directory, so the rename never crosses a filesystem boundary).
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
