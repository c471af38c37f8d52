//! Local state reset
//!
//! Clears the managed subdirectories and any archives a previous, interrupted run left
//! behind, so the following installs start from a clean slate.

use crate::error::{Error, Result};
use crate::types::{Event, ManagedSubdirectory};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Remove every managed subdirectory and the named stale archives under `target`
///
/// Paths that do not exist are skipped. A symlink or plain file occupying a managed name is
/// removed itself; the link is never followed. An [`Event::Removed`] is sent for each path
/// actually removed.
///
/// # Returns
///
/// The removed paths, subdirectories first, then archives.
///
/// # Errors
///
/// Returns [`Error::Io`] on the first removal that fails; nothing after it is touched.
pub async fn reset_target(
    target: &Path,
    stale_archives: &[&str],
    event_tx: &broadcast::Sender<Event>,
) -> Result<Vec<PathBuf>> {
    let candidates = ManagedSubdirectory::ALL
        .iter()
        .map(|dir| dir.path_in(target))
        .chain(stale_archives.iter().map(|name| target.join(name)));

    let mut removed = Vec::new();
    for path in candidates {
        if remove_path(&path).await? {
            debug!(?path, "removed");
            event_tx.send(Event::Removed { path: path.clone() }).ok();
            removed.push(path);
        }
    }

    info!(?target, removed = removed.len(), "target reset");
    Ok(removed)
}

/// Remove whatever sits at `path`; `Ok(false)` if there was nothing
async fn remove_path(path: &Path) -> Result<bool> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(removal_error(e, path)),
    };

    let result = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match result {
        Ok(()) => Ok(true),
        // Lost a race with something else deleting it
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(removal_error(e, path)),
    }
}

fn removal_error(e: std::io::Error, path: &Path) -> Error {
    Error::Io(std::io::Error::new(
        e.kind(),
        format!("failed to remove '{}': {}", path.display(), e),
    ))
}
