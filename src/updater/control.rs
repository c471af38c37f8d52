//! Run control: background start, cancellation and the one-run-per-target guard.

use crate::error::{Error, Result};
use crate::types::{PipelineOutcome, UpdateRequest};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::ModpackUpdater;

impl ModpackUpdater {
    /// Validate a request and run it on a background task
    ///
    /// The returned handle resolves to the run's [`PipelineOutcome`]; progress is observed
    /// through [`subscribe`](Self::subscribe).
    ///
    /// # Errors
    ///
    /// Same rejections as [`run`](Self::run), reported before anything is spawned.
    pub async fn start(&self, request: UpdateRequest) -> Result<JoinHandle<PipelineOutcome>> {
        let entries = self.validate_request(&request).await?;
        let (guard, cancel) = self.claim_run(&request.target_dir).await?;

        let updater = self.clone();
        Ok(tokio::spawn(async move {
            // Released when the task finishes or is aborted
            let _guard = guard;
            updater.execute(request, entries, cancel).await
        }))
    }

    /// Cancel the run that owns `target`
    ///
    /// The run stops at its next checkpoint (between chunks or between archives) and
    /// finishes with [`PipelineOutcome::Cancelled`].
    ///
    /// # Returns
    ///
    /// `true` if a run was registered for `target`.
    pub async fn cancel(&self, target: &Path) -> bool {
        let key = run_key(target).await;
        let active_runs = lock_runs(&self.active_runs);
        match active_runs.get(&key) {
            Some(cancel_token) => {
                cancel_token.cancel();
                info!(target = ?key, "cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Whether a run currently owns `target`
    pub async fn is_running(&self, target: &Path) -> bool {
        let key = run_key(target).await;
        lock_runs(&self.active_runs).contains_key(&key)
    }

    /// Register a run for `target`, rejecting it if one is already in flight
    ///
    /// The registration lasts as long as the returned [`RunGuard`].
    pub(crate) async fn claim_run(&self, target: &Path) -> Result<(RunGuard, CancellationToken)> {
        let key = run_key(target).await;
        let mut active_runs = lock_runs(&self.active_runs);
        if active_runs.contains_key(&key) {
            return Err(Error::RunInProgress { target: key });
        }

        let cancel_token = CancellationToken::new();
        active_runs.insert(key.clone(), cancel_token.clone());
        debug!(target = ?key, "run registered");

        let guard = RunGuard {
            runs: self.active_runs.clone(),
            key,
        };
        Ok((guard, cancel_token))
    }
}

/// In-flight runs keyed by canonical target directory
pub(crate) type RunRegistry = Arc<Mutex<HashMap<PathBuf, CancellationToken>>>;

/// Registration of one run; dropping it frees the target, even if the run's future is
/// dropped or its task aborted before finishing
pub(crate) struct RunGuard {
    runs: RunRegistry,
    key: PathBuf,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        lock_runs(&self.runs).remove(&self.key);
        debug!(target = ?self.key, "run released");
    }
}

/// Lock the registry. Never held across an await; a poisoned lock still holds a
/// consistent map, so it is recovered.
fn lock_runs(runs: &RunRegistry) -> MutexGuard<'_, HashMap<PathBuf, CancellationToken>> {
    runs.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registry key for a target: its canonical path, or the path as given if it cannot be
/// resolved
async fn run_key(target: &Path) -> PathBuf {
    tokio::fs::canonicalize(target)
        .await
        .unwrap_or_else(|_| target.to_path_buf())
}
