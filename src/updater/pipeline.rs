//! The update pipeline: validate, reset, then fetch and extract each archive in order.

use crate::catalog::CatalogEntry;
use crate::error::{Error, Result};
use crate::reset::reset_target;
use crate::types::{Event, PipelineOutcome, Stage, TransferProgress, UpdateRequest};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ModpackUpdater;

impl ModpackUpdater {
    /// Run one update to completion on the current task
    ///
    /// Removes the managed subdirectories of `request.target_dir`, then downloads and
    /// extracts every archive listed for the selected source and version. The first failing
    /// step stops the run; archives installed before it stay in place.
    ///
    /// Events are published to every [`subscribe`](Self::subscribe)d receiver, ending with
    /// exactly one [`Event::Finished`].
    ///
    /// # Errors
    ///
    /// A rejected request never starts a run and produces no events:
    /// - [`Error::Validation`] if the selection is unknown or the target is not a directory
    /// - [`Error::RunInProgress`] if another run owns the same target
    ///
    /// Failures while running are not errors; they are reported in the returned
    /// [`PipelineOutcome`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use modpack_dl::*;
    /// # async fn example(updater: ModpackUpdater) -> Result<()> {
    /// let request = UpdateRequest::new("Modrinth", "1.21", "/home/me/.minecraft");
    /// let outcome = updater.run(request).await?;
    /// println!("{outcome:?}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self, request: UpdateRequest) -> Result<PipelineOutcome> {
        let entries = self.validate_request(&request).await?;
        let (_guard, cancel) = self.claim_run(&request.target_dir).await?;

        Ok(self.execute(request, entries, cancel).await)
    }

    /// Check a request against the catalog and the filesystem
    pub(crate) async fn validate_request(
        &self,
        request: &UpdateRequest,
    ) -> Result<Vec<CatalogEntry>> {
        if request.source.trim().is_empty() {
            return Err(Error::Validation("no source selected".into()));
        }
        if request.version.trim().is_empty() {
            return Err(Error::Validation("no version selected".into()));
        }

        let target = &request.target_dir;
        if !target.is_absolute() {
            return Err(Error::Validation(format!(
                "target directory '{}' must be an absolute path",
                target.display()
            )));
        }
        match tokio::fs::metadata(target).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                return Err(Error::Validation(format!(
                    "target '{}' is not a directory",
                    target.display()
                )));
            }
            Err(e) => {
                return Err(Error::Validation(format!(
                    "target directory '{}' is not accessible: {}",
                    target.display(),
                    e
                )));
            }
        }

        let entries = self
            .config
            .catalog
            .entries(&request.source, &request.version);
        if entries.is_empty() {
            return Err(Error::Validation(format!(
                "no archives listed for {} {}",
                request.source, request.version
            )));
        }

        Ok(entries)
    }

    /// Drive an accepted run through every stage and publish its outcome
    pub(crate) async fn execute(
        &self,
        request: UpdateRequest,
        entries: Vec<CatalogEntry>,
        cancel: CancellationToken,
    ) -> PipelineOutcome {
        info!(
            source = %request.source,
            version = %request.version,
            target = ?request.target_dir,
            entries = entries.len(),
            "starting modpack update"
        );
        let target = request.target_dir.clone();
        self.emit_event(Event::Started {
            request,
            entries: entries.len(),
        });

        let outcome = self.drive(&target, &entries, &cancel).await;

        match &outcome {
            PipelineOutcome::Success { installed } => {
                info!(?target, installed, "modpack update complete")
            }
            PipelineOutcome::Cancelled { stage, index } => {
                info!(?target, %stage, ?index, "modpack update cancelled")
            }
            PipelineOutcome::Failed { .. } => {}
        }

        self.emit_event(Event::Finished {
            outcome: outcome.clone(),
        });
        outcome
    }

    async fn drive(
        &self,
        target: &Path,
        entries: &[CatalogEntry],
        cancel: &CancellationToken,
    ) -> PipelineOutcome {
        if cancel.is_cancelled() {
            return PipelineOutcome::Cancelled {
                stage: Stage::Reset,
                index: None,
            };
        }

        self.emit_event(Event::Resetting {
            target: target.to_path_buf(),
        });
        let stale: Vec<&str> = entries.iter().map(|e| e.file_name.as_str()).collect();
        if let Err(e) = reset_target(target, &stale, &self.event_tx).await {
            return failed(Stage::Reset, None, e);
        }

        for (index, entry) in entries.iter().enumerate() {
            if cancel.is_cancelled() {
                return PipelineOutcome::Cancelled {
                    stage: Stage::Download,
                    index: Some(index),
                };
            }

            let label = entry.file_name.clone();
            let destination = target.join(&entry.file_name);

            debug!(index, location = %entry.location, "fetching archive");
            self.emit_event(Event::Downloading {
                label: label.clone(),
                index,
            });

            let progress = |bytes_done: u64, bytes_total: Option<u64>| {
                self.emit_event(Event::Progress(TransferProgress {
                    label: label.clone(),
                    index,
                    bytes_done,
                    bytes_total,
                }));
            };

            let archive = match self
                .fetcher
                .fetch(&entry.location, &destination, &progress, cancel)
                .await
            {
                Ok(path) => path,
                Err(Error::Cancelled) => {
                    return PipelineOutcome::Cancelled {
                        stage: Stage::Download,
                        index: Some(index),
                    };
                }
                Err(e) => return failed(Stage::Download, Some(index), e),
            };

            let bytes = tokio::fs::metadata(&archive)
                .await
                .map(|m| m.len())
                .unwrap_or(0);
            self.emit_event(Event::DownloadComplete {
                label: label.clone(),
                index,
                bytes,
            });

            debug!(index, ?archive, "installing archive");
            self.emit_event(Event::Extracting {
                label: label.clone(),
                index,
            });

            match self.installer.install(&archive, target).await {
                Ok(files) => self.emit_event(Event::ExtractComplete {
                    label,
                    index,
                    files: files.len(),
                }),
                Err(e) => return failed(Stage::Extract, Some(index), e),
            }
        }

        PipelineOutcome::Success {
            installed: entries.len(),
        }
    }
}

fn failed(stage: Stage, index: Option<usize>, error: Error) -> PipelineOutcome {
    warn!(
        %stage,
        ?index,
        error_code = error.error_code(),
        error = %error,
        "modpack update failed"
    );
    PipelineOutcome::Failed {
        stage,
        index,
        kind: error.kind(),
        reason: error.to_string(),
    }
}
