//! Archive fetching
//!
//! Streams one remote archive to a local file, reporting cumulative progress after every
//! received chunk. The payload is never buffered in memory as a whole.

use crate::config::HttpConfig;
use crate::error::{Error, Result, TransferError};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};


/// Progress callback: `(bytes_done, bytes_total)`; the total is `None` when unknown
pub type ProgressCallback<'a> = dyn Fn(u64, Option<u64>) + Send + Sync + 'a;

/// Trait for fetching one archive to disk
///
/// The orchestrator only talks to this trait, so alternative transports (or test doubles)
/// can be plugged into [`crate::ModpackUpdater::with_components`].
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Download `location` into `destination`
    ///
    /// # Returns
    ///
    /// The path of the written file.
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] / [`Error::HttpStatus`] for connection or HTTP failures
    /// - [`Error::Io`] if the destination cannot be written
    /// - [`Error::Transfer`] if the result is empty or the body ends short of its declared
    ///   length
    /// - [`Error::Cancelled`] if `cancel` fired mid-transfer
    async fn fetch(
        &self,
        location: &str,
        destination: &Path,
        progress: &ProgressCallback<'_>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Streaming HTTP GET fetcher backed by a shared `reqwest::Client`
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher from HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArchiveFetcher for HttpFetcher {
    async fn fetch(
        &self,
        location: &str,
        destination: &Path,
        progress: &ProgressCallback<'_>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        debug!(location, ?destination, "requesting archive");

        let response = self.client.get(location).send().await.map_err(|e| {
            if e.is_connect() {
                warn!(location, error = %e, "connection failed");
            }
            Error::Network(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: location.to_string(),
                status: status.as_u16(),
            });
        }

        // A declared length of zero carries no information for percentages
        let total = response.content_length().filter(|len| *len > 0);
        debug!(location, ?total, "response accepted, streaming body");

        let mut file = tokio::fs::File::create(destination).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to create '{}': {}", destination.display(), e),
            ))
        })?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    drop(file);
                    discard_partial(destination).await;
                    info!(location, downloaded, "transfer cancelled");
                    return Err(Error::Cancelled);
                }
                next = stream.next() => next,
            };

            let Some(chunk) = next else { break };
            let chunk = chunk.map_err(|e| body_error(e, destination, total, downloaded))?;
            if chunk.is_empty() {
                continue;
            }

            file.write_all(&chunk).await.map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to write '{}': {}", destination.display(), e),
                ))
            })?;
            downloaded += chunk.len() as u64;
            progress(downloaded, total);
        }

        file.flush().await?;
        drop(file);

        let written = tokio::fs::metadata(destination)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(TransferError::Empty {
                path: destination.to_path_buf(),
            }
            .into());
        }
        info!(location, ?destination, bytes = written, "archive downloaded");
        Ok(destination.to_path_buf())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Classify a body stream error: ending short of a declared length is an incomplete
/// transfer, anything else is a network failure
fn body_error(e: reqwest::Error, path: &Path, total: Option<u64>, received: u64) -> Error {
    match total {
        Some(expected) if received < expected => {
            warn!(?path, expected, received, error = %e, "body ended before declared length");
            TransferError::Truncated {
                path: path.to_path_buf(),
                expected,
                received,
            }
            .into()
        }
        _ => Error::Network(e),
    }
}

async fn discard_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(?path, error = %e, "failed to remove partial download");
        }
    }
}
