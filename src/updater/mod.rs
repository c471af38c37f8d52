//! Update orchestration split into focused submodules.
//!
//! The `ModpackUpdater` struct and its methods are organized by domain:
//! - [`pipeline`] - Request validation and the reset → fetch → extract sequence
//! - [`control`] - Background start, cancellation and the per-target run guard

mod control;
mod pipeline;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::Result;
use crate::extraction::{ArchiveInstaller, ZipInstaller};
use crate::fetch::{ArchiveFetcher, HttpFetcher};
use crate::types::Event;
use control::RunRegistry;
use std::sync::Arc;

/// Modpack updater (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct ModpackUpdater {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Archive transport (trait object so tests can script transfers)
    pub(crate) fetcher: Arc<dyn ArchiveFetcher>,
    /// Archive installer
    pub(crate) installer: Arc<dyn ArchiveInstaller>,
    /// In-flight runs keyed by canonical target directory
    pub(crate) active_runs: RunRegistry,
}

impl ModpackUpdater {
    /// Create an updater with the HTTP fetcher and ZIP installer
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the configuration does not validate, or
    /// [`crate::Error::Network`] if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Self::with_components(config, Arc::new(fetcher), Arc::new(ZipInstaller::new()))
    }

    /// Create an updater with custom fetch and install components
    pub fn with_components(
        config: Config,
        fetcher: Arc<dyn ArchiveFetcher>,
        installer: Arc<dyn ArchiveInstaller>,
    ) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = tokio::sync::broadcast::channel(config.event_buffer);

        tracing::debug!(
            fetcher = fetcher.name(),
            installer = installer.name(),
            sources = config.catalog.sources().len(),
            "updater initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            event_tx,
            fetcher,
            installer,
            active_runs: RunRegistry::default(),
        })
    }

    /// Subscribe to pipeline events
    ///
    /// Every subscriber receives every event sent after it subscribed. A subscriber that
    /// falls more than `event_buffer` events behind gets `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Emit an event to all subscribers
    pub(crate) fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }
}
