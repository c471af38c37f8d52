//! Archive installation
//!
//! Unpacks a fetched archive into the target directory and removes the archive once every
//! entry has been written. Entry paths inside the archive are relative to the target, so
//! `mods/foo.jar` lands in `<target>/mods/foo.jar`.

mod zip;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use zip::ZipInstaller;

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Trait for installing one archive into a target directory
///
/// Implementations must leave the archive in place when installation fails, and remove it
/// only after every entry was written.
#[async_trait]
pub trait ArchiveInstaller: Send + Sync {
    /// Extract `archive` into `target`, then delete `archive`
    ///
    /// # Returns
    ///
    /// The files written, in archive order.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Install`] if the archive is unreadable or the worker task died
    /// - [`crate::Error::Io`] if the archive cannot be opened, an entry cannot be written,
    ///   or the archive cannot be removed afterwards
    async fn install(&self, archive: &Path, target: &Path) -> Result<Vec<PathBuf>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
