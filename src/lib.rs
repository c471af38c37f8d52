//! # modpack-dl
//!
//! Library for keeping a Minecraft modpack installation up to date.
//!
//! An update removes the managed `mods`, `config` and `resourcepacks` directories of a game
//! directory, then downloads each archive the catalog lists for the chosen source and
//! version and unpacks it in place, strictly one after the other.
//!
//! ## Design Philosophy
//!
//! modpack-dl is designed to be:
//! - **Library-first** - The foreground (CLI, GUI) only builds requests and renders events
//! - **Event-driven** - Consumers subscribe to events, no polling required
//! - **Fail-fast** - The first failing step ends the run with a typed outcome
//!
//! ## Quick Start
//!
//! ```no_run
//! use modpack_dl::{Config, Event, ModpackUpdater, UpdateRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let updater = ModpackUpdater::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = updater.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let Event::Progress(p) = event {
//!                 println!("{}: {} bytes", p.label, p.bytes_done);
//!             }
//!         }
//!     });
//!
//!     let request = UpdateRequest::new("Modrinth", "1.21", "/home/me/.minecraft");
//!     let outcome = updater.run(request).await?;
//!     println!("{outcome:?}");
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Source catalog
pub mod catalog;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Archive installation
pub mod extraction;
/// Archive fetching
pub mod fetch;
/// Local state reset
pub mod reset;
/// Core types and events
pub mod types;
/// Update orchestration
pub mod updater;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogEntry};
pub use config::{Config, HttpConfig};
pub use error::{Error, FailureKind, InstallError, Result, TransferError};
pub use extraction::{ArchiveInstaller, ZipInstaller};
pub use fetch::{ArchiveFetcher, HttpFetcher};
pub use types::{
    Event, ManagedSubdirectory, PipelineOutcome, Stage, TransferProgress, UpdateRequest,
};
pub use updater::ModpackUpdater;

/// Run an update, cancelling it if the process receives a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use modpack_dl::{Config, ModpackUpdater, UpdateRequest, run_until_signal};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let updater = ModpackUpdater::new(Config::default())?;
///     let request = UpdateRequest::new("Modrinth", "1.21", "/home/me/.minecraft");
///
///     let outcome = run_until_signal(&updater, request).await?;
///     println!("{outcome:?}");
///
///     Ok(())
/// }
/// ```
pub async fn run_until_signal(
    updater: &ModpackUpdater,
    request: UpdateRequest,
) -> Result<PipelineOutcome> {
    let target = request.target_dir.clone();
    let mut handle = updater.start(request).await?;

    let joined = tokio::select! {
        joined = &mut handle => joined,
        _ = wait_for_signal() => {
            updater.cancel(&target).await;
            handle.await
        }
    };

    joined.map_err(|e| Error::Other(format!("update task failed: {}", e)))
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal, cancelling update");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C), cancelling update");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C signal, cancelling update");
            } else {
                // Never resolve: without a signal source the run simply completes
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal, cancelling update");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    }
}
