//! Error types for modpack-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (transfer, install, configuration)
//! - A coarse [`FailureKind`] classification reported in pipeline outcomes
//! - Machine-readable error codes for observers that render or log failures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for modpack-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for modpack-dl
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "Modrinth/1.21")
        key: Option<String>,
    },

    /// The update request was rejected before the pipeline started
    #[error("invalid request: {0}")]
    Validation(String),

    /// Another run is already in flight for the same target directory
    #[error("an update is already running for {}", target.display())]
    RunInProgress {
        /// The target directory that is busy
        target: PathBuf,
    },

    /// Network error (connection, TLS, body stream)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The requested location
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transfer finished but the result is unusable
    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Archive installation error
    #[error("install error: {0}")]
    Install(#[from] InstallError),

    /// Serialization error (catalog files, events)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The run was cancelled by the caller
    #[error("cancelled")]
    Cancelled,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors detected after a transfer ends
#[derive(Debug, Error)]
pub enum TransferError {
    /// Nothing usable was written
    #[error("{} is missing or empty after download", path.display())]
    Empty {
        /// The destination file
        path: PathBuf,
    },

    /// The body ended before the declared content length
    #[error("{} received {received} of {expected} bytes", path.display())]
    Truncated {
        /// The destination file
        path: PathBuf,
        /// Declared content length
        expected: u64,
        /// Bytes actually written
        received: u64,
    },
}

/// Archive installation errors
#[derive(Debug, Error)]
pub enum InstallError {
    /// The archive is not a readable zip container
    #[error("corrupt archive {}: {reason}", archive.display())]
    CorruptArchive {
        /// The archive that could not be read
        archive: PathBuf,
        /// The reason reading failed
        reason: String,
    },

    /// The blocking extraction task died
    #[error("extraction task for {} failed: {reason}", archive.display())]
    TaskFailed {
        /// The archive being extracted
        archive: PathBuf,
        /// Join error description
        reason: String,
    },
}

/// Coarse failure classification carried by [`crate::PipelineOutcome::Failed`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection or HTTP failure
    Network,
    /// Filesystem read/write/remove failure
    Io,
    /// Structurally invalid archive
    CorruptArchive,
    /// Zero-byte, missing or truncated download
    IncompleteTransfer,
    /// Request or configuration rejected
    Validation,
    /// Anything else
    Other,
}

impl Error {
    /// Classify this error into the pipeline failure taxonomy
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Network(_) | Error::HttpStatus { .. } => FailureKind::Network,
            Error::Io(_) => FailureKind::Io,
            Error::Transfer(_) => FailureKind::IncompleteTransfer,
            Error::Install(InstallError::CorruptArchive { .. }) => FailureKind::CorruptArchive,
            Error::Config { .. } | Error::Validation(_) | Error::RunInProgress { .. } => {
                FailureKind::Validation
            }
            Error::Install(InstallError::TaskFailed { .. })
            | Error::Serialization(_)
            | Error::Cancelled
            | Error::Other(_) => FailureKind::Other,
        }
    }

    /// Get the machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::RunInProgress { .. } => "run_in_progress",
            Error::Network(_) => "network_error",
            Error::HttpStatus { .. } => "http_status",
            Error::Io(_) => "io_error",
            Error::Transfer(e) => match e {
                TransferError::Empty { .. } => "empty_transfer",
                TransferError::Truncated { .. } => "truncated_transfer",
            },
            Error::Install(e) => match e {
                InstallError::CorruptArchive { .. } => "corrupt_archive",
                InstallError::TaskFailed { .. } => "extraction_task_failed",
            },
            Error::Serialization(_) => "serialization_error",
            Error::Cancelled => "cancelled",
            Error::Other(_) => "internal_error",
        }
    }
}
