//! Core types for modpack-dl

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::FailureKind;

/// Immutable description of one update run
///
/// The foreground builds this from the user's selection and hands it to
/// [`crate::ModpackUpdater::run`]; the pipeline never reads selection state from anywhere else.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Catalog source name (e.g. "Modrinth")
    pub source: String,
    /// Version within the source (e.g. "1.21")
    pub version: String,
    /// Installation root, e.g. the `.minecraft` directory
    pub target_dir: PathBuf,
}

impl UpdateRequest {
    /// Create a new request
    pub fn new(
        source: impl Into<String>,
        version: impl Into<String>,
        target_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            version: version.into(),
            target_dir: target_dir.into(),
        }
    }
}

/// Directories beneath the target that a run is allowed to delete and repopulate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagedSubdirectory {
    /// `mods/`
    Mods,
    /// `config/`
    Config,
    /// `resourcepacks/`
    ResourcePacks,
}

impl ManagedSubdirectory {
    /// Every managed subdirectory, in removal order
    pub const ALL: [ManagedSubdirectory; 3] = [
        ManagedSubdirectory::Mods,
        ManagedSubdirectory::Config,
        ManagedSubdirectory::ResourcePacks,
    ];

    /// Directory name relative to the target
    pub fn dir_name(&self) -> &'static str {
        match self {
            ManagedSubdirectory::Mods => "mods",
            ManagedSubdirectory::Config => "config",
            ManagedSubdirectory::ResourcePacks => "resourcepacks",
        }
    }

    /// Absolute path of this subdirectory under `target`
    pub fn path_in(&self, target: &Path) -> PathBuf {
        target.join(self.dir_name())
    }
}

/// Pipeline stage, used to report where an accepted run stopped
///
/// Request validation is not a stage: a rejected request returns an error before any run
/// starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Removing managed subdirectories and stale archives
    Reset,
    /// Fetching an archive
    Download,
    /// Extracting an archive
    Extract,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Reset => "reset",
            Stage::Download => "download",
            Stage::Extract => "extract",
        };
        f.write_str(name)
    }
}

/// Progress of one archive transfer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferProgress {
    /// Local archive name (e.g. "mods.zip")
    pub label: String,
    /// Entry index within the catalog selection
    pub index: usize,
    /// Cumulative bytes written so far
    pub bytes_done: u64,
    /// Declared size, `None` when the server did not report one
    pub bytes_total: Option<u64>,
}

impl TransferProgress {
    /// Completion percentage (0.0 to 100.0), `None` if the total is unknown
    pub fn percent(&self) -> Option<f32> {
        match self.bytes_total {
            Some(total) if total > 0 => Some((self.bytes_done as f64 / total as f64 * 100.0) as f32),
            _ => None,
        }
    }
}

/// Aggregate result of one pipeline run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Every entry was fetched and extracted
    Success {
        /// Number of archives installed
        installed: usize,
    },

    /// The run stopped at a failing step
    Failed {
        /// Stage where the failure occurred
        stage: Stage,
        /// Entry index for download/extract failures
        #[serde(skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        /// Failure classification
        kind: FailureKind,
        /// Error message
        reason: String,
    },

    /// The caller cancelled the run
    Cancelled {
        /// Stage that observed the cancellation
        stage: Stage,
        /// Entry index, if an entry was in progress
        #[serde(skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
}

impl PipelineOutcome {
    /// Whether the run completed successfully
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success { .. })
    }
}

/// Event emitted during a pipeline run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A run was accepted and is starting
    Started {
        /// The request being processed
        request: UpdateRequest,
        /// Number of archives to install
        entries: usize,
    },

    /// Managed subdirectories are being removed
    Resetting {
        /// Target directory
        target: PathBuf,
    },

    /// A managed subdirectory or stale archive was removed
    Removed {
        /// Removed path
        path: PathBuf,
    },

    /// Archive download started
    Downloading {
        /// Local archive name
        label: String,
        /// Entry index
        index: usize,
    },

    /// Transfer progress for the current archive
    Progress(TransferProgress),

    /// Archive download finished
    DownloadComplete {
        /// Local archive name
        label: String,
        /// Entry index
        index: usize,
        /// Bytes written
        bytes: u64,
    },

    /// Archive extraction started
    Extracting {
        /// Local archive name
        label: String,
        /// Entry index
        index: usize,
    },

    /// Archive extraction finished and the archive was removed
    ExtractComplete {
        /// Local archive name
        label: String,
        /// Entry index
        index: usize,
        /// Number of files written
        files: usize,
    },

    /// The run finished; emitted exactly once per accepted run
    Finished {
        /// Aggregate result
        outcome: PipelineOutcome,
    },
}
