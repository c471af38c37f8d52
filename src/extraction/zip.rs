use crate::error::{Error, InstallError, Result};
use async_trait::async_trait;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

use super::ArchiveInstaller;

/// Installer for ZIP archives
#[derive(Clone, Copy, Debug, Default)]
pub struct ZipInstaller;

impl ZipInstaller {
    /// Create a new installer
    pub fn new() -> Self {
        Self
    }

    /// Extract every entry of a ZIP archive into `target` (blocking)
    ///
    /// Entries whose names would escape `target` are skipped. Existing files are overwritten.
    pub fn extract(archive_path: &Path, target: &Path) -> Result<Vec<PathBuf>> {
        debug!(?archive_path, ?target, "extracting ZIP archive");

        let file = std::fs::File::open(archive_path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to open '{}': {}", archive_path.display(), e),
            ))
        })?;

        let mut archive = ::zip::ZipArchive::new(file).map_err(|e| corrupt(archive_path, e))?;

        let mut extracted_files = Vec::new();
        for i in 0..archive.len() {
            let entry = archive.by_index(i).map_err(|e| corrupt(archive_path, e))?;
            if let Some(path) = Self::extract_zip_entry(entry, target, archive_path)? {
                extracted_files.push(path);
            }
        }

        info!(
            ?archive_path,
            extracted_count = extracted_files.len(),
            "ZIP extraction successful"
        );
        Ok(extracted_files)
    }

    /// Write a single entry to disk, creating directories as needed
    fn extract_zip_entry(
        mut entry: ::zip::read::ZipFile<'_>,
        target: &Path,
        archive_path: &Path,
    ) -> Result<Option<PathBuf>> {
        let file_path = match entry.enclosed_name() {
            Some(path) => target.join(path),
            None => {
                warn!(name = entry.name(), "skipping entry with unsafe path");
                return Ok(None);
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&file_path).map_err(|e| io_context(e, "create", &file_path))?;
            return Ok(None);
        }

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_context(e, "create", parent))?;
        }

        let mut outfile =
            std::fs::File::create(&file_path).map_err(|e| io_context(e, "create", &file_path))?;

        // Read and write errors are told apart: a bad read means the archive is damaged
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = entry.read(&mut buf).map_err(|e| {
                Error::Install(InstallError::CorruptArchive {
                    archive: archive_path.to_path_buf(),
                    reason: format!("failed to read entry '{}': {}", entry.name(), e),
                })
            })?;
            if n == 0 {
                break;
            }
            outfile
                .write_all(&buf[..n])
                .map_err(|e| io_context(e, "write", &file_path))?;
        }

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            // Keep the rw bits for the owner so a later run can overwrite the file
            let mode = (mode & 0o777) | 0o600;
            if let Err(e) =
                std::fs::set_permissions(&file_path, std::fs::Permissions::from_mode(mode))
            {
                debug!(?file_path, error = %e, "could not apply entry permissions");
            }
        }

        Ok(Some(file_path))
    }
}

#[async_trait]
impl ArchiveInstaller for ZipInstaller {
    async fn install(&self, archive: &Path, target: &Path) -> Result<Vec<PathBuf>> {
        let archive_owned = archive.to_path_buf();
        let target_owned = target.to_path_buf();

        let files = spawn_blocking(move || Self::extract(&archive_owned, &target_owned))
            .await
            .map_err(|e| {
                Error::Install(InstallError::TaskFailed {
                    archive: archive.to_path_buf(),
                    reason: format!("extraction task panicked: {}", e),
                })
            })??;

        tokio::fs::remove_file(archive)
            .await
            .map_err(|e| io_context(e, "remove", archive))?;
        debug!(?archive, "removed installed archive");

        Ok(files)
    }

    fn name(&self) -> &'static str {
        "zip"
    }
}

fn corrupt(archive: &Path, e: ::zip::result::ZipError) -> Error {
    match e {
        ::zip::result::ZipError::Io(io) if io.kind() != std::io::ErrorKind::InvalidData => {
            io_context(io, "read", archive)
        }
        other => Error::Install(InstallError::CorruptArchive {
            archive: archive.to_path_buf(),
            reason: other.to_string(),
        }),
    }
}

fn io_context(e: std::io::Error, action: &str, path: &Path) -> Error {
    Error::Io(std::io::Error::new(
        e.kind(),
        format!("failed to {} '{}': {}", action, path.display(), e),
    ))
}
