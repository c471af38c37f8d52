use crate::error::{Error, FailureKind, InstallError};
use crate::extraction::*;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a valid ZIP archive containing multiple files
fn create_zip_archive_multi(archive_path: &Path, files: &[(&str, &[u8])]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        std::io::Write::write_all(&mut writer, content).unwrap();
    }
    writer.finish().unwrap();
}

/// Relative paths of every regular file under `root`, sorted
fn files_under(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

// ---------------------------------------------------------------------------
// Successful installs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn install_reproduces_tree_and_removes_archive() {
    let target = TempDir::new().unwrap();
    let archive = target.path().join("mods.zip");
    create_zip_archive_multi(
        &archive,
        &[
            ("mods/sodium.jar", b"sodium bytes"),
            ("mods/lithium.jar", b"lithium bytes"),
            ("mods/nested/deeper/readme.txt", b"hello"),
        ],
    );

    let written = ZipInstaller::new()
        .install(&archive, target.path())
        .await
        .unwrap();

    assert_eq!(written.len(), 3);
    assert!(written.iter().all(|p| p.starts_with(target.path())));
    assert!(!archive.exists(), "archive must be removed after install");
    assert_eq!(
        files_under(target.path()),
        vec![
            "mods/lithium.jar",
            "mods/nested/deeper/readme.txt",
            "mods/sodium.jar"
        ]
    );
    assert_eq!(
        std::fs::read(target.path().join("mods/sodium.jar")).unwrap(),
        b"sodium bytes"
    );
}

#[tokio::test]
async fn install_overwrites_existing_files() {
    let target = TempDir::new().unwrap();
    std::fs::create_dir_all(target.path().join("config")).unwrap();
    std::fs::write(target.path().join("config/options.txt"), b"old contents, longer").unwrap();

    let archive = target.path().join("config.zip");
    create_zip_archive_multi(&archive, &[("config/options.txt", b"new")]);

    ZipInstaller::new()
        .install(&archive, target.path())
        .await
        .unwrap();

    assert_eq!(
        std::fs::read(target.path().join("config/options.txt")).unwrap(),
        b"new"
    );
}

#[tokio::test]
async fn install_creates_explicit_directory_entries() {
    let target = TempDir::new().unwrap();
    let archive = target.path().join("resourcepacks.zip");

    let file = std::fs::File::create(&archive).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    writer
        .add_directory("resourcepacks/empty/", ::zip::write::FileOptions::default())
        .unwrap();
    writer.finish().unwrap();

    let written = ZipInstaller::new()
        .install(&archive, target.path())
        .await
        .unwrap();

    assert!(written.is_empty(), "directories are not reported as files");
    assert!(target.path().join("resourcepacks/empty").is_dir());
}

#[tokio::test]
async fn install_skips_entries_escaping_target() {
    let outer = TempDir::new().unwrap();
    let target = outer.path().join("game");
    std::fs::create_dir(&target).unwrap();
    let archive = target.join("mods.zip");
    create_zip_archive_multi(
        &archive,
        &[("../evil.txt", b"nope"), ("mods/good.jar", b"ok")],
    );

    let written = ZipInstaller::new().install(&archive, &target).await.unwrap();

    assert_eq!(written, vec![target.join("mods/good.jar")]);
    assert!(!outer.path().join("evil.txt").exists());
}

#[test]
fn blocking_extract_leaves_archive_in_place() {
    let target = TempDir::new().unwrap();
    let archive = target.path().join("mods.zip");
    create_zip_archive_multi(&archive, &[("mods/a.jar", b"a")]);

    let written = ZipInstaller::extract(&archive, target.path()).unwrap();

    assert_eq!(written.len(), 1);
    assert!(archive.exists());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn install_garbage_file_is_corrupt_and_archive_kept() {
    let target = TempDir::new().unwrap();
    let archive = target.path().join("mods.zip");
    std::fs::write(&archive, b"<html>this is a login page, not a zip</html>").unwrap();

    let err = ZipInstaller::new()
        .install(&archive, target.path())
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Install(InstallError::CorruptArchive { .. })),
        "got {err:?}"
    );
    assert_eq!(err.kind(), FailureKind::CorruptArchive);
    assert!(archive.exists(), "a failed install must not delete the archive");
}

#[tokio::test]
async fn install_missing_archive_is_io_failure() {
    let target = TempDir::new().unwrap();

    let err = ZipInstaller::new()
        .install(&target.path().join("config.zip"), target.path())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)), "got {err:?}");
    assert_eq!(err.kind(), FailureKind::Io);
}

#[tokio::test]
async fn install_detects_damaged_entry_data() {
    let target = TempDir::new().unwrap();
    let archive = target.path().join("mods.zip");
    let payload = b"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    create_zip_archive_multi(&archive, &[("mods/a.jar", payload)]);

    // Stored entries keep their data verbatim, so flip one payload byte to break the CRC
    let mut bytes = std::fs::read(&archive).unwrap();
    let offset = bytes
        .windows(payload.len())
        .position(|w| w == payload)
        .unwrap();
    bytes[offset] = b'B';
    std::fs::write(&archive, bytes).unwrap();

    let err = ZipInstaller::new()
        .install(&archive, target.path())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::CorruptArchive, "got {err:?}");
    assert!(archive.exists());
}

#[test]
fn installer_name() {
    assert_eq!(ZipInstaller::new().name(), "zip");
}
