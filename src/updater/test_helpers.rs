//! Shared test helpers: scripted components for driving ModpackUpdater without a network.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::extraction::{ArchiveInstaller, ZipInstaller};
use crate::fetch::{ArchiveFetcher, ProgressCallback};
use crate::updater::ModpackUpdater;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub(crate) const SOURCE: &str = "Test";
pub(crate) const VERSION: &str = "1.0";

/// Ordered record of every component call ("fetch <location>", "install <file name>")
pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

/// What the scripted fetcher does for one location
#[derive(Clone)]
pub(crate) enum Script {
    /// Write these bytes and report them in two progress steps
    Serve(Vec<u8>),
    /// Fail with an HTTP 500
    Fail,
    /// Block until the run is cancelled
    Hang,
}

pub(crate) struct ScriptedFetcher {
    scripts: HashMap<String, Script>,
    log: CallLog,
}

#[async_trait]
impl ArchiveFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        location: &str,
        destination: &Path,
        progress: &ProgressCallback<'_>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        self.log.lock().unwrap().push(format!("fetch {location}"));

        match self.scripts.get(location).cloned().unwrap_or(Script::Fail) {
            Script::Serve(bytes) => {
                let total = bytes.len() as u64;
                tokio::fs::write(destination, &bytes).await?;
                progress(total / 2, Some(total));
                progress(total, Some(total));
                Ok(destination.to_path_buf())
            }
            Script::Fail => Err(Error::HttpStatus {
                url: location.to_string(),
                status: 500,
            }),
            Script::Hang => {
                cancel.cancelled().await;
                Err(Error::Cancelled)
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Real ZIP installer that also records which archives it was asked to install
pub(crate) struct RecordingInstaller {
    log: CallLog,
}

#[async_trait]
impl ArchiveInstaller for RecordingInstaller {
    async fn install(&self, archive: &Path, target: &Path) -> Result<Vec<PathBuf>> {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.log.lock().unwrap().push(format!("install {name}"));
        ZipInstaller::new().install(archive, target).await
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Location used for entry `index` of the test catalog
pub(crate) fn location(index: usize) -> String {
    format!("https://archives.test/{index}")
}

/// Build an in-memory ZIP archive
pub(crate) fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ::zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// The archive served for each of the three standard entries
pub(crate) fn standard_archive(index: usize) -> Vec<u8> {
    match index {
        0 => zip_bytes(&[("config/options.txt", b"fov:90")]),
        1 => zip_bytes(&[("mods/sodium.jar", b"sodium"), ("mods/iris.jar", b"iris")]),
        _ => zip_bytes(&[("resourcepacks/faithful.zip", b"pack")]),
    }
}

/// Create an updater whose catalog lists one location per script, in order
pub(crate) fn create_test_updater(scripts: Vec<Script>) -> (ModpackUpdater, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));

    let mut catalog = Catalog::empty();
    catalog.insert(
        SOURCE,
        VERSION,
        (0..scripts.len()).map(location).collect(),
    );

    let fetcher = ScriptedFetcher {
        scripts: scripts
            .into_iter()
            .enumerate()
            .map(|(i, script)| (location(i), script))
            .collect(),
        log: log.clone(),
    };
    let installer = RecordingInstaller { log: log.clone() };

    let config = Config {
        catalog,
        ..Config::default()
    };
    let updater =
        ModpackUpdater::with_components(config, Arc::new(fetcher), Arc::new(installer)).unwrap();
    (updater, log)
}

/// Three entries that all succeed
pub(crate) fn create_standard_updater() -> (ModpackUpdater, CallLog) {
    create_test_updater((0..3).map(|i| Script::Serve(standard_archive(i))).collect())
}
