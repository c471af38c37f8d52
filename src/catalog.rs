//! Source catalog: which archives make up a modpack version
//!
//! The catalog is a static table keyed by source name, then version, holding an ordered
//! list of archive locations. Position in that list, not content inspection, decides the
//! local file name each archive is saved under (see [`LOCAL_FILE_NAMES`]).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Local archive names, aligned by position with a version's location list
pub const LOCAL_FILE_NAMES: [&str; 3] = ["config.zip", "mods.zip", "resourcepacks.zip"];

/// One archive to install: where to fetch it and what to call it locally
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Remote location (HTTP/HTTPS URL)
    pub location: String,
    /// Local file name inside the target directory
    pub file_name: String,
}

/// Static mapping from (source, version) to ordered archive locations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    sources: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Create an empty catalog
    pub fn empty() -> Self {
        Self {
            sources: BTreeMap::new(),
        }
    }

    /// The catalog shipped with the tool
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(
            "Modrinth",
            "1.21",
            vec![
                "https://www.dropbox.com/scl/fo/esxa2g54h184l59i5ft8x/AAGXZFblK7q4biPjNIWcqfE?rlkey=ef8vkxcqxomohrkbzmmrtorcu&st=s96swzfb&dl=1".to_string(),
                "https://www.dropbox.com/scl/fo/6fale5ezaz3b4jepa1qwe/ACfs9t5o0C1iTj6o8Zhbm2w?rlkey=qmu4sa26idv3q3ewovfwrsiz6&st=u5hxs9o7&dl=1".to_string(),
                "https://www.dropbox.com/scl/fo/t26yjcdgybjgq3c08khhy/AM8WJWOkvOTL0pVQBDfdYmE?rlkey=h9cckzmqrmdfqrgk4ag1dzsv1&st=x85qtrkq&dl=1".to_string(),
            ],
        );
        catalog
    }

    /// Parse a catalog from JSON (`{"source": {"version": ["url", ...]}}`)
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read catalog '{}': {}", path.display(), e),
            ))
        })?;
        debug!(?path, "loaded catalog file");
        Self::from_json(&content)
    }

    /// Add or replace the location list for a (source, version) pair
    pub fn insert(
        &mut self,
        source: impl Into<String>,
        version: impl Into<String>,
        locations: Vec<String>,
    ) {
        self.sources
            .entry(source.into())
            .or_default()
            .insert(version.into(), locations);
    }

    /// Ordered entries for a (source, version) pair; empty if the pair is unknown
    pub fn entries(&self, source: &str, version: &str) -> Vec<CatalogEntry> {
        self.sources
            .get(source)
            .and_then(|versions| versions.get(version))
            .map(|locations| {
                locations
                    .iter()
                    .zip(LOCAL_FILE_NAMES)
                    .map(|(location, file_name)| CatalogEntry {
                        location: location.clone(),
                        file_name: file_name.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Known source names
    pub fn sources(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    /// Known versions of a source (empty if the source is unknown)
    pub fn versions(&self, source: &str) -> Vec<&str> {
        self.sources
            .get(source)
            .map(|versions| versions.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// First source and its first version, used to preselect the UI
    pub fn default_selection(&self) -> Option<(&str, &str)> {
        let (source, versions) = self.sources.iter().next()?;
        let version = versions.keys().next()?;
        Some((source.as_str(), version.as_str()))
    }

    /// Check every version has between one and three absolute http(s) locations
    pub fn validate(&self) -> Result<()> {
        for (source, versions) in &self.sources {
            for (version, locations) in versions {
                let key = format!("{source}/{version}");

                if locations.is_empty() {
                    return Err(Error::Config {
                        message: format!("{key} lists no archive locations"),
                        key: Some(key),
                    });
                }

                if locations.len() > LOCAL_FILE_NAMES.len() {
                    return Err(Error::Config {
                        message: format!(
                            "{key} lists {} locations, at most {} are supported",
                            locations.len(),
                            LOCAL_FILE_NAMES.len()
                        ),
                        key: Some(key),
                    });
                }

                for location in locations {
                    let parsed = url::Url::parse(location).map_err(|e| Error::Config {
                        message: format!("{key} has invalid location '{location}': {e}"),
                        key: Some(key.clone()),
                    })?;
                    if !matches!(parsed.scheme(), "http" | "https") {
                        return Err(Error::Config {
                            message: format!(
                                "{key} location '{location}' must use http or https"
                            ),
                            key: Some(key),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
