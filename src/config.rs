//! Configuration types for modpack-dl

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// HTTP client configuration used by the archive fetcher
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request (default: "modpack-dl/<version>")
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for establishing a connection (default: 30 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Overall timeout per archive request (None = unlimited, default)
    ///
    /// Modpack archives can be several hundred megabytes, so the transfer itself is not
    /// bounded unless explicitly configured.
    #[serde(default, with = "optional_duration_serde")]
    pub request_timeout: Option<Duration>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
            request_timeout: None,
        }
    }
}

/// Main configuration for ModpackUpdater
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Source catalog (default: the built-in table)
    #[serde(default)]
    pub catalog: Catalog,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Capacity of the event broadcast channel (default: 1000)
    ///
    /// A subscriber that falls further behind than this receives `RecvError::Lagged`.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: Catalog::default(),
            http: HttpConfig::default(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read config '{}': {}", path.display(), e),
            ))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Reject settings the updater cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer == 0 {
            return Err(Error::Config {
                message: "event_buffer must be greater than zero".into(),
                key: Some("event_buffer".into()),
            });
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(Error::Config {
                message: "user_agent must not be empty".into(),
                key: Some("http.user_agent".into()),
            });
        }
        self.catalog.validate()
    }
}

fn default_user_agent() -> String {
    format!("modpack-dl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_event_buffer() -> usize {
    1000
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
