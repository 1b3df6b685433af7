//! Configuration types for the bookstore
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `BOOKSTORE_*` environment variables (nested keys use `__`). Binaries
//! apply explicit command line flags on top.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Service configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP API listens on
    pub listen: String,
    /// Path of the JSON document holding the catalog
    pub data_file: PathBuf,
    /// Simulated processing latency
    pub latency: LatencyConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:5000".to_string(),
            data_file: PathBuf::from("data/books.json"),
            latency: LatencyConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load defaults, then `path` (if given), then `BOOKSTORE_*` variables.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the file is unreadable or a value has the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        layered(path, "BOOKSTORE")
    }
}

/// Simulated backend latency per request class, in milliseconds.
///
/// A value of zero disables the delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub read_ms: u64,
    pub write_ms: u64,
    pub search_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            read_ms: 200,
            write_ms: 500,
            search_ms: 300,
        }
    }
}

impl LatencyConfig {
    /// No simulated latency at all
    pub const NONE: Self = Self {
        read_ms: 0,
        write_ms: 0,
        search_ms: 0,
    };

    #[must_use]
    pub const fn read(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }

    #[must_use]
    pub const fn write(&self) -> Duration {
        Duration::from_millis(self.write_ms)
    }

    #[must_use]
    pub const fn search(&self) -> Duration {
        Duration::from_millis(self.search_ms)
    }
}

/// Operator client configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API, including the `/api` prefix
    pub base_url: String,
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    /// Load defaults, then `path` (if given), then `BOOKSTORE_CLIENT_*` variables.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the file is unreadable or a value has the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        layered(path, "BOOKSTORE_CLIENT")
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn layered<T>(path: Option<&Path>, env_prefix: &str) -> Result<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    let defaults = config::Config::try_from(&T::default())
        .map_err(|e| Error::Configuration(e.to_string()))?;
    let mut builder = config::Config::builder().add_source(defaults);
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }
    builder
        .add_source(
            config::Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|settings| settings.try_deserialize::<T>())
        .map_err(|e| Error::Configuration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.listen, "127.0.0.1:5000");
        assert_eq!(config.data_file, PathBuf::from("data/books.json"));
        assert_eq!(config.latency.write(), Duration::from_millis(500));
        assert_eq!(LatencyConfig::NONE.read(), Duration::ZERO);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "data_file = \"/srv/books.json\"\n\n[latency]\nwrite_ms = 0"
        )
        .unwrap();

        let config = ServerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/srv/books.json"));
        assert_eq!(config.latency.write_ms, 0);
        // untouched keys keep their defaults
        assert_eq!(config.latency.read_ms, 200);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            ClientConfig::load(Some(&missing)),
            Err(Error::Configuration(_))
        ));
    }
}
