//! Configuration for the kart connector.
//!
//! Loaded from a TOML file; every field has a default so an empty or
//! missing file is valid.
//!
//! ```toml
//! [layout]
//! source = "layout.txt"          # path or http(s) URL
//!
//! [sync]
//! host = "localhost"
//! port = 9003
//! # url = "ws://10.0.0.5:9003"   # overrides host/port
//!
//! [names]
//! cache_key = "kart"
//! default_count = 16
//!
//! [log]
//! filter = "info"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

use kart_network::{parse_sync_url, sync_url, SyncError};
use kart_protocol::{DEFAULT_LAYOUT_SOURCE, DEFAULT_SPOT_COUNT, DEFAULT_SYNC_PORT, NAME_CACHE_KEY};

const APP_DIR: &str = "kart-grid";

/// Name of the config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "kart.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KartConfig {
    pub layout: LayoutConfig,
    pub sync: SyncConfig,
    pub names: NamesConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Filesystem path or `http(s)://` URL of the layout text.
    pub source: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_LAYOUT_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub host: String,
    pub port: u16,
    /// Full endpoint; takes precedence over `host` and `port`.
    pub url: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_SYNC_PORT,
            url: None,
        }
    }
}

impl SyncConfig {
    pub fn endpoint(&self) -> Result<Url, SyncError> {
        match &self.url {
            Some(raw) => parse_sync_url(raw),
            None => sync_url(&self.host, self.port),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    /// JSON cache file. Defaults to `<data dir>/kart-grid/names.json`.
    pub cache_path: Option<PathBuf>,
    pub cache_key: String,
    /// Size of the `0..N` fallback list used without a cached value.
    pub default_count: usize,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            cache_path: None,
            cache_key: NAME_CACHE_KEY.to_string(),
            default_count: DEFAULT_SPOT_COUNT,
        }
    }
}

impl NamesConfig {
    pub fn resolved_cache_path(&self) -> Option<PathBuf> {
        self.cache_path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR).join("names.json")))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
    /// Log file used while the console owns the terminal.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn resolved_file(&self) -> PathBuf {
        self.file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR)
                .join("kart-connector.log")
        })
    }
}

impl KartConfig {
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("invalid configuration")
    }

    /// Load a config file that must exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    /// Load `path` when given, else `kart.toml` from the working directory
    /// if present, else defaults.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
