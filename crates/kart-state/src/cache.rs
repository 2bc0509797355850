//! Read-only local name cache.
//!
//! The cache file is a flat JSON object of string values, e.g.
//! `{"kart": "Ana,Bo,Cy"}`. It is consulted once at startup and never
//! written back.

use std::collections::HashMap;
use std::path::Path;

/// Source of a previously cached comma-separated name string.
pub trait NameCache {
    fn get(&self, key: &str) -> Option<String>;
}

impl NameCache for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Cache backed by a JSON file on disk.
#[derive(Debug, Clone, Default)]
pub struct FileCache {
    entries: HashMap<String, String>,
}

impl FileCache {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Best-effort load. A missing, unreadable or malformed file yields an
    /// empty cache.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No name cache file");
                return Self::empty();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read name cache");
                return Self::empty();
            }
        };

        match serde_json::from_str::<HashMap<String, serde_json::Value>>(&raw) {
            Ok(values) => {
                let entries = values
                    .into_iter()
                    .filter_map(|(k, v)| match v {
                        serde_json::Value::String(s) => Some((k, s)),
                        _ => None,
                    })
                    .collect();
                Self { entries }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed name cache");
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NameCache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}
