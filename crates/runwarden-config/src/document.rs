use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;

use crate::error::ConfigError;

/// Externally managed configuration object (a ConfigMap in the cluster).
///
/// Only `data` is consulted; the policy lives under [`crate::CONFIG_FILE_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    pub name: String,
    pub data: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct RawObject {
    #[serde(default)]
    metadata: RawMetadata,
    #[serde(default)]
    data: BTreeMap<String, String>,
}

#[derive(Deserialize, Default)]
struct RawMetadata {
    #[serde(default)]
    name: String,
}

impl ConfigDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Parse a ConfigMap-shaped JSON object: `{"metadata":{"name":..},"data":{..}}`.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let obj: RawObject = serde_json::from_str(raw).map_err(ConfigError::Malformed)?;
        Ok(Self {
            name: obj.metadata.name,
            data: obj.data,
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}
