//! Translator configuration
//!
//! ```toml
//! capture_prefix = "cb_"
//!
//! [types]
//! "Demo.Color" = "float4"
//! ```

use crate::constants::translation::DEFAULT_CAPTURE_PREFIX;
use crate::translation::TypeMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Prefix of generated capture identifiers.
    pub capture_prefix: String,
    /// Extra host -> HLSL type mappings, layered over the built-in table.
    pub types: HashMap<String, String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            capture_prefix: DEFAULT_CAPTURE_PREFIX.to_string(),
            types: HashMap::new(),
        }
    }
}

impl TranslatorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::info!(
            "[TranslatorConfig] Loaded {} ({} extra type mappings)",
            path.display(),
            config.types.len()
        );
        Ok(config)
    }

    /// Built-in type table with this configuration's mappings applied on top.
    pub fn type_map(&self) -> TypeMap {
        let mut map = TypeMap::new();
        for (host, hlsl) in &self.types {
            map.register(host.clone(), hlsl.clone());
        }
        map
    }
}
