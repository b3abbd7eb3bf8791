use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

/// Key holding the last folder chosen in the picker.
pub const OUTPUT_DIR_KEY: &str = "outputDir";

pub type ConfigMap = Map<String, Value>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config must be a JSON object")]
    NotAnObject,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Flat JSON object persisted to a single file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored object. A missing file is an empty config, not an
    /// error.
    pub fn try_read(&self) -> Result<ConfigMap> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ConfigMap::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes)? {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    /// Best-effort read used at startup: unreadable or corrupted files are
    /// logged and treated as empty.
    pub fn read(&self) -> ConfigMap {
        self.try_read().unwrap_or_else(|e| {
            log::warn!("Ignoring config at {}: {}", self.path.display(), e);
            ConfigMap::new()
        })
    }

    /// Replaces the file with `config`, pretty-printed.
    pub fn write(&self, config: &ConfigMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, format!("{json}\n"))?;
        Ok(())
    }

    /// Read-modify-write: keys in `partial` overwrite, all other stored
    /// keys are kept.
    pub fn update(&self, partial: ConfigMap) -> Result<ConfigMap> {
        let mut config = self.read();
        config.extend(partial);
        self.write(&config)?;
        Ok(config)
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        self.read()
            .get(OUTPUT_DIR_KEY)
            .and_then(Value::as_str)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
    }
}
