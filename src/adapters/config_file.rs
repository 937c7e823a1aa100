//! JSON file configuration store.
//!
//! Implements [`ConfigPort`] on top of a single JSON document.
//!
//! - A missing file is not an error: defaults are returned.
//! - Fields absent from the file take their defaults (`#[serde(default)]`).
//! - Every load and save is validated; bad values are rejected, not
//!   clamped.
//! - Saves write a sibling temp file and rename it over the target, so a
//!   crash mid-write never leaves a truncated config behind.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

/// Config path used when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "sitegate.json";

pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    cfg.validate().map_err(ConfigError::ValidationFailed)
}

impl ConfigPort for FileConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "CONFIG: {} not found, using defaults",
                    self.path.display()
                );
                return Ok(SystemConfig::default());
            }
            Err(e) => return Err(ConfigError::IoError(e)),
        };

        let cfg: SystemConfig =
            serde_json::from_str(&text).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        validate_config(&cfg)?;
        info!("CONFIG: loaded {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let text = serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::Corrupted(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, text).map_err(ConfigError::IoError)?;
        fs::rename(&tmp, &self.path).map_err(ConfigError::IoError)?;
        info!("CONFIG: saved {}", self.path.display());
        Ok(())
    }
}
