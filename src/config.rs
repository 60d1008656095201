use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{RdeCoachError, telemetry::DEFAULT_EXPECTED_DISTANCE_KM};

const APP_DIR_NAME: &str = "rde-coach";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Distance used for sessions whose tick file does not announce one, km
    pub expected_distance_km: f64,
    /// Pause between replayed ticks, 0 replays as fast as possible
    pub replay_interval_ms: u64,
    /// Print a prompt only when it differs from the previous one
    pub announce_only_changes: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            expected_distance_km: DEFAULT_EXPECTED_DISTANCE_KM,
            replay_interval_ms: 0,
            announce_only_changes: true,
        }
    }
}

impl AppConfig {
    /// Location of the config file in the user config directory
    pub fn default_path() -> Result<PathBuf, RdeCoachError> {
        Ok(dirs::config_dir()
            .ok_or(RdeCoachError::NoConfigDir)?
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Load the config file from the user config directory, `None` when there is none yet.
    pub fn from_local_file() -> Result<Option<Self>, RdeCoachError> {
        Self::from_file(&Self::default_path()?)
    }

    pub fn from_file(config_path: &Path) -> Result<Option<Self>, RdeCoachError> {
        if !config_path.exists() {
            debug!("No config file at {:?}", config_path);
            return Ok(None);
        }

        let file = std::fs::File::open(config_path)
            .map_err(|e| RdeCoachError::ConfigIOError { source: e })?;
        let config = serde_json::from_reader(file)
            .map_err(|e| RdeCoachError::ConfigSerializeError { source: e })?;
        Ok(Some(config))
    }

    pub fn save(&self) -> Result<PathBuf, RdeCoachError> {
        let config_path = Self::default_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), RdeCoachError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RdeCoachError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| RdeCoachError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| RdeCoachError::ConfigSerializeError { source: e })
    }
}
