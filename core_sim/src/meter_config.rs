//! Configuration for meter lifecycle and save handling.
//!
//! Loaded from `meter_config.json` with support for an environment variable override.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use thiserror::Error;

use crate::meter::Meter;

pub const BUILTIN_METER_CONFIG: &str = include_str!("data/meter_config.json");

/// Root configuration for the meter model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    pub lifecycle: LifecycleConfig,
    pub persistence: PersistenceConfig,
}

impl MeterConfig {
    pub fn builtin() -> Result<Arc<Self>, MeterConfigError> {
        Ok(Arc::new(Self::from_json_str(BUILTIN_METER_CONFIG)?))
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, MeterConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| MeterConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = MeterConfig::from_json_str(&contents)?;
        Ok(config)
    }
}

/// Values used by the per-turn reset and clamp of unpaired meters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub unpaired_reset_value: f32,
    pub unpaired_clamp_min: f32,
    pub unpaired_clamp_max: f32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            unpaired_reset_value: Meter::DEFAULT_VALUE,
            unpaired_clamp_min: Meter::DEFAULT_VALUE,
            unpaired_clamp_max: Meter::LARGE_VALUE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Reject sealed saves whose checksum no longer matches their contents.
    pub verify_checksum: bool,
    /// Hold back change notifications while a save is applied to live objects.
    pub inhibit_signals_on_load: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            verify_checksum: true,
            inhibit_signals_on_load: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum MeterConfigError {
    #[error("failed to parse meter config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read meter config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Shared handle to the active configuration.
#[derive(Debug, Clone)]
pub struct MeterConfigHandle(pub Arc<MeterConfig>);

impl MeterConfigHandle {
    pub fn new(config: Arc<MeterConfig>) -> Self {
        Self(config)
    }

    pub fn get(&self) -> Arc<MeterConfig> {
        Arc::clone(&self.0)
    }

    pub fn replace(&mut self, config: Arc<MeterConfig>) {
        self.0 = config;
    }
}

impl Default for MeterConfigHandle {
    fn default() -> Self {
        Self(Arc::new(MeterConfig::default()))
    }
}

/// Load meter configuration from `METER_CONFIG_PATH`, falling back to the builtin.
///
/// Also returns the path the configuration was read from, if any.
pub fn load_meter_config_from_env() -> (Arc<MeterConfig>, Option<PathBuf>) {
    if let Some(path) = env::var_os("METER_CONFIG_PATH").map(PathBuf::from) {
        match MeterConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "meters::config",
                    path = %path.display(),
                    "meter_config.loaded=file"
                );
                return (Arc::new(config), Some(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "meters::config",
                    path = %path.display(),
                    error = %err,
                    "meter_config.load_failed"
                );
            }
        }
    }

    match MeterConfig::builtin() {
        Ok(config) => {
            tracing::info!(target: "meters::config", "meter_config.loaded=builtin");
            (config, None)
        }
        Err(err) => {
            tracing::error!(
                target: "meters::config",
                error = %err,
                "meter_config.builtin_invalid=defaults"
            );
            (Arc::new(MeterConfig::default()), None)
        }
    }
}
