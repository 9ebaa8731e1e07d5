//! Configuration management module
//!
//! Driver settings live in a YAML file. Lookup order: explicit path,
//! `./config/settle.yaml`, then `<config dir>/settle/config.yaml`. A missing
//! file falls back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

const LOCAL_CONFIG: &str = "config/settle.yaml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Deadline applied to commands that carry no timeout of their own
    pub default_timeout_ms: u64,

    pub logging: LoggingConfig,

    pub simulation: SimulationConfig,
}

impl DriverConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_timeout_ms == 0 {
            bail!("default_timeout_ms must be greater than zero");
        }
        if self.simulation.cycle_ms == 0 {
            bail!("simulation.cycle_ms must be greater than zero");
        }
        self.logging
            .level
            .parse::<tracing::Level>()
            .map_err(|_| anyhow::anyhow!("invalid logging.level {:?}", self.logging.level))?;
        Ok(())
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 5000,
            logging: LoggingConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Interval between simulated cycle boundaries
    pub cycle_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { cycle_ms: 16 }
    }
}

pub struct LoadedConfig {
    pub config: DriverConfig,
    pub path: PathBuf,
    pub from_file: bool,
}

impl LoadedConfig {
    pub fn log_source(&self) {
        if self.from_file {
            info!("Loaded configuration from: {}", self.path.display());
        } else {
            warn!(
                "Config file not found, using defaults: {}",
                self.path.display()
            );
        }
    }
}

pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return local;
    }
    match dirs::config_dir() {
        Some(mut path) => {
            path.push("settle");
            path.push("config.yaml");
            path
        }
        None => local,
    }
}

/// Loads the configuration and logs where it came from.
pub async fn load_config(config_path: Option<&Path>) -> Result<LoadedConfig> {
    let loaded = read_config(config_path).await?;
    loaded.log_source();
    Ok(loaded)
}

/// Loads the configuration without logging, for callers that install the
/// subscriber from the loaded settings. Follow up with
/// [`LoadedConfig::log_source`].
pub async fn read_config(config_path: Option<&Path>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => default_config_path(),
    };

    if !config_path.exists() {
        return Ok(LoadedConfig {
            config: DriverConfig::default(),
            path: config_path,
            from_file: false,
        });
    }

    let content = fs::read_to_string(&config_path)
        .await
        .context("Failed to read config file")?;
    let config: DriverConfig =
        serde_yaml::from_str(&content).context("Failed to parse config file")?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(LoadedConfig {
        config,
        path: config_path,
        from_file: true,
    })
}
