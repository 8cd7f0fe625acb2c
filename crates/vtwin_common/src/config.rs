//! vtwin configuration.
//!
//! Config file: ~/.config/vtwin/config.toml or /etc/vtwin/config.toml

use crate::overall::OverallStatusRule;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "VTWIN_CONFIG";

/// Color display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub color: ColorMode,
}

/// Main vtwin configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VtwinConfig {
    /// Where the overall device status is read from
    #[serde(default)]
    pub status: OverallStatusRule,

    #[serde(default)]
    pub output: OutputConfig,
}

impl VtwinConfig {
    /// Default user config path: $XDG_CONFIG_HOME/vtwin/config.toml or ~/.config/vtwin/config.toml
    pub fn user_config_path() -> Result<PathBuf> {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return Ok(PathBuf::from(xdg).join("vtwin").join("config.toml"));
            }
        }

        let home = std::env::var("HOME").context("Cannot determine home directory")?;
        Ok(Path::new(&home)
            .join(".config")
            .join("vtwin")
            .join("config.toml"))
    }

    /// System config path: /etc/vtwin/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/vtwin/config.toml")
    }

    /// Read and parse one config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: VtwinConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(path = %path.display(), rule = config.status.name(), "loaded config");
        Ok(config)
    }

    /// Load configuration
    ///
    /// Priority:
    /// 1. Explicit path (must exist)
    /// 2. $VTWIN_CONFIG (must exist)
    /// 3. User config (~/.config/vtwin/config.toml)
    /// 4. System config (/etc/vtwin/config.toml)
    /// 5. Defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            if !env_path.is_empty() {
                return Self::load_from(Path::new(&env_path));
            }
        }

        if let Ok(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::load_from(&user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::load_from(&system_path);
        }

        Ok(Self::default())
    }

    /// Write configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Apply a `key=value` setting
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "status.rule" => {
                self.status = match value {
                    "device_field" => OverallStatusRule::default(),
                    "sensor_conjunction" => OverallStatusRule::sensor_conjunction(),
                    _ => anyhow::bail!(
                        "Invalid status rule: '{}'. Valid values: device_field, sensor_conjunction",
                        value
                    ),
                };
            }
            "status.component" | "status.field" => match &mut self.status {
                OverallStatusRule::DeviceField { component, field } => {
                    if value.is_empty() {
                        anyhow::bail!("{} cannot be empty", key);
                    }
                    if key == "status.component" {
                        *component = value.to_string();
                    } else {
                        *field = value.to_string();
                    }
                }
                OverallStatusRule::SensorConjunction { .. } => {
                    anyhow::bail!("{} only applies to the device_field rule", key)
                }
            },
            "status.sensors" => match &mut self.status {
                OverallStatusRule::SensorConjunction { sensors } => {
                    *sensors = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                OverallStatusRule::DeviceField { .. } => {
                    anyhow::bail!("status.sensors only applies to the sensor_conjunction rule")
                }
            },
            "output.color" => {
                self.output.color = match value.to_lowercase().as_str() {
                    "auto" => ColorMode::Auto,
                    "always" | "on" => ColorMode::Always,
                    "never" | "off" | "none" => ColorMode::Never,
                    _ => anyhow::bail!(
                        "Invalid color mode: '{}'. Valid values: auto, always, never",
                        value
                    ),
                };
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }
}
