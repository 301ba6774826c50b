use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::session::DEFAULT_DURATION;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tui: TuiConfig,
    pub data: DataConfig,
    pub combat: CombatConfig,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
    /// Log pane visibility for a fresh session (a saved session keeps its own).
    pub show_log: bool,
}

/// Where the session snapshot and exports live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
    pub snapshot_file: String,
    /// Export/import target, relative to the data directory unless absolute.
    pub export_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Pre-filled rounds in the condition picker.
    pub default_condition_duration: u32,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            show_log: false,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            snapshot_file: "t20_combat_app_v1.json".to_string(),
            export_file: PathBuf::from("combat_export.json"),
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            default_condition_duration: DEFAULT_DURATION,
        }
    }
}

impl AppConfig {
    /// Load configuration from `<config_dir>/combat-tracker/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e}, using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!("No config file at {}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("combat-tracker"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir().join(&self.data.snapshot_file)
    }

    pub fn export_path(&self) -> PathBuf {
        if self.data.export_file.is_absolute() {
            self.data.export_file.clone()
        } else {
            self.data_dir().join(&self.data.export_file)
        }
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("combat-tracker").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
