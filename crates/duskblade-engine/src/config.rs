//! Engine configuration.
//!
//! Provides the harness parameters: tick rate, run length, data file, and
//! logging. Configuration can be loaded from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::data_loader::DEFAULT_DATA_PATH;

/// Configuration file name.
const CONFIG_FILE: &str = "duskblade.toml";

/// Default log directive.
pub const DEFAULT_LOG_FILTER: &str = "duskblade=info";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Timing ===
    /// Fixed simulation ticks per second
    pub tick_rate: u32,
    /// Host frames per second fed into the fixed-step accumulator
    pub frame_rate: u32,
    /// Simulated run length in seconds
    pub duration_secs: f32,

    // === Session ===
    /// Character data file
    pub data_path: PathBuf,
    /// Seed for enemy randomness (None = random)
    pub seed: Option<u64>,
    /// Session event bus capacity
    pub bus_capacity: usize,

    // === Debug ===
    /// Log directive added on top of `RUST_LOG`
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            frame_rate: 60,
            duration_secs: 20.0,

            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            seed: None,
            bus_capacity: 1024,

            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str::<Self>(&contents) {
            Ok(mut config) => {
                config.validate();
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    #[allow(dead_code)]
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path.
    fn config_path() -> PathBuf {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return local;
        }
        dirs_config_path().map_or(local, |dir| dir.join("duskblade").join(CONFIG_FILE))
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.tick_rate = self.tick_rate.clamp(10, 240);
        self.frame_rate = self.frame_rate.clamp(10, 240);
        if !self.duration_secs.is_finite() {
            self.duration_secs = 0.0;
        }
        self.duration_secs = self.duration_secs.clamp(0.0, 3600.0);
        self.bus_capacity = self.bus_capacity.clamp(16, 65_536);
    }
}

/// Get platform-specific config directory.
fn dirs_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.log_filter, "duskblade=info");
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.tick_rate = 1;
        config.duration_secs = f32::NAN;
        config.bus_capacity = 0;

        config.validate();

        assert_eq!(config.tick_rate, 10);
        assert_eq!(config.duration_secs, 0.0);
        assert_eq!(config.bus_capacity, 16);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test_config.toml");

        let mut config = EngineConfig::default();
        config.tick_rate = 120;
        config.seed = Some(12345);

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "duration_secs = 5.0\n").expect("Failed to write");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded.duration_secs, 5.0);
        assert_eq!(loaded.tick_rate, 60);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/config.toml");
        assert_eq!(config, EngineConfig::default());
    }
}
