//! FROST Configuration Management
//!
//! Handles loading and managing configuration from ~/.frost/config.toml
//! Supports partial files and default config generation.

use frost_core::{GlassConfig, PerformanceConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration directory name
const CONFIG_DIR_NAME: &str = ".frost";
/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Display configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Physical pixels per device-independent pixel; scales blur size
    #[serde(default = "default_density")]
    pub density: f32,
}

fn default_density() -> f32 {
    1.0
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Defaults for new glass widgets
    #[serde(default)]
    pub glass: GlassConfig,

    /// Frame-budget tuning
    #[serde(default)]
    pub performance: PerformanceConfig,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            log::info!("Config file not found, creating default at {:?}", config_path);
            Self::create_default_config()?;
        }

        let config = Self::load_from(&config_path)?;
        log::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;

        config.validate()?;
        Ok(config)
    }

    /// Check every value a widget would reject
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.glass.validate().map_err(ConfigError::Invalid)?;
        if !(self.display.density > 0.0) {
            return Err(ConfigError::Invalid(frost_core::ConfigError::Invalid {
                field: "density",
                expected: "> 0",
                value: self.display.density.to_string(),
            }));
        }
        Ok(())
    }

    /// Get the configuration directory path (~/.frost/)
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(CONFIG_DIR_NAME))
    }

    /// Get the configuration file path (~/.frost/config.toml)
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Create the default configuration file and directory
    pub fn create_default_config() -> Result<(), ConfigError> {
        Self::write_default_config(&Self::config_file_path()?)
    }

    /// Write a commented default configuration to `config_path`
    pub fn write_default_config(config_path: &Path) -> Result<(), ConfigError> {
        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir)
                .map_err(|e| ConfigError::CreateDirError(config_dir.to_path_buf(), e))?;
        }

        let default_config = Config::default();
        let toml_content =
            toml::to_string_pretty(&default_config).map_err(ConfigError::SerializeError)?;

        // Add header comment
        let content = format!(
            "# FROST Configuration\n\
             #\n\
             # [glass]        defaults for new frosted-glass widgets\n\
             # [performance]  blur target caps, refresh rate and debounce\n\
             # [display]      density scales blur_size to physical pixels\n\
             \n\
             {toml_content}"
        );

        fs::write(config_path, content)
            .map_err(|e| ConfigError::WriteError(config_path.to_path_buf(), e))?;

        log::info!("Created default configuration at {:?}", config_path);
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Home directory not found
    NoHomeDirectory,
    /// Failed to read config file
    ReadError(PathBuf, std::io::Error),
    /// Failed to parse config file
    ParseError(PathBuf, toml::de::Error),
    /// Failed to serialize config
    SerializeError(toml::ser::Error),
    /// Failed to write config file
    WriteError(PathBuf, std::io::Error),
    /// Failed to create directory
    CreateDirError(PathBuf, std::io::Error),
    /// A value is out of range
    Invalid(frost_core::ConfigError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoHomeDirectory => write!(f, "Could not determine home directory"),
            ConfigError::ReadError(path, e) => write!(f, "Failed to read {:?}: {}", path, e),
            ConfigError::ParseError(path, e) => write!(f, "Failed to parse {:?}: {}", path, e),
            ConfigError::SerializeError(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::WriteError(path, e) => write!(f, "Failed to write {:?}: {}", path, e),
            ConfigError::CreateDirError(path, e) => write!(f, "Failed to create {:?}: {}", path, e),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
