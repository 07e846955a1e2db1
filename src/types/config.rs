//! Configuration for fmtd.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cache::CACHE_CAPACITY;
use crate::FmtdResult;

/// Main configuration for fmtd.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Project cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Formatting engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Project cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached projects.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    CACHE_CAPACITY
}

/// Formatting engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine command (resolved per project, with a PATH fallback).
    #[serde(default = "default_engine_command")]
    pub command: String,

    /// Extra arguments prepended to every engine invocation.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: default_engine_command(),
            args: Vec::new(),
        }
    }
}

fn default_engine_command() -> String {
    "prettier".to_string()
}

impl EngineConfig {
    /// Short tool name derived from the command (basename, no extension).
    pub fn tool_name(&self) -> String {
        Path::new(&self.command)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.command.clone())
    }

    /// Name of the ignore file expected at the project root.
    pub fn ignore_file_name(&self) -> String {
        format!(".{}ignore", self.tool_name())
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> FmtdResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads configuration from a file, falling back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|_| Self::default_config())
        } else {
            Self::default_config()
        }
    }

    /// Creates the default configuration.
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Saves configuration to a TOML file.
    pub fn save(&self, path: &Path) -> FmtdResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default configuration file location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("fmtd").join("fmtd.toml"))
            .unwrap_or_else(|| PathBuf::from("fmtd.toml"))
    }
}
