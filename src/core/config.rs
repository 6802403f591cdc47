//! Configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::state::ModeSelection;

/// `warp-cli` invocation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarpCliConfig {
    /// Path to the warp-cli binary
    #[serde(default = "default_cli_path")]
    pub cli_path: String,
    /// Hard timeout for a single subprocess invocation in milliseconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_ms: u64,
    /// Fixed delay between connect attempts in milliseconds (no backoff)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Total connect attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_connect_attempts: u32,
    /// Operating mode applied at startup
    #[serde(default)]
    pub startup_mode: ModeSelection,
}

fn default_cli_path() -> String {
    "warp-cli".to_string()
}
fn default_command_timeout() -> u64 {
    5000
}
fn default_retry_delay() -> u64 {
    2000
}
fn default_max_attempts() -> u32 {
    6
}

impl Default for WarpCliConfig {
    fn default() -> Self {
        Self {
            cli_path: default_cli_path(),
            command_timeout_ms: default_command_timeout(),
            retry_delay_ms: default_retry_delay(),
            max_connect_attempts: default_max_attempts(),
            startup_mode: ModeSelection::default(),
        }
    }
}

impl WarpCliConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// warp-cli invocation configuration
    #[serde(default)]
    pub warp: WarpCliConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            // Return default config if file doesn't exist
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Create parent directories if needed
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory (key store, append-only log)
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "warpdeck", "WarpDeck")
            .context("Failed to determine config directory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.warp.cli_path, "warp-cli");
        assert_eq!(config.warp.command_timeout(), Duration::from_secs(5));
        assert_eq!(config.warp.retry_delay(), Duration::from_secs(2));
        assert_eq!(config.warp.max_connect_attempts, 6);
        assert_eq!(config.warp.startup_mode, ModeSelection::Warp1111);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.warp.cli_path, config.warp.cli_path);
        assert_eq!(parsed.warp.startup_mode, config.warp.startup_mode);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[warp]\ncli_path = \"/opt/warp/warp-cli\"\n").unwrap();
        assert_eq!(parsed.warp.cli_path, "/opt/warp/warp-cli");
        assert_eq!(parsed.warp.max_connect_attempts, 6);
    }
}
