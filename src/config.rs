use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::retry::ReconnectPolicy;

pub const DEFAULT_HOST: &str = "192.168.0.27";
pub const DEFAULT_PORT: u16 = 8765;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("rover host must not be empty")]
    EmptyHost,
    #[error("rover port must be between 1 and 65535")]
    InvalidPort,
    #[error("reconnect delay must be greater than zero")]
    ZeroReconnectDelay,
    #[error("connect timeout must be greater than zero")]
    ZeroConnectTimeout,
}

/// The rover's control-channel address. Fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ConfigError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(Self { host, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// WebSocket URL of the control channel.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rover: RoverConfig,
    pub link: LinkConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoverConfig {
    /// Rover hostname or IP address
    pub host: String,
    /// Rover control-channel port
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Seconds to wait after a failed or dropped connection
    pub reconnect_delay_secs: u64,
    /// Seconds allowed for a single connect attempt
    pub connect_timeout_secs: u64,
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        let policy = ReconnectPolicy::default();
        Self {
            reconnect_delay_secs: policy.delay.as_secs(),
            connect_timeout_secs: policy.connect_timeout.as_secs(),
        }
    }
}

impl Config {
    /// `~/.roverlink/config.toml`
    pub fn default_path() -> PathBuf {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home_dir.join(".roverlink").join("config.toml")
    }

    /// Load configuration from file. A missing file yields the defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(Self::default_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file, creating parent directories as needed.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = self.to_toml()?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(config_path)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;
        if self.link.reconnect_delay_secs == 0 {
            return Err(ConfigError::ZeroReconnectDelay);
        }
        if self.link.connect_timeout_secs == 0 {
            return Err(ConfigError::ZeroConnectTimeout);
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        Endpoint::new(self.rover.host.clone(), self.rover.port)
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::fixed(Duration::from_secs(self.link.reconnect_delay_secs))
            .with_connect_timeout(Duration::from_secs(self.link.connect_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_rover_access_point() {
        let config = Config::default();
        assert_eq!(config.rover.host, "192.168.0.27");
        assert_eq!(config.rover.port, 8765);
        assert_eq!(config.link.reconnect_delay_secs, 5);
        assert_eq!(config.endpoint().unwrap().url(), "ws://192.168.0.27:8765");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.rover.host = "rover.local".into();
        config.rover.port = 9000;
        config.link.reconnect_delay_secs = 2;
        let written = config.save(Some(&path)).unwrap();
        assert_eq!(written, path);

        let loaded = Config::load(Some(path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rover]\nhost = \"10.0.0.5\"\n").unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.rover.host, "10.0.0.5");
        assert_eq!(config.rover.port, DEFAULT_PORT);
        assert_eq!(config.link, LinkConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rover\nhost = ").unwrap();
        assert!(Config::load(Some(path)).is_err());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = Config::default();
        config.rover.port = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPort));

        let mut config = Config::default();
        config.rover.host = "   ".into();
        assert_eq!(config.validate(), Err(ConfigError::EmptyHost));

        let mut config = Config::default();
        config.link.reconnect_delay_secs = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroReconnectDelay));
    }

    #[test]
    fn policy_follows_link_settings() {
        let mut config = Config::default();
        config.link.reconnect_delay_secs = 3;
        config.link.connect_timeout_secs = 7;
        let policy = config.reconnect_policy();
        assert_eq!(policy.delay, Duration::from_secs(3));
        assert_eq!(policy.connect_timeout, Duration::from_secs(7));
    }
}
