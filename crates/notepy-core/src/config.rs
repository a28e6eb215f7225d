//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (`<resource dir>/config.toml`, or `NOTEPY_CONFIG`)
//! 3. Environment variables (NOTEPY_* prefix)
//!
//! Environment variables take precedence over config file values. The result
//! is validated once, at load time.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix
const ENV_PREFIX: &str = "NOTEPY";

/// Log levels accepted in `[logging] level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Note size limits enforced by the store
    #[serde(default)]
    pub notes: NoteLimits,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[server]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// Serve HTTPS when certificate material is present
    #[serde(default = "default_true")]
    pub ssl_enabled: bool,

    /// Largest accepted request body, in bytes
    #[serde(default = "default_max_body_bytes", alias = "file_upload_size_limit")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ssl_enabled: true,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// `[notes]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteLimits {
    /// Maximum title length, in characters
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,

    /// Maximum content length, in characters
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Maximum number of tags on one note
    #[serde(default = "default_max_tags", alias = "allowed_tags")]
    pub max_tags: usize,
}

impl Default for NoteLimits {
    fn default() -> Self {
        Self {
            max_title_length: default_max_title_length(),
            max_content_length: default_max_content_length(),
            max_tags: default_max_tags(),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write daily-rotated log files under `<resource dir>/logs`
    #[serde(default)]
    pub log_to_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_to_file: false,
        }
    }
}

impl Config {
    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            tracing::debug!(path = %path.display(), "config file missing, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // NOTEPY_HOST
        if let Ok(val) = std::env::var(format!("{}_HOST", ENV_PREFIX)) {
            if !val.is_empty() {
                self.server.host = val;
            }
        }

        // NOTEPY_PORT; unparseable values are ignored
        if let Ok(val) = std::env::var(format!("{}_PORT", ENV_PREFIX)) {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid NOTEPY_PORT"),
            }
        }

        // NOTEPY_LOG_LEVEL
        if let Ok(val) = std::env::var(format!("{}_LOG_LEVEL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.logging.level = val.to_lowercase();
            }
        }
    }

    /// Check every value once; the rest of the program trusts them
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            bail!("server.host must not be empty");
        }
        if self.server.port == 0 {
            bail!("server.port must be between 1 and 65535");
        }
        if self.server.max_body_bytes == 0 {
            bail!("server.max_body_bytes must be greater than zero");
        }
        if self.notes.max_title_length == 0 {
            bail!("notes.max_title_length must be greater than zero");
        }
        if self.notes.max_content_length == 0 {
            bail!("notes.max_content_length must be greater than zero");
        }
        if self.notes.max_tags == 0 {
            bail!("notes.max_tags must be greater than zero");
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            bail!(
                "logging.level '{}' is not one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            );
        }
        Ok(())
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        tracing::info!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8443
}

fn default_true() -> bool {
    true
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_title_length() -> usize {
    200
}

fn default_max_content_length() -> usize {
    100_000
}

fn default_max_tags() -> usize {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}
