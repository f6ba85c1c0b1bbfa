//! Configuration management for the Document Control server.
//!
//! This module provides TOML-based configuration file loading and saving.
//! The default configuration path is `~/.config/doccontrol/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("port must be greater than 0")]
    InvalidPort,

    #[error("host must not be empty")]
    EmptyHost,

    #[error("root must not be empty")]
    EmptyRoot,

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Listener and document root.
    pub server: ServerConfig,

    /// Logging output.
    pub logging: LoggingConfig,
}

/// Listener and document root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Directory exposed to clients.
    pub root: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    pub level: String,

    /// Directory for a plain-text log file in addition to stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            root: PathBuf::from("Documents"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Outcome of one environment variable in [`Config::apply_env_overrides`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvOverride {
    /// The value replaced the configured one.
    Applied { var: &'static str, value: String },
    /// The value could not be parsed and was ignored.
    Rejected {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl EnvOverride {
    fn applied(var: &'static str, value: String) -> Self {
        EnvOverride::Applied { var, value }
    }

    /// Report the outcome through the installed subscriber.
    pub fn log(&self) {
        match self {
            EnvOverride::Applied { var, value } => {
                tracing::info!("Overriding configuration from {}: {}", var, value);
            }
            EnvOverride::Rejected { var, value, reason } => {
                tracing::warn!("Ignoring invalid {} {:?}: {}", var, value, reason);
            }
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("doccontrol")
        .join("config.toml")
}

impl ServerConfig {
    /// `host:port` string for binding.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - DOCCONTROL_ROOT: Override the document root
    /// - DOCCONTROL_HOST: Override the bind address
    /// - DOCCONTROL_PORT: Override the port
    /// - DOCCONTROL_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    ///
    /// This runs before the subscriber exists, so the outcome of each
    /// variable is returned for the caller to log with [`EnvOverride::log`].
    pub fn apply_env_overrides(&mut self) -> Vec<EnvOverride> {
        let mut overrides = Vec::new();

        if let Some(root) = non_empty_var("DOCCONTROL_ROOT") {
            self.server.root = PathBuf::from(&root);
            overrides.push(EnvOverride::applied("DOCCONTROL_ROOT", root));
        }

        if let Some(host) = non_empty_var("DOCCONTROL_HOST") {
            self.server.host = host.clone();
            overrides.push(EnvOverride::applied("DOCCONTROL_HOST", host));
        }

        if let Some(port) = non_empty_var("DOCCONTROL_PORT") {
            match port.parse::<u16>() {
                Ok(parsed) => {
                    self.server.port = parsed;
                    overrides.push(EnvOverride::applied("DOCCONTROL_PORT", port));
                }
                Err(e) => overrides.push(EnvOverride::Rejected {
                    var: "DOCCONTROL_PORT",
                    value: port,
                    reason: e.to_string(),
                }),
            }
        }

        if let Some(level) = non_empty_var("DOCCONTROL_LOG_LEVEL") {
            self.logging.level = level.clone();
            overrides.push(EnvOverride::applied("DOCCONTROL_LOG_LEVEL", level));
        }

        overrides
    }

    /// Validate the configuration values.
    ///
    /// Whether the root exists is checked when the server opens it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        if self.server.root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyRoot);
        }

        let level = self.logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }

        Ok(())
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    /// If the file exists but is invalid TOML, returns an error with
    /// a helpful message.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Save configuration to a file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}
