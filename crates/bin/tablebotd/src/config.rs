//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `tablebot.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.
//!
//! Credentials are not part of the configuration: they are read from the
//! environment for every request.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tablebot_adapter_bridge::BridgeConfig;
use tablebot_domain::plan::{Pacing, SiteProfile};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which automation backend serves requests, and against which site.
    pub automation: AutomationConfig,
    /// Driver process settings, used by the `bridge` backend.
    pub bridge: BridgeConfig,
    /// Pauses between steps.
    pub pacing: PacingConfig,
    /// Request queue settings.
    pub dispatcher: DispatcherConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Automation backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// External driver process.
    #[default]
    Bridge,
    /// Simulated sessions, nothing leaves the process.
    Virtual,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bridge" => Ok(Self::Bridge),
            "virtual" => Ok(Self::Virtual),
            other => Err(ConfigError::Validation(format!(
                "unknown automation backend {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    pub backend: Backend,
    /// Entry page of the reservation site.
    pub site_url: String,
    /// Site name used in failure messages.
    pub site_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause after opening a picker, in milliseconds.
    pub settle_ms: u64,
    /// Pause after a page load, in milliseconds.
    pub page_load_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Lines read ahead of the request being served.
    pub queue_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `tablebot.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("tablebot.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("TABLEBOT_BACKEND") {
            self.automation.backend = val.parse()?;
        }
        if let Some(val) = lookup("TABLEBOT_SITE_URL") {
            self.automation.site_url = val;
        }
        if let Some(val) = lookup("TABLEBOT_BRIDGE_COMMAND") {
            self.bridge.command = val;
        }
        if let Some(val) = lookup("TABLEBOT_QUEUE_CAPACITY") {
            self.dispatcher.queue_capacity = val.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("queue capacity {val:?} is not a number"))
            })?;
        }
        if let Some(val) = lookup("TABLEBOT_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatcher.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "queue capacity must be non-zero".to_string(),
            ));
        }
        if self.automation.site_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site url must not be empty".to_string(),
            ));
        }
        if self.automation.backend == Backend::Bridge && self.bridge.command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "bridge command must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn site_profile(&self) -> SiteProfile {
        SiteProfile {
            url: self.automation.site_url.clone(),
            name: self.automation.site_name.clone(),
        }
    }

    #[must_use]
    pub fn pacing(&self) -> Pacing {
        Pacing {
            settle: Duration::from_millis(self.pacing.settle_ms),
            page_load: Duration::from_millis(self.pacing.page_load_ms),
        }
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        let site = SiteProfile::default();
        Self {
            backend: Backend::default(),
            site_url: site.url,
            site_name: site.name,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 500,
            page_load_ms: 2000,
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { queue_capacity: 32 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "tablebotd=info,tablebot=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
