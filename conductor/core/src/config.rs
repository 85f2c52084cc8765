//! Configuration
//!
//! Centralized configuration loading for the Conductor, with an optional TOML
//! file at `$XDG_CONFIG_HOME/datachat/conductor.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [service]
//! api_url = "http://localhost:3001"
//! project_id = "3f1c9a2e"
//! request_timeout_secs = 60
//!
//! [display]
//! progress_interval_ms = 800
//! table_row_limit = 100
//! chart_row_limit = 20
//! preview_limit = 10
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default analysis service location
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the effective configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[service]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceToml {
    /// Analysis service base URL
    pub api_url: Option<String>,
    /// Project to ask questions against
    pub project_id: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// `[display]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Progress stage interval in milliseconds
    pub progress_interval_ms: Option<u64>,
    /// Rows shown in the table tab
    pub table_row_limit: Option<usize>,
    /// Rows fed to charts
    pub chart_row_limit: Option<usize>,
    /// Rows fetched by `/preview`
    pub preview_limit: Option<usize>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductorToml {
    /// Service section
    pub service: ServiceToml,
    /// Display section
    pub display: DisplayToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Conductor configuration
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// Analysis service base URL
    pub api_url: String,
    /// Project to ask questions against
    pub project_id: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Time between progress stage advances
    pub progress_interval: Duration,
    /// Rows shown in the table tab
    pub table_row_limit: usize,
    /// Rows fed to charts
    pub chart_row_limit: usize,
    /// Rows fetched when previewing a table
    pub preview_limit: usize,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            project_id: None,
            request_timeout: Duration::from_secs(120),
            progress_interval: Duration::from_millis(800),
            table_row_limit: 100,
            chart_row_limit: 20,
            preview_limit: 10,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ConductorConfig {
    /// Defaults plus environment variables, no file
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        apply_env_config(&mut config, |key| std::env::var(key).ok());
        config
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// The project ID, or an error telling the user how to set one
    pub fn require_project(&self) -> Result<&str, ConfigError> {
        match self.project_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ConfigError::ValidationError(
                "no project selected (use --project or DATACHAT_PROJECT)".to_string(),
            )),
        }
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "api_url must start with http:// or https://, got {}",
                self.api_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        if self.progress_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "progress_interval must be greater than zero".to_string(),
            ));
        }
        for (name, value) in [
            ("table_row_limit", self.table_row_limit),
            ("chart_row_limit", self.chart_row_limit),
            ("preview_limit", self.preview_limit),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/datachat/conductor.toml` or
/// `~/.config/datachat/conductor.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("datachat").join("conductor.toml"))
}

/// Load configuration from the default file, then the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<ConductorConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ConductorConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ConductorConfig, ConfigError> {
    let mut config = ConductorConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ConductorToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ConductorConfig, toml: &ConductorToml) {
    if let Some(ref url) = toml.service.api_url {
        config.api_url = url.clone();
    }
    if toml.service.project_id.is_some() {
        config.project_id = toml.service.project_id.clone();
    }
    if let Some(secs) = toml.service.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }

    if let Some(ms) = toml.display.progress_interval_ms {
        config.progress_interval = Duration::from_millis(ms);
    }
    if let Some(limit) = toml.display.table_row_limit {
        config.table_row_limit = limit;
    }
    if let Some(limit) = toml.display.chart_row_limit {
        config.chart_row_limit = limit;
    }
    if let Some(limit) = toml.display.preview_limit {
        config.preview_limit = limit;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut ConductorConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(url) = env("DATACHAT_API_URL") {
        config.api_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(project) = env("DATACHAT_PROJECT") {
        config.project_id = Some(project);
        config.source = ConfigSource::Env;
    }
    if let Some(secs) = env("DATACHAT_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.request_timeout = Duration::from_secs(secs);
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = env("DATACHAT_PROGRESS_INTERVAL_MS").and_then(|v| v.parse().ok()) {
        config.progress_interval = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Service URL override
    pub api_url: Option<String>,
    /// Project override
    pub project_id: Option<String>,
    /// Request timeout override (seconds)
    pub request_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set service URL override
    #[must_use]
    pub fn with_api_url(mut self, url: String) -> Self {
        self.api_url = Some(url);
        self
    }

    /// Set project override
    #[must_use]
    pub fn with_project_id(mut self, project: String) -> Self {
        self.project_id = Some(project);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ConductorConfig) {
        if self.api_url.is_some()
            || self.project_id.is_some()
            || self.request_timeout_secs.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.api_url {
            config.api_url = url.clone();
        }
        if let Some(ref project) = self.project_id {
            config.project_id = Some(project.clone());
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
