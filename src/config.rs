//! Configuration loading and constants.
//!
//! Loads application configuration from TOML files and defines constants for
//! the lookup endpoint, metric naming, logging format, and default paths.
//! `AppConfig` is the root configuration struct containing all settings.

use const_format::formatcp;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

use crate::metrics::is_valid_metric_name;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================
// Lookups are randomised per attempt, so nothing from the endpoint may be
// reused by an upstream cache.

pub const CACHE_CONTROL_LOOKUP: &str = "no-store";

/// Health check responses - short TTL so load balancers see restarts quickly
pub const HTTP_CACHE_HEALTH_MAX_AGE: u32 = 5;

pub const CACHE_CONTROL_HEALTH: &str =
    formatcp!("public, max-age={}", HTTP_CACHE_HEALTH_MAX_AGE);

// =============================================================================
// Lookup Constants
// =============================================================================

/// Percentage of lookups that succeed when not configured
pub const DEFAULT_SUCCESS_RATE: u8 = 50;

/// Upper bound (exclusive) of the uniform draw used for failure injection
pub const SUCCESS_ROLL_RANGE: u8 = 100;

/// Largest batch a single request may ask for
pub const DEFAULT_MAX_COUNT: i64 = 1000;

/// Name prefix used for every simulated external entity
pub const ENTITY_NAME_PREFIX: &str = "External Entity";

/// Separator between rendered entries in the response body
pub const ENTRY_SEPARATOR: &str = "; ";

// =============================================================================
// Metrics Constants
// =============================================================================

/// Default counter name, suffixed with `.success` / `.fail`
pub const DEFAULT_METRIC_NAME: &str = "external_service";

pub const METRIC_SUCCESS_SUFFIX: &str = "success";
pub const METRIC_FAIL_SUFFIX: &str = "fail";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "entity_gateway=debug,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// Simulated external lookup behaviour
    #[serde(default)]
    pub lookup: LookupConfig,
    /// Success/failure counters
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl HttpServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Validation(format!("Invalid http.host or http.port: {}", e)))
    }
}

/// What a batch does when one id cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Drop the failed id and keep going; the response holds a partial result
    #[default]
    Skip,
    /// Stop at the first failure and surface it to the caller
    Propagate,
}

/// How each resolved entry is rendered in the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryFormat {
    /// `<id>: <name>`
    #[default]
    IdPrefixed,
    /// `<name>`
    Name,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Percentage (0-100) of lookups that succeed (default: 50)
    #[serde(default = "LookupConfig::default_success_rate")]
    pub success_rate: u8,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub entry_format: EntryFormat,
    /// Maximum `count` accepted per request (default: 1000)
    #[serde(default = "LookupConfig::default_max_count")]
    pub max_count: i64,
    /// Fixed RNG seed for reproducible failure sequences
    pub seed: Option<u64>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            success_rate: Self::default_success_rate(),
            failure_policy: FailurePolicy::default(),
            entry_format: EntryFormat::default(),
            max_count: Self::default_max_count(),
            seed: None,
        }
    }
}

impl LookupConfig {
    fn default_success_rate() -> u8 {
        DEFAULT_SUCCESS_RATE
    }

    fn default_max_count() -> i64 {
        DEFAULT_MAX_COUNT
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Emit success/fail counters for each lookup attempt (default: true)
    #[serde(default = "MetricsConfig::default_enabled")]
    pub enabled: bool,
    /// Base counter name (default: "external_service")
    #[serde(default = "MetricsConfig::default_metric_name")]
    pub metric_name: String,
    /// Statsd UDP address. Counters go to the log when unset.
    pub statsd_addr: Option<String>,
    /// Prefix joined to every metric with a `.`, e.g. "myapp"
    #[serde(default)]
    pub prefix: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            metric_name: Self::default_metric_name(),
            statsd_addr: None,
            prefix: String::new(),
        }
    }
}

impl MetricsConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_metric_name() -> String {
        DEFAULT_METRIC_NAME.to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.lookup.success_rate > SUCCESS_ROLL_RANGE {
            return Err(ConfigError::Validation(format!(
                "lookup.success_rate must be between 0 and {}, got {}",
                SUCCESS_ROLL_RANGE, self.lookup.success_rate
            )));
        }

        if self.lookup.max_count < 1 {
            return Err(ConfigError::Validation(format!(
                "lookup.max_count must be at least 1, got {}",
                self.lookup.max_count
            )));
        }

        if self.metrics.enabled {
            if !is_valid_metric_name(&self.metrics.metric_name) {
                return Err(ConfigError::Validation(format!(
                    "metrics.metric_name \"{}\" must be dot-separated segments of [A-Za-z0-9_-]",
                    self.metrics.metric_name
                )));
            }
            let prefix = self.metrics.prefix.trim_end_matches('.');
            if !prefix.is_empty() && !is_valid_metric_name(prefix) {
                return Err(ConfigError::Validation(format!(
                    "metrics.prefix \"{}\" must be dot-separated segments of [A-Za-z0-9_-]",
                    self.metrics.prefix
                )));
            }
        }

        match self.logging.format.to_ascii_lowercase().as_str() {
            "text" | "json" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "logging.format must be \"text\" or \"json\", got \"{}\"",
                    other
                )))
            }
        }

        self.http.socket_addr()?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
