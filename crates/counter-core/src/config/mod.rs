//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `COUNTER_CONFIG` env var
//! 3. **Environment variables**: `COUNTER_*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`ServerConfig`]: HTTP server settings (bind address, concurrency, CORS)
//! - [`CounterConfig`]: Quorum counter settings (witness table bound)
//! - [`ReportsConfig`]: Report persistence location and toggle
//! - [`MetricsConfig`]: Prometheus metrics endpoint
//! - [`LoggingConfig`]: Log level and format
//!
//! # Validation
//!
//! Configuration is validated at load time. Invalid configurations (e.g., a
//! zero witness bound, an unknown log format) return errors rather than
//! failing silently.
//!
//! # Example
//!
//! ```toml
//! [server]
//! bind_port = 3002
//! allowed_origins = ["https://jokes.example.com"]
//!
//! [counter]
//! max_witnesses = 3
//!
//! [reports]
//! directory = "reports/joke_counter"
//! ```

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// HTTP server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Must be greater than 0. Defaults to `3002`.
    pub bind_port: u16,

    /// Maximum number of concurrent requests the server can handle. Defaults to `100`.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Origins allowed by CORS. Empty means cross-origin browsers are not
    /// served. Defaults to empty.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_max_concurrent_requests() -> usize {
    100
}

/// Quorum counter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Maximum number of distinct witnesses tracked per process. Further
    /// identities are rejected. Must be greater than 0. Defaults to `3`.
    #[serde(default = "default_max_witnesses")]
    pub max_witnesses: usize,
}

fn default_max_witnesses() -> usize {
    3
}

/// Report persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Directory report files are appended under. Created on first write.
    /// Defaults to `reports/joke_counter`.
    #[serde(default = "default_reports_directory")]
    pub directory: PathBuf,

    /// Whether reports are written to disk. When disabled, rollups still run
    /// but records stay in memory. Defaults to `true`.
    #[serde(default = "default_reports_enabled")]
    pub enabled: bool,
}

fn default_reports_directory() -> PathBuf {
    PathBuf::from("reports/joke_counter")
}

fn default_reports_enabled() -> bool {
    true
}

/// Prometheus metrics collection and export configuration.
///
/// When enabled, metrics are exposed at `/metrics` on the main server port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether metrics collection is enabled. Defaults to `true`.
    pub enabled: bool,
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error"). Defaults to `"info"`.
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    pub format: String,
}

/// Root application configuration containing all subsystem settings.
///
/// This is the primary configuration structure loaded from TOML files and
/// environment variables. Configuration is loaded with the `COUNTER_` prefix
/// for environment overrides using `__` as a separator.
///
/// # Example
///
/// ```toml
/// environment = "production"
///
/// [server]
/// bind_port = 3002
/// max_concurrent_requests = 200
///
/// [counter]
/// max_witnesses = 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment (e.g., "development", "production"). Defaults to `"development"`.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Quorum counter configuration.
    #[serde(default)]
    pub counter: CounterConfig,

    /// Report persistence configuration.
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Prometheus metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 3002,
            max_concurrent_requests: 100,
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self { max_witnesses: 3 }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            directory: default_reports_directory(),
            enabled: true,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            counter: CounterConfig::default(),
            reports: ReportsConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `COUNTER__` prefix can override any configuration value.
    /// Use `__` as a separator for nested fields (e.g., `COUNTER__SERVER__BIND_PORT=8080`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("environment", "development")?
            .set_default("server.bind_address", "127.0.0.1")?
            .set_default("server.bind_port", 3002)?
            .set_default("server.max_concurrent_requests", 100)?
            .set_default("counter.max_witnesses", 3)?
            .set_default("reports.directory", "reports/joke_counter")?
            .set_default("reports.enabled", true)?
            .set_default("metrics.enabled", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("COUNTER").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml` with fallback to defaults.
    ///
    /// The config file path can be overridden using the `COUNTER_CONFIG` environment variable.
    /// Environment variable overrides are supported via the `COUNTER_` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("COUNTER_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// Combines `server.bind_address` and `server.bind_port` into a [`SocketAddr`].
    ///
    /// # Errors
    ///
    /// Returns an error string if the address cannot be parsed into a valid [`SocketAddr`].
    ///
    /// [`SocketAddr`]: std::net::SocketAddr
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
            .parse()
            .map_err(|_| {
                format!(
                    "Invalid socket address: {}:{}",
                    self.server.bind_address, self.server.bind_port
                )
            })
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// Checks include:
    /// - Witness bound and concurrency limits are greater than zero
    /// - A report directory is set when persistence is enabled
    /// - Logging format is either `"json"` or `"pretty"`
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.counter.max_witnesses == 0 {
            return Err("Witness bound must be greater than 0".to_string());
        }

        if self.server.max_concurrent_requests == 0 {
            return Err("Max concurrent requests must be greater than 0".to_string());
        }

        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        if self.reports.enabled && self.reports.directory.as_os_str().is_empty() {
            return Err("Report directory must be set when reports are enabled".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }

    /// Returns the maximum number of concurrent requests allowed.
    #[must_use]
    pub fn max_concurrent_requests(&self) -> usize {
        self.server.max_concurrent_requests
    }

    /// Returns the witness table bound.
    #[must_use]
    pub fn max_witnesses(&self) -> usize {
        self.counter.max_witnesses
    }

    /// Returns whether report persistence is enabled.
    #[must_use]
    pub fn reports_enabled(&self) -> bool {
        self.reports.enabled
    }

    /// Returns the report output directory.
    #[must_use]
    pub fn reports_directory(&self) -> &Path {
        &self.reports.directory
    }

    /// Returns whether metrics collection is enabled.
    #[must_use]
    pub fn metrics_enabled(&self) -> bool {
        self.metrics.enabled
    }
}
