use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Search backend configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Subject lookup limits
    #[serde(default)]
    #[validate(nested)]
    pub subjects: SubjectsConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: SUBJECTS__)
            .add_source(
                config::Environment::with_prefix("SUBJECTS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Limits applied to subject lookups
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_limits"))]
pub struct SubjectsConfig {
    /// Works returned when no limit is given
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Largest accepted limit
    #[serde(default = "default_max_limit")]
    #[validate(range(min = 1))]
    pub max_limit: usize,

    /// Per-facet value cap in details mode
    #[serde(default = "default_facet_limit")]
    #[validate(range(min = 1))]
    pub facet_limit: usize,

    /// Minimum count for a facet value
    #[serde(default = "default_facet_min_count")]
    pub facet_min_count: u64,

    /// Bound on one search call (seconds)
    #[serde(default = "default_search_timeout")]
    #[validate(range(min = 1))]
    pub search_timeout_secs: u64,
}

impl Default for SubjectsConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            facet_limit: default_facet_limit(),
            facet_min_count: default_facet_min_count(),
            search_timeout_secs: default_search_timeout(),
        }
    }
}

fn validate_limits(config: &SubjectsConfig) -> Result<(), ValidationError> {
    if config.default_limit > config.max_limit {
        return Err(ValidationError::new("default_limit_exceeds_max_limit"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

// Default value functions

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_limit() -> usize {
    crate::subjects::DEFAULT_LIMIT
}

fn default_max_limit() -> usize {
    crate::subjects::MAX_LIMIT
}

fn default_facet_limit() -> usize {
    crate::subjects::DEFAULT_FACET_LIMIT
}

fn default_facet_min_count() -> u64 {
    crate::subjects::DEFAULT_FACET_MIN_COUNT
}

fn default_search_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "subject-engine".to_string()
}

fn default_true() -> bool {
    true
}
