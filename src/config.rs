//! Configuration management for the simulator
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Workload generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of identities to create
    pub identities: u64,
    /// Simulated window length in months (timeline strategy)
    pub months: u32,
    /// Daily-active identities at the start of the window
    pub initial_daily_active: u64,
    /// Daily-active identities at the end of the window
    pub final_daily_active: u64,
    /// Base casts per identity (fixed strategy)
    pub casts_per_identity: u32,
    /// Reply rounds (fixed strategy)
    pub reply_rounds: u32,
    /// Replies attached per selected cast (fixed strategy)
    pub replies_per_cast: u32,
    /// Upper bound on replies per cast before age decay (timeline strategy)
    pub max_replies_per_cast: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            identities: 25_000,
            months: 6,
            initial_daily_active: 50,
            final_daily_active: 5_000,
            casts_per_identity: 3,
            reply_rounds: 3,
            replies_per_cast: 2,
            max_replies_per_cast: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logging format: "json" or "text"
    pub format: String,
    /// Default log level if no RUST_LOG is set
    pub default_level: String,
    /// Custom filter for dependency logs
    pub dependency_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            default_level: "info".to_string(),
            dependency_filter: Some("tokio_util=warn,mio=warn".to_string()),
        }
    }
}

/// StatsD configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsdConfig {
    pub prefix: String,
    pub addr: String,
    pub use_tags: bool,
    pub enabled: bool,
}

impl Default for StatsdConfig {
    fn default() -> Self {
        Self {
            prefix: "hubsim".to_string(),
            addr: "127.0.0.1:8125".to_string(),
            use_tags: false,
            enabled: false,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub logging: LoggingConfig,
    pub statsd: StatsdConfig,
}

impl Config {
    /// Load configuration from environment variables and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv().ok();

        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("HUBSIM_").split("__"));

        // Optionally load from config file if HUBSIM_CONFIG is set. Plain
        // std::env here: env vars are how we find the config file at all.
        if let Some(config_path) = std::env::var_os("HUBSIM_CONFIG") {
            if let Some(path_str) = config_path.to_str() {
                let path = Path::new(path_str);
                if path.exists() {
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        figment.extract().map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator.final_daily_active < self.generator.initial_daily_active {
            return Err(ConfigError::InvalidValue(
                "final_daily_active must be >= initial_daily_active".to_string(),
            ));
        }

        if self.generator.identities > 0
            && self.generator.final_daily_active > self.generator.identities
        {
            return Err(ConfigError::InvalidValue(
                "final_daily_active cannot exceed the identity count".to_string(),
            ));
        }

        Ok(())
    }
}
