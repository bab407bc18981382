use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::core::AgeBandPolicy;
use crate::models::PagingPolicy;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub age_band: AgeBandSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_average_age_ttl_secs")]
    pub average_age_ttl_secs: u64,
    #[serde(default = "default_average_age_capacity")]
    pub average_age_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            average_age_ttl_secs: default_average_age_ttl_secs(),
            average_age_capacity: default_average_age_capacity(),
        }
    }
}

fn default_average_age_ttl_secs() -> u64 { 300 }
fn default_average_age_capacity() -> u64 { 10_000 }

/// Pagination tunables for the ranking endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default = "default_overfetch_multiplier")]
    pub overfetch_multiplier: u32,
    #[serde(default = "default_max_round_trips")]
    pub max_round_trips: u32,
    #[serde(default)]
    pub scan_budget_ms: Option<u64>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            overfetch_multiplier: default_overfetch_multiplier(),
            max_round_trips: default_max_round_trips(),
            scan_budget_ms: None,
        }
    }
}

impl DiscoverySettings {
    pub fn paging_policy(&self) -> PagingPolicy {
        PagingPolicy {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            overfetch_multiplier: self.overfetch_multiplier,
            max_round_trips: self.max_round_trips,
            scan_budget: self.scan_budget_ms.map(Duration::from_millis),
        }
    }
}

fn default_page_size() -> u32 { 25 }
fn default_max_page_size() -> u32 { 100 }
fn default_overfetch_multiplier() -> u32 { 2 }
fn default_max_round_trips() -> u32 { 10 }

/// Age band derivation constants
#[derive(Debug, Clone, Deserialize)]
pub struct AgeBandSettings {
    #[serde(default = "default_min_age_floor")]
    pub min_age_floor: i32,
    #[serde(default = "default_max_age_ceiling")]
    pub max_age_ceiling: i32,
    #[serde(default = "default_spread_multiplier")]
    pub spread_multiplier: f64,
    /// Used for events posted without a group, or for groups with no known ages
    #[serde(default = "default_average_age")]
    pub default_average_age: f64,
}

impl Default for AgeBandSettings {
    fn default() -> Self {
        Self {
            min_age_floor: default_min_age_floor(),
            max_age_ceiling: default_max_age_ceiling(),
            spread_multiplier: default_spread_multiplier(),
            default_average_age: default_average_age(),
        }
    }
}

impl AgeBandSettings {
    pub fn policy(&self) -> AgeBandPolicy {
        AgeBandPolicy::new(self.min_age_floor, self.max_age_ceiling, self.spread_multiplier)
    }
}

fn default_min_age_floor() -> i32 { 13 }
fn default_max_age_ceiling() -> i32 { 100 }
fn default_spread_multiplier() -> f64 { 4.0 }
fn default_average_age() -> f64 { 25.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LUME_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LUME__DISCOVERY__MAX_ROUND_TRIPS -> discovery.max_round_trips
            .add_source(
                Environment::with_prefix("LUME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_database_url(settings)?;

        settings.try_deserialize()
    }
}

/// `DATABASE_URL` wins over any configured `database.url`
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}
