//! Host process configuration
//!
//! Loads configuration from environment variables. These are the process-level
//! settings; the voting configuration is adjusted at runtime through the
//! session controller, not here.

use std::env;
use std::time::Duration;

/// Full host process configuration
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub server: ServerConfig,
    pub party: PartyConfig,
}

/// Bind address for the peer endpoint
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Admission and identity settings for the hosted session
#[derive(Debug, Clone)]
pub struct PartyConfig {
    /// Name shown to guests in snapshots
    pub host_name: String,
    /// Maximum admissible distance between host and guest, in meters
    pub proximity_radius_m: f64,
    /// How long admission waits for a host location fix
    pub location_wait: Duration,
    /// Bounded retry budget for delivering a join decision
    pub decision_retry_attempts: u32,
    /// Base delay for decision delivery backoff
    pub decision_retry_base: Duration,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7650
}

fn default_host_name() -> String {
    "Party Host".to_string()
}

fn default_proximity_radius_m() -> f64 {
    65.0
}

fn default_location_wait_secs() -> u64 {
    6
}

fn default_decision_retry_attempts() -> u32 {
    8
}

fn default_decision_retry_base_ms() -> u64 {
    250
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            host_name: default_host_name(),
            proximity_radius_m: default_proximity_radius_m(),
            location_wait: Duration::from_secs(default_location_wait_secs()),
            decision_retry_attempts: default_decision_retry_attempts(),
            decision_retry_base: Duration::from_millis(default_decision_retry_base_ms()),
        }
    }
}

impl HostConfig {
    /// Load configuration from environment variables
    ///
    /// Every variable has a sensible default; `from_env` only fails on a
    /// value that is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            server: ServerConfig {
                host: env::var("PARTY_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("PARTY_PORT")?.unwrap_or_else(default_port),
            },
            party: PartyConfig {
                host_name: env::var("PARTY_HOST_NAME").unwrap_or_else(|_| default_host_name()),
                proximity_radius_m: parse_var("PARTY_PROXIMITY_RADIUS_M")?
                    .unwrap_or_else(default_proximity_radius_m),
                location_wait: Duration::from_secs(
                    parse_var("PARTY_LOCATION_WAIT_SECS")?
                        .unwrap_or_else(default_location_wait_secs),
                ),
                decision_retry_attempts: parse_var("PARTY_DECISION_RETRY_ATTEMPTS")?
                    .unwrap_or_else(default_decision_retry_attempts),
                decision_retry_base: Duration::from_millis(
                    parse_var("PARTY_DECISION_RETRY_BASE_MS")?
                        .unwrap_or_else(default_decision_retry_base_ms),
                ),
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
