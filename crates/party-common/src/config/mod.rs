//! Configuration loading

mod host_config;

pub use host_config::{ConfigError, HostConfig, PartyConfig, ServerConfig};
