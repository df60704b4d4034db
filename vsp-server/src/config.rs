//! vsp-server configuration
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments / environment variables ([`ConfigOverrides`])
//! 2. TOML bootstrap file ([`TomlConfig`])
//! 3. Built-in defaults
//!
//! Nothing is persisted; every setting is fixed for the life of the process.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use vsp_common::config::{LoggingConfig, TomlConfig};

use crate::error::{Error, Result};
use crate::playback::ControllerConfig;

/// Values supplied on the command line (each overrides the TOML file)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub bind_addr: Option<String>,
    pub service_name: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub service_name: String,
    pub bind_addr: String,
    pub port: u16,
    pub resync_interval: Duration,
    pub advance_decrement: Duration,
    pub event_capacity: usize,
    pub sse_keepalive_secs: u64,
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Merge command-line overrides over the TOML values and validate
    pub fn resolve(overrides: ConfigOverrides, toml: TomlConfig) -> Result<Self> {
        let mut logging = toml.logging;
        if let Some(level) = overrides.log_level {
            logging.level = level;
        }

        let config = Self {
            service_name: overrides.service_name.unwrap_or(toml.service_name),
            bind_addr: overrides.bind_addr.unwrap_or(toml.bind_addr),
            port: overrides.port.unwrap_or(toml.port),
            resync_interval: Duration::from_millis(toml.resync_interval_ms),
            advance_decrement: Duration::from_millis(toml.advance_decrement_ms),
            event_capacity: toml.event_capacity,
            sse_keepalive_secs: toml.sse_keepalive_secs,
            logging,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.service_name.is_empty() {
            return Err(Error::Config("service_name must not be empty".to_string()));
        }
        if self.service_name.contains('/') {
            return Err(Error::Config(format!(
                "service_name '{}' must not contain '/'",
                self.service_name
            )));
        }
        if self.resync_interval.is_zero() {
            return Err(Error::Config("resync_interval_ms must be greater than 0".to_string()));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be greater than 0".to_string()));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind_addr
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", self.bind_addr, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Settings for the playlist controller
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            service_name: self.service_name.clone(),
            resync_interval: self.resync_interval,
            advance_decrement: self.advance_decrement,
            event_capacity: self.event_capacity,
        }
    }
}
