//! Bootstrap configuration loading and config file resolution
//!
//! Priority order for locating the TOML file:
//! 1. Explicit path (command-line `--config` / `VSP_CONFIG`)
//! 2. User config directory (`<config_dir>/vsp/config.toml`)
//! 3. System config (`/etc/vsp/config.toml`, Linux only)
//!
//! A missing file is never fatal: callers get [`TomlConfig::default()`] and a
//! warning. A file that exists but does not parse is a configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name used for platform config directories
const CONFIG_DIR_NAME: &str = "vsp";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change while running.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Service name; prefixes every route (`/<service_name>/video`) and
    /// notification names (`<service_name>-SET_CONFIG`)
    pub service_name: String,

    /// Address to bind the HTTP server to
    pub bind_addr: String,

    /// HTTP server port
    pub port: u16,

    /// Period of the CURRENT_VIDEO resync broadcast
    pub resync_interval_ms: u64,

    /// Subtracted from each NEXT timeout hint so rapid advances converge to zero delay
    pub advance_decrement_ms: u64,

    /// Outbound notification buffer per subscriber
    pub event_capacity: usize,

    /// SSE keep-alive interval
    pub sse_keepalive_secs: u64,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr only if not specified)
    pub file: Option<PathBuf>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            service_name: "MMM-VideoServerPlayer".to_string(),
            bind_addr: "0.0.0.0".to_string(),
            port: 8085,
            resync_interval_ms: 1000,
            advance_decrement_ms: 50,
            event_capacity: 100,
            sse_keepalive_secs: 15,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load from an explicit file; the file must exist
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }

    /// Load using [`ConfigFileResolver`], falling back to defaults when no file is found
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match ConfigFileResolver::new(explicit).resolve() {
            Some(path) => Self::load(&path),
            None => {
                warn!("No configuration file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Locates the bootstrap TOML file
pub struct ConfigFileResolver {
    explicit: Option<PathBuf>,
}

impl ConfigFileResolver {
    /// Create a resolver; `explicit` wins whenever it is given
    pub fn new(explicit: Option<&Path>) -> Self {
        Self {
            explicit: explicit.map(Path::to_path_buf),
        }
    }

    /// First candidate that exists, in priority order
    ///
    /// An explicit path is returned even when missing so the caller reports
    /// it instead of silently falling back.
    pub fn resolve(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit {
            return Some(path.clone());
        }
        Self::default_candidates().into_iter().find(|p| p.exists())
    }

    /// Platform default locations, highest priority first
    pub fn default_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        }
        if cfg!(target_os = "linux") {
            candidates.push(PathBuf::from("/etc").join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.service_name, "MMM-VideoServerPlayer");
        assert_eq!(config.resync_interval_ms, 1000);
        assert_eq!(config.advance_decrement_ms, 50);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            port = 9000

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.service_name, "MMM-VideoServerPlayer");
        assert_eq!(config.event_capacity, 100);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_explicit_path_wins() {
        let resolver = ConfigFileResolver::new(Some(Path::new("/nonexistent/vsp.toml")));
        assert_eq!(resolver.resolve(), Some(PathBuf::from("/nonexistent/vsp.toml")));
    }

    #[test]
    fn test_default_candidates_end_in_config_toml() {
        for candidate in ConfigFileResolver::default_candidates() {
            assert!(candidate.ends_with("vsp/config.toml"));
        }
    }
}
