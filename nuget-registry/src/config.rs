//! # Configuration Management
//!
//! Server configuration, loaded from a JSON file or built from defaults:
//!
//! - [`ServerConfig`]: bind address and public URL scheme
//! - [`StorageConfig`]: where package metadata lives
//! - [`RouteConfig`]: the API route prefix shared by routes and links
//! - [`LoggingSettings`]: tracing level, format and output
//!
//! Every section is optional in the file; missing sections take their defaults.
//!
//! ```rust,no_run
//! # use nuget_registry::config::Config;
//! let config = Config::load_or_default("nuget-registry.json")?;
//! # Ok::<(), nuget_registry::AppError>(())
//! ```

use crate::error::{AppError, AppResult};
use nuget_logging::LoggingSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the registry server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub routes: RouteConfig,
    pub logging: LoggingSettings,
}

/// Server configuration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Default host/IP address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub default_host: String,
    /// Default port number to listen on
    pub default_port: u16,
    /// Scheme used in synthesized links ("http" or "https")
    pub scheme: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            default_host: "0.0.0.0".to_string(),
            default_port: 5000,
            scheme: "http".to_string(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory; metadata lives under `nuget/metadata`
    pub default_data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            default_data_dir: PathBuf::from("./data"),
        }
    }
}

/// Route configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// First path segment(s) of every NuGet route, e.g. `api` gives
    /// `/api/v3/registration/{id}/index.json`
    pub api_prefix: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        RouteConfig {
            api_prefix: "api".to_string(),
        }
    }
}

impl RouteConfig {
    /// The prefix as a route path: `/api`, `/nuget/api`, or empty.
    pub fn route_prefix(&self) -> String {
        self.api_prefix
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| format!("/{s}"))
            .collect()
    }
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid JSON, or holds values
    /// rejected by [`Config::validate`].
    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file with fallback to defaults when the file
    /// does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject values that would produce broken routes or links.
    pub fn validate(&self) -> AppResult<()> {
        if !matches!(self.server.scheme.as_str(), "http" | "https") {
            return Err(AppError::BadRequest(format!(
                "Unsupported scheme '{}' (expected http or https)",
                self.server.scheme
            )));
        }

        let segments_ok = self
            .routes
            .api_prefix
            .split('/')
            .filter(|s| !s.is_empty())
            .all(|s| {
                s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
                    && s != "."
                    && s != ".."
            });
        if !segments_ok {
            return Err(AppError::BadRequest(format!(
                "Invalid api_prefix '{}'",
                self.routes.api_prefix
            )));
        }

        Ok(())
    }
}
