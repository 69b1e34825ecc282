//! # Application State Management
//!
//! [`AppState`] is built once at startup and shared with every handler behind
//! an `Arc`. It holds no per-request data; links are derived per request from
//! the request's `Host` header.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nuget_registry::{config::Config, package_service::FilePackageService, AppState};
//!
//! let state = Arc::new(AppState {
//!     data_dir: "/path/to/data".into(),
//!     server_addr: "http://localhost:5000".to_string(),
//!     packages: Arc::new(FilePackageService::new("/path/to/data")),
//!     config: Arc::new(Config::default()),
//! });
//! ```

use crate::config::Config;
use crate::error::AppResult;
use crate::links::{request_base_url, ServerLinks};
use crate::package_service::PackageService;
use axum::http::HeaderMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Application state containing shared configuration and resources.
#[derive(Clone)]
pub struct AppState {
    /// Base directory path where package metadata is stored
    pub data_dir: PathBuf,
    /// Full server address including scheme, host, and port (e.g., "http://localhost:5000"),
    /// used for links when a request carries no usable `Host` header
    pub server_addr: String,
    /// Package query service shared by all handlers
    pub packages: Arc<dyn PackageService>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Link builder for the request described by `headers`.
    pub fn links(&self, headers: &HeaderMap) -> AppResult<ServerLinks> {
        let base = request_base_url(headers, &self.config.server.scheme, &self.server_addr);
        ServerLinks::new(&base, &self.config.routes.api_prefix)
    }
}
