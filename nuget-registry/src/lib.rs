//! # NuGet Registration Server
//!
//! Serves the NuGet V3 registration resource: the per-package index listing
//! every listed version, and the per-version leaf. Package data comes from a
//! pluggable [`PackageService`]; every URL in a response is synthesized by a
//! [`LinkBuilder`] from the request's host and the configured route prefix.
//!
//! ## Key Modules
//!
//! - [`registration`]: index and leaf builders plus their HTTP handlers
//! - [`package_service`]: package queries, file-backed and in-memory stores
//! - [`version`]: NuGet version parsing, normalization and precedence
//! - [`links`]: absolute URL synthesis for registration documents
//! - [`config`]: configuration management and settings
//! - [`state`]: application state shared with handlers
//! - [`error`]: error handling and standardized responses
//! - [`server`]: router assembly and the server entry point
//! - [`validation`]: package id validation
//!
//! ## Usage
//!
//! The binary runs the server; the builders can also be driven directly:
//!
//! ```rust,no_run
//! # async fn demo() -> nuget_registry::AppResult<()> {
//! use nuget_registry::{build_index, MemoryPackageService, ServerLinks};
//!
//! let packages = MemoryPackageService::new();
//! let links = ServerLinks::new("http://localhost:5000", "api")?;
//! let index = build_index(&packages, &links, "Newtonsoft.Json").await?;
//! println!("{} versions", index.count);
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod links;
pub mod package;
pub mod package_service;
pub mod registration;
pub mod server;
pub mod state;
pub mod validation;
pub mod version;

// Re-export key types for convenience
pub use config::Config;
pub use error::{ApiErrorResponse, AppError, AppResult, ErrorCode};
pub use links::{LinkBuilder, ServerLinks};
pub use package::{Package, PackageIdentity};
pub use package_service::{FilePackageService, MemoryPackageService, PackageService};
pub use registration::{build_index, build_leaf, RegistrationIndex, RegistrationLeaf};
pub use server::{build_router, run_server};
pub use state::AppState;
pub use version::PackageVersion;

/// Lowercase form of a package id, as used in storage keys and URLs.
///
/// NuGet ids compare case-insensitively, so `Newtonsoft.Json` and
/// `newtonsoft.json` name the same package.
pub fn normalize_package_id(id: &str) -> String {
    id.to_ascii_lowercase()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_package_id() {
        assert_eq!(normalize_package_id("Newtonsoft.Json"), "newtonsoft.json");
        assert_eq!(normalize_package_id("already.lower"), "already.lower");
    }
}
