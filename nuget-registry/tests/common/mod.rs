//! Common test utilities and helpers
//!
//! Shared setup for the integration tests: a file-backed store in a temporary
//! data directory and the state wrapped around it.

#![allow(dead_code)]

use anyhow::Result;
use chrono::{TimeZone, Utc};
use nuget_registry::{AppState, Config, FilePackageService, Package, PackageVersion};
use std::sync::Arc;
use tempfile::TempDir;

/// Test setup result
pub struct TestSetup {
    pub temp_dir: TempDir,
    pub app_state: Arc<AppState>,
    pub store: Arc<FilePackageService>,
}

/// Creates app state over an empty file store in a temporary directory
pub fn create_test_setup() -> Result<TestSetup> {
    create_test_setup_with_config(Config::default())
}

pub fn create_test_setup_with_config(config: Config) -> Result<TestSetup> {
    let temp_dir = TempDir::new()?;
    let data_dir = temp_dir.path().to_path_buf();
    let store = Arc::new(FilePackageService::new(&data_dir));

    let app_state = Arc::new(AppState {
        data_dir,
        server_addr: "http://localhost:5000".to_string(),
        packages: store.clone(),
        config: Arc::new(config),
    });

    Ok(TestSetup {
        temp_dir,
        app_state,
        store,
    })
}

/// A listed package version published at a fixed instant
pub fn test_package(id: &str, version: &str, downloads: u64) -> Package {
    let mut package = Package::new(
        id,
        PackageVersion::parse(version).expect("test version parses"),
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
    );
    package.downloads = downloads;
    package
}

/// Save each package into the setup's store
pub async fn seed(setup: &TestSetup, packages: Vec<Package>) -> Result<()> {
    for package in packages {
        setup.store.save_package(package).await?;
    }
    Ok(())
}
