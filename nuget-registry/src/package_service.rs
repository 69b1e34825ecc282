//! # Package Query Service
//!
//! [`PackageService`] is the only way the registration builders see package
//! data. Two implementations ship with the crate:
//!
//! - [`FilePackageService`]: one JSON document per package id under
//!   `{data_dir}/nuget/metadata/{id}.json`, used by the server
//! - [`MemoryPackageService`]: an in-process map, for embedding and tests
//!
//! Both return a consistent snapshot per call and tolerate concurrent readers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::package::{Package, PackageIdentity};
use crate::{normalize_package_id, validation};

/// Read access to package versions.
#[async_trait]
pub trait PackageService: Send + Sync {
    /// All versions of `id` (case-insensitive).
    ///
    /// Unlisted versions are dropped unless `include_unlisted`; dependency
    /// groups are stripped unless `include_dependencies`. An unknown id yields
    /// an empty list, not an error.
    async fn find_all_versions(
        &self,
        id: &str,
        include_unlisted: bool,
        include_dependencies: bool,
    ) -> AppResult<Vec<Package>>;

    /// The package matching `identity` exactly, if any.
    async fn find_exact(
        &self,
        identity: &PackageIdentity,
        include_unlisted: bool,
        include_dependencies: bool,
    ) -> AppResult<Option<Package>> {
        let versions = self
            .find_all_versions(&identity.id, include_unlisted, include_dependencies)
            .await?;
        Ok(versions.into_iter().find(|p| identity.matches(p)))
    }
}

/// Apply the unlisted/dependency options to a loaded version list.
fn select_versions(
    packages: Vec<Package>,
    include_unlisted: bool,
    include_dependencies: bool,
) -> Vec<Package> {
    packages
        .into_iter()
        .filter(|p| include_unlisted || p.listed)
        .map(|mut p| {
            if !include_dependencies {
                p.dependency_groups.clear();
            }
            p
        })
        .collect()
}

/// Package store backed by JSON files on disk.
///
/// Writes go through a temp file and a rename, so a reader always sees either
/// the old or the new version list for an id.
pub struct FilePackageService {
    metadata_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePackageService {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        FilePackageService {
            metadata_dir: data_dir.as_ref().join("nuget/metadata"),
            write_lock: Mutex::new(()),
        }
    }

    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    fn metadata_path(&self, id: &str) -> AppResult<PathBuf> {
        let id = validation::checked_package_id(id)?;
        Ok(self
            .metadata_dir
            .join(format!("{}.json", normalize_package_id(&id))))
    }

    async fn load(&self, id: &str) -> AppResult<Vec<Package>> {
        let path = self.metadata_path(id)?;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(package_id = %id, "No metadata file for package");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let packages: Vec<Package> = serde_json::from_str(&content)?;
        Ok(packages
            .into_iter()
            .filter(|p| p.id.eq_ignore_ascii_case(id))
            .collect())
    }

    /// Insert or replace one version record.
    ///
    /// An existing record with the same identity is replaced. The stored list
    /// is kept in ascending version order.
    pub async fn save_package(&self, package: Package) -> AppResult<()> {
        let path = self.metadata_path(&package.id)?;
        let _guard = self.write_lock.lock().await;

        let identity = package.identity();
        let mut packages = self.load(&package.id).await?;
        let replaced = packages.iter().any(|p| identity.matches(p));
        packages.retain(|p| !identity.matches(p));
        packages.push(package);
        packages.sort_by(|a, b| a.version.cmp(&b.version));

        fs::create_dir_all(&self.metadata_dir).await?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(&packages)?).await?;
        fs::rename(&tmp_path, &path).await?;

        info!(package = %identity, replaced, versions = packages.len(), "Package version saved");
        Ok(())
    }

    /// Ids of every stored package, sorted case-insensitively.
    pub async fn list_package_ids(&self) -> AppResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.metadata_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.load(stem).await {
                // Prefer the id casing the package was published with.
                Ok(packages) => ids.push(
                    packages
                        .first()
                        .map(|p| p.id.clone())
                        .unwrap_or_else(|| stem.to_string()),
                ),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable metadata file"),
            }
        }

        ids.sort_by_key(|id| id.to_ascii_lowercase());
        Ok(ids)
    }
}

#[async_trait]
impl PackageService for FilePackageService {
    async fn find_all_versions(
        &self,
        id: &str,
        include_unlisted: bool,
        include_dependencies: bool,
    ) -> AppResult<Vec<Package>> {
        let packages = self.load(id).await?;
        debug!(package_id = %id, found = packages.len(), include_unlisted, "Loaded package versions");
        Ok(select_versions(
            packages,
            include_unlisted,
            include_dependencies,
        ))
    }
}

/// Package store held in memory, keyed by lowercase id.
#[derive(Default)]
pub struct MemoryPackageService {
    packages: RwLock<HashMap<String, Vec<Package>>>,
}

impl MemoryPackageService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a list of version records.
    pub fn with_packages(packages: impl IntoIterator<Item = Package>) -> Self {
        let service = Self::new();
        for package in packages {
            service.insert(package);
        }
        service
    }

    /// Insert or replace one version record.
    pub fn insert(&self, package: Package) {
        let identity = package.identity();
        let mut map = self.packages.write().unwrap_or_else(|e| e.into_inner());
        let versions = map.entry(normalize_package_id(&package.id)).or_default();
        versions.retain(|p| !identity.matches(p));
        versions.push(package);
    }
}

#[async_trait]
impl PackageService for MemoryPackageService {
    async fn find_all_versions(
        &self,
        id: &str,
        include_unlisted: bool,
        include_dependencies: bool,
    ) -> AppResult<Vec<Package>> {
        let packages = {
            let map = self.packages.read().unwrap_or_else(|e| e.into_inner());
            map.get(&normalize_package_id(id)).cloned().unwrap_or_default()
        };
        Ok(select_versions(
            packages,
            include_unlisted,
            include_dependencies,
        ))
    }
}
