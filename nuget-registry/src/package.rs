//! Package records as served by a [`PackageService`](crate::package_service::PackageService).
//!
//! The registration builders only read these; creating and updating them is
//! the store's business.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::version::PackageVersion;

/// One version of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: String,
    pub version: PackageVersion,
    #[serde(default = "default_listed")]
    pub listed: bool,
    #[serde(default)]
    pub downloads: u64,
    pub published: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependency_groups: Vec<DependencyGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub require_license_acceptance: bool,
}

fn default_listed() -> bool {
    true
}

impl Package {
    /// A listed package with no downloads, dependencies or descriptive metadata.
    pub fn new(id: impl Into<String>, version: PackageVersion, published: DateTime<Utc>) -> Self {
        Package {
            id: id.into(),
            version,
            listed: true,
            downloads: 0,
            published,
            dependency_groups: Vec::new(),
            description: None,
            authors: Vec::new(),
            title: None,
            summary: None,
            tags: Vec::new(),
            project_url: None,
            license_url: None,
            icon_url: None,
            require_license_acceptance: false,
        }
    }

    pub fn identity(&self) -> PackageIdentity {
        PackageIdentity::new(self.id.clone(), self.version.clone())
    }
}

/// Dependencies of a package for one target framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGroup {
    /// `None` for framework-agnostic dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_framework: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<PackageDependency>,
}

/// A dependency on another package id within a version range such as `[1.0.0, )`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDependency {
    pub id: String,
    pub range: String,
}

/// A package id plus one exact version.
///
/// Ids compare case-insensitively, versions by NuGet precedence, so
/// `Foo 1.0` and `foo 1.0.0` are the same identity.
#[derive(Debug, Clone)]
pub struct PackageIdentity {
    pub id: String,
    pub version: PackageVersion,
}

impl PackageIdentity {
    pub fn new(id: impl Into<String>, version: PackageVersion) -> Self {
        PackageIdentity {
            id: id.into(),
            version,
        }
    }

    /// Whether `package` is this identity.
    pub fn matches(&self, package: &Package) -> bool {
        self.id.eq_ignore_ascii_case(&package.id) && self.version == package.version
    }
}

impl PartialEq for PackageIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id) && self.version == other.version
    }
}

impl Eq for PackageIdentity {}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version.to_normalized_string())
    }
}
