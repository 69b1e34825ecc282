//! Registration documents as they go over the wire.
//!
//! Field names follow the NuGet V3 registration resource; clients parse these
//! by name, so renames here are breaking changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog location embedded in every catalog entry. The timestamp segment is
/// fixed, so these URLs identify an entry but do not resolve.
pub const PLACEHOLDER_CATALOG_BASE: &str =
    "https://api.nuget.org/v3/catalog0/data/2015.02.01.06.24.15/";

pub const CATALOG_ENTRY_TYPE: &str = "PackageDetails";

/// All versions of one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationIndex {
    #[serde(rename = "@id")]
    pub index_uri: String,
    pub package_id: String,
    pub count: usize,
    pub total_downloads: u64,
    /// Always a single page; large packages are not split.
    pub items: Vec<RegistrationIndexPage>,
    pub lower: String,
    pub upper: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationIndexPage {
    #[serde(rename = "@id")]
    pub page_uri: String,
    pub package_id: String,
    pub count: usize,
    /// Ascending version order
    pub items: Vec<RegistrationIndexLeaf>,
    pub lower: String,
    pub upper: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationIndexLeaf {
    #[serde(rename = "@id")]
    pub registration_uri: String,
    pub package_id: String,
    pub catalog_entry: CatalogEntry,
    #[serde(rename = "packageContent")]
    pub package_content_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(rename = "@id")]
    pub catalog_uri: String,
    #[serde(rename = "@type")]
    pub entry_type: String,
    pub id: String,
    /// Normalized version string
    pub version: String,
    pub listed: bool,
    pub published: DateTime<Utc>,
    pub authors: String,
    pub description: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub project_url: String,
    pub license_url: String,
    pub icon_url: String,
    pub require_license_acceptance: bool,
    pub dependency_groups: Vec<CatalogDependencyGroup>,
    #[serde(rename = "packageContent")]
    pub package_content_uri: String,
    /// Registration index of the owning package id
    #[serde(rename = "registration")]
    pub registration_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDependencyGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_framework: Option<String>,
    pub dependencies: Vec<CatalogDependency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDependency {
    pub id: String,
    pub range: String,
    /// Registration index of the dependency's package id
    pub registration: String,
}

/// One exact package version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationLeaf {
    #[serde(rename = "@id")]
    pub registration_uri: String,
    pub listed: bool,
    pub downloads: u64,
    #[serde(rename = "packageContent")]
    pub package_content_uri: String,
    pub published: DateTime<Utc>,
    #[serde(rename = "registration")]
    pub registration_index_uri: String,
}
