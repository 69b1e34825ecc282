//! Registration index: every listed version of a package in one page.

use tracing::debug;

use super::types::*;
use crate::error::{AppError, AppResult};
use crate::links::LinkBuilder;
use crate::package::Package;
use crate::package_service::PackageService;

/// Build the registration index for `id`.
///
/// Unlisted versions are left out and dependency groups are included. Fails
/// with [`AppError::NotFound`] when the package has no listed versions; store
/// and link errors are returned as-is.
pub async fn build_index(
    packages: &dyn PackageService,
    links: &dyn LinkBuilder,
    id: &str,
) -> AppResult<RegistrationIndex> {
    let mut versions = packages.find_all_versions(id, false, true).await?;
    versions.sort_by(|a, b| a.version.cmp(&b.version));

    let (Some(first), Some(last)) = (versions.first(), versions.last()) else {
        return Err(AppError::NotFound(format!("Package '{id}' not found")));
    };
    let lower = first.version.to_normalized_string();
    let upper = last.version.to_normalized_string();

    let total_downloads = versions
        .iter()
        .fold(0u64, |sum, p| sum.saturating_add(p.downloads));

    let index_uri = String::from(links.registration_index_uri(id)?);
    let leaves = versions
        .iter()
        .map(|package| index_leaf(links, package))
        .collect::<AppResult<Vec<_>>>()?;

    debug!(package_id = %id, count = leaves.len(), %lower, %upper, "Built registration index");

    // TODO: page the index (128 leaves per page, like nuget.org) for packages
    // with many versions. Everything is inlined in one page for now.
    let page = RegistrationIndexPage {
        page_uri: format!("{index_uri}#page/{lower}/{upper}"),
        package_id: id.to_string(),
        count: leaves.len(),
        items: leaves,
        lower: lower.clone(),
        upper: upper.clone(),
    };

    Ok(RegistrationIndex {
        index_uri,
        package_id: id.to_string(),
        count: versions.len(),
        total_downloads,
        items: vec![page],
        lower,
        upper,
    })
}

fn index_leaf(links: &dyn LinkBuilder, package: &Package) -> AppResult<RegistrationIndexLeaf> {
    let identity = package.identity();
    let package_content_uri = String::from(links.package_content_uri(&identity)?);

    Ok(RegistrationIndexLeaf {
        registration_uri: links.registration_leaf_uri(&identity)?.into(),
        package_id: package.id.clone(),
        catalog_entry: catalog_entry(links, package, package_content_uri.clone())?,
        package_content_uri,
    })
}

/// Project a package into its catalog entry.
pub fn catalog_entry(
    links: &dyn LinkBuilder,
    package: &Package,
    package_content_uri: String,
) -> AppResult<CatalogEntry> {
    let version = package.version.to_normalized_string();

    let dependency_groups = package
        .dependency_groups
        .iter()
        .map(|group| -> AppResult<CatalogDependencyGroup> {
            let dependencies = group
                .dependencies
                .iter()
                .map(|dep| -> AppResult<CatalogDependency> {
                    Ok(CatalogDependency {
                        id: dep.id.clone(),
                        range: dep.range.clone(),
                        registration: links.registration_index_uri(&dep.id)?.into(),
                    })
                })
                .collect::<AppResult<Vec<_>>>()?;
            Ok(CatalogDependencyGroup {
                target_framework: group.target_framework.clone(),
                dependencies,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(CatalogEntry {
        catalog_uri: format!("{PLACEHOLDER_CATALOG_BASE}{}.{version}.json", package.id),
        entry_type: CATALOG_ENTRY_TYPE.to_string(),
        id: package.id.clone(),
        version,
        listed: package.listed,
        published: package.published,
        authors: package.authors.join(", "),
        description: package.description.clone().unwrap_or_default(),
        title: package.title.clone().unwrap_or_default(),
        summary: package.summary.clone().unwrap_or_default(),
        tags: package.tags.clone(),
        project_url: package.project_url.clone().unwrap_or_default(),
        license_url: package.license_url.clone().unwrap_or_default(),
        icon_url: package.icon_url.clone().unwrap_or_default(),
        require_license_acceptance: package.require_license_acceptance,
        dependency_groups,
        package_content_uri,
        registration_uri: links.registration_index_uri(&package.id)?.into(),
    })
}
