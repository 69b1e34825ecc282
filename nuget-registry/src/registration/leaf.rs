//! Registration leaf: one exact package version.

use tracing::debug;

use super::types::RegistrationLeaf;
use crate::error::{AppError, AppResult};
use crate::links::LinkBuilder;
use crate::package::PackageIdentity;
use crate::package_service::PackageService;
use crate::version::PackageVersion;

/// Build the registration leaf for `id` at `version_token`.
///
/// The token is parsed before the store is touched; a malformed token is an
/// [`AppError::BadRequest`]. Unlisted versions resolve like any other.
/// A missing version is [`AppError::NotFound`].
pub async fn build_leaf(
    packages: &dyn PackageService,
    links: &dyn LinkBuilder,
    id: &str,
    version_token: &str,
) -> AppResult<RegistrationLeaf> {
    let version = PackageVersion::parse(version_token)
        .map_err(|e| AppError::BadRequest(format!("Invalid version '{version_token}': {e}")))?;
    let identity = PackageIdentity::new(id, version);

    let package = packages
        .find_exact(&identity, true, false)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Package '{identity}' not found")))?;

    debug!(package = %identity, listed = package.listed, "Built registration leaf");

    Ok(RegistrationLeaf {
        registration_uri: links.registration_leaf_uri(&identity)?.into(),
        listed: package.listed,
        downloads: package.downloads,
        package_content_uri: links.package_content_uri(&identity)?.into(),
        published: package.published,
        registration_index_uri: links.registration_index_uri(id)?.into(),
    })
}
