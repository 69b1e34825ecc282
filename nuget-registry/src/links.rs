//! # Link Builder
//!
//! Absolute URLs for registration and content resources. Links depend only on
//! the package identity and the base URL of the request, never on stored
//! state, so the same identity always produces the same link on a given host.
//!
//! Layout under `{base}/{prefix}/v3/` (ids and versions lowercased):
//!
//! - `registration/{id}/index.json`
//! - `registration/{id}/{version}.json`
//! - `package/{id}/{version}/{id}.{version}.nupkg`

use axum::http::{header, HeaderMap};
use url::Url;

use crate::error::{AppError, AppResult};
use crate::normalize_package_id;
use crate::package::PackageIdentity;

/// Builds the URLs embedded in registration documents.
pub trait LinkBuilder: Send + Sync {
    /// Registration index of a package id.
    fn registration_index_uri(&self, id: &str) -> AppResult<Url>;

    /// Registration leaf of one package version.
    fn registration_leaf_uri(&self, identity: &PackageIdentity) -> AppResult<Url>;

    /// `.nupkg` download of one package version.
    fn package_content_uri(&self, identity: &PackageIdentity) -> AppResult<Url>;
}

/// [`LinkBuilder`] rooted at the server's public address.
#[derive(Debug, Clone)]
pub struct ServerLinks {
    base: Url,
    prefix: Vec<String>,
}

impl ServerLinks {
    /// `base` is the public origin (optionally with a path), `prefix` the API
    /// route prefix such as `api`.
    pub fn new(base: &str, prefix: &str) -> AppResult<Self> {
        let base = Url::parse(base)?;
        if base.cannot_be_a_base() {
            return Err(AppError::InternalError(format!(
                "Base URL '{base}' cannot carry a path"
            )));
        }

        Ok(ServerLinks {
            base,
            prefix: prefix
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    /// `RegistrationsBaseUrl` advertised in the service index, with trailing slash.
    pub fn registrations_base_uri(&self) -> AppResult<Url> {
        self.endpoint(&["v3", "registration", ""])
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                AppError::InternalError(format!("Base URL '{}' cannot carry a path", self.base))
            })?;
            path.pop_if_empty();
            path.extend(self.prefix.iter());
            path.extend(segments);
        }
        Ok(url)
    }
}

fn lower_version(identity: &PackageIdentity) -> String {
    identity.version.to_normalized_string().to_ascii_lowercase()
}

impl LinkBuilder for ServerLinks {
    fn registration_index_uri(&self, id: &str) -> AppResult<Url> {
        self.endpoint(&["v3", "registration", &normalize_package_id(id), "index.json"])
    }

    fn registration_leaf_uri(&self, identity: &PackageIdentity) -> AppResult<Url> {
        let leaf = format!("{}.json", lower_version(identity));
        self.endpoint(&[
            "v3",
            "registration",
            &normalize_package_id(&identity.id),
            &leaf,
        ])
    }

    fn package_content_uri(&self, identity: &PackageIdentity) -> AppResult<Url> {
        let id = normalize_package_id(&identity.id);
        let version = lower_version(identity);
        let file = format!("{id}.{version}.nupkg");
        self.endpoint(&["v3", "package", &id, &version, &file])
    }
}

/// Public base URL of the current request.
///
/// Uses the `Host` header with the configured scheme; falls back to the
/// configured server address when the header is missing or not a plain
/// `host[:port]`.
pub fn request_base_url(headers: &HeaderMap, scheme: &str, fallback: &str) -> String {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|host| is_plain_authority(host))
        .map(|host| format!("{scheme}://{host}"))
        // Bad ports and unbalanced IPv6 brackets pass the character check.
        .filter(|base| Url::parse(base).is_ok())
        .unwrap_or_else(|| fallback.to_string())
}

fn is_plain_authority(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 261
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'))
}
