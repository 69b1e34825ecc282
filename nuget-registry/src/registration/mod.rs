//! NuGet V3 registration resource
//!
//! Builds the two registration documents clients use to resolve packages:
//!
//! - [`build_index`]: every listed version of an id, in a single page, with
//!   `lower`/`upper` bounds by version precedence and summed downloads
//! - [`build_leaf`]: one exact version, unlisted or not
//!
//! The builders read through a [`PackageService`](crate::package_service::PackageService)
//! and take their URLs from a [`LinkBuilder`](crate::links::LinkBuilder); the
//! axum handlers in this module only adapt them to HTTP.

mod handlers;
mod index;
mod leaf;
mod types;

#[cfg(test)]
mod tests;

pub use handlers::*;
pub use index::*;
pub use leaf::*;
pub use types::*;
