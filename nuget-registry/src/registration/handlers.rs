//! Registration HTTP endpoint handlers
//!
//! Thin axum wrappers around [`build_index`] and [`build_leaf`]: validate the
//! route parameters, pick the link builder for the request, and serialize.

use super::{build_index, build_leaf, RegistrationIndex, RegistrationLeaf};
use crate::{validation, AppError, AppResult, AppState};
use axum::{
    extract::{Path as AxumPath, State},
    http::HeaderMap,
    response::Json,
};
use std::sync::Arc;
use tracing::{debug, info};

/// `GET /{prefix}/v3/registration/{id}/index.json`
pub async fn registration_index(
    AxumPath(id): AxumPath<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<RegistrationIndex>> {
    debug!(package_id = %id, "Incoming registration index request");
    validation::checked_package_id(&id)?;

    let links = state.links(&headers)?;
    let index = build_index(state.packages.as_ref(), &links, &id).await?;

    info!(package_id = %id, count = index.count, lower = %index.lower, upper = %index.upper, "Serving registration index");
    Ok(Json(index))
}

/// `GET /{prefix}/v3/registration/{id}/{version}.json`
pub async fn registration_leaf(
    AxumPath((id, version_file)): AxumPath<(String, String)>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<RegistrationLeaf>> {
    debug!(package_id = %id, file = %version_file, "Incoming registration leaf request");

    let Some(version) = version_file.strip_suffix(".json") else {
        return Err(AppError::NotFound(format!(
            "No registration resource '{version_file}' for package '{id}'"
        )));
    };
    validation::checked_package_id(&id)?;

    let links = state.links(&headers)?;
    let leaf = build_leaf(state.packages.as_ref(), &links, &id, version).await?;

    info!(package_id = %id, version = %version, "Serving registration leaf");
    Ok(Json(leaf))
}
