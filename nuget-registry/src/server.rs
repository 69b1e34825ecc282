//! HTTP server setup and route table
//!
//! The registration builders know nothing about HTTP; this module owns the
//! axum `Router`, the service index and the operational endpoints.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    config::Config, package_service::FilePackageService, registration, state::AppState,
    AppResult,
};

/// NuGet V3 service index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceIndex {
    pub version: String,
    pub resources: Vec<ServiceResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResource {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub resource_type: String,
    pub comment: String,
}

const REGISTRATION_RESOURCE_TYPES: &[&str] = &[
    "RegistrationsBaseUrl",
    "RegistrationsBaseUrl/3.0.0-rc",
    "RegistrationsBaseUrl/3.0.0-beta",
];

/// Build the application router for `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let prefix = state.config.routes.route_prefix();

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route(&format!("{prefix}/v3/index.json"), get(service_index))
        .route(
            &format!("{prefix}/v3/registration/{{id}}/index.json"),
            get(registration::registration_index),
        )
        .route(
            &format!("{prefix}/v3/registration/{{id}}/{{version_file}}"),
            get(registration::registration_leaf),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server until it fails or the process is stopped.
pub async fn run_server(host: String, port: u16, data_dir: PathBuf, config: Config) -> Result<()> {
    info!("Starting NuGet registration server");

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let addr: SocketAddr = format!("{}:{}", host, port).parse().map_err(|e| {
        error!(host = %host, port = %port, error = %e, "Invalid socket address");
        anyhow::anyhow!("Invalid socket address {}:{}: {}", host, port, e)
    })?;

    let abs_data_dir = match std::fs::canonicalize(&data_dir) {
        Ok(path) => path,
        Err(_) => {
            std::fs::create_dir_all(&data_dir)?;
            std::fs::canonicalize(&data_dir)?
        }
    };
    info!(data_dir = %abs_data_dir.display(), "Using data directory");

    let advertised_host = if addr.ip().is_unspecified() {
        "localhost".to_string()
    } else {
        host.clone()
    };
    let server_addr = format!("{}://{}:{}", config.server.scheme, advertised_host, port);

    let state = AppState {
        packages: Arc::new(FilePackageService::new(&abs_data_dir)),
        data_dir: abs_data_dir,
        server_addr,
        config: Arc::new(config),
    };
    let app = build_router(Arc::new(state));

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!(addr = %addr, error = %e, "Failed to bind to address");
        anyhow::anyhow!("Failed to bind to {}:{}: {}", host, port, e)
    })?;

    info!("Server listening on {}", addr);
    axum::serve(listener, app).await.map_err(|e| {
        error!(error = %e, "Server error");
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}

async fn service_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<ServiceIndex>> {
    let links = state.links(&headers)?;
    let registrations = String::from(links.registrations_base_uri()?);

    let resources = REGISTRATION_RESOURCE_TYPES
        .iter()
        .map(|resource_type| ServiceResource {
            id: registrations.clone(),
            resource_type: resource_type.to_string(),
            comment: "Base URL of the package registration resource".to_string(),
        })
        .collect();

    Ok(Json(ServiceIndex {
        version: "3.0.0".to_string(),
        resources,
    }))
}

async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "nuget-registry",
        "version": env!("CARGO_PKG_VERSION"),
        "data_directory": state.data_dir.display().to_string(),
        "api_prefix": state.config.routes.route_prefix(),
    }))
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "healthy"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_service::MemoryPackageService;
    use axum_test::TestServer;

    fn test_state(config: Config) -> Arc<AppState> {
        Arc::new(AppState {
            data_dir: PathBuf::from("/tmp/nuget-test"),
            server_addr: "http://localhost:5000".to_string(),
            packages: Arc::new(MemoryPackageService::new()),
            config: Arc::new(config),
        })
    }

    #[tokio::test]
    async fn test_health_and_status() {
        let server = TestServer::new(build_router(test_state(Config::default()))).unwrap();

        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_json(&json!({"status": "healthy"}));

        let body: serde_json::Value = server.get("/status").await.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["api_prefix"], "/api");
    }

    #[tokio::test]
    async fn test_service_index_advertises_registrations() {
        let server = TestServer::new(build_router(test_state(Config::default()))).unwrap();

        let response = server
            .get("/api/v3/index.json")
            .add_header("host", "feed.example:8080")
            .await;
        response.assert_status_ok();

        let index: ServiceIndex = response.json();
        assert_eq!(index.version, "3.0.0");
        assert_eq!(index.resources.len(), REGISTRATION_RESOURCE_TYPES.len());
        assert!(index
            .resources
            .iter()
            .all(|r| r.id == "http://feed.example:8080/api/v3/registration/"));
        assert_eq!(index.resources[0].resource_type, "RegistrationsBaseUrl");
    }

    #[tokio::test]
    async fn test_custom_prefix_moves_routes() {
        let mut config = Config::default();
        config.routes.api_prefix = "nuget".to_string();
        let server = TestServer::new(build_router(test_state(config))).unwrap();

        server.get("/nuget/v3/index.json").await.assert_status_ok();
        server.get("/api/v3/index.json").await.assert_status_not_found();
    }
}
