//! Standalone NuGet registration server binary
//!
//! `start` runs the HTTP server; `add` and `list` manage the package metadata
//! it serves, directly on the data directory.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use nuget_logging::{init_subscriber, LoggingSettings};
use nuget_registry::{
    run_server, Config, FilePackageService, Package, PackageService, PackageVersion,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "nuget-registry")]
#[command(about = "NuGet V3 registration server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON); defaults apply when it does not exist
    #[arg(long, default_value = "nuget-registry.json", global = true)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the registration server
    Start {
        /// Host to bind to [default: from config]
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to [default: from config]
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for package metadata [default: from config]
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Add or replace one package version in the data directory
    Add {
        /// Package id, e.g. Newtonsoft.Json
        id: String,

        /// Package version, e.g. 13.0.1 or 2.0.0-beta
        version: String,

        /// Download count to record
        #[arg(long, default_value = "0")]
        downloads: u64,

        /// Record the version as unlisted
        #[arg(long)]
        unlisted: bool,

        /// Package description
        #[arg(long)]
        description: Option<String>,

        /// Package authors, comma separated
        #[arg(long, value_delimiter = ',')]
        authors: Vec<String>,

        /// Data directory for package metadata [default: from config]
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// List stored packages, or the versions of one package
    List {
        /// Package id to show versions for
        id: Option<String>,

        /// Data directory for package metadata [default: from config]
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config);
    let logging = match &config {
        Ok(config) => config.logging.clone().with_env_overrides(),
        Err(_) => LoggingSettings::from_env(),
    };
    let _log_guard = init_subscriber(&logging);

    let config = config
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    match cli.command {
        Commands::Start { host, port, data } => {
            let host = host.unwrap_or_else(|| config.server.default_host.clone());
            let port = port.unwrap_or(config.server.default_port);
            let data = data.unwrap_or_else(|| config.storage.default_data_dir.clone());
            run_server(host, port, data, config).await
        }

        Commands::Add {
            id,
            version,
            downloads,
            unlisted,
            description,
            authors,
            data,
        } => {
            let data = data.unwrap_or_else(|| config.storage.default_data_dir.clone());
            let version = PackageVersion::parse(&version)
                .with_context(|| format!("Invalid version '{version}'"))?;

            let mut package = Package::new(id, version, Utc::now());
            package.downloads = downloads;
            package.listed = !unlisted;
            package.description = description;
            package.authors = authors;

            let identity = package.identity();
            FilePackageService::new(&data).save_package(package).await?;
            info!(package = %identity, data_dir = %data.display(), "Added package");
            println!("Added {identity}");
            Ok(())
        }

        Commands::List { id, data } => {
            let data = data.unwrap_or_else(|| config.storage.default_data_dir.clone());
            let service = FilePackageService::new(&data);

            match id {
                Some(id) => {
                    let mut versions = service.find_all_versions(&id, true, false).await?;
                    if versions.is_empty() {
                        println!("No versions of '{id}' found");
                    }
                    versions.sort_by(|a, b| a.version.cmp(&b.version));
                    for package in versions {
                        let marker = if package.listed { "" } else { " (unlisted)" };
                        println!(
                            "{} {}  downloads: {}{}",
                            package.id,
                            package.version.to_normalized_string(),
                            package.downloads,
                            marker
                        );
                    }
                }
                None => {
                    let ids = service.list_package_ids().await?;
                    if ids.is_empty() {
                        println!("No packages found in {}", data.display());
                    }
                    for id in ids {
                        println!("{id}");
                    }
                }
            }
            Ok(())
        }
    }
}
