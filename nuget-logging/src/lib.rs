//! Tracing setup for the registry service.
//!
//! The subscriber is configured from [`LoggingSettings`], which can come from
//! the server's JSON configuration or from `LOG_*` environment variables.
//! `RUST_LOG` always wins over the configured level when it is set.

use std::{env, fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::Directive,
    fmt::writer::{BoxMakeWriter, MakeWriterExt},
    prelude::*,
    registry, EnvFilter,
};

const DEFAULT_LOG_FILE: &str = "/tmp/nuget-registry.log";

/// Line format of emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

/// Where events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
    None,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "pretty" | "text" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" | "stdout" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" => Ok(LogOutput::Both),
            "none" | "off" => Ok(LogOutput::None),
            other => Err(format!("unknown log output '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, e.g. `info` or `nuget_registry=debug`
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Log file used when `output` is `file` or `both`; rotated daily
    pub file_path: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: LogFormat::Human,
            output: LogOutput::Console,
            file_path: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl LoggingSettings {
    /// Read `LOG_LEVEL`, `LOG_FORMAT`, `LOG_OUTPUT` and `LOG_FILE_PATH`.
    ///
    /// Unset or unparseable variables keep their default.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `LOG_*` environment variables on top of these settings.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = env::var("LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.level = level;
            }
        }
        if let Some(format) = env::var("LOG_FORMAT").ok().and_then(|v| v.parse().ok()) {
            self.format = format;
        }
        if let Some(output) = env::var("LOG_OUTPUT").ok().and_then(|v| v.parse().ok()) {
            self.output = output;
        }
        if let Ok(path) = env::var("LOG_FILE_PATH") {
            if !path.trim().is_empty() {
                self.file_path = PathBuf::from(path);
            }
        }
        self
    }

    /// Build the event filter: `RUST_LOG` if set, otherwise `level`.
    pub fn env_filter(&self) -> EnvFilter {
        let base = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        ["hyper=warn", "tokio=warn", "tower_http=info"]
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(base, |filter, directive| filter.add_directive(directive))
    }

    fn file_writer(&self) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
        let dir = self
            .file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/tmp"));
        let file_name = self
            .file_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "nuget-registry.log".into());

        let appender = tracing_appender::rolling::daily(dir, file_name);
        tracing_appender::non_blocking(appender)
    }
}

/// Install the global tracing subscriber.
///
/// Returns the file writer guard when file output is enabled; it must be kept
/// alive for buffered events to be flushed. Calling this more than once is a
/// no-op for the later calls.
pub fn init_subscriber(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let mut guard = None;

    let writer = match settings.output {
        LogOutput::None => {
            let _ = registry().with(settings.env_filter()).try_init();
            return None;
        }
        LogOutput::Console => BoxMakeWriter::new(std::io::stdout),
        LogOutput::File => {
            let (file, file_guard) = settings.file_writer();
            guard = Some(file_guard);
            BoxMakeWriter::new(file)
        }
        LogOutput::Both => {
            let (file, file_guard) = settings.file_writer();
            guard = Some(file_guard);
            BoxMakeWriter::new(std::io::stdout.and(file))
        }
    };

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(writer);
    let subscriber = registry().with(settings.env_filter());
    let _ = match settings.format {
        LogFormat::Json => subscriber.with(fmt_layer.json()).try_init(),
        LogFormat::Human => subscriber.with(fmt_layer.with_target(true)).try_init(),
    };

    guard
}
