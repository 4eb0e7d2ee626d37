//! Optional subscriber setup for applications embedding the handle layer
//!
//! The library only emits `tracing` events. Hosts that have no subscriber of
//! their own can install one here, configured from the environment.

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a log file
pub const LOG_FILE_ENV: &str = "STDIO_HANDLES_LOG_FILE";

/// Environment variable selecting JSON output when set to `true`
pub const LOG_JSON_ENV: &str = "STDIO_HANDLES_LOG_JSON";

/// Filter used when `RUST_LOG` is unset or unparseable
const DEFAULT_FILTER: &str = "stdio_handles=info";

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `stdio_handles=debug`
    pub filter: String,
    /// Append to this file instead of writing to stderr
    pub file_path: Option<PathBuf>,
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            file_path: None,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Create LogConfig from `RUST_LOG`, [`LOG_FILE_ENV`] and [`LOG_JSON_ENV`]
    pub fn from_env() -> Self {
        Self {
            filter: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string()),
            file_path: env::var_os(LOG_FILE_ENV).map(PathBuf::from),
            json_format: env::var(LOG_JSON_ENV).is_ok_and(|value| value == "true"),
        }
    }

    pub fn with_file(mut self, file_path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }
}

/// Install a global subscriber for `config`
///
/// Fails if the log file cannot be opened or a global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_new(&config.filter).or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let (writer, ansi) = match &config.file_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(io::stderr), true),
    };
    let layer = fmt::layer().with_writer(writer).with_target(true);

    let subscriber = tracing_subscriber::registry().with(filter);
    if config.json_format {
        subscriber.with(layer.json().with_ansi(false)).try_init()?;
    } else {
        subscriber.with(layer.with_ansi(ansi).with_line_number(true)).try_init()?;
    }
    Ok(())
}
