//! Runtime configuration for handle construction
//!
//! Provides [`IoConfig`] with environment loading and builder-style overrides.
//! A process-wide instance is installed once and read by every constructor
//! that is not handed an explicit configuration.

use std::env;
use std::sync::OnceLock;

use tracing::warn;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default stream buffer size in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Environment variable overriding [`DEFAULT_BUFFER_SIZE`]
pub const BUFFER_SIZE_ENV: &str = "STDIO_HANDLES_BUFFER_SIZE";

/// Environment variable overriding the shell used for pipe commands
pub const SHELL_ENV: &str = "STDIO_HANDLES_SHELL";

#[cfg(unix)]
const DEFAULT_SHELL: (&str, &str) = ("/bin/sh", "-c");
#[cfg(windows)]
const DEFAULT_SHELL: (&str, &str) = ("cmd", "/C");

// ============================================================================
// IoConfig
// ============================================================================

/// Settings shared by all handles created without an explicit configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoConfig {
    /// Buffer size for new handles and for buffering changes without a size
    pub buffer_size: usize,
    /// Shell executable used to run pipe commands
    pub shell: String,
    /// Flag passing the command string to the shell
    pub shell_flag: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            shell: DEFAULT_SHELL.0.to_string(),
            shell_flag: DEFAULT_SHELL.1.to_string(),
        }
    }
}

impl IoConfig {
    /// Create IoConfig from environment variables
    ///
    /// Unparseable values are logged and replaced by the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var(BUFFER_SIZE_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => config.buffer_size = size,
                _ => warn!("Ignoring invalid {}={:?}", BUFFER_SIZE_ENV, raw),
            }
        }

        if let Ok(shell) = env::var(SHELL_ENV)
            && !shell.trim().is_empty()
        {
            config.shell = shell;
        }

        config
    }

    /// Override the default buffer size (clamped to at least one byte)
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Override the shell and its command flag
    pub fn with_shell(mut self, shell: impl Into<String>, flag: impl Into<String>) -> Self {
        self.shell = shell.into();
        self.shell_flag = flag.into();
        self
    }
}

// ============================================================================
// Process-wide Instance
// ============================================================================

static CONFIG: OnceLock<IoConfig> = OnceLock::new();

/// Install the process-wide configuration
///
/// Returns the rejected value if a configuration is already in place.
pub fn install(config: IoConfig) -> Result<(), IoConfig> {
    CONFIG.set(config)
}

/// The process-wide configuration, loaded from the environment on first use
pub fn current() -> &'static IoConfig {
    CONFIG.get_or_init(IoConfig::from_env)
}
