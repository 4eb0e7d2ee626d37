//! Test utilities and global setup
//!
//! Provides centralized test logging configuration and file fixtures.

/// Test logging utilities
#[cfg(all(test, feature = "test-logging"))]
pub mod logging {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize test logging globally - safe to call multiple times
    ///
    /// Respects `RUST_LOG`, defaulting to debug output for this crate, and
    /// writes through the test writer so output stays attached to its test.
    ///
    /// ```bash
    /// RUST_LOG=stdio_handles=trace cargo test --features test-logging
    /// ```
    pub fn init() {
        INIT.call_once(|| {
            let env_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stdio_handles=debug"));

            fmt()
                .with_env_filter(env_filter)
                .with_test_writer()
                .with_target(true)
                .with_line_number(true)
                .try_init()
                .ok();
        });
    }

    #[ctor::ctor]
    fn init_test_logging() {
        init();
    }
}

/// File fixtures backed by a temporary directory
#[cfg(test)]
pub mod fixtures {
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Temporary directory removed when dropped
    pub struct Scratch {
        dir: TempDir,
    }

    impl Scratch {
        pub fn new() -> Self {
            Self {
                dir: TempDir::new().expect("create scratch directory"),
            }
        }

        /// Path of `name` inside the scratch directory
        pub fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        /// Write `contents` to `name` and return its path
        pub fn file(&self, name: &str, contents: &str) -> PathBuf {
            let path = self.path(name);
            fs::write(&path, contents).expect("write fixture");
            path
        }

        pub fn contents(&self, name: &str) -> String {
            fs::read_to_string(self.path(name)).expect("read fixture")
        }
    }
}
