//! Temporary configuration file naming.

use crate::error::{ConfigError, ConfigResult};
use directories::UserDirs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Directory under the home directory that holds auto-named files.
pub const TEMP_ROOT_DIR: &str = "TemporaryConfigurationFiles";

/// Environment variable overriding the temporary configuration root.
pub const TEMP_ROOT_ENV: &str = "CASCFG_TEMP_ROOT";

/// Extension of generated file names.
pub const EXTENSION: &str = "properties";

/// Process-wide source of temporary file numbers.
#[derive(Debug)]
pub struct TemporaryNameCounter {
    next: AtomicU64,
}

impl TemporaryNameCounter {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Take the current number and advance the counter.
    pub fn next_number(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Take the next number as a `<n>.properties` file name.
    pub fn next_file_name(&self) -> String {
        format!("{}.{}", self.next_number(), EXTENSION)
    }
}

impl Default for TemporaryNameCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter shared by every configuration in the process.
pub static TEMPORARY_NAMES: TemporaryNameCounter = TemporaryNameCounter::new();

/// Default root: `$CASCFG_TEMP_ROOT` if set, else
/// `<home>/TemporaryConfigurationFiles`.
pub fn default_temp_root() -> ConfigResult<PathBuf> {
    if let Some(root) = std::env::var_os(TEMP_ROOT_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(root));
    }
    UserDirs::new()
        .map(|dirs| dirs.home_dir().join(TEMP_ROOT_DIR))
        .ok_or(ConfigError::TempRootUnavailable)
}
