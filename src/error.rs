//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while querying, loading, storing or managing a
/// configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key resolved neither from the environment nor from the store
    #[error("Configuration key not found: {key}")]
    KeyNotFound { key: String },

    /// Bulk entry without a `key=value` shape
    #[error("Malformed entry '{entry}': expected KEY=VALUE")]
    MalformedEntry { entry: String },

    /// Keys must be non-empty
    #[error("Configuration keys must not be empty")]
    EmptyKey,

    /// Array delimiter must be non-empty
    #[error("Delimiter must not be empty")]
    InvalidDelimiter,

    /// Properties file not found at the resolved path
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read a properties file
    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a properties file
    #[error("Failed to write configuration file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure on a caller-supplied reader or writer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Properties text could not be decoded
    #[error("Malformed properties content at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Parent directories of a target file could not be created
    #[error("Unable to create directories '{path}': {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is missing after `create_file` wrote it
    #[error("Configuration file '{path}' was not created")]
    CreationVerificationFailed { path: PathBuf },

    /// File or pruned directory still exists after deletion
    #[error("'{path}' was not deleted")]
    DeletionVerificationFailed { path: PathBuf },

    /// Deletion refused because this instance did not create the file
    #[error("Refusing to delete {}: no file was created by this configuration", describe(.path))]
    OwnershipViolation { path: Option<PathBuf> },

    /// Operation needs a bound file but the configuration has none
    #[error("No configuration file is bound")]
    Unbound,

    /// No temporary root configured and no home directory to derive one from
    #[error("Unable to resolve the temporary configuration directory")]
    TempRootUnavailable,
}

fn describe(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!("'{}'", path.display()),
        None => "unbound configuration".to_string(),
    }
}

impl ConfigError {
    /// Create a key-not-found error
    pub fn key_not_found<K: Into<String>>(key: K) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Create a malformed-entry error
    pub fn malformed<E: Into<String>>(entry: E) -> Self {
        Self::MalformedEntry {
            entry: entry.into(),
        }
    }

    /// Create a parse error for the given 1-based line
    pub fn parse<M: Into<String>>(line: usize, message: M) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Whether the failure leaves the configuration usable as it was.
    ///
    /// Load-side failures and refused deletions are soft: they are logged and
    /// the store and binding are unchanged. Write and postcondition failures
    /// are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::KeyNotFound { .. }
                | Self::NotFound(_)
                | Self::Read { .. }
                | Self::Parse { .. }
                | Self::OwnershipViolation { .. }
        )
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
