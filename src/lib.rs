//! Cascading Configuration Library
//!
//! A key/value configuration that resolves values through the environment,
//! then a properties file, then the caller's default, and that manages the
//! lifecycle of the file behind it.
//!
//! # Modules
//!
//! - `config`: The `Configuration` handle and its builder
//! - `store`: Ordered property store with cascading lookup
//! - `lifecycle`: File creation, loading, storing and bounded deletion
//! - `properties`: Properties text format reader and writer
//! - `env`: Sources of environment overrides
//! - `path`: Path normalization policy
//! - `error`: Unified error handling
//! - `logging`: Subscriber setup for the command-line tool
//!
//! # Concurrency
//!
//! Every operation is synchronous and blocks on filesystem I/O without a
//! timeout. A `Configuration` is not synchronized; share it through
//! [`SharedConfiguration`] or keep it on one thread. Temporary file names come
//! from a process-wide atomic counter and stay unique across instances.

pub mod config;
pub mod env;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod path;
pub mod properties;
pub mod store;

// Re-export commonly used types for convenience
pub use config::{Configuration, ConfigurationBuilder, SharedConfiguration};
pub use env::{EnvSource, ProcessEnv};
pub use error::{ConfigError, ConfigResult};
pub use lifecycle::{BindingState, DeletionReport, FileBinding, FileLifecycleManager};
pub use path::{PathPolicy, StandardPathPolicy};
pub use store::PropertyStore;
