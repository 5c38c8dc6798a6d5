//! Sources of environment overrides.
//!
//! The store consults an [`EnvSource`] before its own values. In production
//! this is the process environment; tests and embedders can supply a map.

use std::collections::HashMap;
use std::fmt;

/// Lookup of override values by exact key.
pub trait EnvSource: Send + Sync + fmt::Debug {
    /// Return the override for `key`, if one is defined.
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the live process environment.
///
/// Variables whose value is not valid Unicode are treated as undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return None;
        }
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
