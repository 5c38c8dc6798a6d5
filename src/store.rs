//! Ordered key/value store with cascading lookup.
//!
//! Lookups resolve in this order:
//!
//! 1. the environment source (process environment by default)
//! 2. the stored value
//! 3. the caller's default, when one is given
//!
//! An environment variable therefore overrides a file-backed value without
//! editing the file. There is no way to mark a value as non-overridable.

use crate::env::{EnvSource, ProcessEnv};
use crate::error::{ConfigError, ConfigResult};
use crate::path::PathPolicy;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Insertion-ordered string mapping exposing only the cascading API.
#[derive(Debug, Clone)]
pub struct PropertyStore {
    entries: IndexMap<String, String>,
    env: Arc<dyn EnvSource>,
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyStore {
    /// Create an empty store that consults the process environment.
    pub fn new() -> Self {
        Self::with_env(Arc::new(ProcessEnv))
    }

    /// Create an empty store with a custom override source.
    pub fn with_env(env: Arc<dyn EnvSource>) -> Self {
        Self {
            entries: IndexMap::new(),
            env,
        }
    }

    /// Resolve `key` through the environment and then the store.
    pub fn resolve(&self, key: &str) -> Option<String> {
        if let Some(value) = self.env.var(key) {
            debug!(key, "Value resolved from environment");
            return Some(value);
        }
        self.entries.get(key).cloned()
    }

    /// Resolve `key`, failing with [`ConfigError::KeyNotFound`] when neither
    /// the environment nor the store defines it.
    pub fn get(&self, key: &str) -> ConfigResult<String> {
        self.resolve(key)
            .ok_or_else(|| ConfigError::key_not_found(key))
    }

    /// Resolve `key`, falling back to `default`.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.resolve(key).unwrap_or_else(|| default.to_string())
    }

    /// Resolve `key` and normalize the value as a path.
    pub fn get_path(&self, key: &str, policy: &dyn PathPolicy) -> ConfigResult<PathBuf> {
        let raw = self.get(key)?;
        Ok(policy.adjust(raw.as_ref()))
    }

    /// Resolve `key` with a default and normalize the value as a path.
    pub fn get_path_or(&self, key: &str, default: &str, policy: &dyn PathPolicy) -> PathBuf {
        let raw = self.get_or(key, default);
        policy.adjust(raw.as_ref())
    }

    /// Resolve `key` and split the value on `delimiter`.
    ///
    /// Elements are trimmed and trailing empty elements dropped, so
    /// `"apple, pear ,banana,"` yields `["apple", "pear", "banana"]`. The
    /// delimiter cannot be escaped inside an element.
    pub fn get_array(&self, key: &str, delimiter: &str) -> ConfigResult<Vec<String>> {
        if delimiter.is_empty() {
            return Err(ConfigError::InvalidDelimiter);
        }
        let value = self.get(key)?;
        let mut items: Vec<String> = value
            .split(delimiter)
            .map(|item| item.trim().to_string())
            .collect();
        while items.last().is_some_and(|item| item.is_empty()) {
            items.pop();
        }
        Ok(items)
    }

    /// The stored value for `key`, ignoring environment overrides.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Store `value` under `key`, returning the previous stored value.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> ConfigResult<Option<String>> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        Ok(self.entries.insert(key, value.into()))
    }

    /// Apply `KEY=VALUE` entries.
    ///
    /// Each entry is split on its first `=` and both sides are trimmed, so a
    /// value may itself contain `=`. All entries are validated before any is
    /// applied: one malformed entry rejects the whole batch. Returns the
    /// number of entries applied.
    pub fn set_all<I, S>(&mut self, entries: I) -> ConfigResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = entries
            .into_iter()
            .map(|entry| split_assignment(entry.as_ref()))
            .collect::<ConfigResult<Vec<_>>>()?;
        let count = parsed.len();
        self.entries.extend(parsed);
        Ok(count)
    }

    /// Apply `KEY=VALUE` entries packed into one string separated by
    /// `delimiter`. Blank segments are ignored.
    ///
    /// Use a delimiter that does not occur inside values, e.g. `;` when a
    /// value is itself a comma-separated list.
    pub fn set_all_delimited(&mut self, list: &str, delimiter: &str) -> ConfigResult<usize> {
        if delimiter.is_empty() {
            return Err(ConfigError::InvalidDelimiter);
        }
        self.set_all(list.split(delimiter).filter(|s| !s.trim().is_empty()))
    }

    /// Merge pairs into the store; existing keys are overwritten.
    pub(crate) fn merge<I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let before = self.entries.len();
        let mut count = 0;
        for (key, value) in pairs {
            self.entries.insert(key, value);
            count += 1;
        }
        debug!(
            merged = count,
            added = self.entries.len() - before,
            "Merged properties"
        );
        count
    }

    /// Remove `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    /// Whether the store itself holds `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Stored entries in insertion order, without environment overrides.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for PropertyStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

fn split_assignment(entry: &str) -> ConfigResult<(String, String)> {
    let (key, value) = entry
        .split_once('=')
        .ok_or_else(|| ConfigError::malformed(entry))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::malformed(entry));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
