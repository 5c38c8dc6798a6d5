//! Shared test utilities for cascading configuration tests.
//!
//! This module provides:
//! - Filesystem sandboxes rooted in a temporary directory
//! - Configurations isolated from the process environment
//! - Helpers to read property files back independently of a configuration

#![allow(dead_code)]

use cascading_config::{properties, Configuration};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory that also serves as the temporary configuration root.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create sandbox"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Root used for auto-named files in this sandbox.
    pub fn temp_root(&self) -> PathBuf {
        self.join("TemporaryConfigurationFiles")
    }

    /// Configuration whose overrides come only from `env`.
    pub fn config_with_env(&self, env: &[(&str, &str)]) -> Configuration {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Configuration::builder()
            .env_source(env)
            .temp_root(self.temp_root())
            .build()
    }

    /// Configuration with no environment overrides at all.
    pub fn config(&self) -> Configuration {
        self.config_with_env(&[])
    }

    /// Configuration reading the real process environment.
    pub fn process_config(&self) -> Configuration {
        Configuration::builder().temp_root(self.temp_root()).build()
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent");
        }
        std::fs::write(&path, content).expect("failed to write fixture");
        path
    }
}

/// Parse a property file directly, bypassing `Configuration`.
pub fn read_entries(path: &Path) -> Vec<(String, String)> {
    let content = std::fs::read_to_string(path).expect("failed to read property file");
    properties::parse(&content)
        .expect("property file should parse")
        .into_iter()
        .map(|e| (e.key, e.value))
        .collect()
}

/// Stored entries of a configuration as owned pairs, in order.
pub fn entries_of(config: &Configuration) -> Vec<(String, String)> {
    config
        .properties()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
