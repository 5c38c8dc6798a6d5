//! The configuration handle callers hold.

use crate::env::{EnvSource, ProcessEnv};
use crate::error::{ConfigError, ConfigResult};
use crate::lifecycle::{BindingState, DeletionReport, FileBinding, FileLifecycleManager};
use crate::path::{PathPolicy, StandardPathPolicy};
use crate::store::PropertyStore;
use parking_lot::Mutex;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A configuration shared across threads.
///
/// `Configuration` itself is not synchronized; wrap it to share it.
pub type SharedConfiguration = Arc<Mutex<Configuration>>;

/// Cascading key/value configuration with an optional backing file.
///
/// # Example
///
/// ```no_run
/// use cascading_config::Configuration;
///
/// # fn main() -> cascading_config::ConfigResult<()> {
/// let mut config = Configuration::new();
/// config.set_all(["USERNAME=root", "COLOR=blue"])?;
///
/// let path = config.create_file_at("/tmp/app/settings.properties")?;
/// assert_eq!(config.get_or("COLOR", "red"), "blue");
///
/// let report = config.delete_file()?;
/// assert_eq!(report.file, path);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Configuration {
    properties: PropertyStore,
    files: FileLifecycleManager,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration {
    /// Empty configuration reading overrides from the process environment.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Wrap for shared use across threads.
    pub fn into_shared(self) -> SharedConfiguration {
        Arc::new(Mutex::new(self))
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.properties
    }

    // --- Queries ---

    pub fn get(&self, key: &str) -> ConfigResult<String> {
        self.properties.get(key)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.properties.get_or(key, default)
    }

    pub fn get_path(&self, key: &str) -> ConfigResult<PathBuf> {
        self.properties.get_path(key, self.files.policy())
    }

    pub fn get_path_or(&self, key: &str, default: &str) -> PathBuf {
        self.properties.get_path_or(key, default, self.files.policy())
    }

    pub fn get_array(&self, key: &str, delimiter: &str) -> ConfigResult<Vec<String>> {
        self.properties.get_array(key, delimiter)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    // --- Mutation ---

    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> ConfigResult<Option<String>> {
        self.properties.set(key, value)
    }

    pub fn set_all<I, S>(&mut self, entries: I) -> ConfigResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.properties.set_all(entries)
    }

    pub fn set_all_delimited(&mut self, list: &str, delimiter: &str) -> ConfigResult<usize> {
        self.properties.set_all_delimited(list, delimiter)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.properties.remove(key)
    }

    // --- Backing file ---

    pub fn binding(&self) -> &FileBinding {
        self.files.binding()
    }

    pub fn state(&self) -> BindingState {
        self.files.state()
    }

    /// Path of the bound file, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.files.binding().path()
    }

    /// Create an auto-named file under the temporary configuration root.
    pub fn create_file(&mut self) -> ConfigResult<PathBuf> {
        self.files.create_file(&mut self.properties, None)
    }

    /// Create the file at `path`, along with any missing directories.
    pub fn create_file_at(&mut self, path: impl AsRef<Path>) -> ConfigResult<PathBuf> {
        self.files
            .create_file(&mut self.properties, Some(path.as_ref()))
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> ConfigResult<usize> {
        self.files.load(&mut self.properties, path.as_ref())
    }

    pub fn load_from_reader<R: Read>(&mut self, reader: R) -> ConfigResult<usize> {
        self.files.load_from_reader(&mut self.properties, reader)
    }

    /// Re-read the bound file, merging its current contents.
    pub fn reload(&mut self) -> ConfigResult<usize> {
        let path = self
            .config_path()
            .map(Path::to_path_buf)
            .ok_or(ConfigError::Unbound)?;
        self.load(path)
    }

    /// Write the configuration to the bound file.
    pub fn save(&self, comments: Option<&str>) -> ConfigResult<()> {
        let path = self.config_path().ok_or(ConfigError::Unbound)?;
        self.files.store(&self.properties, path, comments)
    }

    /// Write the configuration to `path`; the binding is unchanged.
    pub fn save_to(&self, path: impl AsRef<Path>, comments: Option<&str>) -> ConfigResult<()> {
        self.files
            .store(&self.properties, path.as_ref(), comments)
    }

    pub fn save_to_writer<W: Write>(&self, writer: W, comments: Option<&str>) -> ConfigResult<()> {
        self.files
            .store_to_writer(&self.properties, writer, comments)
    }

    /// Delete the file this configuration created.
    pub fn delete_file(&mut self) -> ConfigResult<DeletionReport> {
        self.files.delete_file()
    }
}

/// Builder for [`Configuration`].
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    env: Option<Arc<dyn EnvSource>>,
    policy: Option<Arc<dyn PathPolicy>>,
    temp_root: Option<PathBuf>,
}

impl ConfigurationBuilder {
    /// Source of overrides consulted before stored values.
    pub fn env_source(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Some(Arc::new(env));
        self
    }

    pub fn path_policy(mut self, policy: impl PathPolicy + 'static) -> Self {
        self.policy = Some(Arc::new(policy));
        self
    }

    /// Directory for auto-named files, instead of the default root.
    pub fn temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn build(self) -> Configuration {
        let env = self.env.unwrap_or_else(|| Arc::new(ProcessEnv));
        let policy = self
            .policy
            .unwrap_or_else(|| Arc::new(StandardPathPolicy::new()));
        Configuration {
            properties: PropertyStore::with_env(env),
            files: FileLifecycleManager::new(policy, self.temp_root),
        }
    }
}
