//! Relationship between a configuration and the file behind it.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where a configuration stands with respect to its backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingState {
    /// No file associated
    Unbound,
    /// File created by this configuration; it may delete it
    BoundOwned,
    /// File loaded from elsewhere; deletion is refused
    BoundUnowned,
}

/// Backing file of a configuration.
///
/// `owned` implies `path` is set: owned bindings are only built by
/// [`FileBinding::owned`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileBinding {
    path: Option<PathBuf>,
    owned: bool,
    temporary: bool,
    prune_root: Option<PathBuf>,
}

impl FileBinding {
    pub(crate) fn owned(path: PathBuf, temporary: bool, prune_root: PathBuf) -> Self {
        Self {
            path: Some(path),
            owned: true,
            temporary,
            prune_root: Some(prune_root),
        }
    }

    pub(crate) fn unowned(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            ..Self::default()
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Whether the file lives under the temporary configuration root.
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Highest directory that deletion may prune: the first directory
    /// created alongside the file, or its immediate parent.
    pub fn prune_root(&self) -> Option<&Path> {
        self.prune_root.as_deref()
    }

    pub fn state(&self) -> BindingState {
        match (&self.path, self.owned) {
            (None, _) => BindingState::Unbound,
            (Some(_), true) => BindingState::BoundOwned,
            (Some(_), false) => BindingState::BoundUnowned,
        }
    }
}
