//! Path normalization.
//!
//! Raw path strings coming from callers or from property values pass through
//! a [`PathPolicy`] before touching the filesystem.

use directories::UserDirs;
use path_clean::PathClean;
use std::fmt;
use std::path::{Path, PathBuf};

/// Turns a possibly relative, possibly non-canonical path into the absolute
/// path the filesystem operations use.
pub trait PathPolicy: Send + Sync + fmt::Debug {
    fn adjust(&self, raw: &Path) -> PathBuf;
}

/// Default policy: expand a leading `~`, resolve relative paths against the
/// current directory, then remove `.` and `..` components lexically.
///
/// Symlinks are not resolved and the path does not need to exist.
#[derive(Debug, Clone, Default)]
pub struct StandardPathPolicy {
    base: Option<PathBuf>,
}

impl StandardPathPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `base` instead of the current directory.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn base(&self) -> Option<PathBuf> {
        self.base
            .clone()
            .or_else(|| std::env::current_dir().ok())
    }
}

fn expand_home(raw: &Path) -> Option<PathBuf> {
    let rest = raw.strip_prefix("~").ok()?;
    let home = UserDirs::new()?.home_dir().to_path_buf();
    Some(home.join(rest))
}

impl PathPolicy for StandardPathPolicy {
    fn adjust(&self, raw: &Path) -> PathBuf {
        let expanded = expand_home(raw).unwrap_or_else(|| raw.to_path_buf());
        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            match self.base() {
                Some(base) => base.join(expanded),
                None => expanded,
            }
        };
        absolute.clean()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_is_cleaned() {
        let policy = StandardPathPolicy::new();
        assert_eq!(
            policy.adjust(Path::new("/tmp/a/./b/../c.properties")),
            PathBuf::from("/tmp/a/c.properties")
        );
    }

    #[test]
    fn test_relative_path_uses_base() {
        let policy = StandardPathPolicy::with_base("/srv/app");
        assert_eq!(
            policy.adjust(Path::new("conf/../conf/app.properties")),
            PathBuf::from("/srv/app/conf/app.properties")
        );
    }

    #[test]
    fn test_relative_path_defaults_to_current_dir() {
        let policy = StandardPathPolicy::new();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(policy.adjust(Path::new("x.properties")), cwd.join("x.properties"));
    }

    #[test]
    fn test_home_expansion() {
        let Some(dirs) = UserDirs::new() else {
            return;
        };
        let policy = StandardPathPolicy::new();
        assert_eq!(
            policy.adjust(Path::new("~/conf/a.properties")),
            dirs.home_dir().join("conf/a.properties")
        );
    }

    #[test]
    fn test_tilde_inside_name_is_literal() {
        let policy = StandardPathPolicy::with_base("/base");
        assert_eq!(policy.adjust(Path::new("~x/a")), PathBuf::from("/base/~x/a"));
    }
}
