//! Creation, loading, storing and deletion of the backing file.

use super::binding::{BindingState, FileBinding};
use super::temp::{default_temp_root, TEMPORARY_NAMES};
use crate::error::{ConfigError, ConfigResult};
use crate::path::PathPolicy;
use crate::properties;
use crate::store::PropertyStore;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of a successful [`FileLifecycleManager::delete_file`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// The deleted file
    pub file: PathBuf,
    /// Directories pruned after the file, innermost first
    pub removed_dirs: Vec<PathBuf>,
}

/// Owns the binding between a [`PropertyStore`] and a file on disk.
///
/// All operations are blocking and take the store they act on explicitly;
/// the manager itself only tracks the binding.
#[derive(Debug)]
pub struct FileLifecycleManager {
    binding: FileBinding,
    policy: Arc<dyn PathPolicy>,
    temp_root: Option<PathBuf>,
}

impl FileLifecycleManager {
    /// `temp_root` overrides the default temporary configuration root.
    pub fn new(policy: Arc<dyn PathPolicy>, temp_root: Option<PathBuf>) -> Self {
        Self {
            binding: FileBinding::default(),
            policy,
            temp_root,
        }
    }

    pub fn binding(&self) -> &FileBinding {
        &self.binding
    }

    pub fn state(&self) -> BindingState {
        self.binding.state()
    }

    pub fn policy(&self) -> &dyn PathPolicy {
        self.policy.as_ref()
    }

    /// Directory under which auto-named files are created.
    pub fn temp_root(&self) -> ConfigResult<PathBuf> {
        match &self.temp_root {
            Some(root) => Ok(root.clone()),
            None => default_temp_root(),
        }
    }

    /// Write `store` to a new file and take ownership of it.
    ///
    /// With no `path` the file is named `<n>.properties` under the temporary
    /// root. Missing parent directories are created; an existing file is
    /// overwritten. Returns the path of the created file.
    pub fn create_file(
        &mut self,
        store: &mut PropertyStore,
        path: Option<&Path>,
    ) -> ConfigResult<PathBuf> {
        let (target, temporary) = match path {
            Some(path) => {
                let target = self.policy.adjust(path);
                info!(path = %target.display(), "Using path");
                (target, false)
            }
            None => {
                let root = self.temp_root()?;
                let target = self.policy.adjust(&root.join(TEMPORARY_NAMES.next_file_name()));
                info!(path = %target.display(), "Using temporary path");
                (target, true)
            }
        };

        if let (true, Some(previous)) = (self.binding.is_owned(), self.binding.path()) {
            warn!(
                previous = %previous.display(),
                "Releasing previously created file; it stays on disk"
            );
        }

        let parent = target.parent().map(Path::to_path_buf).unwrap_or_default();
        let created_root = first_missing_dir(&parent);
        if let Err(e) = create_dirs(&parent, created_root.as_deref()) {
            error!(error = %e, "Unable to create folder(s)");
        }

        let existed = target.exists();
        if existed {
            info!(path = %target.display(), "File exists, proceeding to overwrite");
        }
        let written = write_file(store, &target, None);
        if let Err(e) = &written {
            error!(error = %e, "Unable to write configuration file");
        }

        let failure = if !target.is_file() {
            error!(path = %target.display(), "Unable to create file");
            Some(ConfigError::CreationVerificationFailed {
                path: target.clone(),
            })
        } else if let Err(e) = written {
            // Only a file this call brought into existence is ours to remove.
            if !existed {
                if let Err(remove_err) = fs::remove_file(&target) {
                    warn!(path = %target.display(), error = %remove_err, "Unable to remove partial file");
                }
            }
            Some(e)
        } else {
            None
        };
        if let Some(e) = failure {
            if let Some(root) = &created_root {
                discard_created_dirs(&parent, root);
            }
            return Err(e);
        }
        if !existed {
            info!(path = %target.display(), "Created file");
        }

        // A failed re-read is logged by load_into and leaves the store as written.
        let _ = self.load_into(store, &target);

        self.binding = FileBinding::owned(
            target.clone(),
            temporary,
            created_root.unwrap_or(parent),
        );
        Ok(target)
    }

    /// Merge the properties file at `path` into `store`.
    ///
    /// On failure the store and the binding are unchanged. On success the
    /// configuration becomes bound to `path` without owning it, unless it
    /// already owns a created file, in which case that binding is kept.
    /// Returns the number of entries read.
    pub fn load(&mut self, store: &mut PropertyStore, path: &Path) -> ConfigResult<usize> {
        let target = self.policy.adjust(path);
        let count = self.load_into(store, &target)?;
        if self.binding.is_owned() {
            debug!(path = %target.display(), "Merged into configuration that owns its file");
        } else {
            self.binding = FileBinding::unowned(target);
        }
        Ok(count)
    }

    /// Merge properties read from `reader` into `store`. The binding is not
    /// touched.
    pub fn load_from_reader<R: Read>(
        &self,
        store: &mut PropertyStore,
        reader: R,
    ) -> ConfigResult<usize> {
        match properties::read(reader) {
            Ok(entries) => Ok(store.merge(entries.into_iter().map(|e| (e.key, e.value)))),
            Err(e) => {
                error!(error = %e, "Unable to load properties");
                Err(e)
            }
        }
    }

    /// Write `store` to `path` with an optional leading comment.
    pub fn store(
        &self,
        store: &PropertyStore,
        path: &Path,
        comments: Option<&str>,
    ) -> ConfigResult<()> {
        let target = self.policy.adjust(path);
        write_file(store, &target, comments)?;
        debug!(path = %target.display(), entries = store.len(), "Stored properties");
        Ok(())
    }

    /// Write `store` to `writer` with an optional leading comment.
    pub fn store_to_writer<W: Write>(
        &self,
        store: &PropertyStore,
        writer: W,
        comments: Option<&str>,
    ) -> ConfigResult<()> {
        properties::write(writer, store.iter(), comments)?;
        Ok(())
    }

    /// Delete the file this manager created, then prune the directories that
    /// became empty, up to the directory recorded at creation.
    ///
    /// Refused with [`ConfigError::OwnershipViolation`] when no file was
    /// created; nothing is touched in that case.
    pub fn delete_file(&mut self) -> ConfigResult<DeletionReport> {
        let (file, prune_root) = match (self.binding.is_owned(), self.binding.path()) {
            (true, Some(path)) => (
                path.to_path_buf(),
                self.binding.prune_root().map(Path::to_path_buf),
            ),
            _ => {
                let path = self.binding.path().map(Path::to_path_buf);
                warn!(path = ?path, "No file was created, delete_file() aborted");
                return Err(ConfigError::OwnershipViolation { path });
            }
        };

        match fs::remove_file(&file) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %file.display(), "File was already removed");
            }
            Err(e) => warn!(path = %file.display(), error = %e, "Unable to delete file"),
        }
        if file.exists() {
            error!(path = %file.display(), "File was not deleted");
            return Err(ConfigError::DeletionVerificationFailed { path: file });
        }
        info!(path = %file.display(), "Deleted file");
        self.binding = FileBinding::default();

        let removed_dirs = match (file.parent(), prune_root) {
            (Some(parent), Some(root)) => prune_empty_dirs(parent, &root)?,
            _ => Vec::new(),
        };
        Ok(DeletionReport { file, removed_dirs })
    }

    fn load_into(&self, store: &mut PropertyStore, path: &Path) -> ConfigResult<usize> {
        match read_file(path) {
            Ok(entries) => {
                let count = store.merge(entries.into_iter().map(|e| (e.key, e.value)));
                info!(path = %path.display(), entries = count, "Loaded properties");
                Ok(count)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Unable to load properties");
                Err(e)
            }
        }
    }
}

fn read_file(path: &Path) -> ConfigResult<Vec<properties::Entry>> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    properties::parse(&content)
}

fn write_file(store: &PropertyStore, path: &Path, comments: Option<&str>) -> ConfigResult<()> {
    let to_write_error = |source: io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_write_error)?;
    properties::write(BufWriter::new(file), store.iter(), comments).map_err(to_write_error)
}

/// Top-most ancestor of `dir` (or `dir` itself) that does not exist yet.
fn first_missing_dir(dir: &Path) -> Option<PathBuf> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return None;
    }
    let mut top = dir;
    while let Some(parent) = top.parent() {
        if parent.as_os_str().is_empty() || parent.exists() {
            break;
        }
        top = parent;
    }
    Some(top.to_path_buf())
}

/// Create `dir` and any missing ancestors, `top` being the first of them.
fn create_dirs(dir: &Path, top: Option<&Path>) -> ConfigResult<()> {
    let Some(top) = top else {
        return Ok(());
    };
    info!(path = %dir.display(), "Parent directory does not exist, creating folder(s)");
    fs::create_dir_all(dir).map_err(|source| ConfigError::DirectoryCreation {
        path: dir.to_path_buf(),
        source,
    })?;
    info!(path = %dir.display(), first = %top.display(), "Created folder(s)");
    Ok(())
}

/// Prune whatever part of the chain below `root` a failed creation left behind.
fn discard_created_dirs(parent: &Path, root: &Path) {
    let Some(deepest) = parent
        .ancestors()
        .find(|dir| dir.starts_with(root) && dir.is_dir())
    else {
        return;
    };
    if let Err(e) = prune_empty_dirs(deepest, root) {
        warn!(error = %e, "Unable to remove folders created for the file");
    }
}

fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

/// Remove `start` and its ancestors while they are empty, never going above
/// `boundary`. Returns the removed directories, innermost first.
fn prune_empty_dirs(start: &Path, boundary: &Path) -> ConfigResult<Vec<PathBuf>> {
    let mut removed = Vec::new();
    if !start.starts_with(boundary) {
        warn!(
            start = %start.display(),
            boundary = %boundary.display(),
            "Folder lies outside the prune boundary, skipping"
        );
        return Ok(removed);
    }

    let mut dir = start.to_path_buf();
    loop {
        match is_empty_dir(&dir) {
            Ok(true) => {}
            Ok(false) => {
                debug!(path = %dir.display(), "Folder not empty, stopping");
                break;
            }
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Unable to inspect folder");
                break;
            }
        }

        if let Err(e) = fs::remove_dir(&dir) {
            warn!(path = %dir.display(), error = %e, "Unable to delete folder");
        }
        if dir.exists() {
            error!(path = %dir.display(), "Folder was not deleted");
            return Err(ConfigError::DeletionVerificationFailed { path: dir });
        }
        info!(path = %dir.display(), "Deleted folder");
        removed.push(dir.clone());

        if dir == boundary {
            break;
        }
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => break,
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::StandardPathPolicy;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn manager(temp_root: Option<PathBuf>) -> FileLifecycleManager {
        FileLifecycleManager::new(Arc::new(StandardPathPolicy::new()), temp_root)
    }

    fn isolated_store() -> PropertyStore {
        PropertyStore::with_env(Arc::new(HashMap::new()))
    }

    #[test]
    fn test_create_dirs_reports_top() {
        let base = TempDir::new().unwrap();
        let leaf = base.path().join("x/y/z");
        let top = first_missing_dir(&leaf);
        assert_eq!(top, Some(base.path().join("x")));
        create_dirs(&leaf, top.as_deref()).unwrap();
        assert!(leaf.is_dir());
        assert_eq!(first_missing_dir(&leaf), None);
    }

    #[test]
    fn test_prune_stops_at_boundary() {
        let base = TempDir::new().unwrap();
        let leaf = base.path().join("a/b/c");
        fs::create_dir_all(&leaf).unwrap();

        let removed = prune_empty_dirs(&leaf, &base.path().join("a/b")).unwrap();
        assert_eq!(removed, vec![leaf.clone(), base.path().join("a/b")]);
        assert!(base.path().join("a").is_dir());
    }

    #[test]
    fn test_prune_stops_at_non_empty() {
        let base = TempDir::new().unwrap();
        let leaf = base.path().join("a/b");
        fs::create_dir_all(&leaf).unwrap();
        fs::write(base.path().join("a/keep.txt"), "x").unwrap();

        let removed = prune_empty_dirs(&leaf, &base.path().join("a")).unwrap();
        assert_eq!(removed, vec![leaf]);
        assert!(base.path().join("a/keep.txt").exists());
    }

    #[test]
    fn test_prune_ignores_start_outside_boundary() {
        let base = TempDir::new().unwrap();
        let other = base.path().join("other");
        fs::create_dir_all(&other).unwrap();
        let removed = prune_empty_dirs(&other, &base.path().join("a")).unwrap();
        assert!(removed.is_empty());
        assert!(other.is_dir());
    }

    #[test]
    fn test_create_then_delete() {
        let base = TempDir::new().unwrap();
        let mut files = manager(None);
        let mut store = isolated_store();
        store.set("COLOR", "blue").unwrap();

        let target = base.path().join("x/y/z.properties");
        let created = files.create_file(&mut store, Some(&target)).unwrap();
        assert_eq!(created, target);
        assert_eq!(files.state(), BindingState::BoundOwned);
        assert!(!files.binding().is_temporary());
        assert_eq!(files.binding().prune_root(), Some(base.path().join("x").as_path()));

        let report = files.delete_file().unwrap();
        assert_eq!(report.file, target);
        assert_eq!(
            report.removed_dirs,
            vec![base.path().join("x/y"), base.path().join("x")]
        );
        assert!(base.path().is_dir());
        assert_eq!(files.state(), BindingState::Unbound);
    }

    #[test]
    fn test_create_in_existing_dir_prunes_only_parent() {
        let base = TempDir::new().unwrap();
        let parent = base.path().join("existing");
        fs::create_dir_all(&parent).unwrap();

        let mut files = manager(None);
        let mut store = isolated_store();
        files
            .create_file(&mut store, Some(&parent.join("a.properties")))
            .unwrap();
        assert_eq!(files.binding().prune_root(), Some(parent.as_path()));

        let report = files.delete_file().unwrap();
        assert_eq!(report.removed_dirs, vec![parent.clone()]);
        assert!(base.path().is_dir());
    }

    #[test]
    fn test_create_temporary() {
        let base = TempDir::new().unwrap();
        let root = base.path().join("tmp-configs");
        let mut files = manager(Some(root.clone()));
        let mut store = isolated_store();

        let created = files.create_file(&mut store, None).unwrap();
        assert_eq!(created.parent(), Some(root.as_path()));
        assert!(files.binding().is_temporary());
        let stem = created.file_stem().and_then(|s| s.to_str()).unwrap();
        assert!(stem.parse::<u64>().is_ok());
        assert_eq!(created.extension().and_then(|s| s.to_str()), Some("properties"));
    }

    #[test]
    fn test_create_fails_when_parent_is_a_file() {
        let base = TempDir::new().unwrap();
        let blocker = base.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let mut files = manager(None);
        let mut store = isolated_store();
        let err = files
            .create_file(&mut store, Some(&blocker.join("a.properties")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::CreationVerificationFailed { .. }));
        assert_eq!(files.state(), BindingState::Unbound);
    }

    #[test]
    fn test_create_fails_when_target_is_directory() {
        let base = TempDir::new().unwrap();
        let target = base.path().join("occupied");
        fs::create_dir_all(&target).unwrap();

        let mut files = manager(None);
        let mut store = isolated_store();
        let err = files.create_file(&mut store, Some(&target)).unwrap_err();
        assert!(matches!(err, ConfigError::CreationVerificationFailed { .. }));
        assert!(target.is_dir());
        assert_eq!(files.state(), BindingState::Unbound);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_create_prunes_partial_directory_chain() {
        let base = TempDir::new().unwrap();
        let made = base.path().join("made");
        let target = made.join("n".repeat(300)).join("a.properties");

        let mut files = manager(None);
        let mut store = isolated_store();
        let err = files.create_file(&mut store, Some(&target)).unwrap_err();

        assert!(matches!(err, ConfigError::CreationVerificationFailed { .. }));
        assert!(!made.exists());
        assert!(base.path().is_dir());
        assert_eq!(files.state(), BindingState::Unbound);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_create_over_unwritable_file_is_not_owned() {
        let target = Path::new("/proc/version");
        if !target.is_file() {
            return;
        }
        let mut files = manager(None);
        let mut store = isolated_store();
        store.set("MINE", "1").unwrap();

        let err = files.create_file(&mut store, Some(target)).unwrap_err();

        assert!(matches!(err, ConfigError::Write { .. }));
        assert_eq!(files.state(), BindingState::Unbound);
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["MINE"]);
        assert!(target.is_file());
    }

    #[test]
    fn test_delete_without_ownership() {
        let mut files = manager(None);
        let err = files.delete_file().unwrap_err();
        assert!(matches!(err, ConfigError::OwnershipViolation { path: None }));
    }

    #[test]
    fn test_load_missing_file_leaves_state() {
        let base = TempDir::new().unwrap();
        let mut files = manager(None);
        let mut store = isolated_store();
        store.set("KEEP", "1").unwrap();

        let err = files
            .load(&mut store, &base.path().join("missing.properties"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.is_recoverable());
        assert_eq!(files.state(), BindingState::Unbound);
        assert_eq!(store.raw("KEEP"), Some("1"));
    }

    #[test]
    fn test_load_malformed_file_merges_nothing() {
        let base = TempDir::new().unwrap();
        let path = base.path().join("bad.properties");
        fs::write(&path, "A=1\nB=\\uZZZZ\n").unwrap();

        let mut files = manager(None);
        let mut store = isolated_store();
        assert!(matches!(
            files.load(&mut store, &path),
            Err(ConfigError::Parse { line: 2, .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_keeps_owned_binding() {
        let base = TempDir::new().unwrap();
        let extra = base.path().join("extra.properties");
        fs::write(&extra, "EXTRA=yes\n").unwrap();

        let mut files = manager(None);
        let mut store = isolated_store();
        let created = files
            .create_file(&mut store, Some(&base.path().join("own/a.properties")))
            .unwrap();
        files.load(&mut store, &extra).unwrap();

        assert_eq!(files.state(), BindingState::BoundOwned);
        assert_eq!(files.binding().path(), Some(created.as_path()));
        assert_eq!(store.raw("EXTRA"), Some("yes"));
    }

    #[test]
    fn test_store_propagates_write_errors() {
        let base = TempDir::new().unwrap();
        let files = manager(None);
        let store = isolated_store();
        let err = files
            .store(&store, &base.path().join("no/such/dir/a.properties"), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Write { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_reader_and_writer_do_not_bind() {
        let files = manager(None);
        let mut store = isolated_store();
        let count = files
            .load_from_reader(&mut store, "A=1\nB=2\n".as_bytes())
            .unwrap();
        assert_eq!(count, 2);

        let mut out = Vec::new();
        files.store_to_writer(&store, &mut out, Some("dump")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("#dump\n"));
        assert!(text.ends_with("A=1\nB=2\n"));
        assert_eq!(files.state(), BindingState::Unbound);
    }
}
