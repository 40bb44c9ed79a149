//! The filesystem collaborator behind discovery and emission. Injected as a
//! trait so the walk can be exercised against an in-memory tree.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GenError, Result};

/// Directory and file access used by discovery and emission. All operations
/// are synchronous; listings are returned sorted by name so traversal order
/// is deterministic across platforms.
pub trait Vfs {
    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    /// Immediate subdirectories of `dir`, sorted by name.
    fn sub_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Files in `dir` (non-recursive) whose extension equals `ext`, sorted
    /// by name.
    fn source_files(&self, dir: &Path, ext: &str) -> Result<Vec<PathBuf>>;

    fn read(&self, path: &Path) -> Result<String>;

    /// Contents of `path`, or `None` when it does not exist. Used for the
    /// write-if-changed comparison.
    fn read_if_exists(&self, path: &Path) -> Result<Option<String>>;

    fn write(&self, path: &Path, text: &str) -> Result<()>;

    /// Drops write protection from `path` if it exists. No-op otherwise.
    fn make_writable(&self, path: &Path) -> Result<()>;
}

/// The real filesystem.
#[derive(Debug, Default)]
pub struct OsVfs;

impl OsVfs {
    fn list(&self, dir: &Path, keep_dirs: bool, ext: Option<&str>) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| GenError::list(dir, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GenError::list(dir, e))?;
            let path = entry.path();
            let matches = if keep_dirs {
                path.is_dir()
            } else {
                path.is_file()
                    && ext.is_some_and(|ext| {
                        path.extension().and_then(|e| e.to_str()) == Some(ext)
                    })
            };
            if matches {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl Vfs for OsVfs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn sub_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.list(dir, true, None)
    }

    fn source_files(&self, dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
        self.list(dir, false, Some(ext))
    }

    fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| GenError::read(path, e))
    }

    fn read_if_exists(&self, path: &Path) -> Result<Option<String>> {
        if !path.is_file() {
            return Ok(None);
        }
        self.read(path).map(Some)
    }

    fn write(&self, path: &Path, text: &str) -> Result<()> {
        fs::write(path, text).map_err(|e| GenError::write(path, e))
    }

    fn make_writable(&self, path: &Path) -> Result<()> {
        let Ok(metadata) = fs::metadata(path) else {
            return Ok(());
        };
        let mut permissions = metadata.permissions();
        if permissions.readonly() {
            tracing::info!("removing write protection from {}", path.display());
            permissions.set_readonly(false);
            fs::set_permissions(path, permissions).map_err(|e| GenError::write(path, e))?;
        }
        Ok(())
    }
}

/// An in-memory tree for hermetic tests. Tracks how many writes were
/// performed so idempotence can be asserted.
#[derive(Debug, Default)]
pub struct MemoryVfs {
    files: RefCell<BTreeMap<PathBuf, String>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    writes: Cell<usize>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a directory (and its ancestors), which may stay empty.
    pub fn add_dir(&self, dir: impl Into<PathBuf>) {
        let mut dir = dir.into();
        loop {
            self.dirs.borrow_mut().insert(dir.clone());
            match dir.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => dir = parent.to_path_buf(),
                _ => break,
            }
        }
    }

    /// Adds a file, registering its parent directories.
    pub fn add_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.add_dir(parent);
            }
        }
        self.files.borrow_mut().insert(path, contents.into());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Number of writes performed through the `Vfs` interface; seeding via
    /// `add_file` does not count.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl Vfs for MemoryVfs {
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.borrow().contains(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn sub_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .dirs
            .borrow()
            .iter()
            .filter(|d| d.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn source_files(&self, dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|p| {
                p.parent() == Some(dir) && p.extension().and_then(|e| e.to_str()) == Some(ext)
            })
            .cloned()
            .collect())
    }

    fn read(&self, path: &Path) -> Result<String> {
        self.contents(path).ok_or_else(|| {
            GenError::read(path, std::io::Error::from(std::io::ErrorKind::NotFound))
        })
    }

    fn read_if_exists(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.contents(path))
    }

    fn write(&self, path: &Path, text: &str) -> Result<()> {
        self.writes.set(self.writes.get() + 1);
        self.add_file(path.to_path_buf(), text);
        Ok(())
    }

    fn make_writable(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
