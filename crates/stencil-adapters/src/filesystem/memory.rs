//! In-memory filesystem adapter for testing.
//!
//! Modification times come from a logical clock that advances on every
//! write, so "newer than" checks are deterministic.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use stencil_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{StencilError, StencilResult},
};

/// In-memory filesystem for testing.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, (String, u64)>,
    directories: BTreeSet<PathBuf>,
    clock: u64,
}

impl MemoryFilesystemInner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn add_directories(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Add a file, creating its parents (testing helper).
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        self.put(path, content);
        self
    }

    /// Write a file, creating its parents (testing helper).
    pub fn put(&self, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref();
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        if let Some(parent) = path.parent() {
            inner.add_directories(parent);
        }
        let tick = inner.tick();
        inner
            .files
            .insert(path.to_path_buf(), (content.to_string(), tick));
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).map(|(c, _)| c.clone())
    }

    /// Advance a file's modification time without changing it.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        let tick = inner.tick();
        if let Some(entry) = inner.files.get_mut(path.as_ref()) {
            entry.1 = tick;
        }
    }

    /// All file paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn lock_error() -> StencilError {
        StencilError::Internal {
            message: "memory filesystem lock poisoned".into(),
        }
    }

    fn not_found(path: &Path) -> StencilError {
        ApplicationError::FilesystemError {
            path: path.to_path_buf(),
            reason: "No such file".into(),
        }
        .into()
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &Path) -> bool {
        let inner = self.inner.read().unwrap();
        inner.files.contains_key(path) || inner.directories.contains(path)
    }

    fn read_to_string(&self, path: &Path) -> StencilResult<String> {
        let inner = self.inner.read().map_err(|_| Self::lock_error())?;
        inner
            .files
            .get(path)
            .map(|(content, _)| content.clone())
            .ok_or_else(|| Self::not_found(path))
    }

    fn write_file(&self, path: &Path, content: &str) -> StencilResult<()> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_error())?;

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        let tick = inner.tick();
        inner
            .files
            .insert(path.to_path_buf(), (content.to_string(), tick));
        Ok(())
    }

    fn modification_time(&self, path: &Path) -> StencilResult<SystemTime> {
        let inner = self.inner.read().map_err(|_| Self::lock_error())?;
        inner
            .files
            .get(path)
            .map(|(_, tick)| UNIX_EPOCH + Duration::from_secs(*tick))
            .ok_or_else(|| Self::not_found(path))
    }

    fn create_dir_all(&self, path: &Path) -> StencilResult<()> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_error())?;
        inner.add_directories(path);
        Ok(())
    }

    fn list_files(&self, dir: &Path, extension: &str) -> StencilResult<Vec<PathBuf>> {
        let inner = self.inner.read().map_err(|_| Self::lock_error())?;
        Ok(inner
            .files
            .keys()
            .filter(|p| p.starts_with(dir))
            .filter(|p| p.extension().is_some_and(|e| e == extension))
            .cloned()
            .collect())
    }
}
