//! Virtual File System for managing source files
//!
//! Supplies source text to the canonicalizer: either from disk or from
//! contents registered in memory (useful for tests and editor buffers).

use anyhow::Result;
use cn_span::FileId;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Something that can hand out the full text of a source file
pub trait SourceProvider: Send + Sync {
    /// Returns the current text of the file at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be obtained
    fn source_text(&self, path: &Path) -> Result<Arc<str>>;
}

/// Virtual File System that tracks source files
pub struct VirtualFileSystem {
    inner: Arc<RwLock<VfsInner>>,
}

struct VfsInner {
    files: FxHashMap<FileId, FileData>,
    paths: FxHashMap<PathBuf, FileId>,
    next_id: u32,
}

/// Data associated with a file
#[derive(Clone, Debug)]
pub struct FileData {
    /// Path the file was registered under
    pub path: PathBuf,
    /// File contents (if loaded)
    pub contents: Option<Arc<str>>,
}

impl VirtualFileSystem {
    /// Creates a new empty virtual file system
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(VfsInner {
                files: FxHashMap::default(),
                paths: FxHashMap::default(),
                next_id: 0,
            })),
        }
    }

    /// Registers a file path and returns its ID
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned
    pub fn register_file(&self, path: impl AsRef<Path>) -> Result<FileId> {
        let path = path.as_ref().to_path_buf();
        let mut inner = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("Lock poisoned"))?;

        if let Some(&file_id) = inner.paths.get(&path) {
            return Ok(file_id);
        }

        let file_id = FileId::new(inner.next_id);
        inner.next_id += 1;

        inner.files.insert(
            file_id,
            FileData {
                path: path.clone(),
                contents: None,
            },
        );
        inner.paths.insert(path, file_id);

        Ok(file_id)
    }

    /// Loads file contents from disk, replacing any cached contents
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the lock is poisoned
    pub fn load_file(&self, file_id: FileId) -> Result<Arc<str>> {
        let path = self.get_file_path(file_id)?;
        let contents: Arc<str> = std::fs::read_to_string(&path)
            .map_err(|err| anyhow::anyhow!("Failed to read {}: {err}", path.display()))?
            .into();
        tracing::debug!(path = %path.display(), bytes = contents.len(), "loaded source from disk");

        let mut inner = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("Lock poisoned"))?;
        if let Some(file_data) = inner.files.get_mut(&file_id) {
            file_data.contents = Some(Arc::clone(&contents));
        }

        Ok(contents)
    }

    /// Sets file contents (useful for testing or in-memory files)
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned or file doesn't exist
    pub fn set_file_contents(&self, file_id: FileId, contents: impl Into<Arc<str>>) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("Lock poisoned"))?;
        let file_data = inner
            .files
            .get_mut(&file_id)
            .ok_or_else(|| anyhow::anyhow!("File not found: {file_id}"))?;
        file_data.contents = Some(contents.into());
        Ok(())
    }

    /// Registers `path` and sets its contents in one step
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Arc<str>>) -> Result<FileId> {
        let file_id = self.register_file(path)?;
        self.set_file_contents(file_id, contents)?;
        Ok(file_id)
    }

    /// Gets cached file contents (if available)
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned
    pub fn get_file_contents(&self, file_id: FileId) -> Result<Option<Arc<str>>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| anyhow::anyhow!("Lock poisoned"))?;
        Ok(inner
            .files
            .get(&file_id)
            .and_then(|data| data.contents.clone()))
    }

    /// Gets file path
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned or file doesn't exist
    pub fn get_file_path(&self, file_id: FileId) -> Result<PathBuf> {
        let inner = self
            .inner
            .read()
            .map_err(|_| anyhow::anyhow!("Lock poisoned"))?;
        Ok(inner
            .files
            .get(&file_id)
            .ok_or_else(|| anyhow::anyhow!("File not found: {file_id}"))?
            .path
            .clone())
    }
}

impl SourceProvider for VirtualFileSystem {
    fn source_text(&self, path: &Path) -> Result<Arc<str>> {
        let file_id = self.register_file(path)?;
        match self.get_file_contents(file_id)? {
            Some(contents) => Ok(contents),
            None => self.load_file(file_id),
        }
    }
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for VirtualFileSystem {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_duplicate_registration() {
        let vfs = VirtualFileSystem::new();
        let id1 = vfs.register_file("test.php").unwrap();
        let id2 = vfs.register_file("test.php").unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_in_memory_contents_win_over_disk() {
        let vfs = VirtualFileSystem::new();
        vfs.add_file("/virtual/a.php", "<?php echo 1;").unwrap();
        let text = vfs.source_text(Path::new("/virtual/a.php")).unwrap();
        assert_eq!(&*text, "<?php echo 1;");
    }

    #[test]
    fn test_loads_from_disk_once_registered() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<?php\n$f = fn () => 1;\n").unwrap();

        let vfs = VirtualFileSystem::new();
        let text = vfs.source_text(file.path()).unwrap();
        assert!(text.starts_with("<?php"));

        let file_id = vfs.register_file(file.path()).unwrap();
        let cached = vfs.get_file_contents(file_id).unwrap();
        assert_eq!(cached.as_deref(), Some(&*text));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let vfs = VirtualFileSystem::new();
        assert!(vfs.source_text(Path::new("/definitely/not/here.php")).is_err());
    }
}
