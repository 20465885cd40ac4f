//! Integration test utilities for the closure canonicalizer

use anyhow::{Context, Result};
use cn_driver::{
    CanonConfig, CanonError, CanonicalClosure, Canonicalizer, ClosureOrigin, FunctionValue,
    Origin,
};
use cn_lexer::Token;
use cn_vfs::VirtualFileSystem;
use std::fs;
use std::path::{Path, PathBuf};

/// Test fixture helper
pub struct TestFixture {
    /// In-memory file system the canonicalizer reads from
    pub vfs: VirtualFileSystem,
    /// Files registered in the fixture, with their contents
    pub files: Vec<(PathBuf, String)>,
}

impl TestFixture {
    /// Creates a new test fixture
    #[must_use]
    pub fn new() -> Self {
        Self {
            vfs: VirtualFileSystem::new(),
            files: Vec::new(),
        }
    }

    /// Adds a file to the fixture
    ///
    /// Relative paths are placed under a fixed virtual root so that
    /// `__FILE__` and `__DIR__` expand the same on every machine.
    ///
    /// # Errors
    ///
    /// Returns an error if file registration fails
    pub fn add_file(&mut self, path: &str, contents: &str) -> Result<PathBuf> {
        let absolute_path = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            Path::new("/fixtures").join(path)
        };

        self.vfs.add_file(&absolute_path, contents)?;
        self.files.push((absolute_path.clone(), contents.to_string()));
        Ok(absolute_path)
    }

    /// Loads every `.php` file of a directory as a fixture
    ///
    /// # Errors
    ///
    /// Returns an error if directory traversal or file reading fails
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let mut fixture = Self::new();
        let base_path = dir.as_ref();

        let mut entries: Vec<PathBuf> = fs::read_dir(base_path)
            .with_context(|| format!("Failed to read {}", base_path.display()))?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<std::io::Result<_>>()?;
        entries.sort();

        for path in entries {
            if path.is_file() && path.extension().is_some_and(|ext| ext == "php") {
                let contents = fs::read_to_string(&path)?;
                let relative_path = path
                    .strip_prefix(base_path)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .to_string();
                fixture.add_file(&relative_path, &contents)?;
            }
        }

        Ok(fixture)
    }

    /// Canonicalizer reading from this fixture
    pub fn canonicalizer(&self, config: CanonConfig) -> Canonicalizer<VirtualFileSystem> {
        Canonicalizer::new(self.vfs.clone(), config)
    }

    /// Contents registered under `path`
    ///
    /// # Errors
    ///
    /// Returns an error if no such file was added
    pub fn contents(&self, path: &Path) -> Result<&str> {
        self.files
            .iter()
            .find(|(file, _)| file == path)
            .map(|(_, contents)| contents.as_str())
            .with_context(|| format!("no fixture file {}", path.display()))
    }

    /// Function value for the closure on the first line of `path` that
    /// contains `needle`
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unknown or no line contains `needle`
    pub fn closure(&self, path: &Path, needle: &str) -> Result<FunctionValue> {
        let line = line_containing(self.contents(path)?, needle)
            .with_context(|| format!("`{needle}` not found in {}", path.display()))?;
        Ok(FunctionValue::new(path, ClosureOrigin::at_line(line)))
    }

    /// Canonicalize `origin` in `path` with the default configuration
    pub fn canonicalize(
        &self,
        path: &Path,
        origin: impl Into<Origin>,
    ) -> Result<CanonicalClosure, CanonError> {
        self.canonicalizer(CanonConfig::default())
            .canonicalize(&FunctionValue::new(path, origin))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// 1-based number of the first line of `text` containing `needle`
pub fn line_containing(text: &str, needle: &str) -> Option<u32> {
    let index = text.lines().position(|line| line.contains(needle))?;
    u32::try_from(index + 1).ok()
}

/// One `Kind "text"` line per significant token
pub fn dump_tokens<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    tokens
        .into_iter()
        .filter(|token| !token.is_trivia())
        .map(|token| format!("{:?} {:?}\n", token.kind, token.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_containing() {
        let text = "<?php\n$a = 1;\n$f = fn () => $a;\n";
        assert_eq!(line_containing(text, "fn ()"), Some(3));
        assert_eq!(line_containing(text, "<?php"), Some(1));
        assert_eq!(line_containing(text, "missing"), None);
    }

    #[test]
    fn test_relative_paths_get_a_fixed_root() {
        let mut fixture = TestFixture::new();
        let path = fixture.add_file("a.php", "<?php\n").unwrap();
        assert_eq!(path, PathBuf::from("/fixtures/a.php"));
        assert_eq!(fixture.contents(&path).unwrap(), "<?php\n");
    }
}
