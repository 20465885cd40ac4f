//! Canonicalizer configuration, usually read from `canon.toml`

use anyhow::{Context, Result};
use cn_rewrite::{RewriteOptions, UnresolvedPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings shared by every canonicalization run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanonConfig {
    /// What to do with names that match no import, declaration or built-in
    pub unresolved: UnresolvedPolicy,

    /// Replace `__FILE__`, `__DIR__` and `__NAMESPACE__` with literals
    pub expand_magic_constants: bool,

    /// Share analyzed sources through the process-wide cache
    pub use_cache: bool,
}

impl Default for CanonConfig {
    fn default() -> Self {
        Self {
            unresolved: UnresolvedPolicy::Anchor,
            expand_magic_constants: true,
            use_cache: true,
        }
    }
}

impl CanonConfig {
    /// Load a config from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Parse a config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid canon config")
    }

    /// Options handed to the rewriter
    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            expand_magic_constants: self.expand_magic_constants,
            policy: self.unresolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = CanonConfig::from_toml("").unwrap();
        assert_eq!(config, CanonConfig::default());
        assert_eq!(config.rewrite_options(), RewriteOptions::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "unresolved = \"reject\"\nuse_cache = false").unwrap();

        let config = CanonConfig::from_file(file.path()).unwrap();
        assert_eq!(config.unresolved, UnresolvedPolicy::Reject);
        assert!(!config.use_cache);
        assert!(config.expand_magic_constants);
        assert_eq!(config.rewrite_options().policy, UnresolvedPolicy::Reject);
    }

    #[test]
    fn test_rejects_unknown_keys_and_missing_files() {
        assert!(CanonConfig::from_toml("colour = true").is_err());
        assert!(CanonConfig::from_toml("unresolved = \"ignore\"").is_err());

        let error = CanonConfig::from_file("/no/such/canon.toml").unwrap_err();
        assert!(error.to_string().contains("Failed to read config"));
    }
}
