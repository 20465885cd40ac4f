//! Rewriter options

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// What to do with a short name that resolves to nothing
#[derive(Copy, Clone, Debug, Default, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Root-anchor it as a global reference and report it
    #[default]
    #[display("anchor")]
    Anchor,
    /// Fail the rewrite
    #[display("reject")]
    Reject,
}

/// Rewriter settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    /// Replace `__FILE__`, `__DIR__` and `__NAMESPACE__` with string literals
    pub expand_magic_constants: bool,
    /// What to do with names that resolve to nothing
    pub policy: UnresolvedPolicy,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            expand_magic_constants: true,
            policy: UnresolvedPolicy::Anchor,
        }
    }
}
