//! Reference rewriter
//!
//! Walks the tokens of a located function and replaces every short type,
//! function and constant reference with its root-anchored fully qualified
//! name. Nothing else changes: whitespace, comments, member names, labels,
//! `self` / `static` / `parent`, reserved type names and structural tokens
//! such as `...` and `(...)` are copied through untouched.

pub mod error;
pub mod options;
pub mod rewriter;
pub mod traits;

pub use error::RewriteError;
pub use options::{RewriteOptions, UnresolvedPolicy};
pub use rewriter::{Rewritten, rewrite};
pub use traits::ClosureTraits;
