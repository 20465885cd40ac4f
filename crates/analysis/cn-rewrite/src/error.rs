//! Rewriter errors

use cn_resolve::ImportKind;
use cn_span::Span;
use thiserror::Error;

/// A reference that cannot be rewritten faithfully
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RewriteError {
    /// A short name matched nothing, under [`UnresolvedPolicy::Reject`](crate::UnresolvedPolicy::Reject)
    #[error("{kind} `{name}` does not resolve to an import, a declaration or a built-in")]
    Unresolved {
        /// The name as written
        name: String,
        /// Symbol table it was looked up in
        kind: ImportKind,
        /// Where the name appears
        span: Span,
    },

    /// Syntax the rewriter refuses to approximate
    #[error("{construct} is not supported")]
    Unsupported {
        /// Description of the construct
        construct: String,
        /// Where the construct appears
        span: Span,
    },
}

impl RewriteError {
    /// Source span the error points at
    pub fn span(&self) -> Span {
        match self {
            Self::Unresolved { span, .. } | Self::Unsupported { span, .. } => *span,
        }
    }
}
