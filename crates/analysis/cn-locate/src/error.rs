//! Locator errors

use cn_span::Span;
use thiserror::Error;

/// Failure to find or synthesize the definition of a function value
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocateError {
    /// No closure keyword starts on the requested line
    #[error("no closure starts on line {line}")]
    NoClosureOnLine {
        /// Requested line
        line: u32,
    },

    /// Closures start on the line but none matches the end line or column
    #[error("no closure on line {line} matches the requested end line or column")]
    NoMatchingExtent {
        /// Requested line
        line: u32,
    },

    /// A closure whose brackets never balance
    #[error("closure starting at byte {} is not balanced", span.start)]
    Unbalanced {
        /// Span of the unbalanced closure
        span: Span,
    },

    /// The owner of a callable reference is not declared in the unit
    #[error("type `{owner}` is not declared in this source")]
    UnknownType {
        /// Owner as given
        owner: String,
    },

    /// A short owner name matches types in several namespaces
    #[error("type `{owner}` matches several declarations: {}", candidates.join(", "))]
    AmbiguousType {
        /// Owner as given
        owner: String,
        /// Fully qualified names of the matching types
        candidates: Vec<String>,
    },

    /// The referenced member or function is not declared
    #[error("`{name}` is not declared in this source")]
    UnknownMember {
        /// Member or function name as given
        name: String,
        /// Span of the owner declaration, if the owner was found
        owner_span: Option<Span>,
    },

    /// A static reference to an instance member
    #[error("`{name}` is an instance member and cannot be referenced statically")]
    NotStatic {
        /// `Owner::member`
        name: String,
        /// Span of the member's `function` keyword
        span: Span,
    },

    /// Abstract and interface members have nothing to synthesize from
    #[error("`{name}` has no body")]
    MissingBody {
        /// `Owner::member`
        name: String,
        /// Span of the member's `function` keyword
        span: Span,
    },
}

impl LocateError {
    /// Whether the error reports an unsupported construct rather than a miss
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::MissingBody { .. })
    }

    /// Source span the error points at, if any
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Unbalanced { span }
            | Self::MissingBody { span, .. }
            | Self::NotStatic { span, .. } => Some(*span),
            Self::UnknownMember { owner_span, .. } => *owner_span,
            Self::NoClosureOnLine { .. }
            | Self::NoMatchingExtent { .. }
            | Self::UnknownType { .. }
            | Self::AmbiguousType { .. } => None,
        }
    }
}
