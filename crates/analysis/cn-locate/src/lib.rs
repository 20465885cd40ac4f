//! Function locator
//!
//! Turns the origin of a function value into the tokens that define it. A
//! literal closure is found by its start line (narrowed by end line and
//! column when several closures share a line). A first-class callable
//! reference has no literal body at the reference site, so an equivalent
//! closure is synthesized from the referenced member's declaration.

pub mod callable;
pub mod closure;
pub mod error;
pub mod origin;

pub use callable::{SynthesizedFunction, synthesize};
pub use closure::locate_closure;
pub use error::LocateError;
pub use origin::{CallableReference, ClosureOrigin, Dispatch, Origin};

use cn_lexer::SourceUnit;
use cn_resolve::{ScopeId, ScopeTable};
use cn_span::Span;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Syntactic form of a located function
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionForm {
    /// `function (…) { … }`
    #[display("closure")]
    Closure,
    /// `fn (…) => …`
    #[display("arrow")]
    Arrow,
    /// A member body lifted out of its declaration
    #[display("member")]
    Member,
}

/// The tokens of one function definition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSpan {
    /// Indices into the unit's token stream, trivia included
    pub tokens: Range<usize>,
    /// Bytes from the first to the last token
    pub span: Span,
    /// Closure, arrow function or member
    pub form: FunctionForm,
    /// Frame enclosing the definition
    pub frame: ScopeId,
}

/// Result of locating a function value
#[derive(Clone, Debug)]
pub enum Located {
    /// A closure written in source
    Literal(FunctionSpan),
    /// A closure built for a callable reference
    Synthesized(SynthesizedFunction),
}

impl Located {
    /// The source tokens to rewrite
    pub fn body(&self) -> &FunctionSpan {
        match self {
            Self::Literal(span) => span,
            Self::Synthesized(function) => &function.body,
        }
    }

    /// Dispatch of a synthesized closure
    pub fn dispatch(&self) -> Option<Dispatch> {
        match self {
            Self::Literal(_) => None,
            Self::Synthesized(function) => Some(function.dispatch),
        }
    }
}

/// Locate the definition of the function value described by `origin`
///
/// # Errors
///
/// Returns a [`LocateError`] when no closure matches the position hint, when
/// the referenced member is not declared, or when it has no body.
pub fn locate(
    unit: &SourceUnit,
    table: &ScopeTable,
    origin: &Origin,
) -> Result<Located, LocateError> {
    match origin {
        Origin::Closure(hint) => locate_closure(unit, table, hint).map(Located::Literal),
        Origin::Callable(reference) => {
            synthesize(unit, table, reference).map(Located::Synthesized)
        }
    }
}
