//! Rich error reporting for the canonicalizer
//!
//! Note: These struct fields are read by miette's `#[derive(Diagnostic)]`
//! expansion, which clippy cannot see through.

#![allow(unused_assignments)]

use cn_lexer::SourceUnit;
use cn_locate::LocateError;
use cn_rewrite::RewriteError;
use cn_span::Span;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Failure to canonicalize a function value
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CanonError {
    /// The text of the originating file could not be obtained
    #[error("cannot read `{path}`: {reason}")]
    #[diagnostic(
        code(canon::source_unavailable),
        help("check that the file exists and is readable")
    )]
    SourceUnavailable {
        /// File that was asked for
        path: String,
        /// Why the provider failed
        reason: String,
    },

    /// No function definition matches the given origin
    #[error("{message}")]
    #[diagnostic(code(canon::span_not_found))]
    SpanNotFound {
        /// What the locator reported
        message: String,
        /// Where the search was anchored, when known
        #[label("searched here")]
        span: Option<SourceSpan>,
        /// Source code for context
        #[source_code]
        src: NamedSource<String>,
    },

    /// A short name matched nothing while unresolved names are rejected
    #[error("cannot resolve {kind} `{name}`")]
    #[diagnostic(
        code(canon::unresolved_reference),
        help("import it with `use`, declare it, or write it fully qualified")
    )]
    UnresolvedReference {
        /// The name as written
        name: String,
        /// `type`, `function` or `constant`
        kind: String,
        /// Source location
        #[label("not imported, declared or built in")]
        span: SourceSpan,
        /// Source code for context
        #[source_code]
        src: NamedSource<String>,
    },

    /// A construct that is reported instead of approximated
    #[error("{construct} is not supported")]
    #[diagnostic(code(canon::unsupported_construct))]
    UnsupportedConstruct {
        /// Description of the construct
        construct: String,
        /// Source location
        #[label("unsupported")]
        span: SourceSpan,
        /// Source code for context
        #[source_code]
        src: NamedSource<String>,
    },
}

impl CanonError {
    /// Wraps a locator failure, keeping the unit's text for rendering
    pub fn from_locate(error: LocateError, unit: &SourceUnit) -> Self {
        if error.is_unsupported() {
            let span = error.span().unwrap_or_default();
            return Self::UnsupportedConstruct {
                construct: error.to_string(),
                span: source_span(span),
                src: named_source(unit),
            };
        }

        let span = match &error {
            LocateError::NoClosureOnLine { line } | LocateError::NoMatchingExtent { line } => {
                line_span(&unit.text, *line)
            }
            _ => error.span().map(source_span),
        };
        Self::SpanNotFound {
            message: error.to_string(),
            span,
            src: named_source(unit),
        }
    }

    /// Wraps a rewriter failure, keeping the unit's text for rendering
    pub fn from_rewrite(error: RewriteError, unit: &SourceUnit) -> Self {
        match error {
            RewriteError::Unresolved { name, kind, span } => Self::UnresolvedReference {
                name,
                kind: kind.to_string(),
                span: source_span(span),
                src: named_source(unit),
            },
            RewriteError::Unsupported { construct, span } => Self::UnsupportedConstruct {
                construct,
                span: source_span(span),
                src: named_source(unit),
            },
        }
    }

    /// Short machine-readable name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "source_unavailable",
            Self::SpanNotFound { .. } => "span_not_found",
            Self::UnresolvedReference { .. } => "unresolved_reference",
            Self::UnsupportedConstruct { .. } => "unsupported_construct",
        }
    }
}

fn source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.range())
}

fn named_source(unit: &SourceUnit) -> NamedSource<String> {
    let name = unit
        .path
        .as_ref()
        .map_or_else(|| "<snippet>".to_string(), |path| path.display().to_string());
    NamedSource::new(name, unit.text.to_string())
}

/// Byte range of 1-based `line`, without its line break
fn line_span(text: &str, line: u32) -> Option<SourceSpan> {
    let index = usize::try_from(line.checked_sub(1)?).ok()?;
    let mut offset = 0;
    for (number, content) in text.split_inclusive('\n').enumerate() {
        if number == index {
            let len = content.trim_end_matches(['\r', '\n']).len();
            return Some(SourceSpan::from((offset, len)));
        }
        offset += content.len();
    }
    None
}
