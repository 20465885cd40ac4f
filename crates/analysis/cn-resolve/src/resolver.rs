//! Name resolution against a scope table

use crate::builtins::{is_builtin_class, is_builtin_constant, is_builtin_function};
use crate::scope::{ImportEntry, ImportKind, ImportOrigin, ScopeId, ScopeTable, qualify};
use cn_lexer::NameKind;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Type names that are part of the language and never rewritten
const RESERVED_TYPES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "parent", "self", "static", "string", "true", "void",
];

/// Whether `name` is a reserved type keyword such as `int` or `never`
pub fn is_reserved_type(name: &str) -> bool {
    RESERVED_TYPES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// `self`, `static` and `parent`, whose meaning depends on the call site
pub fn is_relative_class(name: &str) -> bool {
    ["self", "static", "parent"]
        .iter()
        .any(|special| special.eq_ignore_ascii_case(name))
}

/// `true`, `false` and `null`
pub fn is_reserved_constant(name: &str) -> bool {
    ["true", "false", "null"]
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// How a name was resolved
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ResolutionSource {
    /// Written fully qualified
    #[display("fully qualified")]
    FullyQualified,
    /// Matched an import entry or a declaration entry
    #[display("{_0}")]
    Entry(ImportOrigin),
    /// Expanded with the namespace prefix
    #[display("namespace")]
    Namespace,
    /// Declared elsewhere in the same source unit
    #[display("declared")]
    Declared,
    /// A symbol of the runtime
    #[display("builtin")]
    Builtin,
    /// Nothing matched; the global fallback was used
    #[display("unresolved")]
    Unresolved,
}

/// A resolved name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Fully qualified name without the leading `\`
    pub fqn: String,
    /// What the name matched
    pub source: ResolutionSource,
}

impl Resolution {
    fn new(fqn: impl Into<String>, source: ResolutionSource) -> Self {
        Self {
            fqn: fqn.into(),
            source,
        }
    }

    /// Whether the name was matched to something rather than falling back
    pub fn is_known(&self) -> bool {
        self.source != ResolutionSource::Unresolved
    }

    /// The root-anchored spelling, `\Foo\Bar`
    pub fn anchored(&self) -> String {
        format!("\\{}", self.fqn)
    }
}

impl ScopeTable {
    /// Entry for `alias` visible at `at`, searching from `frame` outwards
    pub fn lookup(
        &self,
        frame: ScopeId,
        kind: ImportKind,
        alias: &str,
        at: u32,
    ) -> Option<&ImportEntry> {
        self.ancestors(frame)
            .find_map(|id| self.frame(id).lookup(kind, alias, at))
    }

    /// Resolve `name` as written at byte offset `at` inside `frame`
    pub fn resolve(&self, frame: ScopeId, kind: ImportKind, name: &str, at: u32) -> Resolution {
        let namespace = self.frame(frame).namespace.as_str();

        match NameKind::of(name) {
            NameKind::FullyQualified => Resolution::new(
                name.trim_start_matches('\\'),
                ResolutionSource::FullyQualified,
            ),
            NameKind::Relative => {
                let rest = name.get("namespace\\".len()..).unwrap_or_default();
                Resolution::new(qualify(namespace, rest), ResolutionSource::Namespace)
            }
            NameKind::Qualified => {
                let (first, rest) = name.split_once('\\').unwrap_or((name, ""));
                match self.lookup(frame, ImportKind::Type, first, at) {
                    Some(entry) => Resolution::new(
                        format!("{}\\{rest}", entry.name),
                        ResolutionSource::Entry(entry.origin),
                    ),
                    None => Resolution::new(qualify(namespace, name), ResolutionSource::Namespace),
                }
            }
            NameKind::Unqualified => {
                if let Some(entry) = self.lookup(frame, kind, name, at) {
                    return Resolution::new(
                        entry.name.clone(),
                        ResolutionSource::Entry(entry.origin),
                    );
                }
                self.fallback(namespace, kind, name)
            }
        }
    }

    /// Resolution of an unqualified name that matched no entry
    fn fallback(&self, namespace: &str, kind: ImportKind, name: &str) -> Resolution {
        let local = qualify(namespace, name);
        match kind {
            ImportKind::Type => {
                let source = if self.find_type(&local).is_some() {
                    ResolutionSource::Declared
                } else if !namespace.is_empty() {
                    ResolutionSource::Namespace
                } else if is_builtin_class(name) {
                    ResolutionSource::Builtin
                } else {
                    ResolutionSource::Unresolved
                };
                Resolution::new(local, source)
            }
            ImportKind::Function => {
                let declared = |fqn: &str| {
                    self.find_function(fqn)
                        .is_some_and(|decl| decl.fqn.eq_ignore_ascii_case(fqn))
                };
                if declared(&local) {
                    Resolution::new(local, ResolutionSource::Declared)
                } else if is_builtin_function(name) {
                    Resolution::new(name, ResolutionSource::Builtin)
                } else if declared(name) {
                    Resolution::new(name, ResolutionSource::Declared)
                } else {
                    Resolution::new(name, ResolutionSource::Unresolved)
                }
            }
            ImportKind::Constant => {
                if self.declares_constant(&local) {
                    Resolution::new(local, ResolutionSource::Declared)
                } else if is_builtin_constant(name) {
                    Resolution::new(name, ResolutionSource::Builtin)
                } else if self.declares_constant(name) {
                    Resolution::new(name, ResolutionSource::Declared)
                } else {
                    Resolution::new(name, ResolutionSource::Unresolved)
                }
            }
        }
    }
}
