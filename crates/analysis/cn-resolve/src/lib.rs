//! Import and scope table builder
//!
//! Walks a [`SourceUnit`](cn_lexer::SourceUnit) once and records every
//! lexical frame (namespaces, type bodies, members, functions, closures and
//! blocks) together with the import and declaration entries each frame
//! introduces. [`ScopeTable::resolve`] then maps a name written at some byte
//! offset to its fully qualified form, innermost frame first.

pub mod builder;
pub mod builtins;
pub mod resolver;
pub mod scope;

pub use builder::{ScopeTableBuilder, last_segment};
pub use resolver::{
    Resolution, ResolutionSource, is_relative_class, is_reserved_constant, is_reserved_type,
};
pub use scope::{
    ConstDecl, FrameKind, FunctionDecl, ImportEntry, ImportKey, ImportKind, ImportOrigin,
    Modifiers, ScopeFrame, ScopeId, ScopeTable, TypeContext, TypeDecl, TypeKind, Visibility,
    qualify,
};
