//! Scope frames and the import table of a source unit

use cn_span::Span;
use derive_more::Display;
use indexmap::IndexMap;
use la_arena::{Arena, Idx};
use serde::{Deserialize, Serialize};

/// Identifier of a frame in a [`ScopeTable`]
pub type ScopeId = Idx<ScopeFrame>;

/// Kind of type declaration
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    /// `class`
    #[display("class")]
    Class,
    /// `interface`
    #[display("interface")]
    Interface,
    /// `trait`
    #[display("trait")]
    Trait,
    /// `enum`
    #[display("enum")]
    Enum,
}

/// Kind of scope frame
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum FrameKind {
    /// The whole source unit
    #[display("root")]
    Root,
    /// A `namespace` block or section
    #[display("namespace")]
    Namespace,
    /// Body of a type declaration
    #[display("{_0} body")]
    TypeBody(TypeKind),
    /// Body of a method
    #[display("member")]
    Member,
    /// Body of a named function
    #[display("function")]
    Function,
    /// Body of a closure
    #[display("closure")]
    Closure,
    /// Any other braced block
    #[display("block")]
    Block,
}

impl FrameKind {
    /// Frames whose declarations are hoisted to the start of the frame
    pub fn is_top_level(self) -> bool {
        matches!(self, Self::Root | Self::Namespace)
    }
}

/// The type a frame is nested in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeContext {
    /// Fully qualified name without the leading `\`
    pub fqn: String,
    /// Kind of the type
    pub kind: TypeKind,
    /// Whether the type is an anonymous class
    pub anonymous: bool,
}

/// Which symbol table an import or declaration belongs to
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ImportKind {
    /// Classes, interfaces, traits and enums
    #[display("type")]
    Type,
    /// Functions
    #[display("function")]
    Function,
    /// Constants
    #[display("constant")]
    Constant,
}

impl ImportKind {
    /// Normalizes an alias for lookup: types and functions ignore case
    pub fn fold(self, alias: &str) -> String {
        match self {
            Self::Type | Self::Function => alias.to_ascii_lowercase(),
            Self::Constant => alias.to_string(),
        }
    }
}

/// Where an [`ImportEntry`] came from
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ImportOrigin {
    /// A `use` statement
    #[display("import")]
    Import,
    /// A type, function or constant declaration
    #[display("declaration")]
    Declaration,
}

/// Lookup key of an import entry
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ImportKey {
    /// Symbol table
    pub kind: ImportKind,
    /// Alias, folded by [`ImportKind::fold`]
    pub alias: String,
}

/// Binding of a short alias to a fully qualified name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEntry {
    /// Alias as written
    pub alias: String,
    /// Fully qualified name without the leading `\`
    pub name: String,
    /// Symbol table
    pub kind: ImportKind,
    /// First byte offset at which the entry is visible
    pub visible_from: u32,
    /// Where the entry came from
    pub origin: ImportOrigin,
}

/// One lexical frame
#[derive(Clone, Debug)]
pub struct ScopeFrame {
    /// What opened the frame
    pub kind: FrameKind,
    /// Enclosing frame, absent for the root
    pub parent: Option<ScopeId>,
    /// Nested frames in source order
    pub children: Vec<ScopeId>,
    /// Bytes covered by the frame, braces included
    pub span: Span,
    /// Token index of the opening `{` or of the `namespace` keyword
    pub open: usize,
    /// Token index of the closing `}`, if the frame has one
    pub close: Option<usize>,
    /// Namespace prefix, empty for the global namespace
    pub namespace: String,
    /// Innermost type the frame is nested in
    pub enclosing_type: Option<TypeContext>,
    /// Whether `$this` is unavailable in the frame
    pub is_static: bool,
    /// Imports and declarations bound in this frame
    pub imports: IndexMap<ImportKey, ImportEntry>,
}

impl ScopeFrame {
    pub(crate) fn new(kind: FrameKind, parent: Option<ScopeId>, open: usize, start: u32) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            span: Span::new(start, start),
            open,
            close: None,
            namespace: String::new(),
            enclosing_type: None,
            is_static: false,
            imports: IndexMap::new(),
        }
    }

    /// Registers `entry` unless an entry with the same key already exists
    pub(crate) fn insert(&mut self, entry: ImportEntry) {
        let key = ImportKey {
            kind: entry.kind,
            alias: entry.kind.fold(&entry.alias),
        };
        self.imports.entry(key).or_insert(entry);
    }

    /// Entry for `alias` visible at byte offset `at`
    pub fn lookup(&self, kind: ImportKind, alias: &str, at: u32) -> Option<&ImportEntry> {
        let key = ImportKey {
            kind,
            alias: kind.fold(alias),
        };
        self.imports
            .get(&key)
            .filter(|entry| entry.visible_from <= at)
    }
}

/// Declaration modifiers
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// `static`
    pub is_static: bool,
    /// `final`
    pub is_final: bool,
    /// `abstract`
    pub is_abstract: bool,
    /// `readonly`
    pub is_readonly: bool,
    /// `public` unless stated otherwise
    pub visibility: Visibility,
}

/// Member visibility
#[derive(Copy, Clone, Debug, Default, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Visibility {
    /// `public`
    #[default]
    #[display("public")]
    Public,
    /// `protected`
    #[display("protected")]
    Protected,
    /// `private`
    #[display("private")]
    Private,
}

/// A class constant declared in a type body
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstDecl {
    /// Constant name
    pub name: String,
    /// Span of the `const` keyword
    pub span: Span,
}

/// A declared type
#[derive(Clone, Debug)]
pub struct TypeDecl {
    /// Fully qualified name, `class@anonymous` for anonymous classes
    pub fqn: String,
    /// Short name as written
    pub name: String,
    /// Kind of the declaration
    pub kind: TypeKind,
    /// `final`, `abstract` and `readonly`
    pub modifiers: Modifiers,
    /// Whether this is a `new class` expression
    pub anonymous: bool,
    /// Span of the declaring keyword
    pub span: Span,
    /// Body frame, once its `{` has been seen
    pub body: Option<ScopeId>,
    /// Class constants in declaration order
    pub constants: Vec<ConstDecl>,
    /// Indices into [`ScopeTable::functions`]
    pub members: Vec<usize>,
}

/// A named function or method
#[derive(Clone, Debug)]
pub struct FunctionDecl {
    /// Name as written
    pub name: String,
    /// Fully qualified name for functions, `Owner::name` for methods
    pub fqn: String,
    /// Index into [`ScopeTable::types`] for methods
    pub owner: Option<usize>,
    /// Declared modifiers
    pub modifiers: Modifiers,
    /// Token index of the `function` keyword
    pub keyword: usize,
    /// Token index of the name
    pub name_token: usize,
    /// Token index of the `(` opening the parameter list
    pub params: usize,
    /// Whether the function returns by reference
    pub by_ref: bool,
    /// Body frame, absent for abstract and interface methods
    pub body: Option<ScopeId>,
}

/// All frames and declarations of a source unit
#[derive(Clone, Debug)]
pub struct ScopeTable {
    pub(crate) frames: Arena<ScopeFrame>,
    /// Frame of the whole unit
    pub root: ScopeId,
    /// Types in declaration order
    pub types: Vec<TypeDecl>,
    /// Functions and methods in declaration order
    pub functions: Vec<FunctionDecl>,
}

impl ScopeTable {
    /// Get a frame by id
    #[must_use]
    pub fn frame(&self, id: ScopeId) -> &ScopeFrame {
        &self.frames[id]
    }

    /// Number of frames, root included
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Innermost frame whose span contains byte offset `offset`
    pub fn frame_at(&self, offset: u32) -> ScopeId {
        let mut current = self.root;
        'descend: loop {
            for &child in &self.frames[current].children {
                let span = self.frames[child].span;
                if span.start <= offset && offset < span.end {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// `id` followed by its ancestors up to the root
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), move |&current| self.frames[current].parent)
    }

    /// Looks up a type by fully qualified name, ignoring case
    pub fn find_type(&self, fqn: &str) -> Option<&TypeDecl> {
        let fqn = fqn.trim_start_matches('\\');
        self.types
            .iter()
            .find(|decl| !decl.anonymous && decl.fqn.eq_ignore_ascii_case(fqn))
    }

    /// Types a short or qualified name can refer to, ignoring case
    ///
    /// A fully qualified match wins. Otherwise every named type with that
    /// short name is returned, so callers can tell a miss from an ambiguity.
    pub fn find_types_named(&self, name: &str) -> Vec<&TypeDecl> {
        if let Some(decl) = self.find_type(name) {
            return vec![decl];
        }
        self.types
            .iter()
            .filter(|decl| !decl.anonymous && decl.name.eq_ignore_ascii_case(name))
            .collect()
    }

    /// Looks up a method of `owner` by name, ignoring case
    pub fn find_member(&self, owner: &TypeDecl, name: &str) -> Option<&FunctionDecl> {
        owner
            .members
            .iter()
            .map(|&index| &self.functions[index])
            .find(|decl| decl.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a free function by fully qualified or short name, ignoring case
    pub fn find_function(&self, name: &str) -> Option<&FunctionDecl> {
        let name = name.trim_start_matches('\\');
        let free = || self.functions.iter().filter(|decl| decl.owner.is_none());
        free()
            .find(|decl| decl.fqn.eq_ignore_ascii_case(name))
            .or_else(|| free().find(|decl| decl.name.eq_ignore_ascii_case(name)))
    }

    /// Whether a constant named `fqn` is declared at top level
    pub fn declares_constant(&self, fqn: &str) -> bool {
        self.frames.iter().any(|(_, frame)| {
            frame.kind.is_top_level()
                && frame.imports.values().any(|entry| {
                    entry.kind == ImportKind::Constant
                        && entry.origin == ImportOrigin::Declaration
                        && entry.name == fqn
                })
        })
    }
}

/// Joins a namespace prefix and a relative name
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}\\{name}")
    }
}
