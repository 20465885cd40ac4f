//! Single-pass construction of the scope table

use crate::scope::{
    ConstDecl, FrameKind, FunctionDecl, ImportEntry, ImportKind, ImportOrigin, Modifiers,
    ScopeFrame, ScopeId, ScopeTable, TypeContext, TypeDecl, TypeKind, Visibility, qualify,
};
use cn_lexer::{Keyword, SourceUnit, Token, TokenKind};
use la_arena::Arena;

/// A declaration whose body frame opens at the next `{` at the same depth
#[derive(Debug)]
struct Pending {
    kind: PendingKind,
    depth: u32,
    stack_len: usize,
}

#[derive(Debug)]
enum PendingKind {
    Namespace(String),
    Type(usize),
    Member(usize),
    Function(usize),
    Closure { is_static: bool },
}

/// Builds a [`ScopeTable`] in one left-to-right pass over the significant tokens
pub struct ScopeTableBuilder<'unit> {
    unit: &'unit SourceUnit,
    frames: Arena<ScopeFrame>,
    root: ScopeId,
    stack: Vec<ScopeId>,
    pending: Vec<Pending>,
    /// Paren and bracket nesting
    depth: u32,
    types: Vec<TypeDecl>,
    functions: Vec<FunctionDecl>,
}

impl<'unit> ScopeTableBuilder<'unit> {
    /// Create a builder for `unit`
    pub fn new(unit: &'unit SourceUnit) -> Self {
        let mut frames = Arena::new();
        let mut root_frame = ScopeFrame::new(FrameKind::Root, None, 0, 0);
        root_frame.span.end = unit.text.len() as u32;
        let root = frames.alloc(root_frame);

        Self {
            unit,
            frames,
            root,
            stack: vec![root],
            pending: Vec::new(),
            depth: 0,
            types: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Build the scope table of `unit`
    pub fn build(unit: &'unit SourceUnit) -> ScopeTable {
        Self::new(unit).finish()
    }

    /// Run the pass and return the table
    pub fn finish(mut self) -> ScopeTable {
        let mut pos = 0;
        while pos < self.unit.significant.len() {
            pos = self.step(pos);
        }

        let end = self.unit.text.len() as u32;
        while self.stack.len() > 1 {
            if let Some(id) = self.stack.pop() {
                self.frames[id].span.end = end;
            }
        }

        tracing::debug!(
            frames = self.frames.len(),
            types = self.types.len(),
            functions = self.functions.len(),
            "built scope table"
        );

        ScopeTable {
            frames: self.frames,
            root: self.root,
            types: self.types,
            functions: self.functions,
        }
    }

    /// Handle the token at `pos`, returning the next position to visit
    fn step(&mut self, pos: usize) -> usize {
        let Some(token) = self.tok(pos) else {
            return pos + 1;
        };

        match token.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::AttributeOpen => {
                self.depth += 1;
            }
            TokenKind::RParen | TokenKind::RBracket => {
                self.depth = self.depth.saturating_sub(1);
                let depth = self.depth;
                self.pending.retain(|pending| pending.depth <= depth);
            }
            TokenKind::LBrace => self.open_brace(pos),
            TokenKind::RBrace => self.close_brace(pos),
            TokenKind::Semicolon | TokenKind::CloseTag => {
                let (depth, stack_len) = (self.depth, self.stack.len());
                self.pending
                    .retain(|pending| !(pending.depth == depth && pending.stack_len == stack_len));
            }
            TokenKind::Keyword(keyword) => match keyword {
                Keyword::Namespace => return self.namespace(pos),
                Keyword::Use => return self.import(pos),
                Keyword::Class => self.type_decl(pos, TypeKind::Class),
                Keyword::Interface => self.type_decl(pos, TypeKind::Interface),
                Keyword::Trait => self.type_decl(pos, TypeKind::Trait),
                Keyword::Enum => self.type_decl(pos, TypeKind::Enum),
                Keyword::Function => self.function(pos),
                Keyword::Const => self.constant(pos),
                _ => {}
            },
            _ => {}
        }

        pos + 1
    }

    fn tok(&self, pos: usize) -> Option<&'unit Token> {
        self.unit.significant_token(pos)
    }

    fn prev(&self, pos: usize) -> Option<&'unit Token> {
        pos.checked_sub(1).and_then(|pos| self.tok(pos))
    }

    fn token_index(&self, pos: usize) -> usize {
        self.unit.significant[pos]
    }

    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(self.root)
    }

    fn at_statement_start(&self, pos: usize) -> bool {
        self.prev(pos).is_none_or(|prev| {
            matches!(
                prev.kind,
                TokenKind::Semicolon
                    | TokenKind::LBrace
                    | TokenKind::RBrace
                    | TokenKind::OpenTag
                    | TokenKind::CloseTag
                    | TokenKind::InlineHtml
            )
        })
    }

    fn after_member_access(&self, pos: usize) -> bool {
        self.prev(pos).is_some_and(|prev| {
            matches!(
                prev.kind,
                TokenKind::Arrow | TokenKind::NullsafeArrow | TokenKind::DoubleColon
            )
        })
    }

    fn is_unbraced_namespace(&self, id: ScopeId) -> bool {
        let frame = &self.frames[id];
        frame.kind == FrameKind::Namespace
            && self.unit.tokens[frame.open].is_keyword(Keyword::Namespace)
    }

    fn defer(&mut self, kind: PendingKind) {
        self.pending.push(Pending {
            kind,
            depth: self.depth,
            stack_len: self.stack.len(),
        });
    }

    /// Registers a declared name: hoisted at top level, visible from the
    /// declaration point inside bodies
    fn declare(&mut self, kind: ImportKind, alias: &str, name: String, offset: u32) {
        let current = self.current();
        let frame = &mut self.frames[current];
        let visible_from = if frame.kind.is_top_level() {
            frame.span.start
        } else {
            offset
        };
        frame.insert(ImportEntry {
            alias: alias.to_string(),
            name,
            kind,
            visible_from,
            origin: ImportOrigin::Declaration,
        });
    }

    fn open_brace(&mut self, pos: usize) {
        let index = self.token_index(pos);
        let start = self.unit.tokens[index].span.start;
        let parent = self.current();

        let (depth, stack_len) = (self.depth, self.stack.len());
        let matches = self
            .pending
            .last()
            .is_some_and(|pending| pending.depth == depth && pending.stack_len == stack_len);
        let pending = if matches { self.pending.pop() } else { None };

        let parent_frame = &self.frames[parent];
        let mut frame = ScopeFrame::new(FrameKind::Block, Some(parent), index, start);
        frame.namespace = parent_frame.namespace.clone();
        frame.enclosing_type = parent_frame.enclosing_type.clone();
        frame.is_static = parent_frame.is_static;

        let mut owner = None;
        match pending.map(|pending| pending.kind) {
            Some(PendingKind::Namespace(name)) => {
                frame.kind = FrameKind::Namespace;
                frame.namespace = name;
                frame.enclosing_type = None;
                frame.is_static = false;
            }
            Some(PendingKind::Type(type_index)) => {
                let decl = &self.types[type_index];
                frame.kind = FrameKind::TypeBody(decl.kind);
                frame.enclosing_type = Some(TypeContext {
                    fqn: decl.fqn.clone(),
                    kind: decl.kind,
                    anonymous: decl.anonymous,
                });
                frame.is_static = false;
                owner = Some((true, type_index));
            }
            Some(PendingKind::Member(function_index)) => {
                frame.kind = FrameKind::Member;
                frame.is_static = self.functions[function_index].modifiers.is_static;
                owner = Some((false, function_index));
            }
            Some(PendingKind::Function(function_index)) => {
                frame.kind = FrameKind::Function;
                frame.enclosing_type = None;
                frame.is_static = false;
                owner = Some((false, function_index));
            }
            Some(PendingKind::Closure { is_static }) => {
                frame.kind = FrameKind::Closure;
                frame.is_static = is_static || frame.is_static;
            }
            None => {}
        }

        let kind = frame.kind;
        let id = self.frames.alloc(frame);
        self.frames[parent].children.push(id);
        self.stack.push(id);

        match owner {
            Some((true, type_index)) => self.types[type_index].body = Some(id),
            Some((false, function_index)) => self.functions[function_index].body = Some(id),
            None => {}
        }

        tracing::trace!(%kind, depth = self.stack.len(), offset = start, "push frame");
    }

    fn close_brace(&mut self, pos: usize) {
        let current = self.current();
        if current == self.root || self.is_unbraced_namespace(current) {
            return;
        }

        let index = self.token_index(pos);
        self.stack.pop();
        let frame = &mut self.frames[current];
        frame.span.end = self.unit.tokens[index].span.end;
        frame.close = Some(index);

        let stack_len = self.stack.len();
        self.pending.retain(|pending| pending.stack_len <= stack_len);

        tracing::trace!(kind = %frame.kind, depth = stack_len, "pop frame");
    }

    /// `namespace X;`, `namespace X { … }` and `namespace { … }`
    fn namespace(&mut self, pos: usize) -> usize {
        if !self.at_statement_start(pos) {
            return pos + 1;
        }
        let current = self.current();
        if current != self.root && !self.is_unbraced_namespace(current) {
            return pos + 1;
        }

        let (name, next) = match self.tok(pos + 1) {
            Some(token) if matches!(token.kind, TokenKind::Name(_)) => {
                (token.text.trim_start_matches('\\').to_string(), pos + 2)
            }
            _ => (String::new(), pos + 1),
        };

        match self.tok(next).map(|token| token.kind) {
            Some(TokenKind::LBrace) => {
                self.defer(PendingKind::Namespace(name));
                next
            }
            Some(TokenKind::Semicolon) => {
                let index = self.token_index(pos);
                let start = self.unit.tokens[index].span.start;

                if current != self.root {
                    self.stack.pop();
                    self.frames[current].span.end = start;
                    tracing::trace!(kind = "namespace", "pop frame");
                }

                let mut frame = ScopeFrame::new(FrameKind::Namespace, Some(self.root), index, start);
                frame.namespace = name;
                let id = self.frames.alloc(frame);
                self.frames[self.root].children.push(id);
                self.stack.push(id);
                tracing::trace!(kind = "namespace", offset = start, "push frame");
                next
            }
            _ => pos + 1,
        }
    }

    /// Import statements at top level; trait `use` and closure `use (…)`
    /// lists are left alone
    fn import(&mut self, pos: usize) -> usize {
        if !self.at_statement_start(pos) || !self.frames[self.current()].kind.is_top_level() {
            return pos + 1;
        }

        let visible_from = self.unit.tokens[self.token_index(pos)].span.start;
        let mut imports = Vec::new();
        let mut p = pos + 1;
        let kind = self.import_kind(&mut p).unwrap_or(ImportKind::Type);

        while let Some(token) = self.tok(p).filter(|token| token.is_identifier_like()) {
            let name = token.text.trim_start_matches('\\').to_string();
            p += 1;

            let is_group = self.tok(p).is_some_and(|token| token.kind == TokenKind::Backslash)
                && self.tok(p + 1).is_some_and(|token| token.kind == TokenKind::LBrace);

            if is_group {
                p += 2;
                loop {
                    let item_kind = self.import_kind(&mut p).unwrap_or(kind);
                    let Some(item) = self.tok(p).filter(|token| token.is_identifier_like()) else {
                        break;
                    };
                    p += 1;
                    let full = format!("{name}\\{}", item.text.trim_start_matches('\\'));
                    let alias = self.import_alias(&mut p, &full);
                    imports.push((item_kind, alias, full));

                    match self.tok(p).map(|token| token.kind) {
                        Some(TokenKind::Comma) => {
                            p += 1;
                            if self.tok(p).is_some_and(|token| token.kind == TokenKind::RBrace) {
                                p += 1;
                                break;
                            }
                        }
                        Some(TokenKind::RBrace) => {
                            p += 1;
                            break;
                        }
                        _ => break,
                    }
                }
            } else {
                let alias = self.import_alias(&mut p, &name);
                imports.push((kind, alias, name));
            }

            if self.tok(p).is_some_and(|token| token.kind == TokenKind::Comma) {
                p += 1;
            } else {
                break;
            }
        }

        let current = self.current();
        for (kind, alias, name) in imports {
            tracing::trace!(%kind, %alias, %name, "import");
            self.frames[current].insert(ImportEntry {
                alias,
                name,
                kind,
                visible_from,
                origin: ImportOrigin::Import,
            });
        }

        while let Some(token) = self.tok(p) {
            if matches!(token.kind, TokenKind::Semicolon | TokenKind::CloseTag) {
                break;
            }
            p += 1;
        }
        p
    }

    fn import_kind(&self, p: &mut usize) -> Option<ImportKind> {
        let kind = match self.tok(*p)?.keyword()? {
            Keyword::Function => ImportKind::Function,
            Keyword::Const => ImportKind::Constant,
            _ => return None,
        };
        *p += 1;
        Some(kind)
    }

    fn import_alias(&self, p: &mut usize, name: &str) -> String {
        if self.tok(*p).is_some_and(|token| token.is_keyword(Keyword::As)) {
            if let Some(alias) = self.tok(*p + 1).filter(|token| token.is_identifier_like()) {
                *p += 2;
                return alias.text.clone();
            }
        }
        last_segment(name).to_string()
    }

    fn type_decl(&mut self, pos: usize, kind: TypeKind) {
        if self.after_member_access(pos) {
            return;
        }

        let anonymous = kind == TypeKind::Class
            && self.prev(pos).is_some_and(|prev| prev.is_keyword(Keyword::New));
        let name = if anonymous {
            "class@anonymous".to_string()
        } else {
            match self.tok(pos + 1) {
                Some(token) if token.is_identifier_like() => token.text.clone(),
                _ => return,
            }
        };
        if kind == TypeKind::Enum {
            let opens_body = self.tok(pos + 2).is_some_and(|token| {
                matches!(token.kind, TokenKind::LBrace | TokenKind::Colon)
                    || token.is_keyword(Keyword::Implements)
            });
            if !opens_body {
                return;
            }
        }

        let mut modifiers = Modifiers::default();
        let mut back = pos;
        while let Some(keyword) = self.prev(back).and_then(Token::keyword) {
            match keyword {
                Keyword::Final => modifiers.is_final = true,
                Keyword::Abstract => modifiers.is_abstract = true,
                Keyword::Readonly => modifiers.is_readonly = true,
                _ => break,
            }
            back -= 1;
        }

        let namespace = self.frames[self.current()].namespace.clone();
        let fqn = if anonymous {
            name.clone()
        } else {
            qualify(&namespace, &name)
        };
        let span = self.unit.tokens[self.token_index(pos)].span;

        if !anonymous {
            self.declare(ImportKind::Type, &name, fqn.clone(), span.start);
        }

        tracing::trace!(%kind, %fqn, anonymous, "type declaration");
        self.types.push(TypeDecl {
            fqn,
            name,
            kind,
            modifiers,
            anonymous,
            span,
            body: None,
            constants: Vec::new(),
            members: Vec::new(),
        });
        self.defer(PendingKind::Type(self.types.len() - 1));
    }

    fn function(&mut self, pos: usize) {
        if self.after_member_access(pos) {
            return;
        }

        let mut next = pos + 1;
        let by_ref = self.tok(next).is_some_and(|token| token.kind == TokenKind::Amp);
        if by_ref {
            next += 1;
        }

        let Some(token) = self.tok(next) else {
            return;
        };

        if token.kind == TokenKind::LParen {
            let is_static = self.prev(pos).is_some_and(|prev| prev.is_keyword(Keyword::Static));
            self.defer(PendingKind::Closure { is_static });
            return;
        }

        let named = token.is_identifier_like()
            && self.tok(next + 1).is_some_and(|token| token.kind == TokenKind::LParen);
        if !named {
            return;
        }

        let current = self.current();
        let frame = &self.frames[current];
        let name = token.text.clone();
        let keyword = self.token_index(pos);
        let name_token = self.token_index(next);
        let params = self.token_index(next + 1);

        if let FrameKind::TypeBody(_) = frame.kind {
            let Some(owner) = self.types.iter().position(|decl| decl.body == Some(current)) else {
                return;
            };

            let mut modifiers = Modifiers::default();
            let mut back = pos;
            while let Some(keyword) = self.prev(back).and_then(Token::keyword) {
                match keyword {
                    Keyword::Static => modifiers.is_static = true,
                    Keyword::Final => modifiers.is_final = true,
                    Keyword::Abstract => modifiers.is_abstract = true,
                    Keyword::Public => modifiers.visibility = Visibility::Public,
                    Keyword::Protected => modifiers.visibility = Visibility::Protected,
                    Keyword::Private => modifiers.visibility = Visibility::Private,
                    _ => break,
                }
                back -= 1;
            }

            let fqn = format!("{}::{name}", self.types[owner].fqn);
            tracing::trace!(%fqn, ?modifiers, "member declaration");
            self.functions.push(FunctionDecl {
                name,
                fqn,
                owner: Some(owner),
                modifiers,
                keyword,
                name_token,
                params,
                by_ref,
                body: None,
            });
            let index = self.functions.len() - 1;
            self.types[owner].members.push(index);
            self.defer(PendingKind::Member(index));
        } else {
            let fqn = qualify(&frame.namespace, &name);
            let offset = self.unit.tokens[keyword].span.start;
            self.declare(ImportKind::Function, &name, fqn.clone(), offset);

            tracing::trace!(%fqn, "function declaration");
            self.functions.push(FunctionDecl {
                name,
                fqn,
                owner: None,
                modifiers: Modifiers::default(),
                keyword,
                name_token,
                params,
                by_ref,
                body: None,
            });
            self.defer(PendingKind::Function(self.functions.len() - 1));
        }
    }

    /// Names assigned at depth zero of a `const` statement
    fn const_names(&self, pos: usize) -> Vec<(String, u32)> {
        let mut names = Vec::new();
        let mut depth = 0u32;
        let mut p = pos + 1;
        while let Some(token) = self.tok(p) {
            match token.kind {
                TokenKind::Semicolon | TokenKind::CloseTag => break,
                TokenKind::LBrace | TokenKind::RBrace if depth == 0 => break,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Equals if depth == 0 => {
                    if let Some(name) = self.prev(p).filter(|token| token.is_identifier_like()) {
                        names.push((name.text.clone(), name.span.start));
                    }
                }
                _ => {}
            }
            p += 1;
        }
        names
    }

    fn constant(&mut self, pos: usize) {
        let current = self.current();
        let frame_kind = self.frames[current].kind;
        let span = self.unit.tokens[self.token_index(pos)].span;

        if let FrameKind::TypeBody(_) = frame_kind {
            let Some(owner) = self.types.iter().position(|decl| decl.body == Some(current)) else {
                return;
            };
            let constants = self
                .const_names(pos)
                .into_iter()
                .map(|(name, _)| ConstDecl { name, span });
            self.types[owner].constants.extend(constants);
        } else if frame_kind.is_top_level() && self.at_statement_start(pos) {
            let namespace = self.frames[current].namespace.clone();
            for (name, offset) in self.const_names(pos) {
                let fqn = qualify(&namespace, &name);
                self.declare(ImportKind::Constant, &name, fqn, offset);
            }
        }
    }
}

/// Last `\`-separated segment of a name
pub fn last_segment(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(source: &str) -> (SourceUnit, ScopeTable) {
        let unit = SourceUnit::snippet(source);
        let table = ScopeTableBuilder::build(&unit);
        (unit, table)
    }

    fn offset_of(source: &str, needle: &str) -> u32 {
        source.find(needle).expect("needle present") as u32
    }

    #[test]
    fn test_imports_and_aliases() {
        let source = "use Foo\\Baz\\Qux\\Forest;\nuse Some\\ClassName as ClassAlias, Other\\Thing;\nuse function Lib\\helper;\nuse const Lib\\LIMIT;\n";
        let (_, table) = build(source);
        let root = table.frame(table.root);
        let end = source.len() as u32;

        assert_eq!(
            root.lookup(ImportKind::Type, "forest", end).map(|e| e.name.as_str()),
            Some("Foo\\Baz\\Qux\\Forest")
        );
        assert_eq!(
            root.lookup(ImportKind::Type, "ClassAlias", end).map(|e| e.name.as_str()),
            Some("Some\\ClassName")
        );
        assert_eq!(
            root.lookup(ImportKind::Type, "Thing", end).map(|e| e.name.as_str()),
            Some("Other\\Thing")
        );
        assert_eq!(
            root.lookup(ImportKind::Function, "HELPER", end).map(|e| e.name.as_str()),
            Some("Lib\\helper")
        );
        assert!(root.lookup(ImportKind::Constant, "limit", end).is_none());
        assert!(root.lookup(ImportKind::Constant, "LIMIT", end).is_some());
    }

    #[test]
    fn test_group_use() {
        let source = "use App\\Models\\{User, Post as Article, function make, const MAX};";
        let (_, table) = build(source);
        let root = table.frame(table.root);
        let end = source.len() as u32;

        let name = |kind, alias| root.lookup(kind, alias, end).map(|e| e.name.clone());
        assert_eq!(name(ImportKind::Type, "User").as_deref(), Some("App\\Models\\User"));
        assert_eq!(name(ImportKind::Type, "Article").as_deref(), Some("App\\Models\\Post"));
        assert_eq!(name(ImportKind::Function, "make").as_deref(), Some("App\\Models\\make"));
        assert_eq!(name(ImportKind::Constant, "MAX").as_deref(), Some("App\\Models\\MAX"));
        assert_eq!(table.frame_count(), 1);
    }

    #[test]
    fn test_frames_nest() {
        let source = "namespace App;\nclass Controller {\n    public static function make() {\n        return function () { if (true) { } };\n    }\n}\n";
        let (_, table) = build(source);

        let inner = table.frame_at(offset_of(source, "if (true)"));
        let kinds: Vec<FrameKind> = table
            .ancestors(inner)
            .map(|id| table.frame(id).kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                FrameKind::Closure,
                FrameKind::Member,
                FrameKind::TypeBody(TypeKind::Class),
                FrameKind::Namespace,
                FrameKind::Root,
            ]
        );

        let closure = table.frame(inner);
        assert!(closure.is_static);
        assert_eq!(closure.namespace, "App");
        assert_eq!(
            closure.enclosing_type.as_ref().map(|context| context.fqn.as_str()),
            Some("App\\Controller")
        );

        let block = table.frame_at(offset_of(source, "{ } }") + 1);
        assert_eq!(table.frame(block).kind, FrameKind::Block);
    }

    #[test]
    fn test_members_and_modifiers() {
        let source = "final class Box {\n    const A = 1, B = 2;\n    private function hidden(): self { return $this; }\n    final public static function make(): static { return new static(); }\n    abstract protected function todo();\n}\n";
        let (_, table) = build(source);

        let decl = table.find_type("Box").expect("Box declared");
        assert!(decl.modifiers.is_final);
        assert_eq!(
            decl.constants.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["A", "B"]
        );

        let hidden = table.find_member(decl, "HIDDEN").expect("hidden");
        assert_eq!(hidden.modifiers.visibility, Visibility::Private);
        assert!(hidden.body.is_some());

        let make = table.find_member(decl, "make").expect("make");
        assert!(make.modifiers.is_static && make.modifiers.is_final);
        assert_eq!(make.fqn, "Box::make");

        let todo = table.find_member(decl, "todo").expect("todo");
        assert!(todo.modifiers.is_abstract);
        assert!(todo.body.is_none());
    }

    #[test]
    fn test_unbraced_namespaces_split_the_file() {
        let source = "namespace A;\nuse X\\Y;\nnamespace B;\nclass C {}\n";
        let (_, table) = build(source);
        let in_b = table.frame_at(offset_of(source, "class C"));
        let frame = table.frame(in_b);
        assert_eq!(frame.namespace, "B");
        assert!(frame.lookup(ImportKind::Type, "Y", source.len() as u32).is_none());

        let in_a = table.frame_at(offset_of(source, "use X"));
        assert_eq!(table.frame(in_a).namespace, "A");
        assert!(table.find_type("B\\C").is_some());
    }

    #[test]
    fn test_local_declarations_are_scoped() {
        let source = "function outer() {\n    $a = 1;\n    enum Local { case One; }\n    $b = 2;\n}\nfunction sibling() { $c = 3; }\n";
        let (_, table) = build(source);

        let body = table.frame_at(offset_of(source, "$a"));
        let frame = table.frame(body);
        assert!(frame.lookup(ImportKind::Type, "Local", offset_of(source, "$a")).is_none());
        assert!(frame.lookup(ImportKind::Type, "Local", offset_of(source, "$b")).is_some());

        let sibling = table.frame_at(offset_of(source, "$c"));
        assert_ne!(sibling, body);
        assert!(table.frame(sibling).imports.is_empty());

        let root = table.frame(table.root);
        assert!(root.lookup(ImportKind::Function, "outer", 0).is_some());
    }

    #[test]
    fn test_closure_use_and_trait_use_are_not_imports() {
        let source = "class A { use Helpers; }\n$f = function () use ($x) { return $x; };\n";
        let (_, table) = build(source);
        let root = table.frame(table.root);
        assert!(root.lookup(ImportKind::Type, "Helpers", 100).is_none());
        assert_eq!(root.imports.len(), 1);
    }

    #[test]
    fn test_anonymous_class_body() {
        let source = "$o = new class (function () {}) extends Base {\n    const X = 1;\n};\n";
        let (_, table) = build(source);
        let decl = table.types.iter().find(|decl| decl.anonymous).expect("anonymous");
        assert_eq!(decl.constants.len(), 1);

        let body = table.frame_at(offset_of(source, "const X"));
        assert_eq!(table.frame(body).kind, FrameKind::TypeBody(TypeKind::Class));
        assert!(
            table
                .frame(body)
                .enclosing_type
                .as_ref()
                .is_some_and(|context| context.anonymous)
        );
    }
}
