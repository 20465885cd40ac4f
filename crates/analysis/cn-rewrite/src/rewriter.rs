//! Root-anchoring of every short reference inside a function span

use crate::error::RewriteError;
use crate::options::{RewriteOptions, UnresolvedPolicy};
use crate::traits::ClosureTraits;
use cn_lexer::{Keyword, NameKind, SourceUnit, Token, TokenKind};
use cn_locate::{FunctionForm, FunctionSpan};
use cn_resolve::{
    FrameKind, ImportKind, ScopeTable, TypeKind, is_relative_class, is_reserved_constant,
    is_reserved_type,
};
use rustc_hash::FxHashMap;

/// Output of [`rewrite`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rewritten {
    /// The span's tokens with substituted names
    pub tokens: Vec<Token>,
    /// Runtime-relevant facts seen while rewriting
    pub traits: ClosureTraits,
    /// Short names that fell back to the global scope
    pub unresolved: Vec<String>,
}

/// Bracketed region whose contents are read differently
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ContextKind {
    /// Parameter list, with the part of the current parameter being read
    Params(Segment),
    /// `use (…)` capture list
    UseList,
    /// `catch (…)`
    Catch,
    /// `#[…]`
    Attribute,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Segment {
    Type,
    Name,
    Default,
}

#[derive(Copy, Clone, Debug)]
struct Context {
    kind: ContextKind,
    /// Depth outside the opener
    depth: u32,
}

/// Rewrites the tokens of `function`, root-anchoring every type, function
/// and constant reference
///
/// # Errors
///
/// Returns [`RewriteError::Unsupported`] for constants declared in an
/// anonymous class, and [`RewriteError::Unresolved`] for unknown names when
/// the policy is [`UnresolvedPolicy::Reject`].
pub fn rewrite(
    unit: &SourceUnit,
    table: &ScopeTable,
    function: &FunctionSpan,
    options: &RewriteOptions,
) -> Result<Rewritten, RewriteError> {
    Rewriter::new(unit, table, function, options).run()
}

struct Rewriter<'a> {
    unit: &'a SourceUnit,
    table: &'a ScopeTable,
    function: &'a FunctionSpan,
    options: &'a RewriteOptions,

    depth: u32,
    contexts: Vec<Context>,
    expect_params: bool,
    expect_use_list: bool,
    expect_catch: bool,
    after_params: bool,
    return_type: bool,
    inheritance: bool,
    trait_use: bool,
    /// Between a property's modifiers and its variable
    property_type: bool,
    /// Depth outside the `{` of a trait adaptation block
    adaptation: Option<u32>,
    capture_by_ref: bool,

    replacements: FxHashMap<usize, String>,
    traits: ClosureTraits,
    unresolved: Vec<String>,
}

impl<'a> Rewriter<'a> {
    fn new(
        unit: &'a SourceUnit,
        table: &'a ScopeTable,
        function: &'a FunctionSpan,
        options: &'a RewriteOptions,
    ) -> Self {
        Self {
            unit,
            table,
            function,
            options,
            depth: 0,
            contexts: Vec::new(),
            expect_params: function.form == FunctionForm::Member,
            expect_use_list: false,
            expect_catch: false,
            after_params: false,
            return_type: false,
            inheritance: false,
            trait_use: false,
            property_type: false,
            adaptation: None,
            capture_by_ref: false,
            replacements: FxHashMap::default(),
            traits: ClosureTraits {
                is_arrow: function.form == FunctionForm::Arrow,
                ..ClosureTraits::default()
            },
            unresolved: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Rewritten, RewriteError> {
        let first = self.unit.significant_position(self.function.tokens.start);
        let last = self.unit.significant_position(self.function.tokens.end);

        self.traits.is_static = self
            .tok(first)
            .is_some_and(|token| token.is_keyword(Keyword::Static));

        for pos in first..last {
            self.visit(pos)?;
            self.advance(pos);
        }

        let tokens = self.unit.tokens[self.function.tokens.clone()]
            .iter()
            .enumerate()
            .map(|(offset, token)| {
                let index = self.function.tokens.start + offset;
                match self.replacements.get(&index) {
                    Some(text) => token.with_text(text.as_str()),
                    None => token.clone(),
                }
            })
            .collect();

        Ok(Rewritten {
            tokens,
            traits: self.traits,
            unresolved: self.unresolved,
        })
    }

    fn tok(&self, pos: usize) -> Option<&'a Token> {
        self.unit.significant_token(pos)
    }

    fn prev(&self, pos: usize) -> Option<&'a Token> {
        pos.checked_sub(1).and_then(|pos| self.tok(pos))
    }

    fn kind_at(&self, pos: usize) -> Option<TokenKind> {
        self.tok(pos).map(|token| token.kind)
    }

    fn innermost(&self) -> Option<ContextKind> {
        self.contexts.last().map(|context| context.kind)
    }

    /// Directly inside the innermost context's brackets
    fn at_context_top(&self) -> bool {
        self.contexts
            .last()
            .is_some_and(|context| context.depth + 1 == self.depth)
    }

    fn frame_kind_at(&self, offset: u32) -> FrameKind {
        self.table.frame(self.table.frame_at(offset)).kind
    }

    /// Inspect the token at `pos` and record any substitution
    fn visit(&mut self, pos: usize) -> Result<(), RewriteError> {
        let Some(token) = self.tok(pos) else {
            return Ok(());
        };
        let index = self.unit.significant[pos];

        match token.kind {
            TokenKind::Name(_) => {
                if is_relative_class(&token.text) {
                    self.traits.uses_scope = true;
                } else if let Some(kind) = self.classify(pos) {
                    self.substitute(index, token, kind)?;
                }
            }
            TokenKind::Variable => {
                if token.text == "$this" {
                    self.traits.uses_this = true;
                }
                if self.innermost() == Some(ContextKind::UseList) {
                    let name = token.text.trim_start_matches('$');
                    let capture = if std::mem::take(&mut self.capture_by_ref) {
                        format!("&{name}")
                    } else {
                        name.to_string()
                    };
                    self.traits.captures.push(capture);
                }
            }
            TokenKind::Amp if self.innermost() == Some(ContextKind::UseList) => {
                self.capture_by_ref = true;
            }
            TokenKind::Keyword(Keyword::Static) => {
                let as_class = self.kind_at(pos + 1) == Some(TokenKind::DoubleColon)
                    || self.prev(pos).is_some_and(|prev| {
                        prev.is_keyword(Keyword::New) || prev.kind == TokenKind::Colon
                    })
                    || (self.in_type_position() && !self.property_type);
                if as_class {
                    self.traits.uses_scope = true;
                }
            }
            TokenKind::Keyword(Keyword::Const) => {
                let frame = self.table.frame(self.table.frame_at(token.span.start));
                let anonymous = matches!(frame.kind, FrameKind::TypeBody(_))
                    && frame
                        .enclosing_type
                        .as_ref()
                        .is_some_and(|context| context.anonymous);
                if anonymous {
                    return Err(RewriteError::Unsupported {
                        construct: "a constant declared in an anonymous class".to_string(),
                        span: token.span,
                    });
                }
            }
            TokenKind::Keyword(keyword) => self.magic_constant(index, token, keyword),
            _ => {}
        }

        Ok(())
    }

    /// Update the bracket and signature state after visiting `pos`
    fn advance(&mut self, pos: usize) {
        let Some(token) = self.tok(pos) else {
            return;
        };
        let after_params = std::mem::take(&mut self.after_params);

        if matches!(
            token.kind,
            TokenKind::Variable
                | TokenKind::Semicolon
                | TokenKind::LBrace
                | TokenKind::Keyword(Keyword::Function | Keyword::Fn | Keyword::Const)
        ) {
            self.property_type = false;
        }

        if self.expect_params
            && !matches!(
                token.kind,
                TokenKind::LParen | TokenKind::Amp | TokenKind::Name(_) | TokenKind::Keyword(_)
            )
        {
            self.expect_params = false;
        }

        match token.kind {
            TokenKind::Keyword(Keyword::Function | Keyword::Fn) => self.expect_params = true,
            TokenKind::Keyword(Keyword::Use) => {
                if after_params {
                    self.expect_use_list = true;
                } else if self.starts_statement(pos)
                    && matches!(self.frame_kind_at(token.span.start), FrameKind::TypeBody(_))
                {
                    self.trait_use = true;
                }
            }
            TokenKind::Keyword(Keyword::Catch) => self.expect_catch = true,
            TokenKind::Keyword(Keyword::Extends | Keyword::Implements) => self.inheritance = true,
            TokenKind::Keyword(keyword)
                if keyword.is_modifier()
                    && self.adaptation.is_none()
                    && matches!(self.frame_kind_at(token.span.start), FrameKind::TypeBody(_)) =>
            {
                self.property_type = true;
            }
            TokenKind::Colon if after_params => self.return_type = true,
            TokenKind::DoubleArrow => self.return_type = false,
            TokenKind::Semicolon => {
                self.return_type = false;
                self.trait_use = false;
            }
            TokenKind::LBrace => {
                if std::mem::take(&mut self.trait_use) {
                    self.adaptation = Some(self.depth);
                }
                self.return_type = false;
                self.inheritance = false;
                self.depth += 1;
            }
            TokenKind::LParen => {
                let kind = if std::mem::take(&mut self.expect_params) {
                    Some(ContextKind::Params(Segment::Type))
                } else if std::mem::take(&mut self.expect_use_list) {
                    Some(ContextKind::UseList)
                } else if std::mem::take(&mut self.expect_catch) {
                    Some(ContextKind::Catch)
                } else {
                    None
                };
                self.open(kind);
            }
            TokenKind::AttributeOpen => self.open(Some(ContextKind::Attribute)),
            TokenKind::LBracket => self.depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                self.depth = self.depth.saturating_sub(1);
                if self.adaptation == Some(self.depth) {
                    self.adaptation = None;
                }
                let closes = self
                    .contexts
                    .last()
                    .is_some_and(|context| context.depth == self.depth);
                if closes {
                    if let Some(context) = self.contexts.pop() {
                        if matches!(context.kind, ContextKind::Params(_) | ContextKind::UseList) {
                            self.after_params = true;
                        }
                    }
                }
            }
            TokenKind::Variable | TokenKind::Equals | TokenKind::Comma => {
                self.advance_segment(token.kind);
            }
            _ => {}
        }
    }

    fn open(&mut self, kind: Option<ContextKind>) {
        if let Some(kind) = kind {
            self.contexts.push(Context {
                kind,
                depth: self.depth,
            });
        }
        self.depth += 1;
    }

    fn advance_segment(&mut self, kind: TokenKind) {
        if !self.at_context_top() {
            return;
        }
        let Some(context) = self.contexts.last_mut() else {
            return;
        };
        if let ContextKind::Params(segment) = context.kind {
            let next = match kind {
                TokenKind::Variable if segment == Segment::Type => Segment::Name,
                TokenKind::Equals => Segment::Default,
                TokenKind::Comma => Segment::Type,
                _ => segment,
            };
            context.kind = ContextKind::Params(next);
        }
    }

    fn starts_statement(&self, pos: usize) -> bool {
        self.prev(pos).is_none_or(|prev| {
            matches!(
                prev.kind,
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace
            )
        })
    }

    /// Signature positions where every name is a type
    fn in_type_position(&self) -> bool {
        if self.return_type || self.inheritance || self.trait_use || self.property_type {
            return true;
        }
        match self.innermost() {
            Some(ContextKind::Params(Segment::Type) | ContextKind::Catch) => true,
            Some(ContextKind::Attribute) => self.at_context_top(),
            _ => false,
        }
    }

    /// Whether the name at `pos` is in the list following `insteadof`
    fn in_insteadof_list(&self, pos: usize) -> bool {
        let mut back = pos;
        while let Some(prev) = self.prev(back) {
            match prev.kind {
                TokenKind::Keyword(Keyword::Insteadof) => return true,
                TokenKind::Comma | TokenKind::Name(_) => back -= 1,
                _ => return false,
            }
        }
        false
    }

    /// Which symbol table the name at `pos` refers to, if it is a reference
    fn classify(&self, pos: usize) -> Option<ImportKind> {
        let prev = self.prev(pos);
        let next = self.kind_at(pos + 1);

        // Inside `use A, B { … }` only trait names are references
        if self.adaptation.is_some() {
            let names_trait =
                next == Some(TokenKind::DoubleColon) || self.in_insteadof_list(pos);
            return names_trait.then_some(ImportKind::Type);
        }

        if let Some(prev) = prev {
            match prev.kind {
                TokenKind::Arrow | TokenKind::NullsafeArrow | TokenKind::DoubleColon => {
                    return None;
                }
                TokenKind::Amp
                    if self
                        .prev(pos - 1)
                        .is_some_and(|token| token.is_keyword(Keyword::Function)) =>
                {
                    return None;
                }
                TokenKind::Keyword(
                    Keyword::Function
                    | Keyword::Const
                    | Keyword::Class
                    | Keyword::Interface
                    | Keyword::Trait
                    | Keyword::Enum
                    | Keyword::Goto,
                ) => return None,
                TokenKind::Keyword(Keyword::Case)
                    if self.frame_kind_at(prev.span.start) == FrameKind::TypeBody(TypeKind::Enum) =>
                {
                    return None;
                }
                _ => {}
            }

            if next == Some(TokenKind::Colon) {
                let label = matches!(
                    prev.kind,
                    TokenKind::LParen
                        | TokenKind::Comma
                        | TokenKind::LBrace
                        | TokenKind::Semicolon
                        | TokenKind::RBrace
                );
                if label && !self.in_type_position() {
                    return None;
                }
            }
        }

        let after_type_keyword = prev.is_some_and(|prev| {
            matches!(
                prev.keyword(),
                Some(
                    Keyword::New
                        | Keyword::Instanceof
                        | Keyword::Extends
                        | Keyword::Implements
                        | Keyword::Insteadof
                )
            )
        });
        let before_variable = match next {
            Some(TokenKind::Variable) => true,
            Some(TokenKind::Amp | TokenKind::Ellipsis) => {
                self.kind_at(pos + 2) == Some(TokenKind::Variable)
            }
            _ => false,
        };

        let enum_backing = prev.is_some_and(|prev| prev.kind == TokenKind::Colon)
            && pos >= 2
            && self
                .prev(pos - 2)
                .is_some_and(|token| token.is_keyword(Keyword::Enum));

        if self.in_type_position()
            || after_type_keyword
            || enum_backing
            || next == Some(TokenKind::DoubleColon)
            || before_variable
        {
            Some(ImportKind::Type)
        } else if matches!(next, Some(TokenKind::LParen | TokenKind::CallableMarker)) {
            Some(ImportKind::Function)
        } else {
            Some(ImportKind::Constant)
        }
    }

    fn substitute(
        &mut self,
        index: usize,
        token: &Token,
        kind: ImportKind,
    ) -> Result<(), RewriteError> {
        let name = token.text.as_str();
        let reserved = match kind {
            ImportKind::Type => is_reserved_type(name),
            ImportKind::Constant => is_reserved_constant(name),
            ImportKind::Function => false,
        };
        if reserved || token.name_kind() == Some(NameKind::FullyQualified) {
            return Ok(());
        }

        let offset = token.span.start;
        let resolution = self
            .table
            .resolve(self.table.frame_at(offset), kind, name, offset);

        if !resolution.is_known() {
            tracing::debug!(%kind, name, offset, "unresolved reference, anchoring globally");
            if self.options.policy == UnresolvedPolicy::Reject {
                return Err(RewriteError::Unresolved {
                    name: name.to_string(),
                    kind,
                    span: token.span,
                });
            }
            if !self.unresolved.iter().any(|seen| seen == name) {
                self.unresolved.push(name.to_string());
            }
        }

        tracing::trace!(%kind, name, fqn = %resolution.fqn, source = %resolution.source, "resolved");
        self.replacements.insert(index, resolution.anchored());
        Ok(())
    }

    /// `__FILE__`, `__DIR__` and `__NAMESPACE__` as string literals
    fn magic_constant(&mut self, index: usize, token: &Token, keyword: Keyword) {
        if !self.options.expand_magic_constants {
            return;
        }
        let path = self.unit.path.as_deref();
        let value = match keyword {
            Keyword::MagicFile => path.map(|path| path.display().to_string()),
            Keyword::MagicDir => path
                .and_then(|path| path.parent())
                .map(|dir| dir.display().to_string()),
            Keyword::MagicNamespace if path.is_some() => {
                let frame = self.table.frame_at(token.span.start);
                Some(self.table.frame(frame).namespace.clone())
            }
            _ => None,
        };
        if let Some(value) = value {
            self.replacements.insert(index, quote(&value));
        }
    }
}

/// Single-quoted string literal for `value`
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cn_locate::{ClosureOrigin, locate_closure};
    use cn_resolve::ScopeTableBuilder;
    use expect_test::expect;
    use std::sync::Arc;

    fn canonical_with(
        unit: &SourceUnit,
        line: u32,
        options: &RewriteOptions,
    ) -> Result<Rewritten, RewriteError> {
        let table = ScopeTableBuilder::build(unit);
        let function =
            locate_closure(unit, &table, &ClosureOrigin::at_line(line)).expect("closure located");
        rewrite(unit, &table, &function, options)
    }

    fn canonical(source: &str, line: u32) -> String {
        let unit = SourceUnit::snippet(source);
        let rewritten = canonical_with(&unit, line, &RewriteOptions::default()).expect("rewritten");
        rewritten.tokens.iter().map(|token| token.text.as_str()).collect()
    }

    #[test]
    fn test_parameter_and_return_types() {
        let source = "use Foo\\Baz\\Qux\\Forest;\nuse Some\\ClassName as ClassAlias;\n$f = function (ClassAlias&Forest $x, ?int $n = null, Forest|string ...$rest): never {\n    throw new RuntimeException();\n};\n";
        assert_eq!(
            canonical(source, 3),
            "function (\\Some\\ClassName&\\Foo\\Baz\\Qux\\Forest $x, ?int $n = null, \\Foo\\Baz\\Qux\\Forest|string ...$rest): never {\n    throw new \\RuntimeException();\n}"
        );
    }

    #[test]
    fn test_functions_constants_and_members() {
        let source = "$f = function ($xs) {\n    $y = array_is_list($xs) ? PHP_EOL : Suit::Hearts->label();\n    return $this->count(...) + strlen(...) + $obj?->size + Suit::LIMIT;\n};\n";
        expect![[r#"
            function ($xs) {
                $y = \array_is_list($xs) ? \PHP_EOL : \Suit::Hearts->label();
                return $this->count(...) + \strlen(...) + $obj?->size + \Suit::LIMIT;
            }"#]]
        .assert_eq(&canonical(source, 1));
    }

    #[test]
    fn test_structural_tokens_pass_through() {
        let source = "$f = fn ($a, $b) => [...$a, ...$b, ...array_values($b)];\n";
        assert_eq!(
            canonical(source, 1),
            "fn ($a, $b) => [...$a, ...$b, ...\\array_values($b)]"
        );
    }

    #[test]
    fn test_labels_and_relative_names_are_kept() {
        let source = "$f = static function (): static {\n    return new self(name: 'x', other: parent::VALUE) instanceof Model ? true : null;\n};\n";
        assert_eq!(
            canonical(source, 1),
            "static function (): static {\n    return new self(name: 'x', other: parent::VALUE) instanceof \\Model ? true : null;\n}"
        );
    }

    #[test]
    fn test_catch_and_anonymous_classes() {
        let source = "namespace App;\nuse Psr\\Log\\LoggerInterface;\n$f = function () {\n    try {\n        return new class extends Base implements LoggerInterface, \\Countable {\n            use Helpers;\n            public function __construct(private ?Clock $clock = new Clock()) {}\n        };\n    } catch (InvalidArgumentException | \\TypeError $e) {\n        return SOME_FLAG;\n    }\n};\n";
        expect![[r#"
            function () {
                try {
                    return new class extends \App\Base implements \Psr\Log\LoggerInterface, \Countable {
                        use \App\Helpers;
                        public function __construct(private ?\App\Clock $clock = new \App\Clock()) {}
                    };
                } catch (\App\InvalidArgumentException | \TypeError $e) {
                    return \SOME_FLAG;
                }
            }"#]]
        .assert_eq(&canonical(source, 3));
    }

    #[test]
    fn test_attributes_and_enum_cases() {
        let source = "$f = #[Pure] function (#[SensitiveParameter] string $secret) {\n    enum Local: string { case Hearts = 'h'; }\n    return Local::Hearts;\n};\n";
        assert_eq!(
            canonical(source, 1),
            "function (#[\\SensitiveParameter] string $secret) {\n    enum Local: string { case Hearts = 'h'; }\n    return \\Local::Hearts;\n}"
        );
    }

    #[test]
    fn test_types_named_like_contextual_keywords() {
        let source = "use MyCLabs\\Enum\\Enum;\n$f = function (Enum $e): Enum {\n    return new Enum(From::parse($e));\n};\n";
        assert_eq!(
            canonical(source, 2),
            "function (\\MyCLabs\\Enum\\Enum $e): \\MyCLabs\\Enum\\Enum {\n    return new \\MyCLabs\\Enum\\Enum(\\From::parse($e));\n}"
        );
    }

    #[test]
    fn test_spread_arguments_and_variadic_parameters() {
        let source = "use Lib\\Point;\n$f = function (Point ...$points) {\n    return max(...array_map(fn (Point $p) => $p->x, $points)) + count(new Point(...$points[0]));\n};\n";
        expect![[r#"
            function (\Lib\Point ...$points) {
                return \max(...\array_map(fn (\Lib\Point $p) => $p->x, $points)) + \count(new \Lib\Point(...$points[0]));
            }"#]]
        .assert_eq(&canonical(source, 2));
    }

    #[test]
    fn test_typed_properties_of_anonymous_classes() {
        let source = "namespace App;\n$f = function () {\n    return new class {\n        public Foo|Bar $x;\n        private static ?Clock $clock = null;\n        public readonly (Left&Right)|null $pair;\n        var Item $item;\n    };\n};\n";
        let unit = SourceUnit::snippet(source);
        let rewritten = canonical_with(&unit, 2, &RewriteOptions::default()).expect("rewritten");
        let code: String = rewritten.tokens.iter().map(|token| token.text.as_str()).collect();
        expect![[r#"
            function () {
                return new class {
                    public \App\Foo|\App\Bar $x;
                    private static ?\App\Clock $clock = null;
                    public readonly (\App\Left&\App\Right)|null $pair;
                    var \App\Item $item;
                };
            }"#]]
        .assert_eq(&code);
        assert!(!rewritten.traits.uses_scope);
    }

    #[test]
    fn test_trait_adaptations_keep_method_names() {
        let source = "namespace App;\n$f = function () {\n    return new class {\n        use Greets, Waves {\n            Greets::hello insteadof Waves, Nods;\n            Waves::hello as protected wave;\n            bye as farewell;\n        }\n    };\n};\n";
        expect![[r#"
            function () {
                return new class {
                    use \App\Greets, \App\Waves {
                        \App\Greets::hello insteadof \App\Waves, \App\Nods;
                        \App\Waves::hello as protected wave;
                        bye as farewell;
                    }
                };
            }"#]]
        .assert_eq(&canonical(source, 2));
    }

    #[test]
    fn test_traits_of_the_closure() {
        let unit = SourceUnit::snippet(
            "$f = function ($x) use ($a, &$b): self {\n    return $this->make(static::class);\n};\n",
        );
        let rewritten = canonical_with(&unit, 1, &RewriteOptions::default()).expect("rewritten");
        assert_eq!(
            rewritten.traits,
            ClosureTraits {
                is_static: false,
                is_arrow: false,
                uses_this: true,
                uses_scope: true,
                captures: vec!["a".to_string(), "&b".to_string()],
            }
        );
    }

    #[test]
    fn test_unresolved_policy() {
        let unit = SourceUnit::snippet("$f = fn () => mystery(LIMIT);\n");

        let anchored = canonical_with(&unit, 1, &RewriteOptions::default()).expect("anchored");
        assert_eq!(anchored.unresolved, vec!["mystery".to_string(), "LIMIT".to_string()]);

        let strict = RewriteOptions {
            policy: UnresolvedPolicy::Reject,
            ..RewriteOptions::default()
        };
        let error = canonical_with(&unit, 1, &strict).expect_err("rejected");
        assert!(matches!(error, RewriteError::Unresolved { ref name, .. } if name == "mystery"));
    }

    #[test]
    fn test_anonymous_class_constants_are_unsupported() {
        let unit = SourceUnit::snippet("$f = function () {\n    return new class { const A = 1; };\n};\n");
        let error = canonical_with(&unit, 1, &RewriteOptions::default()).expect_err("unsupported");
        assert!(matches!(error, RewriteError::Unsupported { .. }));
    }

    #[test]
    fn test_magic_constants_need_a_path() {
        let source = "<?php\nnamespace App;\n$f = fn () => [__DIR__, __FILE__, __NAMESPACE__, __LINE__];\n";
        let unit = SourceUnit::new("/srv/app/routes.php", Arc::from(source));
        let rewritten = canonical_with(&unit, 3, &RewriteOptions::default()).expect("rewritten");
        let code: String = rewritten.tokens.iter().map(|token| token.text.as_str()).collect();
        assert_eq!(
            code,
            "fn () => ['/srv/app', '/srv/app/routes.php', 'App', __LINE__]"
        );

        let snippet = canonical("$f = fn () => __DIR__;\n", 1);
        assert_eq!(snippet, "fn () => __DIR__");
    }

    #[test]
    fn test_rewriting_is_idempotent() {
        let source = "use Some\\ClassName as ClassAlias;\n$f = function (ClassAlias $x): array {\n    return array_map(fn (int $n) => new Item($n), range(1, 3));\n};\n";
        let once = canonical(source, 2);
        let twice = canonical(&once, 1);
        assert_eq!(once, twice);
    }
}
