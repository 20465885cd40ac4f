//! Token types produced by the lexer

use crate::keyword::Keyword;
use cn_span::Span;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// How a name token is qualified
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum NameKind {
    /// `Foo`
    #[display("unqualified")]
    Unqualified,
    /// `Foo\Bar`
    #[display("qualified")]
    Qualified,
    /// `\Foo\Bar`
    #[display("fully qualified")]
    FullyQualified,
    /// `namespace\Foo`
    #[display("relative")]
    Relative,
}

impl NameKind {
    /// Classifies the raw text of a name token
    pub fn of(text: &str) -> Self {
        if text.starts_with('\\') {
            Self::FullyQualified
        } else if text
            .get(..10)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("namespace\\"))
        {
            Self::Relative
        } else if text.contains('\\') {
            Self::Qualified
        } else {
            Self::Unqualified
        }
    }
}

/// Token kinds
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    /// Identifier or namespaced name
    Name(NameKind),
    /// Reserved or contextual keyword
    Keyword(Keyword),
    /// `$name`
    Variable,
    /// Quoted string, heredoc or nowdoc
    String,
    /// Integer or float literal
    Number,
    /// Spaces, tabs and line breaks
    Whitespace,
    /// Line, block or doc comment
    Comment,
    /// Text outside of `<?php … ?>`
    InlineHtml,
    /// `<?php` or `<?=`
    OpenTag,
    /// `?>`
    CloseTag,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `#[`
    AttributeOpen,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `::`
    DoubleColon,
    /// `?`
    Question,
    /// `\` on its own, as in group use prefixes
    Backslash,
    /// `$` not followed by a name
    Dollar,
    /// `->`
    Arrow,
    /// `?->`
    NullsafeArrow,
    /// `=>`
    DoubleArrow,
    /// `...`
    Ellipsis,
    /// `(...)`, the first-class callable marker
    CallableMarker,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `=`
    Equals,
    /// Any other operator
    Operator,
    /// Bytes the lexer could not recognize
    Error,
}

/// A lexed token with its source text
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Kind of token
    pub kind: TokenKind,
    /// Byte span in the source unit
    pub span: Span,
    /// Raw text, or the substituted text after rewriting
    pub text: String,
}

impl Token {
    /// Creates a token
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }

    /// Creates a copy of this token carrying different text
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self::new(self.kind, self.span, text)
    }

    /// Whitespace and comments
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// The keyword, if this is one
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    /// Whether this token is the keyword `keyword`
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// The qualification of a name token
    pub fn name_kind(&self) -> Option<NameKind> {
        match self.kind {
            TokenKind::Name(kind) => Some(kind),
            _ => None,
        }
    }

    /// Names and keywords, both of which can spell declaration or member names
    pub fn is_identifier_like(&self) -> bool {
        matches!(self.kind, TokenKind::Name(_) | TokenKind::Keyword(_))
    }

    /// Tokens that open a balanced group
    pub fn is_opener(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket | TokenKind::AttributeOpen
        )
    }

    /// Tokens that close a balanced group
    pub fn is_closer(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket
        )
    }
}
