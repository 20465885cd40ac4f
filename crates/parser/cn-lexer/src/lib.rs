//! Lossless tokenizer for PHP source
//!
//! Produces a flat token stream in which every input byte belongs to exactly
//! one token. Names keep their qualification (`Foo`, `Foo\Bar`, `\Foo`,
//! `namespace\Foo`) and compound tokens such as `?->`, `...` and the callable
//! marker `(...)` stay atomic, which is what the scope builder and the
//! rewriter rely on.

pub mod keyword;
pub mod lexer;
pub mod source;
pub mod token;

pub use keyword::Keyword;
pub use lexer::{tokenize, tokenize_code};
pub use source::SourceUnit;
pub use token::{NameKind, Token, TokenKind};
