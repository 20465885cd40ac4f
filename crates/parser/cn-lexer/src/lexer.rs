//! Lossless tokenizer
//!
//! Every byte of the input ends up in exactly one token, so concatenating the
//! token texts reproduces the input. Bytes that match no rule become
//! [`TokenKind::Error`] tokens and lexing carries on.

use crate::keyword::Keyword;
use crate::token::{NameKind, Token, TokenKind};
use cn_span::Span;
use logos::Logos;

/// Consume a heredoc or nowdoc body up to and including its closing label
fn lex_heredoc(lex: &mut logos::Lexer<RawToken>) -> bool {
    let label = lex
        .slice()
        .trim_start_matches("<<<")
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'')
        .to_string();
    let rest = lex.remainder();
    let mut offset = 0;

    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_start_matches([' ', '\t']);
        if let Some(after) = trimmed.strip_prefix(label.as_str()) {
            let continues_name = after
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii());
            if !continues_name {
                lex.bump(offset + (line.len() - trimmed.len()) + label.len());
                return true;
            }
        }
        offset += line.len();
    }

    // Unterminated: swallow the rest of the input
    lex.bump(rest.len());
    true
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[ \t\r\n\x0C]+")]
    Whitespace,

    #[regex(r"//[^\r\n]*")]
    #[regex(r"#[^\[\r\n][^\r\n]*")]
    #[token("#")]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    #[regex(r"'([^'\\]|\\(.|\n))*'")]
    #[regex(r#""([^"\\]|\\(.|\n))*""#)]
    #[regex(r"`([^`\\]|\\(.|\n))*`")]
    #[regex(r#"<<<[ \t]*("?[a-zA-Z_][a-zA-Z0-9_]*"?|'[a-zA-Z_][a-zA-Z0-9_]*')\r?\n"#, lex_heredoc)]
    String,

    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[bB][01_]+")]
    #[regex(r"0[oO][0-7_]+")]
    Number,

    #[regex(r"\$[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*")]
    Variable,

    #[regex(r"\\?[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*(\\[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*)*")]
    Name,

    #[token("?>")]
    CloseTag,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("#[")]
    AttributeOpen,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token("::")]
    DoubleColon,

    #[token("?")]
    Question,

    #[token("\\")]
    Backslash,

    #[token("$")]
    Dollar,

    #[token("->")]
    Arrow,

    #[token("?->")]
    NullsafeArrow,

    #[token("=>")]
    DoubleArrow,

    #[token("...")]
    Ellipsis,

    #[token("&")]
    Amp,

    #[token("|")]
    Pipe,

    #[token("=")]
    Equals,

    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("**")]
    #[token(".")]
    #[token("!")]
    #[token("~")]
    #[token("^")]
    #[token("@")]
    #[token("<")]
    #[token(">")]
    #[token("<=")]
    #[token(">=")]
    #[token("==")]
    #[token("!=")]
    #[token("<>")]
    #[token("===")]
    #[token("!==")]
    #[token("<=>")]
    #[token("&&")]
    #[token("||")]
    #[token("??")]
    #[token("++")]
    #[token("--")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token(".=")]
    #[token("%=")]
    #[token("**=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<")]
    #[token(">>")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("??=")]
    Operator,
}

impl RawToken {
    fn kind(self, text: &str) -> TokenKind {
        match self {
            Self::Whitespace => TokenKind::Whitespace,
            Self::Comment => TokenKind::Comment,
            Self::String => TokenKind::String,
            Self::Number => TokenKind::Number,
            Self::Variable => TokenKind::Variable,
            Self::Name => match NameKind::of(text) {
                NameKind::Unqualified => Keyword::from_word(text)
                    .filter(|keyword| !keyword.is_contextual())
                    .map_or(TokenKind::Name(NameKind::Unqualified), TokenKind::Keyword),
                kind => TokenKind::Name(kind),
            },
            Self::CloseTag => TokenKind::CloseTag,
            Self::LParen => TokenKind::LParen,
            Self::RParen => TokenKind::RParen,
            Self::LBrace => TokenKind::LBrace,
            Self::RBrace => TokenKind::RBrace,
            Self::LBracket => TokenKind::LBracket,
            Self::RBracket => TokenKind::RBracket,
            Self::AttributeOpen => TokenKind::AttributeOpen,
            Self::Semicolon => TokenKind::Semicolon,
            Self::Comma => TokenKind::Comma,
            Self::Colon => TokenKind::Colon,
            Self::DoubleColon => TokenKind::DoubleColon,
            Self::Question => TokenKind::Question,
            Self::Backslash => TokenKind::Backslash,
            Self::Dollar => TokenKind::Dollar,
            Self::Arrow => TokenKind::Arrow,
            Self::NullsafeArrow => TokenKind::NullsafeArrow,
            Self::DoubleArrow => TokenKind::DoubleArrow,
            Self::Ellipsis => TokenKind::Ellipsis,
            Self::Amp => TokenKind::Amp,
            Self::Pipe => TokenKind::Pipe,
            Self::Equals => TokenKind::Equals,
            Self::Operator => TokenKind::Operator,
        }
    }
}

/// Tokenize a whole source file: text before the first open tag is inline HTML
pub fn tokenize(text: &str) -> Vec<Token> {
    Tokenizer::new(text).run(false)
}

/// Tokenize a code fragment that starts inside `<?php` (no open tag needed)
pub fn tokenize_code(text: &str) -> Vec<Token> {
    Tokenizer::new(text).run(true)
}

struct Tokenizer<'src> {
    text: &'src str,
    tokens: Vec<Token>,
}

impl<'src> Tokenizer<'src> {
    fn new(text: &'src str) -> Self {
        Self {
            text,
            tokens: Vec::new(),
        }
    }

    fn run(mut self, start_in_code: bool) -> Vec<Token> {
        let mut pos = 0;
        let mut in_code = start_in_code;

        while pos < self.text.len() {
            if in_code {
                pos = self.lex_code(pos);
                in_code = false;
            } else {
                match find_open_tag(&self.text[pos..]) {
                    Some((html_len, tag_len)) => {
                        self.push(TokenKind::InlineHtml, pos, pos + html_len);
                        self.push(TokenKind::OpenTag, pos + html_len, pos + html_len + tag_len);
                        pos += html_len + tag_len;
                        in_code = true;
                    }
                    None => {
                        self.push(TokenKind::InlineHtml, pos, self.text.len());
                        pos = self.text.len();
                    }
                }
            }
        }

        let mut tokens = merge_callable_markers(self.tokens);
        promote_contextual_keywords(&mut tokens);

        tracing::trace!(tokens = tokens.len(), bytes = self.text.len(), "tokenized source");
        tokens
    }

    /// Lex PHP code from `start` until a close tag or the end of input.
    /// Returns the offset where inline HTML resumes.
    fn lex_code(&mut self, start: usize) -> usize {
        let source = &self.text[start..];
        let mut lexer = RawToken::lexer(source);
        let mut cursor = start;

        while let Some(result) = lexer.next() {
            let range = lexer.span();
            let (token_start, token_end) = (start + range.start, start + range.end);
            if token_start > cursor {
                self.push(TokenKind::Error, cursor, token_start);
            }
            let kind = match result {
                Ok(raw) => raw.kind(lexer.slice()),
                Err(()) => TokenKind::Error,
            };
            self.push(kind, token_start, token_end);
            cursor = token_end;
            if kind == TokenKind::CloseTag {
                return cursor;
            }
        }

        if cursor < self.text.len() {
            self.push(TokenKind::Error, cursor, self.text.len());
        }
        self.text.len()
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        if start == end {
            return;
        }
        let text = &self.text[start..end];
        self.tokens
            .push(Token::new(kind, Span::from_range(start..end), text));
    }
}

/// Joins `(`, `...` and `)`, with only whitespace between them, into one
/// callable marker. A `(` followed by `...` and anything else stays a plain
/// parenthesis opening a spread argument or a variadic parameter.
fn merge_callable_markers(tokens: Vec<Token>) -> Vec<Token> {
    let groups: Vec<(usize, usize)> = (0..tokens.len())
        .filter_map(|start| callable_marker_end(&tokens, start).map(|end| (start, end)))
        .collect();
    if groups.is_empty() {
        return tokens;
    }

    let mut merged = Vec::with_capacity(tokens.len());
    let mut groups = groups.into_iter().peekable();
    let mut marker: Option<Token> = None;
    for (index, token) in tokens.into_iter().enumerate() {
        match groups.peek().copied() {
            Some((start, end)) if (start..=end).contains(&index) => {
                let at = token.span.start;
                let current = marker.get_or_insert_with(|| {
                    Token::new(TokenKind::CallableMarker, Span::new(at, at), "")
                });
                current.text.push_str(&token.text);
                current.span.end = token.span.end;
                if index == end {
                    merged.extend(marker.take());
                    groups.next();
                }
            }
            _ => merged.push(token),
        }
    }
    merged
}

/// Index of the `)` closing a callable marker whose `(` is at `start`
fn callable_marker_end(tokens: &[Token], start: usize) -> Option<usize> {
    let mut index = start;
    for (step, kind) in [TokenKind::LParen, TokenKind::Ellipsis, TokenKind::RParen]
        .into_iter()
        .enumerate()
    {
        if step > 0 {
            index += 1;
            while tokens.get(index)?.kind == TokenKind::Whitespace {
                index += 1;
            }
        }
        if tokens.get(index)?.kind != kind {
            return None;
        }
    }
    Some(index)
}

/// Turns contextual keywords back into keywords where they act as one
fn promote_contextual_keywords(tokens: &mut [Token]) {
    let significant: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| !token.is_trivia())
        .map(|(index, _)| index)
        .collect();

    for (pos, &index) in significant.iter().enumerate() {
        let token = &tokens[index];
        if token.kind != TokenKind::Name(NameKind::Unqualified) {
            continue;
        }
        let Some(keyword) = Keyword::from_word(&token.text).filter(|keyword| keyword.is_contextual())
        else {
            continue;
        };

        let prev = pos.checked_sub(1).map(|prev| &tokens[significant[prev]]);
        let next = significant.get(pos + 1).map(|&next| &tokens[next]);
        let promote = match keyword {
            Keyword::Enum => {
                next.is_some_and(|next| next.kind == TokenKind::Name(NameKind::Unqualified))
                    && prev.is_none_or(|prev| {
                        !matches!(
                            prev.kind,
                            TokenKind::Arrow | TokenKind::NullsafeArrow | TokenKind::DoubleColon
                        )
                    })
            }
            Keyword::From => prev.is_some_and(|prev| prev.is_keyword(Keyword::Yield)),
            _ => false,
        };
        if promote {
            tokens[index].kind = TokenKind::Keyword(keyword);
        }
    }
}

/// Finds `<?php` (plus one trailing line break or space) or `<?=`.
/// Returns the length of the preceding HTML and of the tag itself.
fn find_open_tag(text: &str) -> Option<(usize, usize)> {
    for (index, _) in text.match_indices("<?") {
        let after = &text[index + 2..];
        if after.starts_with('=') {
            return Some((index, 3));
        }
        let is_php = after
            .get(..3)
            .is_some_and(|word| word.eq_ignore_ascii_case("php"));
        if !is_php {
            continue;
        }
        let rest = &after[3..];
        if rest.is_empty() {
            return Some((index, 5));
        }
        if rest.starts_with("\r\n") {
            return Some((index, 7));
        }
        if rest.starts_with([' ', '\t', '\n', '\r']) {
            return Some((index, 6));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    fn significant(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
        tokens
            .iter()
            .filter(|token| !token.is_trivia())
            .map(|token| (token.kind, token.text.as_str()))
            .collect()
    }

    fn dump(tokens: &[Token]) -> String {
        tokens
            .iter()
            .filter(|token| !token.is_trivia())
            .map(|token| format!("{:?} {:?}\n", token.kind, token.text))
            .collect()
    }

    #[test]
    fn test_round_trip_preserves_bytes() {
        let source = "<html>\n<?php\n// comment\n$f = function (Foo\\Bar $x) use (&$y): ?int {\n    return $x?->y ?? <<<EOT\n  text {$y}\n  EOT;\n};\n?>\n</html>\n";
        let tokens = tokenize(source);
        let rebuilt: String = tokens.iter().map(|token| token.text.as_str()).collect();
        assert_eq!(rebuilt, source);
        assert_eq!(tokens[0].kind, TokenKind::InlineHtml);
        assert_eq!(tokens[1].kind, TokenKind::OpenTag);
        assert_eq!(tokens[1].text, "<?php\n");
        assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::InlineHtml));
    }

    #[test]
    fn test_compound_tokens_stay_atomic() {
        let tokens = tokenize_code("$f(...); foo( ... ); [...$a]; $o?->p; A::b; fn () => 1;");
        let kinds: Vec<TokenKind> = significant(&tokens).into_iter().map(|(kind, _)| kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Variable,
                TokenKind::CallableMarker,
                TokenKind::Semicolon,
                TokenKind::Name(NameKind::Unqualified),
                TokenKind::CallableMarker,
                TokenKind::Semicolon,
                TokenKind::LBracket,
                TokenKind::Ellipsis,
                TokenKind::Variable,
                TokenKind::RBracket,
                TokenKind::Semicolon,
                TokenKind::Variable,
                TokenKind::NullsafeArrow,
                TokenKind::Name(NameKind::Unqualified),
                TokenKind::Semicolon,
                TokenKind::Name(NameKind::Unqualified),
                TokenKind::DoubleColon,
                TokenKind::Name(NameKind::Unqualified),
                TokenKind::Semicolon,
                TokenKind::Keyword(Keyword::Fn),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::DoubleArrow,
                TokenKind::Number,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_spread_arguments_and_variadics() {
        let source = "max(...$xs); function (...$args) {}; new Foo(...$xs); f( ... );";
        let tokens = tokenize_code(source);
        let rebuilt: String = tokens.iter().map(|token| token.text.as_str()).collect();
        assert_eq!(rebuilt, source);
        expect![[r#"
            Name(Unqualified) "max"
            LParen "("
            Ellipsis "..."
            Variable "$xs"
            RParen ")"
            Semicolon ";"
            Keyword(Function) "function"
            LParen "("
            Ellipsis "..."
            Variable "$args"
            RParen ")"
            LBrace "{"
            RBrace "}"
            Semicolon ";"
            Keyword(New) "new"
            Name(Unqualified) "Foo"
            LParen "("
            Ellipsis "..."
            Variable "$xs"
            RParen ")"
            Semicolon ";"
            Name(Unqualified) "f"
            CallableMarker "( ... )"
            Semicolon ";"
        "#]]
        .assert_eq(&dump(&tokens));
    }

    #[test]
    fn test_callable_marker_spans_lines() {
        let tokens = tokenize_code("$f = strlen(\n    ...\n);");
        let marker = tokens
            .iter()
            .find(|token| token.kind == TokenKind::CallableMarker)
            .expect("marker");
        assert_eq!(marker.text, "(\n    ...\n)");
        assert_eq!(marker.span, Span::new(11, 22));
    }

    #[test]
    fn test_contextual_keywords_depend_on_position() {
        let source = "enum Suit: string {} new Enum(); Enum::A; function (Enum $e) {} yield from gen(); From::x;";
        let tokens = tokenize_code(source);
        let contextual: Vec<(TokenKind, &str)> = significant(&tokens)
            .into_iter()
            .filter(|(_, text)| text.eq_ignore_ascii_case("enum") || text.eq_ignore_ascii_case("from"))
            .collect();
        let name = TokenKind::Name(NameKind::Unqualified);
        assert_eq!(
            contextual,
            vec![
                (TokenKind::Keyword(Keyword::Enum), "enum"),
                (name, "Enum"),
                (name, "Enum"),
                (name, "Enum"),
                (TokenKind::Keyword(Keyword::From), "from"),
                (name, "From"),
            ]
        );
    }

    #[test]
    fn test_names_and_keywords() {
        let tokens = tokenize_code("new \\Foo\\Bar; Baz\\Qux; namespace\\Local; STATIC; self");
        expect![[r#"
            Keyword(New) "new"
            Name(FullyQualified) "\\Foo\\Bar"
            Semicolon ";"
            Name(Qualified) "Baz\\Qux"
            Semicolon ";"
            Name(Relative) "namespace\\Local"
            Semicolon ";"
            Keyword(Static) "STATIC"
            Semicolon ";"
            Name(Unqualified) "self"
        "#]]
        .assert_eq(&dump(&tokens));
    }

    #[test]
    fn test_group_use_prefix_splits_backslash() {
        let tokens = tokenize_code("use A\\{B, C};");
        let parts = significant(&tokens);
        assert_eq!(parts[1], (TokenKind::Name(NameKind::Unqualified), "A"));
        assert_eq!(parts[2], (TokenKind::Backslash, "\\"));
        assert_eq!(parts[3], (TokenKind::LBrace, "{"));
    }

    #[test]
    fn test_comments_and_attributes() {
        let tokens = tokenize_code("# note\n#[Attr]\n/* block */ $a;");
        let parts = significant(&tokens);
        assert_eq!(parts[0], (TokenKind::AttributeOpen, "#["));
        assert_eq!(parts[1], (TokenKind::Name(NameKind::Unqualified), "Attr"));
        assert_eq!(parts[2], (TokenKind::RBracket, "]"));
        assert_eq!(parts[3], (TokenKind::Variable, "$a"));
        assert_eq!(tokens.iter().filter(|token| token.kind == TokenKind::Comment).count(), 2);
    }

    #[test]
    fn test_heredoc_is_one_string() {
        let source = "$a = <<<'SQL'\nselect * from t;\nSQL;\n";
        let tokens = tokenize_code(source);
        let strings: Vec<&Token> = tokens
            .iter()
            .filter(|token| token.kind == TokenKind::String)
            .collect();
        assert_eq!(strings.len(), 1);
        assert_eq!(strings[0].text, "<<<'SQL'\nselect * from t;\nSQL");
    }

    #[test]
    fn test_malformed_input_yields_error_marker() {
        let source = "$a = 'unterminated;\n$b = 1;";
        let tokens = tokenize_code(source);
        let rebuilt: String = tokens.iter().map(|token| token.text.as_str()).collect();
        assert_eq!(rebuilt, source);
        assert!(tokens.iter().any(|token| token.kind == TokenKind::Error));
        assert!(tokens.iter().any(|token| token.text == "$b"));
    }
}
