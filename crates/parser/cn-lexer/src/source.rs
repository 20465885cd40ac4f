//! A tokenized unit of source text

use crate::lexer::{tokenize, tokenize_code};
use crate::token::Token;
use cn_span::{LineIndex, SourceKey};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source text together with its lossless token stream
#[derive(Clone, Debug)]
pub struct SourceUnit {
    /// Full text of the unit
    pub text: Arc<str>,
    /// Every token, trivia included
    pub tokens: Vec<Token>,
    /// Indices into `tokens` of the non-trivia tokens
    pub significant: Vec<usize>,
    /// Line lookup for byte offsets
    pub lines: LineIndex,
    /// Originating file, absent for snippets
    pub path: Option<PathBuf>,
    /// Cache identity, absent for snippets
    pub key: Option<SourceKey>,
}

impl SourceUnit {
    /// Tokenizes a complete file, leading inline HTML included
    pub fn new(path: impl AsRef<Path>, text: Arc<str>) -> Self {
        let path = path.as_ref();
        let key = SourceKey::for_text(path, &text);
        let tokens = tokenize(&text);
        Self::from_parts(text, tokens, Some(path.to_path_buf()), Some(key))
    }

    /// Tokenizes a bare code fragment such as a canonical closure
    pub fn snippet(text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        let tokens = tokenize_code(&text);
        Self::from_parts(text, tokens, None, None)
    }

    fn from_parts(
        text: Arc<str>,
        tokens: Vec<Token>,
        path: Option<PathBuf>,
        key: Option<SourceKey>,
    ) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.is_trivia())
            .map(|(index, _)| index)
            .collect();
        let lines = LineIndex::new(&text);
        Self {
            text,
            tokens,
            significant,
            lines,
            path,
            key,
        }
    }

    /// 1-based line of the token at `index`
    pub fn line_of(&self, index: usize) -> u32 {
        self.lines.line_of(self.tokens[index].span.start)
    }

    /// 1-based column of the token at `index`
    pub fn column_of(&self, index: usize) -> u32 {
        self.lines.column_of(self.tokens[index].span.start)
    }

    /// Position of token `index` within `significant`, or of the next
    /// significant token after it
    pub fn significant_position(&self, index: usize) -> usize {
        self.significant.partition_point(|&significant| significant < index)
    }

    /// The significant token at position `position`
    pub fn significant_token(&self, position: usize) -> Option<&Token> {
        self.significant
            .get(position)
            .map(|&index| &self.tokens[index])
    }

    /// Text covered by the tokens in `range`
    pub fn text_of(&self, range: std::ops::Range<usize>) -> String {
        self.tokens[range]
            .iter()
            .map(|token| token.text.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn test_file_unit_tracks_lines() {
        let unit = SourceUnit::new("/tmp/a.php", Arc::from("<?php\n\n$f = fn () => 1;\n"));
        let position = unit
            .tokens
            .iter()
            .position(|token| token.text == "fn")
            .expect("fn token");
        assert_eq!(unit.line_of(position), 3);
        assert_eq!(unit.column_of(position), 6);
        assert!(unit.key.is_some());
    }

    #[test]
    fn test_snippet_skips_trivia() {
        let unit = SourceUnit::snippet("function () { /* c */ return 1; }");
        let kinds: Vec<TokenKind> = unit
            .significant
            .iter()
            .map(|&index| unit.tokens[index].kind)
            .collect();
        assert!(!kinds.contains(&TokenKind::Comment));
        assert!(!kinds.contains(&TokenKind::Whitespace));
        assert_eq!(unit.text_of(0..unit.tokens.len()), "function () { /* c */ return 1; }");
        assert!(unit.path.is_none());
    }

    #[test]
    fn test_significant_position() {
        let unit = SourceUnit::snippet("a  b");
        assert_eq!(unit.significant, vec![0, 2]);
        assert_eq!(unit.significant_position(1), 1);
        assert_eq!(unit.significant_position(2), 1);
        assert_eq!(unit.significant_token(1).map(|token| token.text.as_str()), Some("b"));
    }
}
