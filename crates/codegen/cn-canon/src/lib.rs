//! Canonical source rendering
//!
//! Concatenates rewritten tokens back into text and attaches a content
//! signature, so callers can compare, hash or memoize closures by their
//! canonical form.

use cn_lexer::Token;
use cn_span::content_hash;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Concatenates token texts verbatim
pub fn render(tokens: &[Token]) -> String {
    let capacity = tokens.iter().map(|token| token.text.len()).sum();
    tokens
        .iter()
        .fold(String::with_capacity(capacity), |mut code, token| {
            code.push_str(&token.text);
            code
        })
}

/// 64-bit content signature of canonical code
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[display("{_0:016x}")]
pub struct Signature(pub u64);

impl Signature {
    /// Signature of `code`
    pub fn of(code: &str) -> Self {
        Self(content_hash(code))
    }
}

/// Canonical text of a function value
#[derive(Clone, Debug, Display, Serialize, Deserialize)]
#[display("{code}")]
pub struct CanonicalSource {
    /// Rendered code
    pub code: String,
    /// Signature of `code`
    pub signature: Signature,
}

impl CanonicalSource {
    /// Wraps already rendered code
    pub fn new(code: String) -> Self {
        let signature = Signature::of(&code);
        Self { code, signature }
    }

    /// Renders `tokens`
    pub fn from_tokens(tokens: &[Token]) -> Self {
        Self::new(render(tokens))
    }

    /// Renders a synthesized header followed by a body
    pub fn from_parts(header: &[Token], body: &[Token]) -> Self {
        let mut code = render(header);
        code.push_str(&render(body));
        Self::new(code)
    }
}

impl PartialEq for CanonicalSource {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for CanonicalSource {}

impl Hash for CanonicalSource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cn_lexer::tokenize_code;
    use std::collections::HashSet;

    #[test]
    fn test_render_is_verbatim() {
        let code = "function () {\n    // keep\n    return \\strlen('a');\n}";
        assert_eq!(render(&tokenize_code(code)), code);
    }

    #[test]
    fn test_from_parts() {
        let header = tokenize_code("static function ");
        let body = tokenize_code("(): int { return 1; }");
        let source = CanonicalSource::from_parts(&header, &body);
        assert_eq!(source.code, "static function (): int { return 1; }");
        assert_eq!(source.signature, Signature::of(&source.code));
        assert_eq!(source.signature.to_string().len(), 16);
    }

    #[test]
    fn test_identity_is_the_code() {
        let one = CanonicalSource::new("fn () => 1".to_string());
        let two = CanonicalSource::from_tokens(&tokenize_code("fn () => 1"));
        let other = CanonicalSource::new("fn () => 2".to_string());

        let set: HashSet<CanonicalSource> = [one.clone(), two, other].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&one));
    }

    #[test]
    fn test_serializes_with_signature() {
        let source = CanonicalSource::new("fn () => 1".to_string());
        let json = serde_json::to_value(&source).expect("serializable");
        assert_eq!(json["code"], "fn () => 1");
        assert_eq!(json["signature"], source.signature.0);
    }
}
