//! Locating literal closures by line

use crate::error::LocateError;
use crate::origin::ClosureOrigin;
use crate::{FunctionForm, FunctionSpan};
use cn_lexer::{Keyword, SourceUnit, Token, TokenKind};
use cn_resolve::ScopeTable;
use cn_span::Span;

/// Cursor over the significant tokens of a unit
pub(crate) struct Cursor<'unit> {
    unit: &'unit SourceUnit,
}

impl<'unit> Cursor<'unit> {
    pub(crate) fn new(unit: &'unit SourceUnit) -> Self {
        Self { unit }
    }

    pub(crate) fn tok(&self, pos: usize) -> Option<&'unit Token> {
        self.unit.significant_token(pos)
    }

    fn is(&self, pos: usize, kind: TokenKind) -> bool {
        self.tok(pos).is_some_and(|token| token.kind == kind)
    }

    /// Position of the closer matching the opener at `pos`
    pub(crate) fn matching(&self, pos: usize) -> Option<usize> {
        let mut depth = 0u32;
        let mut p = pos;
        while let Some(token) = self.tok(p) {
            if token.is_opener() {
                depth += 1;
            } else if token.is_closer() {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(p);
                }
            }
            p += 1;
        }
        None
    }

    /// Last position of a `function (…) use (…): T { … }` closure whose
    /// parameter list opens at `params`
    fn closure_end(&self, params: usize) -> Option<usize> {
        let mut p = self.matching(params)? + 1;
        if self.tok(p).is_some_and(|token| token.is_keyword(Keyword::Use)) {
            if !self.is(p + 1, TokenKind::LParen) {
                return None;
            }
            p = self.matching(p + 1)? + 1;
        }
        while let Some(token) = self.tok(p) {
            match token.kind {
                TokenKind::LBrace => return self.matching(p),
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::CloseTag => return None,
                _ => p += 1,
            }
        }
        None
    }

    /// Last position of an `fn (…) => expr` arrow function
    fn arrow_end(&self, params: usize) -> Option<usize> {
        let mut p = self.matching(params)? + 1;
        while let Some(token) = self.tok(p) {
            match token.kind {
                TokenKind::DoubleArrow => break,
                TokenKind::LBrace | TokenKind::Semicolon => return None,
                _ => p += 1,
            }
        }
        p += 1;

        let mut depth = 0u32;
        let mut last = None;
        while let Some(token) = self.tok(p) {
            if depth == 0
                && matches!(
                    token.kind,
                    TokenKind::Comma
                        | TokenKind::Semicolon
                        | TokenKind::RParen
                        | TokenKind::RBracket
                        | TokenKind::RBrace
                        | TokenKind::CloseTag
                )
            {
                break;
            }
            if token.is_opener() {
                depth += 1;
            } else if token.is_closer() {
                depth -= 1;
            }
            last = Some(p);
            p += 1;
        }
        last
    }
}

/// A closure keyword and the extent it introduces
#[derive(Debug)]
struct Candidate {
    start: usize,
    keyword: usize,
    end: usize,
    form: FunctionForm,
}

/// Finds the closure or arrow function described by `origin`
pub fn locate_closure(
    unit: &SourceUnit,
    table: &ScopeTable,
    origin: &ClosureOrigin,
) -> Result<FunctionSpan, LocateError> {
    let cursor = Cursor::new(unit);
    let mut candidates = Vec::new();
    let mut unbalanced = None;

    for (pos, &index) in unit.significant.iter().enumerate() {
        let token = &unit.tokens[index];
        let form = match token.keyword() {
            Some(Keyword::Function) => FunctionForm::Closure,
            Some(Keyword::Fn) => FunctionForm::Arrow,
            _ => continue,
        };

        // `$o->fn(…)`, `A::function(…)` and `function fn(…)` name members
        let member_name = pos
            .checked_sub(1)
            .and_then(|prev| cursor.tok(prev))
            .is_some_and(|prev| {
                matches!(
                    prev.kind,
                    TokenKind::Arrow
                        | TokenKind::NullsafeArrow
                        | TokenKind::DoubleColon
                        | TokenKind::Keyword(Keyword::Function)
                )
            });
        if member_name {
            continue;
        }

        let mut params = pos + 1;
        if cursor.is(params, TokenKind::Amp) {
            params += 1;
        }
        if !cursor.is(params, TokenKind::LParen) {
            continue;
        }

        let after_static = pos
            .checked_sub(1)
            .and_then(|prev| cursor.tok(prev))
            .is_some_and(|prev| prev.is_keyword(Keyword::Static));
        let start = if after_static { pos - 1 } else { pos };
        let on_line = unit.line_of(index) == origin.line
            || unit.line_of(unit.significant[start]) == origin.line;
        if !on_line {
            continue;
        }

        let end = match form {
            FunctionForm::Arrow => cursor.arrow_end(params),
            _ => cursor.closure_end(params),
        };
        let Some(end) = end else {
            unbalanced.get_or_insert(token.span);
            continue;
        };

        candidates.push(Candidate {
            start,
            keyword: pos,
            end,
            form,
        });
    }

    if candidates.is_empty() {
        return Err(match unbalanced {
            Some(span) => LocateError::Unbalanced { span },
            None => LocateError::NoClosureOnLine { line: origin.line },
        });
    }
    let found = candidates.len();

    let best = candidates
        .into_iter()
        .filter(|candidate| {
            origin.end_line.is_none_or(|end_line| {
                unit.line_of(unit.significant[candidate.end]) == end_line
            })
        })
        .filter(|candidate| {
            origin.column.is_none_or(|column| {
                let start = unit.significant[candidate.start];
                let keyword = unit.significant[candidate.keyword];
                unit.column_of(start) == column || unit.column_of(keyword) == column
            })
        })
        .min_by_key(|candidate| {
            let start = unit.tokens[unit.significant[candidate.start]].span.start;
            let end = unit.tokens[unit.significant[candidate.end]].span.end;
            end - start
        })
        .ok_or(LocateError::NoMatchingExtent { line: origin.line })?;

    let first = unit.significant[best.start];
    let last = unit.significant[best.end];
    let span = Span::new(unit.tokens[first].span.start, unit.tokens[last].span.end);
    let frame = table.frame_at(span.start);

    tracing::debug!(
        line = origin.line,
        candidates = found,
        form = %best.form,
        start = span.start,
        end = span.end,
        "selected closure"
    );

    Ok(FunctionSpan {
        tokens: first..last + 1,
        span,
        form: best.form,
        frame,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cn_resolve::ScopeTableBuilder;

    fn locate(source: &str, origin: &ClosureOrigin) -> Result<String, LocateError> {
        let unit = SourceUnit::snippet(source);
        let table = ScopeTableBuilder::build(&unit);
        locate_closure(&unit, &table, origin).map(|span| unit.text_of(span.tokens))
    }

    #[test]
    fn test_closure_with_use_and_return_type() {
        let source = "$a = 1;\n$f = function (int $x) use (&$a): int {\n    return $x + $a;\n};\n";
        assert_eq!(
            locate(source, &ClosureOrigin::at_line(2)).as_deref(),
            Ok("function (int $x) use (&$a): int {\n    return $x + $a;\n}")
        );
    }

    #[test]
    fn test_static_prefix_is_included() {
        let source = "$f = static fn ($x) => $x;\n";
        assert_eq!(
            locate(source, &ClosureOrigin::at_line(1)).as_deref(),
            Ok("static fn ($x) => $x")
        );
    }

    #[test]
    fn test_nested_arrow_functions() {
        let source = "$f = static fn (array $xs): array => array_map(fn ($x) => $x * 2, $xs);\n";
        assert_eq!(
            locate(source, &ClosureOrigin::at_line(1)).as_deref(),
            Ok("fn ($x) => $x * 2")
        );
    }

    #[test]
    fn test_column_and_end_line_select_among_candidates() {
        let source = "$pair = [function () { return 1; }, static function () {\n    return 2;\n}];\n";

        let by_end = ClosureOrigin {
            line: 1,
            end_line: Some(3),
            column: None,
        };
        assert_eq!(
            locate(source, &by_end).as_deref(),
            Ok("static function () {\n    return 2;\n}")
        );

        let by_column = ClosureOrigin {
            line: 1,
            end_line: None,
            column: Some(10),
        };
        assert_eq!(
            locate(source, &by_column).as_deref(),
            Ok("function () { return 1; }")
        );
    }

    #[test]
    fn test_smallest_span_wins() {
        let source = "$f = function () { return function () { return 1; }; };\n";
        assert_eq!(
            locate(source, &ClosureOrigin::at_line(1)).as_deref(),
            Ok("function () { return 1; }")
        );
    }

    #[test]
    fn test_arrow_stops_at_statement_end() {
        let source = "$f = fn (Role $r) => match ($r) { Role::A => 1, default => 2 };\n";
        assert_eq!(
            locate(source, &ClosureOrigin::at_line(1)).as_deref(),
            Ok("fn (Role $r) => match ($r) { Role::A => 1, default => 2 }")
        );
    }

    #[test]
    fn test_misses_are_reported() {
        let source = "$f = function () {};\n\n$g = 1;\n";
        assert_eq!(
            locate(source, &ClosureOrigin::at_line(3)),
            Err(LocateError::NoClosureOnLine { line: 3 })
        );

        let wrong_end = ClosureOrigin {
            line: 1,
            end_line: Some(9),
            column: None,
        };
        assert_eq!(
            locate(source, &wrong_end),
            Err(LocateError::NoMatchingExtent { line: 1 })
        );
    }

    #[test]
    fn test_member_names_spelled_like_keywords() {
        let source = "$f = function ($o) { return $o->fn(1) + $o?->function(2) + Api::fn(3); };\n";
        assert_eq!(
            locate(source, &ClosureOrigin::at_line(1)).as_deref(),
            Ok("function ($o) { return $o->fn(1) + $o?->function(2) + Api::fn(3); }")
        );
    }

    #[test]
    fn test_unbalanced_candidate_does_not_hide_others() {
        let source = "$f = fn ($x) => $x; $g = function () {\n";
        assert_eq!(
            locate(source, &ClosureOrigin::at_line(1)).as_deref(),
            Ok("fn ($x) => $x")
        );

        let unit = SourceUnit::snippet("$g = function () {\n");
        let table = ScopeTableBuilder::build(&unit);
        assert!(matches!(
            locate_closure(&unit, &table, &ClosureOrigin::at_line(1)),
            Err(LocateError::Unbalanced { .. })
        ));
    }

    #[test]
    fn test_named_functions_are_not_closures() {
        let source = "function named() { return 1; }\n";
        assert_eq!(
            locate(source, &ClosureOrigin::at_line(1)),
            Err(LocateError::NoClosureOnLine { line: 1 })
        );
    }
}
