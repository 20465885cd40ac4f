//! Synthesizing definitions for first-class callable references

use crate::error::LocateError;
use crate::origin::{CallableReference, Dispatch};
use crate::{FunctionForm, FunctionSpan};
use cn_lexer::{Keyword, SourceUnit, Token, TokenKind};
use cn_resolve::{FunctionDecl, ScopeTable, TypeDecl, TypeKind, Visibility};
use cn_span::Span;

/// An explicit closure standing in for a callable reference
#[derive(Clone, Debug)]
pub struct SynthesizedFunction {
    /// `function ` or `static function `, with `&` for by-reference returns
    pub header: Vec<Token>,
    /// The member from its parameter list through its closing brace
    pub body: FunctionSpan,
    /// The reference this closure stands in for
    pub reference: CallableReference,
    /// How the member is reached
    pub dispatch: Dispatch,
    /// Whether the synthesized closure is static
    pub is_static: bool,
}

/// Resolves `reference` through the declarations of `table` and builds the
/// equivalent closure
pub fn synthesize(
    unit: &SourceUnit,
    table: &ScopeTable,
    reference: &CallableReference,
) -> Result<SynthesizedFunction, LocateError> {
    let (decl, owner) = match &reference.owner {
        Some(owner_name) => {
            let owner = find_owner(table, owner_name)?;
            let decl = table.find_member(owner, &reference.member).ok_or_else(|| {
                LocateError::UnknownMember {
                    name: reference.display_name(),
                    owner_span: Some(owner.span),
                }
            })?;
            (decl, Some(owner))
        }
        None => {
            let decl = table.find_function(&reference.member).ok_or_else(|| {
                LocateError::UnknownMember {
                    name: reference.display_name(),
                    owner_span: None,
                }
            })?;
            (decl, None)
        }
    };

    let keyword_span = unit.tokens[decl.keyword].span;
    if reference.is_static && !decl.modifiers.is_static {
        return Err(LocateError::NotStatic {
            name: reference.display_name(),
            span: keyword_span,
        });
    }
    let body_frame = decl.body.ok_or_else(|| LocateError::MissingBody {
        name: decl.fqn.clone(),
        span: keyword_span,
    })?;
    let close = table
        .frame(body_frame)
        .close
        .ok_or(LocateError::Unbalanced { span: keyword_span })?;

    let span = Span::new(unit.tokens[decl.params].span.start, unit.tokens[close].span.end);
    let body = FunctionSpan {
        tokens: decl.params..close + 1,
        span,
        form: FunctionForm::Member,
        frame: table.frame_at(keyword_span.start),
    };

    let is_static = decl.modifiers.is_static;
    let dispatch = dispatch_for(decl, owner, reference);

    tracing::debug!(
        member = %decl.fqn,
        %dispatch,
        is_static,
        "synthesized callable"
    );

    Ok(SynthesizedFunction {
        header: header(is_static, decl.by_ref, span.start),
        body,
        reference: reference.clone(),
        dispatch,
        is_static,
    })
}

/// The one type `name` can refer to
fn find_owner<'table>(
    table: &'table ScopeTable,
    name: &str,
) -> Result<&'table TypeDecl, LocateError> {
    match table.find_types_named(name).as_slice() {
        [] => Err(LocateError::UnknownType {
            owner: name.to_string(),
        }),
        [decl] => Ok(*decl),
        candidates => Err(LocateError::AmbiguousType {
            owner: name.to_string(),
            candidates: candidates.iter().map(|decl| decl.fqn.clone()).collect(),
        }),
    }
}

/// Direct when no override can be reached from the call site
fn dispatch_for(
    decl: &FunctionDecl,
    owner: Option<&TypeDecl>,
    reference: &CallableReference,
) -> Dispatch {
    let Some(owner) = owner else {
        return Dispatch::Direct;
    };

    let sealed = decl.modifiers.is_final
        || reference.is_final
        || decl.modifiers.visibility == Visibility::Private
        || owner.modifiers.is_final
        || owner.anonymous
        || owner.kind == TypeKind::Enum;

    if sealed {
        Dispatch::Direct
    } else {
        Dispatch::LateBound
    }
}

fn header(is_static: bool, by_ref: bool, at: u32) -> Vec<Token> {
    let span = Span::new(at, at);
    let mut tokens = Vec::new();
    if is_static {
        tokens.push(Token::new(TokenKind::Keyword(Keyword::Static), span, "static"));
        tokens.push(Token::new(TokenKind::Whitespace, span, " "));
    }
    tokens.push(Token::new(TokenKind::Keyword(Keyword::Function), span, "function"));
    tokens.push(Token::new(TokenKind::Whitespace, span, " "));
    if by_ref {
        tokens.push(Token::new(TokenKind::Amp, span, "&"));
    }
    tokens
}
