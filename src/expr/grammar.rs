//! Expression parser using chumsky
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := number | identifier | '(' expr ')' | '-' factor
//! ```

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::ast::{BinaryOp, Expr, Span, Spanned};
use super::error::ExprError;
use super::lexer::{lex, Token};

/// Parse expression source into a syntax tree
///
/// Only the first error is reported; an expression lives inside a single
/// placeholder so later errors rarely add information.
pub fn parse(input: &str) -> Result<Spanned<Expr>, ExprError> {
    let len = input.len();

    let tokens = lex(input).map_err(|span| ExprError::unexpected_char(input, span))?;
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| match errs.into_iter().next() {
            Some(err) => err.into(),
            None => ExprError::Malformed {
                span: len..len,
                found: None,
                expected: Vec::new(),
            },
        })
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> Span {
    e.start()..e.end()
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Spanned<Expr>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let number = select! {
            Token::Number(n) => Expr::Number(n),
        }
        .map_with(|node, e| Spanned::new(node, span_range(&e.span())));

        let variable = select! {
            Token::Ident(name) => name,
        }
        .map_with(|name: String, e| Spanned::new(Expr::reference(&name), span_range(&e.span())));

        let parens = expr
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let atom = choice((number, variable, parens));

        // '-' factor, right associative
        let factor = just(Token::Minus)
            .map_with(|_, e| span_range(&e.span()))
            .repeated()
            .foldr(atom, |minus: Span, operand: Spanned<Expr>| {
                let span = minus.start..operand.span.end;
                Spanned::new(Expr::Neg(Box::new(operand)), span)
            });

        let term = factor.clone().foldl(
            choice((
                just(Token::Star).to(BinaryOp::Mul),
                just(Token::Slash).to(BinaryOp::Div),
            ))
            .then(factor)
            .repeated(),
            |lhs: Spanned<Expr>, (op, rhs): (BinaryOp, Spanned<Expr>)| Expr::binary(op, lhs, rhs),
        );

        term.clone()
            .foldl(
                choice((
                    just(Token::Plus).to(BinaryOp::Add),
                    just(Token::Minus).to(BinaryOp::Sub),
                ))
                .then(term)
                .repeated(),
                |lhs: Spanned<Expr>, (op, rhs): (BinaryOp, Spanned<Expr>)| {
                    Expr::binary(op, lhs, rhs)
                },
            )
            .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SystemVar, VariableId};

    fn binary(expr: &Spanned<Expr>) -> (BinaryOp, &Spanned<Expr>, &Spanned<Expr>) {
        match &expr.node {
            Expr::Binary { op, lhs, rhs } => (*op, lhs, rhs),
            other => panic!("Expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let expr = parse("1 + 2 * 3").expect("Should parse");
        let (op, lhs, rhs) = binary(&expr);
        assert_eq!(op, BinaryOp::Add);
        assert_eq!(lhs.node, Expr::Number(1.0));
        let (inner_op, _, _) = binary(rhs);
        assert_eq!(inner_op, BinaryOp::Mul);
        assert_eq!(expr.span, 0..9);
    }

    #[test]
    fn test_left_associative() {
        let expr = parse("10 - 4 - 3").expect("Should parse");
        let (op, lhs, rhs) = binary(&expr);
        assert_eq!(op, BinaryOp::Sub);
        assert_eq!(rhs.node, Expr::Number(3.0));
        assert_eq!(lhs.span, 0..6);
    }

    #[test]
    fn test_parentheses_and_variables() {
        let expr = parse("2*(L1+$frame_height)").expect("Should parse");
        let (op, _, rhs) = binary(&expr);
        assert_eq!(op, BinaryOp::Mul);
        let (_, a, b) = binary(rhs);
        assert_eq!(a.node, Expr::Variable(VariableId::LVar(1)));
        assert_eq!(
            b.node,
            Expr::Variable(VariableId::System(SystemVar::FrameHeight))
        );
    }

    #[test]
    fn test_unary_minus() {
        let expr = parse("--L2").expect("Should parse");
        assert_eq!(expr.span, 0..4);
        match &expr.node {
            Expr::Neg(inner) => assert!(matches!(inner.node, Expr::Neg(_))),
            other => panic!("Expected negation, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_system_variable_is_kept() {
        let expr = parse("$nope + 1").expect("Should parse");
        let (_, lhs, _) = binary(&expr);
        assert_eq!(lhs.node, Expr::UnknownVariable("$nope".to_string()));
    }

    #[test]
    fn test_malformed_trailing_operator() {
        let err = parse("1 +").unwrap_err();
        match err {
            ExprError::Malformed { span, found, expected } => {
                assert_eq!(span, 3..3);
                assert_eq!(found, None);
                assert!(!expected.is_empty());
            }
            other => panic!("Expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_unclosed_paren() {
        assert!(matches!(
            parse("(1 + 2"),
            Err(ExprError::Malformed { .. })
        ));
    }

    #[test]
    fn test_malformed_character() {
        let err = parse("L1 : 5").unwrap_err();
        assert_eq!(err.span(), &(3..4));
    }

    #[test]
    fn test_empty_is_malformed() {
        assert!(matches!(parse("   "), Err(ExprError::Malformed { .. })));
    }
}
