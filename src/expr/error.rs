//! Expression errors

use chumsky::error::{Rich, RichPattern};
use thiserror::Error;

use super::ast::Span;
use super::lexer::{describe, Token};

/// Errors from parsing or evaluating an expression
///
/// Spans are byte offsets into the expression source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("malformed expression at {span:?}: unexpected {}", .found.as_deref().unwrap_or("end of input"))]
    Malformed {
        span: Span,
        /// Offending token text, `None` at end of input
        found: Option<String>,
        expected: Vec<String>,
    },

    #[error("unresolved reference '{identifier}'")]
    UnresolvedReference { identifier: String, span: Span },

    #[error("variable '{identifier}' is not numeric")]
    NonNumericValue { identifier: String, span: Span },

    #[error("division by zero")]
    DivisionByZero { span: Span },

    #[error("result is not a finite number")]
    NonFiniteResult { span: Span },
}

impl ExprError {
    pub fn span(&self) -> &Span {
        match self {
            ExprError::Malformed { span, .. }
            | ExprError::UnresolvedReference { span, .. }
            | ExprError::NonNumericValue { span, .. }
            | ExprError::DivisionByZero { span }
            | ExprError::NonFiniteResult { span } => span,
        }
    }

    /// Shift spans by `offset`, used when the expression is embedded in a larger text
    pub fn offset(mut self, offset: usize) -> Self {
        let span = match &mut self {
            ExprError::Malformed { span, .. }
            | ExprError::UnresolvedReference { span, .. }
            | ExprError::NonNumericValue { span, .. }
            | ExprError::DivisionByZero { span }
            | ExprError::NonFiniteResult { span } => span,
        };
        *span = span.start + offset..span.end + offset;
        self
    }

    /// A character the lexer could not turn into a token
    pub(crate) fn unexpected_char(source: &str, span: Span) -> Self {
        let found = source.get(span.clone()).map(|s| format!("'{}'", s));
        ExprError::Malformed {
            span,
            found,
            expected: Vec::new(),
        }
    }
}

impl<'a> From<Rich<'a, Token>> for ExprError {
    fn from(err: Rich<'a, Token>) -> Self {
        let mut expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(describe(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                _ => None,
            })
            .collect();
        expected.sort();
        expected.dedup();

        ExprError::Malformed {
            span: err.span().into_range(),
            found: err.found().map(describe),
            expected,
        }
    }
}
