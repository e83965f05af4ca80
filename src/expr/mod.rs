//! Arithmetic expressions inside template placeholders

pub mod ast;
pub mod error;
pub mod eval;
pub mod grammar;
pub mod lexer;

pub use ast::{BinaryOp, Expr, Span, Spanned};
pub use error::ExprError;
pub use eval::evaluate;
pub use grammar::parse;

use crate::catalog::Catalog;

/// Parse and evaluate in one step
pub fn evaluate_str(source: &str, catalog: &Catalog) -> Result<f64, ExprError> {
    let expr = parse(source)?;
    evaluate(&expr, catalog)
}
