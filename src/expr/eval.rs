//! Tree-walking evaluator over `f64`

use crate::catalog::{Catalog, Value};

use super::ast::{BinaryOp, Expr, Spanned};
use super::error::ExprError;

/// Evaluate an expression, resolving identifiers through the catalog
///
/// Every intermediate result must be finite; `inf` and `NaN` never reach a
/// document.
pub fn evaluate(expr: &Spanned<Expr>, catalog: &Catalog) -> Result<f64, ExprError> {
    let value = evaluate_node(expr, catalog)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExprError::NonFiniteResult {
            span: expr.span.clone(),
        })
    }
}

fn evaluate_node(expr: &Spanned<Expr>, catalog: &Catalog) -> Result<f64, ExprError> {
    match &expr.node {
        Expr::Number(n) => Ok(*n),
        Expr::Variable(id) => match catalog.resolve(id) {
            Ok(Value::Number(n)) => Ok(*n),
            Ok(Value::Text(_)) => Err(ExprError::NonNumericValue {
                identifier: id.to_string(),
                span: expr.span.clone(),
            }),
            Err(_) => Err(ExprError::UnresolvedReference {
                identifier: id.to_string(),
                span: expr.span.clone(),
            }),
        },
        Expr::UnknownVariable(text) => Err(ExprError::UnresolvedReference {
            identifier: text.clone(),
            span: expr.span.clone(),
        }),
        Expr::Neg(inner) => Ok(-evaluate(inner, catalog)?),
        Expr::Binary { op, lhs, rhs } => {
            let l = evaluate(lhs, catalog)?;
            let r = evaluate(rhs, catalog)?;
            match op {
                BinaryOp::Add => Ok(l + r),
                BinaryOp::Sub => Ok(l - r),
                BinaryOp::Mul => Ok(l * r),
                BinaryOp::Div if r == 0.0 => Err(ExprError::DivisionByZero {
                    span: expr.span.clone(),
                }),
                BinaryOp::Div => Ok(l / r),
            }
        }
    }
}
