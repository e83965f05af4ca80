//! Expression syntax tree

use crate::catalog::VariableId;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A node with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(VariableId),
    /// Identifier text that does not name any variable (`$unknown`, `L0`)
    UnknownVariable(String),
    Neg(Box<Spanned<Expr>>),
    Binary {
        op: BinaryOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
}

impl Expr {
    /// Classify identifier text into a variable reference
    pub fn reference(text: &str) -> Expr {
        match VariableId::parse(text) {
            Ok(id) => Expr::Variable(id),
            Err(_) => Expr::UnknownVariable(text.to_string()),
        }
    }

    /// Build a binary node spanning both operands
    pub fn binary(op: BinaryOp, lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> Spanned<Expr> {
        let span = lhs.span.start..rhs.span.end;
        Spanned::new(
            Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    /// Collect every variable the expression references, in source order
    pub fn variables<'a>(&'a self, out: &mut Vec<&'a VariableId>) {
        match self {
            Expr::Number(_) | Expr::UnknownVariable(_) => {}
            Expr::Variable(id) => out.push(id),
            Expr::Neg(inner) => inner.node.variables(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.node.variables(out);
                rhs.node.variables(out);
            }
        }
    }
}
