//! Splits template text into literal and placeholder segments
//!
//! `{` opens a placeholder closed by the first unescaped `}`. `\{` and `\}`
//! produce literal braces; any other backslash is kept as is.

use crate::catalog::{is_identifier, Catalog, Value, VariableId};
use crate::expr::{self, Expr, ExprError, Span, Spanned};

/// A piece of a scanned template
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A `{...}` placeholder, classified once when the template is scanned
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// Byte range of the whole placeholder including braces
    pub span: Span,
    /// Byte range of the text between the braces
    pub content: Span,
    pub kind: PlaceholderKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaceholderKind {
    /// `name` or `name:default`
    Reference {
        name: String,
        name_span: Span,
        /// `None` when the name is not a valid variable (`$unknown`, `L0`)
        id: Option<VariableId>,
        default: Option<Value>,
    },
    /// Anything else; spans inside the expression are relative to `content.start`
    Expression(Result<Spanned<Expr>, ExprError>),
}

impl Placeholder {
    fn classify(source: &str, span: Span, content: Span) -> Self {
        let text = &source[content.clone()];
        let (head, default) = match text.split_once(':') {
            Some((head, default)) => (head, Some(default)),
            None => (text, None),
        };
        let name = head.trim();

        let kind = if is_reference_name(name) {
            let leading = head.len() - head.trim_start().len();
            let start = content.start + leading;
            PlaceholderKind::Reference {
                name: name.to_string(),
                name_span: start..start + name.len(),
                id: VariableId::parse(name).ok(),
                default: default.map(|d| Value::parse_literal(&unescape(d.trim()))),
            }
        } else {
            PlaceholderKind::Expression(expr::parse(text))
        };

        Self {
            span,
            content,
            kind,
        }
    }

    /// Compute the placeholder's value; error spans are absolute
    pub fn value(&self, catalog: &Catalog) -> Result<Value, ExprError> {
        match &self.kind {
            PlaceholderKind::Reference {
                name,
                name_span,
                id,
                default,
            } => {
                let value = id
                    .as_ref()
                    .and_then(|id| catalog.resolve(id).ok())
                    .or(default.as_ref())
                    .cloned()
                    .ok_or_else(|| ExprError::UnresolvedReference {
                        identifier: name.clone(),
                        span: name_span.clone(),
                    })?;
                match value {
                    Value::Number(n) if !n.is_finite() => Err(ExprError::NonFiniteResult {
                        span: name_span.clone(),
                    }),
                    value => Ok(value),
                }
            }
            PlaceholderKind::Expression(parsed) => {
                let offset = self.content.start;
                let expr = parsed.as_ref().map_err(|e| e.clone().offset(offset))?;
                expr::evaluate(expr, catalog)
                    .map(Value::Number)
                    .map_err(|e| e.offset(offset))
            }
        }
    }

    /// Variables this placeholder reads, with the inline default for bare references
    pub fn variables(&self) -> Vec<(VariableId, Option<Value>)> {
        match &self.kind {
            PlaceholderKind::Reference { id, default, .. } => id
                .iter()
                .map(|id| (id.clone(), default.clone()))
                .collect(),
            PlaceholderKind::Expression(Ok(expr)) => {
                let mut ids = Vec::new();
                expr.node.variables(&mut ids);
                ids.into_iter().map(|id| (id.clone(), None)).collect()
            }
            PlaceholderKind::Expression(Err(_)) => Vec::new(),
        }
    }
}

/// `$name` or a plain identifier, with no operators
fn is_reference_name(text: &str) -> bool {
    is_identifier(text.strip_prefix('$').unwrap_or(text))
}

fn unescape(text: &str) -> String {
    text.replace("\\{", "{").replace("\\}", "}")
}

/// Result of scanning a template
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scan {
    pub segments: Vec<Segment>,
    /// Span from an unclosed `{` to the end of the input
    pub truncated: Option<Span>,
}

/// Scan template text into segments
pub fn scan(source: &str) -> Scan {
    let mut scan = Scan::default();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&(_, brace @ ('{' | '}'))) => {
                    literal.push(brace);
                    chars.next();
                }
                _ => literal.push('\\'),
            },
            '{' => {
                let mut close = None;
                while let Some((j, d)) = chars.next() {
                    match d {
                        '\\' => {
                            if let Some(&(_, '{' | '}')) = chars.peek() {
                                chars.next();
                            }
                        }
                        '}' => {
                            close = Some(j);
                            break;
                        }
                        _ => {}
                    }
                }

                if !literal.is_empty() {
                    scan.segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                match close {
                    Some(j) => scan.segments.push(Segment::Placeholder(Placeholder::classify(
                        source,
                        i..j + 1,
                        i + 1..j,
                    ))),
                    None => {
                        scan.truncated = Some(i..source.len());
                        break;
                    }
                }
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        scan.segments.push(Segment::Literal(literal));
    }
    scan
}

/// Every placeholder in a template, in order
pub fn scan_placeholders(source: &str) -> Vec<Placeholder> {
    scan(source)
        .segments
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Placeholder(p) => Some(p),
            Segment::Literal(_) => None,
        })
        .collect()
}
