//! Resolver errors with template positions

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::expr::{ExprError, Span};

/// What went wrong in a placeholder
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveErrorKind {
    #[error("malformed expression")]
    MalformedExpression {
        found: Option<String>,
        expected: Vec<String>,
    },

    #[error("unresolved reference '{identifier}'")]
    UnresolvedReference { identifier: String },

    #[error("variable '{identifier}' is not numeric")]
    NonNumericValue { identifier: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFiniteResult,

    #[error("placeholder is never closed")]
    TruncatedPlaceholder,
}

/// A resolver error located in the template text
///
/// `span` is a byte range; `line` and `column` are 1-based, the column
/// counted in characters.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl ResolveError {
    pub fn new(kind: ResolveErrorKind, span: Span, lines: &LineIndex) -> Self {
        let (line, column) = lines.location(span.start);
        Self {
            kind,
            span,
            line,
            column,
        }
    }

    /// Convert an expression error whose spans are already absolute
    pub fn from_expr(err: ExprError, lines: &LineIndex) -> Self {
        let span = err.span().clone();
        let kind = match err {
            ExprError::Malformed {
                found, expected, ..
            } => ResolveErrorKind::MalformedExpression { found, expected },
            ExprError::UnresolvedReference { identifier, .. } => {
                ResolveErrorKind::UnresolvedReference { identifier }
            }
            ExprError::NonNumericValue { identifier, .. } => {
                ResolveErrorKind::NonNumericValue { identifier }
            }
            ExprError::DivisionByZero { .. } => ResolveErrorKind::DivisionByZero,
            ExprError::NonFiniteResult { .. } => ResolveErrorKind::NonFiniteResult,
        };
        Self::new(kind, span, lines)
    }

    /// Identifier involved in the error, if any
    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            ResolveErrorKind::UnresolvedReference { identifier }
            | ResolveErrorKind::NonNumericValue { identifier } => Some(identifier),
            _ => None,
        }
    }

    /// Format the error with source context using ariadne
    pub fn report(&self, source: &str, filename: &str) -> String {
        let message = self.kind.to_string();
        let detail = match &self.kind {
            ResolveErrorKind::MalformedExpression { found, expected } => {
                let found = found.as_deref().unwrap_or("end of input");
                if expected.is_empty() {
                    format!("unexpected {}", found)
                } else {
                    format!("unexpected {}, expected {}", found, expected.join(", "))
                }
            }
            _ => message.clone(),
        };

        // ariadne counts characters, not bytes
        let start = char_offset(source, self.span.start);
        let end = char_offset(source, self.span.end).max(start + 1);

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, start)
            .with_message(&message)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(detail)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

fn char_offset(source: &str, byte: usize) -> usize {
    source
        .get(..byte.min(source.len()))
        .map(|prefix| prefix.chars().count())
        .unwrap_or(0)
}

/// Maps byte offsets to 1-based line and column numbers
#[derive(Debug, Clone)]
pub struct LineIndex {
    source: String,
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source: source.to_string(),
            line_starts,
        }
    }

    pub fn location(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.source.len());
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = self
            .source
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (line, column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        let lines = LineIndex::new("G0 X0\nG1 {L1}\n\nM30");
        assert_eq!(lines.location(0), (1, 1));
        assert_eq!(lines.location(3), (1, 4));
        assert_eq!(lines.location(6), (2, 1));
        assert_eq!(lines.location(9), (2, 4));
        assert_eq!(lines.location(14), (3, 1));
        assert_eq!(lines.location(15), (4, 1));
    }

    #[test]
    fn test_columns_count_characters() {
        let lines = LineIndex::new("(Ø10) {L1}");
        // 'Ø' is two bytes
        assert_eq!(lines.location(7), (1, 7));
    }

    #[test]
    fn test_display() {
        let lines = LineIndex::new("G1 {L1}");
        let err = ResolveError::new(
            ResolveErrorKind::UnresolvedReference {
                identifier: "L1".to_string(),
            },
            4..6,
            &lines,
        );
        assert_eq!(err.to_string(), "unresolved reference 'L1' at line 1, column 5");
        assert_eq!(err.identifier(), Some("L1"));
    }

    #[test]
    fn test_report_mentions_message() {
        let source = "G1 X{1/0}";
        let lines = LineIndex::new(source);
        let err = ResolveError::new(ResolveErrorKind::DivisionByZero, 5..8, &lines);
        let report = err.report(source, "hinge.gcode");
        assert!(report.contains("division by zero"));
        assert!(report.contains("hinge.gcode"));
    }
}
