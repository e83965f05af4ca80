//! Template resolution - expands placeholders against a catalog

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::catalog::{Catalog, Value, VariableId, DEFAULT_DECIMALS};

use super::error::{LineIndex, ResolveError, ResolveErrorKind};
use super::scanner::{scan, Segment};
use crate::expr::Span;

/// Options that affect how resolved values are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Maximum fractional digits for non-integral numbers
    pub decimals: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
        }
    }
}

impl ResolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }
}

/// A scanned template, ready to be resolved against any number of catalogs
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    truncated: Option<Span>,
    lines: LineIndex,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let scanned = scan(source);
        Self {
            source: source.to_string(),
            segments: scanned.segments,
            truncated: scanned.truncated,
            lines: LineIndex::new(source),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Resolve every placeholder; all errors of the template are returned together
    pub fn resolve(
        &self,
        catalog: &Catalog,
        options: &ResolverOptions,
    ) -> Result<String, Vec<ResolveError>> {
        let mut output = String::with_capacity(self.source.len());
        let mut errors = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder(placeholder) => match placeholder.value(catalog) {
                    Ok(value) => output.push_str(&value.render(options.decimals)),
                    Err(err) => {
                        trace!(span = ?placeholder.span, error = %err, "placeholder failed");
                        errors.push(ResolveError::from_expr(err, &self.lines));
                    }
                },
            }
        }

        if let Some(span) = &self.truncated {
            errors.push(ResolveError::new(
                ResolveErrorKind::TruncatedPlaceholder,
                span.clone(),
                &self.lines,
            ));
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            Err(errors)
        }
    }

    /// Distinct variables referenced by the template, in order of first use
    ///
    /// Bare references carry their inline default, if any.
    pub fn references(&self) -> Vec<(VariableId, Option<Value>)> {
        let mut refs: Vec<(VariableId, Option<Value>)> = Vec::new();
        for segment in &self.segments {
            let Segment::Placeholder(placeholder) = segment else {
                continue;
            };
            for (id, default) in placeholder.variables() {
                match refs.iter_mut().find(|(known, _)| *known == id) {
                    Some((_, existing)) => {
                        if existing.is_none() {
                            *existing = default;
                        }
                    }
                    None => refs.push((id, default)),
                }
            }
        }
        refs
    }
}

/// Resolve template text with default options
pub fn resolve(source: &str, catalog: &Catalog) -> Result<String, Vec<ResolveError>> {
    Template::parse(source).resolve(catalog, &ResolverOptions::default())
}

/// Distinct variables referenced by template text
pub fn referenced_variables(source: &str) -> Vec<(VariableId, Option<Value>)> {
    Template::parse(source).references()
}
