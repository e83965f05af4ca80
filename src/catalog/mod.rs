//! Variable catalog: typed identifiers, values, defaults and bindings
//!
//! A catalog holds every variable a template may reference. Each entry has an
//! optional declared default (from a profile) and an optional explicit binding
//! (system variables and project overrides). Resolution prefers the binding,
//! then the default; a variable with neither is unbound and never coerced.

pub mod system;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use system::SystemVar;

/// Number of fractional digits used when a value is displayed without options
pub const DEFAULT_DECIMALS: usize = 4;

/// Errors raised while classifying identifiers or querying the catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("invalid variable identifier: '{text}'")]
    InvalidIdentifier { text: String },

    #[error("unknown system variable: '${name}'")]
    UnknownSystemVariable { name: String },

    #[error("variable {id} is declared twice")]
    DuplicateDeclaration { id: VariableId },

    #[error("variable {id} has no value and no default")]
    Unbound { id: VariableId },
}

/// Identity of a variable, classified once from its textual form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariableId {
    /// Profile-local numbered variable `L<n>`, `n >= 1`
    LVar(u32),
    /// User-named variable
    Custom(String),
    /// Variable from the fixed `$` vocabulary
    System(SystemVar),
}

impl VariableId {
    /// Classify identifier text (`$name`, `L<n>` or a custom name)
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        if let Some(name) = text.strip_prefix('$') {
            return SystemVar::from_name(name)
                .map(VariableId::System)
                .ok_or_else(|| CatalogError::UnknownSystemVariable {
                    name: name.to_string(),
                });
        }

        if !is_identifier(text) {
            return Err(CatalogError::InvalidIdentifier {
                text: text.to_string(),
            });
        }

        if let Some(digits) = lvar_digits(text) {
            // L0 and zero-padded indices look like L-variables but are not valid ones
            return match digits.parse::<u32>() {
                Ok(n) if n > 0 && !digits.starts_with('0') => Ok(VariableId::LVar(n)),
                _ => Err(CatalogError::InvalidIdentifier {
                    text: text.to_string(),
                }),
            };
        }

        Ok(VariableId::Custom(text.to_string()))
    }

    pub fn is_system(&self) -> bool {
        matches!(self, VariableId::System(_))
    }
}

impl From<SystemVar> for VariableId {
    fn from(var: SystemVar) -> Self {
        VariableId::System(var)
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableId::LVar(n) => write!(f, "L{}", n),
            VariableId::Custom(name) => f.write_str(name),
            VariableId::System(var) => write!(f, "${}", var),
        }
    }
}

/// Returns true for `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Digits of an `L<digits>` identifier, if it has that shape
fn lvar_digits(text: &str) -> Option<&str> {
    let digits = text.strip_prefix('L')?;
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

/// A variable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Parse a literal: numeric text becomes a number, anything else stays text
    pub fn parse_literal(text: &str) -> Value {
        match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(text.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Render the value for substitution into a document
    pub fn render(&self, decimals: usize) -> String {
        match self {
            Value::Number(n) => format_number(*n, decimals),
            Value::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(DEFAULT_DECIMALS))
    }
}

/// Format a number with at most `decimals` fractional digits, trailing zeros trimmed
pub fn format_number(value: f64, decimals: usize) -> String {
    let mut text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

#[derive(Debug, Clone, Default)]
struct Entry {
    declared: bool,
    default: Option<Value>,
    binding: Option<Value>,
}

/// Registry of variables with declared defaults and explicit bindings
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<VariableId, Entry>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable with an optional default
    pub fn declare(&mut self, id: VariableId, default: Option<Value>) -> Result<(), CatalogError> {
        let entry = self.entries.entry(id.clone()).or_default();
        if entry.declared {
            return Err(CatalogError::DuplicateDeclaration { id });
        }
        entry.declared = true;
        entry.default = default;
        Ok(())
    }

    /// Bind an explicit value, replacing any earlier binding
    pub fn bind(&mut self, id: VariableId, value: impl Into<Value>) -> Option<Value> {
        self.entries.entry(id).or_default().binding.replace(value.into())
    }

    /// Explicit binding only
    pub fn lookup(&self, id: &VariableId) -> Option<&Value> {
        self.entries.get(id).and_then(|e| e.binding.as_ref())
    }

    pub fn default_of(&self, id: &VariableId) -> Option<&Value> {
        self.entries.get(id).and_then(|e| e.default.as_ref())
    }

    /// Binding, then declared default, else `Unbound`
    pub fn resolve(&self, id: &VariableId) -> Result<&Value, CatalogError> {
        self.lookup(id)
            .or_else(|| self.default_of(id))
            .ok_or_else(|| CatalogError::Unbound { id: id.clone() })
    }

    pub fn is_declared(&self, id: &VariableId) -> bool {
        self.entries.get(id).is_some_and(|e| e.declared)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every known variable with its effective value, sorted by identifier
    pub fn variables(&self) -> Vec<(&VariableId, Option<&Value>)> {
        let mut vars: Vec<_> = self
            .entries
            .iter()
            .map(|(id, e)| (id, e.binding.as_ref().or(e.default.as_ref())))
            .collect();
        vars.sort_by(|a, b| a.0.cmp(b.0));
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifiers() {
        assert_eq!(VariableId::parse("L1").unwrap(), VariableId::LVar(1));
        assert_eq!(VariableId::parse("L12").unwrap(), VariableId::LVar(12));
        assert_eq!(
            VariableId::parse("depth").unwrap(),
            VariableId::Custom("depth".to_string())
        );
        assert_eq!(
            VariableId::parse("$frame_height").unwrap(),
            VariableId::System(SystemVar::FrameHeight)
        );
        // Letters after the digits make it an ordinary name
        assert_eq!(
            VariableId::parse("L1x").unwrap(),
            VariableId::Custom("L1x".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_bad_identifiers() {
        assert!(matches!(
            VariableId::parse("L0"),
            Err(CatalogError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            VariableId::parse("L01"),
            Err(CatalogError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            VariableId::parse("2x"),
            Err(CatalogError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            VariableId::parse("$nope"),
            Err(CatalogError::UnknownSystemVariable { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(VariableId::LVar(3).to_string(), "L3");
        assert_eq!(VariableId::System(SystemVar::PmPosition(2)).to_string(), "$pm2_position");
    }

    #[test]
    fn test_resolution_order() {
        let mut catalog = Catalog::new();
        let id = VariableId::LVar(1);
        assert!(matches!(catalog.resolve(&id), Err(CatalogError::Unbound { .. })));

        catalog.declare(id.clone(), Some(Value::Number(10.0))).unwrap();
        assert_eq!(catalog.resolve(&id).unwrap(), &Value::Number(10.0));
        assert_eq!(catalog.lookup(&id), None);

        catalog.bind(id.clone(), 7.0);
        assert_eq!(catalog.resolve(&id).unwrap(), &Value::Number(7.0));
        assert_eq!(catalog.default_of(&id), Some(&Value::Number(10.0)));
    }

    #[test]
    fn test_declared_without_default_is_unbound() {
        let mut catalog = Catalog::new();
        let id = VariableId::Custom("feed".to_string());
        catalog.declare(id.clone(), None).unwrap();
        assert!(catalog.is_declared(&id));
        assert_eq!(catalog.resolve(&id), Err(CatalogError::Unbound { id }));
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut catalog = Catalog::new();
        catalog.declare(VariableId::LVar(2), None).unwrap();
        let err = catalog.declare(VariableId::LVar(2), None).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateDeclaration {
                id: VariableId::LVar(2)
            }
        );
    }

    #[test]
    fn test_binding_before_declaration_keeps_binding() {
        let mut catalog = Catalog::new();
        let id = VariableId::LVar(4);
        catalog.bind(id.clone(), 3.0);
        catalog.declare(id.clone(), Some(Value::Number(9.0))).unwrap();
        assert_eq!(catalog.resolve(&id).unwrap(), &Value::Number(3.0));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(14.0, 4), "14");
        assert_eq!(format_number(2.5, 4), "2.5");
        assert_eq!(format_number(1.0 / 3.0, 4), "0.3333");
        assert_eq!(format_number(-0.00001, 4), "0");
        assert_eq!(format_number(120.0, 0), "120");
        assert_eq!(format_number(-12.76, 1), "-12.8");
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(Value::parse_literal("10"), Value::Number(10.0));
        assert_eq!(Value::parse_literal("-2.5"), Value::Number(-2.5));
        assert_eq!(Value::parse_literal("G54"), Value::Text("G54".to_string()));
        assert_eq!(Value::parse_literal("inf"), Value::Text("inf".to_string()));
    }
}
