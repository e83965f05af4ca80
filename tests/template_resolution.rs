//! Integration tests for template resolution against a catalog

use frame_wizard::catalog::{Catalog, SystemVar, Value, VariableId};
use frame_wizard::template::{self, ResolveErrorKind, ResolverOptions, Template};
use pretty_assertions::assert_eq;

fn frame_height() -> VariableId {
    VariableId::System(SystemVar::FrameHeight)
}

#[test]
fn test_text_without_placeholders_is_unchanged() {
    let source = "G21\nG90 ; absolute\nM30\n";
    assert_eq!(template::resolve(source, &Catalog::new()).unwrap(), source);
}

#[test]
fn test_bare_reference_binding_then_default() {
    let mut catalog = Catalog::new();
    catalog.bind(frame_height(), 5.0);
    assert_eq!(template::resolve("{$frame_height}", &catalog).unwrap(), "5");

    let mut catalog = Catalog::new();
    catalog.declare(frame_height(), Some(Value::Number(3.0))).unwrap();
    assert_eq!(template::resolve("{$frame_height}", &catalog).unwrap(), "3");

    let errors = template::resolve("{$frame_height}", &Catalog::new()).unwrap_err();
    assert_eq!(
        errors[0].kind,
        ResolveErrorKind::UnresolvedReference {
            identifier: "$frame_height".to_string()
        }
    );
}

#[test]
fn test_inline_default_and_binding() {
    assert_eq!(template::resolve("{L1:10}", &Catalog::new()).unwrap(), "10");

    let mut catalog = Catalog::new();
    catalog.bind(VariableId::LVar(1), 7.0);
    assert_eq!(template::resolve("{L1:10}", &catalog).unwrap(), "7");
}

#[test]
fn test_expressions() {
    let mut catalog = Catalog::new();
    catalog.bind(VariableId::LVar(1), 4.0);
    assert_eq!(template::resolve("{2*(L1+3)}", &catalog).unwrap(), "14");

    let errors = template::resolve("{1/0}", &catalog).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ResolveErrorKind::DivisionByZero);
}

#[test]
fn test_non_finite_numbers_never_reach_output() {
    let huge = format!("G0 Z{{{}}}", "9".repeat(400));
    let errors = template::resolve(&huge, &Catalog::new()).unwrap_err();
    assert!(matches!(
        errors[0].kind,
        ResolveErrorKind::MalformedExpression { .. }
    ));

    let mut catalog = Catalog::new();
    catalog.bind(VariableId::LVar(1), 1e200);
    let errors = template::resolve("G0 X{L1} Z{L1*L1}", &catalog).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ResolveErrorKind::NonFiniteResult);
    assert_eq!((errors[0].line, errors[0].column), (1, 12));
}

#[test]
fn test_escaped_braces() {
    let mut catalog = Catalog::new();
    catalog.bind(VariableId::Custom("depth".to_string()), 12.5);
    assert_eq!(
        template::resolve(r"(\{depth\}) Z-{depth}", &catalog).unwrap(),
        "({depth}) Z-12.5"
    );
}

#[test]
fn test_truncated_placeholder_position() {
    let errors = template::resolve("G0 X0\nG1 X{L1", &Catalog::new()).unwrap_err();
    let last = errors.last().unwrap();
    assert_eq!(last.kind, ResolveErrorKind::TruncatedPlaceholder);
    assert_eq!((last.line, last.column), (2, 5));
}

#[test]
fn test_colon_in_expression_is_malformed() {
    let errors = template::resolve("{L1 + 2:5}", &Catalog::new()).unwrap_err();
    assert!(matches!(
        errors[0].kind,
        ResolveErrorKind::MalformedExpression { .. }
    ));
}

#[test]
fn test_text_value_in_arithmetic() {
    let mut catalog = Catalog::new();
    catalog.bind(VariableId::Custom("tool".to_string()), "T2");
    assert_eq!(template::resolve("M6 {tool}", &catalog).unwrap(), "M6 T2");

    let errors = template::resolve("{tool + 1}", &catalog).unwrap_err();
    assert_eq!(errors[0].identifier(), Some("tool"));
    assert!(matches!(
        errors[0].kind,
        ResolveErrorKind::NonNumericValue { .. }
    ));
}

#[test]
fn test_template_is_reusable_across_catalogs() {
    let template = Template::parse("G0 Y{$position}");
    let options = ResolverOptions::new().with_decimals(2);

    let texts: Vec<String> = [250.0, 1050.0 / 3.0]
        .into_iter()
        .map(|position| {
            let mut catalog = Catalog::new();
            catalog.bind(VariableId::System(SystemVar::Position), position);
            template.resolve(&catalog, &options).unwrap()
        })
        .collect();
    assert_eq!(texts, vec!["G0 Y250", "G0 Y350"]);
}

#[test]
fn test_report_names_template() {
    let source = "G1 F{feed}";
    let errors = template::resolve(source, &Catalog::new()).unwrap_err();
    let report = errors[0].report(source, "lock-std");
    assert!(report.contains("lock-std"));
    assert!(report.contains("feed"));
}
