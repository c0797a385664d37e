//! Custom assertions for mcpkit testing.
//!
//! This module provides assertion helpers for diagnostics, parameter
//! schemas and implementation bindings.

use mcpkit_core::ir::ParseResult;
use mcpkit_core::schema::ParameterSchema;
use mcpkit_core::types::DeclarationKind;
use mcpkit_core::validation::ValidationWarning;

/// Assert that a diagnostic with `rule` was emitted, and return the first.
///
/// # Panics
///
/// Panics if no diagnostic has that rule id.
#[track_caller]
pub fn assert_has_warning<'a>(warnings: &'a [ValidationWarning], rule: &str) -> &'a ValidationWarning {
    match warnings.iter().find(|warning| warning.rule == rule) {
        Some(warning) => warning,
        None => {
            let rules: Vec<&str> = warnings.iter().map(|w| w.rule.as_str()).collect();
            panic!("Expected a '{rule}' diagnostic, but got {rules:?}");
        }
    }
}

/// Assert that no diagnostic with `rule` was emitted.
///
/// # Panics
///
/// Panics if any diagnostic has that rule id.
#[track_caller]
pub fn assert_no_warning(warnings: &[ValidationWarning], rule: &str) {
    if let Some(warning) = warnings.iter().find(|warning| warning.rule == rule) {
        panic!("Expected no '{rule}' diagnostic, but got: {}", warning.message);
    }
}

/// Assert that an object schema requires exactly `expected`, in order.
///
/// # Panics
///
/// Panics if the required property list differs.
#[track_caller]
pub fn assert_required(schema: &ParameterSchema, expected: &[&str]) {
    let actual: Vec<&str> = schema
        .required_properties
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(
        actual, expected,
        "Expected required properties {expected:?}, but got {actual:?}"
    );
}

/// Assert that a declaration exists and is bound to `member`.
///
/// # Panics
///
/// Panics if the declaration is missing or bound elsewhere.
#[track_caller]
pub fn assert_bound(ir: &ParseResult, kind: DeclarationKind, key: &str, member: &str) {
    let Some(declaration) = ir.get(kind, key) else {
        panic!("Expected {kind} '{key}' to be declared");
    };
    assert_eq!(
        declaration.binding_name.as_deref(),
        Some(member),
        "Expected {kind} '{key}' to be bound to '{member}'"
    );
}

/// Macro for asserting that a diagnostic was emitted.
///
/// Accepts anything that dereferences to a slice of warnings.
///
/// # Example
///
/// ```rust
/// use mcpkit_core::validation::{Severity, ValidationWarning};
/// use mcpkit_testing::assert_diagnostic;
///
/// let warnings = vec![ValidationWarning::new("empty-skill", Severity::Warn, "empty")];
/// assert_diagnostic!(warnings, "empty-skill");
/// ```
#[macro_export]
macro_rules! assert_diagnostic {
    ($warnings:expr, $rule:expr) => {
        $crate::assertions::assert_has_warning(&$warnings, $rule)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::weather_ir;
    use mcpkit_core::validation::Severity;

    fn warnings() -> Vec<ValidationWarning> {
        vec![ValidationWarning::new("empty-skill", Severity::Warn, "Skill 'ops' is empty")]
    }

    #[test]
    fn test_assert_has_warning_passes() {
        let warnings = warnings();
        let warning = assert_has_warning(&warnings, "empty-skill");
        assert_eq!(warning.severity, Severity::Warn);
    }

    #[test]
    #[should_panic(expected = "Expected a 'orphaned-hidden-tool' diagnostic")]
    fn test_assert_has_warning_fails() {
        assert_has_warning(&warnings(), "orphaned-hidden-tool");
    }

    #[test]
    #[should_panic(expected = "Expected no 'empty-skill' diagnostic")]
    fn test_assert_no_warning_fails() {
        assert_no_warning(&warnings(), "empty-skill");
    }

    #[test]
    fn test_assert_required_and_bound() {
        let ir = weather_ir();
        let tool = ir.tool("get_weather").and_then(|t| t.as_tool()).expect("tool");
        assert_required(&tool.params, &["location"]);
        assert_bound(&ir, DeclarationKind::Tool, "get_forecast", "getForecast");
    }

    #[test]
    #[should_panic(expected = "to be bound to")]
    fn test_assert_bound_fails() {
        assert_bound(&weather_ir(), DeclarationKind::Tool, "get_weather", "other");
    }

    #[test]
    fn test_macro() {
        let warnings = warnings();
        let found = assert_diagnostic!(warnings, "empty-skill");
        assert_eq!(found.rule, "empty-skill");
    }
}
