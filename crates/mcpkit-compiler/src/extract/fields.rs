//! Readers for the literal metadata members of a capability type.

use mcpkit_core::naming::to_snake_case;
use mcpkit_core::types::{DeclarationKind, Hidden};

use crate::checker::Shape;
use crate::program::ast::{Literal, TypeNode};

/// A string literal member.
pub(crate) fn string_field<'u>(shape: &Shape<'u>, name: &str) -> Option<&'u str> {
    shape.get(name)?.member.ty.as_str_literal()
}

/// A boolean literal member.
pub(crate) fn bool_field(shape: &Shape<'_>, name: &str) -> Option<bool> {
    shape.get(name)?.member.ty.as_bool_literal()
}

/// A numeric literal member.
pub(crate) fn number_field(shape: &Shape<'_>, name: &str) -> Option<f64> {
    shape.get(name)?.member.ty.as_number_literal()
}

/// The `hidden` member.
pub(crate) fn hidden(shape: &Shape<'_>, interface_name: &str) -> Hidden {
    let Some(member) = shape.get("hidden") else {
        return Hidden::Absent;
    };
    match &member.member.ty {
        TypeNode::Literal(Literal::Bool(value)) => Hidden::Static(*value),
        TypeNode::Reference { name, .. } => Hidden::Predicate(name.clone()),
        _ => Hidden::Predicate(format!("{interface_name}.hidden")),
    }
}

/// Skill names from the `skill` member.
pub(crate) fn memberships(shape: &Shape<'_>) -> Vec<String> {
    let Some(member) = shape.get("skill") else {
        return Vec::new();
    };
    let mut names = Vec::new();
    string_literals(&member.member.ty, &mut names);
    names
}

fn string_literals(ty: &TypeNode, out: &mut Vec<String>) {
    match ty {
        TypeNode::Literal(Literal::String(s)) => {
            if !out.contains(s) {
                out.push(s.clone());
            }
        }
        TypeNode::Union(parts) => parts.iter().for_each(|part| string_literals(part, out)),
        TypeNode::Tuple(elements) => elements
            .iter()
            .for_each(|element| string_literals(&element.ty, out)),
        TypeNode::Array(inner) => string_literals(inner, out),
        _ => {}
    }
}

/// Derive a declaration name from the type's name: a leading `I` prefix
/// and the kind suffix are dropped, the rest is snake-cased.
///
/// `GetWeatherTool` becomes `get_weather`, `IReportPrompt` becomes `report`.
pub(crate) fn derive_name(type_name: &str, kind: DeclarationKind) -> String {
    let suffix = match kind {
        DeclarationKind::ServerMeta => "Server",
        DeclarationKind::Tool => "Tool",
        DeclarationKind::Resource => "Resource",
        DeclarationKind::Prompt => "Prompt",
        DeclarationKind::Router => "Router",
        DeclarationKind::Skill => "Skill",
        DeclarationKind::Subscription => "Subscription",
        DeclarationKind::Completion => "Completion",
    };

    let mut base = type_name;
    let mut chars = base.chars();
    if chars.next() == Some('I') && chars.next().is_some_and(char::is_uppercase) {
        base = &base[1..];
    }
    if let Some(stripped) = base.strip_suffix(suffix) {
        if !stripped.is_empty() {
            base = stripped;
        }
    }
    to_snake_case(base)
}

/// A literal number as a TCP port.
pub(crate) fn port(value: f64) -> Option<u16> {
    let valid = value.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&value);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    valid.then(|| value as u16)
}
