//! Static-Data Extractor.
//!
//! Evaluates literal type expressions into JSON values. Extraction is all
//! or nothing: one non-literal member anywhere makes the whole expression
//! dynamic.

use serde_json::{Map, Number, Value};

use crate::program::ast::{Literal, TypeNode};

/// Evaluate a literal type expression.
///
/// Supports string, number (including negative), boolean and `null`
/// literals, object types whose members are all literal, and tuples whose
/// elements are all literal. Type references are not followed.
///
/// # Example
///
/// ```rust
/// use mcpkit_compiler::literal::extract_literal;
/// use mcpkit_compiler::program::ast::{Literal, TypeNode};
///
/// let ty = TypeNode::Literal(Literal::Number(-3.0));
/// assert_eq!(extract_literal(&ty), Some(serde_json::json!(-3)));
/// ```
#[must_use]
pub fn extract_literal(ty: &TypeNode) -> Option<Value> {
    match ty {
        TypeNode::Literal(literal) => literal_value(literal),
        TypeNode::Object(object) => {
            if object.index.is_some() {
                return None;
            }
            let mut map = Map::new();
            for member in &object.members {
                if member.optional {
                    return None;
                }
                map.insert(member.name.clone(), extract_literal(&member.ty)?);
            }
            Some(Value::Object(map))
        }
        TypeNode::Tuple(elements) => elements
            .iter()
            .map(|element| {
                if element.optional || element.rest {
                    None
                } else {
                    extract_literal(&element.ty)
                }
            })
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        _ => None,
    }
}

fn literal_value(literal: &Literal) -> Option<Value> {
    match literal {
        Literal::String(s) => Some(Value::String(s.clone())),
        Literal::Number(n) => number_value(*n),
        Literal::Bool(b) => Some(Value::Bool(*b)),
        Literal::Null => Some(Value::Null),
        Literal::Undefined => None,
    }
}

/// Integral values within `i64` become JSON integers.
pub(crate) fn number_value(n: f64) -> Option<Value> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let integral = n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64;
    if integral {
        #[allow(clippy::cast_possible_truncation)]
        return Some(Value::Number(Number::from(n as i64)));
    }
    Number::from_f64(n).map(Value::Number)
}

/// Render a JSON value as a literal type expression.
///
/// The output parses back to a type that [`extract_literal`] maps to the
/// same value.
#[must_use]
pub fn to_type_source(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let parts: Vec<_> = items.iter().map(to_type_source).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let parts: Vec<_> = map
                .iter()
                .map(|(key, value)| format!("{}: {};", property_key(key), to_type_source(value)))
                .collect();
            format!("{{ {} }}", parts.join(" "))
        }
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn property_key(key: &str) -> String {
    let mut chars = key.chars();
    let identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if identifier {
        key.to_string()
    } else {
        quote(key)
    }
}
