//! Type→Schema Converter.
//!
//! Lowers TypeScript type expressions into [`ParameterSchema`] trees.
//! Anything the converter cannot express (conditional types, generic
//! instantiation, functions) becomes the opaque `any` schema rather than
//! an error.

use std::path::PathBuf;

use mcpkit_core::schema::{formats, AdditionalProperties, ParameterSchema, SchemaKind};
use mcpkit_core::validation::{Severity, ValidationWarning};
use serde_json::Value;

use crate::checker::{MemberRef, Shape, Symbol, TypeResolver};
use crate::docs::DocComment;
use crate::literal::{extract_literal, number_value};
use crate::program::ast::{Keyword, Literal, Module, TupleElement, TypeNode};

/// Rule id for a parameter-definition constraint that was not kept.
pub const INVALID_CONSTRAINT: &str = "invalid-constraint";

const COUNT_CONSTRAINTS: [&str; 4] = ["minLength", "maxLength", "minItems", "maxItems"];

/// Lowers types to schemas within one program.
///
/// Holds the stack of named types being expanded so recursive types
/// terminate (the recursive occurrence lowers to `any`), and collects
/// diagnostics for constraints it had to drop.
#[derive(Debug)]
pub struct SchemaLowering<'u> {
    resolver: TypeResolver<'u>,
    active: Vec<(PathBuf, String)>,
    diagnostics: Vec<ValidationWarning>,
}

impl<'u> SchemaLowering<'u> {
    /// Create a converter.
    #[must_use]
    pub fn new(resolver: TypeResolver<'u>) -> Self {
        Self {
            resolver,
            active: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Diagnostics collected so far, leaving none behind.
    pub fn take_diagnostics(&mut self) -> Vec<ValidationWarning> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Lower a type expression appearing in `module`.
    pub fn lower(&mut self, module: &'u Module, ty: &'u TypeNode) -> ParameterSchema {
        match ty {
            TypeNode::Keyword(keyword) => lower_keyword(*keyword),
            TypeNode::Literal(literal) => lower_literal(literal),
            TypeNode::Reference { name, args } => self.lower_reference(module, name, args),
            TypeNode::Object(_) | TypeNode::Intersection(_) => {
                match self.resolver.shape_of(module, ty) {
                    Some(shape) => self.lower_shape(&shape),
                    None => ParameterSchema::any(),
                }
            }
            TypeNode::Array(inner) => ParameterSchema::array(self.lower(module, inner)),
            TypeNode::Tuple(elements) => self.lower_tuple(module, elements),
            TypeNode::Union(parts) => self.lower_union(module, parts),
            TypeNode::Function | TypeNode::Other(_) => ParameterSchema::any(),
        }
    }

    /// Lower a member into a property schema, applying optionality,
    /// explicit `required` and member documentation.
    pub fn lower_member(&mut self, member: MemberRef<'u>) -> ParameterSchema {
        let (mut schema, explicit) = match self.definition(member.module, &member.member.ty) {
            Some(definition) => definition,
            None => (self.lower(member.module, &member.member.ty), None),
        };

        schema.required = explicit.unwrap_or(schema.required && !member.member.optional);

        if schema.description.is_none() {
            if let Some(docs) = &member.member.docs {
                schema.description = DocComment::parse(docs).description;
            }
        }
        schema
    }

    /// Lower a parameter container (`params`, `args`): an object type whose
    /// properties may be parameter definitions. Non-object containers lower
    /// to an empty object.
    pub fn lower_params(&mut self, module: &'u Module, ty: &'u TypeNode) -> ParameterSchema {
        match self.resolver.shape_of(module, ty) {
            Some(shape) => self.lower_shape(&shape),
            None => match self.lower(module, ty) {
                schema if schema.kind == SchemaKind::Object => schema,
                _ => ParameterSchema::object(),
            },
        }
    }

    /// Lower the members of an object-like type.
    pub fn lower_shape(&mut self, shape: &Shape<'u>) -> ParameterSchema {
        if shape.members.is_empty() {
            if let Some((module, index)) = shape.index {
                return open_object(self.lower(module, index));
            }
        }

        let mut schema = ParameterSchema::object();
        for (name, member) in &shape.members {
            if member.member.ty == TypeNode::Function {
                continue;
            }
            let property = self.lower_member(*member);
            schema.insert_property(*name, property);
        }
        if let Some((module, index)) = shape.index {
            let values = self.lower(module, index);
            schema.additional_properties = Some(if values.is_any() {
                AdditionalProperties::Boolean(true)
            } else {
                AdditionalProperties::Schema(Box::new(values))
            });
        }
        schema
    }

    fn with_guard(
        &mut self,
        key: (PathBuf, String),
        f: impl FnOnce(&mut Self) -> ParameterSchema,
    ) -> ParameterSchema {
        if self.active.contains(&key) {
            tracing::trace!(name = %key.1, "recursive type lowered to any");
            return ParameterSchema::any();
        }
        self.active.push(key);
        let schema = f(self);
        self.active.pop();
        schema
    }

    fn lower_reference(
        &mut self,
        module: &'u Module,
        name: &'u str,
        args: &'u [TypeNode],
    ) -> ParameterSchema {
        match self.resolver.resolve(module, name) {
            Some(Symbol::Interface {
                module: target,
                name,
            }) => {
                let generic = target
                    .interfaces_named(name)
                    .any(|decl| !decl.type_params.is_empty());
                if generic {
                    return ParameterSchema::any();
                }
                self.with_guard((target.path.clone(), name.to_string()), |this| {
                    let shape = this.resolver.interface_shape(target, name);
                    this.lower_shape(&shape)
                })
            }
            Some(Symbol::Alias {
                module: target,
                decl,
            }) => {
                if !decl.type_params.is_empty() {
                    return ParameterSchema::any();
                }
                self.with_guard((target.path.clone(), decl.name.clone()), |this| {
                    this.lower(target, &decl.value)
                })
            }
            Some(Symbol::Enum { decl, .. }) => ParameterSchema::enumeration(
                decl.values.iter().filter_map(literal_json),
            ),
            Some(Symbol::Class { .. } | Symbol::Const { .. }) => ParameterSchema::any(),
            Some(Symbol::External { name, .. }) => self.lower_builtin(module, &name, args),
            None => {
                let simple = name.rsplit('.').next().unwrap_or(name);
                self.lower_builtin(module, simple, args)
            }
        }
    }

    fn lower_builtin(&mut self, module: &'u Module, name: &str, args: &'u [TypeNode]) -> ParameterSchema {
        let arg = |this: &mut Self, index: usize| {
            args.get(index)
                .map_or_else(ParameterSchema::any, |ty| this.lower(module, ty))
        };
        match name {
            "Array" | "ReadonlyArray" | "Set" | "ReadonlySet" => {
                ParameterSchema::array(arg(self, 0))
            }
            "Record" | "Map" | "ReadonlyMap" => open_object(arg(self, 1)),
            "Promise" | "Awaited" | "Readonly" | "NonNullable" => {
                let mut inner = arg(self, 0);
                if name == "NonNullable" {
                    inner.nullable = false;
                    inner.required = true;
                }
                inner
            }
            "Partial" => {
                let mut inner = arg(self, 0);
                for property in inner.properties.values_mut() {
                    property.required = false;
                }
                inner.required_properties.clear();
                inner
            }
            "Required" => {
                let mut inner = arg(self, 0);
                for property in inner.properties.values_mut() {
                    property.required = true;
                }
                inner.required_properties = inner.properties.keys().cloned().collect();
                inner
            }
            "Date" => ParameterSchema::string().format(formats::DATE_TIME),
            "URL" => ParameterSchema::string().format(formats::URI),
            "String" => ParameterSchema::string(),
            "Number" => ParameterSchema::number(),
            "Boolean" => ParameterSchema::boolean(),
            "BigInt" => ParameterSchema::integer(),
            "Object" => ParameterSchema::open_object(None),
            _ => ParameterSchema::any(),
        }
    }

    fn lower_union(&mut self, module: &'u Module, parts: &'u [TypeNode]) -> ParameterSchema {
        let mut optional = false;
        let mut nullable = false;
        let mut rest: Vec<&'u TypeNode> = Vec::new();

        for part in parts {
            match part {
                TypeNode::Literal(Literal::Undefined) | TypeNode::Keyword(Keyword::Void) => {
                    optional = true;
                }
                TypeNode::Literal(Literal::Null) => nullable = true,
                _ => rest.push(part),
            }
        }

        let mut schema = if rest.is_empty() {
            if nullable {
                nullable = false;
                ParameterSchema::null()
            } else {
                ParameterSchema::any()
            }
        } else if let Some(values) = enum_values(&rest) {
            ParameterSchema::enumeration(values)
        } else if rest.iter().all(|part| part.as_bool_literal().is_some()) {
            let has_true = rest.iter().any(|part| part.as_bool_literal() == Some(true));
            let has_false = rest.iter().any(|part| part.as_bool_literal() == Some(false));
            if has_true && has_false {
                ParameterSchema::boolean()
            } else {
                lower_literal(&Literal::Bool(has_true))
            }
        } else if let [single] = rest.as_slice() {
            self.lower(module, *single)
        } else {
            ParameterSchema::any()
        };

        if nullable && !schema.is_any() {
            schema.nullable = true;
        }
        if optional {
            schema.required = false;
        }
        schema
    }

    fn lower_tuple(&mut self, module: &'u Module, elements: &'u [TupleElement]) -> ParameterSchema {
        let mut items: Vec<ParameterSchema> = Vec::with_capacity(elements.len());
        for element in elements {
            let schema = self.lower(module, &element.ty);
            if element.rest {
                items.push(schema.items.map_or_else(ParameterSchema::any, |items| *items));
            } else {
                items.push(schema);
            }
        }

        let item = match items.split_first() {
            Some((first, others)) if others.iter().all(|other| other == first) => first.clone(),
            _ => ParameterSchema::any(),
        };

        let mut schema = ParameterSchema::array(item);
        let required = elements.iter().filter(|e| !e.optional && !e.rest).count();
        schema.min_items = Some(required as u64);
        if !elements.iter().any(|e| e.rest) {
            schema.max_items = Some(elements.len() as u64);
        }
        schema
    }

    /// Recognize a parameter definition: an object type whose `type` member
    /// names a schema kind. Returns the schema and the explicit `required`
    /// flag, if one was given.
    pub fn definition(
        &mut self,
        module: &'u Module,
        ty: &'u TypeNode,
    ) -> Option<(ParameterSchema, Option<bool>)> {
        let shape = self.resolver.shape_of(module, ty)?;
        let kind = shape
            .get("type")
            .and_then(|member| member.member.ty.as_str_literal())
            .and_then(SchemaKind::from_type_name)?;

        let literal = |name: &str| shape.get(name).and_then(|m| extract_literal(&m.member.ty));
        let string = |name: &str| literal(name).and_then(|v| v.as_str().map(str::to_string));
        let float = |name: &str| literal(name).and_then(|v| v.as_f64());
        let count = |name: &str| literal(name).and_then(|v| v.as_u64());

        let mut schema = ParameterSchema::of_kind(kind);
        schema.description = string("description");
        schema.min_length = count("minLength");
        schema.max_length = count("maxLength");
        schema.pattern = string("pattern");
        schema.format = string("format");
        schema.minimum = float("minimum").or_else(|| float("min"));
        schema.maximum = float("maximum").or_else(|| float("max"));
        schema.exclusive_minimum = float("exclusiveMinimum");
        schema.exclusive_maximum = float("exclusiveMaximum");
        schema.multiple_of = float("multipleOf");
        schema.min_items = count("minItems");
        schema.max_items = count("maxItems");
        schema.default = literal("default");

        if let Some(Value::Array(values)) = literal("enum") {
            schema.kind = SchemaKind::Enum;
            schema.values = values;
        }

        if let Some(items) = shape.get("items") {
            let items = self.lower_member(items);
            schema.items = Some(Box::new(items.with_required(true)));
        }

        if let Some(properties) = shape.get("properties") {
            if let Some(inner) = self.resolver.shape_of(properties.module, &properties.member.ty) {
                for (name, member) in &inner.members {
                    let property = self.lower_member(*member);
                    schema.insert_property(*name, property);
                }
            }
        }

        if let Some(additional) = shape.get("additionalProperties") {
            schema.additional_properties = match additional.member.ty.as_bool_literal() {
                Some(allowed) => Some(AdditionalProperties::Boolean(allowed)),
                None => Some(AdditionalProperties::Schema(Box::new(
                    self.lower_member(additional).with_required(true),
                ))),
            };
        }

        for name in COUNT_CONSTRAINTS {
            let Some(value) = literal(name).filter(|v| v.as_u64().is_none()) else {
                continue;
            };
            tracing::debug!(constraint = name, %value, "dropped constraint");
            self.diagnostics.push(
                ValidationWarning::new(
                    INVALID_CONSTRAINT,
                    Severity::Warn,
                    format!("Constraint '{name}: {value}' is not a non-negative integer; it was dropped"),
                )
                .suggestion(format!("Declare '{name}' as a whole number such as 0 or 10"))
                .related([module.path.display().to_string()]),
            );
        }

        let explicit = literal("required").and_then(|v| v.as_bool());
        Some((schema, explicit))
    }
}

fn open_object(values: ParameterSchema) -> ParameterSchema {
    if values.is_any() {
        ParameterSchema::open_object(None)
    } else {
        ParameterSchema::open_object(Some(values))
    }
}

fn lower_keyword(keyword: Keyword) -> ParameterSchema {
    match keyword {
        Keyword::String => ParameterSchema::string(),
        Keyword::Number => ParameterSchema::number(),
        Keyword::BigInt => ParameterSchema::integer(),
        Keyword::Boolean => ParameterSchema::boolean(),
        Keyword::Object => ParameterSchema::open_object(None),
        Keyword::Symbol | Keyword::Any | Keyword::Unknown | Keyword::Never | Keyword::Void => {
            ParameterSchema::any()
        }
    }
}

fn lower_literal(literal: &Literal) -> ParameterSchema {
    match literal {
        Literal::Null => ParameterSchema::null(),
        Literal::Undefined => ParameterSchema::any().with_required(false),
        other => literal_json(other).map_or_else(ParameterSchema::any, |value| {
            ParameterSchema::enumeration([value])
        }),
    }
}

fn literal_json(literal: &Literal) -> Option<Value> {
    match literal {
        Literal::String(s) => Some(Value::String(s.clone())),
        Literal::Number(n) => number_value(*n),
        Literal::Bool(b) => Some(Value::Bool(*b)),
        Literal::Null => Some(Value::Null),
        Literal::Undefined => None,
    }
}

/// Values of a union made only of string and number literals.
fn enum_values(parts: &[&TypeNode]) -> Option<Vec<Value>> {
    let mut values: Vec<Value> = Vec::with_capacity(parts.len());
    for part in parts {
        let value = match part {
            TypeNode::Literal(literal @ (Literal::String(_) | Literal::Number(_))) => {
                literal_json(literal)?
            }
            _ => return None,
        };
        if !values.contains(&value) {
            values.push(value);
        }
    }
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{CompiledUnit, ProgramBuilder};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn unit(source: &str) -> CompiledUnit {
        ProgramBuilder::new()
            .build_source("/virtual/types.ts", source)
            .expect("valid program")
    }

    /// Lower the alias named `T`.
    fn lower_t(source: &str) -> ParameterSchema {
        let unit = unit(source);
        let module = unit.entry();
        let alias = module.alias("T").expect("alias T");
        SchemaLowering::new(TypeResolver::new(&unit)).lower(module, &alias.value)
    }

    #[test]
    fn test_literal_union_to_enum() {
        assert_eq!(
            lower_t("type T = 'celsius' | 'fahrenheit';"),
            ParameterSchema::enumeration(["celsius", "fahrenheit"])
        );
        assert_eq!(
            lower_t("type T = 3 | 1 | 2;"),
            ParameterSchema::enumeration([3, 1, 2])
        );
    }

    #[test]
    fn test_primitives_and_nullability() {
        assert_eq!(lower_t("type T = string;"), ParameterSchema::string());
        assert_eq!(lower_t("type T = bigint;"), ParameterSchema::integer());
        assert_eq!(lower_t("type T = boolean | null;"), ParameterSchema::boolean().nullable());
        assert_eq!(lower_t("type T = true | false;"), ParameterSchema::boolean());
        assert_eq!(
            lower_t("type T = number | undefined;"),
            ParameterSchema::number().optional()
        );
        assert!(lower_t("type T = string | number;").is_any());
        assert!(lower_t("type T = T extends string ? 1 : 2;").is_any());
    }

    #[test]
    fn test_object_requiredness() {
        let schema = lower_t("type T = { a: string; b?: number; c: string | undefined };");
        assert_eq!(schema.required_properties, vec!["a"]);
        assert!(!schema.properties["b"].required);
        assert!(!schema.properties["c"].required);
    }

    #[test]
    fn test_explicit_required_wins() {
        let schema = lower_t(
            "type T = { a?: { type: 'string'; required: true }; b: { type: 'number'; required: false } };",
        );
        assert!(schema.properties["a"].required);
        assert!(!schema.properties["b"].required);
        assert_eq!(schema.required_properties, vec!["a"]);
    }

    #[test]
    fn test_parameter_definition_constraints() {
        let schema = lower_t(
            r"type T = {
              city: { type: 'string'; description: 'City'; minLength: 2; pattern: '^[A-Z]' };
              days: { type: 'integer'; min: 1; max: 14; multipleOf: 1; default: 3 };
              unit: { type: 'string'; enum: ['c', 'f'] };
              tags: { type: 'array'; items: { type: 'string' }; maxItems: 5 };
            };",
        );
        let city = &schema.properties["city"];
        assert_eq!(city.kind, SchemaKind::String);
        assert_eq!(city.description.as_deref(), Some("City"));
        assert_eq!(city.min_length, Some(2));
        assert_eq!(city.pattern.as_deref(), Some("^[A-Z]"));

        let days = &schema.properties["days"];
        assert_eq!(days.kind, SchemaKind::Integer);
        assert_eq!((days.minimum, days.maximum), (Some(1.0), Some(14.0)));
        assert_eq!(days.default, Some(json!(3)));

        let unit = &schema.properties["unit"];
        assert_eq!(unit.kind, SchemaKind::Enum);
        assert_eq!(unit.values, vec![json!("c"), json!("f")]);

        let tags = &schema.properties["tags"];
        assert_eq!(tags.items.as_deref(), Some(&ParameterSchema::string()));
        assert_eq!(tags.max_items, Some(5));
    }

    #[test]
    fn test_fractional_and_negative_counts_are_reported() {
        let unit = unit(
            r"type T = {
              name: { type: 'string'; minLength: 1.5; maxLength: 40 };
              tags: { type: 'array'; items: { type: 'string' }; minItems: -1 };
            };",
        );
        let module = unit.entry();
        let alias = module.alias("T").expect("alias T");
        let mut lowering = SchemaLowering::new(TypeResolver::new(&unit));
        let schema = lowering.lower(module, &alias.value);

        let name = &schema.properties["name"];
        assert_eq!((name.min_length, name.max_length), (None, Some(40)));
        assert_eq!(schema.properties["tags"].min_items, None);

        let diagnostics = lowering.take_diagnostics();
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(diagnostics.len(), 2, "{messages:?}");
        assert!(diagnostics.iter().all(|d| d.rule == INVALID_CONSTRAINT));
        assert!(messages[0].contains("minLength: 1.5"));
        assert!(messages[1].contains("minItems: -1"));
        assert!(lowering.take_diagnostics().is_empty());
    }

    #[test]
    fn test_records_and_builtins() {
        assert_eq!(
            lower_t("type T = Record<string, number>;"),
            ParameterSchema::open_object(Some(ParameterSchema::number()))
        );
        assert_eq!(
            lower_t("type T = { [key: string]: unknown };"),
            ParameterSchema::open_object(None)
        );
        assert_eq!(
            lower_t("type T = Array<string>;"),
            ParameterSchema::array(ParameterSchema::string())
        );
        assert_eq!(lower_t("type T = Promise<boolean>;"), ParameterSchema::boolean());
        assert_eq!(
            lower_t("type T = Date;").format.as_deref(),
            Some(formats::DATE_TIME)
        );
    }

    #[test]
    fn test_tuples() {
        let homogeneous = lower_t("type T = [number, number];");
        assert_eq!(homogeneous.items.as_deref(), Some(&ParameterSchema::number()));
        assert_eq!((homogeneous.min_items, homogeneous.max_items), (Some(2), Some(2)));

        let mixed = lower_t("type T = [string, number, boolean?];");
        assert!(mixed.items.as_deref().is_some_and(ParameterSchema::is_any));
        assert_eq!((mixed.min_items, mixed.max_items), (Some(2), Some(3)));

        let rest = lower_t("type T = [string, ...string[]];");
        assert_eq!(rest.items.as_deref(), Some(&ParameterSchema::string()));
        assert_eq!((rest.min_items, rest.max_items), (Some(1), None));
    }

    #[test]
    fn test_interfaces_enums_and_recursion() {
        let schema = lower_t(
            r"
            enum Unit { C = 'c', F = 'f' }
            interface Node { value: number; unit: Unit; children: Node[] }
            type T = Node;
            ",
        );
        assert_eq!(schema.required_properties, vec!["value", "unit", "children"]);
        assert_eq!(schema.properties["unit"], ParameterSchema::enumeration(["c", "f"]));
        let children = &schema.properties["children"];
        assert!(children.items.as_deref().is_some_and(ParameterSchema::is_any));
    }

    #[test]
    fn test_generic_alias_is_opaque() {
        assert!(lower_t("type Box<V> = { value: V };\ntype T = Box<string>;").is_any());
    }

    #[test]
    fn test_member_docs_become_descriptions() {
        let schema = lower_t("type T = {\n  /** The city. */\n  city: string;\n};");
        assert_eq!(schema.properties["city"].description.as_deref(), Some("The city."));
    }
}
