//! Canonical parameter schemas.
//!
//! Every tool, prompt and completion declaration carries a [`ParameterSchema`]
//! lowered from its TypeScript parameter type. The schema is a small,
//! closed tree that the registration layer turns into request validation
//! (see [`ParameterSchema::to_json_schema`]).
//!
//! # Example
//!
//! ```rust
//! use mcpkit_core::schema::ParameterSchema;
//!
//! let schema = ParameterSchema::object()
//!     .property("location", ParameterSchema::string().description("City name"))
//!     .property("days", ParameterSchema::integer().minimum(1).maximum(14).optional());
//!
//! assert_eq!(schema.required_properties, vec!["location".to_string()]);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema kinds produced by the type lowering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// A string value.
    String,
    /// A numeric value (integer or float).
    Number,
    /// An integer value.
    Integer,
    /// A boolean value.
    Boolean,
    /// An array value.
    Array,
    /// An object value.
    Object,
    /// A null value.
    Null,
    /// One of a fixed set of literal values.
    Enum,
    /// Opaque fallback that accepts any value.
    Any,
}

impl SchemaKind {
    /// Parse the kind named by a parameter definition's `type` field.
    ///
    /// Only concrete JSON kinds are accepted; `enum` and `any` are
    /// produced by lowering, never written by hand.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// Whether numeric constraints apply to this kind.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Integer => write!(f, "integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
            Self::Null => write!(f, "null"),
            Self::Enum => write!(f, "enum"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// Represents `additionalProperties`, either a flag or a value schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` allows any additional properties, `false` forbids them.
    Boolean(bool),
    /// Additional property values must match this schema.
    Schema(Box<ParameterSchema>),
}

fn default_required() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_true(value: &bool) -> bool {
    *value
}

/// A node of the canonical parameter/result schema tree.
///
/// Constraints are carried exactly as declared. Nothing here rounds,
/// coerces or checks them against values; that happens at request time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSchema {
    /// The schema kind.
    pub kind: SchemaKind,

    /// Whether the owning property must be present. Defaults to `true`.
    #[serde(default = "default_required", skip_serializing_if = "is_true")]
    pub required: bool,

    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether `null` is accepted in addition to the kind.
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    // String constraints
    /// Minimum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// Maximum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// Regex pattern for string validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Format hint (e.g., "email", "uri", "date-time").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    // Numeric constraints
    /// Minimum numeric value (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    /// Maximum numeric value (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// Minimum numeric value (exclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,

    /// Maximum numeric value (exclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,

    /// Value must be a multiple of this number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,

    // Array constraints
    /// Schema for array items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSchema>>,

    /// Minimum number of items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    /// Maximum number of items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    // Object constraints
    /// Property schemas, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, ParameterSchema>,

    /// Names of the properties whose schema is required, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_properties: Vec<String>,

    /// Additional properties policy for open-ended objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    // Enum constraints
    /// Allowed literal values, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
}

impl ParameterSchema {
    /// Create a schema of the given kind with no constraints.
    #[must_use]
    pub fn of_kind(kind: SchemaKind) -> Self {
        Self {
            kind,
            required: true,
            description: None,
            nullable: false,
            default: None,
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            multiple_of: None,
            items: None,
            min_items: None,
            max_items: None,
            properties: IndexMap::new(),
            required_properties: Vec::new(),
            additional_properties: None,
            values: Vec::new(),
        }
    }

    /// Create an opaque schema (matches anything).
    #[must_use]
    pub fn any() -> Self {
        Self::of_kind(SchemaKind::Any)
    }

    /// Create a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::of_kind(SchemaKind::String)
    }

    /// Create a number schema.
    #[must_use]
    pub fn number() -> Self {
        Self::of_kind(SchemaKind::Number)
    }

    /// Create an integer schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::of_kind(SchemaKind::Integer)
    }

    /// Create a boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of_kind(SchemaKind::Boolean)
    }

    /// Create a null schema.
    #[must_use]
    pub fn null() -> Self {
        Self::of_kind(SchemaKind::Null)
    }

    /// Create an array schema with the given item schema.
    #[must_use]
    pub fn array(items: ParameterSchema) -> Self {
        let mut schema = Self::of_kind(SchemaKind::Array);
        schema.items = Some(Box::new(items));
        schema
    }

    /// Create an empty, closed object schema.
    #[must_use]
    pub fn object() -> Self {
        Self::of_kind(SchemaKind::Object)
    }

    /// Create an open-ended object schema with no fixed property set.
    #[must_use]
    pub fn open_object(values: Option<ParameterSchema>) -> Self {
        let mut schema = Self::of_kind(SchemaKind::Object);
        schema.additional_properties = Some(match values {
            Some(values) => AdditionalProperties::Schema(Box::new(values)),
            None => AdditionalProperties::Boolean(true),
        });
        schema
    }

    /// Create an enum schema. Value order is preserved as given.
    #[must_use]
    pub fn enumeration<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut schema = Self::of_kind(SchemaKind::Enum);
        schema.values = values.into_iter().map(Into::into).collect();
        schema
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the schema as not required.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set requiredness explicitly.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Accept `null` in addition to the kind.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set minimum string length.
    #[must_use]
    pub fn min_length(mut self, min: u64) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set maximum string length.
    #[must_use]
    pub fn max_length(mut self, max: u64) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Set regex pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Set string format hint.
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set minimum value (inclusive).
    #[must_use]
    pub fn minimum(mut self, min: impl Into<f64>) -> Self {
        self.minimum = Some(min.into());
        self
    }

    /// Set maximum value (inclusive).
    #[must_use]
    pub fn maximum(mut self, max: impl Into<f64>) -> Self {
        self.maximum = Some(max.into());
        self
    }

    /// Set multiple-of constraint.
    #[must_use]
    pub fn multiple_of(mut self, multiple: impl Into<f64>) -> Self {
        self.multiple_of = Some(multiple.into());
        self
    }

    /// Fix the number of array items.
    #[must_use]
    pub fn fixed_len(mut self, len: u64) -> Self {
        self.min_items = Some(len);
        self.max_items = Some(len);
        self
    }

    /// Add a property. The property is listed in `required_properties`
    /// when its schema is required.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, schema: ParameterSchema) -> Self {
        self.insert_property(name, schema);
        self
    }

    /// Insert or replace a property in place, keeping `required_properties`
    /// consistent with the property's `required` flag.
    pub fn insert_property(&mut self, name: impl Into<String>, schema: ParameterSchema) {
        let name = name.into();
        self.required_properties.retain(|existing| existing != &name);
        if schema.required {
            self.required_properties.push(name.clone());
        }
        self.properties.insert(name, schema);
    }

    /// Look up a property schema by name.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&ParameterSchema> {
        self.properties.get(name)
    }

    /// Whether this schema is the opaque fallback.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.kind == SchemaKind::Any
    }

    /// Render this schema as a JSON Schema document for request validation.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();

        match self.kind {
            SchemaKind::Any => {}
            SchemaKind::Enum => {
                out.insert("enum".to_string(), Value::Array(self.values.clone()));
                if let Some(kind) = enum_value_type(&self.values) {
                    out.insert("type".to_string(), Value::String(kind.to_string()));
                }
            }
            kind => {
                let ty = Value::String(kind.to_string());
                if self.nullable && kind != SchemaKind::Null {
                    out.insert(
                        "type".to_string(),
                        Value::Array(vec![ty, Value::String("null".to_string())]),
                    );
                } else {
                    out.insert("type".to_string(), ty);
                }
            }
        }

        if let Some(description) = &self.description {
            out.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(default) = &self.default {
            out.insert("default".to_string(), default.clone());
        }

        let mut put_u64 = |key: &str, value: Option<u64>| {
            if let Some(value) = value {
                out.insert(key.to_string(), Value::from(value));
            }
        };
        put_u64("minLength", self.min_length);
        put_u64("maxLength", self.max_length);
        put_u64("minItems", self.min_items);
        put_u64("maxItems", self.max_items);

        for (key, value) in [
            ("minimum", self.minimum),
            ("maximum", self.maximum),
            ("exclusiveMinimum", self.exclusive_minimum),
            ("exclusiveMaximum", self.exclusive_maximum),
            ("multipleOf", self.multiple_of),
        ] {
            if let Some(number) = value.and_then(serde_json::Number::from_f64) {
                out.insert(key.to_string(), Value::Number(number));
            }
        }

        if let Some(pattern) = &self.pattern {
            out.insert("pattern".to_string(), Value::String(pattern.clone()));
        }
        if let Some(format) = &self.format {
            out.insert("format".to_string(), Value::String(format.clone()));
        }
        if let Some(items) = &self.items {
            out.insert("items".to_string(), items.to_json_schema());
        }

        if self.kind == SchemaKind::Object {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_json_schema()))
                .collect();
            out.insert("properties".to_string(), Value::Object(properties));
            if !self.required_properties.is_empty() {
                out.insert(
                    "required".to_string(),
                    Value::Array(
                        self.required_properties
                            .iter()
                            .cloned()
                            .map(Value::String)
                            .collect(),
                    ),
                );
            }
        }
        match &self.additional_properties {
            Some(AdditionalProperties::Boolean(allowed)) => {
                out.insert("additionalProperties".to_string(), Value::Bool(*allowed));
            }
            Some(AdditionalProperties::Schema(schema)) => {
                out.insert("additionalProperties".to_string(), schema.to_json_schema());
            }
            None => {}
        }

        Value::Object(out)
    }
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::any()
    }
}

/// The JSON type shared by every enum value, if there is one.
fn enum_value_type(values: &[Value]) -> Option<&'static str> {
    let mut kinds = values.iter().map(|value| match value {
        Value::String(_) => Some("string"),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some("integer"),
        Value::Number(_) => Some("number"),
        Value::Bool(_) => Some("boolean"),
        _ => None,
    });
    let first = kinds.next()??;
    kinds.all(|kind| kind == Some(first)).then_some(first)
}

/// Common string format hints.
pub mod formats {
    /// Email address format.
    pub const EMAIL: &str = "email";
    /// URI format.
    pub const URI: &str = "uri";
    /// Date-time format (RFC 3339).
    pub const DATE_TIME: &str = "date-time";
    /// Date format.
    pub const DATE: &str = "date";
    /// UUID format.
    pub const UUID: &str = "uuid";
}
