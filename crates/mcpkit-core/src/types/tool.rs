//! Tool declarations.
//!
//! A tool carries the schema of its input parameters, optionally the schema
//! of its result, and behavior hints copied from a literal `annotations`
//! member.

use serde::{Deserialize, Serialize};

use crate::schema::ParameterSchema;

/// Tool-specific declaration data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDetail {
    /// Schema of the input parameters (always an object schema).
    pub params: ParameterSchema,
    /// Schema of the declared result type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ParameterSchema>,
    /// Behavior hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
}

impl ToolDetail {
    /// Create tool data with the given parameter schema.
    #[must_use]
    pub fn new(params: ParameterSchema) -> Self {
        Self {
            params,
            result: None,
            annotations: None,
        }
    }

    /// Set the result schema.
    #[must_use]
    pub fn result(mut self, result: ParameterSchema) -> Self {
        self.result = Some(result);
        self
    }

    /// Set the annotations.
    #[must_use]
    pub fn annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    /// Check if this tool is marked as read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.annotations
            .as_ref()
            .and_then(|a| a.read_only_hint)
            .unwrap_or(false)
    }

    /// Check if this tool is marked as destructive.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.annotations
            .as_ref()
            .and_then(|a| a.destructive_hint)
            .unwrap_or(false)
    }
}

/// Annotations describing tool behavior.
///
/// These are hints for clients and are not enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAnnotations {
    /// Human-readable title for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// If true, the tool only reads data (no side effects).
    #[serde(rename = "readOnlyHint", skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    /// If true, the tool may perform destructive operations.
    #[serde(rename = "destructiveHint", skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    /// If true, repeated calls with the same input yield the same result.
    #[serde(rename = "idempotentHint", skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
    /// If true, the tool interacts with an open world of external entities.
    #[serde(rename = "openWorldHint", skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

impl ToolAnnotations {
    /// Create annotations for a read-only tool.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            read_only_hint: Some(true),
            ..Default::default()
        }
    }

    /// Create annotations for a destructive tool.
    #[must_use]
    pub fn destructive() -> Self {
        Self {
            destructive_hint: Some(true),
            ..Default::default()
        }
    }
}
