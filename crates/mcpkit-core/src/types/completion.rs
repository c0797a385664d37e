//! Completion declarations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::ParameterSchema;

/// Completion-specific declaration data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionDetail {
    /// What is being completed, e.g. `{ "type": "argument", "name": "city" }`.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<Value>,
    /// Schema of the completion request parameters.
    pub params: ParameterSchema,
}

impl CompletionDetail {
    /// Create completion data.
    #[must_use]
    pub fn new(reference: Option<Value>, params: ParameterSchema) -> Self {
        Self { reference, params }
    }

    /// The referenced name (`ref.name`), when the reference is an object
    /// with a string `name`.
    #[must_use]
    pub fn reference_name(&self) -> Option<&str> {
        self.reference.as_ref()?.get("name")?.as_str()
    }
}
