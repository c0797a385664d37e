//! Prompt declarations.

use serde::{Deserialize, Serialize};

use crate::schema::ParameterSchema;

/// Prompt-specific declaration data.
///
/// A prompt with a literal `template` is served without an implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptDetail {
    /// Schema of the prompt arguments (always an object schema).
    pub args: ParameterSchema,
    /// Literal template text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl PromptDetail {
    /// Create prompt data with the given argument schema.
    #[must_use]
    pub fn new(args: ParameterSchema) -> Self {
        Self {
            args,
            template: None,
        }
    }

    /// Set a static template.
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Names of the arguments, in declaration order.
    pub fn argument_names(&self) -> impl Iterator<Item = &str> {
        self.args.properties.keys().map(String::as_str)
    }
}
