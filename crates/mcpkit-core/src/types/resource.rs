//! Resource and subscription declarations.
//!
//! A resource is served either from a literal value known at compile time
//! or by a dynamic implementation. The two are mutually exclusive and the
//! extractor rejects declarations that specify both.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::ParameterSchema;

/// How a resource's contents are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResourceContent {
    /// Contents extracted from a literal type at compile time.
    Static {
        /// The literal value.
        value: Value,
    },
    /// Contents produced by the implementing member at request time.
    Dynamic {
        /// Schema of the declared return type, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        returns: Option<ParameterSchema>,
    },
}

/// Resource-specific declaration data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDetail {
    /// The resource URI (the resource's key in the IR).
    pub uri: String,
    /// MIME type of the contents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Static value or dynamic binding.
    pub content: ResourceContent,
}

impl ResourceDetail {
    /// Create resource data.
    #[must_use]
    pub fn new(uri: impl Into<String>, content: ResourceContent) -> Self {
        Self {
            uri: uri.into(),
            mime_type: None,
            content,
        }
    }

    /// Set the MIME type.
    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// The literal value, for static resources.
    #[must_use]
    pub fn static_value(&self) -> Option<&Value> {
        match &self.content {
            ResourceContent::Static { value } => Some(value),
            ResourceContent::Dynamic { .. } => None,
        }
    }

    /// Whether the resource needs an implementation at runtime.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self.content, ResourceContent::Dynamic { .. })
    }
}

/// Subscription-specific declaration data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDetail {
    /// URI of the subscribed resource (the subscription's key in the IR).
    pub uri: String,
}
