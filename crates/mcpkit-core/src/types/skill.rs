//! Organizational declarations: routers and skills.
//!
//! Neither needs an implementation. Routers group tools (and other routers)
//! under one name; skills group hidden capabilities for progressive
//! disclosure.

use serde::{Deserialize, Serialize};

use super::declaration::DeclarationKind;

/// Router-specific declaration data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterDetail {
    /// Referenced tool or router names, in declaration order.
    pub tools: Vec<String>,
}

/// A reference from a skill to one of its components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRef {
    /// The component kind, when the skill scoped the reference
    /// (`tools`/`resources`/`prompts`). Unscoped references match any kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeclarationKind>,
    /// Tool or prompt name, or resource URI.
    pub name: String,
}

impl ComponentRef {
    /// An unscoped reference.
    #[must_use]
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            kind: None,
            name: name.into(),
        }
    }

    /// A reference scoped to one kind.
    #[must_use]
    pub fn scoped(kind: DeclarationKind, name: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            name: name.into(),
        }
    }
}

/// Skill-specific declaration data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDetail {
    /// Components exposed by the skill, in declaration order.
    pub components: Vec<ComponentRef>,
}

impl SkillDetail {
    /// Create skill data.
    #[must_use]
    pub fn new(components: Vec<ComponentRef>) -> Self {
        Self { components }
    }
}
