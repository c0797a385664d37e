//! The declaration record shared by every capability kind.
//!
//! A [`Declaration`] is what the extractor produces for one matched
//! interface. The common attributes live on the struct; kind-specific data
//! lives in [`DeclarationDetail`], whose variant determines the kind.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::completion::CompletionDetail;
use super::prompt::PromptDetail;
use super::resource::{ResourceDetail, SubscriptionDetail};
use super::server::ServerDetail;
use super::skill::{RouterDetail, SkillDetail};
use super::tool::ToolDetail;

/// The capability kinds a declaration can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    /// A callable tool.
    Tool,
    /// A readable resource.
    Resource,
    /// A prompt template.
    Prompt,
    /// A named group of tools and nested routers.
    Router,
    /// A progressive-disclosure grouping of hidden capabilities.
    Skill,
    /// A resource subscription.
    Subscription,
    /// An argument completion provider.
    Completion,
    /// Server-level metadata.
    ServerMeta,
}

impl DeclarationKind {
    /// Every kind, in registry order.
    pub const ALL: [Self; 8] = [
        Self::Tool,
        Self::Resource,
        Self::Prompt,
        Self::Router,
        Self::Skill,
        Self::Subscription,
        Self::Completion,
        Self::ServerMeta,
    ];

    /// The capability interface a declaration of this kind extends.
    #[must_use]
    pub const fn interface_name(self) -> &'static str {
        match self {
            Self::Tool => "ITool",
            Self::Resource => "IResource",
            Self::Prompt => "IPrompt",
            Self::Router => "IRouter",
            Self::Skill => "ISkill",
            Self::Subscription => "ISubscription",
            Self::Completion => "ICompletion",
            Self::ServerMeta => "IServer",
        }
    }

    /// Look up a kind by its capability interface name.
    #[must_use]
    pub fn from_interface_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.interface_name() == name)
    }

    /// Short lowercase label used in rule ids and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Resource => "resource",
            Self::Prompt => "prompt",
            Self::Router => "router",
            Self::Skill => "skill",
            Self::Subscription => "subscription",
            Self::Completion => "completion",
            Self::ServerMeta => "server",
        }
    }

    /// Whether this kind can be listed in a skill's components.
    #[must_use]
    pub const fn is_skill_component(self) -> bool {
        matches!(self, Self::Tool | Self::Resource | Self::Prompt)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of a capability in listings.
///
/// Predicates are only named here; they are evaluated by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Hidden {
    /// No `hidden` member was declared.
    #[default]
    Absent,
    /// A literal `true` or `false`.
    Static(bool),
    /// A function type or a reference to a predicate.
    Predicate(String),
}

impl Hidden {
    /// Hidden by a literal `true`.
    #[must_use]
    pub fn is_statically_hidden(&self) -> bool {
        matches!(self, Self::Static(true))
    }

    /// Hidden now or possibly hidden at runtime.
    #[must_use]
    pub fn may_be_hidden(&self) -> bool {
        matches!(self, Self::Static(true) | Self::Predicate(_))
    }
}

/// Where a declaration was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file.
    pub path: PathBuf,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line, self.column)
    }
}

/// Kind-specific payload of a declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DeclarationDetail {
    /// Tool payload.
    Tool(ToolDetail),
    /// Resource payload.
    Resource(ResourceDetail),
    /// Prompt payload.
    Prompt(PromptDetail),
    /// Router payload.
    Router(RouterDetail),
    /// Skill payload.
    Skill(SkillDetail),
    /// Subscription payload.
    Subscription(SubscriptionDetail),
    /// Completion payload.
    Completion(CompletionDetail),
    /// Server metadata payload.
    ServerMeta(ServerDetail),
}

impl DeclarationDetail {
    /// The kind this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> DeclarationKind {
        match self {
            Self::Tool(_) => DeclarationKind::Tool,
            Self::Resource(_) => DeclarationKind::Resource,
            Self::Prompt(_) => DeclarationKind::Prompt,
            Self::Router(_) => DeclarationKind::Router,
            Self::Skill(_) => DeclarationKind::Skill,
            Self::Subscription(_) => DeclarationKind::Subscription,
            Self::Completion(_) => DeclarationKind::Completion,
            Self::ServerMeta(_) => DeclarationKind::ServerMeta,
        }
    }
}

/// One extracted capability declaration.
///
/// Declarations are immutable once produced; a new compile pass replaces
/// them wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    /// Stable identifier, unique within its kind.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the implementing member, if one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding_name: Option<String>,
    /// Declared visibility.
    #[serde(default)]
    pub hidden: Hidden,
    /// Skills this capability declares itself part of.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skill_membership: Vec<String>,
    /// The interface or alias the declaration was read from.
    pub interface_name: String,
    /// Where that interface was declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub detail: DeclarationDetail,
}

impl Declaration {
    /// Create a declaration with default common attributes.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        interface_name: impl Into<String>,
        detail: DeclarationDetail,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            binding_name: None,
            hidden: Hidden::Absent,
            skill_membership: Vec::new(),
            interface_name: interface_name.into(),
            location: None,
            detail,
        }
    }

    /// The declaration's kind.
    #[must_use]
    pub const fn kind(&self) -> DeclarationKind {
        self.detail.kind()
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the binding name.
    #[must_use]
    pub fn bound_to(mut self, member: impl Into<String>) -> Self {
        self.binding_name = Some(member.into());
        self
    }

    /// Set the visibility.
    #[must_use]
    pub fn hidden(mut self, hidden: Hidden) -> Self {
        self.hidden = hidden;
        self
    }

    /// Add a skill membership.
    #[must_use]
    pub fn member_of(mut self, skill: impl Into<String>) -> Self {
        self.skill_membership.push(skill.into());
        self
    }

    /// The key this declaration is stored under in the IR: the URI for
    /// resources and subscriptions, the name otherwise.
    #[must_use]
    pub fn key(&self) -> &str {
        match &self.detail {
            DeclarationDetail::Resource(detail) => &detail.uri,
            DeclarationDetail::Subscription(detail) => &detail.uri,
            _ => &self.name,
        }
    }

    /// Whether the runtime must supply an implementation for this
    /// declaration. Metadata-only and statically served declarations do not.
    #[must_use]
    pub fn requires_implementation(&self) -> bool {
        match &self.detail {
            DeclarationDetail::Tool(_)
            | DeclarationDetail::Completion(_)
            | DeclarationDetail::Subscription(_) => true,
            DeclarationDetail::Resource(detail) => detail.is_dynamic(),
            DeclarationDetail::Prompt(detail) => detail.template.is_none(),
            DeclarationDetail::Router(_)
            | DeclarationDetail::Skill(_)
            | DeclarationDetail::ServerMeta(_) => false,
        }
    }

    /// Tool payload, if this is a tool.
    #[must_use]
    pub fn as_tool(&self) -> Option<&ToolDetail> {
        match &self.detail {
            DeclarationDetail::Tool(detail) => Some(detail),
            _ => None,
        }
    }

    /// Resource payload, if this is a resource.
    #[must_use]
    pub fn as_resource(&self) -> Option<&ResourceDetail> {
        match &self.detail {
            DeclarationDetail::Resource(detail) => Some(detail),
            _ => None,
        }
    }

    /// Prompt payload, if this is a prompt.
    #[must_use]
    pub fn as_prompt(&self) -> Option<&PromptDetail> {
        match &self.detail {
            DeclarationDetail::Prompt(detail) => Some(detail),
            _ => None,
        }
    }

    /// Router payload, if this is a router.
    #[must_use]
    pub fn as_router(&self) -> Option<&RouterDetail> {
        match &self.detail {
            DeclarationDetail::Router(detail) => Some(detail),
            _ => None,
        }
    }

    /// Skill payload, if this is a skill.
    #[must_use]
    pub fn as_skill(&self) -> Option<&SkillDetail> {
        match &self.detail {
            DeclarationDetail::Skill(detail) => Some(detail),
            _ => None,
        }
    }

    /// Completion payload, if this is a completion.
    #[must_use]
    pub fn as_completion(&self) -> Option<&CompletionDetail> {
        match &self.detail {
            DeclarationDetail::Completion(detail) => Some(detail),
            _ => None,
        }
    }

    /// Server payload, if this is server metadata.
    #[must_use]
    pub fn as_server(&self) -> Option<&ServerDetail> {
        match &self.detail {
            DeclarationDetail::ServerMeta(detail) => Some(detail),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParameterSchema;
    use crate::types::ResourceContent;
    use serde_json::json;

    #[test]
    fn test_kind_interface_names_round_trip() {
        for kind in DeclarationKind::ALL {
            assert_eq!(
                DeclarationKind::from_interface_name(kind.interface_name()),
                Some(kind)
            );
        }
        assert_eq!(DeclarationKind::from_interface_name("IThing"), None);
    }

    #[test]
    fn test_hidden_predicates() {
        assert!(Hidden::Static(true).is_statically_hidden());
        assert!(!Hidden::Predicate("isAdmin".into()).is_statically_hidden());
        assert!(Hidden::Predicate("isAdmin".into()).may_be_hidden());
        assert!(!Hidden::Static(false).may_be_hidden());
        assert!(!Hidden::Absent.may_be_hidden());
    }

    #[test]
    fn test_declaration_serializes_flat() -> Result<(), Box<dyn std::error::Error>> {
        let decl = Declaration::new(
            "get_weather",
            "GetWeatherTool",
            DeclarationDetail::Tool(ToolDetail::new(ParameterSchema::object())),
        )
        .description("Get the weather")
        .bound_to("getWeather");

        let value = serde_json::to_value(&decl)?;
        assert_eq!(value["kind"], "tool");
        assert_eq!(value["name"], "get_weather");
        assert_eq!(value["bindingName"], "getWeather");
        assert_eq!(value["hidden"], json!({ "type": "absent" }));

        let back: Declaration = serde_json::from_value(value)?;
        assert_eq!(back, decl);
        Ok(())
    }

    #[test]
    fn test_requires_implementation() {
        let static_resource = Declaration::new(
            "Config",
            "ConfigResource",
            DeclarationDetail::Resource(ResourceDetail::new(
                "config://app",
                ResourceContent::Static { value: json!({"debug": false}) },
            )),
        );
        assert!(!static_resource.requires_implementation());
        assert_eq!(static_resource.key(), "config://app");

        let dynamic_resource = Declaration::new(
            "Stats",
            "StatsResource",
            DeclarationDetail::Resource(ResourceDetail::new(
                "stats://now",
                ResourceContent::Dynamic { returns: None },
            )),
        );
        assert!(dynamic_resource.requires_implementation());

        let router = Declaration::new(
            "weather",
            "WeatherRouter",
            DeclarationDetail::Router(RouterDetail::default()),
        );
        assert!(!router.requires_implementation());
    }
}
