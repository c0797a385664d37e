//! The compiler's output: one [`ParseResult`] per compiled entry file.
//!
//! A `ParseResult` maps names (URIs for resources and subscriptions) to
//! [`Declaration`]s for each capability kind, carries the server metadata
//! and collects diagnostics. Maps preserve declaration order.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::naming;
use crate::types::{Declaration, DeclarationKind};
use crate::validation::ValidationWarning;

/// The intermediate representation produced by one compile pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    /// The compiled entry file.
    pub source_path: PathBuf,
    /// Server metadata, when an `IServer` declaration was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<Declaration>,
    /// Tools by name.
    #[serde(default)]
    pub tools: IndexMap<String, Declaration>,
    /// Resources by URI.
    #[serde(default)]
    pub resources: IndexMap<String, Declaration>,
    /// Prompts by name.
    #[serde(default)]
    pub prompts: IndexMap<String, Declaration>,
    /// Routers by name.
    #[serde(default)]
    pub routers: IndexMap<String, Declaration>,
    /// Skills by name.
    #[serde(default)]
    pub skills: IndexMap<String, Declaration>,
    /// Subscriptions by URI.
    #[serde(default)]
    pub subscriptions: IndexMap<String, Declaration>,
    /// Completions by name.
    #[serde(default)]
    pub completions: IndexMap<String, Declaration>,
    /// Compile-time and validation diagnostics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ValidationWarning>,
}

impl ParseResult {
    /// Create an empty result for `source_path`.
    #[must_use]
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    /// Add a declaration under its key.
    ///
    /// Fails with [`CompileError::DuplicateDeclaration`] when the key or
    /// the name is already taken within the declaration's kind. Resources
    /// and subscriptions are keyed by URI but their names must still be
    /// unique. A second server declaration is a duplicate regardless of
    /// name.
    pub fn insert(&mut self, declaration: Declaration) -> Result<(), CompileError> {
        let kind = declaration.kind();
        if kind == DeclarationKind::ServerMeta {
            if let Some(existing) = &self.server {
                return Err(CompileError::duplicate(
                    kind,
                    &declaration.name,
                    &existing.interface_name,
                    &declaration.interface_name,
                ));
            }
            self.server = Some(declaration);
            return Ok(());
        }

        let key = declaration.key().to_string();
        if let Some(map) = self.map_mut(kind) {
            let clash = map
                .get(&key)
                .map(|existing| (existing, key.as_str()))
                .or_else(|| {
                    map.values()
                        .find(|existing| existing.name == declaration.name)
                        .map(|existing| (existing, declaration.name.as_str()))
                });
            if let Some((existing, shared)) = clash {
                return Err(CompileError::duplicate(
                    kind,
                    shared,
                    &existing.interface_name,
                    &declaration.interface_name,
                ));
            }
            map.insert(key, declaration);
        }
        Ok(())
    }

    /// Declarations of one kind, keyed as stored.
    #[must_use]
    pub fn of_kind(&self, kind: DeclarationKind) -> &IndexMap<String, Declaration> {
        match kind {
            DeclarationKind::Tool => &self.tools,
            DeclarationKind::Resource => &self.resources,
            DeclarationKind::Prompt => &self.prompts,
            DeclarationKind::Router => &self.routers,
            DeclarationKind::Skill => &self.skills,
            DeclarationKind::Subscription => &self.subscriptions,
            DeclarationKind::Completion => &self.completions,
            // Server metadata is not keyed; callers use `server`.
            DeclarationKind::ServerMeta => empty_map(),
        }
    }

    fn map_mut(&mut self, kind: DeclarationKind) -> Option<&mut IndexMap<String, Declaration>> {
        Some(match kind {
            DeclarationKind::Tool => &mut self.tools,
            DeclarationKind::Resource => &mut self.resources,
            DeclarationKind::Prompt => &mut self.prompts,
            DeclarationKind::Router => &mut self.routers,
            DeclarationKind::Skill => &mut self.skills,
            DeclarationKind::Subscription => &mut self.subscriptions,
            DeclarationKind::Completion => &mut self.completions,
            DeclarationKind::ServerMeta => return None,
        })
    }

    /// Look up a declaration by kind and key.
    #[must_use]
    pub fn get(&self, kind: DeclarationKind, key: &str) -> Option<&Declaration> {
        if kind == DeclarationKind::ServerMeta {
            return self.server.as_ref().filter(|server| server.name == key);
        }
        self.of_kind(kind).get(key)
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<&Declaration> {
        self.tools.get(name)
    }

    /// Look up a resource by URI.
    #[must_use]
    pub fn resource(&self, uri: &str) -> Option<&Declaration> {
        self.resources.get(uri)
    }

    /// Look up a prompt by name.
    #[must_use]
    pub fn prompt(&self, name: &str) -> Option<&Declaration> {
        self.prompts.get(name)
    }

    /// Look up a skill by name.
    #[must_use]
    pub fn skill(&self, name: &str) -> Option<&Declaration> {
        self.skills.get(name)
    }

    /// Every declaration, server first, then kind by kind in registry order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.server.iter().chain(
            DeclarationKind::ALL
                .into_iter()
                .filter(|kind| *kind != DeclarationKind::ServerMeta)
                .flat_map(move |kind| self.of_kind(kind).values()),
        )
    }

    /// Number of declarations, server included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations().count()
    }

    /// Whether nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations().next().is_none()
    }

    /// The server name, if server metadata was declared.
    #[must_use]
    pub fn server_name(&self) -> Option<&str> {
        self.server.as_ref().map(|server| server.name.as_str())
    }

    /// Skill names in declaration order.
    pub fn skill_names(&self) -> impl Iterator<Item = &str> {
        self.skills.keys().map(String::as_str)
    }

    /// Whether any diagnostic has error severity.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(ValidationWarning::is_error)
    }

    /// Declarations that need a runtime implementation but have none.
    pub fn unresolved_bindings(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations()
            .filter(|decl| decl.requires_implementation() && decl.binding_name.is_none())
    }

    /// Fail with [`CompileError::ImplementationNotFound`] for the first
    /// declaration that needs an implementation and has none.
    ///
    /// The compiler never calls this; it is the registration layer's
    /// startup check.
    pub fn ensure_bindings(&self) -> Result<(), CompileError> {
        match self.unresolved_bindings().next() {
            None => Ok(()),
            Some(decl) => {
                let mut tried = naming::variants_of(&decl.name);
                let key = decl.key();
                if key != decl.name && !tried.iter().any(|t| t == key) {
                    tried.push(key.to_string());
                }
                Err(CompileError::implementation_not_found(
                    decl.kind(),
                    &decl.name,
                    tried,
                ))
            }
        }
    }

    /// The entry file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.source_path
    }
}

fn empty_map() -> &'static IndexMap<String, Declaration> {
    static EMPTY: std::sync::OnceLock<IndexMap<String, Declaration>> = std::sync::OnceLock::new();
    EMPTY.get_or_init(IndexMap::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParameterSchema;
    use crate::types::{
        DeclarationDetail, PromptDetail, ResourceContent, ResourceDetail, ServerDetail,
        SkillDetail, ToolDetail,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tool(name: &str) -> Declaration {
        Declaration::new(
            name,
            format!("{name}Tool"),
            DeclarationDetail::Tool(ToolDetail::new(ParameterSchema::object())),
        )
    }

    #[test]
    fn test_insert_and_lookup() -> Result<(), CompileError> {
        let mut ir = ParseResult::new("server.ts");
        ir.insert(tool("search"))?;
        ir.insert(Declaration::new(
            "Config",
            "ConfigResource",
            DeclarationDetail::Resource(ResourceDetail::new(
                "config://app",
                ResourceContent::Static { value: json!({}) },
            )),
        ))?;

        assert!(ir.tool("search").is_some());
        assert!(ir.resource("config://app").is_some());
        assert!(ir.get(DeclarationKind::Resource, "Config").is_none());
        assert_eq!(ir.len(), 2);
        Ok(())
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut ir = ParseResult::new("server.ts");
        assert!(ir.insert(tool("search")).is_ok());
        let err = ir.insert(tool("search")).unwrap_err();
        assert!(matches!(
            err,
            CompileError::DuplicateDeclaration {
                kind: DeclarationKind::Tool,
                ..
            }
        ));
    }

    #[test]
    fn test_resource_names_are_unique_across_uris() {
        let resource = |uri: &str, interface: &str| {
            Declaration::new(
                "config",
                interface,
                DeclarationDetail::Resource(ResourceDetail::new(
                    uri,
                    ResourceContent::Static {
                        value: json!({}),
                    },
                )),
            )
        };
        let mut ir = ParseResult::new("server.ts");
        assert!(ir.insert(resource("config://a", "ConfigA")).is_ok());
        match ir.insert(resource("config://b", "ConfigB")) {
            Err(CompileError::DuplicateDeclaration {
                kind, name, first, second,
            }) => {
                assert_eq!(kind, DeclarationKind::Resource);
                assert_eq!(name, "config");
                assert_eq!(first, "ConfigA");
                assert_eq!(second, "ConfigB");
            }
            other => panic!("expected a duplicate, got {other:?}"),
        }
        assert_eq!(ir.of_kind(DeclarationKind::Resource).len(), 1);
    }

    #[test]
    fn test_second_server_is_a_duplicate() {
        let server = |name: &str| {
            Declaration::new(
                name,
                "Server",
                DeclarationDetail::ServerMeta(ServerDetail::default()),
            )
        };
        let mut ir = ParseResult::new("server.ts");
        assert!(ir.insert(server("a")).is_ok());
        assert!(ir.insert(server("b")).is_err());
        assert_eq!(ir.server_name(), Some("a"));
    }

    #[test]
    fn test_declarations_iterate_in_kind_order() -> Result<(), CompileError> {
        let mut ir = ParseResult::new("server.ts");
        ir.insert(Declaration::new(
            "weather",
            "WeatherSkill",
            DeclarationDetail::Skill(SkillDetail::default()),
        ))?;
        ir.insert(tool("b"))?;
        ir.insert(tool("a"))?;

        let names: Vec<_> = ir.declarations().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "weather"]);
        Ok(())
    }

    #[test]
    fn test_ensure_bindings_reports_variants() -> Result<(), CompileError> {
        let mut ir = ParseResult::new("server.ts");
        ir.insert(tool("get_weather").bound_to("getWeather"))?;
        ir.insert(Declaration::new(
            "greet",
            "GreetPrompt",
            DeclarationDetail::Prompt(PromptDetail::new(ParameterSchema::object()).template("Hi")),
        ))?;
        assert!(ir.ensure_bindings().is_ok());

        ir.insert(tool("list_items"))?;
        match ir.ensure_bindings() {
            Err(CompileError::ImplementationNotFound { name, tried, .. }) => {
                assert_eq!(name, "list_items");
                assert!(tried.iter().any(|t| t == "listItems"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_serializes_camel_case() -> Result<(), Box<dyn std::error::Error>> {
        let mut ir = ParseResult::new("server.ts");
        ir.insert(tool("search"))?;
        let value = serde_json::to_value(&ir)?;
        assert_eq!(value["sourcePath"], "server.ts");
        assert_eq!(value["tools"]["search"]["kind"], "tool");
        Ok(())
    }
}
