//! Declaration Extractor.
//!
//! Turns matched capability types into [`Declaration`]s. Extraction runs in
//! two passes: the first classifies every candidate and fixes its name, the
//! second builds declarations, so routers and skills can refer to other
//! declarations by type.

mod fields;
mod host;

use std::collections::HashMap;
use std::path::PathBuf;

use mcpkit_core::error::CompileError;
use mcpkit_core::ir::ParseResult;
use mcpkit_core::schema::ParameterSchema;
use mcpkit_core::types::{
    CompletionDetail, ComponentRef, Declaration, DeclarationDetail, DeclarationKind, PromptDetail,
    ResourceContent, ResourceDetail, RouterDetail, ServerDetail, SkillDetail, SourceLocation,
    SubscriptionDetail, ToolAnnotations, ToolDetail, TransportKind,
};
use mcpkit_core::validation::{Severity, ValidationWarning};

use crate::checker::{Shape, Symbol, TypeResolver};
use crate::docs::DocComment;
use crate::literal::{extract_literal, number_value};
use crate::lower::SchemaLowering;
use crate::matcher::{collect_candidates, Candidate, ShapeMatcher, ShapeRegistry};
use crate::program::ast::{Literal, Module, TypeNode};
use crate::program::CompiledUnit;

use fields::{bool_field, derive_name, hidden, memberships, number_field, port, string_field};
use host::{Host, HostMember};

/// Rule id of the diagnostic emitted for declarations missing a key field.
pub const INVALID_DECLARATION: &str = "invalid-declaration";

/// A candidate that matched a kind, with its flattened members.
struct Matched<'u> {
    candidate: Candidate<'u>,
    kind: DeclarationKind,
    shape: Shape<'u>,
    name: String,
}

/// Extracts declarations from one compiled program.
pub struct Extractor<'a, 'u> {
    resolver: TypeResolver<'u>,
    matcher: ShapeMatcher<'a, 'u>,
    lowering: SchemaLowering<'u>,
    host: Option<Host<'u>>,
    names: HashMap<(PathBuf, String), (DeclarationKind, String)>,
    diagnostics: Vec<ValidationWarning>,
}

impl<'a, 'u> Extractor<'a, 'u> {
    /// Create an extractor for `unit`.
    #[must_use]
    pub fn new(unit: &'u CompiledUnit, registry: &'a ShapeRegistry) -> Self {
        let resolver = TypeResolver::new(unit);
        Self {
            resolver,
            matcher: ShapeMatcher::new(resolver, registry),
            lowering: SchemaLowering::new(resolver),
            host: Host::find(&resolver, unit.entry()),
            names: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Run both passes and collect the IR.
    ///
    /// # Errors
    ///
    /// Fails on conflicting resource fields, missing literal data,
    /// duplicate names within a kind, or when the program declares nothing
    /// and exports no implementation.
    pub fn extract(mut self) -> Result<ParseResult, CompileError> {
        let unit = self.resolver.unit();
        let mut result = ParseResult::new(unit.path());

        let matched = self.classify_all();
        for entry in &matched {
            if let Some(declaration) = self.declaration(entry)? {
                tracing::debug!(
                    kind = %declaration.kind(),
                    name = %declaration.name,
                    binding = ?declaration.binding_name,
                    "extracted declaration"
                );
                result.insert(declaration)?;
            }
        }

        if result.is_empty() && self.host.is_none() {
            return Err(CompileError::no_declarations(unit.path()));
        }
        self.diagnostics.extend(self.lowering.take_diagnostics());
        result.diagnostics = self.diagnostics;
        Ok(result)
    }

    fn classify_all(&mut self) -> Vec<Matched<'u>> {
        let mut matched = Vec::new();
        for candidate in collect_candidates(&self.resolver) {
            let Some(kind) = self.matcher.decide(&candidate, &mut self.diagnostics) else {
                continue;
            };
            let shape = candidate.shape(&self.resolver);
            let name = string_field(&shape, "name")
                .map_or_else(|| derive_name(candidate.name, kind), ToString::to_string);
            self.names.insert(candidate.key(), (kind, name.clone()));
            matched.push(Matched {
                candidate,
                kind,
                shape,
                name,
            });
        }
        matched
    }

    fn declaration(&mut self, entry: &Matched<'u>) -> Result<Option<Declaration>, CompileError> {
        let Matched {
            candidate,
            kind,
            shape,
            name,
        } = entry;
        let module = candidate.module;
        let interface_docs = candidate.docs.map(DocComment::parse).unwrap_or_default();

        let uri = string_field(shape, "uri");
        if matches!(kind, DeclarationKind::Resource | DeclarationKind::Subscription) && uri.is_none()
        {
            self.invalid(candidate, *kind, "has no literal 'uri'");
            return Ok(None);
        }

        let member = self
            .host
            .as_ref()
            .and_then(|host| host.bind(&self.resolver, candidate.name, name, uri));
        let member_docs = member
            .and_then(|member| member.docs)
            .map(DocComment::parse)
            .unwrap_or_default();

        let detail = match kind {
            DeclarationKind::Tool => self.tool(shape, &[&interface_docs, &member_docs]),
            DeclarationKind::Resource => {
                let uri = uri.unwrap_or_default();
                self.resource(candidate, shape, uri, member)?
            }
            DeclarationKind::Prompt => self.prompt(shape, &[&interface_docs, &member_docs]),
            DeclarationKind::Router => DeclarationDetail::Router(RouterDetail {
                tools: self.tool_names(shape),
            }),
            DeclarationKind::Skill => DeclarationDetail::Skill(SkillDetail::new(
                self.components(shape),
            )),
            DeclarationKind::Subscription => DeclarationDetail::Subscription(SubscriptionDetail {
                uri: uri.unwrap_or_default().to_string(),
            }),
            DeclarationKind::Completion => self.completion(shape),
            DeclarationKind::ServerMeta => server(shape),
        };

        let mut declaration = Declaration::new(name.clone(), candidate.name, detail)
            .hidden(hidden(shape, candidate.name));
        declaration.location = Some(SourceLocation {
            path: module.path.clone(),
            line: candidate.span.line,
            column: candidate.span.column,
        });
        declaration.skill_membership = memberships(shape);

        let description = string_field(shape, "description")
            .map(ToString::to_string)
            .or(interface_docs.description)
            .or(member_docs.description);

        if *kind == DeclarationKind::ServerMeta {
            if let Some(host) = &self.host {
                if host.implements(&self.resolver, candidate.name) {
                    if let Some(host_name) = host.name {
                        declaration = declaration.bound_to(host_name);
                    }
                }
            }
            declaration.description = description.or_else(|| {
                self.host
                    .as_ref()
                    .and_then(|host| host.docs)
                    .and_then(|docs| DocComment::parse(docs).description)
            });
        } else {
            declaration.description = description;
            if let Some(member) = member {
                declaration = declaration.bound_to(member.name);
            }
        }
        Ok(Some(declaration))
    }

    fn invalid(&mut self, candidate: &Candidate<'u>, kind: DeclarationKind, problem: &str) {
        tracing::warn!(name = candidate.name, %kind, problem, "skipping declaration");
        self.diagnostics.push(
            ValidationWarning::new(
                INVALID_DECLARATION,
                Severity::Warn,
                format!("{} '{}' {problem}; it was skipped", kind, candidate.name),
            )
            .related([candidate.name]),
        );
    }

    fn tool(&mut self, shape: &Shape<'u>, docs: &[&DocComment]) -> DeclarationDetail {
        let mut params = self.params(shape, "params");
        fill_param_docs(&mut params, docs);

        let mut detail = ToolDetail::new(params);
        if let Some(result) = shape.get("result") {
            detail = detail.result(self.lowering.lower(result.module, &result.member.ty));
        }
        if let Some(value) = shape
            .get("annotations")
            .and_then(|member| extract_literal(&member.member.ty))
        {
            match serde_json::from_value::<ToolAnnotations>(value) {
                Ok(annotations) => detail = detail.annotations(annotations),
                Err(err) => tracing::debug!(error = %err, "ignoring tool annotations"),
            }
        }
        DeclarationDetail::Tool(detail)
    }

    fn resource(
        &mut self,
        candidate: &Candidate<'u>,
        shape: &Shape<'u>,
        uri: &str,
        member: Option<HostMember<'u>>,
    ) -> Result<DeclarationDetail, CompileError> {
        let value = shape.get("value");
        let returns = shape.get("returns");
        let dynamic = bool_field(shape, "dynamic") == Some(true);

        if value.is_some() && (returns.is_some() || dynamic) {
            let dynamic_field = if returns.is_some() { "returns" } else { "dynamic" };
            return Err(CompileError::mutually_exclusive_fields(
                candidate.name,
                uri,
                "value",
                dynamic_field,
            ));
        }

        let content = if let Some(value) = value {
            let Some(value) = extract_literal(&value.member.ty) else {
                return Err(CompileError::missing_literal_data(candidate.name, uri));
            };
            ResourceContent::Static { value }
        } else if let Some(returns) = returns {
            ResourceContent::Dynamic {
                returns: Some(self.lowering.lower(returns.module, &returns.member.ty)),
            }
        } else if dynamic || member.is_some() {
            ResourceContent::Dynamic { returns: None }
        } else {
            return Err(CompileError::missing_literal_data(candidate.name, uri));
        };

        let mut detail = ResourceDetail::new(uri, content);
        if let Some(mime_type) = string_field(shape, "mimeType") {
            detail = detail.mime_type(mime_type);
        }
        Ok(DeclarationDetail::Resource(detail))
    }

    fn prompt(&mut self, shape: &Shape<'u>, docs: &[&DocComment]) -> DeclarationDetail {
        let mut args = self.params(shape, "args");
        fill_param_docs(&mut args, docs);

        let mut detail = PromptDetail::new(args);
        if let Some(template) = string_field(shape, "template") {
            detail = detail.template(template);
        }
        DeclarationDetail::Prompt(detail)
    }

    fn completion(&mut self, shape: &Shape<'u>) -> DeclarationDetail {
        let reference = shape
            .get("ref")
            .and_then(|member| extract_literal(&member.member.ty));
        let params = self.params(shape, "params");
        DeclarationDetail::Completion(CompletionDetail::new(reference, params))
    }

    fn params(&mut self, shape: &Shape<'u>, field: &str) -> ParameterSchema {
        match shape.get(field) {
            Some(member) => self.lowering.lower_params(member.module, &member.member.ty),
            None => ParameterSchema::object(),
        }
    }

    /// Names listed by a router's `tools` member.
    fn tool_names(&self, shape: &Shape<'u>) -> Vec<String> {
        let Some(member) = shape.get("tools") else {
            return Vec::new();
        };
        let mut refs = Vec::new();
        self.component_refs(member.module, &member.member.ty, &mut refs);
        refs.into_iter().map(|component| component.name).collect()
    }

    /// A skill's `components`: a list, or an object scoping lists by kind.
    fn components(&self, shape: &Shape<'u>) -> Vec<ComponentRef> {
        let Some(member) = shape.get("components") else {
            return Vec::new();
        };

        if let Some(scoped) = self.resolver.shape_of(member.module, &member.member.ty) {
            let mut refs = Vec::new();
            for (field, kind) in [
                ("tools", DeclarationKind::Tool),
                ("resources", DeclarationKind::Resource),
                ("prompts", DeclarationKind::Prompt),
            ] {
                if let Some(list) = scoped.get(field) {
                    let mut listed = Vec::new();
                    self.component_refs(list.module, &list.member.ty, &mut listed);
                    refs.extend(
                        listed
                            .into_iter()
                            .map(|component| ComponentRef::scoped(kind, component.name)),
                    );
                }
            }
            return refs;
        }

        let mut refs = Vec::new();
        self.component_refs(member.module, &member.member.ty, &mut refs);
        refs
    }

    /// Collect names from string literals and references to declarations.
    /// A reference resolved to a declaration carries that declaration's kind.
    fn component_refs(&self, module: &'u Module, ty: &'u TypeNode, out: &mut Vec<ComponentRef>) {
        match ty {
            TypeNode::Literal(Literal::String(name)) => out.push(ComponentRef::any(name.clone())),
            TypeNode::Tuple(elements) => {
                for element in elements {
                    self.component_refs(module, &element.ty, out);
                }
            }
            TypeNode::Union(parts) => {
                for part in parts {
                    self.component_refs(module, part, out);
                }
            }
            TypeNode::Array(inner) => self.component_refs(module, inner, out),
            TypeNode::Reference { name, .. } => {
                let key = match self.resolver.resolve(module, name) {
                    Some(Symbol::Interface { module, name }) => {
                        Some((module.path.clone(), name.to_string()))
                    }
                    Some(Symbol::Alias { module, decl }) => {
                        Some((module.path.clone(), decl.name.clone()))
                    }
                    _ => None,
                };
                match key.and_then(|key| self.names.get(&key)) {
                    Some((kind, declared)) => out.push(ComponentRef::scoped(*kind, declared.clone())),
                    None => out.push(ComponentRef::any(name.clone())),
                }
            }
            _ => {}
        }
    }
}

/// Extract declarations from `unit` with the built-in shape registry.
///
/// # Errors
///
/// See [`Extractor::extract`].
pub fn extract(unit: &CompiledUnit) -> Result<ParseResult, CompileError> {
    let registry = ShapeRegistry::builtin();
    Extractor::new(unit, &registry).extract()
}

fn server(shape: &Shape<'_>) -> DeclarationDetail {
    let version = string_field(shape, "version")
        .map(ToString::to_string)
        .or_else(|| {
            number_field(shape, "version")
                .and_then(number_value)
                .map(|value| value.to_string())
        })
        .unwrap_or_default();

    DeclarationDetail::ServerMeta(ServerDetail {
        version,
        transport: string_field(shape, "transport").and_then(TransportKind::parse),
        port: number_field(shape, "port").and_then(port),
        stateful: bool_field(shape, "stateful"),
    })
}

/// Fill property descriptions from `@param` tags, first source first.
fn fill_param_docs(schema: &mut ParameterSchema, docs: &[&DocComment]) {
    for doc in docs {
        for (name, text) in &doc.params {
            if let Some(property) = schema.properties.get_mut(name) {
                if property.description.is_none() {
                    property.description = Some(text.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramBuilder;
    use mcpkit_core::error::CompileError;
    use mcpkit_core::types::Hidden;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compile(source: &str) -> Result<ParseResult, CompileError> {
        let unit = ProgramBuilder::new()
            .build_source("/virtual/server.ts", source)
            .expect("valid program");
        extract(&unit)
    }

    #[test]
    fn test_tool_binding_and_docs() {
        let result = compile(
            r"
            /** Get the weather for a city. */
            interface GetWeatherTool extends ITool {
              name: 'get_weather';
              params: { location: { type: 'string' }; units?: 'celsius' | 'fahrenheit' };
              result: { temperature: number };
              annotations: { readOnlyHint: true };
            }
            export default class Weather {
              /**
               * Fetches weather.
               * @param location City name
               * @param units Unit system
               */
              getWeather = async () => ({ temperature: 20 });
            }
            ",
        )
        .expect("extracts");

        let tool = result.tool("get_weather").expect("tool");
        assert_eq!(tool.binding_name.as_deref(), Some("getWeather"));
        assert_eq!(tool.description.as_deref(), Some("Get the weather for a city."));
        let detail = tool.as_tool().expect("tool detail");
        assert_eq!(detail.params.required_properties, vec!["location"]);
        assert_eq!(
            detail.params.properties["location"].description.as_deref(),
            Some("City name")
        );
        assert_eq!(
            detail.params.properties["units"].description.as_deref(),
            Some("Unit system")
        );
        assert!(detail.result.is_some());
        assert!(detail.is_read_only());
        assert_eq!(tool.location.as_ref().map(|l| l.line), Some(3));
    }

    #[test]
    fn test_member_docs_fill_missing_description() {
        let result = compile(
            r"
            interface PingTool extends ITool { name: 'ping'; params: {} }
            export default class Server {
              /** Replies with pong. */
              ping = async () => 'pong';
            }
            ",
        )
        .expect("extracts");
        assert_eq!(
            result.tool("ping").and_then(|t| t.description.as_deref()),
            Some("Replies with pong.")
        );
    }

    #[test]
    fn test_static_and_dynamic_resources() {
        let result = compile(
            r"
            interface ConfigResource extends IResource {
              uri: 'config://app'; name: 'config'; mimeType: 'application/json';
              value: { theme: 'dark'; retries: 3 };
            }
            interface StatsResource extends IResource {
              uri: 'stats://live'; name: 'stats'; returns: { count: number };
            }
            interface FeedResource extends IResource { uri: 'feed://all'; dynamic: true }
            export default class Server {}
            ",
        )
        .expect("extracts");

        let config = result.resource("config://app").and_then(|r| r.as_resource()).expect("config");
        assert_eq!(config.static_value(), Some(&json!({ "theme": "dark", "retries": 3 })));
        assert_eq!(config.mime_type.as_deref(), Some("application/json"));

        let stats = result.resource("stats://live").and_then(|r| r.as_resource()).expect("stats");
        assert!(matches!(stats.content, ResourceContent::Dynamic { returns: Some(_) }));

        let feed = result.resource("feed://all").expect("feed");
        assert_eq!(feed.name, "feed");
        assert!(feed.requires_implementation());
    }

    #[test]
    fn test_resource_field_conflicts() {
        let err = compile(
            "interface Bad extends IResource { uri: 'x://y'; returns: string; value: 'a' }",
        )
        .expect_err("conflict");
        assert!(matches!(err, CompileError::MutuallyExclusiveFields { .. }));

        let err = compile("interface Bad extends IResource { uri: 'x://y'; value: { a: string } }")
            .expect_err("not literal");
        assert!(matches!(err, CompileError::MissingLiteralData { .. }));
    }

    #[test]
    fn test_hidden_and_membership() {
        let result = compile(
            r"
            interface A extends ITool { name: 'a'; hidden: true; skill: 'ops' }
            interface B extends ITool { name: 'b'; hidden: (ctx: unknown) => boolean; skill: ['ops', 'admin'] }
            interface C extends ITool { name: 'c'; hidden: isAdmin }
            export default class S {}
            ",
        )
        .expect("extracts");
        let a = result.tool("a").expect("a");
        assert_eq!(a.hidden, Hidden::Static(true));
        assert_eq!(a.skill_membership, vec!["ops"]);
        let b = result.tool("b").expect("b");
        assert_eq!(b.hidden, Hidden::Predicate("B.hidden".into()));
        assert_eq!(b.skill_membership, vec!["ops", "admin"]);
        assert_eq!(result.tool("c").map(|c| c.hidden.clone()), Some(Hidden::Predicate("isAdmin".into())));
    }

    #[test]
    fn test_router_and_skill_references() {
        let result = compile(
            r"
            interface SearchTool extends ITool { name: 'search_docs' }
            interface ReadTool extends ITool { name: 'read' }
            interface DocsRouter extends IRouter { name: 'docs'; tools: [SearchTool, 'read'] }
            interface DocsSkill extends ISkill {
              name: 'docs_skill';
              components: { tools: [SearchTool]; prompts: ['summarize'] };
            }
            interface FlatSkill extends ISkill { name: 'flat'; components: ['read', SearchTool] }
            export default class S {}
            ",
        )
        .expect("extracts");

        let router = result.of_kind(DeclarationKind::Router)["docs"].as_router().expect("router");
        assert_eq!(router.tools, vec!["search_docs", "read"]);

        let skill = result.skill("docs_skill").and_then(|s| s.as_skill()).expect("skill");
        assert_eq!(
            skill.components,
            vec![
                ComponentRef::scoped(DeclarationKind::Tool, "search_docs"),
                ComponentRef::scoped(DeclarationKind::Prompt, "summarize"),
            ]
        );

        let flat = result.skill("flat").and_then(|s| s.as_skill()).expect("flat");
        assert_eq!(
            flat.components,
            vec![
                ComponentRef::any("read"),
                ComponentRef::scoped(DeclarationKind::Tool, "search_docs"),
            ]
        );
    }

    #[test]
    fn test_server_meta() {
        let result = compile(
            r"
            interface WeatherServer extends IServer {
              name: 'weather'; version: '1.2.0'; transport: 'http'; port: 3000; stateful: false;
            }
            /** Weather data over MCP. */
            export default class Weather implements WeatherServer {}
            ",
        )
        .expect("extracts");
        let server = result.server.as_ref().expect("server");
        assert_eq!(server.name, "weather");
        assert_eq!(server.binding_name.as_deref(), Some("Weather"));
        assert_eq!(server.description.as_deref(), Some("Weather data over MCP."));
        assert_eq!(
            server.as_server(),
            Some(&ServerDetail {
                version: "1.2.0".into(),
                transport: Some(TransportKind::Http),
                port: Some(3000),
                stateful: Some(false),
            })
        );
    }

    #[test]
    fn test_prompt_template_and_completion() {
        let result = compile(
            r"
            interface GreetPrompt extends IPrompt {
              name: 'greet'; args: { who: string }; template: 'Hello {who}';
            }
            interface CityCompletion extends ICompletion {
              name: 'city'; ref: { type: 'argument'; name: 'city' };
            }
            export default class S {}
            ",
        )
        .expect("extracts");
        let prompt = result.prompt("greet").expect("prompt");
        assert!(!prompt.requires_implementation());
        assert_eq!(
            prompt.as_prompt().and_then(|p| p.template.as_deref()),
            Some("Hello {who}")
        );

        let completion = result.of_kind(DeclarationKind::Completion)["city"]
            .as_completion()
            .expect("completion");
        assert_eq!(completion.reference_name(), Some("city"));
    }

    #[test]
    fn test_duplicate_names() {
        let err = compile(
            r"
            interface A extends ITool { name: 'same' }
            interface B extends ITool { name: 'same' }
            ",
        )
        .expect_err("duplicate");
        assert!(matches!(err, CompileError::DuplicateDeclaration { .. }));
    }

    #[test]
    fn test_duplicate_resource_names_across_uris() {
        let err = compile(
            r"
            interface ConfigA extends IResource { uri: 'config://a'; name: 'config'; value: { a: 1 } }
            interface ConfigB extends IResource { uri: 'config://b'; name: 'config'; value: { b: 2 } }
            ",
        )
        .expect_err("duplicate");
        match err {
            CompileError::DuplicateDeclaration { kind, name, .. } => {
                assert_eq!(kind, DeclarationKind::Resource);
                assert_eq!(name, "config");
            }
            other => panic!("expected a duplicate, got {other}"),
        }
    }

    #[test]
    fn test_dropped_constraints_reach_diagnostics() {
        let result = compile(
            "interface SearchTool extends ITool { name: 'search'; params: { q: { type: 'string'; maxLength: 2.5 } } }",
        )
        .expect("extracts");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].rule, crate::lower::INVALID_CONSTRAINT);
    }

    #[test]
    fn test_no_declarations() {
        let err = compile("interface Weather { temperature: number }").expect_err("nothing");
        assert!(matches!(err, CompileError::NoDeclarations { .. }));
    }

    #[test]
    fn test_resource_without_uri_is_diagnostic() {
        let result = compile(
            "interface Broken extends IResource { name: 'broken' }\nexport default class S {}",
        )
        .expect("extracts");
        assert!(result.is_empty());
        assert_eq!(result.diagnostics[0].rule, INVALID_DECLARATION);
    }
}
