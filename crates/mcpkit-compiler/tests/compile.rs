//! End-to-end compiler tests: in-memory scenarios and on-disk projects.

use std::fs;
use std::sync::Arc;

use mcpkit_compiler::{CompileOptions, Compiler, ProgramCache};
use mcpkit_core::error::CompileError;
use mcpkit_core::schema::ParameterSchema;
use mcpkit_core::types::{DeclarationKind, ResourceContent};
use mcpkit_core::validation::Severity;
use mcpkit_testing::fixtures::{
    NON_HIDDEN_SKILL, ORPHANED_HIDDEN_TOOL, VIRTUAL_PATH, WEATHER_SERVER,
};
use mcpkit_testing::{
    assert_bound, assert_has_warning, assert_required, init_test_tracing, TempProject,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn compile(source: &str) -> Result<mcpkit_core::ParseResult, CompileError> {
    init_test_tracing();
    Compiler::new().compile_source(VIRTUAL_PATH, source)
}

#[test]
fn test_get_weather_schema_and_binding() {
    let ir = compile(
        r"
        interface GetWeatherTool extends ITool {
          name: 'get_weather';
          description: 'Get the weather';
          params: { location: { type: 'string' } };
          result: { temperature: number };
        }
        export default class Weather {
          getWeather = async (params) => ({ temperature: 20 });
        }
        ",
    )
    .expect("compiles");

    assert_bound(&ir, DeclarationKind::Tool, "get_weather", "getWeather");
    let tool = ir.tool("get_weather").and_then(|t| t.as_tool()).expect("tool");
    assert_eq!(
        tool.params,
        ParameterSchema::object().property("location", ParameterSchema::string())
    );
    assert_eq!(
        tool.result.as_ref().map(|r| r.required_properties.clone()),
        Some(vec!["temperature".to_string()])
    );
}

#[test]
fn test_non_hidden_component_is_a_warning() {
    let ir = compile(NON_HIDDEN_SKILL).expect("compiles");
    let warning = assert_has_warning(&ir.diagnostics, "non-hidden-components");
    assert_eq!(warning.severity, Severity::Warn);
    assert!(!ir.has_errors());
}

#[test]
fn test_orphaned_hidden_tool_reports_once() {
    let ir = compile(ORPHANED_HIDDEN_TOOL).expect("compiles");
    let orphaned: Vec<_> = ir
        .diagnostics
        .iter()
        .filter(|d| d.rule == "orphaned-hidden-tool")
        .collect();
    assert_eq!(orphaned.len(), 1);
    assert!(orphaned[0].message.contains("secret"));
    assert!(orphaned[0].related_items.is_empty());
}

#[test]
fn test_literal_union_lowers_to_enum() {
    let ir = compile(
        r"
        interface ConvertTool extends ITool {
          name: 'convert';
          params: { units: 'celsius' | 'fahrenheit' };
        }
        ",
    )
    .expect("compiles");
    let tool = ir.tool("convert").and_then(|t| t.as_tool()).expect("tool");
    assert_eq!(
        tool.params.get_property("units"),
        Some(&ParameterSchema::enumeration(["celsius", "fahrenheit"]))
    );
}

#[test]
fn test_weather_server_fixture() {
    let ir = compile(WEATHER_SERVER).expect("compiles");
    let expected = mcpkit_testing::weather_ir();

    assert_eq!(ir.len(), expected.len());
    assert!(ir.diagnostics.is_empty(), "{:?}", ir.diagnostics);
    assert_eq!(ir.server_name(), Some("weather"));
    assert_eq!(
        ir.server.as_ref().and_then(|s| s.as_server()),
        expected.server.as_ref().and_then(|s| s.as_server())
    );
    for declaration in expected.declarations() {
        let compiled = ir
            .get(declaration.kind(), declaration.key())
            .unwrap_or_else(|| panic!("missing {} {}", declaration.kind(), declaration.key()));
        assert_eq!(compiled.name, declaration.name);
        assert_eq!(compiled.binding_name, declaration.binding_name);
        assert_eq!(compiled.hidden, declaration.hidden);
        assert_eq!(compiled.skill_membership, declaration.skill_membership);
        assert_eq!(compiled.description, declaration.description);
    }

    let params = &ir.tool("get_weather").and_then(|t| t.as_tool()).expect("tool").params;
    assert_required(params, &["location"]);
    assert_eq!(
        params.get_property("location").and_then(|p| p.description.as_deref()),
        Some("City name")
    );

    let config = ir.resource("config://weather").and_then(|r| r.as_resource()).expect("resource");
    assert!(matches!(config.content, ResourceContent::Static { .. }));
    assert!(ir.ensure_bindings().is_ok());
}

#[test]
fn test_single_line_member_docs() {
    let ir = compile(
        r"
        interface GetWeatherTool extends ITool {
          name: 'get_weather';
          params: { location: string };
        }
        export default class Weather {
          /** Fetches weather. @param location City name */
          getWeather: GetWeatherTool = async (p) => ({ temperature: 20 });
        }
        ",
    )
    .expect("compiles");

    let tool = ir.tool("get_weather").expect("tool");
    assert_eq!(tool.description.as_deref(), Some("Fetches weather."));
    let params = &tool.as_tool().expect("tool detail").params;
    assert_eq!(
        params.get_property("location").and_then(|p| p.description.as_deref()),
        Some("City name")
    );
}

#[test]
fn test_unbound_tool_is_reported_by_ensure_bindings() {
    let ir = compile(
        r"
        interface PingTool extends ITool { name: 'ping'; params: {} }
        export default class Server {}
        ",
    )
    .expect("compiles");
    let err = ir.ensure_bindings().expect_err("unbound");
    assert!(matches!(err, CompileError::ImplementationNotFound { .. }));
}

#[test]
fn test_project_with_imports() {
    let project = TempProject::new()
        .and_then(|p| {
            p.file(
                "src/base.ts",
                "export interface BaseTool extends ITool { description: 'Shared description' }",
            )
        })
        .and_then(|p| {
            p.file(
                "src/tools/weather.ts",
                r"
                import { BaseTool } from '../base';
                export interface GetWeatherTool extends BaseTool {
                  name: 'get_weather';
                  params: { city: string };
                }
                ",
            )
        })
        .and_then(|p| {
            p.file(
                "src/server.ts",
                r"
                import type { GetWeatherTool } from './tools/weather.js';
                export default class Server {
                  weather: GetWeatherTool = async () => ({});
                }
                ",
            )
        })
        .expect("project");

    let ir = Compiler::new()
        .compile(project.path("src/server.ts"))
        .expect("compiles");

    let tool = ir.tool("get_weather").expect("tool");
    assert_eq!(tool.description.as_deref(), Some("Shared description"));
    assert_eq!(tool.binding_name.as_deref(), Some("weather"));
    let declared_in = tool.location.as_ref().and_then(|l| l.path.file_name());
    assert_eq!(declared_in.and_then(|n| n.to_str()), Some("weather.ts"));
    assert!(ir.tool("base").is_none());
}

#[test]
fn test_project_with_path_aliases() {
    let project = TempProject::new()
        .and_then(|p| {
            p.file(
                "tsconfig.json",
                r#"{
                  // aliases for shared declarations
                  "compilerOptions": {
                    "baseUrl": ".",
                    "paths": { "@tools/*": ["src/tools/*"] },
                  },
                }"#,
            )
        })
        .and_then(|p| {
            p.file(
                "src/tools/ping.ts",
                "export interface PingTool extends ITool { name: 'ping'; params: {} }",
            )
        })
        .and_then(|p| {
            p.file(
                "src/server.ts",
                "import { PingTool } from '@tools/ping';\nexport default class S { ping = () => 'pong'; }",
            )
        })
        .expect("project");

    let ir = Compiler::new()
        .compile(project.path("src/server.ts"))
        .expect("compiles");
    assert_bound(&ir, DeclarationKind::Tool, "ping", "ping");
}

#[test]
fn test_invalid_tsconfig_is_a_build_error() {
    let project = TempProject::new()
        .and_then(|p| p.file("tsconfig.json", "{ not json"))
        .and_then(|p| p.file("server.ts", "export default class S {}"))
        .expect("project");

    let err = Compiler::new()
        .compile(project.path("server.ts"))
        .expect_err("invalid config");
    assert!(matches!(err.root(), CompileError::ProjectConfig { .. }));
}

#[test]
fn test_build_errors_carry_the_path() {
    let project = TempProject::new()
        .and_then(|p| p.file("server.ts", "interface A {\n  name: 'a'\n  params: {\n}\nexport default class {"))
        .expect("project");

    let missing = Compiler::new()
        .compile(project.path("absent.ts"))
        .expect_err("missing");
    assert!(matches!(missing, CompileError::SourceNotFound { .. }));

    let syntax = Compiler::new()
        .compile(project.path("server.ts"))
        .expect_err("syntax");
    match syntax {
        CompileError::Syntax { path, line, .. } => {
            assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("server.ts"));
            assert!(line >= 1);
        }
        other => panic!("expected a syntax error, got {other}"),
    }
}

#[test]
fn test_shared_cache_and_clear() {
    let project = TempProject::new()
        .and_then(|p| {
            p.file(
                "server.ts",
                "interface PingTool extends ITool { name: 'ping'; params: {} }",
            )
        })
        .expect("project");
    let entry = project.path("server.ts");

    let cache = ProgramCache::shared();
    let first = Compiler::new().with_cache(Arc::clone(&cache));
    let second = Compiler::new().with_cache(Arc::clone(&cache));

    first.compile(&entry).expect("compiles");
    second.compile(&entry).expect("compiles");
    assert_eq!(cache.len(), 1);

    // The cache serves the old program until it is cleared.
    fs::write(&entry, "interface PongTool extends ITool { name: 'pong'; params: {} }")
        .expect("rewrite");
    assert!(second.compile(&entry).expect("cached").tool("ping").is_some());

    assert_eq!(first.clear_cache(Some(&entry)), 1);
    let fresh = second.compile(&entry).expect("recompiles");
    assert!(fresh.tool("pong").is_some());
    assert!(fresh.tool("ping").is_none());
}

#[test]
fn test_explicit_tsconfig_option() {
    let project = TempProject::new()
        .and_then(|p| {
            p.file(
                "config/tsconfig.json",
                r#"{ "compilerOptions": { "baseUrl": "../lib" } }"#,
            )
        })
        .and_then(|p| {
            p.file(
                "lib/shared.ts",
                "export interface EchoTool extends ITool { name: 'echo'; params: {} }",
            )
        })
        .and_then(|p| p.file("server.ts", "import { EchoTool } from 'shared';"))
        .expect("project");

    let options = CompileOptions::new().tsconfig(project.path("config/tsconfig.json"));
    let ir = Compiler::new()
        .with_options(options)
        .compile(project.path("server.ts"))
        .expect("compiles");
    assert!(ir.tool("echo").is_some());
}

fn member_strategy() -> impl Strategy<Value = Vec<(bool, Option<bool>, bool)>> {
    prop::collection::vec((any::<bool>(), prop::option::of(any::<bool>()), any::<bool>()), 1..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_requiredness_follows_markers(members in member_strategy()) {
        let mut body = String::new();
        for (i, (optional, explicit, definition)) in members.iter().enumerate() {
            let marker = if *optional { "?" } else { "" };
            let ty = match (definition, explicit) {
                (true, Some(required)) => format!("{{ type: 'string'; required: {required} }}"),
                (true, None) => "{ type: 'string' }".to_string(),
                (false, _) => "string".to_string(),
            };
            body.push_str(&format!("p{i}{marker}: {ty}; "));
        }
        let source = format!("interface T extends ITool {{ name: 't'; params: {{ {body} }} }}");
        let ir = Compiler::new().compile_source(VIRTUAL_PATH, &source).expect("compiles");
        let params = &ir.tool("t").and_then(|t| t.as_tool()).expect("tool").params;

        for (i, (optional, explicit, definition)) in members.iter().enumerate() {
            let expected = if *definition {
                explicit.unwrap_or(!optional)
            } else {
                !optional
            };
            let property = params.get_property(&format!("p{i}")).expect("property");
            prop_assert_eq!(property.required, expected);
            prop_assert_eq!(params.required_properties.contains(&format!("p{i}")), expected);
        }
    }

    #[test]
    fn prop_value_with_returns_is_always_rejected(
        order in Just(vec![
            "uri: 'data://x';",
            "name: 'x';",
            "value: { a: 1 };",
            "returns: { a: number };",
        ])
        .prop_shuffle()
    ) {
        let source = format!("interface X extends IResource {{ {} }}", order.join(" "));
        let err = Compiler::new().compile_source(VIRTUAL_PATH, &source).expect_err("conflict");
        let is_conflict = matches!(err, CompileError::MutuallyExclusiveFields { .. });
        prop_assert!(is_conflict);
    }
}
