//! Compiling the weather server through the facade.

use mcpkit::prelude::*;
use mcpkit_testing::fixtures::{VIRTUAL_PATH, WEATHER_SERVER};
use mcpkit_testing::{assert_no_warning, init_test_tracing, weather_ir};
use pretty_assertions::assert_eq;

fn compile_weather() -> ParseResult {
    init_test_tracing();
    Compiler::new()
        .compile_source(VIRTUAL_PATH, WEATHER_SERVER)
        .expect("weather server compiles")
}

#[test]
fn test_declarations_match_hand_built_ir() {
    let ir = compile_weather();
    let expected = weather_ir();

    let names = |ir: &ParseResult, kind| ir.of_kind(kind).keys().cloned().collect::<Vec<_>>();
    for kind in [
        DeclarationKind::Tool,
        DeclarationKind::Resource,
        DeclarationKind::Prompt,
        DeclarationKind::Skill,
    ] {
        assert_eq!(names(&ir, kind), names(&expected, kind), "{kind}");
    }

    let tool = ir.tool("get_weather").and_then(Declaration::as_tool).expect("tool");
    let expected_tool = expected
        .tool("get_weather")
        .and_then(Declaration::as_tool)
        .expect("tool");
    assert_eq!(tool.params, expected_tool.params);

    let prompt = ir.prompt("report").and_then(Declaration::as_prompt).expect("prompt");
    assert_eq!(prompt.template.as_deref(), Some("Report the weather for {location}"));
}

#[test]
fn test_skill_grouping_is_consistent() {
    let ir = compile_weather();
    assert_no_warning(&ir.diagnostics, "orphaned-hidden-tool");
    assert_no_warning(&ir.diagnostics, "non-hidden-components");
    assert_eq!(ir.skill_names().collect::<Vec<_>>(), vec!["weather"]);

    let forecast = ir.tool("get_forecast").expect("tool");
    assert!(forecast.hidden.is_statically_hidden());
    assert_eq!(forecast.skill_membership, vec!["weather".to_string()]);
}

#[test]
fn test_unbound_tool_fails_registration() {
    let ir = compile_weather();
    assert!(ir.ensure_bindings().is_ok());

    let mut ir = ir;
    if let Some(tool) = ir.tools.get_mut("get_forecast") {
        tool.binding_name = None;
    }
    match ir.ensure_bindings() {
        Err(err @ CompileError::ImplementationNotFound { .. }) => {
            let message = err.to_string();
            assert!(message.contains("get_forecast"), "{message}");
        }
        other => panic!("expected ImplementationNotFound, got {other:?}"),
    }
}

#[test]
fn test_ir_serializes_as_camel_case_json() {
    let ir = compile_weather();
    let json = serde_json::to_value(&ir).expect("serializes");

    assert_eq!(json["server"]["name"], "weather");
    assert_eq!(json["tools"]["get_weather"]["bindingName"], "getWeather");
    assert_eq!(json["tools"]["get_weather"]["interfaceName"], "GetWeatherTool");
    assert_eq!(json["tools"]["get_forecast"]["skillMembership"][0], "weather");
    assert_eq!(json["resources"]["config://weather"]["uri"], "config://weather");
    assert!(json.get("diagnostics").is_none());
}

#[test]
fn test_strict_validation_through_options() {
    let source = r"
        interface SecretTool extends ITool { name: 'secret'; params: {}; hidden: true }
        export default class Server { secret = async () => 'ok'; }
    ";
    let relaxed = Compiler::new()
        .compile_source(VIRTUAL_PATH, source)
        .expect("compiles");
    assert!(!relaxed.has_errors());

    let strict = Compiler::new()
        .with_options(CompileOptions::new().validation(ValidationConfig::new().strict(true)))
        .compile_source(VIRTUAL_PATH, source)
        .expect("compiles");
    assert!(strict.has_errors());
}
