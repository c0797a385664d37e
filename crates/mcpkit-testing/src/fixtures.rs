//! Test fixtures for mcpkit testing.
//!
//! Sample server-definition sources for compiler tests and hand-built IR
//! for validation tests. The sources and the IR describe the same weather
//! server.

use mcpkit_core::ir::ParseResult;
use mcpkit_core::schema::ParameterSchema;
use mcpkit_core::types::{
    ComponentRef, Declaration, DeclarationDetail, DeclarationKind, Hidden, PromptDetail,
    ResourceContent, ResourceDetail, ServerDetail, SkillDetail, ToolDetail, TransportKind,
};

/// Path used for in-memory fixture sources.
pub const VIRTUAL_PATH: &str = "/virtual/server.ts";

/// A complete weather server: server metadata, a public and a hidden tool,
/// a static resource, a template prompt and a skill.
pub const WEATHER_SERVER: &str = r"
import type { ITool, IServer, IResource, IPrompt, ISkill } from 'simply-mcp';

interface WeatherServer extends IServer {
  name: 'weather';
  version: '1.0.0';
  transport: 'http';
  port: 3000;
}

/** Get the current weather for a location. */
interface GetWeatherTool extends ITool {
  name: 'get_weather';
  params: {
    location: { type: 'string'; description: 'City name' };
    units?: 'celsius' | 'fahrenheit';
  };
  result: { temperature: number; conditions: string };
}

interface GetForecastTool extends ITool {
  name: 'get_forecast';
  description: 'Multi-day forecast';
  params: { location: string; days?: number };
  hidden: true;
  skill: 'weather';
}

interface ConfigResource extends IResource {
  uri: 'config://weather';
  name: 'config';
  mimeType: 'application/json';
  value: { units: 'celsius'; refresh: 300 };
}

interface ReportPrompt extends IPrompt {
  name: 'report';
  description: 'Weather report';
  args: { location: string };
  template: 'Report the weather for {location}';
}

interface WeatherSkill extends ISkill {
  name: 'weather';
  description: 'Forecasting tools';
  components: ['get_forecast'];
}

/** Weather data over MCP. */
export default class Weather implements WeatherServer {
  getWeather: GetWeatherTool = async (params) => ({ temperature: 20, conditions: 'sunny' });
  getForecast = async (params) => [];
}
";

/// A hidden tool that no skill references.
pub const ORPHANED_HIDDEN_TOOL: &str = r"
interface SecretTool extends ITool {
  name: 'secret';
  description: 'Not listed';
  params: {};
  hidden: true;
}

export default class Server {
  secret = async () => 'ok';
}
";

/// A skill that groups a tool which is not hidden.
pub const NON_HIDDEN_SKILL: &str = r"
interface GetWeatherTool extends ITool {
  name: 'get_weather';
  description: 'Get the weather';
  params: { location: { type: 'string' } };
}

interface WeatherSkill extends ISkill {
  name: 'weatherSkill';
  description: 'Weather';
  components: ['get_weather'];
}

export default class Server {
  getWeather = async () => ({});
}
";

fn tool(name: &str, interface_name: &str, params: ParameterSchema) -> Declaration {
    Declaration::new(
        name,
        interface_name,
        DeclarationDetail::Tool(ToolDetail::new(params)),
    )
}

/// The IR [`WEATHER_SERVER`] compiles to, without source locations.
///
/// Validates clean under the default configuration.
#[must_use]
pub fn weather_ir() -> ParseResult {
    let mut ir = ParseResult::new(VIRTUAL_PATH);

    let mut server = Declaration::new(
        "weather",
        "WeatherServer",
        DeclarationDetail::ServerMeta(ServerDetail {
            version: "1.0.0".to_string(),
            transport: Some(TransportKind::Http),
            port: Some(3000),
            stateful: None,
        }),
    )
    .bound_to("Weather");
    server.description = Some("Weather data over MCP.".to_string());

    let get_weather = tool(
        "get_weather",
        "GetWeatherTool",
        ParameterSchema::object()
            .property("location", ParameterSchema::string().description("City name"))
            .property(
                "units",
                ParameterSchema::enumeration(["celsius", "fahrenheit"]).optional(),
            ),
    )
    .description("Get the current weather for a location.")
    .bound_to("getWeather");

    let get_forecast = tool(
        "get_forecast",
        "GetForecastTool",
        ParameterSchema::object()
            .property("location", ParameterSchema::string())
            .property("days", ParameterSchema::number().optional()),
    )
    .description("Multi-day forecast")
    .bound_to("getForecast")
    .hidden(Hidden::Static(true))
    .member_of("weather");

    let config = Declaration::new(
        "config",
        "ConfigResource",
        DeclarationDetail::Resource(
            ResourceDetail::new(
                "config://weather",
                ResourceContent::Static {
                    value: serde_json::json!({ "units": "celsius", "refresh": 300 }),
                },
            )
            .mime_type("application/json"),
        ),
    );

    let report = Declaration::new(
        "report",
        "ReportPrompt",
        DeclarationDetail::Prompt(
            PromptDetail::new(
                ParameterSchema::object().property("location", ParameterSchema::string()),
            )
            .template("Report the weather for {location}"),
        ),
    )
    .description("Weather report");

    let skill = Declaration::new(
        "weather",
        "WeatherSkill",
        DeclarationDetail::Skill(SkillDetail::new(vec![ComponentRef::any("get_forecast")])),
    )
    .description("Forecasting tools");

    for declaration in [server, get_weather, get_forecast, config, report, skill] {
        ir.insert(declaration)
            .expect("fixture declarations are unique");
    }
    ir
}

/// One statically hidden tool and no skills.
#[must_use]
pub fn orphaned_hidden_ir() -> ParseResult {
    let mut ir = ParseResult::new(VIRTUAL_PATH);
    let secret = tool("secret", "SecretTool", ParameterSchema::object())
        .description("Not listed")
        .bound_to("secret")
        .hidden(Hidden::Static(true));
    ir.insert(secret).expect("empty IR accepts any declaration");
    ir
}

/// A skill whose components are given, plus one visible tool per name.
#[must_use]
pub fn skill_ir(skill: &str, components: &[&str]) -> ParseResult {
    let mut ir = ParseResult::new(VIRTUAL_PATH);
    for name in components {
        let _ = ir.insert(tool(name, "Tool", ParameterSchema::object()));
    }
    let _ = ir.insert(Declaration::new(
        skill,
        "Skill",
        DeclarationDetail::Skill(SkillDetail::new(
            components
                .iter()
                .map(|name| ComponentRef::scoped(DeclarationKind::Tool, *name))
                .collect(),
        )),
    ));
    ir
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpkit_core::validation::{validate, ValidationConfig};

    #[test]
    fn test_weather_ir_is_clean() {
        let ir = weather_ir();
        assert_eq!(ir.len(), 6);
        assert!(validate(&ir, &ValidationConfig::default()).is_empty());
    }

    #[test]
    fn test_skill_ir() {
        let ir = skill_ir("ops", &["a", "b"]);
        assert_eq!(ir.skill("ops").and_then(|s| s.as_skill()).map(|s| s.components.len()), Some(2));
        assert!(ir.tool("a").is_some());
    }
}
