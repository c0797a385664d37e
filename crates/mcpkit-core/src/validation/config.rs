//! Validation configuration.
//!
//! The configuration is plain data: loading it from a file is the caller's
//! job. Keys are rule ids in kebab-case:
//!
//! ```json
//! { "strict": false, "rules": { "empty-skills": "off", "orphaned-hidden": "error" } }
//! ```

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::warning::Severity;

/// Configured level of a rule.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    /// The rule does not run.
    Off,
    /// Findings are warnings.
    #[default]
    Warn,
    /// Findings are errors.
    Error,
}

impl RuleLevel {
    /// The severity findings get, or `None` when the rule is off.
    ///
    /// `strict` escalates `warn` to `error`.
    #[must_use]
    pub fn effective(self, strict: bool) -> Option<Severity> {
        match self {
            Self::Off => None,
            Self::Warn if strict => Some(Severity::Error),
            Self::Warn => Some(Severity::Warn),
            Self::Error => Some(Severity::Error),
        }
    }
}

/// Resolved validation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct ValidationConfig {
    /// Escalate every `warn` finding to `error`.
    pub strict: bool,
    /// Per-rule level overrides. Rules not listed use their default.
    pub rules: BTreeMap<String, RuleLevel>,
}

impl ValidationConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable strict mode.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Override the level of one rule.
    #[must_use]
    pub fn rule(mut self, id: impl Into<String>, level: RuleLevel) -> Self {
        self.rules.insert(id.into(), level);
        self
    }

    /// The configured level for `id`, falling back to `default`.
    #[must_use]
    pub fn level_for(&self, id: &str, default: RuleLevel) -> RuleLevel {
        self.rules.get(id).copied().unwrap_or(default)
    }

    /// JSON Schema describing this configuration, for editor tooling.
    #[must_use]
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(ValidationConfig)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_levels() {
        assert_eq!(RuleLevel::Off.effective(true), None);
        assert_eq!(RuleLevel::Warn.effective(false), Some(Severity::Warn));
        assert_eq!(RuleLevel::Warn.effective(true), Some(Severity::Error));
        assert_eq!(RuleLevel::Error.effective(false), Some(Severity::Error));
    }

    #[test]
    fn test_deserialize_kebab_case() -> Result<(), serde_json::Error> {
        let config: ValidationConfig = serde_json::from_value(json!({
            "strict": true,
            "rules": { "empty-skills": "off", "orphaned-hidden": "error" }
        }))?;
        assert!(config.strict);
        assert_eq!(config.level_for("empty-skills", RuleLevel::Warn), RuleLevel::Off);
        assert_eq!(
            config.level_for("non-hidden-components", RuleLevel::Warn),
            RuleLevel::Warn
        );
        Ok(())
    }

    #[test]
    fn test_missing_fields_use_defaults() -> Result<(), serde_json::Error> {
        let config: ValidationConfig = serde_json::from_value(json!({}))?;
        assert_eq!(config, ValidationConfig::default());
        Ok(())
    }

    #[test]
    fn test_json_schema_names_properties() {
        let schema = ValidationConfig::json_schema();
        let text = schema.to_string();
        assert!(text.contains("strict"));
        assert!(text.contains("rules"));
    }
}
