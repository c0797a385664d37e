//! Consistency checks over a compiled [`ParseResult`].
//!
//! The engine runs a list of [`ValidationRule`]s over the IR and returns
//! severity-tagged [`ValidationWarning`]s. Rules only annotate; whether an
//! `error` finding fails the build is the caller's decision.
//!
//! # Example
//!
//! ```rust
//! use mcpkit_core::ir::ParseResult;
//! use mcpkit_core::validation::{RuleLevel, ValidationConfig, ValidationEngine};
//!
//! let ir = ParseResult::new("server.ts");
//! let config = ValidationConfig::new().rule("empty-skills", RuleLevel::Off);
//! let report = ValidationEngine::new().report(&ir, &config);
//! assert!(report.is_clean());
//! ```

mod config;
mod index;
mod rules;
mod warning;

pub use config::{RuleLevel, ValidationConfig};
pub use index::{ReferenceIndex, ResolvedComponent};
pub use rules::{
    builtin_rules, EmptySkillsRule, InvalidReferencesRule, NonHiddenComponentsRule,
    OrphanedHiddenRule, OrphanedSkillMembershipRule, ValidationRule,
};
pub use warning::{Severity, ValidationReport, ValidationWarning};

use crate::ir::ParseResult;

/// Runs validation rules over a [`ParseResult`].
///
/// Rules run sequentially in registration order.
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("rules", &self.rule_ids().collect::<Vec<_>>())
            .finish()
    }
}

impl ValidationEngine {
    /// Create an engine with the built-in rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// Create an engine with no rules.
    #[must_use]
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Configuration keys of the registered rules.
    pub fn rule_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.id())
    }

    /// Run every enabled rule and collect the findings.
    #[must_use]
    pub fn validate(&self, ir: &ParseResult, config: &ValidationConfig) -> Vec<ValidationWarning> {
        let index = ReferenceIndex::build(ir);
        let mut warnings = Vec::new();

        for rule in &self.rules {
            let level = config.level_for(rule.id(), rule.default_level());
            let Some(severity) = level.effective(config.strict) else {
                tracing::trace!(rule = rule.id(), "rule disabled");
                continue;
            };
            let found = rule.check(ir, &index, severity);
            tracing::debug!(rule = rule.id(), %severity, findings = found.len(), "rule checked");
            warnings.extend(found);
        }

        warnings
    }

    /// Run every enabled rule and summarize the findings.
    #[must_use]
    pub fn report(&self, ir: &ParseResult, config: &ValidationConfig) -> ValidationReport {
        ValidationReport::new(self.validate(ir, config))
    }
}

/// Validate `ir` with the built-in rules.
#[must_use]
pub fn validate(ir: &ParseResult, config: &ValidationConfig) -> Vec<ValidationWarning> {
    ValidationEngine::new().validate(ir, config)
}
