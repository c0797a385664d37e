//! Built-in validation rules.
//!
//! Each rule is a pure function of the IR and the reference index. Rules
//! never mutate the IR and never stop extraction.

use crate::ir::ParseResult;
use crate::naming;
use crate::types::{Declaration, DeclarationKind};

use super::config::RuleLevel;
use super::index::ReferenceIndex;
use super::warning::{Severity, ValidationWarning};

/// A validation rule.
///
/// Implement this to add project-specific checks to a
/// [`ValidationEngine`](super::ValidationEngine).
pub trait ValidationRule: Send + Sync {
    /// Configuration key of the rule.
    fn id(&self) -> &'static str;

    /// Level used when the configuration does not mention the rule.
    fn default_level(&self) -> RuleLevel {
        RuleLevel::Warn
    }

    /// One-line description for reports.
    fn description(&self) -> &'static str;

    /// Run the rule. Every finding gets `severity`.
    fn check(
        &self,
        ir: &ParseResult,
        index: &ReferenceIndex,
        severity: Severity,
    ) -> Vec<ValidationWarning>;
}

const COMPONENT_KINDS: [DeclarationKind; 3] = [
    DeclarationKind::Tool,
    DeclarationKind::Resource,
    DeclarationKind::Prompt,
];

fn label(kind: DeclarationKind) -> &'static str {
    match kind {
        DeclarationKind::Tool => "Tool",
        DeclarationKind::Resource => "Resource",
        DeclarationKind::Prompt => "Prompt",
        DeclarationKind::Router => "Router",
        DeclarationKind::Skill => "Skill",
        DeclarationKind::Subscription => "Subscription",
        DeclarationKind::Completion => "Completion",
        DeclarationKind::ServerMeta => "Server",
    }
}

fn available_skills(ir: &ParseResult) -> String {
    let names: Vec<&str> = ir.skill_names().collect();
    if names.is_empty() {
        "no skills are declared".to_string()
    } else {
        format!("available skills: {}", names.join(", "))
    }
}

/// A component hidden by a literal `true` that no skill references.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrphanedHiddenRule;

impl ValidationRule for OrphanedHiddenRule {
    fn id(&self) -> &'static str {
        "orphaned-hidden"
    }

    fn description(&self) -> &'static str {
        "hidden capabilities must be reachable through a skill"
    }

    fn check(
        &self,
        ir: &ParseResult,
        index: &ReferenceIndex,
        severity: Severity,
    ) -> Vec<ValidationWarning> {
        let skills: Vec<&str> = ir.skill_names().collect();
        let mut warnings = Vec::new();

        for kind in COMPONENT_KINDS {
            for (key, decl) in ir.of_kind(kind) {
                if !decl.hidden.is_statically_hidden()
                    || !index.skills_referencing(kind, key).is_empty()
                {
                    continue;
                }
                warnings.push(
                    ValidationWarning::new(
                        format!("orphaned-hidden-{}", kind.as_str()),
                        severity,
                        format!(
                            "{} '{}' is hidden but no skill references it, so it can never be discovered",
                            label(kind),
                            decl.name
                        ),
                    )
                    .suggestion(format!(
                        "Add '{}' to a skill's components or declare `skill: '<name>'` on it ({})",
                        decl.name,
                        available_skills(ir)
                    ))
                    .related(skills.iter().copied()),
                );
            }
        }
        warnings
    }
}

/// A skill component that names nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvalidReferencesRule;

impl ValidationRule for InvalidReferencesRule {
    fn id(&self) -> &'static str {
        "invalid-references"
    }

    fn default_level(&self) -> RuleLevel {
        RuleLevel::Error
    }

    fn description(&self) -> &'static str {
        "skill components must name existing tools, resources or prompts"
    }

    fn check(
        &self,
        ir: &ParseResult,
        index: &ReferenceIndex,
        severity: Severity,
    ) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for skill in ir.skill_names() {
            for component in index.components_of(skill) {
                if component.is_resolved() {
                    continue;
                }
                let name = &component.reference.name;
                let what = component.reference.kind.map_or("component", label);
                let mut warning = ValidationWarning::new(
                    "invalid-skill-reference",
                    severity,
                    format!("Skill '{skill}' references unknown {what} '{name}'"),
                )
                .related([skill, name.as_str()]);

                warning = match similar_name(ir, name) {
                    Some(candidate) => warning.suggestion(format!("Did you mean '{candidate}'?")),
                    None => warning.suggestion(format!(
                        "Declare '{name}' or remove it from the components of '{skill}'"
                    )),
                };
                warnings.push(warning);
            }
        }
        warnings
    }
}

/// A component whose name differs from `name` only by naming convention.
fn similar_name<'a>(ir: &'a ParseResult, name: &str) -> Option<&'a str> {
    let variants = naming::variants_of(name);
    COMPONENT_KINDS
        .into_iter()
        .flat_map(|kind| ir.of_kind(kind).values())
        .map(|decl: &Declaration| decl.name.as_str())
        .find(|candidate| *candidate != name && variants.iter().any(|v| v == candidate))
}

/// A skill that lists a component which is not hidden.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonHiddenComponentsRule;

impl ValidationRule for NonHiddenComponentsRule {
    fn id(&self) -> &'static str {
        "non-hidden-components"
    }

    fn description(&self) -> &'static str {
        "skill components are expected to be hidden"
    }

    fn check(
        &self,
        ir: &ParseResult,
        index: &ReferenceIndex,
        severity: Severity,
    ) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for skill in ir.skill_names() {
            for component in index.components_of(skill) {
                let Some((kind, key)) = &component.target else {
                    continue;
                };
                let Some(decl) = ir.get(*kind, key) else {
                    continue;
                };
                if decl.hidden.may_be_hidden() {
                    continue;
                }
                warnings.push(
                    ValidationWarning::new(
                        "non-hidden-components",
                        severity,
                        format!(
                            "Skill '{skill}' groups {} '{}', which is not hidden and is already listed directly",
                            kind.as_str(),
                            decl.name
                        ),
                    )
                    .suggestion(format!(
                        "Declare `hidden: true` on '{}' or drop it from '{skill}'",
                        decl.name
                    ))
                    .related([skill, decl.name.as_str()]),
                );
            }
        }
        warnings
    }
}

/// A skill with nothing in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySkillsRule;

impl ValidationRule for EmptySkillsRule {
    fn id(&self) -> &'static str {
        "empty-skills"
    }

    fn description(&self) -> &'static str {
        "skills must group at least one capability"
    }

    fn check(
        &self,
        ir: &ParseResult,
        index: &ReferenceIndex,
        severity: Severity,
    ) -> Vec<ValidationWarning> {
        ir.skill_names()
            .filter(|skill| !index.skill_has_members(skill))
            .map(|skill| {
                ValidationWarning::new(
                    "empty-skill",
                    severity,
                    format!("Skill '{skill}' has no components"),
                )
                .suggestion(format!(
                    "List tools, resources or prompts in its `components`, or declare `skill: '{skill}'` on them"
                ))
                .related([skill])
            })
            .collect()
    }
}

/// A component claiming membership in a skill that does not exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrphanedSkillMembershipRule;

impl ValidationRule for OrphanedSkillMembershipRule {
    fn id(&self) -> &'static str {
        "orphaned-skill-membership"
    }

    fn default_level(&self) -> RuleLevel {
        RuleLevel::Error
    }

    fn description(&self) -> &'static str {
        "declared skill memberships must name existing skills"
    }

    fn check(
        &self,
        ir: &ParseResult,
        _index: &ReferenceIndex,
        severity: Severity,
    ) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for kind in COMPONENT_KINDS {
            for decl in ir.of_kind(kind).values() {
                for skill in &decl.skill_membership {
                    if ir.skills.contains_key(skill) {
                        continue;
                    }
                    warnings.push(
                        ValidationWarning::new(
                            "orphaned-skill-membership",
                            severity,
                            format!(
                                "{} '{}' declares membership in unknown skill '{skill}'",
                                label(kind),
                                decl.name
                            ),
                        )
                        .suggestion(format!(
                            "Declare a skill named '{skill}' or fix the name ({})",
                            available_skills(ir)
                        ))
                        .related([decl.name.as_str(), skill.as_str()]),
                    );
                }
            }
        }
        warnings
    }
}

/// The built-in rules, in the order they run.
#[must_use]
pub fn builtin_rules() -> Vec<Box<dyn ValidationRule>> {
    vec![
        Box::new(OrphanedHiddenRule),
        Box::new(InvalidReferencesRule),
        Box::new(NonHiddenComponentsRule),
        Box::new(EmptySkillsRule),
        Box::new(OrphanedSkillMembershipRule),
    ]
}
