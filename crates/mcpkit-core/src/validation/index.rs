//! Bidirectional skill/component reference index.
//!
//! Built once per validation pass so rules can ask "which skills reference
//! this tool?" and "what does this skill reference?" without re-scanning
//! the IR.

use std::collections::HashMap;

use crate::ir::ParseResult;
use crate::types::{ComponentRef, DeclarationKind};

/// A skill component after resolution against the IR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedComponent {
    /// The reference as written in the skill.
    pub reference: ComponentRef,
    /// Kind and IR key of the matched declaration, if any.
    pub target: Option<(DeclarationKind, String)>,
}

impl ResolvedComponent {
    /// Whether the reference names an existing declaration.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

/// Precomputed references between skills and their components.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    components: HashMap<String, Vec<ResolvedComponent>>,
    owners: HashMap<(DeclarationKind, String), Vec<String>>,
}

impl ReferenceIndex {
    /// Index every skill in `ir`.
    ///
    /// A component is owned by a skill when the skill lists it, or when the
    /// component declares membership in a skill that exists.
    #[must_use]
    pub fn build(ir: &ParseResult) -> Self {
        let mut index = Self::default();

        for (skill_name, skill) in &ir.skills {
            let mut resolved = Vec::new();
            if let Some(detail) = skill.as_skill() {
                for reference in &detail.components {
                    let target = resolve(ir, reference);
                    if let Some(key) = &target {
                        index.add_owner(key.clone(), skill_name);
                    }
                    resolved.push(ResolvedComponent {
                        reference: reference.clone(),
                        target,
                    });
                }
            }
            index.components.insert(skill_name.clone(), resolved);
        }

        for kind in [
            DeclarationKind::Tool,
            DeclarationKind::Resource,
            DeclarationKind::Prompt,
        ] {
            for (key, decl) in ir.of_kind(kind) {
                for skill in &decl.skill_membership {
                    if ir.skills.contains_key(skill) {
                        index.add_owner((kind, key.clone()), skill);
                    }
                }
            }
        }

        index
    }

    fn add_owner(&mut self, component: (DeclarationKind, String), skill: &str) {
        let owners = self.owners.entry(component).or_default();
        if !owners.iter().any(|s| s == skill) {
            owners.push(skill.to_string());
        }
    }

    /// Skills that reference the component stored under `kind`/`key`.
    #[must_use]
    pub fn skills_referencing(&self, kind: DeclarationKind, key: &str) -> &[String] {
        self.owners
            .get(&(kind, key.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The components a skill lists, resolved.
    #[must_use]
    pub fn components_of(&self, skill: &str) -> &[ResolvedComponent] {
        self.components.get(skill).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether anything references `skill`, through its own list or
    /// through membership declarations.
    #[must_use]
    pub fn skill_has_members(&self, skill: &str) -> bool {
        !self.components_of(skill).is_empty()
            || self.owners.values().any(|owners| owners.iter().any(|s| s == skill))
    }
}

/// Resolve a component reference. Unscoped names are tried against tools,
/// then resources (by URI, then by name), then prompts.
fn resolve(ir: &ParseResult, reference: &ComponentRef) -> Option<(DeclarationKind, String)> {
    let kinds = match reference.kind {
        Some(kind) => vec![kind],
        None => vec![
            DeclarationKind::Tool,
            DeclarationKind::Resource,
            DeclarationKind::Prompt,
        ],
    };

    kinds.into_iter().find_map(|kind| {
        let map = ir.of_kind(kind);
        if map.contains_key(&reference.name) {
            return Some((kind, reference.name.clone()));
        }
        if kind == DeclarationKind::Resource {
            return map
                .iter()
                .find(|(_, decl)| decl.name == reference.name)
                .map(|(uri, _)| (kind, uri.clone()));
        }
        None
    })
}
