//! Interface Shape Matcher.
//!
//! Decides which capability kind a declared type represents. Two checks
//! run independently and are unioned: explicit heritage (the type extends
//! `ITool`, `IResource`, ... directly or through other types) and
//! structural matching against a registry of required member names.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use mcpkit_core::types::DeclarationKind;
use mcpkit_core::validation::{Severity, ValidationWarning};

use crate::checker::{Shape, TypeResolver};
use crate::program::ast::{Module, Span, TypeAliasDecl, TypeNode};

/// Rule id of the diagnostic emitted for ambiguous structural matches.
pub const AMBIGUOUS_SHAPE: &str = "ambiguous-shape";

/// The members a kind requires for a structural match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityShape {
    /// The kind.
    pub kind: DeclarationKind,
    /// Required member names.
    pub required: Vec<&'static str>,
}

/// Kind → required member set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeRegistry {
    shapes: Vec<CapabilityShape>,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ShapeRegistry {
    /// The built-in capability shapes.
    #[must_use]
    pub fn builtin() -> Self {
        let shape = |kind, required: &[&'static str]| CapabilityShape {
            kind,
            required: required.to_vec(),
        };
        Self {
            shapes: vec![
                shape(DeclarationKind::Tool, &["name", "description", "params"]),
                shape(
                    DeclarationKind::Resource,
                    &["uri", "name", "description", "mimeType"],
                ),
                shape(DeclarationKind::Prompt, &["name", "description", "args"]),
                shape(DeclarationKind::Router, &["name", "description", "tools"]),
                shape(DeclarationKind::Skill, &["name", "description", "components"]),
                shape(
                    DeclarationKind::Subscription,
                    &["uri", "description", "subscribe"],
                ),
                shape(DeclarationKind::Completion, &["name", "description", "ref"]),
                shape(DeclarationKind::ServerMeta, &["name", "version"]),
            ],
        }
    }

    /// Replace the required member set of `kind`.
    #[must_use]
    pub fn with_shape(mut self, kind: DeclarationKind, required: &[&'static str]) -> Self {
        self.shapes.retain(|shape| shape.kind != kind);
        self.shapes.push(CapabilityShape {
            kind,
            required: required.to_vec(),
        });
        self
    }

    /// Required members of `kind`.
    #[must_use]
    pub fn required(&self, kind: DeclarationKind) -> &[&'static str] {
        self.shapes
            .iter()
            .find(|shape| shape.kind == kind)
            .map(|shape| shape.required.as_slice())
            .unwrap_or_default()
    }

    /// Kinds whose required members are all present in `members`.
    #[must_use]
    pub fn structural_matches(&self, members: &HashSet<&str>) -> BTreeSet<DeclarationKind> {
        self.shapes
            .iter()
            .filter(|shape| shape.required.iter().all(|name| members.contains(name)))
            .map(|shape| shape.kind)
            .collect()
    }

    fn is_strict_superset(&self, wider: DeclarationKind, narrower: DeclarationKind) -> bool {
        let wide = self.required(wider);
        let narrow = self.required(narrower);
        wide.len() > narrow.len() && narrow.iter().all(|name| wide.contains(name))
    }
}

/// Result of classifying one type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Kinds reached through explicit heritage or the type's own name.
    pub explicit: BTreeSet<DeclarationKind>,
    /// Kinds whose required members the type exposes.
    pub structural: BTreeSet<DeclarationKind>,
}

/// What to do with a classified type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Extract as this kind.
    Matched(DeclarationKind),
    /// Not a capability.
    Unmatched,
    /// Matches several incompatible kinds.
    Ambiguous(Vec<DeclarationKind>),
}

impl Classification {
    /// Every kind matched by either check.
    #[must_use]
    pub fn kinds(&self) -> BTreeSet<DeclarationKind> {
        self.explicit.union(&self.structural).copied().collect()
    }

    /// Pick a single kind.
    ///
    /// An explicit match wins over structural ones. Among structural
    /// matches, a kind whose required set strictly contains another's is
    /// the more specific one.
    #[must_use]
    pub fn decide(&self, registry: &ShapeRegistry) -> Decision {
        if self.explicit.len() > 1 {
            return Decision::Ambiguous(self.explicit.iter().copied().collect());
        }
        if let Some(kind) = self.explicit.first() {
            return Decision::Matched(*kind);
        }

        let specific: Vec<_> = self
            .structural
            .iter()
            .copied()
            .filter(|kind| {
                !self
                    .structural
                    .iter()
                    .any(|other| registry.is_strict_superset(*other, *kind))
            })
            .collect();

        match specific.as_slice() {
            [] => Decision::Unmatched,
            [kind] => Decision::Matched(*kind),
            _ => Decision::Ambiguous(specific),
        }
    }
}

/// How a candidate type is declared.
#[derive(Debug, Clone, Copy)]
pub enum CandidateOrigin<'u> {
    /// An interface (possibly merged from several declarations).
    Interface,
    /// A type alias.
    Alias(&'u TypeAliasDecl),
}

/// A named type that may declare a capability.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'u> {
    /// Declaring module.
    pub module: &'u Module,
    /// Type name.
    pub name: &'u str,
    /// Interface or alias.
    pub origin: CandidateOrigin<'u>,
    /// JSDoc on the (first) declaration.
    pub docs: Option<&'u str>,
    /// Position of the name.
    pub span: Span,
}

impl<'u> Candidate<'u> {
    /// Cache key: declaring file and name.
    #[must_use]
    pub fn key(&self) -> (PathBuf, String) {
        (self.module.path.clone(), self.name.to_string())
    }

    /// Flattened members.
    #[must_use]
    pub fn shape(&self, resolver: &TypeResolver<'u>) -> Shape<'u> {
        match self.origin {
            CandidateOrigin::Interface => resolver.interface_shape(self.module, self.name),
            CandidateOrigin::Alias(decl) => resolver
                .shape_of(self.module, &decl.value)
                .unwrap_or_default(),
        }
    }

    /// User types this candidate inherits from.
    #[must_use]
    pub fn bases(&self, resolver: &TypeResolver<'u>) -> Vec<(PathBuf, String)> {
        match self.origin {
            CandidateOrigin::Interface => self
                .module
                .interfaces_named(self.name)
                .flat_map(|decl| decl.extends.iter())
                .flat_map(|base| resolver.heritage_bases(self.module, base))
                .collect(),
            CandidateOrigin::Alias(decl) => resolver.heritage_bases(self.module, &decl.value),
        }
    }
}

/// Collect candidate types from every loaded module, entry first.
///
/// Capability interfaces themselves, generic types, and types that only
/// serve as a base for another candidate are left out.
#[must_use]
pub fn collect_candidates<'u>(resolver: &TypeResolver<'u>) -> Vec<Candidate<'u>> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for module in resolver.unit().modules() {
        for decl in &module.interfaces {
            if !seen.insert((module.path.clone(), decl.name.clone())) {
                continue;
            }
            let generic = module
                .interfaces_named(&decl.name)
                .any(|d| !d.type_params.is_empty());
            if generic || DeclarationKind::from_interface_name(&decl.name).is_some() {
                continue;
            }
            candidates.push(Candidate {
                module,
                name: &decl.name,
                origin: CandidateOrigin::Interface,
                docs: decl.docs.as_deref(),
                span: decl.span,
            });
        }

        for decl in &module.aliases {
            let object_like = matches!(
                decl.value,
                TypeNode::Object(_) | TypeNode::Intersection(_) | TypeNode::Reference { .. }
            );
            if !object_like
                || !decl.type_params.is_empty()
                || DeclarationKind::from_interface_name(&decl.name).is_some()
                || !seen.insert((module.path.clone(), decl.name.clone()))
            {
                continue;
            }
            candidates.push(Candidate {
                module,
                name: &decl.name,
                origin: CandidateOrigin::Alias(decl),
                docs: decl.docs.as_deref(),
                span: decl.span,
            });
        }
    }

    let bases: HashSet<_> = candidates
        .iter()
        .flat_map(|candidate| candidate.bases(resolver))
        .collect();
    candidates.retain(|candidate| !bases.contains(&candidate.key()));
    candidates
}

/// Classifies candidates against a [`ShapeRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct ShapeMatcher<'a, 'u> {
    resolver: TypeResolver<'u>,
    registry: &'a ShapeRegistry,
}

impl<'a, 'u> ShapeMatcher<'a, 'u> {
    /// Create a matcher.
    #[must_use]
    pub fn new(resolver: TypeResolver<'u>, registry: &'a ShapeRegistry) -> Self {
        Self { resolver, registry }
    }

    /// The registry in use.
    #[must_use]
    pub fn registry(&self) -> &'a ShapeRegistry {
        self.registry
    }

    /// Classify a candidate.
    #[must_use]
    pub fn classify(&self, candidate: &Candidate<'u>) -> Classification {
        let mut explicit = match candidate.origin {
            CandidateOrigin::Interface => self
                .resolver
                .interface_heritage_kinds(candidate.module, candidate.name),
            CandidateOrigin::Alias(decl) => {
                self.resolver.alias_heritage_kinds(candidate.module, decl)
            }
        };
        if let Some(kind) = DeclarationKind::from_interface_name(candidate.name) {
            explicit.insert(kind);
        }

        let shape = candidate.shape(&self.resolver);
        let members: HashSet<&str> = shape.names().collect();
        let structural = self.registry.structural_matches(&members);

        let classification = Classification {
            explicit,
            structural,
        };
        tracing::trace!(
            name = candidate.name,
            explicit = ?classification.explicit,
            structural = ?classification.structural,
            "classified"
        );
        classification
    }

    /// Classify and decide, turning ambiguity into a diagnostic.
    pub fn decide(
        &self,
        candidate: &Candidate<'u>,
        diagnostics: &mut Vec<ValidationWarning>,
    ) -> Option<DeclarationKind> {
        match self.classify(candidate).decide(self.registry) {
            Decision::Matched(kind) => Some(kind),
            Decision::Unmatched => None,
            Decision::Ambiguous(kinds) => {
                let labels: Vec<String> = kinds.iter().map(ToString::to_string).collect();
                tracing::warn!(name = candidate.name, kinds = ?labels, "ambiguous capability shape");
                diagnostics.push(
                    ValidationWarning::new(
                        AMBIGUOUS_SHAPE,
                        Severity::Warn,
                        format!(
                            "Type '{}' matches several capability shapes ({}); it was skipped",
                            candidate.name,
                            labels.join(", ")
                        ),
                    )
                    .suggestion(format!(
                        "Extend one of {} explicitly",
                        kinds
                            .iter()
                            .map(|kind| kind.interface_name())
                            .collect::<Vec<_>>()
                            .join(" or ")
                    ))
                    .related(
                        std::iter::once(candidate.name.to_string()).chain(labels),
                    ),
                );
                None
            }
        }
    }
}
