//! Name resolution across a [`CompiledUnit`].
//!
//! The resolver answers three questions for the rest of the compiler:
//! what a type name refers to in a given module, which members a type
//! exposes once heritage is flattened, and which capability interfaces a
//! type explicitly extends.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use indexmap::IndexMap;
use mcpkit_core::types::DeclarationKind;

use crate::program::ast::{
    ClassDecl, ConstDecl, DefaultExport, EnumDecl, ExportItem, ImportBinding, InterfaceDecl,
    Member, Module, ObjectType, TypeAliasDecl, TypeNode,
};
use crate::program::CompiledUnit;

/// What a name refers to.
#[derive(Debug, Clone)]
pub enum Symbol<'u> {
    /// One or more interface declarations with the same name (merged).
    Interface {
        /// Declaring module.
        module: &'u Module,
        /// Interface name.
        name: &'u str,
    },
    /// A type alias.
    Alias {
        /// Declaring module.
        module: &'u Module,
        /// The alias.
        decl: &'u TypeAliasDecl,
    },
    /// A class.
    Class {
        /// Declaring module.
        module: &'u Module,
        /// The class.
        decl: &'u ClassDecl,
    },
    /// An enum.
    Enum {
        /// Declaring module.
        module: &'u Module,
        /// The enum.
        decl: &'u EnumDecl,
    },
    /// A top-level binding.
    Const {
        /// Declaring module.
        module: &'u Module,
        /// The binding.
        decl: &'u ConstDecl,
    },
    /// A name imported from a module that is not loaded.
    External {
        /// Module specifier.
        specifier: String,
        /// Name exported by that module.
        name: String,
    },
}

impl<'u> Symbol<'u> {
    /// The name the symbol was declared (or exported) under.
    #[must_use]
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Self::Interface { name, .. } => Some(name),
            Self::Alias { decl, .. } => Some(&decl.name),
            Self::Class { decl, .. } => decl.name.as_deref(),
            Self::Enum { decl, .. } => Some(&decl.name),
            Self::Const { decl, .. } => Some(&decl.name),
            Self::External { name, .. } => Some(name),
        }
    }

    /// The capability kind this symbol is, by name alone.
    #[must_use]
    pub fn capability_kind(&self) -> Option<DeclarationKind> {
        self.declared_name()
            .and_then(DeclarationKind::from_interface_name)
    }
}

/// A member together with the module its type must be resolved in.
#[derive(Debug, Clone, Copy)]
pub struct MemberRef<'u> {
    /// Module declaring the member.
    pub module: &'u Module,
    /// The member.
    pub member: &'u Member,
}

/// The flattened members of an object-like type.
#[derive(Debug, Clone, Default)]
pub struct Shape<'u> {
    /// Members by name. Inherited members come first; a derived member
    /// replaces a base member of the same name in place.
    pub members: IndexMap<&'u str, MemberRef<'u>>,
    /// Index signature value type and the module it belongs to.
    pub index: Option<(&'u Module, &'u TypeNode)>,
}

impl<'u> Shape<'u> {
    /// Look up a member.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<MemberRef<'u>> {
        self.members.get(name).copied()
    }

    /// Member names in order.
    pub fn names(&self) -> impl Iterator<Item = &'u str> + '_ {
        self.members.keys().copied()
    }

    fn merge(&mut self, other: Shape<'u>) {
        for (name, member) in other.members {
            self.members.insert(name, member);
        }
        if other.index.is_some() {
            self.index = other.index;
        }
    }

    fn add_object(&mut self, module: &'u Module, object: &'u ObjectType) {
        for member in &object.members {
            self.members
                .insert(member.name.as_str(), MemberRef { module, member });
        }
        if let Some(index) = &object.index {
            self.index = Some((module, index));
        }
    }
}

type Guard = HashSet<(PathBuf, String)>;

/// Resolves names and flattens types within one compiled program.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'u> {
    unit: &'u CompiledUnit,
}

impl<'u> TypeResolver<'u> {
    /// Create a resolver over `unit`.
    #[must_use]
    pub fn new(unit: &'u CompiledUnit) -> Self {
        Self { unit }
    }

    /// The program being resolved.
    #[must_use]
    pub fn unit(&self) -> &'u CompiledUnit {
        self.unit
    }

    /// Resolve `name` (possibly `ns.Name`) as seen from `module`.
    #[must_use]
    pub fn resolve(&self, module: &'u Module, name: &str) -> Option<Symbol<'u>> {
        let mut guard = Guard::new();
        if let Some((namespace, rest)) = name.split_once('.') {
            return self.resolve_qualified(module, namespace, rest, &mut guard);
        }
        self.resolve_local(module, name, &mut guard)
    }

    /// Resolve the default export of `module`.
    #[must_use]
    pub fn resolve_default(&self, module: &'u Module) -> Option<Symbol<'u>> {
        self.default_of(module, &mut Guard::new())
    }

    fn resolve_qualified(
        &self,
        module: &'u Module,
        namespace: &str,
        name: &str,
        guard: &mut Guard,
    ) -> Option<Symbol<'u>> {
        for import in &module.imports {
            let binds_namespace = import.bindings.iter().any(
                |binding| matches!(binding, ImportBinding::Namespace { local } if local == namespace),
            );
            if !binds_namespace {
                continue;
            }
            return match &import.resolved {
                Some(path) => {
                    let target = self.unit.module(path)?;
                    match name.split_once('.') {
                        Some((inner, rest)) => self.resolve_qualified(target, inner, rest, guard),
                        None => self.resolve_export(target, name, guard),
                    }
                }
                None => Some(Symbol::External {
                    specifier: import.specifier.clone(),
                    name: name.to_string(),
                }),
            };
        }
        None
    }

    fn resolve_local(&self, module: &'u Module, name: &str, guard: &mut Guard) -> Option<Symbol<'u>> {
        if let Some(decl) = module.interfaces_named(name).next() {
            return Some(Symbol::Interface {
                module,
                name: &decl.name,
            });
        }
        if let Some(decl) = module.alias(name) {
            return Some(Symbol::Alias { module, decl });
        }
        if let Some(decl) = module.class(name) {
            return Some(Symbol::Class { module, decl });
        }
        if let Some(decl) = module.enumeration(name) {
            return Some(Symbol::Enum { module, decl });
        }
        if let Some(decl) = module.constant(name) {
            return Some(Symbol::Const { module, decl });
        }

        for import in &module.imports {
            for binding in &import.bindings {
                let (imported, local) = match binding {
                    ImportBinding::Named { imported, local } => (imported.as_str(), local),
                    ImportBinding::Default { local } => ("default", local),
                    ImportBinding::Namespace { .. } => continue,
                };
                if local != name {
                    continue;
                }
                return match &import.resolved {
                    Some(path) => {
                        let target = self.unit.module(path)?;
                        self.resolve_export(target, imported, guard)
                    }
                    None => Some(Symbol::External {
                        specifier: import.specifier.clone(),
                        name: imported.to_string(),
                    }),
                };
            }
        }

        None
    }

    fn resolve_export(&self, module: &'u Module, name: &str, guard: &mut Guard) -> Option<Symbol<'u>> {
        if !guard.insert((module.path.clone(), name.to_string())) {
            return None;
        }

        if name == "default" {
            return self.default_of(module, guard);
        }

        if module.interfaces_named(name).any(|decl| decl.exported) {
            return self.resolve_local(module, name, guard);
        }
        let exported_decl = module.alias(name).is_some_and(|d| d.exported)
            || module.class(name).is_some_and(|d| d.exported)
            || module.enumeration(name).is_some_and(|d| d.exported)
            || module.constant(name).is_some_and(|d| d.exported);
        if exported_decl {
            return self.resolve_local(module, name, guard);
        }

        for export in &module.exports {
            match export {
                ExportItem::Local { local, exported } if exported == name => {
                    return self.resolve_local(module, local, guard);
                }
                ExportItem::ReExport {
                    specifier,
                    resolved,
                    imported,
                    exported,
                } if exported == name => {
                    return match resolved {
                        Some(path) => {
                            let target = self.unit.module(path)?;
                            self.resolve_export(target, imported, guard)
                        }
                        None => Some(Symbol::External {
                            specifier: specifier.clone(),
                            name: imported.clone(),
                        }),
                    };
                }
                _ => {}
            }
        }

        module.exports.iter().find_map(|export| match export {
            ExportItem::ReExportAll {
                resolved: Some(path),
                ..
            } => self
                .unit
                .module(path)
                .and_then(|target| self.resolve_export(target, name, guard)),
            _ => None,
        })
    }

    fn default_of(&self, module: &'u Module, guard: &mut Guard) -> Option<Symbol<'u>> {
        match module.default_export.as_ref()? {
            DefaultExport::Class(index) => module
                .classes
                .get(*index)
                .map(|decl| Symbol::Class { module, decl }),
            DefaultExport::Name(name) => self.resolve_local(module, name, guard),
            DefaultExport::Expression => None,
        }
    }

    /// Flatten the members of `ty` as seen from `module`.
    ///
    /// Returns `None` when `ty` is not object-like (a primitive, an
    /// external type, a generic alias).
    #[must_use]
    pub fn shape_of(&self, module: &'u Module, ty: &'u TypeNode) -> Option<Shape<'u>> {
        self.shape_guarded(module, ty, &mut Guard::new())
    }

    /// Flatten the members of an interface, including inherited ones.
    #[must_use]
    pub fn interface_shape(&self, module: &'u Module, name: &'u str) -> Shape<'u> {
        self.interface_guarded(module, name, &mut Guard::new())
    }

    /// Flatten the members of the symbol `ty` refers to, if object-like.
    #[must_use]
    pub fn symbol_shape(&self, symbol: &Symbol<'u>) -> Option<Shape<'u>> {
        let mut guard = Guard::new();
        match symbol {
            Symbol::Interface { module, name } => {
                Some(self.interface_guarded(module, name, &mut guard))
            }
            Symbol::Alias { module, decl } if decl.type_params.is_empty() => {
                self.alias_guarded(module, decl, &mut guard)
            }
            _ => None,
        }
    }

    fn interface_guarded(&self, module: &'u Module, name: &'u str, guard: &mut Guard) -> Shape<'u> {
        let mut shape = Shape::default();
        if !guard.insert((module.path.clone(), name.to_string())) {
            return shape;
        }

        let decls: Vec<&'u InterfaceDecl> = module.interfaces_named(name).collect();
        for decl in decls.iter().copied() {
            for base in &decl.extends {
                if let Some(inherited) = self.shape_guarded(module, base, guard) {
                    shape.merge(inherited);
                }
            }
        }
        for decl in decls {
            shape.add_object(module, &decl.body);
        }

        guard.remove(&(module.path.clone(), name.to_string()));
        shape
    }

    fn alias_guarded(
        &self,
        module: &'u Module,
        decl: &'u TypeAliasDecl,
        guard: &mut Guard,
    ) -> Option<Shape<'u>> {
        let key = (module.path.clone(), decl.name.clone());
        if !guard.insert(key.clone()) {
            return None;
        }
        let shape = self.shape_guarded(module, &decl.value, guard);
        guard.remove(&key);
        shape
    }

    fn shape_guarded(&self, module: &'u Module, ty: &'u TypeNode, guard: &mut Guard) -> Option<Shape<'u>> {
        match ty {
            TypeNode::Object(object) => {
                let mut shape = Shape::default();
                shape.add_object(module, object);
                Some(shape)
            }
            TypeNode::Reference { name, args } => {
                match self.resolve(module, name)? {
                    Symbol::Interface {
                        module: target,
                        name,
                    } => {
                        let generic = target
                            .interfaces_named(name)
                            .any(|decl| !decl.type_params.is_empty());
                        if generic && !args.is_empty() {
                            return None;
                        }
                        Some(self.interface_guarded(target, name, guard))
                    }
                    Symbol::Alias {
                        module: target,
                        decl,
                    } if decl.type_params.is_empty() => self.alias_guarded(target, decl, guard),
                    _ => None,
                }
            }
            TypeNode::Intersection(parts) => {
                let mut shape = Shape::default();
                let mut any = false;
                for part in parts {
                    if let Some(inner) = self.shape_guarded(module, part, guard) {
                        shape.merge(inner);
                        any = true;
                    }
                }
                any.then_some(shape)
            }
            _ => None,
        }
    }

    /// Capability kinds `ty` names directly or reaches through heritage.
    #[must_use]
    pub fn heritage_kinds(&self, module: &'u Module, ty: &'u TypeNode) -> BTreeSet<DeclarationKind> {
        let mut kinds = BTreeSet::new();
        self.walk_heritage(module, ty, &mut Guard::new(), &mut kinds);
        kinds
    }

    /// Capability kinds an interface explicitly extends.
    #[must_use]
    pub fn interface_heritage_kinds(&self, module: &'u Module, name: &'u str) -> BTreeSet<DeclarationKind> {
        let mut kinds = BTreeSet::new();
        let mut guard = Guard::new();
        guard.insert((module.path.clone(), name.to_string()));
        for decl in module.interfaces_named(name) {
            for base in &decl.extends {
                self.walk_heritage(module, base, &mut guard, &mut kinds);
            }
        }
        kinds
    }

    /// Capability kinds an alias's value names at its top level.
    #[must_use]
    pub fn alias_heritage_kinds(&self, module: &'u Module, decl: &'u TypeAliasDecl) -> BTreeSet<DeclarationKind> {
        let mut kinds = BTreeSet::new();
        let mut guard = Guard::new();
        guard.insert((module.path.clone(), decl.name.clone()));
        self.walk_heritage(module, &decl.value, &mut guard, &mut kinds);
        kinds
    }

    fn walk_heritage(
        &self,
        module: &'u Module,
        ty: &'u TypeNode,
        guard: &mut Guard,
        kinds: &mut BTreeSet<DeclarationKind>,
    ) {
        match ty {
            TypeNode::Reference { name, .. } => {
                let simple = name.rsplit('.').next().unwrap_or(name);
                if let Some(kind) = DeclarationKind::from_interface_name(simple) {
                    kinds.insert(kind);
                    return;
                }
                let Some(symbol) = self.resolve(module, name) else {
                    return;
                };
                if let Some(kind) = symbol.capability_kind() {
                    kinds.insert(kind);
                    return;
                }
                match symbol {
                    Symbol::Interface {
                        module: target,
                        name,
                    } => {
                        if !guard.insert((target.path.clone(), name.to_string())) {
                            return;
                        }
                        for decl in target.interfaces_named(name) {
                            for base in &decl.extends {
                                self.walk_heritage(target, base, guard, kinds);
                            }
                        }
                    }
                    Symbol::Alias {
                        module: target,
                        decl,
                    } => {
                        if guard.insert((target.path.clone(), decl.name.clone())) {
                            self.walk_heritage(target, &decl.value, guard, kinds);
                        }
                    }
                    _ => {}
                }
            }
            TypeNode::Intersection(parts) => {
                for part in parts {
                    self.walk_heritage(module, part, guard, kinds);
                }
            }
            _ => {}
        }
    }

    /// Names of user types that `ty` inherits from, directly or through
    /// aliases and intersections. Capability interfaces are not included.
    #[must_use]
    pub fn heritage_bases(&self, module: &'u Module, ty: &'u TypeNode) -> Vec<(PathBuf, String)> {
        let mut out = Vec::new();
        let mut stack = vec![(module, ty)];
        while let Some((module, ty)) = stack.pop() {
            match ty {
                TypeNode::Reference { name, .. } => match self.resolve(module, name) {
                    Some(Symbol::Interface { module: target, name }) => {
                        out.push((target.path.clone(), name.to_string()));
                    }
                    Some(Symbol::Alias { module: target, decl }) => {
                        out.push((target.path.clone(), decl.name.clone()));
                    }
                    _ => {}
                },
                TypeNode::Intersection(parts) => {
                    stack.extend(parts.iter().map(|part| (module, part)));
                }
                _ => {}
            }
        }
        out
    }
}
