//! The implementation host and binding lookup.
//!
//! The host is the class or object the entry module exports; its members
//! implement the declared capabilities.

use mcpkit_core::naming::variants_of;

use crate::checker::{Symbol, TypeResolver};
use crate::program::ast::{ClassDecl, ConstDecl, Module, TypeNode};

/// A host member that may implement a declaration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HostMember<'u> {
    pub name: &'u str,
    pub annotation: Option<&'u TypeNode>,
    pub docs: Option<&'u str>,
}

/// The exported implementation object.
#[derive(Debug, Clone)]
pub(crate) struct Host<'u> {
    pub module: &'u Module,
    pub name: Option<&'u str>,
    pub docs: Option<&'u str>,
    pub implements: &'u [TypeNode],
    pub members: Vec<HostMember<'u>>,
}

impl<'u> Host<'u> {
    fn from_class(module: &'u Module, decl: &'u ClassDecl) -> Self {
        let members = decl
            .members
            .iter()
            .filter(|member| !member.is_static && member.name != "constructor")
            .map(|member| HostMember {
                name: &member.name,
                annotation: member.annotation.as_ref(),
                docs: member.docs.as_deref(),
            })
            .collect();
        Self {
            module,
            name: decl.name.as_deref(),
            docs: decl.docs.as_deref(),
            implements: &decl.implements,
            members,
        }
    }

    fn from_const(module: &'u Module, decl: &'u ConstDecl) -> Option<Self> {
        let object = decl.object.as_ref()?;
        let members = object
            .iter()
            .map(|member| HostMember {
                name: &member.name,
                annotation: member.annotation.as_ref(),
                docs: member.docs.as_deref(),
            })
            .collect();
        Some(Self {
            module,
            name: Some(&decl.name),
            docs: decl.docs.as_deref(),
            implements: decl.annotation.as_slice(),
            members,
        })
    }

    fn from_symbol(resolver: &TypeResolver<'u>, symbol: Symbol<'u>) -> Option<Self> {
        match symbol {
            Symbol::Class { module, decl } => Some(Self::from_class(module, decl)),
            Symbol::Const { module, decl } => match &decl.instance_of {
                Some(class) => match resolver.resolve(module, class)? {
                    Symbol::Class { module, decl } => Some(Self::from_class(module, decl)),
                    _ => None,
                },
                None => Self::from_const(module, decl),
            },
            _ => None,
        }
    }

    /// Locate the host of `entry`: its default export, else the first
    /// exported class, else the first exported object constant.
    pub fn find(resolver: &TypeResolver<'u>, entry: &'u Module) -> Option<Self> {
        if let Some(host) = resolver
            .resolve_default(entry)
            .and_then(|symbol| Self::from_symbol(resolver, symbol))
        {
            return Some(host);
        }
        if let Some(class) = entry.classes.iter().find(|class| class.exported) {
            return Some(Self::from_class(entry, class));
        }
        entry
            .consts
            .iter()
            .filter(|decl| decl.exported)
            .find_map(|decl| Self::from_const(entry, decl))
    }

    /// Whether `ty` refers to the type named `interface_name`.
    fn names_type(
        &self,
        resolver: &TypeResolver<'u>,
        ty: &TypeNode,
        interface_name: &str,
    ) -> bool {
        let Some(name) = ty.reference_name() else {
            return false;
        };
        if name.rsplit('.').next() == Some(interface_name) {
            return true;
        }
        resolver
            .resolve(self.module, name)
            .is_some_and(|symbol| symbol.declared_name() == Some(interface_name))
    }

    /// Find the member implementing a declaration.
    ///
    /// Tried in order: a member annotated with the declaration's type, a
    /// member named by a naming variant of `name`, a member named by `uri`.
    pub fn bind(
        &self,
        resolver: &TypeResolver<'u>,
        interface_name: &str,
        name: &str,
        uri: Option<&str>,
    ) -> Option<HostMember<'u>> {
        if let Some(member) = self.members.iter().find(|member| {
            member
                .annotation
                .is_some_and(|ty| self.names_type(resolver, ty, interface_name))
        }) {
            return Some(*member);
        }

        for variant in variants_of(name) {
            if let Some(member) = self.members.iter().find(|member| member.name == variant) {
                return Some(*member);
            }
        }

        let uri = uri?;
        self.members.iter().find(|member| member.name == uri).copied()
    }

    /// Whether the host declares that it implements `interface_name`.
    pub fn implements(&self, resolver: &TypeResolver<'u>, interface_name: &str) -> bool {
        self.implements
            .iter()
            .any(|ty| self.names_type(resolver, ty, interface_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{CompiledUnit, ProgramBuilder};

    fn unit(source: &str) -> CompiledUnit {
        ProgramBuilder::new()
            .build_source("/virtual/server.ts", source)
            .expect("valid program")
    }

    #[test]
    fn test_default_class_host_and_bindings() {
        let unit = unit(
            r"
            interface GetWeatherTool extends ITool { name: 'get_weather' }
            export default class Weather {
              forecast: GetWeatherTool = async () => ({});
              getWeather = async () => ({});
              'config://app' = async () => ({});
              static helper() {}
            }
            ",
        );
        let resolver = TypeResolver::new(&unit);
        let host = Host::find(&resolver, unit.entry()).expect("host");
        assert_eq!(host.name, Some("Weather"));
        assert_eq!(host.members.len(), 3);

        let by_annotation = host.bind(&resolver, "GetWeatherTool", "get_weather", None);
        assert_eq!(by_annotation.map(|m| m.name), Some("forecast"));

        let by_name = host.bind(&resolver, "OtherTool", "get_weather", None);
        assert_eq!(by_name.map(|m| m.name), Some("getWeather"));

        let by_uri = host.bind(&resolver, "ConfigResource", "config", Some("config://app"));
        assert_eq!(by_uri.map(|m| m.name), Some("config://app"));

        assert!(host.bind(&resolver, "MissingTool", "missing", None).is_none());
    }

    #[test]
    fn test_exported_object_host() {
        let unit = unit("export const server = { getWeather: async () => ({}) };");
        let resolver = TypeResolver::new(&unit);
        let host = Host::find(&resolver, unit.entry()).expect("host");
        assert_eq!(host.name, Some("server"));
        assert_eq!(host.members[0].name, "getWeather");
    }

    #[test]
    fn test_no_host() {
        let unit = unit("interface PingTool extends ITool { name: 'ping' }");
        let resolver = TypeResolver::new(&unit);
        assert!(Host::find(&resolver, unit.entry()).is_none());
    }
}
