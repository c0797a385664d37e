//! Owned syntax tree for the subset of TypeScript the compiler reads.
//!
//! The tree-sitter CST is lowered into these types as soon as a file is
//! parsed. They own their strings, so a compiled program can be shared
//! across threads and outlives the parser.

use std::fmt;
use std::path::PathBuf;

/// A 1-based source position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

/// Built-in type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `string`
    String,
    /// `number`
    Number,
    /// `bigint`
    BigInt,
    /// `boolean`
    Boolean,
    /// `object`
    Object,
    /// `symbol`
    Symbol,
    /// `any`
    Any,
    /// `unknown`
    Unknown,
    /// `never`
    Never,
    /// `void`
    Void,
}

impl Keyword {
    /// Parse a predefined type keyword.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "string" => Self::String,
            "number" => Self::Number,
            "bigint" => Self::BigInt,
            "boolean" => Self::Boolean,
            "object" => Self::Object,
            "symbol" | "unique symbol" => Self::Symbol,
            "any" => Self::Any,
            "unknown" => Self::Unknown,
            "never" => Self::Never,
            "void" => Self::Void,
            _ => return None,
        })
    }

    /// Source spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::BigInt => "bigint",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Symbol => "symbol",
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Never => "never",
            Self::Void => "void",
        }
    }
}

/// A literal type.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `'text'`
    String(String),
    /// `42`, `-1.5`
    Number(f64),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
    /// `undefined`
    Undefined,
}

/// A type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    /// A predefined keyword type.
    Keyword(Keyword),
    /// A literal type.
    Literal(Literal),
    /// A named type, possibly qualified (`ns.Type`) and generic.
    Reference {
        /// The name as written.
        name: String,
        /// Type arguments.
        args: Vec<TypeNode>,
    },
    /// An object type literal.
    Object(ObjectType),
    /// `T[]`
    Array(Box<TypeNode>),
    /// `[A, B?, ...C[]]`
    Tuple(Vec<TupleElement>),
    /// `A | B`, flattened.
    Union(Vec<TypeNode>),
    /// `A & B`, flattened.
    Intersection(Vec<TypeNode>),
    /// A function or constructor type.
    Function,
    /// Anything else, kept as source text.
    Other(String),
}

impl TypeNode {
    /// Shorthand for a non-generic reference.
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// The referenced name, if this is a reference.
    #[must_use]
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            Self::Reference { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The string value, if this is a string literal type.
    #[must_use]
    pub fn as_str_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The numeric value, if this is a numeric literal type.
    #[must_use]
    pub fn as_number_literal(&self) -> Option<f64> {
        match self {
            Self::Literal(Literal::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// The boolean value, if this is `true` or `false`.
    #[must_use]
    pub fn as_bool_literal(&self) -> Option<bool> {
        match self {
            Self::Literal(Literal::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(keyword) => f.write_str(keyword.as_str()),
            Self::Literal(Literal::String(s)) => write!(f, "'{s}'"),
            Self::Literal(Literal::Number(n)) => write!(f, "{n}"),
            Self::Literal(Literal::Bool(b)) => write!(f, "{b}"),
            Self::Literal(Literal::Null) => f.write_str("null"),
            Self::Literal(Literal::Undefined) => f.write_str("undefined"),
            Self::Reference { name, args } if args.is_empty() => f.write_str(name),
            Self::Reference { name, args } => {
                write!(f, "{name}<")?;
                write_joined(f, args, ", ")?;
                f.write_str(">")
            }
            Self::Object(_) => f.write_str("{ ... }"),
            Self::Array(inner) => write!(f, "{inner}[]"),
            Self::Tuple(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if element.rest {
                        f.write_str("...")?;
                    }
                    write!(f, "{}", element.ty)?;
                    if element.optional {
                        f.write_str("?")?;
                    }
                }
                f.write_str("]")
            }
            Self::Union(parts) => write_joined(f, parts, " | "),
            Self::Intersection(parts) => write_joined(f, parts, " & "),
            Self::Function => f.write_str("(...) => unknown"),
            Self::Other(text) => f.write_str(text),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[TypeNode], sep: &str) -> fmt::Result {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{part}")?;
    }
    Ok(())
}

/// One tuple element.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    /// Element type. For rest elements, the array type being spread.
    pub ty: TypeNode,
    /// `T?`
    pub optional: bool,
    /// `...T[]`
    pub rest: bool,
}

impl TupleElement {
    /// A plain required element.
    #[must_use]
    pub fn required(ty: TypeNode) -> Self {
        Self {
            ty,
            optional: false,
            rest: false,
        }
    }
}

/// The members of an object type or interface body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectType {
    /// Named members in source order.
    pub members: Vec<Member>,
    /// Value type of a `[key: string]: T` index signature.
    pub index: Option<Box<TypeNode>>,
}

impl ObjectType {
    /// Look up a member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.name == name)
    }
}

/// A property or method signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Property name (quotes stripped).
    pub name: String,
    /// `name?:`
    pub optional: bool,
    /// `readonly name:`
    pub readonly: bool,
    /// Declared type. Methods are [`TypeNode::Function`]; a missing
    /// annotation is `any`.
    pub ty: TypeNode,
    /// JSDoc attached to the member.
    pub docs: Option<String>,
}

/// An `interface` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    /// Interface name.
    pub name: String,
    /// Type parameter names.
    pub type_params: Vec<String>,
    /// `extends` clauses.
    pub extends: Vec<TypeNode>,
    /// Body.
    pub body: ObjectType,
    /// Declared with `export`.
    pub exported: bool,
    /// JSDoc attached to the declaration.
    pub docs: Option<String>,
    /// Position of the name.
    pub span: Span,
}

/// A `type X = ...` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    /// Alias name.
    pub name: String,
    /// Type parameter names.
    pub type_params: Vec<String>,
    /// Aliased type.
    pub value: TypeNode,
    /// Declared with `export`.
    pub exported: bool,
    /// JSDoc attached to the declaration.
    pub docs: Option<String>,
    /// Position of the name.
    pub span: Span,
}

/// A class member.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    /// Member name (quotes stripped).
    pub name: String,
    /// Declared type annotation of a field.
    pub annotation: Option<TypeNode>,
    /// Declared as a method rather than a field.
    pub is_method: bool,
    /// `static` member.
    pub is_static: bool,
    /// JSDoc attached to the member.
    pub docs: Option<String>,
}

/// A class declaration or class expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Class name; `None` for `export default class { ... }`.
    pub name: Option<String>,
    /// `extends` base, as written.
    pub extends: Option<String>,
    /// `implements` clauses.
    pub implements: Vec<TypeNode>,
    /// Members in source order.
    pub members: Vec<ClassMember>,
    /// Declared with `export`.
    pub exported: bool,
    /// JSDoc attached to the declaration.
    pub docs: Option<String>,
    /// Position of the declaration.
    pub span: Span,
}

impl ClassDecl {
    /// Look up an instance or static member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&ClassMember> {
        self.members.iter().find(|member| member.name == name)
    }
}

/// A member of an object literal expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMember {
    /// Key (quotes stripped).
    pub name: String,
    /// Type named by an `as`/`satisfies` wrapper around the value.
    pub annotation: Option<TypeNode>,
    /// JSDoc attached to the member.
    pub docs: Option<String>,
}

/// A `const`/`let` binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    /// Binding name.
    pub name: String,
    /// Declared type annotation.
    pub annotation: Option<TypeNode>,
    /// Members, when the initializer is an object literal.
    pub object: Option<Vec<ObjectMember>>,
    /// Class name, when the initializer is `new Class(...)`.
    pub instance_of: Option<String>,
    /// Declared with `export`.
    pub exported: bool,
    /// JSDoc attached to the declaration.
    pub docs: Option<String>,
    /// Position of the binding.
    pub span: Span,
}

/// An `enum` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    /// Enum name.
    pub name: String,
    /// Member values. Members without an initializer are numbered.
    pub values: Vec<Literal>,
    /// Declared with `export`.
    pub exported: bool,
}

/// What an import statement binds locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import { imported as local }`
    Named {
        /// Name exported by the target module.
        imported: String,
        /// Local name.
        local: String,
    },
    /// `import local from`
    Default {
        /// Local name.
        local: String,
    },
    /// `import * as local from`
    Namespace {
        /// Local name.
        local: String,
    },
}

/// An import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Module specifier as written.
    pub specifier: String,
    /// Resolved file, or `None` for external packages.
    pub resolved: Option<PathBuf>,
    /// Local bindings.
    pub bindings: Vec<ImportBinding>,
}

/// An export that is not a declaration modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportItem {
    /// `export { local as exported }`
    Local {
        /// Local name.
        local: String,
        /// Exported name.
        exported: String,
    },
    /// `export { imported as exported } from 'specifier'`
    ReExport {
        /// Module specifier as written.
        specifier: String,
        /// Resolved file, or `None` for external packages.
        resolved: Option<PathBuf>,
        /// Name exported by the target module.
        imported: String,
        /// Exported name.
        exported: String,
    },
    /// `export * from 'specifier'`
    ReExportAll {
        /// Module specifier as written.
        specifier: String,
        /// Resolved file, or `None` for external packages.
        resolved: Option<PathBuf>,
    },
}

impl ExportItem {
    /// The module specifier, for re-exports.
    #[must_use]
    pub fn specifier(&self) -> Option<&str> {
        match self {
            Self::Local { .. } => None,
            Self::ReExport { specifier, .. } | Self::ReExportAll { specifier, .. } => {
                Some(specifier)
            }
        }
    }

    pub(crate) fn set_resolved(&mut self, path: Option<PathBuf>) {
        match self {
            Self::Local { .. } => {}
            Self::ReExport { resolved, .. } | Self::ReExportAll { resolved, .. } => {
                *resolved = path;
            }
        }
    }
}

/// The default export of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultExport {
    /// `export default class ...`: index into [`Module::classes`].
    Class(usize),
    /// `export default name;` or `export default new Name()`.
    Name(String),
    /// Any other expression.
    Expression,
}

/// One parsed source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    /// Absolute path.
    pub path: PathBuf,
    /// Import statements in source order.
    pub imports: Vec<Import>,
    /// Export lists and re-exports.
    pub exports: Vec<ExportItem>,
    /// Interfaces in source order. The same name may appear more than once.
    pub interfaces: Vec<InterfaceDecl>,
    /// Type aliases in source order.
    pub aliases: Vec<TypeAliasDecl>,
    /// Classes in source order.
    pub classes: Vec<ClassDecl>,
    /// Top-level `const`/`let` bindings.
    pub consts: Vec<ConstDecl>,
    /// Enums.
    pub enums: Vec<EnumDecl>,
    /// The default export, if any.
    pub default_export: Option<DefaultExport>,
}

impl Module {
    /// Interfaces named `name`, in declaration order (for merging).
    pub fn interfaces_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a InterfaceDecl> {
        self.interfaces.iter().filter(move |decl| decl.name == name)
    }

    /// The type alias named `name`.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&TypeAliasDecl> {
        self.aliases.iter().find(|decl| decl.name == name)
    }

    /// The class named `name`.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes
            .iter()
            .find(|decl| decl.name.as_deref() == Some(name))
    }

    /// The top-level binding named `name`.
    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&ConstDecl> {
        self.consts.iter().find(|decl| decl.name == name)
    }

    /// The enum named `name`.
    #[must_use]
    pub fn enumeration(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.iter().find(|decl| decl.name == name)
    }

    /// Files this module depends on.
    pub fn dependencies(&self) -> impl Iterator<Item = &PathBuf> {
        self.imports
            .iter()
            .filter_map(|import| import.resolved.as_ref())
            .chain(self.exports.iter().filter_map(|export| match export {
                ExportItem::ReExport { resolved, .. } | ExportItem::ReExportAll { resolved, .. } => {
                    resolved.as_ref()
                }
                ExportItem::Local { .. } => None,
            }))
    }
}
