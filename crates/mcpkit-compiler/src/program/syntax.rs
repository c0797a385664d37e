//! tree-sitter TypeScript frontend.
//!
//! Parses one file and lowers the concrete syntax tree into the owned
//! [`ast`](super::ast) types. Only declarations the compiler reads are
//! lowered; statements and expressions are skipped.

use std::cell::RefCell;
use std::path::Path;

use mcpkit_core::error::CompileError;
use tree_sitter::{Node, Parser, Tree};

use super::ast::{
    ClassDecl, ClassMember, ConstDecl, DefaultExport, EnumDecl, ExportItem, Import,
    ImportBinding, InterfaceDecl, Keyword, Literal, Member, Module, ObjectMember, ObjectType,
    Span, TupleElement, TypeAliasDecl, TypeNode,
};

thread_local! {
    static TS_PARSER: RefCell<Result<Parser, String>> = RefCell::new({
        let mut parser = Parser::new();
        match parser.set_language(tree_sitter_typescript::language_typescript()) {
            Ok(()) => Ok(parser),
            Err(err) => Err(format!("tree-sitter-typescript language load failed: {err}")),
        }
    });
}

/// Parse TypeScript source text.
fn parse_tree(source: &str) -> Result<Tree, CompileError> {
    TS_PARSER.with(|parser_cell| {
        let mut parser = parser_cell
            .try_borrow_mut()
            .map_err(|_| CompileError::ParserInit {
                message: "tree-sitter parser is already in use".to_string(),
            })?;
        let parser = match parser.as_mut() {
            Ok(parser) => parser,
            Err(err) => {
                return Err(CompileError::ParserInit {
                    message: err.clone(),
                });
            }
        };

        parser.parse(source, None).ok_or_else(|| CompileError::ParserInit {
            message: "tree-sitter failed to produce a syntax tree".to_string(),
        })
    })
}

/// Parse and lower one file.
///
/// Import and re-export specifiers are left unresolved; the program
/// builder fills them in.
pub fn parse_module(path: &Path, source: &str) -> Result<Module, CompileError> {
    let tree = parse_tree(source)?;
    let root = tree.root_node();

    if root.has_error() {
        if let Some(node) = first_error(root) {
            let pos = node.start_position();
            let snippet = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                truncate(node_text(source, node), 40)
            };
            return Err(CompileError::Syntax {
                path: path.to_path_buf(),
                line: pos.row as u32 + 1,
                column: pos.column as u32 + 1,
                snippet,
            });
        }
    }

    let mut lowerer = Lowerer {
        source,
        module: Module {
            path: path.to_path_buf(),
            ..Module::default()
        },
    };
    for child in named_children(root) {
        lowerer.statement(child, false, None);
    }
    Ok(lowerer.module)
}

// ============================================================================
// Node helpers
// ============================================================================

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children = node.named_children(&mut cursor).collect();
    children
}

fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect();
    children
}

fn find_named_child<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    named_children(node).into_iter().find(|child| child.kind() == kind)
}

fn first_named_child(node: Node<'_>) -> Option<Node<'_>> {
    named_children(node)
        .into_iter()
        .find(|child| child.kind() != "comment")
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    children(node)
        .iter()
        .any(|child| !child.is_named() && child.kind() == token)
}

fn node_text<'a>(source: &'a str, node: Node<'_>) -> &'a str {
    &source[node.byte_range()]
}

fn span_of(node: Node<'_>) -> Span {
    let pos = node.start_position();
    Span {
        line: pos.row as u32 + 1,
        column: pos.column as u32 + 1,
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    children(node).into_iter().find_map(first_error)
}

fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let mut out: String = line.chars().take(max).collect();
        out.push_str("...");
        out
    }
}

/// The JSDoc block directly preceding `node`, cleaned of comment markers.
fn docs_before(source: &str, node: Node<'_>) -> Option<String> {
    let prev = node.prev_sibling()?;
    if prev.kind() != "comment" {
        return None;
    }
    let text = node_text(source, prev);
    text.starts_with("/**").then(|| clean_jsdoc(text))
}

/// Strip `/**`, `*/` and leading `*` gutters from a JSDoc block.
pub(crate) fn clean_jsdoc(text: &str) -> String {
    let body = text
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");
    body.lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Strip quotes from a string literal and process escapes.
pub(crate) fn unquote(text: &str) -> String {
    let mut chars = text.chars();
    let quote = chars.next();
    let inner = match quote {
        Some('\'' | '"' | '`') if text.len() >= 2 && text.ends_with(quote.unwrap_or('\'')) => {
            &text[1..text.len() - 1]
        }
        _ => text,
    };

    let mut out = String::with_capacity(inner.len());
    let mut iter = inner.chars().peekable();
    while let Some(c) = iter.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match iter.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let hex: String = iter.by_ref().take(2).collect();
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            Some('u') => {
                let hex: String = if iter.peek() == Some(&'{') {
                    iter.next();
                    iter.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    iter.by_ref().take(4).collect()
                };
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            // Line continuation.
            Some('\n') => {}
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Parse a numeric literal (decimal, hex, octal, binary, separators).
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_end_matches('n')
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let lower = cleaned.to_ascii_lowercase();
    let radix = |prefix: &str, radix: u32| {
        lower
            .strip_prefix(prefix)
            .and_then(|digits| i64::from_str_radix(digits, radix).ok())
            .map(|n| n as f64)
    };
    radix("0x", 16)
        .or_else(|| radix("0o", 8))
        .or_else(|| radix("0b", 2))
        .or_else(|| cleaned.parse::<f64>().ok())
}

// ============================================================================
// Lowering
// ============================================================================

struct Lowerer<'s> {
    source: &'s str,
    module: Module,
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        node_text(self.source, node)
    }

    fn statement(&mut self, node: Node<'_>, exported: bool, docs: Option<String>) -> Option<usize> {
        let docs = docs.or_else(|| docs_before(self.source, node));
        match node.kind() {
            "import_statement" => {
                self.import(node);
                None
            }
            "export_statement" => {
                self.export(node, docs);
                None
            }
            "interface_declaration" => {
                let decl = self.interface(node, exported, docs);
                self.module.interfaces.push(decl);
                None
            }
            "type_alias_declaration" => {
                let decl = self.type_alias(node, exported, docs);
                self.module.aliases.push(decl);
                None
            }
            "class_declaration" | "abstract_class_declaration" | "class" => {
                let decl = self.class(node, exported, docs);
                self.module.classes.push(decl);
                Some(self.module.classes.len() - 1)
            }
            "lexical_declaration" | "variable_declaration" => {
                self.variables(node, exported, docs);
                None
            }
            "enum_declaration" => {
                let decl = self.enumeration(node, exported);
                self.module.enums.push(decl);
                None
            }
            "ambient_declaration" => {
                for child in named_children(node) {
                    self.statement(child, exported, docs.clone());
                }
                None
            }
            _ => None,
        }
    }

    fn import(&mut self, node: Node<'_>) {
        let Some(source) = node.child_by_field_name("source") else {
            return;
        };
        let mut import = Import {
            specifier: unquote(self.text(source)),
            resolved: None,
            bindings: Vec::new(),
        };

        if let Some(clause) = find_named_child(node, "import_clause") {
            for child in named_children(clause) {
                match child.kind() {
                    "identifier" => import.bindings.push(ImportBinding::Default {
                        local: self.text(child).to_string(),
                    }),
                    "namespace_import" => {
                        if let Some(local) = find_named_child(child, "identifier") {
                            import.bindings.push(ImportBinding::Namespace {
                                local: self.text(local).to_string(),
                            });
                        }
                    }
                    "named_imports" => {
                        for spec in named_children(child) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            let Some(name) = spec.child_by_field_name("name") else {
                                continue;
                            };
                            let imported = self.text(name).to_string();
                            let local = spec
                                .child_by_field_name("alias")
                                .map_or_else(|| imported.clone(), |a| self.text(a).to_string());
                            import.bindings.push(ImportBinding::Named { imported, local });
                        }
                    }
                    _ => {}
                }
            }
        }

        self.module.imports.push(import);
    }

    fn export(&mut self, node: Node<'_>, docs: Option<String>) {
        let is_default = has_token(node, "default");
        let source = node
            .child_by_field_name("source")
            .map(|s| unquote(self.text(s)));

        if let Some(decl) = node.child_by_field_name("declaration") {
            let class_index = self.statement(decl, true, docs);
            if is_default {
                self.module.default_export = Some(match class_index {
                    Some(index) => DefaultExport::Class(index),
                    None => DefaultExport::Expression,
                });
            }
            return;
        }

        if let Some(value) = node.child_by_field_name("value") {
            let export = match value.kind() {
                "identifier" => DefaultExport::Name(self.text(value).to_string()),
                "class" => {
                    let decl = self.class(value, true, docs);
                    self.module.classes.push(decl);
                    DefaultExport::Class(self.module.classes.len() - 1)
                }
                "new_expression" => value
                    .child_by_field_name("constructor")
                    .filter(|ctor| ctor.kind() == "identifier")
                    .map_or(DefaultExport::Expression, |ctor| {
                        DefaultExport::Name(self.text(ctor).to_string())
                    }),
                _ => DefaultExport::Expression,
            };
            self.module.default_export = Some(export);
            return;
        }

        if let Some(clause) = find_named_child(node, "export_clause") {
            for spec in named_children(clause) {
                if spec.kind() != "export_specifier" {
                    continue;
                }
                let Some(name) = spec.child_by_field_name("name") else {
                    continue;
                };
                let local = unquote(self.text(name));
                let exported = spec
                    .child_by_field_name("alias")
                    .map_or_else(|| local.clone(), |a| unquote(self.text(a)));
                let item = match &source {
                    Some(specifier) => ExportItem::ReExport {
                        specifier: specifier.clone(),
                        resolved: None,
                        imported: local,
                        exported,
                    },
                    None => ExportItem::Local { local, exported },
                };
                self.module.exports.push(item);
            }
            return;
        }

        if let Some(specifier) = source {
            if has_token(node, "*") && find_named_child(node, "namespace_export").is_none() {
                self.module.exports.push(ExportItem::ReExportAll {
                    specifier,
                    resolved: None,
                });
            }
        }
    }

    fn type_params(&self, node: Node<'_>) -> Vec<String> {
        node.child_by_field_name("type_parameters")
            .map(|params| {
                named_children(params)
                    .into_iter()
                    .filter(|param| param.kind() == "type_parameter")
                    .filter_map(|param| {
                        param
                            .child_by_field_name("name")
                            .or_else(|| first_named_child(param))
                    })
                    .map(|name| self.text(name).to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn interface(&self, node: Node<'_>, exported: bool, docs: Option<String>) -> InterfaceDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        let mut extends = Vec::new();
        for clause in named_children(node) {
            if matches!(clause.kind(), "extends_type_clause" | "extends_clause") {
                for base in named_children(clause) {
                    match base.kind() {
                        "type_arguments" | "comment" => {}
                        "identifier" | "member_expression" => {
                            extends.push(TypeNode::reference(self.text(base)));
                        }
                        _ => extends.push(self.ty(base)),
                    }
                }
            }
        }

        let body = node
            .child_by_field_name("body")
            .map(|body| self.object_type(body))
            .unwrap_or_default();

        InterfaceDecl {
            name,
            type_params: self.type_params(node),
            extends,
            body,
            exported,
            docs,
            span: node.child_by_field_name("name").map_or_else(|| span_of(node), span_of),
        }
    }

    fn type_alias(&self, node: Node<'_>, exported: bool, docs: Option<String>) -> TypeAliasDecl {
        let name_node = node.child_by_field_name("name");
        TypeAliasDecl {
            name: name_node
                .map(|n| self.text(n).to_string())
                .unwrap_or_default(),
            type_params: self.type_params(node),
            value: node
                .child_by_field_name("value")
                .map_or(TypeNode::Keyword(Keyword::Any), |value| self.ty(value)),
            exported,
            docs,
            span: name_node.map_or_else(|| span_of(node), span_of),
        }
    }

    fn property_name(&self, node: Node<'_>) -> String {
        match node.kind() {
            "string" => unquote(self.text(node)),
            _ => self.text(node).to_string(),
        }
    }

    fn object_type(&self, node: Node<'_>) -> ObjectType {
        let mut object = ObjectType::default();

        for child in named_children(node) {
            match child.kind() {
                "property_signature" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    object.members.push(Member {
                        name: self.property_name(name),
                        optional: has_token(child, "?"),
                        readonly: has_token(child, "readonly"),
                        ty: child
                            .child_by_field_name("type")
                            .map_or(TypeNode::Keyword(Keyword::Any), |ty| self.ty(ty)),
                        docs: docs_before(self.source, child),
                    });
                }
                "method_signature" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    object.members.push(Member {
                        name: self.property_name(name),
                        optional: has_token(child, "?"),
                        readonly: false,
                        ty: TypeNode::Function,
                        docs: docs_before(self.source, child),
                    });
                }
                "index_signature" => {
                    let value = if find_named_child(child, "mapped_type_clause").is_some() {
                        TypeNode::Other(self.text(child).to_string())
                    } else {
                        child
                            .child_by_field_name("type")
                            .map_or(TypeNode::Keyword(Keyword::Any), |ty| self.ty(ty))
                    };
                    object.index = Some(Box::new(value));
                }
                _ => {}
            }
        }

        object
    }

    fn ty(&self, node: Node<'_>) -> TypeNode {
        match node.kind() {
            "type_annotation" | "parenthesized_type" | "readonly_type" | "omitting_type_annotation"
            | "opting_type_annotation" => first_named_child(node)
                .map_or(TypeNode::Keyword(Keyword::Any), |inner| self.ty(inner)),
            "predefined_type" => {
                let text = self.text(node);
                match text {
                    "undefined" => TypeNode::Literal(Literal::Undefined),
                    "null" => TypeNode::Literal(Literal::Null),
                    _ => Keyword::parse(text).map_or_else(
                        || TypeNode::Other(text.to_string()),
                        TypeNode::Keyword,
                    ),
                }
            }
            "type_identifier" | "identifier" => match self.text(node) {
                "undefined" => TypeNode::Literal(Literal::Undefined),
                name => TypeNode::reference(name),
            },
            "nested_type_identifier" => {
                let name: String = self
                    .text(node)
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                TypeNode::reference(name)
            }
            "generic_type" => {
                let name = node
                    .child_by_field_name("name")
                    .or_else(|| first_named_child(node))
                    .map(|n| {
                        self.text(n)
                            .chars()
                            .filter(|c| !c.is_whitespace())
                            .collect::<String>()
                    })
                    .unwrap_or_default();
                let args = node
                    .child_by_field_name("type_arguments")
                    .or_else(|| find_named_child(node, "type_arguments"))
                    .map(|args| {
                        named_children(args)
                            .into_iter()
                            .filter(|arg| arg.kind() != "comment")
                            .map(|arg| self.ty(arg))
                            .collect()
                    })
                    .unwrap_or_default();
                TypeNode::Reference { name, args }
            }
            "literal_type" => match first_named_child(node) {
                Some(inner) => self.literal(inner),
                None => self.literal(node),
            },
            "string" | "number" | "true" | "false" | "null" | "undefined" | "unary_expression" => {
                self.literal(node)
            }
            "object_type" | "interface_body" => TypeNode::Object(self.object_type(node)),
            "array_type" => TypeNode::Array(Box::new(
                first_named_child(node)
                    .map_or(TypeNode::Keyword(Keyword::Any), |inner| self.ty(inner)),
            )),
            "tuple_type" => TypeNode::Tuple(
                named_children(node)
                    .into_iter()
                    .filter(|child| child.kind() != "comment")
                    .map(|child| self.tuple_element(child))
                    .collect(),
            ),
            "union_type" => TypeNode::Union(self.flatten(node, "union_type")),
            "intersection_type" => TypeNode::Intersection(self.flatten(node, "intersection_type")),
            "function_type" | "constructor_type" => TypeNode::Function,
            _ => TypeNode::Other(self.text(node).to_string()),
        }
    }

    fn flatten(&self, node: Node<'_>, kind: &str) -> Vec<TypeNode> {
        let mut parts = Vec::new();
        for child in named_children(node) {
            if child.kind() == "comment" {
                continue;
            }
            if child.kind() == kind {
                parts.extend(self.flatten(child, kind));
            } else {
                parts.push(self.ty(child));
            }
        }
        parts
    }

    fn tuple_element(&self, node: Node<'_>) -> TupleElement {
        let inner = |node: Node<'_>| {
            node.child_by_field_name("type")
                .or_else(|| {
                    named_children(node)
                        .into_iter()
                        .filter(|c| c.kind() != "identifier" && c.kind() != "comment")
                        .last()
                })
                .map_or(TypeNode::Keyword(Keyword::Any), |ty| self.ty(ty))
        };
        match node.kind() {
            "optional_type" | "optional_tuple_parameter" => TupleElement {
                ty: inner(node),
                optional: true,
                rest: false,
            },
            "rest_type" => TupleElement {
                ty: inner(node),
                optional: false,
                rest: true,
            },
            "tuple_parameter" => {
                let rest = find_named_child(node, "rest_pattern").is_some();
                TupleElement {
                    ty: inner(node),
                    optional: false,
                    rest,
                }
            }
            _ => TupleElement::required(self.ty(node)),
        }
    }

    fn literal(&self, node: Node<'_>) -> TypeNode {
        let text = self.text(node);
        match node.kind() {
            "string" => TypeNode::Literal(Literal::String(unquote(text))),
            "number" => parse_number(text).map_or_else(
                || TypeNode::Other(text.to_string()),
                |n| TypeNode::Literal(Literal::Number(n)),
            ),
            "true" => TypeNode::Literal(Literal::Bool(true)),
            "false" => TypeNode::Literal(Literal::Bool(false)),
            "null" => TypeNode::Literal(Literal::Null),
            "undefined" => TypeNode::Literal(Literal::Undefined),
            "unary_expression" => {
                let operand = node
                    .child_by_field_name("argument")
                    .or_else(|| first_named_child(node))
                    .and_then(|arg| parse_number(self.text(arg)));
                let negative = node
                    .child_by_field_name("operator")
                    .map_or_else(|| text.trim_start().starts_with('-'), |op| self.text(op) == "-");
                match operand {
                    Some(n) if negative => TypeNode::Literal(Literal::Number(-n)),
                    Some(n) if text.trim_start().starts_with('+') => {
                        TypeNode::Literal(Literal::Number(n))
                    }
                    _ => TypeNode::Other(text.to_string()),
                }
            }
            _ => match text {
                "true" => TypeNode::Literal(Literal::Bool(true)),
                "false" => TypeNode::Literal(Literal::Bool(false)),
                "null" => TypeNode::Literal(Literal::Null),
                "undefined" => TypeNode::Literal(Literal::Undefined),
                _ => TypeNode::Other(text.to_string()),
            },
        }
    }

    fn class(&self, node: Node<'_>, exported: bool, docs: Option<String>) -> ClassDecl {
        let mut extends = None;
        let mut implements = Vec::new();

        if let Some(heritage) = find_named_child(node, "class_heritage") {
            for clause in named_children(heritage) {
                match clause.kind() {
                    "extends_clause" => {
                        extends = clause
                            .child_by_field_name("value")
                            .or_else(|| first_named_child(clause))
                            .map(|base| self.text(base).to_string());
                    }
                    "implements_clause" => {
                        implements.extend(
                            named_children(clause)
                                .into_iter()
                                .filter(|c| c.kind() != "comment")
                                .map(|c| self.ty(c)),
                        );
                    }
                    _ => {}
                }
            }
        }

        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for child in named_children(body) {
                let is_method = match child.kind() {
                    "public_field_definition" | "field_definition" | "property_signature" => false,
                    "method_definition" | "method_signature" | "abstract_method_signature" => true,
                    _ => continue,
                };
                let Some(name) = child
                    .child_by_field_name("name")
                    .or_else(|| child.child_by_field_name("property"))
                else {
                    continue;
                };
                let annotation = if is_method {
                    None
                } else {
                    child.child_by_field_name("type").map(|ty| self.ty(ty))
                };
                members.push(ClassMember {
                    name: self.property_name(name),
                    annotation,
                    is_method,
                    is_static: has_token(child, "static"),
                    docs: docs_before(self.source, child),
                });
            }
        }

        ClassDecl {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
            extends,
            implements,
            members,
            exported,
            docs,
            span: span_of(node),
        }
    }

    fn variables(&mut self, node: Node<'_>, exported: bool, docs: Option<String>) {
        for declarator in named_children(node) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = declarator.child_by_field_name("name") else {
                continue;
            };
            if name.kind() != "identifier" {
                continue;
            }
            let name = self.text(name).to_string();
            let mut annotation = declarator
                .child_by_field_name("type")
                .map(|ty| self.ty(ty));

            let mut value = declarator.child_by_field_name("value");
            while let Some(wrapper) = value {
                if !matches!(wrapper.kind(), "as_expression" | "satisfies_expression") {
                    break;
                }
                let parts = named_children(wrapper);
                if annotation.is_none() {
                    annotation = parts.get(1).map(|ty| self.ty(*ty));
                }
                value = parts.first().copied();
            }

            let mut decl = ConstDecl {
                name: name.clone(),
                annotation,
                object: None,
                instance_of: None,
                exported,
                docs: docs.clone(),
                span: span_of(declarator),
            };

            match value.map(|v| (v.kind(), v)) {
                Some(("object", object)) => decl.object = Some(self.object_members(object)),
                Some(("new_expression", new)) => {
                    decl.instance_of = new
                        .child_by_field_name("constructor")
                        .filter(|ctor| ctor.kind() == "identifier")
                        .map(|ctor| self.text(ctor).to_string());
                }
                Some(("class", class)) => {
                    let mut class = self.class(class, exported, docs.clone());
                    class.name.get_or_insert(name);
                    self.module.classes.push(class);
                }
                _ => {}
            }

            self.module.consts.push(decl);
        }
    }

    fn object_members(&self, node: Node<'_>) -> Vec<ObjectMember> {
        let mut members = Vec::new();
        for child in named_children(node) {
            let (name, annotation) = match child.kind() {
                "pair" => {
                    let Some(key) = child.child_by_field_name("key") else {
                        continue;
                    };
                    let annotation = child
                        .child_by_field_name("value")
                        .filter(|v| matches!(v.kind(), "as_expression" | "satisfies_expression"))
                        .and_then(|v| named_children(v).get(1).map(|ty| self.ty(*ty)));
                    (self.property_name(key), annotation)
                }
                "method_definition" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    (self.property_name(name), None)
                }
                "shorthand_property_identifier" => (self.text(child).to_string(), None),
                _ => continue,
            };
            members.push(ObjectMember {
                name,
                annotation,
                docs: docs_before(self.source, child),
            });
        }
        members
    }

    fn enumeration(&self, node: Node<'_>, exported: bool) -> EnumDecl {
        let mut values = Vec::new();
        let mut next = 0.0;

        if let Some(body) = node.child_by_field_name("body") {
            for member in named_children(body) {
                let value = match member.kind() {
                    "enum_assignment" => member
                        .child_by_field_name("value")
                        .map(|v| self.literal(v)),
                    "property_identifier" | "string" => None,
                    _ => continue,
                };
                let literal = match value {
                    Some(TypeNode::Literal(Literal::String(s))) => Literal::String(s),
                    Some(TypeNode::Literal(Literal::Number(n))) => {
                        next = n + 1.0;
                        Literal::Number(n)
                    }
                    _ => {
                        let n = next;
                        next += 1.0;
                        Literal::Number(n)
                    }
                };
                values.push(literal);
            }
        }

        EnumDecl {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default(),
            values,
            exported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Module {
        parse_module(Path::new("/virtual/server.ts"), source).expect("valid source")
    }

    fn alias_value(source: &str) -> TypeNode {
        parse(source).aliases.remove(0).value
    }

    #[test]
    fn test_interface_members() {
        let module = parse(
            r"
            /** Weather lookup. */
            export interface GetWeatherTool extends ITool {
              name: 'get_weather';
              /** The city. */
              readonly location?: string;
              run(x: number): void;
              [key: string]: unknown;
            }
            ",
        );
        let iface = &module.interfaces[0];
        assert_eq!(iface.name, "GetWeatherTool");
        assert!(iface.exported);
        assert_eq!(iface.docs.as_deref(), Some("Weather lookup."));
        assert_eq!(iface.extends, vec![TypeNode::reference("ITool")]);

        let name = iface.body.member("name").expect("name member");
        assert_eq!(name.ty.as_str_literal(), Some("get_weather"));

        let location = iface.body.member("location").expect("location member");
        assert!(location.optional);
        assert!(location.readonly);
        assert_eq!(location.docs.as_deref(), Some("The city."));
        assert_eq!(location.ty, TypeNode::Keyword(Keyword::String));

        assert_eq!(iface.body.member("run").map(|m| &m.ty), Some(&TypeNode::Function));
        assert!(iface.body.index.is_some());
    }

    #[test]
    fn test_union_is_flattened() {
        let ty = alias_value("type U = 'a' | 'b' | 'c';");
        assert_eq!(
            ty,
            TypeNode::Union(vec![
                TypeNode::Literal(Literal::String("a".into())),
                TypeNode::Literal(Literal::String("b".into())),
                TypeNode::Literal(Literal::String("c".into())),
            ])
        );
    }

    #[test]
    fn test_negative_and_hex_numbers() {
        assert_eq!(
            alias_value("type N = -42;"),
            TypeNode::Literal(Literal::Number(-42.0))
        );
        assert_eq!(
            alias_value("type N = 0x1F;"),
            TypeNode::Literal(Literal::Number(31.0))
        );
    }

    #[test]
    fn test_generic_and_array_types() {
        assert_eq!(
            alias_value("type A = Array<string>;"),
            TypeNode::Reference {
                name: "Array".into(),
                args: vec![TypeNode::Keyword(Keyword::String)],
            }
        );
        assert_eq!(
            alias_value("type A = number[];"),
            TypeNode::Array(Box::new(TypeNode::Keyword(Keyword::Number)))
        );
    }

    #[test]
    fn test_tuple_elements() {
        let TypeNode::Tuple(elements) = alias_value("type T = ['a', 1, true];") else {
            panic!("expected tuple");
        };
        assert_eq!(elements.len(), 3);
        assert!(elements.iter().all(|e| !e.optional && !e.rest));
    }

    #[test]
    fn test_imports_and_exports() {
        let module = parse(
            r"
            import type { ITool, IServer as Server } from 'simply-mcp';
            import Defaults, * as shapes from './shapes';
            export { Local as Renamed };
            export { Thing } from './thing';
            export * from './all';
            ",
        );
        assert_eq!(module.imports.len(), 2);
        assert_eq!(
            module.imports[0].bindings,
            vec![
                ImportBinding::Named {
                    imported: "ITool".into(),
                    local: "ITool".into()
                },
                ImportBinding::Named {
                    imported: "IServer".into(),
                    local: "Server".into()
                },
            ]
        );
        assert_eq!(module.imports[1].specifier, "./shapes");
        assert!(module.imports[1]
            .bindings
            .contains(&ImportBinding::Namespace { local: "shapes".into() }));
        assert_eq!(module.exports.len(), 3);
        assert!(matches!(module.exports[2], ExportItem::ReExportAll { .. }));
    }

    #[test]
    fn test_default_export_class() {
        let module = parse(
            r"
            /** Weather service. */
            export default class Weather implements WeatherServer {
              /** Fetches weather. */
              getWeather: GetWeatherTool = async () => ({});
              'config://app' = {};
              static helper() {}
            }
            ",
        );
        assert_eq!(module.default_export, Some(DefaultExport::Class(0)));
        let class = &module.classes[0];
        assert_eq!(class.name.as_deref(), Some("Weather"));
        assert_eq!(class.docs.as_deref(), Some("Weather service."));
        assert_eq!(class.implements, vec![TypeNode::reference("WeatherServer")]);

        let member = class.member("getWeather").expect("member");
        assert_eq!(member.annotation, Some(TypeNode::reference("GetWeatherTool")));
        assert_eq!(member.docs.as_deref(), Some("Fetches weather."));
        assert!(class.member("config://app").is_some());
        assert!(class.member("helper").is_some_and(|m| m.is_method && m.is_static));
    }

    #[test]
    fn test_const_object_and_default_identifier() {
        let module = parse(
            r"
            const server = { getWeather: async () => ({}), search };
            export default server;
            ",
        );
        assert_eq!(module.default_export, Some(DefaultExport::Name("server".into())));
        let names: Vec<_> = module.consts[0]
            .object
            .as_ref()
            .expect("object initializer")
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["getWeather", "search"]);
    }

    #[test]
    fn test_enum_values() {
        let module = parse("enum Units { Celsius = 'c', Fahrenheit = 'f' } enum Level { Low, High = 10, Max }");
        assert_eq!(
            module.enums[0].values,
            vec![Literal::String("c".into()), Literal::String("f".into())]
        );
        assert_eq!(
            module.enums[1].values,
            vec![
                Literal::Number(0.0),
                Literal::Number(10.0),
                Literal::Number(11.0)
            ]
        );
    }

    #[test]
    fn test_syntax_error_position() {
        let err = parse_module(
            Path::new("/virtual/bad.ts"),
            "interface A {\n  name: 'a'\n  description: ;\n}\n",
        )
        .unwrap_err();
        match err {
            CompileError::Syntax { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unquote_escapes() {
        assert_eq!(unquote(r"'it\'s'"), "it's");
        assert_eq!(unquote(r#""a\nb""#), "a\nb");
        assert_eq!(unquote(r"'A\x42'"), "AB");
        assert_eq!(unquote("plain"), "plain");
    }

    #[test]
    fn test_clean_jsdoc() {
        assert_eq!(
            clean_jsdoc("/**\n   * Line one.\n   * @param city The city\n   */"),
            "Line one.\n@param city The city"
        );
    }
}
