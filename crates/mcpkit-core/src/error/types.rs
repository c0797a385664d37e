//! The primary error type for the interface compiler.
//!
//! This module contains the unified `CompileError` enum covering build,
//! extraction and registration failures.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use super::details::ResourceRemediation;
use crate::types::DeclarationKind;

/// Broad classification of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The program could not be built: missing file, syntax error,
    /// unresolved import, bad project configuration, nothing to compile.
    Build,
    /// A specific declaration could not be extracted.
    Extraction,
    /// The registration layer could not bind a declaration.
    Registration,
}

/// The primary error type for the interface compiler.
///
/// Build and extraction errors abort the compile pass; validation
/// findings are never reported through this type (see
/// [`ValidationWarning`](crate::validation::ValidationWarning)).
#[derive(Error, Diagnostic, Debug)]
pub enum CompileError {
    // ========================================================================
    // Build Errors
    // ========================================================================
    /// The entry file (or an imported file) does not exist.
    #[error("Source file not found: {}", path.display())]
    #[diagnostic(
        code(mcpkit::build::not_found),
        help("Check that the path points at the server definition entry point")
    )]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("Failed to read {}", path.display())]
    #[diagnostic(code(mcpkit::build::io))]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The parser reported a syntax error.
    #[error("Syntax error in {}:{line}:{column}: unexpected `{snippet}`", path.display())]
    #[diagnostic(code(mcpkit::build::syntax))]
    Syntax {
        /// The file containing the error.
        path: PathBuf,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
        /// Source text of the offending node (truncated).
        snippet: String,
    },

    /// A relative import could not be resolved to a file.
    #[error("Cannot resolve import '{specifier}' from {}", importer.display())]
    #[diagnostic(
        code(mcpkit::build::unresolved_import),
        help("Relative imports must point at a .ts/.tsx file or a directory with an index.ts")
    )]
    UnresolvedImport {
        /// The importing file.
        importer: PathBuf,
        /// The import specifier as written.
        specifier: String,
    },

    /// The discovered project configuration is not valid JSON.
    #[error("Invalid project configuration {}", path.display())]
    #[diagnostic(code(mcpkit::build::project_config))]
    ProjectConfig {
        /// The configuration file.
        path: PathBuf,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The TypeScript grammar could not be loaded into the parser.
    #[error("Failed to initialize the TypeScript parser: {message}")]
    #[diagnostic(code(mcpkit::build::parser_init))]
    ParserInit {
        /// Human-readable error message.
        message: String,
    },

    /// Nothing in the file matched a capability shape and there is no
    /// exported implementation.
    #[error("No capability declarations or exported server found in {}", path.display())]
    #[diagnostic(
        code(mcpkit::build::no_declarations),
        help("Declare interfaces extending ITool/IResource/IPrompt/IServer, or export a server class")
    )]
    NoDeclarations {
        /// The entry file.
        path: PathBuf,
    },

    // ========================================================================
    // Extraction Errors
    // ========================================================================
    /// A resource declares both a literal value and a dynamic return type.
    #[error("Resource '{uri}' ({interface}) declares both `{literal_field}` and `{dynamic_field}`")]
    #[diagnostic(code(mcpkit::extract::mutually_exclusive_fields))]
    MutuallyExclusiveFields {
        /// The declaring interface.
        interface: String,
        /// The resource URI.
        uri: String,
        /// The literal-data member.
        literal_field: String,
        /// The dynamic member.
        dynamic_field: String,
        /// Side-by-side remediation.
        #[help]
        remediation: String,
    },

    /// A resource has no extractable literal value and no dynamic binding.
    #[error("Resource '{uri}' ({interface}) has no literal value and no dynamic binding")]
    #[diagnostic(code(mcpkit::extract::missing_literal_data))]
    MissingLiteralData {
        /// The declaring interface.
        interface: String,
        /// The resource URI.
        uri: String,
        /// Side-by-side remediation.
        #[help]
        remediation: String,
    },

    /// Two declarations of the same kind share a name.
    #[error("Duplicate {kind} '{name}' declared by {first} and {second}")]
    #[diagnostic(
        code(mcpkit::extract::duplicate),
        help("Names must be unique within a capability kind")
    )]
    DuplicateDeclaration {
        /// The declaration kind.
        kind: DeclarationKind,
        /// The shared name (or URI).
        name: String,
        /// Interface of the first declaration.
        first: String,
        /// Interface of the second declaration.
        second: String,
    },

    // ========================================================================
    // Registration Errors
    // ========================================================================
    /// A declaration that needs a runtime implementation has none.
    #[error("No implementation found for {kind} '{name}'")]
    #[diagnostic(
        code(mcpkit::register::implementation_not_found),
        help("Add a member to the server class named one of: {}", tried.join(", "))
    )]
    ImplementationNotFound {
        /// The declaration kind.
        kind: DeclarationKind,
        /// The declaration name.
        name: String,
        /// Member names that would have matched.
        tried: Box<[String]>,
    },

    // ========================================================================
    // Context-Wrapped Errors
    // ========================================================================
    /// An error with additional context.
    #[error("{context}: {source}")]
    #[diagnostic(code(mcpkit::context))]
    WithContext {
        /// The context message.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<CompileError>,
    },
}

// ============================================================================
// Error Construction Helpers
// ============================================================================

impl CompileError {
    /// Create a source-not-found error.
    pub fn source_not_found(path: impl Into<PathBuf>) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::SourceNotFound { path: path.into() };
        }
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an unresolved-import error.
    pub fn unresolved_import(importer: impl Into<PathBuf>, specifier: impl Into<String>) -> Self {
        Self::UnresolvedImport {
            importer: importer.into(),
            specifier: specifier.into(),
        }
    }

    /// Create a no-declarations error.
    pub fn no_declarations(path: impl Into<PathBuf>) -> Self {
        Self::NoDeclarations { path: path.into() }
    }

    /// Create a mutually-exclusive-fields error for a resource.
    pub fn mutually_exclusive_fields(
        interface: impl Into<String>,
        uri: impl Into<String>,
        literal_field: impl Into<String>,
        dynamic_field: impl Into<String>,
    ) -> Self {
        let uri = uri.into();
        let remediation = ResourceRemediation::for_uri(&uri).to_string();
        Self::MutuallyExclusiveFields {
            interface: interface.into(),
            uri,
            literal_field: literal_field.into(),
            dynamic_field: dynamic_field.into(),
            remediation,
        }
    }

    /// Create a missing-literal-data error for a resource.
    pub fn missing_literal_data(interface: impl Into<String>, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let remediation = ResourceRemediation::for_uri(&uri).to_string();
        Self::MissingLiteralData {
            interface: interface.into(),
            uri,
            remediation,
        }
    }

    /// Create a duplicate-declaration error.
    pub fn duplicate(
        kind: DeclarationKind,
        name: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::DuplicateDeclaration {
            kind,
            name: name.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create an implementation-not-found error.
    pub fn implementation_not_found(
        kind: DeclarationKind,
        name: impl Into<String>,
        tried: Vec<String>,
    ) -> Self {
        Self::ImplementationNotFound {
            kind,
            name: name.into(),
            tried: tried.into_boxed_slice(),
        }
    }

    /// Classify this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceNotFound { .. }
            | Self::Io { .. }
            | Self::Syntax { .. }
            | Self::UnresolvedImport { .. }
            | Self::ProjectConfig { .. }
            | Self::ParserInit { .. }
            | Self::NoDeclarations { .. } => ErrorCategory::Build,
            Self::MutuallyExclusiveFields { .. }
            | Self::MissingLiteralData { .. }
            | Self::DuplicateDeclaration { .. } => ErrorCategory::Extraction,
            Self::ImplementationNotFound { .. } => ErrorCategory::Registration,
            Self::WithContext { source, .. } => source.category(),
        }
    }

    /// The file this error is about, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::SourceNotFound { path }
            | Self::Io { path, .. }
            | Self::Syntax { path, .. }
            | Self::ProjectConfig { path, .. }
            | Self::NoDeclarations { path } => Some(path),
            Self::UnresolvedImport { importer, .. } => Some(importer),
            Self::WithContext { source, .. } => source.path(),
            _ => None,
        }
    }

    /// The innermost error, with context layers removed.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}
