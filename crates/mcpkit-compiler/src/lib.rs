//! # mcpkit-compiler
//!
//! Compiles TypeScript server definitions into the mcpkit IR.
//!
//! A server is described with interfaces whose members are type-level
//! metadata. The compiler reads the entry file and everything it imports,
//! finds the interfaces that declare capabilities, and produces a
//! [`ParseResult`] with typed parameter schemas and validation diagnostics:
//!
//! - **Program**: tree-sitter frontend, module graph, `tsconfig.json`, cache
//! - **Checker**: name resolution and heritage flattening
//! - **Matcher**: explicit and structural capability classification
//! - **Extract**: declarations, implementation bindings, documentation
//! - **Literal**: compile-time evaluation of literal types
//! - **Lower**: TypeScript types to [`ParameterSchema`]s
//!
//! # Example
//!
//! ```rust
//! use mcpkit_compiler::Compiler;
//!
//! let source = r"
//!     interface GetWeatherTool extends ITool {
//!       name: 'get_weather';
//!       description: 'Get the weather';
//!       params: { location: { type: 'string' } };
//!     }
//!     export default class Weather {
//!       getWeather = async () => ({ temperature: 20 });
//!     }
//! ";
//!
//! let ir = Compiler::new().compile_source("/virtual/server.ts", source)?;
//! let tool = ir.tool("get_weather").expect("declared");
//! assert_eq!(tool.binding_name.as_deref(), Some("getWeather"));
//! # Ok::<(), mcpkit_core::CompileError>(())
//! ```
//!
//! [`ParameterSchema`]: mcpkit_core::ParameterSchema

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod checker;
pub mod config;
pub mod docs;
pub mod extract;
pub mod literal;
pub mod lower;
pub mod matcher;
pub mod program;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mcpkit_core::error::CompileError;
use mcpkit_core::ir::ParseResult;
use mcpkit_core::validation::{ValidationConfig, ValidationEngine};

pub use extract::Extractor;
pub use literal::{extract_literal, to_type_source};
pub use matcher::ShapeRegistry;
pub use program::{BuildOptions, CompiledUnit, ProgramBuilder, ProgramCache};

/// Settings for a [`Compiler`].
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Directory to start `tsconfig.json` discovery from.
    pub project_root: Option<PathBuf>,
    /// Explicit `tsconfig.json`; disables discovery.
    pub tsconfig: Option<PathBuf>,
    /// Rule levels for the validation pass.
    pub validation: ValidationConfig,
    /// Capability shapes used for structural matching.
    pub shapes: ShapeRegistry,
}

impl CompileOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration discovery root.
    #[must_use]
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Use an explicit `tsconfig.json`.
    #[must_use]
    pub fn tsconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.tsconfig = Some(path.into());
        self
    }

    /// Set the validation configuration.
    #[must_use]
    pub fn validation(mut self, config: ValidationConfig) -> Self {
        self.validation = config;
        self
    }

    /// Set the shape registry.
    #[must_use]
    pub fn shapes(mut self, shapes: ShapeRegistry) -> Self {
        self.shapes = shapes;
        self
    }

    fn build_options(&self) -> BuildOptions {
        BuildOptions {
            project_root: self.project_root.clone(),
            tsconfig: self.tsconfig.clone(),
        }
    }
}

/// Builds, extracts and validates server definitions.
#[derive(Debug, Default)]
pub struct Compiler {
    builder: ProgramBuilder,
    options: CompileOptions,
    engine: ValidationEngine,
}

impl Compiler {
    /// Create a compiler with default options and its own cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.builder = self.builder.with_options(options.build_options());
        self.options = options;
        self
    }

    /// Share a program cache with other compilers.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ProgramCache>) -> Self {
        self.builder = self.builder.with_cache(cache);
        self
    }

    /// Use a custom validation engine.
    #[must_use]
    pub fn with_engine(mut self, engine: ValidationEngine) -> Self {
        self.engine = engine;
        self
    }

    /// The options in use.
    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// The program cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<ProgramCache> {
        self.builder.cache()
    }

    /// Evict one cached program, or all of them. Returns how many were
    /// removed.
    pub fn clear_cache(&self, path: Option<&Path>) -> usize {
        self.builder.clear_cache(path)
    }

    /// Compile the server definition at `path`.
    ///
    /// Validation findings are appended to the result's diagnostics; they
    /// never fail the compile.
    ///
    /// # Errors
    ///
    /// Build failures (missing or unparsable files, unresolved imports,
    /// invalid configuration) and extraction failures (conflicting or
    /// missing resource data, duplicate names, nothing declared).
    pub fn compile(&self, path: impl AsRef<Path>) -> Result<ParseResult, CompileError> {
        let unit = self.builder.build(path)?;
        self.process(&unit)
    }

    /// Compile in-memory source as if it were the file at `path`.
    ///
    /// # Errors
    ///
    /// Same as [`compile`](Self::compile).
    pub fn compile_source(
        &self,
        path: impl Into<PathBuf>,
        source: &str,
    ) -> Result<ParseResult, CompileError> {
        let unit = self.builder.build_source(path, source)?;
        self.process(&unit)
    }

    /// Extract and validate an already built program.
    ///
    /// # Errors
    ///
    /// Extraction failures, as for [`compile`](Self::compile).
    pub fn process(&self, unit: &CompiledUnit) -> Result<ParseResult, CompileError> {
        let span = tracing::info_span!("compile", path = %unit.path().display());
        let _guard = span.enter();

        let mut result = Extractor::new(unit, &self.options.shapes).extract()?;
        let findings = self.engine.validate(&result, &self.options.validation);
        result.diagnostics.extend(findings);

        tracing::info!(
            modules = unit.len(),
            declarations = result.len(),
            diagnostics = result.diagnostics.len(),
            errors = result.diagnostics.iter().filter(|d| d.is_error()).count(),
            "compiled server definition"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpkit_core::validation::RuleLevel;

    const SOURCE: &str = r"
        interface A extends ITool { name: 'a'; hidden: true }
        export default class S { a = () => 1; }
    ";

    #[test]
    fn test_validation_findings_are_appended() {
        let ir = Compiler::new()
            .compile_source("/virtual/server.ts", SOURCE)
            .expect("compiles");
        assert_eq!(ir.diagnostics.len(), 1);
        assert_eq!(ir.diagnostics[0].rule, "orphaned-hidden-tool");
        assert!(!ir.has_errors());
    }

    #[test]
    fn test_validation_config_is_applied() {
        let options = CompileOptions::new()
            .validation(ValidationConfig::new().rule("orphaned-hidden", RuleLevel::Off));
        let ir = Compiler::new()
            .with_options(options)
            .compile_source("/virtual/server.ts", SOURCE)
            .expect("compiles");
        assert!(ir.diagnostics.is_empty());
    }

    #[test]
    fn test_strict_escalates() {
        let options = CompileOptions::new().validation(ValidationConfig::new().strict(true));
        let ir = Compiler::new()
            .with_options(options)
            .compile_source("/virtual/server.ts", SOURCE)
            .expect("compiles");
        assert!(ir.has_errors());
    }
}
