//! # mcpkit-core
//!
//! Core types for interface-driven MCP server definitions.
//!
//! This crate holds everything the compiler produces and everything a
//! registration layer consumes, without depending on a parser:
//!
//! - **Declarations**: tools, resources, prompts, routers, skills,
//!   subscriptions, completions and server metadata
//! - **Parameter schemas**: the canonical, constraint-carrying schema tree
//! - **Parse results**: the per-file IR with diagnostics
//! - **Validation**: pluggable consistency rules over the IR
//! - **Naming**: snake/camel/Pascal/kebab conversions used for binding
//! - **Error handling**: unified `CompileError` type with rich diagnostics
//!
//! # Example
//!
//! ```rust
//! use mcpkit_core::prelude::*;
//!
//! let mut ir = ParseResult::new("server.ts");
//! ir.insert(
//!     Declaration::new(
//!         "get_weather",
//!         "GetWeatherTool",
//!         DeclarationDetail::Tool(ToolDetail::new(
//!             ParameterSchema::object().property("location", ParameterSchema::string()),
//!         )),
//!     )
//!     .bound_to("getWeather"),
//! )?;
//!
//! let report = ValidationEngine::new().report(&ir, &ValidationConfig::default());
//! assert!(report.is_clean());
//! # Ok::<(), CompileError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod ir;
pub mod naming;
pub mod schema;
pub mod types;
pub mod validation;

// Re-export commonly used types at the crate root
pub use error::{CompileError, CompileResultExt};
pub use ir::ParseResult;
pub use schema::ParameterSchema;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use mcpkit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{CompileError, CompileResultExt, ErrorCategory};
    pub use crate::ir::ParseResult;
    pub use crate::naming::{to_camel_case, to_kebab_case, to_snake_case, variants_of};
    pub use crate::schema::{AdditionalProperties, ParameterSchema, SchemaKind};
    pub use crate::types::{
        // Common
        ComponentRef,
        Declaration,
        DeclarationDetail,
        DeclarationKind,
        Hidden,
        SourceLocation,
        // Kind payloads
        CompletionDetail,
        PromptDetail,
        ResourceContent,
        ResourceDetail,
        RouterDetail,
        ServerDetail,
        SkillDetail,
        SubscriptionDetail,
        ToolAnnotations,
        ToolDetail,
        TransportKind,
    };
    pub use crate::validation::{
        RuleLevel, Severity, ValidationConfig, ValidationEngine, ValidationReport,
        ValidationRule, ValidationWarning,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        // Just verify that all the types are accessible
        let _schema = ParameterSchema::string();
        let _kind = DeclarationKind::Tool;
        let _config = ValidationConfig::default();
    }

    #[test]
    fn test_error_context() {
        fn might_fail() -> Result<(), CompileError> {
            Err(CompileError::source_not_found("missing.ts"))
        }

        let result = might_fail().context("while building the program");
        assert!(result.is_err());

        let err = result.unwrap_err();
        assert!(err.to_string().contains("while building the program"));
    }
}
