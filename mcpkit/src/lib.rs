//! # mcpkit - interface-driven MCP server definitions
//!
//! Describe an MCP server as TypeScript interfaces, and mcpkit compiles
//! them into a typed intermediate representation: tools with parameter
//! schemas, resources, prompts, routers, skills, subscriptions,
//! completions and server metadata, each bound to the member that
//! implements it.
//!
//! ## Features
//!
//! - **Structural matching** of interfaces against capability shapes
//! - **Literal extraction** of names, URIs, templates and static data
//! - **Schema lowering** from TypeScript types to constraint-carrying schemas
//! - **Validation rules** with per-rule levels and diagnostics
//! - **Program caching** keyed by entry file
//!
//! ## Quick Start
//!
//! ```rust
//! use mcpkit::prelude::*;
//!
//! let source = r"
//!     interface GetWeatherTool extends ITool {
//!       name: 'get_weather';
//!       description: 'Get the weather';
//!       params: { location: string };
//!     }
//!     export default class Weather {
//!       getWeather = async (params) => ({});
//!     }
//! ";
//!
//! let ir = Compiler::new().compile_source("server.ts", source)?;
//! let tool = ir.tool("get_weather").expect("declared");
//! assert_eq!(tool.binding_name.as_deref(), Some("getWeather"));
//! ir.ensure_bindings()?;
//! # Ok::<(), CompileError>(())
//! ```
//!
//! ## Crate Organization
//!
//! - [`mcpkit_core`] - IR types, schemas, naming and validation (no parser)
//! - [`mcpkit_compiler`] - Program building, shape matching and extraction

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

// Re-export all public items from core
pub use mcpkit_core::*;

// Re-export compiler entry points
pub use mcpkit_compiler::{
    CompileOptions, Compiler, ProgramBuilder, ProgramCache, ShapeRegistry, extract_literal,
};

pub mod prelude;

/// Compiler module re-exports
pub mod compiler {
    //! Program building, shape matching and declaration extraction.
    pub use mcpkit_compiler::*;
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;
        let _ = std::any::type_name::<CompileError>();
        let _ = Compiler::new();
    }
}
