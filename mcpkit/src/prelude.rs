//! Prelude module for convenient imports.
//!
//! Import everything you need with a single use statement:
//!
//! ```rust
//! use mcpkit::prelude::*;
//!
//! let compiler = Compiler::new()
//!     .with_options(CompileOptions::new().validation(ValidationConfig::new().strict(true)));
//! assert!(compiler.cache().is_empty());
//! ```
//!
//! ## Included Types
//!
//! ### Core Types
//! - IR types (`ParseResult`, `Declaration`, per-kind details)
//! - Schemas (`ParameterSchema`, `SchemaKind`)
//! - Errors (`CompileError`, `ErrorCategory`)
//! - Validation (`ValidationEngine`, `ValidationConfig`, `RuleLevel`)
//!
//! ### Compiler Types
//! - `Compiler` and `CompileOptions`
//! - `ProgramCache`
//! - `ShapeRegistry`

// Core types
pub use mcpkit_core::prelude::*;

// Compiler types
pub use mcpkit_compiler::{CompileOptions, Compiler, ProgramCache, ShapeRegistry};
