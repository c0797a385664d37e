//! Unified error handling for the interface compiler.
//!
//! # Design Philosophy
//!
//! - **Single error type**: build, extraction and registration failures all
//!   flow through [`CompileError`]
//! - **Typed, never swallowed**: fatal errors propagate to the caller with
//!   the offending path or declaration attached
//! - **Diagnostic-friendly**: integrates with [`miette`] for reports with
//!   codes and remediation help
//!
//! # Errors versus diagnostics
//!
//! Validation findings (orphaned hidden tools, empty skills, ...) are not
//! errors. They are collected as
//! [`ValidationWarning`](crate::validation::ValidationWarning)s on the
//! [`ParseResult`](crate::ir::ParseResult) so a caller can inspect the full
//! set even when it decides to fail the build.
//!
//! ## Context Chaining
//!
//! ```rust
//! use mcpkit_core::error::{CompileError, CompileResultExt};
//!
//! fn compile_entry() -> Result<(), CompileError> {
//!     let result: Result<(), CompileError> =
//!         Err(CompileError::source_not_found("src/server.ts"));
//!     result
//!         .context("Failed to build program")
//!         .with_context(|| format!("entry: {}", "src/server.ts"))?;
//!     Ok(())
//! }
//! ```

mod context;
mod details;
mod types;

// Re-export all public types
pub use context::CompileResultExt;
pub use details::ResourceRemediation;
pub use types::{CompileError, ErrorCategory};
