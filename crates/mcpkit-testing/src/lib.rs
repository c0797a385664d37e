//! Testing utilities for mcpkit.
//!
//! This crate provides fixtures and assertions for testing the compiler and
//! the validation engine. It includes:
//!
//! - Sample server-definition sources and prebuilt IR
//! - Temporary on-disk projects for module-graph tests
//! - Assertions over diagnostics, schemas and bindings
//! - A test tracing subscriber
//!
//! # Overview
//!
//! ## Test Fixtures
//!
//! ```rust
//! use mcpkit_testing::fixtures;
//!
//! let ir = fixtures::weather_ir();
//! assert!(ir.tool("get_weather").is_some());
//! ```
//!
//! ## Assertions
//!
//! ```rust
//! use mcpkit_core::validation::validate;
//! use mcpkit_testing::{assert_diagnostic, fixtures};
//!
//! let ir = fixtures::orphaned_hidden_ir();
//! let warnings = validate(&ir, &Default::default());
//! assert_diagnostic!(warnings, "orphaned-hidden-tool");
//! ```

#![deny(missing_docs)]

pub mod assertions;
pub mod fixtures;
pub mod project;
pub mod trace;

// Re-export commonly used items
pub use assertions::{assert_bound, assert_has_warning, assert_no_warning, assert_required};
pub use fixtures::{orphaned_hidden_ir, weather_ir};
pub use project::TempProject;
pub use trace::init_test_tracing;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::assertions::{
        assert_bound, assert_has_warning, assert_no_warning, assert_required,
    };
    pub use crate::fixtures::{orphaned_hidden_ir, weather_ir};
    pub use crate::project::TempProject;
    pub use crate::trace::init_test_tracing;
}
