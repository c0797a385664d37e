//! Context for errors raised deep in a compile pass.
//!
//! The program builder uses this to say which importer pulled in a module
//! that failed to load; configuration loading uses it to name the file
//! whose `extends` chain broke. The typed error stays reachable through
//! [`CompileError::root`].

use super::types::CompileError;

/// Extension trait for adding context to `Result` types.
///
/// # Example
///
/// ```rust
/// use mcpkit_core::error::{CompileError, CompileResultExt};
///
/// let loaded: Result<(), CompileError> = Err(CompileError::source_not_found("shapes.ts"));
/// let err = loaded
///     .with_context(|| format!("while loading a module imported by {}", "server.ts"))
///     .unwrap_err();
///
/// assert!(err.to_string().starts_with("while loading a module imported by server.ts"));
/// assert!(matches!(err.root(), CompileError::SourceNotFound { .. }));
/// ```
pub trait CompileResultExt<T> {
    /// Wrap an error with a fixed context message.
    fn context<C: Into<String>>(self, context: C) -> Result<T, CompileError>;

    /// Wrap an error with a context message built only on failure.
    fn with_context<C, F>(self, f: F) -> Result<T, CompileError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> CompileResultExt<T> for Result<T, CompileError> {
    fn context<C: Into<String>>(self, context: C) -> Self {
        self.with_context(|| context)
    }

    fn with_context<C, F>(self, f: F) -> Self
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|source| wrap(source, f().into()))
    }
}

fn wrap(source: CompileError, context: String) -> CompileError {
    CompileError::WithContext {
        context,
        source: Box::new(source),
    }
}
