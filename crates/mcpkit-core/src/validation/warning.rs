//! Validation output records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of an emitted diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, never fatal on its own.
    Warn,
    /// The caller should treat the build as failed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => f.write_str("warn"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// One diagnostic produced by a validation rule or by the compiler.
///
/// Warnings are plain data; nothing mutates them after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    /// Emitted rule id, e.g. `orphaned-hidden-tool`.
    pub rule: String,
    /// Effective severity.
    pub severity: Severity,
    /// What is wrong.
    pub message: String,
    /// How to fix it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Names of the declarations involved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_items: Vec<String>,
}

impl ValidationWarning {
    /// Create a diagnostic.
    #[must_use]
    pub fn new(rule: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            suggestion: None,
            related_items: Vec::new(),
        }
    }

    /// Attach a suggestion.
    #[must_use]
    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach related item names.
    #[must_use]
    pub fn related<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_items.extend(items.into_iter().map(Into::into));
        self
    }

    /// Whether this diagnostic has error severity.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.rule, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

/// Summary of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// All diagnostics, in rule order.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Wrap a list of diagnostics.
    #[must_use]
    pub fn new(warnings: Vec<ValidationWarning>) -> Self {
        Self { warnings }
    }

    /// Number of error-severity diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.warnings.iter().filter(|w| w.is_error()).count()
    }

    /// Number of warn-severity diagnostics.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len() - self.error_count()
    }

    /// Whether any diagnostic has error severity.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.warnings.iter().any(ValidationWarning::is_error)
    }

    /// Whether nothing was reported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Diagnostics emitted under `rule`.
    pub fn by_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a ValidationWarning> {
        self.warnings.iter().filter(move |w| w.rule == rule)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        )
    }
}
