//! Remediation text for extraction errors.
//!
//! Resource errors show the literal-value form and the dynamic-binding
//! form side by side so the fix can be copied straight into the source.

use std::fmt;

/// The two ways a resource can provide its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRemediation {
    /// A `value:` member with literal data.
    pub literal_form: String,
    /// A `returns:` member served by an implementation.
    pub dynamic_form: String,
}

impl ResourceRemediation {
    /// Build remediation snippets for the resource at `uri`.
    #[must_use]
    pub fn for_uri(uri: &str) -> Self {
        Self {
            literal_form: format!("value: {{ uri: '{uri}'; status: 'ok' }};"),
            dynamic_form: "returns: { status: string };  // served by a class member".to_string(),
        }
    }
}

impl fmt::Display for ResourceRemediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "use a literal value:\n    {}\nor declare a dynamic binding:\n    {}",
            self.literal_form, self.dynamic_form
        )
    }
}
