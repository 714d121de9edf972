//! The mail object the adapter renders into

use serde::{Deserialize, Serialize};

/// An outgoing mail that names a template.
///
/// The adapter reads `template` and `context` and writes `html` only after
/// the whole pipeline succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMail {
    /// Template reference (path, with or without extension)
    pub template: String,

    /// Data the template renders against
    #[serde(default)]
    pub context: serde_json::Value,

    /// Rendered HTML body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl TemplateMail {
    /// Create a mail for `template` with an empty context
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            context: serde_json::Value::Object(serde_json::Map::new()),
            html: None,
        }
    }

    /// Set the template context
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    /// Check if the HTML body has been rendered
    pub fn is_rendered(&self) -> bool {
        self.html.is_some()
    }
}
