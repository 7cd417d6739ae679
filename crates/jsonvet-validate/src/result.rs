//! Outcome of a single rule evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pass/fail outcome of one rule.
///
/// A successful result never carries a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ValidationResult {
    /// A passing result.
    pub fn success() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    /// A failing result with the rendered message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }

    /// Whether the rule passed.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// The failure message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Consume the result, returning the failure message.
    pub fn into_message(self) -> Option<String> {
        self.message
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            _ if self.ok => f.write_str("ok"),
            Some(message) => f.write_str(message),
            None => f.write_str("failed"),
        }
    }
}
