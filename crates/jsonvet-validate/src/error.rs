//! Failure records, schema diagnostics and the report returned by a validation call.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Location of the field, e.g. `/users[0]/name`
    pub path: String,
    /// Display name of the field (label, bound name or JSON key)
    pub name: String,
    /// Code of the rule that failed (e.g. "required", "pattern", "custom:two_chars")
    pub rule: String,
    /// Rendered, localized message
    pub message: String,
}

impl ValidationFailure {
    /// Create a new failure record.
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.path, self.rule, self.message)
    }
}

/// The raw input could not be decoded into a JSON tree.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("malformed input at line {line}, column {column}: {message}")]
pub struct DecodeError {
    /// Decoder message
    pub message: String,
    /// 1-based line of the error (0 when unknown)
    pub line: usize,
    /// 1-based column of the error (0 when unknown)
    pub column: usize,
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

/// A schema reference that could not be resolved during a walk.
///
/// These never abort validation; the affected step is skipped and the
/// error is recorded on the report.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaError {
    /// The requested root type is not registered.
    #[error("unknown type `{name}`")]
    UnknownType { name: String },

    /// A type names a parent that is not registered.
    #[error("type `{type_name}` declares unknown parent `{parent}`")]
    UnknownParent { type_name: String, parent: String },

    /// The parent chain of a type loops back on itself.
    #[error("parent chain of `{type_name}` is cyclic")]
    ParentCycle { type_name: String },

    /// A field's declared (element) type is not registered.
    #[error("field at `{path}` declares unknown type `{type_name}`")]
    UnknownElementType { path: String, type_name: String },

    /// A custom rule identifier has no registered implementation.
    #[error("field `{field}` references unregistered custom rule `{rule}`")]
    UnknownCustomRule { field: String, rule: String },
}

/// Everything a validation call found.
///
/// Failures are kept in traversal order, so validating the same data
/// against the same schema always yields the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Field-level failures in walk order
    pub failures: Vec<ValidationFailure>,
    /// Unresolved schema references that caused steps to be skipped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<SchemaError>,
    /// Set when raw input could not be decoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<DecodeError>,
}

impl ValidationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report for input that failed to decode.
    pub fn malformed(error: DecodeError) -> Self {
        Self {
            decode_error: Some(error),
            ..Self::default()
        }
    }

    /// `true` when the input decoded and no rule failed.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty() && self.decode_error.is_none()
    }

    /// Failures in walk order.
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// Schema diagnostics collected during the walk.
    pub fn diagnostics(&self) -> &[SchemaError] {
        &self.diagnostics
    }

    /// The decode error, if the input was malformed.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        self.decode_error.as_ref()
    }

    /// Number of failures.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// `true` when there are no failures.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures recorded for one path.
    pub fn at(&self, path: &str) -> Vec<&ValidationFailure> {
        self.failures.iter().filter(|f| f.path == path).collect()
    }

    /// Consume the report, keeping only the failures.
    pub fn into_failures(self) -> Vec<ValidationFailure> {
        self.failures
    }

    /// Ok if valid, Err with the report otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub(crate) fn push(&mut self, failure: ValidationFailure) {
        self.failures.push(failure);
    }

    pub(crate) fn diagnose(&mut self, error: SchemaError) {
        if !self.diagnostics.contains(&error) {
            self.diagnostics.push(error);
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(err) = &self.decode_error {
            return write!(f, "Validation skipped: {}", err);
        }
        write!(f, "Validation failed: {} field error(s)", self.failures.len())
    }
}

impl IntoIterator for ValidationReport {
    type Item = ValidationFailure;
    type IntoIter = std::vec::IntoIter<ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a ValidationFailure;
    type IntoIter = std::slice::Iter<'a, ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}
