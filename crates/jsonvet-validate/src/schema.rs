//! Schema metadata: types, fields and the rules attached to them.
//!
//! A [`Schema`] is a registry of [`TypeDescriptor`]s by name. Parents and
//! field element types are referenced by name and resolved through the
//! registry at validation time, so types may refer to themselves or to
//! each other.
//!
//! Schemas can be built three ways:
//!
//! - with `#[derive(Schema)]` from the `jsonvet` crate ([`Describe`]);
//! - with the builder methods on the descriptor types;
//! - from a JSON or TOML document ([`Schema::from_json`], [`Schema::from_toml`]).
//!
//! ## Example
//!
//! ```rust,ignore
//! use jsonvet_validate::schema::*;
//!
//! let schema = Schema::new()
//!     .with_type(
//!         TypeDescriptor::new("UserDto").field(
//!             FieldDescriptor::new("name")
//!                 .label("UserName")
//!                 .rule(RuleSpec::required().order(1))
//!                 .rule(RuleSpec::not_empty().order(2)),
//!         ),
//!     );
//! ```

use crate::error::SchemaError;
use crate::rules::{RuleKind, DEFAULT_ORDER};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// The check a rule spec configures, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// Key must be present
    Required,
    /// Value must not be null
    NotNull,
    /// String, list or object must not be empty
    NotEmpty,
    /// Number must be at least `value`
    Minimum { value: f64 },
    /// Number must be at most `value`
    Maximum { value: f64 },
    /// Number must lie within `[min, max]`
    Range { min: f64, max: f64 },
    /// String must match `regex` in full
    Pattern { regex: String },
    /// Registered custom rules, run in the listed order
    Custom { rules: Vec<String> },
}

impl Constraint {
    /// Kind of rule this constraint produces.
    pub fn kind(&self) -> RuleKind {
        match self {
            Constraint::Required => RuleKind::Required,
            Constraint::NotNull => RuleKind::NotNull,
            Constraint::NotEmpty => RuleKind::NotEmpty,
            Constraint::Minimum { .. } => RuleKind::Minimum,
            Constraint::Maximum { .. } => RuleKind::Maximum,
            Constraint::Range { .. } => RuleKind::Range,
            Constraint::Pattern { .. } => RuleKind::Pattern,
            Constraint::Custom { .. } => RuleKind::Custom,
        }
    }
}

fn default_order() -> i32 {
    DEFAULT_ORDER
}

/// Declarative configuration of one rule on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// What to check
    #[serde(flatten)]
    pub constraint: Constraint,
    /// Execution order, ascending; ties keep declaration order
    #[serde(default = "default_order")]
    pub order: i32,
    /// Message used instead of the bundle lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RuleSpec {
    /// Spec for `constraint` with the default order.
    pub fn new(constraint: Constraint) -> Self {
        Self {
            constraint,
            order: DEFAULT_ORDER,
            message: None,
        }
    }

    pub fn required() -> Self {
        Self::new(Constraint::Required)
    }

    pub fn not_null() -> Self {
        Self::new(Constraint::NotNull)
    }

    pub fn not_empty() -> Self {
        Self::new(Constraint::NotEmpty)
    }

    pub fn minimum(value: f64) -> Self {
        Self::new(Constraint::Minimum { value })
    }

    pub fn maximum(value: f64) -> Self {
        Self::new(Constraint::Maximum { value })
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self::new(Constraint::Range { min, max })
    }

    pub fn pattern(regex: impl Into<String>) -> Self {
        Self::new(Constraint::Pattern {
            regex: regex.into(),
        })
    }

    /// Custom rules by registered identifier.
    pub fn custom<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Constraint::Custom {
            rules: rules.into_iter().map(Into::into).collect(),
        })
    }

    /// Set the execution order.
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Set an override message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Kind of rule this spec produces.
    pub fn kind(&self) -> RuleKind {
        self.constraint.kind()
    }
}

/// Attribute-style rendering, e.g. `range(min = 0, max = 10, order = 2)`.
impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        match &self.constraint {
            Constraint::Minimum { value } | Constraint::Maximum { value } => {
                parts.push(format!("value = {}", value));
            }
            Constraint::Range { min, max } => {
                parts.push(format!("min = {}", min));
                parts.push(format!("max = {}", max));
            }
            Constraint::Pattern { regex } => parts.push(format!("regex = {:?}", regex)),
            Constraint::Custom { rules } => {
                parts.extend(rules.iter().map(|r| format!("rule = {:?}", r)));
            }
            Constraint::Required | Constraint::NotNull | Constraint::NotEmpty => {}
        }
        parts.push(format!("order = {}", self.order));
        if let Some(message) = &self.message {
            parts.push(format!("message = {:?}", message));
        }
        write!(f, "{}({})", self.kind().code(), parts.join(", "))
    }
}

/// One field of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Declared field name
    pub name: String,
    /// Serialization alias; the JSON key when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Declared type of an object field, or element type of a list field
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    /// Label id looked up in the label bundle for the display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Literal display name, used when no label resolves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Rules in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleSpec>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            element_type: None,
            label: None,
            display_name: None,
            rules: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn element_type(mut self, type_name: impl Into<String>) -> Self {
        self.element_type = Some(type_name.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Append a rule.
    pub fn rule(mut self, rule: RuleSpec) -> Self {
        self.rules.push(rule);
        self
    }

    /// JSON key of the field: the alias if set, else the name.
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// One type: its own fields and an optional parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type name, unique within a schema
    pub name: String,
    /// Parent type whose fields are validated first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Fields declared directly on this type, in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
        }
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Append a field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }
}

/// Types that can describe their own schema.
///
/// Implemented by `#[derive(Schema)]`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` has no schema of its own",
    label = "inferred as a nested schema type",
    note = "derive `Schema` for `{Self}`, or mark the field `#[vet(opaque)]` to validate it as a plain value"
)]
pub trait Describe {
    /// Descriptor of this type alone.
    fn type_descriptor() -> TypeDescriptor;

    /// Register this type and every type it references.
    fn register(schema: &mut Schema) {
        let descriptor = Self::type_descriptor();
        if !schema.contains(&descriptor.name) {
            schema.insert(descriptor);
        }
    }

    /// Name this type is registered under.
    fn type_name() -> String {
        Self::type_descriptor().name
    }
}

/// Failure to load a schema document.
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON schema document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML schema document: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported schema file extension for {0} (expected .json or .toml)")]
    UnknownFormat(String),
}

#[derive(Serialize, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    types: Vec<TypeDescriptor>,
}

/// Registry of type descriptors by name, in registration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "SchemaDocument", into = "SchemaDocument")]
pub struct Schema {
    types: Vec<TypeDescriptor>,
    index: HashMap<String, usize>,
}

impl From<SchemaDocument> for Schema {
    fn from(document: SchemaDocument) -> Self {
        let mut schema = Schema::new();
        for descriptor in document.types {
            schema.insert(descriptor);
        }
        schema
    }
}

impl From<Schema> for SchemaDocument {
    fn from(schema: Schema) -> Self {
        SchemaDocument {
            types: schema.types,
        }
    }
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema holding `T` and everything it references.
    pub fn of<T: Describe>() -> Self {
        let mut schema = Self::new();
        T::register(&mut schema);
        schema
    }

    /// Add `T` and everything it references.
    pub fn register<T: Describe>(&mut self) -> &mut Self {
        T::register(self);
        self
    }

    /// Builder form of [`Schema::register`].
    pub fn with<T: Describe>(mut self) -> Self {
        T::register(&mut self);
        self
    }

    /// Add or replace a type descriptor.
    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        match self.index.get(&descriptor.name) {
            Some(&i) => self.types[i] = descriptor,
            None => {
                self.index.insert(descriptor.name.clone(), self.types.len());
                self.types.push(descriptor);
            }
        }
    }

    /// Builder form of [`Schema::insert`].
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Descriptor registered under `name`.
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    /// `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// `true` when no type is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Parse a JSON schema document (`{"types": [...]}`).
    pub fn from_json(source: &str) -> Result<Self, SchemaLoadError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parse a TOML schema document (`[[types]]` tables).
    pub fn from_toml(source: &str) -> Result<Self, SchemaLoadError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a schema document, choosing the format by file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&source),
            Some("toml") => Self::from_toml(&source),
            _ => Err(SchemaLoadError::UnknownFormat(path.display().to_string())),
        }
    }

    /// The type's ancestors, nearest first.
    ///
    /// Stops at an unknown parent or a cycle and reports it.
    pub fn ancestors(&self, name: &str) -> (Vec<&TypeDescriptor>, Option<SchemaError>) {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([name]);
        let mut current = self.get(name);

        while let Some(descriptor) = current {
            let Some(parent) = descriptor.parent.as_deref() else {
                break;
            };
            if !seen.insert(parent) {
                return (
                    chain,
                    Some(SchemaError::ParentCycle {
                        type_name: name.to_string(),
                    }),
                );
            }
            match self.get(parent) {
                Some(p) => {
                    chain.push(p);
                    current = Some(p);
                }
                None => {
                    return (
                        chain,
                        Some(SchemaError::UnknownParent {
                            type_name: descriptor.name.clone(),
                            parent: parent.to_string(),
                        }),
                    )
                }
            }
        }
        (chain, None)
    }

    /// Unresolvable references found without any data: unknown parents,
    /// parent cycles and unknown field types.
    pub fn lint(&self) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        for descriptor in &self.types {
            if let (_, Some(err)) = self.ancestors(&descriptor.name) {
                if !errors.contains(&err) {
                    errors.push(err);
                }
            }
            for field in &descriptor.fields {
                if let Some(type_name) = &field.element_type {
                    if !self.contains(type_name) {
                        errors.push(SchemaError::UnknownElementType {
                            path: format!("{}.{}", descriptor.name, field.name),
                            type_name: type_name.clone(),
                        });
                    }
                }
            }
        }
        errors
    }
}
