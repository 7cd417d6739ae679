//! # jsonvet validation core
//!
//! Validates decoded JSON against a schema of types, fields and ordered
//! rule pipelines, producing localized failure messages.
//!
//! ## Example
//!
//! ```rust,ignore
//! use jsonvet_validate::prelude::*;
//!
//! let schema = Schema::new()
//!     .with_type(
//!         TypeDescriptor::new("UserDto").field(
//!             FieldDescriptor::new("name")
//!                 .rule(RuleSpec::required().order(1))
//!                 .rule(RuleSpec::not_empty().order(2)),
//!         ),
//!     );
//!
//! let report = Validator::new().validate_str(r#"{"name": ""}"#, &schema, "UserDto");
//! assert_eq!(report.failures()[0].path, "/name");
//! ```
//!
//! ## Rules
//!
//! - `required` - key must be present (null counts as present)
//! - `not_null` - value must not be null
//! - `not_empty` - string, list or object must not be empty
//! - `minimum` / `maximum` / `range` - numeric bounds, inclusive
//! - `pattern` - full-match regular expression
//! - `custom` - rules registered by id on the [`Validator`]
//!
//! ## Messages
//!
//! Failure messages come from the `messages` bundle, keyed by rule and
//! outcome (`Required.required`, `Minimum.limit`, `Pattern.match`, ...),
//! and are rendered with `${name}`, `${value}`, `${path}` and the
//! rule's own tokens.

pub mod bundle;
mod config;
mod engine;
mod error;
mod keywords;
mod resolver;
mod result;
pub mod rules;
pub mod schema;

pub use bundle::{LabelBundle, Locale, MessageBundle, ResourceProvider};
pub use config::{
    ConfigError, ValidatorConfig, ENV_LABEL_BUNDLE, ENV_LOCALE, ENV_MESSAGE_BUNDLE,
    ENV_RESOURCE_DIR,
};
pub use engine::{Validator, ValidatorBuilder};
pub use error::{DecodeError, SchemaError, ValidationFailure, ValidationReport};
pub use keywords::Keywords;
pub use resolver::{ResolvedField, Resolver};
pub use result::ValidationResult;
pub use rules::{CustomRule, Rule, RuleContext, RuleKind, RuleRegistry};
pub use schema::{
    Constraint, Describe, FieldDescriptor, RuleSpec, Schema, SchemaLoadError, TypeDescriptor,
};


/// Prelude module for validation
pub mod prelude {
    pub use crate::bundle::{
        BuiltinResources, ChainedResources, DirectoryResources, Locale, StaticResources,
    };
    pub use crate::config::ValidatorConfig;
    pub use crate::engine::Validator;
    pub use crate::error::{ValidationFailure, ValidationReport};
    pub use crate::result::ValidationResult;
    pub use crate::rules::{rule_fn, CustomRule, RuleContext, RuleRegistry};
    pub use crate::schema::{Describe, FieldDescriptor, RuleSpec, Schema, TypeDescriptor};
    pub use serde_json::Value;
}
