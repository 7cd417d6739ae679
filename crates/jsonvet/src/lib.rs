//! # jsonvet
//!
//! Validate JSON documents against schemas declared on Rust types.
//!
//! Each field carries an ordered pipeline of rules. The validator walks the
//! decoded document in step with the schema, stops a field's pipeline at
//! its first failure, recurses into nested objects and lists of objects,
//! and collects every failure with a localized message.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jsonvet::prelude::*;
//!
//! #[derive(Deserialize, Schema)]
//! struct UserListResponse {
//!     #[vet(required)]
//!     result: bool,
//!
//!     #[vet(required(order = 1), not_null(order = 2), not_empty(order = 3))]
//!     users: Vec<UserDto>,
//! }
//!
//! #[derive(Deserialize, Schema)]
//! struct UserDto {
//!     #[vet(required, not_null(order = 2), not_empty(order = 3))]
//!     name: String,
//! }
//!
//! let report = Validator::new()
//!     .validate_str_as::<UserListResponse>(r#"{"result":true,"users":[{"aaaa":"aa"}]}"#);
//!
//! assert_eq!(report.failures()[0].path, "/users[0]/name");
//! ```
//!
//! ## Features
//!
//! - **Declarative**: rules on fields with `#[vet(...)]`, or schemas loaded from JSON/TOML
//! - **Ordered**: explicit rule order per field, first failure wins
//! - **Localized**: message and label bundles with per-language tables and fallback
//! - **Extensible**: custom rules registered by id

// Re-export core functionality
pub use jsonvet_validate::*;

// Re-export macros
pub use jsonvet_macros::*;

// Re-export commonly used types
pub use serde;
pub use serde_json;

/// Prelude module - import everything you need with `use jsonvet::prelude::*`
pub mod prelude {
    // derive macro and registry type share the name, in separate namespaces
    pub use jsonvet_macros::Schema;
    pub use jsonvet_validate::prelude::*;
    pub use jsonvet_validate::Schema;
    pub use jsonvet_validate::{Keywords, RuleKind, SchemaError};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::json;
}
