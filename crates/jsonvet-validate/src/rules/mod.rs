//! Validation rules.
//!
//! Every rule reports its execution order and validates one field value.
//! `None` means the key is absent from the object; `Some(Value::Null)` means
//! it is present but null. Content rules pass on both; presence and
//! nullness are the job of [`RequiredRule`] and [`NotNullRule`].

mod builtin;
mod custom;
pub mod pattern;

pub use builtin::{
    MaximumRule, MinimumRule, NotEmptyRule, NotNullRule, PatternRule, RangeRule, RequiredRule,
};
pub use custom::{rule_fn, CustomRule, CustomRuleInstance, FnRule, RuleContext, RuleRegistry};

use crate::bundle::{Locale, MessageBundle};
use crate::keywords::Keywords;
use crate::result::ValidationResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Execution order used when a rule spec names none.
pub const DEFAULT_ORDER: i32 = 1;

/// The kind of a rule, also the prefix of its message keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    NotNull,
    NotEmpty,
    Minimum,
    Maximum,
    Range,
    Pattern,
    Custom,
}

impl RuleKind {
    /// Short code used in failure records.
    pub fn code(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::NotNull => "not_null",
            RuleKind::NotEmpty => "not_empty",
            RuleKind::Minimum => "minimum",
            RuleKind::Maximum => "maximum",
            RuleKind::Range => "range",
            RuleKind::Pattern => "pattern",
            RuleKind::Custom => "custom",
        }
    }

    /// Prefix of this rule's message keys (`Minimum` in `Minimum.limit`).
    pub fn message_prefix(&self) -> &'static str {
        match self {
            RuleKind::Required => "Required",
            RuleKind::NotNull => "NotNull",
            RuleKind::NotEmpty => "NotEmpty",
            RuleKind::Minimum => "Minimum",
            RuleKind::Maximum => "Maximum",
            RuleKind::Range => "Range",
            RuleKind::Pattern => "Pattern",
            RuleKind::Custom => "Custom",
        }
    }

    /// Full message key for `suffix`, e.g. `Range.limit.minimum`.
    pub fn message_key(&self, suffix: &str) -> String {
        format!("{}.{}", self.message_prefix(), suffix)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A runtime rule bound to one field.
pub trait Rule: Send + Sync + fmt::Debug {
    /// What kind of rule this is.
    fn kind(&self) -> RuleKind;

    /// Code recorded on failures.
    fn code(&self) -> String {
        self.kind().code().to_string()
    }

    /// Execution order; lower runs first.
    fn order(&self) -> i32;

    /// Validate `value` (`None` when the key is absent).
    ///
    /// Rules may add tokens to `keywords` before rendering their message.
    fn validate(&self, value: Option<&Value>, keywords: &mut Keywords) -> ValidationResult;
}

/// What every rule instance is bound to: its order, override message,
/// the field's display name and the message bundle.
#[derive(Debug, Clone)]
pub struct RuleBinding {
    order: i32,
    message: Option<String>,
    name: Option<String>,
    messages: Arc<MessageBundle>,
    locale: Option<Locale>,
}

impl RuleBinding {
    /// Bind to `messages` with the default order and no override.
    pub fn new(messages: Arc<MessageBundle>) -> Self {
        Self {
            order: DEFAULT_ORDER,
            message: None,
            name: None,
            messages,
            locale: None,
        }
    }

    /// Set the execution order.
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Use `message` instead of any bundle lookup.
    pub fn message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    /// Display name of the field.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Locale for message lookups; `None` uses the bundle default.
    pub fn locale(mut self, locale: Option<Locale>) -> Self {
        self.locale = locale;
        self
    }

    pub(crate) fn order_value(&self) -> i32 {
        self.order
    }

    /// Put the bound display name into `keywords`.
    pub(crate) fn bind_name(&self, keywords: &mut Keywords) {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            keywords.insert("name", name);
        }
    }

    /// Message template for `key`: the override, else the bundle, else a
    /// placeholder naming the key.
    pub fn template(&self, key: &str) -> String {
        if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            return message.to_string();
        }
        match self
            .messages
            .get(key, self.locale.as_ref())
            .filter(|m| !m.is_empty())
        {
            Some(message) => message,
            None => format!("Undefined validation error message.[{key}]"),
        }
    }

    /// Failing result with the rendered message for `key`.
    pub fn fail(&self, key: &str, keywords: &Keywords) -> ValidationResult {
        ValidationResult::error(keywords.render(&self.template(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{BuiltinResources, ResourceBundle, StaticResources, MESSAGE_BUNDLE};

    fn messages(provider: StaticResources) -> Arc<MessageBundle> {
        Arc::new(MessageBundle::from_bundle(
            ResourceBundle::new(MESSAGE_BUNDLE, provider).with_default_locale(None),
        ))
    }

    #[test]
    fn override_message_wins() {
        let binding = RuleBinding::new(messages(
            StaticResources::new().with("messages", None, "Required.required", "bundle"),
        ))
        .message(Some("override for ${name}".to_string()));

        let keywords = Keywords::new().with("name", "age");
        let result = binding.fail("Required.required", &keywords);
        assert_eq!(result.message(), Some("override for age"));
    }

    #[test]
    fn empty_override_falls_back_to_bundle() {
        let binding = RuleBinding::new(messages(
            StaticResources::new().with("messages", None, "Required.required", "bundle"),
        ))
        .message(Some(String::new()));
        assert_eq!(binding.template("Required.required"), "bundle");
    }

    #[test]
    fn missing_message_uses_placeholder() {
        let binding = RuleBinding::new(messages(StaticResources::new()));
        assert_eq!(
            binding.template("Pattern.match"),
            "Undefined validation error message.[Pattern.match]"
        );
    }

    #[test]
    fn locale_is_passed_to_the_bundle() {
        let bundle = Arc::new(MessageBundle::from_bundle(
            ResourceBundle::new(MESSAGE_BUNDLE, BuiltinResources).with_default_locale(None),
        ));
        let binding = RuleBinding::new(bundle).locale(Some(Locale::new("ja")));
        assert_eq!(binding.template("Required.required"), "${name}は必須です。");
    }

    #[test]
    fn bound_name_replaces_keyword() {
        let binding = RuleBinding::new(messages(StaticResources::new())).name("User name");
        let mut keywords = Keywords::new().with("name", "name");
        binding.bind_name(&mut keywords);
        assert_eq!(keywords.get("name"), Some(&Value::from("User name")));
    }

    #[test]
    fn kind_codes() {
        assert_eq!(RuleKind::NotEmpty.code(), "not_empty");
        assert_eq!(RuleKind::NotEmpty.message_prefix(), "NotEmpty");
        assert_eq!(
            RuleKind::Range.message_key("limit.minimum"),
            "Range.limit.minimum"
        );
        assert_eq!(RuleKind::Range.to_string(), "range");
    }
}
