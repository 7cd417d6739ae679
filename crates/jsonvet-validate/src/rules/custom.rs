//! Caller-supplied rules, registered under stable identifiers.

use super::{Rule, RuleBinding, RuleKind};
use crate::keywords::Keywords;
use crate::result::ValidationResult;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A validation rule implemented outside this crate.
///
/// ## Example
///
/// ```rust,ignore
/// use jsonvet_validate::prelude::*;
///
/// #[derive(Debug)]
/// struct TwoChars;
///
/// impl CustomRule for TwoChars {
///     fn validate(&self, value: Option<&Value>, ctx: &mut RuleContext<'_>) -> ValidationResult {
///         match value.and_then(Value::as_str) {
///             Some(s) if s.chars().count() != 2 => ctx.fail("TwoChars.length"),
///             _ => ValidationResult::success(),
///         }
///     }
/// }
///
/// let registry = RuleRegistry::new().with("two_chars", TwoChars);
/// ```
pub trait CustomRule: Send + Sync + fmt::Debug {
    /// Validate `value` (`None` when the key is absent).
    fn validate(&self, value: Option<&Value>, ctx: &mut RuleContext<'_>) -> ValidationResult;
}

/// What a custom rule sees besides the value: the keyword context and the
/// message bundle it is bound to.
pub struct RuleContext<'a> {
    keywords: &'a mut Keywords,
    binding: &'a RuleBinding,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(keywords: &'a mut Keywords, binding: &'a RuleBinding) -> Self {
        Self { keywords, binding }
    }

    /// Current keyword context.
    pub fn keywords(&self) -> &Keywords {
        &*self.keywords
    }

    /// Add a token for message rendering.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.keywords.insert(key, value);
    }

    /// Rendered message for `key`, honouring the rule's override message.
    pub fn message(&self, key: &str) -> String {
        self.keywords.render(&self.binding.template(key))
    }

    /// Failing result with the rendered message for `key`.
    pub fn fail(&self, key: &str) -> ValidationResult {
        self.binding.fail(key, &*self.keywords)
    }
}

/// Adapts a closure into a [`CustomRule`].
pub struct FnRule<F> {
    f: F,
}

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule").finish_non_exhaustive()
    }
}

impl<F> CustomRule for FnRule<F>
where
    F: Fn(Option<&Value>, &mut RuleContext<'_>) -> ValidationResult + Send + Sync,
{
    fn validate(&self, value: Option<&Value>, ctx: &mut RuleContext<'_>) -> ValidationResult {
        (self.f)(value, ctx)
    }
}

/// Wrap a closure as a custom rule.
pub fn rule_fn<F>(f: F) -> FnRule<F>
where
    F: Fn(Option<&Value>, &mut RuleContext<'_>) -> ValidationResult + Send + Sync,
{
    FnRule { f }
}

/// Custom rules by identifier.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Arc<dyn CustomRule>>,
}

impl RuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rule` under `id`, replacing any previous registration.
    pub fn register(&mut self, id: impl Into<String>, rule: impl CustomRule + 'static) {
        self.rules.insert(id.into(), Arc::new(rule));
    }

    /// Builder form of [`RuleRegistry::register`].
    pub fn with(mut self, id: impl Into<String>, rule: impl CustomRule + 'static) -> Self {
        self.register(id, rule);
        self
    }

    /// Rule registered under `id`.
    pub fn get(&self, id: &str) -> Option<Arc<dyn CustomRule>> {
        self.rules.get(id).cloned()
    }

    /// `true` if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.rules.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// A registered custom rule bound to one field.
#[derive(Debug, Clone)]
pub struct CustomRuleInstance {
    id: String,
    rule: Arc<dyn CustomRule>,
    binding: RuleBinding,
}

impl CustomRuleInstance {
    pub fn new(id: impl Into<String>, rule: Arc<dyn CustomRule>, binding: RuleBinding) -> Self {
        Self {
            id: id.into(),
            rule,
            binding,
        }
    }

    /// Identifier the rule was registered under.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Rule for CustomRuleInstance {
    fn kind(&self) -> RuleKind {
        RuleKind::Custom
    }

    fn code(&self) -> String {
        format!("custom:{}", self.id)
    }

    fn order(&self) -> i32 {
        self.binding.order_value()
    }

    fn validate(&self, value: Option<&Value>, keywords: &mut Keywords) -> ValidationResult {
        self.binding.bind_name(keywords);
        let mut ctx = RuleContext::new(keywords, &self.binding);
        self.rule.validate(value, &mut ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{MessageBundle, ResourceBundle, StaticResources, MESSAGE_BUNDLE};
    use serde_json::json;

    fn binding() -> RuleBinding {
        RuleBinding::new(Arc::new(MessageBundle::from_bundle(
            ResourceBundle::new(
                MESSAGE_BUNDLE,
                StaticResources::new().with(
                    "messages",
                    None,
                    "TwoChars.length",
                    "${name} must be two characters, got ${length}",
                ),
            )
            .with_default_locale(None),
        )))
    }

    fn two_chars() -> impl CustomRule {
        rule_fn(|value, ctx| match value.and_then(Value::as_str) {
            Some(s) if s.chars().count() != 2 => {
                ctx.insert("length", s.chars().count());
                ctx.fail("TwoChars.length")
            }
            _ => ValidationResult::success(),
        })
    }

    #[test]
    fn registry_lookup() {
        let registry = RuleRegistry::new()
            .with("two_chars", two_chars())
            .with("always", rule_fn(|_, _| ValidationResult::success()));
        assert!(registry.contains("two_chars"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.ids(), vec!["always", "two_chars"]);
    }

    #[test]
    fn instance_renders_through_bound_bundle() {
        let registry = RuleRegistry::new().with("two_chars", two_chars());
        let rule = CustomRuleInstance::new(
            "two_chars",
            registry.get("two_chars").unwrap(),
            binding().order(3),
        );
        assert_eq!(rule.order(), 3);
        assert_eq!(rule.code(), "custom:two_chars");

        let value = json!("abc");
        let mut keywords = Keywords::for_field("aaaa", Some(&value), "/aaaa");
        let result = rule.validate(Some(&value), &mut keywords);
        assert_eq!(
            result.message(),
            Some("aaaa must be two characters, got 3")
        );

        let value = json!("ab");
        let mut keywords = Keywords::for_field("aaaa", Some(&value), "/aaaa");
        assert!(rule.validate(Some(&value), &mut keywords).is_ok());
    }

    #[test]
    fn context_message_uses_override() {
        let binding = binding().message(Some("bad ${name}".to_string()));
        let mut keywords = Keywords::new().with("name", "code");
        let ctx = RuleContext::new(&mut keywords, &binding);
        assert_eq!(ctx.message("TwoChars.length"), "bad code");
    }
}
