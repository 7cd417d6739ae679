//! The built-in rules.

use super::{pattern, Rule, RuleBinding, RuleKind};
use crate::keywords::{number_value, Keywords};
use crate::result::ValidationResult;
use serde_json::Value;

/// The key must be present in the object.
///
/// The engine checks presence against the object itself; called directly,
/// the rule fails only for an absent value.
#[derive(Debug, Clone)]
pub struct RequiredRule {
    binding: RuleBinding,
}

impl RequiredRule {
    pub fn new(binding: RuleBinding) -> Self {
        Self { binding }
    }
}

impl Rule for RequiredRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Required
    }

    fn order(&self) -> i32 {
        self.binding.order_value()
    }

    fn validate(&self, value: Option<&Value>, keywords: &mut Keywords) -> ValidationResult {
        self.binding.bind_name(keywords);
        match value {
            None => self.binding.fail(&self.kind().message_key("required"), keywords),
            Some(_) => ValidationResult::success(),
        }
    }
}

/// The value must not be null.
#[derive(Debug, Clone)]
pub struct NotNullRule {
    binding: RuleBinding,
}

impl NotNullRule {
    pub fn new(binding: RuleBinding) -> Self {
        Self { binding }
    }
}

impl Rule for NotNullRule {
    fn kind(&self) -> RuleKind {
        RuleKind::NotNull
    }

    fn order(&self) -> i32 {
        self.binding.order_value()
    }

    fn validate(&self, value: Option<&Value>, keywords: &mut Keywords) -> ValidationResult {
        self.binding.bind_name(keywords);
        match value {
            Some(Value::Null) => self.binding.fail(&self.kind().message_key("null"), keywords),
            _ => ValidationResult::success(),
        }
    }
}

/// Strings, lists and objects must not be empty.
#[derive(Debug, Clone)]
pub struct NotEmptyRule {
    binding: RuleBinding,
}

impl NotEmptyRule {
    pub fn new(binding: RuleBinding) -> Self {
        Self { binding }
    }
}

impl Rule for NotEmptyRule {
    fn kind(&self) -> RuleKind {
        RuleKind::NotEmpty
    }

    fn order(&self) -> i32 {
        self.binding.order_value()
    }

    fn validate(&self, value: Option<&Value>, keywords: &mut Keywords) -> ValidationResult {
        self.binding.bind_name(keywords);
        match value {
            Some(Value::String(s)) if s.is_empty() => {
                self.binding.fail(&self.kind().message_key("string"), keywords)
            }
            Some(Value::Array(items)) if items.is_empty() => {
                self.binding.fail(&self.kind().message_key("list"), keywords)
            }
            Some(Value::Object(map)) if map.is_empty() => {
                self.binding.fail(&self.kind().message_key("map"), keywords)
            }
            _ => ValidationResult::success(),
        }
    }
}

/// Numbers must be at least `minimum`.
#[derive(Debug, Clone)]
pub struct MinimumRule {
    minimum: f64,
    binding: RuleBinding,
}

impl MinimumRule {
    pub fn new(minimum: f64, binding: RuleBinding) -> Self {
        Self { minimum, binding }
    }
}

impl Rule for MinimumRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Minimum
    }

    fn order(&self) -> i32 {
        self.binding.order_value()
    }

    fn validate(&self, value: Option<&Value>, keywords: &mut Keywords) -> ValidationResult {
        self.binding.bind_name(keywords);
        keywords.insert("minimum", number_value(self.minimum));

        let Some(value) = present(value) else {
            return ValidationResult::success();
        };
        match value.as_f64() {
            None => self.binding.fail(&self.kind().message_key("format"), keywords),
            Some(n) if n < self.minimum => self.binding.fail(&self.kind().message_key("limit"), keywords),
            Some(_) => ValidationResult::success(),
        }
    }
}

/// Numbers must be at most `maximum`.
#[derive(Debug, Clone)]
pub struct MaximumRule {
    maximum: f64,
    binding: RuleBinding,
}

impl MaximumRule {
    pub fn new(maximum: f64, binding: RuleBinding) -> Self {
        Self { maximum, binding }
    }
}

impl Rule for MaximumRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Maximum
    }

    fn order(&self) -> i32 {
        self.binding.order_value()
    }

    fn validate(&self, value: Option<&Value>, keywords: &mut Keywords) -> ValidationResult {
        self.binding.bind_name(keywords);
        keywords.insert("maximum", number_value(self.maximum));

        let Some(value) = present(value) else {
            return ValidationResult::success();
        };
        match value.as_f64() {
            None => self.binding.fail(&self.kind().message_key("format"), keywords),
            Some(n) if n > self.maximum => self.binding.fail(&self.kind().message_key("limit"), keywords),
            Some(_) => ValidationResult::success(),
        }
    }
}

/// Numbers must lie within `[min, max]`.
#[derive(Debug, Clone)]
pub struct RangeRule {
    min: f64,
    max: f64,
    binding: RuleBinding,
}

impl RangeRule {
    pub fn new(min: f64, max: f64, binding: RuleBinding) -> Self {
        Self { min, max, binding }
    }
}

impl Rule for RangeRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Range
    }

    fn order(&self) -> i32 {
        self.binding.order_value()
    }

    fn validate(&self, value: Option<&Value>, keywords: &mut Keywords) -> ValidationResult {
        self.binding.bind_name(keywords);
        keywords.insert("minimum", number_value(self.min));
        keywords.insert("maximum", number_value(self.max));

        let Some(value) = present(value) else {
            return ValidationResult::success();
        };
        match value.as_f64() {
            None => self.binding.fail(&self.kind().message_key("format"), keywords),
            Some(n) if n < self.min => self.binding.fail(&self.kind().message_key("limit.minimum"), keywords),
            Some(n) if n > self.max => self.binding.fail(&self.kind().message_key("limit.maximum"), keywords),
            Some(_) => ValidationResult::success(),
        }
    }
}

/// Strings must match `pattern` in full.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: String,
    binding: RuleBinding,
}

impl PatternRule {
    pub fn new(pattern: impl Into<String>, binding: RuleBinding) -> Self {
        Self {
            pattern: pattern.into(),
            binding,
        }
    }
}

impl Rule for PatternRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Pattern
    }

    fn order(&self) -> i32 {
        self.binding.order_value()
    }

    fn validate(&self, value: Option<&Value>, keywords: &mut Keywords) -> ValidationResult {
        self.binding.bind_name(keywords);
        keywords.insert("pattern", self.pattern.as_str());

        let Some(value) = present(value) else {
            return ValidationResult::success();
        };
        let Some(text) = value.as_str() else {
            return self.binding.fail(&self.kind().message_key("format"), keywords);
        };

        match pattern::full_match(&self.pattern, text) {
            Ok(true) => ValidationResult::success(),
            Ok(false) => self.binding.fail(&self.kind().message_key("match"), keywords),
            Err(e) => {
                tracing::error!(pattern = %self.pattern, error = %e, "invalid validation pattern");
                ValidationResult::error(format!(
                    "Validation error occurred.[invalid pattern `{}`]",
                    self.pattern
                ))
            }
        }
    }
}

/// Present and non-null.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{BuiltinResources, MessageBundle, ResourceBundle, MESSAGE_BUNDLE};
    use serde_json::json;
    use std::sync::Arc;

    fn binding() -> RuleBinding {
        RuleBinding::new(Arc::new(MessageBundle::from_bundle(
            ResourceBundle::new(MESSAGE_BUNDLE, BuiltinResources).with_default_locale(None),
        )))
    }

    fn run(rule: &dyn Rule, value: Option<Value>) -> ValidationResult {
        let mut keywords = Keywords::for_field("age", value.as_ref(), "/age");
        rule.validate(value.as_ref(), &mut keywords)
    }

    #[test]
    fn required_fails_only_when_absent() {
        let rule = RequiredRule::new(binding());
        assert_eq!(
            run(&rule, None).message(),
            Some("age is required.")
        );
        assert!(run(&rule, Some(Value::Null)).is_ok());
        assert!(run(&rule, Some(json!(""))).is_ok());
    }

    #[test]
    fn not_null_fails_only_on_null() {
        let rule = NotNullRule::new(binding());
        assert_eq!(
            run(&rule, Some(Value::Null)).message(),
            Some("age must not be null.")
        );
        assert!(run(&rule, None).is_ok());
        assert!(run(&rule, Some(json!(0))).is_ok());
    }

    #[test]
    fn not_empty_checks_strings_lists_and_objects() {
        let rule = NotEmptyRule::new(binding());
        assert_eq!(
            run(&rule, Some(json!(""))).message(),
            Some("age must not be an empty string.")
        );
        assert_eq!(
            run(&rule, Some(json!([]))).message(),
            Some("age must not be an empty list.")
        );
        assert_eq!(
            run(&rule, Some(json!({}))).message(),
            Some("age must not be an empty object.")
        );
        assert!(run(&rule, Some(json!("x"))).is_ok());
        assert!(run(&rule, Some(json!([1]))).is_ok());
        assert!(run(&rule, Some(json!({"a": 1}))).is_ok());
        assert!(run(&rule, Some(json!(0))).is_ok());
        assert!(run(&rule, Some(Value::Null)).is_ok());
        assert!(run(&rule, None).is_ok());
    }

    #[test]
    fn minimum_distinguishes_format_and_limit() {
        let rule = MinimumRule::new(18.0, binding());
        assert_eq!(
            run(&rule, Some(json!(17))).message(),
            Some("age must be greater than or equal to 18.")
        );
        assert_eq!(
            run(&rule, Some(json!("18"))).message(),
            Some("age must be a number.")
        );
        assert!(run(&rule, Some(json!(18))).is_ok());
        assert!(run(&rule, Some(json!(18.5))).is_ok());
        assert!(run(&rule, None).is_ok());
        assert!(run(&rule, Some(Value::Null)).is_ok());
    }

    #[test]
    fn maximum_distinguishes_format_and_limit() {
        let rule = MaximumRule::new(120.0, binding());
        assert_eq!(
            run(&rule, Some(json!(121))).message(),
            Some("age must be less than or equal to 120.")
        );
        assert_eq!(
            run(&rule, Some(json!(true))).message(),
            Some("age must be a number.")
        );
        assert!(run(&rule, Some(json!(120))).is_ok());
        assert!(run(&rule, None).is_ok());
    }

    #[test]
    fn range_checks_both_bounds() {
        let rule = RangeRule::new(0.0, 10.5, binding());
        assert_eq!(
            run(&rule, Some(json!(-1))).message(),
            Some("age must be between 0 and 10.5.")
        );
        assert_eq!(
            run(&rule, Some(json!(11))).message(),
            Some("age must be between 0 and 10.5.")
        );
        assert_eq!(
            run(&rule, Some(json!([1]))).message(),
            Some("age must be a number.")
        );
        assert!(run(&rule, Some(json!(0))).is_ok());
        assert!(run(&rule, Some(json!(10.5))).is_ok());
        assert!(run(&rule, Some(Value::Null)).is_ok());
    }

    #[test]
    fn range_limit_keys_differ_per_side() {
        let bundle = crate::bundle::StaticResources::new()
            .with("messages", None, "Range.limit.minimum", "too small")
            .with("messages", None, "Range.limit.maximum", "too large");
        let rule = RangeRule::new(
            1.0,
            2.0,
            RuleBinding::new(Arc::new(MessageBundle::from_bundle(
                ResourceBundle::new(MESSAGE_BUNDLE, bundle).with_default_locale(None),
            ))),
        );
        assert_eq!(run(&rule, Some(json!(0))).message(), Some("too small"));
        assert_eq!(run(&rule, Some(json!(3))).message(), Some("too large"));
    }

    #[test]
    fn pattern_requires_full_match() {
        let rule = PatternRule::new("[A-Z]+", binding());
        assert!(run(&rule, Some(json!("ABC"))).is_ok());
        assert_eq!(
            run(&rule, Some(json!("xABC"))).message(),
            Some("age does not match the pattern [A-Z]+.")
        );
        assert_eq!(
            run(&rule, Some(json!(12))).message(),
            Some("age must be a string.")
        );
        assert!(run(&rule, None).is_ok());
        assert!(run(&rule, Some(Value::Null)).is_ok());
    }

    #[test]
    fn invalid_pattern_fails_with_diagnostic() {
        let rule = PatternRule::new("(oops", binding());
        let result = run(&rule, Some(json!("x")));
        assert!(!result.is_ok());
        assert!(result
            .message()
            .unwrap()
            .starts_with("Validation error occurred."));
    }

    #[test]
    fn override_message_is_rendered_with_rule_tokens() {
        let rule = MinimumRule::new(
            3.0,
            binding().message(Some("${name} needs ${minimum} or more".to_string())),
        );
        assert_eq!(
            run(&rule, Some(json!(1))).message(),
            Some("age needs 3 or more")
        );
    }

    #[test]
    fn bound_display_name_is_used() {
        let rule = RequiredRule::new(binding().name("Age"));
        assert_eq!(run(&rule, None).message(), Some("Age is required."));
    }
}
