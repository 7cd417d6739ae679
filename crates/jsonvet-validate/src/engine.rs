//! The validation walk.
//!
//! A [`Validator`] walks decoded JSON in step with a [`Schema`], running
//! each field's rule pipeline and recursing into nested objects and lists
//! of objects. Failures accumulate over the whole walk; within one field
//! the first failing rule ends the pipeline.

use crate::bundle::{
    BuiltinResources, ChainedResources, DirectoryResources, LabelBundle, Locale, MessageBundle,
    ResourceBundle, ResourceProvider, StaticResources, LABEL_BUNDLE, MESSAGE_BUNDLE,
};
use crate::config::ValidatorConfig;
use crate::error::{DecodeError, SchemaError, ValidationFailure, ValidationReport};
use crate::keywords::Keywords;
use crate::resolver::Resolver;
use crate::result::ValidationResult;
use crate::rules::{CustomRule, Rule, RuleKind, RuleRegistry};
use crate::schema::{Describe, Schema, TypeDescriptor};
use serde_json::{Map, Value};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

/// Validates decoded JSON against a schema.
///
/// Cheap to clone; clones share bundles and their caches.
///
/// ## Example
///
/// ```rust,ignore
/// use jsonvet_validate::prelude::*;
///
/// let validator = Validator::builder().locale("ja").build();
/// let report = validator.validate_str(r#"{"users": []}"#, &schema, "UserListResponse");
/// for failure in &report {
///     println!("{failure}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    messages: Arc<MessageBundle>,
    labels: Arc<LabelBundle>,
    registry: RuleRegistry,
    locale: Option<Locale>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Validator {
    /// Validator with the built-in messages, no labels and the host locale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start configuring a validator.
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    /// Validator wired from `config`.
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Same validator, with `locale` as its default locale.
    pub fn with_locale(&self, locale: impl Into<Locale>) -> Self {
        Self {
            locale: Some(locale.into()),
            ..self.clone()
        }
    }

    /// Default locale; `None` means the host locale.
    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    /// Registered custom rules.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Validate `data` against the type registered as `type_name`.
    pub fn validate(&self, data: &Value, schema: &Schema, type_name: &str) -> ValidationReport {
        let mut walk = Walk {
            schema,
            resolver: Resolver::new(
                &self.messages,
                &self.labels,
                &self.registry,
                self.locale.as_ref(),
            ),
            report: ValidationReport::new(),
        };

        match data {
            Value::Null => tracing::debug!(type_name, "null root, nothing to validate"),
            Value::Object(map) => walk.validate_object(map, type_name, ""),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if let Value::Object(map) = item {
                        walk.validate_object(map, type_name, &format!("[{i}]"));
                    }
                }
            }
            _ => tracing::debug!(type_name, "scalar root, nothing to validate"),
        }

        let report = walk.report;
        tracing::debug!(
            type_name,
            failures = report.failures.len(),
            diagnostics = report.diagnostics.len(),
            "validation finished"
        );
        report
    }

    /// Decode `text` as JSON and validate it.
    ///
    /// Malformed input yields a report with no failures and a decode error.
    pub fn validate_str(&self, text: &str, schema: &Schema, type_name: &str) -> ValidationReport {
        match serde_json::from_str::<Value>(text) {
            Ok(data) => self.validate(&data, schema, type_name),
            Err(e) => {
                let error = DecodeError::from(e);
                tracing::warn!(type_name, error = %error, "input is not valid JSON");
                ValidationReport::malformed(error)
            }
        }
    }

    /// Validate `data` against `T`'s derived schema.
    pub fn validate_as<T: Describe>(&self, data: &Value) -> ValidationReport {
        let schema = Schema::of::<T>();
        self.validate(data, &schema, &T::type_name())
    }

    /// Decode `text` and validate it against `T`'s derived schema.
    pub fn validate_str_as<T: Describe>(&self, text: &str) -> ValidationReport {
        let schema = Schema::of::<T>();
        self.validate_str(text, &schema, &T::type_name())
    }
}

/// Builder for [`Validator`].
#[derive(Debug)]
pub struct ValidatorBuilder {
    messages: Option<Arc<dyn ResourceProvider>>,
    labels: Option<Arc<dyn ResourceProvider>>,
    message_bundle: String,
    label_bundle: String,
    registry: RuleRegistry,
    locale: Option<Locale>,
    resource_dir: Option<PathBuf>,
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self {
            messages: None,
            labels: None,
            message_bundle: MESSAGE_BUNDLE.to_string(),
            label_bundle: LABEL_BUNDLE.to_string(),
            registry: RuleRegistry::new(),
            locale: None,
            resource_dir: None,
        }
    }
}

impl ValidatorBuilder {
    /// Provider for message templates. Defaults to [`BuiltinResources`].
    pub fn messages(mut self, provider: impl ResourceProvider + 'static) -> Self {
        self.messages = Some(Arc::new(provider));
        self
    }

    /// Provider for field labels. Defaults to no labels.
    pub fn labels(mut self, provider: impl ResourceProvider + 'static) -> Self {
        self.labels = Some(Arc::new(provider));
        self
    }

    /// Bundle name for message templates.
    pub fn message_bundle(mut self, name: impl Into<String>) -> Self {
        self.message_bundle = name.into();
        self
    }

    /// Bundle name for labels.
    pub fn label_bundle(mut self, name: impl Into<String>) -> Self {
        self.label_bundle = name.into();
        self
    }

    /// Register a custom rule under `id`.
    pub fn rule(mut self, id: impl Into<String>, rule: impl CustomRule + 'static) -> Self {
        self.registry.register(id, rule);
        self
    }

    /// Replace the custom rule registry.
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Default locale for lookups.
    pub fn locale(mut self, locale: impl Into<Locale>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Apply a configuration: bundle names, locale and resource directory.
    ///
    /// Lookups consult providers set with [`messages`](Self::messages) or
    /// [`labels`](Self::labels) first, then the resource directory, then
    /// the built-in messages, whichever order the builder calls come in.
    pub fn config(mut self, config: &ValidatorConfig) -> Self {
        self.message_bundle = config.message_bundle.clone();
        self.label_bundle = config.label_bundle.clone();
        if let Some(locale) = &config.locale {
            self.locale = Some(locale.clone());
        }
        if let Some(dir) = &config.resource_dir {
            self.resource_dir = Some(dir.clone());
        }
        self
    }

    pub fn build(self) -> Validator {
        let dir = self.resource_dir.as_deref();
        let messages = match (self.messages, dir) {
            (Some(provider), None) => provider,
            (None, None) => Arc::new(BuiltinResources),
            (provider, Some(dir)) => Arc::new(
                chain(provider)
                    .with(DirectoryResources::new(dir))
                    .with(BuiltinResources),
            ),
        };
        let labels = match (self.labels, dir) {
            (Some(provider), None) => provider,
            (None, None) => Arc::new(StaticResources::new()),
            (provider, Some(dir)) => Arc::new(chain(provider).with(DirectoryResources::new(dir))),
        };

        Validator {
            messages: Arc::new(MessageBundle::from_bundle(ResourceBundle::from_shared(
                self.message_bundle,
                messages,
            ))),
            labels: Arc::new(LabelBundle::from_bundle(ResourceBundle::from_shared(
                self.label_bundle,
                labels,
            ))),
            registry: self.registry,
            locale: self.locale,
        }
    }
}

fn chain(first: Option<Arc<dyn ResourceProvider>>) -> ChainedResources {
    match first {
        Some(provider) => ChainedResources::new().with(provider),
        None => ChainedResources::new(),
    }
}

/// State of one validation call.
struct Walk<'a> {
    schema: &'a Schema,
    resolver: Resolver<'a>,
    report: ValidationReport,
}

impl Walk<'_> {
    fn validate_object(&mut self, data: &Map<String, Value>, type_name: &str, path: &str) {
        let schema = self.schema;
        let Some(descriptor) = schema.get(type_name) else {
            self.diagnose(SchemaError::UnknownType {
                name: type_name.to_string(),
            });
            return;
        };

        let (ancestors, error) = schema.ancestors(type_name);
        if let Some(error) = error {
            self.diagnose(error);
        }
        for ancestor in ancestors.iter().rev() {
            self.validate_fields(data, ancestor, path);
        }
        self.validate_fields(data, descriptor, path);
    }

    fn validate_fields(&mut self, data: &Map<String, Value>, descriptor: &TypeDescriptor, path: &str) {
        for field in &descriptor.fields {
            let key = field.key();
            let child = format!("{path}/{key}");
            let value = data.get(key);

            let resolved = self.resolver.resolve_rules(field);
            for error in resolved.diagnostics {
                self.diagnose(error);
            }

            let mut keywords = Keywords::for_field(&resolved.name, value, &child);
            let mut passed = true;
            for rule in &resolved.rules {
                let result = if rule.kind() == RuleKind::Required {
                    if data.contains_key(key) {
                        ValidationResult::success()
                    } else {
                        run_rule(rule.as_ref(), None, &mut keywords)
                    }
                } else {
                    run_rule(rule.as_ref(), value, &mut keywords)
                };

                if let Some(message) = result.into_message() {
                    tracing::debug!(path = %child, rule = %rule.code(), %message, "field failed");
                    self.report.push(ValidationFailure::new(
                        child.as_str(),
                        resolved.name.as_str(),
                        rule.code(),
                        message,
                    ));
                    passed = false;
                    break;
                }
            }

            if passed {
                self.descend(value, field.element_type.as_deref(), &child);
            }
        }
    }

    fn descend(&mut self, value: Option<&Value>, type_name: Option<&str>, path: &str) {
        let (Some(value), Some(type_name)) = (value, type_name) else {
            return;
        };
        if !matches!(value, Value::Object(_) | Value::Array(_)) {
            return;
        }
        if !self.schema.contains(type_name) {
            self.diagnose(SchemaError::UnknownElementType {
                path: path.to_string(),
                type_name: type_name.to_string(),
            });
            return;
        }

        match value {
            Value::Object(map) => self.validate_object(map, type_name, path),
            Value::Array(items) => self.validate_list(items, type_name, path),
            _ => {}
        }
    }

    fn validate_list(&mut self, items: &[Value], element_type: &str, path: &str) {
        for (i, item) in items.iter().enumerate() {
            if let Value::Object(map) = item {
                self.validate_object(map, element_type, &format!("{path}[{i}]"));
            }
        }
    }

    fn diagnose(&mut self, error: SchemaError) {
        if !self.report.diagnostics.contains(&error) {
            tracing::warn!(error = %error, "schema reference not resolved");
        }
        self.report.diagnose(error);
    }
}

/// Run one rule, turning a panic into a failed result.
fn run_rule(rule: &dyn Rule, value: Option<&Value>, keywords: &mut Keywords) -> ValidationResult {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.validate(value, keywords))) {
        Ok(result) => result,
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "rule panicked".to_string());
            tracing::error!(rule = %rule.code(), %detail, "validation rule panicked");
            ValidationResult::error(format!("Validation error occurred.[{detail}]"))
        }
    }
}
