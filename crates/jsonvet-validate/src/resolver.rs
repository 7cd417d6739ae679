//! Turns a field's rule specs into its ordered rule pipeline.

use crate::bundle::{LabelBundle, Locale, MessageBundle};
use crate::error::SchemaError;
use crate::rules::{
    CustomRuleInstance, MaximumRule, MinimumRule, NotEmptyRule, NotNullRule, PatternRule,
    RangeRule, RequiredRule, Rule, RuleBinding, RuleRegistry,
};
use crate::schema::{Constraint, FieldDescriptor, RuleSpec};
use std::sync::Arc;

/// The rules bound to one field, ready to run.
#[derive(Debug)]
pub struct ResolvedField {
    /// Display name used in messages and failure records
    pub name: String,
    /// Rules sorted by order, ties in declaration order
    pub rules: Vec<Box<dyn Rule>>,
    /// Custom rule ids that had no registration
    pub diagnostics: Vec<SchemaError>,
}

/// Resolves rule pipelines against one set of bundles, registry and locale.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    messages: &'a Arc<MessageBundle>,
    labels: &'a LabelBundle,
    registry: &'a RuleRegistry,
    locale: Option<&'a Locale>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        messages: &'a Arc<MessageBundle>,
        labels: &'a LabelBundle,
        registry: &'a RuleRegistry,
        locale: Option<&'a Locale>,
    ) -> Self {
        Self {
            messages,
            labels,
            registry,
            locale,
        }
    }

    /// Display name of `field`: its label if that resolves to non-empty
    /// text, else its display name, else its JSON key.
    pub fn display_name(&self, field: &FieldDescriptor) -> String {
        field
            .label
            .as_deref()
            .and_then(|label| self.labels.get(label, self.locale))
            .filter(|name| !name.is_empty())
            .or_else(|| field.display_name.clone().filter(|name| !name.is_empty()))
            .unwrap_or_else(|| field.key().to_string())
    }

    /// Instantiate and order the rules of `field`.
    pub fn resolve_rules(&self, field: &FieldDescriptor) -> ResolvedField {
        let name = self.display_name(field);
        let mut rules: Vec<Box<dyn Rule>> = Vec::with_capacity(field.rules.len());
        let mut diagnostics = Vec::new();

        for spec in &field.rules {
            let binding = self.bind(spec, &name);
            match &spec.constraint {
                Constraint::Required => rules.push(Box::new(RequiredRule::new(binding))),
                Constraint::NotNull => rules.push(Box::new(NotNullRule::new(binding))),
                Constraint::NotEmpty => rules.push(Box::new(NotEmptyRule::new(binding))),
                Constraint::Minimum { value } => {
                    rules.push(Box::new(MinimumRule::new(*value, binding)))
                }
                Constraint::Maximum { value } => {
                    rules.push(Box::new(MaximumRule::new(*value, binding)))
                }
                Constraint::Range { min, max } => {
                    rules.push(Box::new(RangeRule::new(*min, *max, binding)))
                }
                Constraint::Pattern { regex } => {
                    rules.push(Box::new(PatternRule::new(regex.clone(), binding)))
                }
                Constraint::Custom { rules: ids } => {
                    for id in ids {
                        match self.registry.get(id) {
                            Some(rule) => rules.push(Box::new(CustomRuleInstance::new(
                                id.clone(),
                                rule,
                                binding.clone(),
                            ))),
                            None => diagnostics.push(SchemaError::UnknownCustomRule {
                                field: field.key().to_string(),
                                rule: id.clone(),
                            }),
                        }
                    }
                }
            }
        }

        // stable: equal orders keep declaration order
        rules.sort_by_key(|rule| rule.order());

        ResolvedField {
            name,
            rules,
            diagnostics,
        }
    }

    fn bind(&self, spec: &RuleSpec, name: &str) -> RuleBinding {
        RuleBinding::new(Arc::clone(self.messages))
            .order(spec.order)
            .message(spec.message.clone())
            .name(name)
            .locale(self.locale.cloned())
    }
}
