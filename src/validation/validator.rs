//! Evaluates ordered rule lists against field values.
use super::error::ValidationError;
use super::rules::{length, pattern, presence};
use crate::store::{FieldValue, FormSchema, RuleKind, ValidationRule, ValueMap};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A caller-supplied check for `custom` rules. Returns `true` when the value passes.
pub type CustomPredicate = Arc<dyn Fn(Option<&FieldValue>) -> bool + Send + Sync>;

/// Validates values against rule lists.
///
/// Holds only the registry of named custom predicates, so one instance can be
/// shared freely across threads. A `custom` rule whose bound names a
/// registered predicate is checked with it; every other `custom` rule passes.
#[derive(Clone, Default)]
pub struct Validator {
    custom: HashMap<String, CustomPredicate>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.custom.keys().collect();
        names.sort();
        f.debug_struct("Validator").field("custom", &names).finish()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a predicate for `custom` rules bound to `name`.
    pub fn with_custom<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Option<&FieldValue>) -> bool + Send + Sync + 'static,
    {
        self.custom.insert(name.into(), Arc::new(predicate));
        self
    }

    /// Returns the message of the first failing rule, in declaration order.
    ///
    /// Later rules are not evaluated once one fails. `None` when every rule
    /// passes or the list is empty.
    pub fn validate<'r>(&self, value: Option<&FieldValue>, rules: &'r [ValidationRule]) -> Option<&'r str> {
        self.first_failure(value, rules).map(|rule| rule.message.as_str())
    }

    /// Validates every non-derived field of `schema` against `values`.
    ///
    /// # Returns
    /// - `Ok(())` if no field fails.
    /// - `Err(Vec<ValidationError>)` with one report per failing field, in schema order.
    pub fn validate_form(&self, schema: &FormSchema, values: &ValueMap) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = schema
            .fields
            .iter()
            .filter(|f| !f.is_derived)
            .filter_map(|field| {
                self.first_failure(values.get(&field.id), &field.rules)
                    .map(|rule| ValidationError {
                        field_id: field.id.clone(),
                        kind: rule.kind,
                        message: rule.message.clone(),
                    })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn first_failure<'r>(&self, value: Option<&FieldValue>, rules: &'r [ValidationRule]) -> Option<&'r ValidationRule> {
        rules.iter().find(|rule| !self.passes(value, rule))
    }

    fn passes(&self, value: Option<&FieldValue>, rule: &ValidationRule) -> bool {
        let bound = rule.bound.as_ref();
        match rule.kind {
            RuleKind::Required => presence::check_required(value),
            RuleKind::MinLength => length::check_min_length(value, bound),
            RuleKind::MaxLength => length::check_max_length(value, bound),
            RuleKind::Email => pattern::check_email(value),
            RuleKind::Password => pattern::check_password(value),
            RuleKind::Custom => bound
                .and_then(|b| b.as_name())
                .and_then(|name| self.custom.get(name))
                .map_or(true, |predicate| predicate(value)),
        }
    }
}

/// Validates with the default rule set (no custom predicates).
pub fn validate<'r>(value: Option<&FieldValue>, rules: &'r [ValidationRule]) -> Option<&'r str> {
    Validator::new().validate(value, rules)
}
