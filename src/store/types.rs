use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current values of a fill session, keyed by field id.
pub type ValueMap = BTreeMap<String, FieldValue>;

/// Active validation messages, keyed by field id.
pub type ErrorMap = BTreeMap<String, String>;

/// A single field value as entered by the user or produced by a formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn empty() -> Self {
        FieldValue::Text(String::new())
    }

    /// True for the empty string only. Whitespace, `0` and `false` are values.
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self { FieldValue::Text(s.to_string()) }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self { FieldValue::Text(s) }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self { FieldValue::Number(n) }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self { FieldValue::Number(n as f64) }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self { FieldValue::Bool(b) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
}

impl FieldType {
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    Email,
    Password,
    Custom,
}

/// The parameter of a rule: a length bound, or the name of a custom predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleBound {
    Number(f64),
    Text(String),
}

impl RuleBound {
    /// The bound as a number to compare character counts against. Numeric
    /// strings are accepted; fractions are kept as is.
    pub fn as_limit(&self) -> Option<f64> {
        let n = match self {
            RuleBound::Number(n) => *n,
            RuleBound::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            RuleBound::Text(s) => Some(s),
            RuleBound::Number(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<RuleBound>,
    pub message: String,
}

impl ValidationRule {
    pub fn new(kind: RuleKind, message: impl Into<String>) -> Self {
        Self { kind, bound: None, message: message.into() }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(RuleKind::Required, message)
    }

    pub fn min_length(len: usize, message: impl Into<String>) -> Self {
        Self { bound: Some(RuleBound::Number(len as f64)), ..Self::new(RuleKind::MinLength, message) }
    }

    pub fn max_length(len: usize, message: impl Into<String>) -> Self {
        Self { bound: Some(RuleBound::Number(len as f64)), ..Self::new(RuleKind::MaxLength, message) }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::new(RuleKind::Email, message)
    }

    pub fn password(message: impl Into<String>) -> Self {
        Self::new(RuleKind::Password, message)
    }

    /// A custom rule bound to the predicate registered under `name`.
    pub fn custom(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { bound: Some(RuleBound::Text(name.into())), ..Self::new(RuleKind::Custom, message) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// One field of a form. Derived fields carry a formula over their parents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,
    #[serde(rename = "validationRules", default)]
    pub rules: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    #[serde(default)]
    pub is_derived: bool,
    #[serde(rename = "parentFields", default)]
    pub parent_field_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default)]
    pub order: u32,
}

impl FieldDefinition {
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            required: false,
            default_value: None,
            rules: Vec::new(),
            options: None,
            is_derived: false,
            parent_field_ids: Vec::new(),
            formula: None,
            order: 0,
        }
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        if rule.kind == RuleKind::Required {
            self.required = true;
        }
        self.rules.push(rule);
        self
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = (&'static str, &'static str)>) -> Self {
        self.options = Some(
            options
                .into_iter()
                .map(|(label, value)| SelectOption { label: label.into(), value: value.into() })
                .collect(),
        );
        self
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Marks the field as derived from `parents` through `formula`.
    pub fn derived<I, S>(mut self, parents: I, formula: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.is_derived = true;
        self.parent_field_ids = parents.into_iter().map(Into::into).collect();
        self.formula = Some(formula.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: String,
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    pub created_at: DateTime<Utc>,
}

impl FormSchema {
    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn derived_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.is_derived)
    }
}
