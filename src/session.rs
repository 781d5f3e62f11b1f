//! A fill session: one schema being filled in, with live validation and
//! derived-value recomputation after every change.
use crate::analysis::check_schema;
use crate::compute::{derived_status, recompute, DerivedStatus};
use crate::store::{ErrorMap, FieldValue, FormSchema, ValueMap};
use crate::validation::{into_error_map, Validator};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Field '{0}' does not exist in the active schema")]
    UnknownField(String),
    #[error("Field '{0}' is derived and cannot be set directly")]
    DerivedField(String),
}

/// Write side of the state container that displays a form.
pub trait FormStateSink {
    fn set_value(&mut self, field_id: &str, value: FieldValue);
    fn set_error(&mut self, field_id: &str, message: String);
    fn clear_error(&mut self, field_id: &str);
}

/// Applies a user edit of `field_id` and reports every resulting write to `sink`.
///
/// The edited field is stored, its error cleared and re-validated, then the
/// derived fields are recomputed against the new values. Only derived values
/// that actually changed are written back.
pub fn apply_change<S: FormStateSink + ?Sized>(
    schema: &FormSchema,
    validator: &Validator,
    current: &ValueMap,
    field_id: &str,
    value: FieldValue,
    sink: &mut S,
) -> Result<(), SessionError> {
    let field = schema
        .field(field_id)
        .ok_or_else(|| SessionError::UnknownField(field_id.to_string()))?;
    if field.is_derived {
        return Err(SessionError::DerivedField(field_id.to_string()));
    }

    sink.set_value(field_id, value.clone());
    sink.clear_error(field_id);
    if let Some(message) = validator.validate(Some(&value), &field.rules) {
        sink.set_error(field_id, message.to_string());
    }

    let mut next = current.clone();
    next.insert(field_id.to_string(), value);
    let recomputed = recompute(schema, &next);
    for derived in schema.derived_fields() {
        if let Some(new_value) = recomputed.get(&derived.id) {
            if next.get(&derived.id) != Some(new_value) {
                sink.set_value(&derived.id, new_value.clone());
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub values: ValueMap,
    pub errors: ErrorMap,
}

impl FormStateSink for SessionState {
    fn set_value(&mut self, field_id: &str, value: FieldValue) {
        self.values.insert(field_id.to_string(), value);
    }

    fn set_error(&mut self, field_id: &str, message: String) {
        self.errors.insert(field_id.to_string(), message);
    }

    fn clear_error(&mut self, field_id: &str) {
        self.errors.remove(field_id);
    }
}

#[derive(Debug, Clone)]
pub struct FillSession {
    schema: FormSchema,
    validator: Validator,
    state: SessionState,
}

impl FillSession {
    /// Starts filling `schema` with empty values. Derived fields start cleared.
    pub fn new(schema: FormSchema) -> Self {
        Self::with_validator(schema, Validator::new())
    }

    pub fn with_validator(schema: FormSchema, validator: Validator) -> Self {
        if let Err(issues) = check_schema(&schema) {
            for issue in &issues {
                warn!(schema = %schema.id, %issue, "schema integrity problem");
            }
        }
        let values = recompute(&schema, &ValueMap::new());
        Self {
            schema,
            validator,
            state: SessionState { values, errors: ErrorMap::new() },
        }
    }

    /// Switches to another schema. Values and errors from the old one are dropped.
    pub fn reset(&mut self, schema: FormSchema) {
        let validator = std::mem::take(&mut self.validator);
        *self = Self::with_validator(schema, validator);
    }

    pub fn set_value(&mut self, field_id: &str, value: impl Into<FieldValue>) -> Result<(), SessionError> {
        let current = self.state.values.clone();
        apply_change(&self.schema, &self.validator, &current, field_id, value.into(), &mut self.state)
    }

    /// Validates every non-derived field at once, replacing the error map.
    /// Returns `true` when the form has no errors.
    pub fn validate_all(&mut self) -> bool {
        match self.validator.validate_form(&self.schema, &self.state.values) {
            Ok(()) => {
                self.state.errors.clear();
                true
            }
            Err(errors) => {
                self.state.errors = into_error_map(&errors);
                false
            }
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &ValueMap {
        &self.state.values
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.state.errors
    }

    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.state.values.get(field_id)
    }

    /// The value shown for a field: its current value, else its default.
    pub fn display_value(&self, field_id: &str) -> Option<FieldValue> {
        match self.state.values.get(field_id) {
            Some(v) if !v.is_blank() => Some(v.clone()),
            current => self
                .schema
                .field(field_id)
                .and_then(|f| f.default_value.clone())
                .or_else(|| current.cloned()),
        }
    }

    pub fn derived_status(&self, field_id: &str) -> Option<DerivedStatus> {
        derived_status(&self.schema, &self.state.values, field_id)
    }

    /// Pushes the whole session state into an external container.
    pub fn mirror_into<S: FormStateSink + ?Sized>(&self, sink: &mut S) {
        for (id, value) in &self.state.values {
            sink.set_value(id, value.clone());
        }
        for field in &self.schema.fields {
            match self.state.errors.get(&field.id) {
                Some(message) => sink.set_error(&field.id, message.clone()),
                None => sink.clear_error(&field.id),
            }
        }
    }
}
