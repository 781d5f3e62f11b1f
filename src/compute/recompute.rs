//! Resolves derived fields against the current values of a fill session.
use super::formula;
use crate::store::{FieldDefinition, FieldValue, FormSchema, ValueMap};
use smallvec::SmallVec;
use std::fmt;
use tracing::debug;

type ParentValues<'v> = SmallVec<[(&'v str, &'v FieldValue); 4]>;

/// Returns `values` with every derived field of `schema` recomputed.
///
/// A derived field with no parents, or with any parent absent or empty, is
/// cleared to `""`. Otherwise its formula is evaluated; any failure also
/// clears it. Fields are visited once, in schema order.
pub fn recompute(schema: &FormSchema, values: &ValueMap) -> ValueMap {
    let mut updated = values.clone();
    for field in schema.derived_fields() {
        let value = derive_field(field, &updated);
        updated.insert(field.id.clone(), value);
    }
    updated
}

/// Computes the value of a single derived field. Never fails.
pub fn derive_field(field: &FieldDefinition, values: &ValueMap) -> FieldValue {
    let Some(parents) = present_parents(field, values) else {
        return FieldValue::empty();
    };
    let Some(formula) = field.formula.as_deref() else {
        debug!(field = %field.id, "derived field has no formula");
        return FieldValue::empty();
    };

    match formula::evaluate(formula, &parents) {
        Ok(value) => value,
        Err(e) => {
            debug!(field = %field.id, formula, error = %e, "derived field evaluation failed");
            FieldValue::empty()
        }
    }
}

/// Parent values in declaration order, or `None` if any parent is missing.
fn present_parents<'v>(field: &'v FieldDefinition, values: &'v ValueMap) -> Option<ParentValues<'v>> {
    if field.parent_field_ids.is_empty() {
        return None;
    }
    field
        .parent_field_ids
        .iter()
        .map(|id| match values.get(id) {
            Some(v) if !v.is_blank() => Some((id.as_str(), v)),
            _ => None,
        })
        .collect()
}

/// Ids of the parents of `field` that currently have no value.
pub fn missing_parents<'f>(field: &'f FieldDefinition, values: &ValueMap) -> SmallVec<[&'f str; 4]> {
    field
        .parent_field_ids
        .iter()
        .filter(|id| values.get(*id).map_or(true, FieldValue::is_blank))
        .map(String::as_str)
        .collect()
}

/// What a derived field is currently showing, for display next to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivedStatus {
    /// Labels of the parents still missing a value.
    Waiting(Vec<String>),
    Computed,
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivedStatus::Waiting(labels) => write!(f, "Waiting for: {}", labels.join(", ")),
            DerivedStatus::Computed => f.write_str("Computed automatically"),
        }
    }
}

/// `None` for fields that are not derived or have no parents.
pub fn derived_status(schema: &FormSchema, values: &ValueMap, field_id: &str) -> Option<DerivedStatus> {
    let field = schema.field(field_id).filter(|f| f.is_derived && !f.parent_field_ids.is_empty())?;
    let missing = missing_parents(field, values);
    if missing.is_empty() {
        return Some(DerivedStatus::Computed);
    }
    let labels = missing
        .iter()
        .map(|id| schema.field(id).map_or_else(|| id.to_string(), |p| p.label.clone()))
        .collect();
    Some(DerivedStatus::Waiting(labels))
}
