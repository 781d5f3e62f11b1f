//! Defines the report type produced when a form is validated as a whole.
use crate::store::{ErrorMap, RuleKind};

/// A structured report of one failing field, tagged with the kind of rule that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The id of the field whose value failed.
    pub field_id: String,
    /// The kind of the first rule that failed.
    pub kind: RuleKind,
    /// The rule's own message, shown next to the field.
    pub message: String,
}

/// Collapses a list of reports into the per-field message map used for display.
pub fn into_error_map(errors: &[ValidationError]) -> ErrorMap {
    errors
        .iter()
        .map(|e| (e.field_id.clone(), e.message.clone()))
        .collect()
}
