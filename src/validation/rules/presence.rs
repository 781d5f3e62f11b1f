//! Rule for required fields.
use crate::store::FieldValue;

/// A value is present unless it is absent or a string that is blank after trimming.
/// Numbers and booleans always count as present, `0` and `false` included.
pub(crate) fn check_required(value: Option<&FieldValue>) -> bool {
    match value {
        None => false,
        Some(FieldValue::Text(s)) => !s.trim().is_empty(),
        Some(FieldValue::Number(_) | FieldValue::Bool(_)) => true,
    }
}
