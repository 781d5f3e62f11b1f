//! Rules for string length bounds.
use crate::store::{FieldValue, RuleBound};

/// Only string values are measured. Anything else, or a rule without a usable
/// bound, passes.
pub(crate) fn check_min_length(value: Option<&FieldValue>, bound: Option<&RuleBound>) -> bool {
    match (value.and_then(FieldValue::as_str), bound.and_then(RuleBound::as_limit)) {
        (Some(s), Some(min)) => s.chars().count() as f64 >= min,
        _ => true,
    }
}

pub(crate) fn check_max_length(value: Option<&FieldValue>, bound: Option<&RuleBound>) -> bool {
    match (value.and_then(FieldValue::as_str), bound.and_then(RuleBound::as_limit)) {
        (Some(s), Some(max)) => s.chars().count() as f64 <= max,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FieldValue::from("ab"), false)]
    #[case(FieldValue::from("abc"), true)]
    #[case(FieldValue::from("héé"), true)]
    #[case(FieldValue::Number(5.0), true)]
    #[case(FieldValue::Bool(true), true)]
    fn test_min_length_three(#[case] value: FieldValue, #[case] passes: bool) {
        let bound = RuleBound::Number(3.0);
        assert_eq!(check_min_length(Some(&value), Some(&bound)), passes);
    }

    #[test]
    fn test_max_length() {
        let bound = RuleBound::Number(4.0);
        assert!(check_max_length(Some(&FieldValue::from("abcd")), Some(&bound)));
        assert!(!check_max_length(Some(&FieldValue::from("abcde")), Some(&bound)));
        assert!(check_max_length(None, Some(&bound)));
    }

    #[test]
    fn test_unusable_bound_is_a_no_op() {
        let value = FieldValue::from("a");
        assert!(check_min_length(Some(&value), None));
        assert!(check_min_length(Some(&value), Some(&RuleBound::Text("many".into()))));
        // Numeric strings are accepted as bounds.
        assert!(!check_min_length(Some(&value), Some(&RuleBound::Text("2".into()))));
    }

    #[rstest]
    #[case("ab", 2.5, false, true)]
    #[case("abc", 2.5, true, false)]
    #[case("", -1.0, true, false)]
    fn test_fractional_and_negative_bounds(
        #[case] text: &str,
        #[case] limit: f64,
        #[case] min_passes: bool,
        #[case] max_passes: bool,
    ) {
        let value = FieldValue::from(text);
        let bound = RuleBound::Number(limit);
        assert_eq!(check_min_length(Some(&value), Some(&bound)), min_passes);
        assert_eq!(check_max_length(Some(&value), Some(&bound)), max_passes);
    }
}
