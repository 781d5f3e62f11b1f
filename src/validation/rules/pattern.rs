//! Rules matching string values against fixed patterns (email, password).
use crate::store::FieldValue;
use regex::Regex;
use std::sync::OnceLock;

const PASSWORD_SPECIALS: &str = "@$!%*#?&";
const PASSWORD_MIN_LEN: usize = 8;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

/// Empty and non-string values are skipped; presence is the `required` rule's job.
fn non_empty_str(value: Option<&FieldValue>) -> Option<&str> {
    value.and_then(FieldValue::as_str).filter(|s| !s.is_empty())
}

pub(crate) fn check_email(value: Option<&FieldValue>) -> bool {
    non_empty_str(value).map_or(true, |s| email_pattern().is_match(s))
}

/// At least eight characters from letters, digits and `@$!%*#?&`, with at
/// least one letter and one digit.
pub(crate) fn check_password(value: Option<&FieldValue>) -> bool {
    let Some(s) = non_empty_str(value) else {
        return true;
    };
    let allowed = s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    allowed
        && s.chars().count() >= PASSWORD_MIN_LEN
        && s.chars().any(|c| c.is_ascii_alphabetic())
        && s.chars().any(|c| c.is_ascii_digit())
}
