//! Runtime values of the formula machine and the errors it can raise.
use crate::store::FieldValue;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Formula is empty")]
    Empty,
    #[error("Unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("Unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),
    #[error("Malformed number '{text}' at offset {pos}")]
    MalformedNumber { text: String, pos: usize },
    #[error("Unexpected {found} at offset {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("Unexpected end of formula")]
    UnexpectedEnd,
    #[error("Formula nests deeper than {limit} levels")]
    TooDeep { limit: usize },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Result is not a finite number")]
    NonFinite,
    #[error("Malformed program: {msg}")]
    Mismatch { msg: String },
}

/// A value on the formula machine's stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Numeric coercion: blank text is `0`, unparsable text is `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    0.0
                } else if t.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
                    t.parse::<f64>().unwrap_or(f64::NAN)
                } else {
                    f64::NAN
                }
            }
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
        }
    }

    pub fn into_field_value(self) -> FieldValue {
        match self {
            Value::Number(n) => FieldValue::Number(n),
            Value::Text(s) => FieldValue::Text(s),
        }
    }
}

/// Renders a number the way form values are displayed: integers without a
/// fraction, shortest round-trip digits otherwise, exponent form outside
/// `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    if n == 0.0 {
        return "0".into();
    }
    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let raw = format!("{:e}", n);
        match raw.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => raw,
        }
    } else {
        format!("{}", n)
    }
}
