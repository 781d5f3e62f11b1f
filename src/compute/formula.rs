//! Turns a formula over parent field ids into a value.
//!
//! The pipeline is: substitute parent values as literals, strip everything
//! outside the arithmetic alphabet, then tokenize, parse, compile and run.
//! Nothing here ever executes the formula text as code.
use super::bytecode::Compiler;
use super::engine::Engine;
use super::lexer::tokenize;
use super::parser::parse;
use super::value::{format_number, FormulaError, Value};
use crate::store::FieldValue;
use regex::Regex;
use std::sync::OnceLock;

/// Characters allowed outside string literals after substitution.
const ALLOWED: &str = "0123456789+-*/()., \"";

fn float_prefix_pattern() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| {
        Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").expect("static float pattern")
    })
}

/// Parses the longest numeric prefix of `s`, ignoring leading whitespace.
///
/// `"12abc"` is `12` and `"007"` is `7`; a string with no numeric prefix is `None`.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let m = float_prefix_pattern().find(s.trim_start())?;
    m.as_str().parse::<f64>().ok()
}

/// The literal text a parent value is substituted with.
pub fn literal_for(value: &FieldValue) -> String {
    match value {
        FieldValue::Number(n) => decimal_literal(*n),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Text(s) => match parse_float_prefix(s) {
            Some(n) => decimal_literal(n),
            None => quote(s),
        },
    }
}

/// Finite numbers in positional notation, never with an exponent, so the
/// literal survives sanitization intact.
fn decimal_literal(n: f64) -> String {
    if n.is_finite() && n != 0.0 {
        format!("{}", n)
    } else {
        format_number(n)
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Replaces every whole-word occurrence of a parent id with its literal.
///
/// Runs as a single pass, so substituted text is never rescanned and an id
/// that is part of a longer identifier is left alone.
pub fn substitute(formula: &str, parents: &[(&str, &FieldValue)]) -> Result<String, FormulaError> {
    if parents.is_empty() {
        return Ok(formula.to_string());
    }

    // Longest ids first so that alternation prefers `ab` over `a`.
    let mut ids: Vec<&str> = parents.iter().map(|(id, _)| *id).collect();
    ids.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    ids.dedup();

    let alternation = ids.iter().map(|id| regex::escape(id)).collect::<Vec<_>>().join("|");
    let pattern = Regex::new(&format!(r"\b(?:{})\b", alternation))
        .map_err(|e| FormulaError::Mismatch { msg: format!("unusable parent ids: {}", e) })?;

    let replaced = pattern.replace_all(formula, |caps: &regex::Captures<'_>| {
        let id = &caps[0];
        parents
            .iter()
            .find(|(pid, _)| *pid == id)
            .map(|(_, value)| literal_for(value))
            .unwrap_or_else(|| id.to_string())
    });
    Ok(replaced.into_owned())
}

/// Strips every character outside the arithmetic alphabet.
///
/// String literal bodies are kept verbatim (including `\"` escapes) so that
/// substituted text values survive.
pub fn sanitize(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut chars = expr.chars();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
        } else if ALLOWED.contains(c) {
            out.push(c);
            if c == '"' {
                in_string = true;
            }
        }
    }
    out
}

/// Evaluates `formula` with the given parent values.
pub fn evaluate(formula: &str, parents: &[(&str, &FieldValue)]) -> Result<FieldValue, FormulaError> {
    let substituted = substitute(formula, parents)?;
    let sanitized = sanitize(&substituted);
    let tokens = tokenize(&sanitized)?;
    let expr = parse(&tokens)?;
    let program = Compiler::compile(&expr);
    Engine::run(&program).map(Value::into_field_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("12", Some(12.0))]
    #[case("  3.5kg", Some(3.5))]
    #[case("007", Some(7.0))]
    #[case("-2e3x", Some(-2000.0))]
    #[case(".5", Some(0.5))]
    #[case("abc", None)]
    #[case("", None)]
    #[case("-", None)]
    fn test_parse_float_prefix(#[case] input: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_float_prefix(input), expected);
    }

    #[rstest]
    #[case(FieldValue::Number(10.0), "10")]
    #[case(FieldValue::from("4.20"), "4.2")]
    #[case(FieldValue::from("hello"), "\"hello\"")]
    #[case(FieldValue::from("say \"hi\""), r#""say \"hi\"""#)]
    #[case(FieldValue::Number(1e-7), "0.0000001")]
    #[case(FieldValue::Bool(true), "true")]
    fn test_literal_for(#[case] value: FieldValue, #[case] expected: &str) {
        assert_eq!(literal_for(&value), expected);
    }

    #[test]
    fn test_substitute_matches_whole_words_only() {
        let a = FieldValue::Number(1.0);
        let ab = FieldValue::Number(2.0);
        let out = substitute("a + ab + abc + a_b", &[("a", &a), ("ab", &ab)]).unwrap();
        assert_eq!(out, "1 + 2 + abc + a_b");
    }

    #[test]
    fn test_substitute_does_not_rescan_replacements() {
        let a = FieldValue::from("b");
        let b = FieldValue::Number(3.0);
        let out = substitute("a + b", &[("a", &a), ("b", &b)]).unwrap();
        assert_eq!(out, "\"b\" + 3");
    }

    #[test]
    fn test_sanitize_keeps_literals() {
        assert_eq!(sanitize("price * 2 USD"), " * 2 ");
        assert_eq!(sanitize(r#""a;b" + alert(1)"#), r#""a;b" + (1)"#);
        assert_eq!(sanitize(r#""x\"y" + z"#), r#""x\"y" + "#);
    }

    #[rstest]
    #[case("a + b", FieldValue::Number(5.0))]
    #[case("(a + b) * 2", FieldValue::Number(10.0))]
    #[case("a + \" items\"", FieldValue::from("2 items"))]
    #[case("b / a", FieldValue::Number(1.5))]
    fn test_evaluate(#[case] formula: &str, #[case] expected: FieldValue) {
        let a = FieldValue::Number(2.0);
        let b = FieldValue::from("3");
        assert_eq!(evaluate(formula, &[("a", &a), ("b", &b)]).unwrap(), expected);
    }

    #[test]
    fn test_evaluate_string_round_trip() {
        let a = FieldValue::from("hello");
        assert_eq!(evaluate("a", &[("a", &a)]).unwrap(), FieldValue::from("hello"));
    }

    #[test]
    fn test_evaluate_failures() {
        let a = FieldValue::Number(2.0);
        let zero = FieldValue::Number(0.0);
        assert_eq!(evaluate("a +", &[("a", &a)]), Err(FormulaError::UnexpectedEnd));
        assert_eq!(evaluate("a / z", &[("a", &a), ("z", &zero)]), Err(FormulaError::DivisionByZero));
        // Identifiers that are not parents are stripped, leaving nothing to evaluate.
        assert_eq!(evaluate("unknown", &[("a", &a)]), Err(FormulaError::Empty));
        // Booleans substitute as words, which the sanitizer removes.
        let flag = FieldValue::Bool(true);
        assert_eq!(evaluate("flag", &[("flag", &flag)]), Err(FormulaError::Empty));
    }

    #[rstest]
    #[case(1e-7, 2e-7)]
    #[case(1.5e21, 3e21)]
    fn test_tiny_and_huge_parents_keep_their_magnitude(#[case] a: f64, #[case] expected: f64) {
        let value = FieldValue::Number(a);
        assert_eq!(evaluate("a * 2", &[("a", &value)]), Ok(FieldValue::Number(expected)));
    }
}
