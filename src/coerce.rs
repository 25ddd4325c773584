//! Coercion of raw environment strings.
//!
//! Coercion is best effort and never fails. A string that cannot be read as
//! the field's declared primitive is handed to the validator unchanged so the
//! type mismatch is reported there, against the right field.

use crate::introspect::{classify, Kind, SchemaNode};
use crate::value::Value;

/// Coerce an optional raw string for a field.
///
/// Returns `None` when the variable is absent, which leaves the field out of
/// the candidate so defaults and optionality can apply.
///
/// # Example
///
/// ```
/// use typenv::coerce::coerce;
/// use typenv::schema::{boolean, number, FieldSchema};
/// use typenv::Value;
///
/// let port: FieldSchema = number().into();
/// assert_eq!(coerce(&port, Some("3000")), Some(Value::Integer(3000)));
///
/// let debug: FieldSchema = boolean().into();
/// assert_eq!(coerce(&debug, Some(" YES ")), Some(Value::Bool(true)));
/// assert_eq!(coerce(&debug, None), None);
/// ```
pub fn coerce<N: SchemaNode + ?Sized>(node: &N, raw: Option<&str>) -> Option<Value> {
    raw.map(|raw| coerce_str(classify(node), raw))
}

/// Coerce an already-present value.
///
/// Only strings are touched; values that already carry a native type pass
/// through unchanged.
pub fn coerce_value<N: SchemaNode + ?Sized>(node: &N, value: Value) -> Value {
    match value {
        Value::String(raw) => coerce_str(classify(node), &raw),
        other => other,
    }
}

/// Coerce a present raw string for an already-classified field.
pub fn coerce_str(kind: Kind, raw: &str) -> Value {
    let coerced = match kind {
        Kind::Number => parse_number(raw),
        Kind::Boolean => parse_bool(raw).map(Value::Bool),
        Kind::String | Kind::Other => None,
    };
    coerced.unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Parse a numeric literal.
///
/// Accepts surrounding whitespace, an optional sign, decimal integers,
/// `0x`/`0o`/`0b` prefixed integers and decimal or exponent floats.
/// Integers that fit in `i64` stay integers.
///
/// Empty input is rejected rather than read as `0`: an empty variable is far
/// more often a deployment mistake than an intended zero, and rejecting it
/// lets the validator report it. `inf`, `Infinity` and `NaN` are rejected
/// because they cannot be carried into JSON or an integer field.
pub fn parse_number(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::Integer(i));
    }

    if let Some(i) = parse_radix_integer(trimmed) {
        return Some(Value::Integer(i));
    }

    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(Value::Float(f)),
        _ => None,
    }
}

fn parse_radix_integer(literal: &str) -> Option<i64> {
    let (negative, body) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal.strip_prefix('+').unwrap_or(literal)),
    };

    let (radix, digits) = match body.get(..2)?.to_ascii_lowercase().as_str() {
        "0x" => (16, &body[2..]),
        "0o" => (8, &body[2..]),
        "0b" => (2, &body[2..]),
        _ => return None,
    };
    // from_str_radix would otherwise accept a second sign after the prefix
    if digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse a boolean literal, case-insensitively and ignoring surrounding
/// whitespace.
///
/// `true`, `1` and `yes` are true; `false`, `0`, `no` and the empty string
/// are false. Anything else is `None`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{any, boolean, number, string, FieldSchema, SchemaExt};

    fn field(schema: impl Into<FieldSchema>) -> FieldSchema {
        schema.into()
    }

    #[test]
    fn test_absent_is_omitted() {
        assert_eq!(coerce(&field(number()), None), None);
        assert_eq!(coerce(&field(string()), None), None);
    }

    #[test]
    fn test_number_integer_and_decimal() {
        let port = field(number().int().positive());
        assert_eq!(coerce(&port, Some("3000")), Some(Value::Integer(3000)));
        assert_eq!(coerce(&port, Some("3.14")), Some(Value::Float(3.14)));
        assert_eq!(coerce(&port, Some(" -7 ")), Some(Value::Integer(-7)));
        assert_eq!(coerce(&port, Some("1e3")), Some(Value::Float(1000.0)));
    }

    #[test]
    fn test_number_radix_prefixes() {
        assert_eq!(parse_number("0x1F"), Some(Value::Integer(31)));
        assert_eq!(parse_number("0o17"), Some(Value::Integer(15)));
        assert_eq!(parse_number("-0b101"), Some(Value::Integer(-5)));
        assert_eq!(parse_number("0x-1"), None);
        assert_eq!(parse_number("0x"), None);
    }

    #[test]
    fn test_number_failure_passes_raw_through() {
        let port = field(number());
        assert_eq!(coerce(&port, Some("abc")), Some(Value::from("abc")));
        assert_eq!(coerce(&port, Some("")), Some(Value::from("")));
        assert_eq!(coerce(&port, Some("inf")), Some(Value::from("inf")));
        assert_eq!(coerce(&port, Some("NaN")), Some(Value::from("NaN")));
    }

    #[test]
    fn test_number_empty_and_non_finite_are_not_numbers() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("Infinity"), None);
        assert_eq!(parse_number("-inf"), None);
        assert_eq!(parse_number("1e400"), None);

        let port = field(number().default(8080));
        assert_eq!(coerce(&port, Some("")), Some(Value::from("")));
        assert_eq!(coerce(&port, Some("Infinity")), Some(Value::from("Infinity")));
    }

    #[test]
    fn test_coerce_str_uses_given_kind() {
        assert_eq!(coerce_str(Kind::Number, "7"), Value::Integer(7));
        assert_eq!(coerce_str(Kind::Boolean, "no"), Value::Bool(false));
        assert_eq!(coerce_str(Kind::String, "7"), Value::from("7"));
        assert_eq!(coerce_str(Kind::Other, "yes"), Value::from("yes"));
    }

    #[test]
    fn test_boolean_literals() {
        let debug = field(boolean());
        for raw in ["true", "1", "yes", "TRUE", " Yes "] {
            assert_eq!(coerce(&debug, Some(raw)), Some(Value::Bool(true)), "{raw}");
        }
        for raw in ["false", "0", "no", "", "  ", "No"] {
            assert_eq!(coerce(&debug, Some(raw)), Some(Value::Bool(false)), "{raw}");
        }
    }

    #[test]
    fn test_boolean_unknown_literal_unchanged() {
        let debug = field(boolean());
        assert_eq!(coerce(&debug, Some("Maybe")), Some(Value::from("Maybe")));
        assert_eq!(coerce(&debug, Some("on")), Some(Value::from("on")));
    }

    #[test]
    fn test_string_and_other_untouched() {
        assert_eq!(coerce(&field(string()), Some("42")), Some(Value::from("42")));
        assert_eq!(coerce(&field(any()), Some("true")), Some(Value::from("true")));
    }

    #[test]
    fn test_coercion_sees_through_modifiers() {
        let debug = boolean().default(false).optional().readonly();
        assert_eq!(coerce(&debug, Some("yes")), Some(Value::Bool(true)));

        let port = number().preprocess(|v| v).nullable();
        assert_eq!(coerce(&port, Some("8080")), Some(Value::Integer(8080)));
    }

    #[test]
    fn test_native_values_pass_through() {
        let port = field(number());
        assert_eq!(coerce_value(&port, Value::Integer(5)), Value::Integer(5));
        assert_eq!(coerce_value(&port, Value::Bool(true)), Value::Bool(true));
        assert_eq!(coerce_value(&port, Value::from("5")), Value::Integer(5));
    }
}
