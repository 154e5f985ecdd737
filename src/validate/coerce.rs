//! Raw wire values to typed values
//!
//! Browsers submit strings. Each scalar kind accepts its native JSON type
//! (from pre-nested submissions) and its string spelling (from forms).
//! Blank strings read as absent for every kind except `string`.

use chrono::NaiveDate;
use serde_json::{Number, Value};

use crate::schema::ScalarKind;

pub const INVALID_INTEGER: &str = "Must be a valid integer";
pub const INVALID_NUMBER: &str = "Must be a valid number";
pub const INVALID_BOOLEAN: &str = "Must be a valid boolean";
pub const INVALID_DATE: &str = "Must be a valid date (YYYY-MM-DD)";

/// Wire format for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Coerces `raw` to `kind`. `Ok(None)` means absent.
pub fn coerce(kind: ScalarKind, raw: &Value) -> Result<Option<Value>, &'static str> {
    if raw.is_null() {
        return Ok(None);
    }

    match kind {
        ScalarKind::String => Ok(Some(match raw {
            Value::String(s) => Value::String(s.clone()),
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            _ => return Err("Must be text"),
        })),
        ScalarKind::Integer => integer(raw).map(|n| n.map(Value::from)),
        ScalarKind::Float => float(raw),
        ScalarKind::Boolean => boolean(raw).map(|b| Some(Value::Bool(b))),
        ScalarKind::Date => date(raw).map(|d| d.map(|d| Value::String(d.format(DATE_FORMAT).to_string()))),
    }
}

fn blank(raw: &Value) -> bool {
    matches!(raw, Value::String(s) if s.trim().is_empty())
}

fn integer(raw: &Value) -> Result<Option<i64>, &'static str> {
    if blank(raw) {
        return Ok(None);
    }
    match raw {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Some(i)),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                _ => Err(INVALID_INTEGER),
            },
        },
        Value::String(s) => s.trim().parse::<i64>().map(Some).map_err(|_| INVALID_INTEGER),
        _ => Err(INVALID_INTEGER),
    }
}

fn float(raw: &Value) -> Result<Option<Value>, &'static str> {
    if blank(raw) {
        return Ok(None);
    }
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .and_then(Number::from_f64)
        .map(|n| Some(Value::Number(n)))
        .ok_or(INVALID_NUMBER)
}

/// Checkbox semantics: `on`, `true`, `1`, `yes` and their negations.
pub fn boolean(raw: &Value) -> Result<bool, &'static str> {
    match raw {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Ok(true),
            Some(f) if f == 0.0 => Ok(false),
            _ => Err(INVALID_BOOLEAN),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "1" | "yes" => Ok(true),
            "off" | "false" | "0" | "no" | "" => Ok(false),
            _ => Err(INVALID_BOOLEAN),
        },
        _ => Err(INVALID_BOOLEAN),
    }
}

/// Parses a wire date.
pub fn date(raw: &Value) -> Result<Option<NaiveDate>, &'static str> {
    if blank(raw) {
        return Ok(None);
    }
    match raw {
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| INVALID_DATE),
        _ => Err(INVALID_DATE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer() {
        assert_eq!(coerce(ScalarKind::Integer, &json!("42")), Ok(Some(json!(42))));
        assert_eq!(coerce(ScalarKind::Integer, &json!(" -7 ")), Ok(Some(json!(-7))));
        assert_eq!(coerce(ScalarKind::Integer, &json!(3.0)), Ok(Some(json!(3))));
        assert_eq!(coerce(ScalarKind::Integer, &json!("")), Ok(None));
        assert_eq!(coerce(ScalarKind::Integer, &json!("4.5")), Err(INVALID_INTEGER));
    }

    #[test]
    fn test_float() {
        assert_eq!(coerce(ScalarKind::Float, &json!("-0.98")), Ok(Some(json!(-0.98))));
        assert_eq!(coerce(ScalarKind::Float, &json!(2)), Ok(Some(json!(2.0))));
        assert_eq!(coerce(ScalarKind::Float, &json!("abc")), Err(INVALID_NUMBER));
        assert_eq!(coerce(ScalarKind::Float, &json!("NaN")), Err(INVALID_NUMBER));
    }

    #[test]
    fn test_boolean() {
        assert_eq!(boolean(&json!("on")), Ok(true));
        assert_eq!(boolean(&json!("No")), Ok(false));
        assert_eq!(boolean(&json!(true)), Ok(true));
        assert_eq!(boolean(&json!("maybe")), Err(INVALID_BOOLEAN));
    }

    #[test]
    fn test_date() {
        assert_eq!(
            coerce(ScalarKind::Date, &json!("2024-02-29")),
            Ok(Some(json!("2024-02-29")))
        );
        assert_eq!(coerce(ScalarKind::Date, &json!("2023-02-29")), Err(INVALID_DATE));
        assert_eq!(coerce(ScalarKind::Date, &json!("29/02/2024")), Err(INVALID_DATE));
    }

    #[test]
    fn test_string_keeps_blank() {
        assert_eq!(coerce(ScalarKind::String, &json!("")), Ok(Some(json!(""))));
        assert_eq!(coerce(ScalarKind::String, &json!(5)), Ok(Some(json!("5"))));
        assert_eq!(coerce(ScalarKind::String, &Value::Null), Ok(None));
    }
}
