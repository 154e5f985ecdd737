//! Cross-field rule evaluation
//!
//! Rules read the coerced data of one schema level, after per-field checks.
//! A rule comparing two values only fires when both are present; a field
//! that is missing is already reported by its own checks.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::coerce::DATE_FORMAT;
use crate::schema::{CrossFieldCheck, CrossFieldRule};

/// The rule's message if `data` violates it.
pub fn evaluate(rule: &CrossFieldRule, data: &Map<String, Value>) -> Option<String> {
    let violated = match &rule.check {
        CrossFieldCheck::FieldsMatch { field, confirm } => {
            match (present(data, field), present(data, confirm)) {
                (Some(a), Some(b)) => a != b,
                _ => false,
            }
        }
        CrossFieldCheck::DateOrder { start, end } => {
            match (as_date(data.get(start)), as_date(data.get(end))) {
                (Some(start), Some(end)) => end <= start,
                _ => false,
            }
        }
        CrossFieldCheck::RequiredWith { field, trigger } => {
            present(data, trigger).is_some() && present(data, field).is_none()
        }
    };

    violated.then(|| rule.message())
}

/// A value that counts as provided: not null, not blank, not `false`.
fn present<'a>(data: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    data.get(name).filter(|value| match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    })
}

fn as_date(value: Option<&Value>) -> Option<NaiveDate> {
    value
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_fields_match() {
        let rule = CrossFieldRule::fields_match("password", "confirm_password");
        assert_eq!(
            evaluate(&rule, &data(json!({"password": "abc", "confirm_password": "abd"}))),
            Some("Must match password".to_string())
        );
        assert_eq!(
            evaluate(&rule, &data(json!({"password": "abc", "confirm_password": "abc"}))),
            None
        );
        assert_eq!(evaluate(&rule, &data(json!({"password": "abc"}))), None);
    }

    #[test]
    fn test_date_order() {
        let rule = CrossFieldRule::date_order("check_in", "check_out");
        assert!(evaluate(
            &rule,
            &data(json!({"check_in": "2024-05-02", "check_out": "2024-05-01"}))
        )
        .is_some());
        assert!(evaluate(
            &rule,
            &data(json!({"check_in": "2024-05-02", "check_out": "2024-05-02"}))
        )
        .is_some());
        assert!(evaluate(
            &rule,
            &data(json!({"check_in": "2024-05-01", "check_out": "2024-05-03"}))
        )
        .is_none());
    }

    #[test]
    fn test_required_with() {
        let rule = CrossFieldRule::required_with("phone", "sms_opt_in");
        assert!(evaluate(&rule, &data(json!({"sms_opt_in": true, "phone": ""}))).is_some());
        assert!(evaluate(&rule, &data(json!({"sms_opt_in": false}))).is_none());
        assert!(evaluate(&rule, &data(json!({"sms_opt_in": true, "phone": "555"}))).is_none());
    }
}
