//! Field-level constraint checks on coerced values

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use super::coerce::DATE_FORMAT;
use crate::errors::{FormError, FormResult};
use crate::schema::{Constraints, FieldDef, FieldKind, Format};

pub const REQUIRED: &str = "This field is required";
pub const INVALID_FORMAT: &str = "Invalid format";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const INVALID_PHONE: &str = "Please enter a valid phone number";
pub const INVALID_URL: &str = "Please enter a valid URL";
pub const INVALID_CHOICE: &str = "Value is not a valid choice";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\+]?[1-9]?[\d\s\-\(\)\.]{10,15}$").expect("phone pattern compiles"))
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern compiles"))
}

/// Every violated constraint of a present, coerced scalar value.
///
/// `pattern` is the compiled form of the field's `pattern` constraint when
/// the caller has one; otherwise the pattern is compiled here.
pub fn check_scalar(def: &FieldDef, value: &Value, pattern: Option<&Regex>) -> FormResult<Vec<String>> {
    let constraints = &def.constraints;
    let mut messages = Vec::new();

    match &def.kind {
        FieldKind::String => {
            let text = value.as_str().unwrap_or_default();
            check_text(def, constraints, text, pattern, &mut messages)?;
        }
        FieldKind::Integer | FieldKind::Float => {
            if let Some(n) = value.as_f64() {
                if let Some(message) = numeric_bounds(constraints, n) {
                    messages.push(message);
                }
            }
        }
        FieldKind::Date => {
            let parsed = value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok());
            if let Some(date) = parsed {
                if let Some(message) = date_bounds(constraints, date) {
                    messages.push(message);
                }
            }
        }
        _ => {}
    }

    if !matches!(def.kind, FieldKind::Boolean) {
        if let Some(message) = check_choice(constraints, value) {
            messages.push(message.to_string());
        }
    }

    Ok(messages)
}

fn check_text(
    def: &FieldDef,
    constraints: &Constraints,
    text: &str,
    compiled: Option<&Regex>,
    messages: &mut Vec<String>,
) -> FormResult<()> {
    let length = text.chars().count();
    if let Some(min) = constraints.min_length {
        if length < min {
            messages.push(format!("Must be at least {} characters long", min));
        }
    }
    if let Some(max) = constraints.max_length {
        if length > max {
            messages.push(format!("Must be no more than {} characters long", max));
        }
    }

    if let Some(pattern) = &constraints.pattern {
        let matched = match compiled {
            Some(regex) => regex.is_match(text),
            None => Regex::new(pattern)
                .map_err(|source| FormError::InvalidPattern {
                    field: def.name.clone(),
                    pattern: pattern.clone(),
                    source,
                })?
                .is_match(text),
        };
        if !matched {
            messages.push(INVALID_FORMAT.to_string());
        }
    }

    if let Some(format) = constraints.format {
        let (regex, message) = match format {
            Format::Email => (email_regex(), INVALID_EMAIL),
            Format::Phone => (phone_regex(), INVALID_PHONE),
            Format::Url => (url_regex(), INVALID_URL),
        };
        if !regex.is_match(text) {
            messages.push(message.to_string());
        }
    }

    Ok(())
}

/// Inclusive bounds; the message names whichever bounds are declared.
pub fn numeric_bounds(constraints: &Constraints, n: f64) -> Option<String> {
    let below = constraints.minimum.is_some_and(|min| n < min);
    let above = constraints.maximum.is_some_and(|max| n > max);
    if !below && !above {
        return None;
    }

    Some(match (constraints.minimum, constraints.maximum) {
        (Some(min), Some(max)) => format!("Must be between {} and {}", min, max),
        (Some(min), None) => format!("Must be at least {}", min),
        (None, Some(max)) => format!("Must be no more than {}", max),
        (None, None) => return None,
    })
}

pub fn date_bounds(constraints: &Constraints, date: NaiveDate) -> Option<String> {
    let early = constraints.min_date.is_some_and(|min| date < min);
    let late = constraints.max_date.is_some_and(|max| date > max);
    if !early && !late {
        return None;
    }

    Some(match (constraints.min_date, constraints.max_date) {
        (Some(min), Some(max)) => format!("Date must be between {} and {}", min, max),
        (Some(min), None) => format!("Date must be on or after {}", min),
        (None, Some(max)) => format!("Date must be on or before {}", max),
        (None, None) => return None,
    })
}

/// Membership in `choices`.
///
/// Numbers match a choice with the same numeric value, so `1.0` is the
/// choice `"1"`. Other values compare on display text.
pub fn check_choice(constraints: &Constraints, value: &Value) -> Option<&'static str> {
    if constraints.choices.is_empty() {
        return None;
    }
    let found = match value {
        Value::String(s) => constraints.choices.iter().any(|c| c == s),
        Value::Number(n) => match n.as_f64() {
            Some(n) => constraints
                .choices
                .iter()
                .any(|c| c.trim().parse::<f64>().is_ok_and(|choice| choice == n)),
            None => false,
        },
        Value::Bool(b) => constraints.choices.iter().any(|c| *c == b.to_string()),
        _ => false,
    };
    (!found).then_some(INVALID_CHOICE)
}

/// Item count bounds for lists.
pub fn item_count(constraints: &Constraints, count: usize) -> Option<String> {
    if let Some(min) = constraints.min_items {
        if count < min {
            return Some(format!("Must have at least {} items", min));
        }
    }
    if let Some(max) = constraints.max_items {
        if count > max {
            return Some(format!("Must have no more than {} items", max));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_length_messages() {
        let field = FieldDef::string("name").min_length(2).max_length(4);
        assert_eq!(
            check_scalar(&field, &json!("a"), None).unwrap(),
            vec!["Must be at least 2 characters long"]
        );
        assert_eq!(
            check_scalar(&field, &json!("abcde"), None).unwrap(),
            vec!["Must be no more than 4 characters long"]
        );
        assert!(check_scalar(&field, &json!("åäö"), None).unwrap().is_empty());
    }

    #[test]
    fn test_numeric_messages() {
        let min_only = FieldDef::float("weight").minimum(0.01);
        assert_eq!(
            check_scalar(&min_only, &json!(-0.98), None).unwrap(),
            vec!["Must be at least 0.01"]
        );
        assert!(check_scalar(&min_only, &json!(0.01), None).unwrap().is_empty());

        let both = FieldDef::integer("age").minimum(0.0).maximum(120.0);
        assert_eq!(
            check_scalar(&both, &json!(150), None).unwrap(),
            vec!["Must be between 0 and 120"]
        );
    }

    #[test]
    fn test_formats() {
        let email = FieldDef::string("email").format(Format::Email);
        assert!(check_scalar(&email, &json!("ann@example.com"), None).unwrap().is_empty());
        assert_eq!(
            check_scalar(&email, &json!("ann@"), None).unwrap(),
            vec![INVALID_EMAIL]
        );

        let phone = FieldDef::string("phone").format(Format::Phone);
        assert!(check_scalar(&phone, &json!("+1 (555) 123-4567"), None).unwrap().is_empty());
        assert_eq!(check_scalar(&phone, &json!("12"), None).unwrap(), vec![INVALID_PHONE]);

        let url = FieldDef::string("site").format(Format::Url);
        assert!(check_scalar(&url, &json!("https://example.com/a"), None).unwrap().is_empty());
        assert_eq!(check_scalar(&url, &json!("example"), None).unwrap(), vec![INVALID_URL]);
    }

    #[test]
    fn test_pattern_and_choices() {
        let code = FieldDef::string("code").pattern("^[A-Z]{3}$");
        assert!(check_scalar(&code, &json!("ABC"), None).unwrap().is_empty());
        assert_eq!(check_scalar(&code, &json!("abc"), None).unwrap(), vec![INVALID_FORMAT]);

        let size = FieldDef::string("size").choices(["s", "m"]);
        assert_eq!(check_scalar(&size, &json!("xl"), None).unwrap(), vec![INVALID_CHOICE]);
    }

    #[test]
    fn test_compiled_pattern_used() {
        let code = FieldDef::string("code").pattern("^[A-Z]{3}$");
        let compiled = Regex::new("^[A-Z]{3}$").unwrap();
        assert!(check_scalar(&code, &json!("ABC"), Some(&compiled)).unwrap().is_empty());
        assert_eq!(
            check_scalar(&code, &json!("abc"), Some(&compiled)).unwrap(),
            vec![INVALID_FORMAT]
        );
    }

    #[test]
    fn test_numeric_choices() {
        let size = FieldDef::float("size").choices(["1", "2.5"]);
        assert!(check_scalar(&size, &json!(1.0), None).unwrap().is_empty());
        assert!(check_scalar(&size, &json!(2.5), None).unwrap().is_empty());
        assert_eq!(check_scalar(&size, &json!(3.0), None).unwrap(), vec![INVALID_CHOICE]);

        let level = FieldDef::integer("level").choices(["1", "2"]);
        assert!(check_scalar(&level, &json!(2), None).unwrap().is_empty());
        assert_eq!(check_scalar(&level, &json!(5), None).unwrap(), vec![INVALID_CHOICE]);
    }

    #[test]
    fn test_date_bounds() {
        let d = |s: &str| NaiveDate::parse_from_str(s, DATE_FORMAT).ok();
        let field = FieldDef::date("start").date_range(d("2024-01-01"), None);
        assert_eq!(
            check_scalar(&field, &json!("2023-12-31"), None).unwrap(),
            vec!["Date must be on or after 2024-01-01"]
        );
        assert!(check_scalar(&field, &json!("2024-01-01"), None).unwrap().is_empty());
    }

    #[test]
    fn test_item_count() {
        let constraints = Constraints {
            min_items: Some(1),
            max_items: Some(2),
            ..Constraints::default()
        };
        assert_eq!(
            item_count(&constraints, 0),
            Some("Must have at least 1 items".to_string())
        );
        assert_eq!(item_count(&constraints, 2), None);
    }
}
