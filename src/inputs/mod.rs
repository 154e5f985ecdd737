//! Input components
//!
//! An input component turns one leaf field into a markup fragment. The
//! engine hands it an [`InputContext`] carrying everything known about the
//! field at that location: its wire name, current value, constraints, UI
//! hints and any error messages. The component owns its markup entirely.
//!
//! Components are looked up by identifier (or alias) in an
//! [`InputRegistry`]. The built-in set is installed at construction and can
//! be overridden or extended at runtime; registering an existing identifier
//! replaces it.

mod components;
pub mod html;
mod registry;

use serde_json::Value;

use crate::path::FieldPath;
use crate::schema::{Constraints, FieldDef, FieldKind, UiSpec};

pub use components::{Checkbox, Hidden, HtmlInput, MultiSelect, Radio, Select, TextList, Textarea};
pub use registry::InputRegistry;

/// Canonical element identifiers
pub mod elements {
    pub const TEXT: &str = "text";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const URL: &str = "url";
    pub const TEL: &str = "tel";
    pub const SEARCH: &str = "search";
    pub const NUMBER: &str = "number";
    pub const RANGE: &str = "range";
    pub const DATE: &str = "date";
    pub const DATETIME: &str = "datetime";
    pub const TIME: &str = "time";
    pub const COLOR: &str = "color";
    pub const HIDDEN: &str = "hidden";
    pub const CHECKBOX: &str = "checkbox";
    pub const TEXTAREA: &str = "textarea";
    pub const SELECT: &str = "select";
    pub const RADIO: &str = "radio";
    pub const MULTISELECT: &str = "multiselect";
    pub const TEXT_LIST: &str = "text_list";

    // Structural elements, rendered by the layout engine itself
    pub const SUBFORM: &str = "subform";
    pub const MODEL_LIST: &str = "model_list";
    pub const LAYOUT: &str = "layout";
}

/// Renders a single leaf field.
pub trait InputComponent: Send + Sync {
    fn render(&self, input: &InputContext<'_>) -> String;
}

impl<F> InputComponent for F
where
    F: Fn(&InputContext<'_>) -> String + Send + Sync,
{
    fn render(&self, input: &InputContext<'_>) -> String {
        self(input)
    }
}

/// Everything an input component needs to render one field
#[derive(Debug, Clone)]
pub struct InputContext<'a> {
    /// Wire name (`pets[0].name`)
    pub name: String,
    /// DOM id derived from the wire name (`pets-0-name`)
    pub id: String,
    pub label: String,
    pub kind: &'a FieldKind,
    pub value: Option<&'a Value>,
    pub required: bool,
    pub constraints: &'a Constraints,
    pub ui: &'a UiSpec,
    pub errors: &'a [String],
}

impl<'a> InputContext<'a> {
    pub fn new(
        field: &'a FieldDef,
        path: &FieldPath,
        value: Option<&'a Value>,
        errors: &'a [String],
    ) -> Self {
        Self {
            name: path.encode(),
            id: path.to_dom_id(),
            label: field.display_label(),
            kind: &field.kind,
            value,
            required: field.required,
            constraints: &field.constraints,
            ui: &field.ui,
            errors,
        }
    }

    /// Current value as display text; empty when absent.
    pub fn value_text(&self) -> String {
        self.value.map(scalar_text).unwrap_or_default()
    }

    /// Current value as a list of display texts.
    pub fn values(&self) -> Vec<String> {
        match self.value {
            Some(Value::Array(items)) => items.iter().map(scalar_text).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![scalar_text(other)],
        }
    }

    /// Checkbox state of the current value.
    pub fn is_checked(&self) -> bool {
        match self.value {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => {
                matches!(s.to_ascii_lowercase().as_str(), "on" | "true" | "1" | "yes")
            }
            Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
            _ => false,
        }
    }

    /// `(value, label)` pairs from `choices`, or from the `choices` UI option.
    ///
    /// The option accepts plain strings, `[value, label]` pairs or
    /// `{"value": .., "label": ..}` objects.
    pub fn choices(&self) -> Vec<(String, String)> {
        if !self.constraints.choices.is_empty() {
            return self
                .constraints
                .choices
                .iter()
                .map(|c| (c.clone(), c.clone()))
                .collect();
        }

        let Some(Value::Array(entries)) = self.ui.options.get("choices") else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::Array(pair) if pair.len() == 2 => {
                    Some((scalar_text(&pair[0]), scalar_text(&pair[1])))
                }
                Value::Object(map) => {
                    let value = map.get("value").map(scalar_text)?;
                    let label = map
                        .get("label")
                        .map(scalar_text)
                        .unwrap_or_else(|| value.clone());
                    Some((value, label))
                }
                Value::Array(_) => None,
                scalar => {
                    let text = scalar_text(scalar);
                    Some((text.clone(), text))
                }
            })
            .collect()
    }

    /// UI option rendered as text (`step`, `rows`, ...).
    pub fn option_text(&self, key: &str) -> Option<String> {
        self.ui.options.get(key).map(scalar_text)
    }
}

/// Display text of a scalar value. Containers render empty.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
