//! Cross-field rule declarations
//!
//! Rules are data, not callbacks: each one names the fields it reads, the
//! field its error is attached to, and a message template. `{field}` in a
//! template expands to the field receiving the error, `{other}` to the
//! related field.

use serde::{Deserialize, Serialize};

/// The predicate a cross-field rule checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum CrossFieldCheck {
    /// `confirm` must equal `field` (password confirmation)
    FieldsMatch { field: String, confirm: String },
    /// `end` must be a later date than `start`
    DateOrder { start: String, end: String },
    /// `field` must be provided whenever `trigger` is provided
    RequiredWith { field: String, trigger: String },
}

/// A declared cross-field rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossFieldRule {
    #[serde(flatten)]
    pub check: CrossFieldCheck,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CrossFieldRule {
    pub fn fields_match(field: impl Into<String>, confirm: impl Into<String>) -> Self {
        Self {
            check: CrossFieldCheck::FieldsMatch {
                field: field.into(),
                confirm: confirm.into(),
            },
            message: None,
        }
    }

    pub fn date_order(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            check: CrossFieldCheck::DateOrder {
                start: start.into(),
                end: end.into(),
            },
            message: None,
        }
    }

    pub fn required_with(field: impl Into<String>, trigger: impl Into<String>) -> Self {
        Self {
            check: CrossFieldCheck::RequiredWith {
                field: field.into(),
                trigger: trigger.into(),
            },
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Both fields the rule reads
    pub fn referenced_fields(&self) -> [&str; 2] {
        match &self.check {
            CrossFieldCheck::FieldsMatch { field, confirm } => [field, confirm],
            CrossFieldCheck::DateOrder { start, end } => [start, end],
            CrossFieldCheck::RequiredWith { field, trigger } => [field, trigger],
        }
    }

    /// The field an error is attached to
    pub fn target(&self) -> &str {
        match &self.check {
            CrossFieldCheck::FieldsMatch { confirm, .. } => confirm,
            CrossFieldCheck::DateOrder { end, .. } => end,
            CrossFieldCheck::RequiredWith { field, .. } => field,
        }
    }

    /// The related field named by `{other}`
    pub fn other(&self) -> &str {
        match &self.check {
            CrossFieldCheck::FieldsMatch { field, .. } => field,
            CrossFieldCheck::DateOrder { start, .. } => start,
            CrossFieldCheck::RequiredWith { trigger, .. } => trigger,
        }
    }

    fn default_template(&self) -> &'static str {
        match self.check {
            CrossFieldCheck::FieldsMatch { .. } => "Must match {other}",
            CrossFieldCheck::DateOrder { .. } => "Must be after {other}",
            CrossFieldCheck::RequiredWith { .. } => "Required when {other} is provided",
        }
    }

    /// Expands the message template
    pub fn message(&self) -> String {
        let template = self.message.as_deref().unwrap_or(self.default_template());
        template
            .replace("{field}", self.target())
            .replace("{other}", self.other())
    }
}
