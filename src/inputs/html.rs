//! Markup helpers shared by input components and layout renderers

use std::fmt::{Display, Write};

use super::InputContext;

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Ordered attribute list rendered as ` key="value"` pairs.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    parts: Vec<(String, Option<String>)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Display) -> Self {
        self.parts.push((key.to_string(), Some(value.to_string())));
        self
    }

    pub fn set_opt<V: Display>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// Boolean attribute, rendered bare when `on`.
    pub fn flag(mut self, key: &str, on: bool) -> Self {
        if on {
            self.parts.push((key.to_string(), None));
        }
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.parts {
            match value {
                Some(value) => {
                    let _ = write!(out, " {}=\"{}\"", key, escape(value));
                }
                None => {
                    let _ = write!(out, " {}", key);
                }
            }
        }
        out
    }
}

/// `base` plus an optional extra class from the field's `class` option.
pub fn class_list(base: &str, extra: Option<&str>) -> String {
    match extra {
        Some(extra) if !extra.trim().is_empty() => format!("{} {}", base, extra.trim()),
        _ => base.to_string(),
    }
}

/// `<label>` for the field, with a required marker.
pub fn label(input: &InputContext<'_>, class: &str) -> String {
    let marker = if input.required {
        r#" <span class="required-marker">*</span>"#
    } else {
        ""
    };
    format!(
        r#"<label for="{}" class="{}">{}{}</label>"#,
        escape(&input.id),
        class,
        escape(&input.label),
        marker
    )
}

/// Help text and inline error messages.
pub fn help_and_errors(input: &InputContext<'_>) -> String {
    let mut out = String::new();
    if let Some(help) = &input.ui.help_text {
        let _ = write!(
            out,
            r#"<small id="{}-help" class="form-help">{}</small>"#,
            escape(&input.id),
            escape(help)
        );
    }
    out.push_str(&error_messages(&input.id, input.errors));
    out
}

/// Inline error messages for the element with DOM id `id`.
pub fn error_messages(id: &str, messages: &[String]) -> String {
    let mut out = String::new();
    for message in messages {
        let _ = write!(
            out,
            r#"<div class="field-error" id="{}-error" role="alert">{}</div>"#,
            escape(id),
            escape(message)
        );
    }
    out
}

/// The standard field wrapper: label, control, help and errors.
pub fn field_wrapper(input: &InputContext<'_>, control: &str) -> String {
    format!(
        r#"<div class="{}" data-field="{}">{}{}{}</div>"#,
        wrapper_class("form-field", input),
        escape(&input.name),
        label(input, "form-label"),
        control,
        help_and_errors(input)
    )
}

pub fn wrapper_class(base: &str, input: &InputContext<'_>) -> String {
    if input.errors.is_empty() {
        base.to_string()
    } else {
        format!("{} has-error", base)
    }
}

/// `aria-invalid` / `aria-describedby` for a control.
pub fn aria(attrs: Attributes, input: &InputContext<'_>) -> Attributes {
    let mut described = Vec::new();
    if input.ui.help_text.is_some() {
        described.push(format!("{}-help", input.id));
    }
    if !input.errors.is_empty() {
        described.push(format!("{}-error", input.id));
    }

    let attrs = if input.errors.is_empty() {
        attrs
    } else {
        attrs.set("aria-invalid", "true")
    };
    if described.is_empty() {
        attrs
    } else {
        attrs.set("aria-describedby", described.join(" "))
    }
}
