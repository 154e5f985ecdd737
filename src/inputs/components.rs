//! Built-in input components

use std::fmt::Write;
use std::sync::Arc;

use super::html::{aria, class_list, escape, field_wrapper, help_and_errors, label, wrapper_class, Attributes};
use super::{elements, InputComponent, InputContext};
use crate::registry::Registry;
use crate::schema::FieldKind;

/// Single-line `<input>` of a given HTML type
#[derive(Debug, Clone, Copy)]
pub struct HtmlInput {
    pub input_type: &'static str,
}

impl HtmlInput {
    pub const fn new(input_type: &'static str) -> Self {
        Self { input_type }
    }

    fn is_textual(&self) -> bool {
        matches!(
            self.input_type,
            "text" | "email" | "password" | "url" | "tel" | "search"
        )
    }

    fn is_numeric(&self) -> bool {
        matches!(self.input_type, "number" | "range")
    }
}

impl InputComponent for HtmlInput {
    fn render(&self, input: &InputContext<'_>) -> String {
        let constraints = input.constraints;
        let mut attrs = Attributes::new()
            .set("type", self.input_type)
            .set("name", &input.name)
            .set("id", &input.id)
            .set("class", class_list("form-input", input.ui.option_str("class")));

        // Passwords are never echoed back into markup.
        if self.input_type != "password" {
            let value = input.value_text();
            if !value.is_empty() {
                attrs = attrs.set("value", value);
            }
        }

        attrs = attrs
            .flag("required", input.required)
            .set_opt("placeholder", input.ui.placeholder.as_deref());

        if self.is_textual() {
            attrs = attrs
                .set_opt("minlength", constraints.min_length)
                .set_opt("maxlength", constraints.max_length)
                .set_opt("pattern", constraints.pattern.as_deref());
        }

        if self.is_numeric() {
            let step = input.option_text("step").or_else(|| match input.kind {
                FieldKind::Float => Some("any".to_string()),
                _ => None,
            });
            attrs = attrs
                .set_opt("min", constraints.minimum)
                .set_opt("max", constraints.maximum)
                .set_opt("step", step);
        }

        if self.input_type == "date" {
            attrs = attrs
                .set_opt("min", constraints.min_date)
                .set_opt("max", constraints.max_date);
        }

        let attrs = aria(attrs, input);
        field_wrapper(input, &format!("<input{}>", attrs.render()))
    }
}

/// Hidden input, rendered without label or wrapper
#[derive(Debug, Clone, Copy, Default)]
pub struct Hidden;

impl InputComponent for Hidden {
    fn render(&self, input: &InputContext<'_>) -> String {
        let attrs = Attributes::new()
            .set("type", "hidden")
            .set("name", &input.name)
            .set("id", &input.id)
            .set("value", input.value_text());
        format!("<input{}>", attrs.render())
    }
}

/// Checkbox; an unchecked box submits nothing and reads as `false`
#[derive(Debug, Clone, Copy, Default)]
pub struct Checkbox;

impl InputComponent for Checkbox {
    fn render(&self, input: &InputContext<'_>) -> String {
        let attrs = Attributes::new()
            .set("type", "checkbox")
            .set("name", &input.name)
            .set("id", &input.id)
            .set("value", "true")
            .set("class", class_list("form-check-input", input.ui.option_str("class")))
            .flag("checked", input.is_checked())
            .flag("required", input.required);
        let attrs = aria(attrs, input);

        format!(
            r#"<div class="{}" data-field="{}"><input{}>{}{}</div>"#,
            wrapper_class("form-field form-check", input),
            escape(&input.name),
            attrs.render(),
            label(input, "form-check-label"),
            help_and_errors(input)
        )
    }
}

/// Multi-line text
#[derive(Debug, Clone, Copy, Default)]
pub struct Textarea;

impl InputComponent for Textarea {
    fn render(&self, input: &InputContext<'_>) -> String {
        let attrs = Attributes::new()
            .set("name", &input.name)
            .set("id", &input.id)
            .set("class", class_list("form-textarea", input.ui.option_str("class")))
            .set("rows", input.option_text("rows").unwrap_or_else(|| "4".to_string()))
            .flag("required", input.required)
            .set_opt("placeholder", input.ui.placeholder.as_deref())
            .set_opt("minlength", input.constraints.min_length)
            .set_opt("maxlength", input.constraints.max_length);
        let attrs = aria(attrs, input);

        let control = format!(
            "<textarea{}>{}</textarea>",
            attrs.render(),
            escape(&input.value_text())
        );
        field_wrapper(input, &control)
    }
}

fn render_options(out: &mut String, choices: &[(String, String)], selected: &[String]) {
    for (value, text) in choices {
        let attrs = Attributes::new()
            .set("value", value)
            .flag("selected", selected.contains(value));
        let _ = write!(out, "<option{}>{}</option>", attrs.render(), escape(text));
    }
}

/// Drop-down with one selected value
#[derive(Debug, Clone, Copy, Default)]
pub struct Select;

impl InputComponent for Select {
    fn render(&self, input: &InputContext<'_>) -> String {
        let attrs = Attributes::new()
            .set("name", &input.name)
            .set("id", &input.id)
            .set("class", class_list("form-select", input.ui.option_str("class")))
            .flag("required", input.required);
        let attrs = aria(attrs, input);

        let placeholder = input.ui.placeholder.as_deref().unwrap_or("Select...");
        let mut control = format!(
            r#"<select{}><option value="">{}</option>"#,
            attrs.render(),
            escape(placeholder)
        );
        render_options(&mut control, &input.choices(), &[input.value_text()]);
        control.push_str("</select>");

        field_wrapper(input, &control)
    }
}

/// Drop-down submitting every selected value under the same key
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiSelect;

impl InputComponent for MultiSelect {
    fn render(&self, input: &InputContext<'_>) -> String {
        let attrs = Attributes::new()
            .set("name", &input.name)
            .set("id", &input.id)
            .set("class", class_list("form-select", input.ui.option_str("class")))
            .flag("multiple", true)
            .flag("required", input.required);
        let attrs = aria(attrs, input);

        let mut control = format!("<select{}>", attrs.render());
        render_options(&mut control, &input.choices(), &input.values());
        control.push_str("</select>");

        field_wrapper(input, &control)
    }
}

/// Radio group
#[derive(Debug, Clone, Copy, Default)]
pub struct Radio;

impl InputComponent for Radio {
    fn render(&self, input: &InputContext<'_>) -> String {
        let current = input.value_text();
        let mut out = format!(
            r#"<fieldset class="{}" data-field="{}"><legend class="form-label">{}</legend>"#,
            wrapper_class("form-field radio-group", input),
            escape(&input.name),
            escape(&input.label)
        );

        for (i, (value, text)) in input.choices().iter().enumerate() {
            let attrs = Attributes::new()
                .set("type", "radio")
                .set("name", &input.name)
                .set("id", format!("{}-{}", input.id, i))
                .set("value", value)
                .flag("checked", *value == current)
                .flag("required", input.required && i == 0);
            let _ = write!(
                out,
                r#"<label class="radio-option"><input{}> {}</label>"#,
                attrs.render(),
                escape(text)
            );
        }

        out.push_str(&help_and_errors(input));
        out.push_str("</fieldset>");
        out
    }
}

/// One text input per list item, plus a blank slot for a new item
#[derive(Debug, Clone, Copy, Default)]
pub struct TextList;

impl InputComponent for TextList {
    fn render(&self, input: &InputContext<'_>) -> String {
        let mut out = format!(
            r#"<fieldset class="{}" data-field="{}"><legend class="form-label">{}</legend>"#,
            wrapper_class("form-field text-list", input),
            escape(&input.name),
            escape(&input.label)
        );

        let mut items = input.values();
        items.push(String::new());
        for (i, item) in items.iter().enumerate() {
            let attrs = Attributes::new()
                .set("type", "text")
                .set("name", format!("{}[{}]", input.name, i))
                .set("id", format!("{}-{}", input.id, i))
                .set("class", "form-input text-list-item")
                .set("value", item);
            let _ = write!(out, "<input{}>", attrs.render());
        }

        out.push_str(&help_and_errors(input));
        out.push_str("</fieldset>");
        out
    }
}

fn add(
    registry: &mut Registry<dyn InputComponent>,
    id: &str,
    aliases: &[&str],
    component: Arc<dyn InputComponent>,
) {
    registry.register(id, aliases.iter().copied(), component);
}

/// Installs the built-in component set.
pub(super) fn install_builtins(registry: &mut Registry<dyn InputComponent>) {
    add(registry, elements::TEXT, &["string", "text_input"], Arc::new(HtmlInput::new("text")));
    add(registry, elements::EMAIL, &["email_input"], Arc::new(HtmlInput::new("email")));
    add(registry, elements::PASSWORD, &["password_input"], Arc::new(HtmlInput::new("password")));
    add(registry, elements::URL, &["url_input"], Arc::new(HtmlInput::new("url")));
    add(registry, elements::TEL, &["phone", "tel_input"], Arc::new(HtmlInput::new("tel")));
    add(registry, elements::SEARCH, &[], Arc::new(HtmlInput::new("search")));
    add(registry, elements::NUMBER, &["integer", "float", "number_input"], Arc::new(HtmlInput::new("number")));
    add(registry, elements::RANGE, &["slider"], Arc::new(HtmlInput::new("range")));
    add(registry, elements::DATE, &["date_input"], Arc::new(HtmlInput::new("date")));
    add(
        registry,
        elements::DATETIME,
        &["datetime-local", "datetime_input"],
        Arc::new(HtmlInput::new("datetime-local")),
    );
    add(registry, elements::TIME, &[], Arc::new(HtmlInput::new("time")));
    add(registry, elements::COLOR, &["color_input"], Arc::new(HtmlInput::new("color")));
    add(registry, elements::HIDDEN, &[], Arc::new(Hidden));
    add(registry, elements::CHECKBOX, &["boolean", "toggle", "checkbox_input"], Arc::new(Checkbox));
    add(registry, elements::TEXTAREA, &["text_area", "textarea_input"], Arc::new(Textarea));
    add(registry, elements::SELECT, &["dropdown"], Arc::new(Select));
    add(registry, elements::RADIO, &["radio_group"], Arc::new(Radio));
    add(registry, elements::MULTISELECT, &["multi_select"], Arc::new(MultiSelect));
    add(registry, elements::TEXT_LIST, &["tags"], Arc::new(TextList));
}
