//! Schema descriptor types
//!
//! Supported field kinds:
//! - string, integer, float, boolean, date: scalars
//! - list: repeated scalar values
//! - object: nested sub-form referencing another schema
//! - object_list: repeatable group of sub-forms
//! - layout: reference to a layout node grouping child schemas

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::rules::CrossFieldRule;
use crate::errors::{FormError, FormResult};
use crate::path::Segment;

/// Scalar value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Boolean,
    Date,
}

impl ScalarKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Date => "date",
        }
    }
}

/// Coarse type category used to dispatch rendering, extraction and validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Scalar,
    ListOfScalar,
    NestedObject,
    ListOfObject,
    LayoutReference,
}

/// Declared field type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    /// Repeated scalar values (`tags[0]`, `tags[1]` or a repeated `tags` key)
    List { item: ScalarKind },
    /// Nested sub-form
    Object { schema: String },
    /// Repeatable group of sub-forms
    ObjectList { schema: String },
    /// Grouping of child schemas through a layout node
    Layout { layout: String },
}

impl FieldKind {
    /// Returns the type name for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::List { .. } => "list",
            FieldKind::Object { .. } => "object",
            FieldKind::ObjectList { .. } => "object_list",
            FieldKind::Layout { .. } => "layout",
        }
    }

    pub fn category(&self) -> TypeCategory {
        match self {
            FieldKind::String
            | FieldKind::Integer
            | FieldKind::Float
            | FieldKind::Boolean
            | FieldKind::Date => TypeCategory::Scalar,
            FieldKind::List { .. } => TypeCategory::ListOfScalar,
            FieldKind::Object { .. } => TypeCategory::NestedObject,
            FieldKind::ObjectList { .. } => TypeCategory::ListOfObject,
            FieldKind::Layout { .. } => TypeCategory::LayoutReference,
        }
    }

    /// Scalar kind of a scalar field
    pub fn scalar(&self) -> Option<ScalarKind> {
        match self {
            FieldKind::String => Some(ScalarKind::String),
            FieldKind::Integer => Some(ScalarKind::Integer),
            FieldKind::Float => Some(ScalarKind::Float),
            FieldKind::Boolean => Some(ScalarKind::Boolean),
            FieldKind::Date => Some(ScalarKind::Date),
            _ => None,
        }
    }

    /// Name of the referenced schema for object and object-list fields
    pub fn schema_ref(&self) -> Option<&str> {
        match self {
            FieldKind::Object { schema } | FieldKind::ObjectList { schema } => Some(schema),
            _ => None,
        }
    }

    /// Name of the referenced layout for layout fields
    pub fn layout_ref(&self) -> Option<&str> {
        match self {
            FieldKind::Layout { layout } => Some(layout),
            _ => None,
        }
    }
}

impl From<ScalarKind> for FieldKind {
    fn from(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::String => FieldKind::String,
            ScalarKind::Integer => FieldKind::Integer,
            ScalarKind::Float => FieldKind::Float,
            ScalarKind::Boolean => FieldKind::Boolean,
            ScalarKind::Date => FieldKind::Date,
        }
    }
}

/// Well-known string formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Email,
    Url,
    Phone,
}

/// Field-level validation constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Inclusive lower bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_date: Option<NaiveDate>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }
}

/// Rendering hints attached to a field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSpec {
    /// Input component identifier or alias
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Sort key; fields without one keep declaration order after ordered ones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    /// Free-form hints (`rows`, `step`, `class`, `columns`, ...)
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl UiSpec {
    pub fn is_empty(&self) -> bool {
        *self == UiSpec::default()
    }

    /// String option lookup
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

/// Default sort key for fields without an explicit `order`
pub const DEFAULT_FIELD_ORDER: i32 = 999;

/// Field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
    #[serde(default, skip_serializing_if = "UiSpec::is_empty")]
    pub ui: UiSpec,
}

impl FieldDef {
    /// Create an optional field of the given kind
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            constraints: Constraints::default(),
            ui: UiSpec::default(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn list(name: impl Into<String>, item: ScalarKind) -> Self {
        Self::new(name, FieldKind::List { item })
    }

    pub fn object(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::Object {
                schema: schema.into(),
            },
        )
    }

    pub fn object_list(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::ObjectList {
                schema: schema.into(),
            },
        )
    }

    pub fn layout(name: impl Into<String>, layout: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::Layout {
                layout: layout.into(),
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.constraints.min_length = Some(length);
        self
    }

    pub fn max_length(mut self, length: usize) -> Self {
        self.constraints.max_length = Some(length);
        self
    }

    pub fn minimum(mut self, value: f64) -> Self {
        self.constraints.minimum = Some(value);
        self
    }

    pub fn maximum(mut self, value: f64) -> Self {
        self.constraints.maximum = Some(value);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.constraints.format = Some(format);
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn items(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.constraints.min_items = min;
        self.constraints.max_items = max;
        self
    }

    pub fn date_range(mut self, min: Option<NaiveDate>, max: Option<NaiveDate>) -> Self {
        self.constraints.min_date = min;
        self.constraints.max_date = max;
        self
    }

    pub fn element(mut self, element: impl Into<String>) -> Self {
        self.ui.element = Some(element.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.ui.label = Some(label.into());
        self
    }

    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.ui.help_text = Some(text.into());
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.ui.placeholder = Some(text.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.ui.order = Some(order);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ui.options.insert(key.into(), value.into());
        self
    }

    /// Human-readable label: the declared one, or the title-cased name
    pub fn display_label(&self) -> String {
        self.ui
            .label
            .clone()
            .unwrap_or_else(|| title_case(&self.name))
    }
}

/// Complete schema descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Unique name within a catalog
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field definitions in declaration order
    pub fields: Vec<FieldDef>,
    /// Cross-field rules evaluated after per-field checks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<CrossFieldRule>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            fields: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_rule(mut self, rule: CrossFieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn display_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| title_case(&self.name))
    }

    /// Compiled `pattern` constraints keyed by their source text.
    pub fn compile_patterns(&self) -> FormResult<HashMap<String, Regex>> {
        let mut compiled = HashMap::new();
        for field in &self.fields {
            let Some(pattern) = &field.constraints.pattern else {
                continue;
            };
            if compiled.contains_key(pattern) {
                continue;
            }
            let regex = Regex::new(pattern).map_err(|source| FormError::InvalidPattern {
                field: field.name.clone(),
                pattern: pattern.clone(),
                source,
            })?;
            compiled.insert(pattern.clone(), regex);
        }
        Ok(compiled)
    }

    /// Validates the descriptor itself (not a submission).
    ///
    /// Field names must be unique and encodable, patterns must compile and
    /// cross-field rules may only reference declared fields.
    pub fn validate_structure(&self) -> FormResult<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !Segment::is_valid_field_name(&field.name) {
                return Err(FormError::introspection(
                    &self.name,
                    format!("field name '{}' cannot be used in a wire path", field.name),
                ));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(FormError::introspection(
                    &self.name,
                    format!("duplicate field '{}'", field.name),
                ));
            }
        }
        self.compile_patterns()?;

        for rule in &self.rules {
            for name in rule.referenced_fields() {
                if !seen.contains(name) {
                    return Err(FormError::introspection(
                        &self.name,
                        format!("cross-field rule references undeclared field '{}'", name),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// `first_name` -> `First Name`
pub fn title_case(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> Schema {
        Schema::new("User")
            .with_field(FieldDef::string("name").required().min_length(2))
            .with_field(FieldDef::integer("age").minimum(0.0))
            .with_field(FieldDef::object("address", "Address"))
    }

    #[test]
    fn test_schema_structure_valid() {
        assert!(sample_schema().validate_structure().is_ok());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let schema = Schema::new("User")
            .with_field(FieldDef::string("name"))
            .with_field(FieldDef::integer("name"));
        let err = schema.validate_structure().unwrap_err();
        assert!(err.to_string().contains("duplicate field 'name'"));
    }

    #[test]
    fn test_unencodable_field_name_rejected() {
        let schema = Schema::new("User").with_field(FieldDef::string("a.b"));
        assert!(schema.validate_structure().is_err());
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let schema = Schema::new("User").with_field(FieldDef::string("code").pattern("(unclosed"));
        let err = schema.validate_structure().unwrap_err();
        assert_eq!(err.code(), "FORM_INVALID_PATTERN");
    }

    #[test]
    fn test_rule_must_reference_declared_fields() {
        let schema = Schema::new("Signup")
            .with_field(FieldDef::string("password"))
            .with_rule(CrossFieldRule::fields_match("password", "confirm_password"));
        assert!(schema.validate_structure().is_err());
    }

    #[test]
    fn test_field_kind_categories() {
        assert_eq!(FieldKind::String.category(), TypeCategory::Scalar);
        assert_eq!(
            FieldKind::List {
                item: ScalarKind::String
            }
            .category(),
            TypeCategory::ListOfScalar
        );
        assert_eq!(
            FieldKind::ObjectList {
                schema: "Pet".into()
            }
            .category(),
            TypeCategory::ListOfObject
        );
        assert_eq!(
            FieldKind::Object {
                schema: "Pet".into()
            }
            .schema_ref(),
            Some("Pet")
        );
        assert_eq!(FieldKind::Date.scalar(), Some(ScalarKind::Date));
    }

    #[test]
    fn test_field_def_deserializes_flat_kind() {
        let field: FieldDef = serde_json::from_value(json!({
            "name": "pets",
            "type": "object_list",
            "schema": "Pet",
            "required": true,
            "constraints": { "min_items": 1 },
            "ui": { "label": "Your pets" }
        }))
        .unwrap();

        assert_eq!(
            field.kind,
            FieldKind::ObjectList {
                schema: "Pet".into()
            }
        );
        assert!(field.required);
        assert_eq!(field.constraints.min_items, Some(1));
        assert_eq!(field.display_label(), "Your pets");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("first_name"), "First Name");
        assert_eq!(title_case("email"), "Email");
        assert_eq!(FieldDef::string("postal_code").display_label(), "Postal Code");
    }
}
