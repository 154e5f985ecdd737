//! Submission validation

use serde_json::{Map, Value};

use super::coerce::{self, coerce};
use super::constraints::{self, REQUIRED};
use super::cross_field;
use super::result::{ErrorMap, ValidationResult};
use crate::errors::FormResult;
use crate::extract::{Extractor, FlatPayload};
use crate::observability::Event;
use crate::path::FieldPath;
use crate::schema::{
    ChildTarget, Constraints, FieldDef, FieldDescriptor, FieldKind, Introspector, LayoutNode,
    ScalarKind, Schema, SchemaCatalog, TypeCategory,
};

/// A submission in either wire shape
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Browser form data keyed by wire path
    Flat(FlatPayload),
    /// Already-nested data, e.g. a JSON request body
    Nested(Value),
}

impl From<FlatPayload> for Submission {
    fn from(payload: FlatPayload) -> Self {
        Submission::Flat(payload)
    }
}

impl From<Value> for Submission {
    fn from(value: Value) -> Self {
        Submission::Nested(value)
    }
}

/// Validates submissions against schemas and layouts.
///
/// Constraint violations are collected, never raised: every violated
/// field is reported in one pass, keyed by its full wire path. Errors are
/// returned only for schema bugs.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    catalog: &'a SchemaCatalog,
    introspector: Introspector<'a>,
    extractor: Extractor<'a>,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self {
            catalog,
            introspector: Introspector::new(catalog),
            extractor: Extractor::new(catalog),
        }
    }

    /// Validates a submission against `schema`.
    pub fn validate(
        &self,
        schema: &Schema,
        submission: impl Into<Submission>,
    ) -> FormResult<ValidationResult> {
        let candidate = match submission.into() {
            Submission::Flat(payload) => self.extractor.extract(&payload, schema)?,
            Submission::Nested(value) => self.extractor.restrict(&value, schema)?,
        };

        let mut errors = ErrorMap::new();
        let data = self.check_schema(schema, &candidate, &FieldPath::root(), &mut errors)?;

        Ok(self.finish(&schema.name, data, errors))
    }

    /// Validates a submission against a layout node.
    ///
    /// The result data holds one key per child name. Errors are keyed by
    /// the wire names of the inputs the layout renders.
    pub fn validate_layout(
        &self,
        layout: &LayoutNode,
        submission: impl Into<Submission>,
    ) -> FormResult<ValidationResult> {
        let candidate = match submission.into() {
            Submission::Flat(payload) => self.extractor.extract_layout(&payload, layout)?,
            Submission::Nested(value) => self.extractor.restrict_layout(&value, layout)?,
        };

        let mut errors = ErrorMap::new();
        let data = self.check_node(layout, &candidate, &FieldPath::root(), &mut errors)?;

        Ok(self.finish(&layout.name, data, errors))
    }

    fn finish(&self, form: &str, data: Map<String, Value>, errors: ErrorMap) -> ValidationResult {
        let result = ValidationResult::from_parts(data, errors);
        if result.is_valid() {
            tracing::info!(event = %Event::FormValidated, form, "form validated");
        } else {
            tracing::info!(
                event = %Event::ValidationFailed,
                form,
                fields = result.errors().len(),
                messages = result.error_count(),
                "form validation failed"
            );
        }
        result
    }

    fn check_schema(
        &self,
        schema: &Schema,
        value: &Map<String, Value>,
        prefix: &FieldPath,
        errors: &mut ErrorMap,
    ) -> FormResult<Map<String, Value>> {
        let mut out = Map::new();

        for field in self.introspector.fields_of(schema)? {
            let name = field.name();
            let path = prefix.child(name);
            let raw = value.get(name).filter(|v| !v.is_null());

            let checked = match field.category() {
                TypeCategory::Scalar => self.check_scalar(field.def, raw, &path, errors)?,
                TypeCategory::ListOfScalar => self.check_list(field.def, raw, &path, errors),
                TypeCategory::NestedObject => self.check_object(&field, raw, &path, errors)?,
                TypeCategory::ListOfObject => self.check_object_list(&field, raw, &path, errors)?,
                TypeCategory::LayoutReference => match field.layout() {
                    Some(layout) => {
                        let empty = Map::new();
                        let nested = raw.and_then(Value::as_object).unwrap_or(&empty);
                        // Layout children share the wire scope of the field's parent.
                        Some(Value::Object(self.check_node(layout, nested, prefix, errors)?))
                    }
                    None => None,
                },
            };

            if let Some(checked) = checked {
                out.insert(name.to_string(), checked);
            }
        }

        for rule in &schema.rules {
            if let Some(message) = cross_field::evaluate(rule, &out) {
                push(errors, &prefix.child(rule.target()), message);
            }
        }

        Ok(out)
    }

    fn check_node(
        &self,
        layout: &LayoutNode,
        value: &Map<String, Value>,
        prefix: &FieldPath,
        errors: &mut ErrorMap,
    ) -> FormResult<Map<String, Value>> {
        let empty = Map::new();
        let mut out = Map::new();

        for child in &layout.children {
            let raw = value.get(&child.name);

            let checked = if layout.is_repeating() {
                let list_path = prefix.child(child.name.clone());
                let items: &[Value] = match raw {
                    Some(Value::Array(items)) => items,
                    _ => &[],
                };

                let bounds = Constraints {
                    min_items: layout.option_usize("min_items"),
                    max_items: layout.option_usize("max_items"),
                    ..Default::default()
                };
                if let Some(message) = constraints::item_count(&bounds, present(items).count()) {
                    push(errors, &list_path, message);
                }

                let mut checked = Vec::with_capacity(items.len());
                for (i, item) in present(items) {
                    checked.push(Value::Object(self.check_target(
                        &child.target,
                        item,
                        &list_path.index(i),
                        errors,
                    )?));
                }
                Value::Array(checked)
            } else {
                let nested = raw.and_then(Value::as_object).unwrap_or(&empty);
                Value::Object(self.check_target(&child.target, nested, prefix, errors)?)
            };

            out.insert(child.name.clone(), checked);
        }

        Ok(out)
    }

    fn check_target(
        &self,
        target: &ChildTarget,
        value: &Map<String, Value>,
        prefix: &FieldPath,
        errors: &mut ErrorMap,
    ) -> FormResult<Map<String, Value>> {
        match target {
            ChildTarget::Schema(name) => {
                let schema = self.catalog.schema(name)?;
                self.check_schema(&schema, value, prefix, errors)
            }
            ChildTarget::Layout(name) => {
                let layout = self.catalog.layout(name)?;
                self.check_node(&layout, value, prefix, errors)
            }
        }
    }

    fn check_scalar(
        &self,
        def: &FieldDef,
        raw: Option<&Value>,
        path: &FieldPath,
        errors: &mut ErrorMap,
    ) -> FormResult<Option<Value>> {
        let Some(kind) = def.kind.scalar() else {
            return Ok(None);
        };

        // An unchecked checkbox submits nothing.
        if kind == ScalarKind::Boolean {
            let checked = match raw.map(coerce::boolean).unwrap_or(Ok(false)) {
                Ok(checked) => checked,
                Err(message) => {
                    push(errors, path, message);
                    return Ok(None);
                }
            };
            if def.required && !checked {
                push(errors, path, REQUIRED);
            }
            return Ok(Some(Value::Bool(checked)));
        }

        let coerced = match raw.map(|v| coerce(kind, v)).transpose() {
            Ok(coerced) => coerced.flatten(),
            Err(message) => {
                push(errors, path, message);
                return Ok(None);
            }
        };

        let Some(value) = coerced else {
            if def.required {
                push(errors, path, REQUIRED);
            }
            return Ok(None);
        };

        if matches!(&value, Value::String(s) if s.trim().is_empty()) {
            if def.required {
                push(errors, path, REQUIRED);
                return Ok(None);
            }
            return Ok(Some(value));
        }

        let pattern = def
            .constraints
            .pattern
            .as_deref()
            .and_then(|source| self.catalog.pattern(source));
        for message in constraints::check_scalar(def, &value, pattern)? {
            push(errors, path, message);
        }
        Ok(Some(value))
    }

    fn check_list(
        &self,
        def: &FieldDef,
        raw: Option<&Value>,
        path: &FieldPath,
        errors: &mut ErrorMap,
    ) -> Option<Value> {
        let FieldKind::List { item } = def.kind else {
            return None;
        };

        let items: Vec<&Value> = match raw {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single) => vec![single],
            None => Vec::new(),
        };

        if items.is_empty() {
            if def.required {
                push(errors, path, REQUIRED);
            } else if let Some(message) = constraints::item_count(&def.constraints, 0) {
                push(errors, path, message);
            }
            return raw.map(|_| Value::Array(Vec::new()));
        }

        if let Some(message) = constraints::item_count(&def.constraints, items.len()) {
            push(errors, path, message);
        }

        let mut checked = Vec::with_capacity(items.len());
        for (i, raw_item) in items.into_iter().enumerate() {
            match coerce(item, raw_item) {
                Ok(Some(value)) => {
                    if let Some(message) = constraints::check_choice(&def.constraints, &value) {
                        push(errors, &path.index(i), message);
                    }
                    checked.push(value);
                }
                Ok(None) => {}
                Err(message) => push(errors, &path.index(i), message),
            }
        }
        Some(Value::Array(checked))
    }

    fn check_object(
        &self,
        field: &FieldDescriptor<'_>,
        raw: Option<&Value>,
        path: &FieldPath,
        errors: &mut ErrorMap,
    ) -> FormResult<Option<Value>> {
        let Some(schema) = field.schema() else {
            return Ok(None);
        };

        match raw.and_then(Value::as_object) {
            Some(nested) => Ok(Some(Value::Object(self.check_schema(schema, nested, path, errors)?))),
            // Report the nested fields themselves so messages land next to inputs.
            None if field.def.required => Ok(Some(Value::Object(self.check_schema(
                schema,
                &Map::new(),
                path,
                errors,
            )?))),
            None => Ok(None),
        }
    }

    fn check_object_list(
        &self,
        field: &FieldDescriptor<'_>,
        raw: Option<&Value>,
        path: &FieldPath,
        errors: &mut ErrorMap,
    ) -> FormResult<Option<Value>> {
        let Some(schema) = field.schema() else {
            return Ok(None);
        };

        let items: &[Value] = match raw {
            Some(Value::Array(items)) => items,
            _ => &[],
        };

        let count = present(items).count();
        if count == 0 && field.def.required {
            push(errors, path, REQUIRED);
        } else if let Some(message) = constraints::item_count(&field.def.constraints, count) {
            push(errors, path, message);
        }

        let mut checked = Vec::with_capacity(count);
        for (i, item) in present(items) {
            checked.push(Value::Object(self.check_schema(schema, item, &path.index(i), errors)?));
        }

        Ok(raw.map(|_| Value::Array(checked)))
    }
}

/// Submitted items with their wire index.
///
/// Gap slots are skipped, so errors stay keyed by the index the client sent
/// while the validated list holds only submitted items.
fn present(items: &[Value]) -> impl Iterator<Item = (usize, &Map<String, Value>)> {
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| item.as_object().map(|item| (i, item)))
}

fn push(errors: &mut ErrorMap, path: &FieldPath, message: impl Into<String>) {
    errors.entry(path.encode()).or_default().push(message.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CrossFieldRule;
    use serde_json::json;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new()
            .with_schema(
                Schema::new("Pet")
                    .with_field(FieldDef::string("name").required())
                    .with_field(FieldDef::float("weight").minimum(0.01)),
            )
            .unwrap()
            .with_schema(
                Schema::new("Owner")
                    .with_field(FieldDef::string("name").required().min_length(2))
                    .with_field(FieldDef::integer("age").minimum(0.0))
                    .with_field(FieldDef::boolean("subscribe"))
                    .with_field(FieldDef::list("tags", ScalarKind::String).choices(["a", "b"]))
                    .with_field(FieldDef::object_list("pets", "Pet").items(Some(1), None)),
            )
            .unwrap()
    }

    fn validate(payload: FlatPayload) -> ValidationResult {
        let catalog = catalog();
        let owner = catalog.schema("Owner").unwrap();
        Validator::new(&catalog).validate(&owner, payload).unwrap()
    }

    #[test]
    fn test_valid_submission_is_coerced() {
        let result = validate(
            FlatPayload::new()
                .with("name", "Ann")
                .with("age", "41")
                .with("subscribe", "on")
                .with("tags[0]", "a")
                .with("pets[0].name", "Rex")
                .with("pets[0].weight", "4.5"),
        );

        assert!(result.is_valid(), "{:?}", result.errors());
        assert_eq!(
            Value::Object(result.into_data()),
            json!({
                "name": "Ann",
                "age": 41,
                "subscribe": true,
                "tags": ["a"],
                "pets": [{"name": "Rex", "weight": 4.5}]
            })
        );
    }

    #[test]
    fn test_every_violation_reported() {
        let result = validate(
            FlatPayload::new()
                .with("name", "A")
                .with("age", "old")
                .with("tags[0]", "z")
                .with("pets[0].weight", "-1"),
        );

        assert!(!result.is_valid());
        assert!(result.data().is_empty());
        assert_eq!(result.first_error("name"), Some("Must be at least 2 characters long"));
        assert_eq!(result.first_error("age"), Some("Must be a valid integer"));
        assert_eq!(result.first_error("tags[0]"), Some("Value is not a valid choice"));
        assert_eq!(result.first_error("pets[0].name"), Some("This field is required"));
        assert_eq!(result.first_error("pets[0].weight"), Some("Must be at least 0.01"));
    }

    #[test]
    fn test_missing_required_and_min_items() {
        let result = validate(FlatPayload::new());
        assert_eq!(result.first_error("name"), Some("This field is required"));
        assert_eq!(result.first_error("pets"), Some("Must have at least 1 items"));
        assert!(result.error_for("subscribe").is_none());
    }

    #[test]
    fn test_cross_field_rule_at_nested_level() {
        let catalog = SchemaCatalog::new()
            .with_schema(
                Schema::new("Credentials")
                    .with_field(FieldDef::string("password").required())
                    .with_field(FieldDef::string("confirm").required())
                    .with_rule(CrossFieldRule::fields_match("password", "confirm")),
            )
            .unwrap()
            .with_schema(Schema::new("Signup").with_field(FieldDef::object("login", "Credentials").required()))
            .unwrap();
        let signup = catalog.schema("Signup").unwrap();

        let result = Validator::new(&catalog)
            .validate(
                &signup,
                FlatPayload::new()
                    .with("login.password", "secret1")
                    .with("login.confirm", "secret2"),
            )
            .unwrap();
        assert_eq!(result.first_error("login.confirm"), Some("Must match password"));
    }

    #[test]
    fn test_nested_submission() {
        let catalog = catalog();
        let owner = catalog.schema("Owner").unwrap();
        let result = Validator::new(&catalog)
            .validate(
                &owner,
                json!({"name": "Ann", "role": "admin", "pets": [{"name": "Rex", "weight": 3}]}),
            )
            .unwrap();

        assert!(result.is_valid());
        assert!(!result.data().contains_key("role"));
        assert_eq!(result.data()["pets"][0]["weight"], json!(3.0));
    }

    #[test]
    fn test_numeric_choice_from_form_text() {
        let catalog = SchemaCatalog::new()
            .with_schema(Schema::new("Shirt").with_field(FieldDef::float("size").choices(["1", "2.5"])))
            .unwrap();
        let shirt = catalog.schema("Shirt").unwrap();
        let validator = Validator::new(&catalog);

        let result = validator.validate(&shirt, FlatPayload::new().with("size", "1")).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.data()["size"], json!(1.0));

        let result = validator.validate(&shirt, FlatPayload::new().with("size", "3")).unwrap();
        assert_eq!(result.first_error("size"), Some("Value is not a valid choice"));
    }

    #[test]
    fn test_nested_gap_keeps_item_index() {
        let catalog = catalog();
        let owner = catalog.schema("Owner").unwrap();
        let result = Validator::new(&catalog)
            .validate(
                &owner,
                json!({"name": "Ann", "pets": [{"name": "Rex"}, null, {"weight": 1}]}),
            )
            .unwrap();

        let keys: Vec<&str> = result.errors().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["pets[2].name"]);
    }
}
