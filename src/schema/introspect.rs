//! Schema introspection
//!
//! Resolves a schema into the ordered list of field descriptors the
//! renderer, extractor and validator walk. Each descriptor carries the
//! resolved UI element and, for nested fields, the referenced sub-schema
//! or layout, so downstream code dispatches on the descriptor alone.

use std::sync::Arc;

use super::catalog::SchemaCatalog;
use super::layout::LayoutNode;
use super::types::{FieldDef, FieldKind, Format, Schema, TypeCategory, DEFAULT_FIELD_ORDER};
use crate::errors::{FormError, FormResult};
use crate::inputs::{elements, InputRegistry};

/// Referenced structure of a nested field
#[derive(Debug, Clone)]
pub enum Nested {
    Schema(Arc<Schema>),
    Layout(Arc<LayoutNode>),
}

/// A field with its UI element and nested reference resolved
#[derive(Debug, Clone)]
pub struct FieldDescriptor<'a> {
    pub def: &'a FieldDef,
    /// Canonical input identifier, or a structural element for nested fields
    pub element: String,
    pub nested: Option<Nested>,
}

impl<'a> FieldDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        &self.def.name
    }

    pub fn category(&self) -> TypeCategory {
        self.def.kind.category()
    }

    /// Sub-schema of object and object-list fields
    pub fn schema(&self) -> Option<&Arc<Schema>> {
        match &self.nested {
            Some(Nested::Schema(schema)) => Some(schema),
            _ => None,
        }
    }

    /// Layout node of layout-reference fields
    pub fn layout(&self) -> Option<&Arc<LayoutNode>> {
        match &self.nested {
            Some(Nested::Layout(layout)) => Some(layout),
            _ => None,
        }
    }
}

/// Resolves schemas against a catalog and, optionally, an input registry.
///
/// Without a registry, declared elements are accepted as written; with one,
/// a declared element that is not registered is an introspection error.
#[derive(Debug, Clone, Copy)]
pub struct Introspector<'a> {
    catalog: &'a SchemaCatalog,
    inputs: Option<&'a InputRegistry>,
}

impl<'a> Introspector<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self {
            catalog,
            inputs: None,
        }
    }

    pub fn with_inputs(mut self, inputs: &'a InputRegistry) -> Self {
        self.inputs = Some(inputs);
        self
    }

    pub fn catalog(&self) -> &'a SchemaCatalog {
        self.catalog
    }

    /// Ordered field descriptors of `schema`.
    ///
    /// Fields sort by `ui.order` (default 999); ties keep declaration order.
    pub fn fields_of<'s>(&self, schema: &'s Schema) -> FormResult<Vec<FieldDescriptor<'s>>> {
        let mut fields = schema
            .fields
            .iter()
            .map(|def| self.describe(schema, def))
            .collect::<FormResult<Vec<_>>>()?;

        fields.sort_by_key(|f| f.def.ui.order.unwrap_or(DEFAULT_FIELD_ORDER));
        Ok(fields)
    }

    /// Refuses schemas that nest themselves; see [`SchemaCatalog::check_acyclic`].
    pub fn check_acyclic(&self, schema: &Schema) -> FormResult<()> {
        self.catalog.check_acyclic(schema)
    }

    fn describe<'s>(&self, schema: &Schema, def: &'s FieldDef) -> FormResult<FieldDescriptor<'s>> {
        let (element, nested) = match &def.kind {
            FieldKind::Object { schema: name } => {
                let nested = self.catalog.schema(name)?;
                (
                    self.structural(schema, def, elements::SUBFORM, &["object"])?,
                    Some(Nested::Schema(nested)),
                )
            }
            FieldKind::ObjectList { schema: name } => {
                let nested = self.catalog.schema(name)?;
                (
                    self.structural(schema, def, elements::MODEL_LIST, &["list"])?,
                    Some(Nested::Schema(nested)),
                )
            }
            FieldKind::Layout { layout } => {
                let nested = self.catalog.layout(layout)?;
                (
                    self.structural(schema, def, elements::LAYOUT, &[])?,
                    Some(Nested::Layout(nested)),
                )
            }
            _ => (self.leaf_element(schema, def)?, None),
        };

        Ok(FieldDescriptor {
            def,
            element,
            nested,
        })
    }

    fn leaf_element(&self, schema: &Schema, def: &FieldDef) -> FormResult<String> {
        let Some(declared) = def.ui.element.as_deref() else {
            return Ok(default_element(def).to_string());
        };

        match self.inputs {
            Some(inputs) => inputs.resolve(declared).map(str::to_string).ok_or_else(|| {
                FormError::introspection(
                    &schema.name,
                    format!(
                        "field '{}' uses unregistered input element '{}'",
                        def.name, declared
                    ),
                )
            }),
            None => Ok(declared.to_string()),
        }
    }

    fn structural(
        &self,
        schema: &Schema,
        def: &FieldDef,
        element: &'static str,
        aliases: &[&str],
    ) -> FormResult<String> {
        match def.ui.element.as_deref() {
            None => Ok(element.to_string()),
            Some(declared) if declared == element || aliases.contains(&declared) => {
                Ok(element.to_string())
            }
            Some(declared) => Err(FormError::introspection(
                &schema.name,
                format!(
                    "{} field '{}' cannot use input element '{}'",
                    def.kind.type_name(),
                    def.name,
                    declared
                ),
            )),
        }
    }
}

/// Type-driven element for a leaf field without a declared one
pub fn default_element(def: &FieldDef) -> &'static str {
    let has_choices = !def.constraints.choices.is_empty();
    match &def.kind {
        FieldKind::String if has_choices => elements::SELECT,
        FieldKind::String => match def.constraints.format {
            Some(Format::Email) => elements::EMAIL,
            Some(Format::Url) => elements::URL,
            Some(Format::Phone) => elements::TEL,
            None => elements::TEXT,
        },
        FieldKind::Integer | FieldKind::Float => elements::NUMBER,
        FieldKind::Boolean => elements::CHECKBOX,
        FieldKind::Date => elements::DATE,
        FieldKind::List { .. } if has_choices => elements::MULTISELECT,
        FieldKind::List { .. } => elements::TEXT_LIST,
        FieldKind::Object { .. } => elements::SUBFORM,
        FieldKind::ObjectList { .. } => elements::MODEL_LIST,
        FieldKind::Layout { .. } => elements::LAYOUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ScalarKind;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new()
            .with_schema(Schema::new("Pet").with_field(FieldDef::string("name")))
            .unwrap()
            .with_schema(
                Schema::new("Owner")
                    .with_field(FieldDef::string("name"))
                    .with_field(FieldDef::string("email").format(Format::Email).order(1))
                    .with_field(FieldDef::boolean("active"))
                    .with_field(FieldDef::object_list("pets", "Pet"))
                    .with_field(FieldDef::list("tags", ScalarKind::String).choices(["a", "b"])),
            )
            .unwrap()
    }

    #[test]
    fn test_default_elements_and_order() {
        let catalog = catalog();
        let owner = catalog.schema("Owner").unwrap();
        let fields = Introspector::new(&catalog).fields_of(&owner).unwrap();

        let summary: Vec<(&str, &str)> = fields
            .iter()
            .map(|f| (f.name(), f.element.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("email", "email"),
                ("name", "text"),
                ("active", "checkbox"),
                ("pets", "model_list"),
                ("tags", "multiselect"),
            ]
        );
        assert_eq!(fields[3].schema().unwrap().name, "Pet");
        assert_eq!(fields[3].category(), TypeCategory::ListOfObject);
    }

    #[test]
    fn test_declared_alias_resolves_to_canonical() {
        let catalog = SchemaCatalog::new();
        let inputs = InputRegistry::new();
        let schema = Schema::new("Prefs").with_field(FieldDef::boolean("dark").element("toggle"));

        let fields = Introspector::new(&catalog)
            .with_inputs(&inputs)
            .fields_of(&schema)
            .unwrap();
        assert_eq!(fields[0].element, "checkbox");
    }

    #[test]
    fn test_unregistered_element_is_introspection_error() {
        let catalog = SchemaCatalog::new();
        let inputs = InputRegistry::new();
        let schema = Schema::new("Review").with_field(FieldDef::integer("stars").element("star_rating"));

        let err = Introspector::new(&catalog)
            .with_inputs(&inputs)
            .fields_of(&schema)
            .unwrap_err();
        assert_eq!(err.code(), "FORM_SCHEMA_INTROSPECTION");
        assert!(err.to_string().contains("star_rating"));
    }

    #[test]
    fn test_missing_nested_schema() {
        let catalog = SchemaCatalog::new();
        let schema = Schema::new("Owner").with_field(FieldDef::object("address", "Address"));
        let err = Introspector::new(&catalog).fields_of(&schema).unwrap_err();
        assert_eq!(err.code(), "FORM_UNKNOWN_SCHEMA");
    }
}
