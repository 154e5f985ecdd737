//! Layout engine
//!
//! Walks a schema (or layout node) and its current nested value, handing
//! each leaf field to its input component and each layout node to its
//! layout renderer. Nested schemas recurse through the engine itself.

use std::fmt::Write;

use serde_json::{Map, Value};

use super::config::FormConfig;
use super::context::{LayoutRequest, RenderContext};
use super::layouts::LayoutRegistry;
use crate::errors::FormResult;
use crate::extract::{Extractor, FlatPayload};
use crate::inputs::html::{error_messages, escape, Attributes};
use crate::inputs::{InputContext, InputRegistry};
use crate::observability::Event;
use crate::schema::{
    ChildTarget, FieldDescriptor, Introspector, LayoutChild, LayoutNode, Nested, Schema,
    SchemaCatalog, TypeCategory, UiSpec,
};
use crate::validate::ErrorMap;

/// Renders schemas and layouts against a catalog.
///
/// The engine owns its input and layout registries; hosts customize them
/// through [`inputs_mut`](Self::inputs_mut) and
/// [`layouts_mut`](Self::layouts_mut) before rendering.
#[derive(Debug, Clone)]
pub struct LayoutEngine<'a> {
    catalog: &'a SchemaCatalog,
    inputs: InputRegistry,
    layouts: LayoutRegistry,
}

impl<'a> LayoutEngine<'a> {
    /// Engine with the built-in inputs and layouts.
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self::with_registries(catalog, InputRegistry::new(), LayoutRegistry::new())
    }

    pub fn with_registries(
        catalog: &'a SchemaCatalog,
        inputs: InputRegistry,
        layouts: LayoutRegistry,
    ) -> Self {
        Self {
            catalog,
            inputs,
            layouts,
        }
    }

    pub fn catalog(&self) -> &'a SchemaCatalog {
        self.catalog
    }

    pub fn inputs(&self) -> &InputRegistry {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut InputRegistry {
        &mut self.inputs
    }

    pub fn layouts(&self) -> &LayoutRegistry {
        &self.layouts
    }

    pub fn layouts_mut(&mut self) -> &mut LayoutRegistry {
        &mut self.layouts
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Markup for `schema` filled with `value`.
    pub fn render_schema(&self, schema: &Schema, value: &Map<String, Value>) -> FormResult<String> {
        self.render_with_errors(schema, value, &ErrorMap::new())
    }

    /// Markup for `schema` with inline messages from a failed validation.
    pub fn render_with_errors(
        &self,
        schema: &Schema,
        value: &Map<String, Value>,
        errors: &ErrorMap,
    ) -> FormResult<String> {
        self.catalog.check_acyclic(schema)?;
        let context = RenderContext::new(errors);
        let html = format!(
            r#"<div class="form-schema" data-schema="{}">{}</div>"#,
            escape(&schema.name),
            self.render_fields(schema, value, &context)?
        );
        tracing::debug!(
            event = %Event::FormRendered,
            form = %schema.name,
            bytes = html.len(),
            "schema rendered"
        );
        Ok(html)
    }

    /// Markup for a layout node filled with `value` (one key per child).
    pub fn render_layout(&self, layout: &LayoutNode, value: &Map<String, Value>) -> FormResult<String> {
        self.render_layout_with_errors(layout, value, &ErrorMap::new())
    }

    pub fn render_layout_with_errors(
        &self,
        layout: &LayoutNode,
        value: &Map<String, Value>,
        errors: &ErrorMap,
    ) -> FormResult<String> {
        self.catalog.check_layout_acyclic(layout)?;
        let context = RenderContext::new(errors);
        let html = self.render_node(&layout.name, layout, value, None, &context)?;
        tracing::debug!(
            event = %Event::FormRendered,
            form = %layout.name,
            bytes = html.len(),
            "layout rendered"
        );
        Ok(html)
    }

    /// Re-renders a flat submission, keeping everything the user entered
    /// that the schema declares.
    pub fn render_submission(
        &self,
        schema: &Schema,
        payload: &FlatPayload,
        errors: &ErrorMap,
    ) -> FormResult<String> {
        let value = Extractor::new(self.catalog).extract(payload, schema)?;
        self.render_with_errors(schema, &value, errors)
    }

    /// Complete `<form>` element around the rendered schema.
    pub fn render_form(
        &self,
        schema: &Schema,
        value: &Map<String, Value>,
        errors: &ErrorMap,
        config: &FormConfig,
    ) -> FormResult<String> {
        let body = self.render_with_errors(schema, value, errors)?;
        let class = match config.css_class.as_deref().map(str::trim) {
            Some(extra) if !extra.is_empty() => format!("schema-form {}", extra),
            _ => "schema-form".to_string(),
        };
        let attrs = Attributes::new()
            .set("id", &config.form_id)
            .set("class", class)
            .set("action", &config.action)
            .set("method", &config.method)
            .set("enctype", &config.enctype)
            .flag("novalidate", config.novalidate);

        let mut out = format!("<form{}>", attrs.render());
        if let Some(token) = &config.csrf_token {
            let _ = write!(
                out,
                r#"<input type="hidden" name="csrf_token" value="{}">"#,
                escape(token)
            );
        }
        out.push_str(&body);
        if config.include_submit_button {
            let _ = write!(
                out,
                r#"<div class="form-actions"><button type="submit" class="btn btn-primary">{}</button></div>"#,
                escape(&config.submit_label)
            );
        }
        out.push_str("</form>");
        Ok(out)
    }

    // =========================================================================
    // Building blocks for layout renderers
    // =========================================================================

    /// Every field of `schema` in display order, in the context's scope.
    pub fn render_fields(
        &self,
        schema: &Schema,
        value: &Map<String, Value>,
        context: &RenderContext<'_>,
    ) -> FormResult<String> {
        let introspector = Introspector::new(self.catalog).with_inputs(&self.inputs);
        let mut out = String::new();
        for field in introspector.fields_of(schema)? {
            out.push_str(&self.render_field(&field, value, context)?);
        }
        Ok(out)
    }

    /// One layout node through its registered renderer.
    pub fn render_node(
        &self,
        field_name: &str,
        node: &LayoutNode,
        value: &Map<String, Value>,
        ui: Option<&UiSpec>,
        context: &RenderContext<'_>,
    ) -> FormResult<String> {
        let renderer = self.layouts.lookup(&node.kind)?;
        let kind = self.layouts.resolve(&node.kind).unwrap_or(&node.kind);
        let request = LayoutRequest {
            field_name,
            node,
            kind,
            value,
            ui,
            context,
        };
        renderer.render(&request, self)
    }

    /// A non-repeating layout child. The child reads its data under its
    /// own name and shares the layout's wire scope.
    pub fn render_child(&self, request: &LayoutRequest<'_>, child: &LayoutChild) -> FormResult<String> {
        let empty = Map::new();
        let value = request.child_value(&child.name).unwrap_or(&empty);
        self.render_target(&child.target, &child.name, value, request.context)
    }

    /// Item `index` of a repeating layout child, scoped to `child[index]`.
    pub fn render_item(
        &self,
        request: &LayoutRequest<'_>,
        child: &LayoutChild,
        index: usize,
        item: &Map<String, Value>,
    ) -> FormResult<String> {
        let prefix = request
            .context
            .prefix()
            .child(child.name.as_str())
            .index(index);
        let context = request.context.scoped(prefix);
        self.render_target(&child.target, &child.name, item, &context)
    }

    fn render_target(
        &self,
        target: &ChildTarget,
        name: &str,
        value: &Map<String, Value>,
        context: &RenderContext<'_>,
    ) -> FormResult<String> {
        match target {
            ChildTarget::Schema(schema) => {
                let schema = self.catalog.schema(schema)?;
                self.render_fields(&schema, value, context)
            }
            ChildTarget::Layout(layout) => {
                let layout = self.catalog.layout(layout)?;
                self.render_node(name, &layout, value, None, context)
            }
        }
    }

    // =========================================================================
    // Fields
    // =========================================================================

    fn render_field(
        &self,
        field: &FieldDescriptor<'_>,
        value: &Map<String, Value>,
        context: &RenderContext<'_>,
    ) -> FormResult<String> {
        let name = field.name();
        let path = context.prefix().child(name);

        match &field.nested {
            None => {
                let component = self.inputs.lookup(&field.element)?;
                let errors = context.errors_at(&path);
                let input = InputContext::new(field.def, &path, value.get(name), errors);
                Ok(component.render(&input))
            }
            Some(Nested::Schema(schema)) if field.category() == TypeCategory::ListOfObject => {
                // Rendered as a one-child list layout so items get `name[i]` scopes.
                let child = LayoutChild::schema(name, schema.name.as_str())
                    .title(field.def.display_label());
                let mut node = LayoutNode::list(schema.name.as_str()).with_child(child);
                if let Some(min) = field.def.constraints.min_items {
                    node = node.with_option("min_items", min as u64);
                }
                if let Some(max) = field.def.constraints.max_items {
                    node = node.with_option("max_items", max as u64);
                }
                self.render_node(name, &node, value, Some(&field.def.ui), context)
            }
            Some(Nested::Schema(schema)) => {
                let empty = Map::new();
                let nested = value.get(name).and_then(Value::as_object).unwrap_or(&empty);
                let errors = context.errors_at(&path);
                let inner = self.render_fields(schema, nested, &context.scoped(path.clone()))?;
                Ok(format!(
                    r#"<fieldset class="subform{}" data-field-name="{}"><legend class="subform-legend">{}</legend>{}{}</fieldset>"#,
                    if errors.is_empty() { "" } else { " has-error" },
                    escape(&path.encode()),
                    escape(&field.def.display_label()),
                    inner,
                    error_messages(&path.to_dom_id(), errors)
                ))
            }
            Some(Nested::Layout(layout)) => {
                let empty = Map::new();
                let nested = value.get(name).and_then(Value::as_object).unwrap_or(&empty);
                self.render_node(name, layout, nested, Some(&field.def.ui), context)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FormError;
    use crate::schema::FieldDef;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new()
            .with_schema(
                Schema::new("Pet")
                    .with_field(FieldDef::string("name").required())
                    .with_field(FieldDef::float("weight").minimum(0.01)),
            )
            .unwrap()
            .with_schema(Schema::new("Address").with_field(FieldDef::string("city")))
            .unwrap()
            .with_schema(
                Schema::new("Owner")
                    .with_field(FieldDef::string("name").required().min_length(2))
                    .with_field(FieldDef::object("address", "Address"))
                    .with_field(FieldDef::object_list("pets", "Pet").items(Some(1), None)),
            )
            .unwrap()
    }

    #[test]
    fn test_leaf_fields_use_wire_names() {
        let catalog = catalog();
        let engine = LayoutEngine::new(&catalog);
        let schema = catalog.schema("Owner").unwrap();

        let html = engine
            .render_schema(&schema, &object(json!({"name": "Ann", "address": {"city": "Oslo"}})))
            .unwrap();

        assert!(html.starts_with(r#"<div class="form-schema" data-schema="Owner">"#));
        assert!(html.contains(r#"name="name""#));
        assert!(html.contains(r#"value="Ann""#));
        assert!(html.contains(r#"minlength="2""#));
        assert!(html.contains(r#"<fieldset class="subform" data-field-name="address">"#));
        assert!(html.contains(r#"name="address.city""#));
        assert!(html.contains(r#"value="Oslo""#));
    }

    #[test]
    fn test_object_list_items() {
        let catalog = catalog();
        let engine = LayoutEngine::new(&catalog);
        let schema = catalog.schema("Owner").unwrap();

        let value = object(json!({"pets": [{"name": "Rex"}, {"name": "Tom", "weight": 4.5}]}));
        let html = engine.render_schema(&schema, &value).unwrap();

        assert!(html.contains(r#"class="list-layout""#));
        assert!(html.contains(r#"data-field-name="pets" data-min-items="1""#));
        assert_eq!(html.matches(r#"class="model-list-item""#).count(), 2);
        assert!(html.contains(r#"name="pets[0].name""#));
        assert!(html.contains(r#"name="pets[1].weight""#));
        assert!(html.contains(r#"value="4.5""#));
        assert!(html.contains(r#"class="add-item-btn" data-target="pets""#));
    }

    #[test]
    fn test_object_list_padded_to_min_items() {
        let catalog = catalog();
        let engine = LayoutEngine::new(&catalog);
        let schema = catalog.schema("Owner").unwrap();

        let html = engine.render_schema(&schema, &Map::new()).unwrap();
        assert_eq!(html.matches(r#"class="model-list-item""#).count(), 1);
        assert!(html.contains(r#"name="pets[0].name""#));
    }

    #[test]
    fn test_errors_rendered_inline() {
        let catalog = catalog();
        let engine = LayoutEngine::new(&catalog);
        let schema = catalog.schema("Owner").unwrap();

        let mut errors = ErrorMap::new();
        errors.insert("pets[0].weight".into(), vec!["Must be at least 0.01".into()]);
        let value = object(json!({"pets": [{"name": "Rex", "weight": -0.98}]}));
        let html = engine.render_with_errors(&schema, &value, &errors).unwrap();

        assert!(html.contains(r#"<div class="field-error" id="pets-0-weight-error" role="alert">Must be at least 0.01</div>"#));
        assert!(html.contains(r#"aria-invalid="true""#));
        assert!(html.contains(r#"value="-0.98""#));
    }

    #[test]
    fn test_render_submission_keeps_user_data() {
        let catalog = catalog();
        let engine = LayoutEngine::new(&catalog);
        let schema = catalog.schema("Owner").unwrap();

        let payload = FlatPayload::new()
            .with("name", "A")
            .with("pets[0].name", "Rex")
            .with("is_admin", "true");
        let html = engine.render_submission(&schema, &payload, &ErrorMap::new()).unwrap();

        assert!(html.contains(r#"value="A""#));
        assert!(html.contains(r#"value="Rex""#));
        assert!(!html.contains("is_admin"));
    }

    #[test]
    fn test_render_form_wrapper() {
        let catalog = catalog();
        let engine = LayoutEngine::new(&catalog);
        let schema = catalog.schema("Address").unwrap();

        let mut config = FormConfig::with_action("/addresses").csrf_token("tok<1>");
        config.form_id = "address-form".into();
        config.novalidate = true;
        let html = engine
            .render_form(&schema, &Map::new(), &ErrorMap::new(), &config)
            .unwrap();

        assert!(html.starts_with(
            r#"<form id="address-form" class="schema-form" action="/addresses" method="post" enctype="application/x-www-form-urlencoded" novalidate>"#
        ));
        assert!(html.contains(r#"<input type="hidden" name="csrf_token" value="tok&lt;1&gt;">"#));
        assert!(html.contains(r#"<button type="submit" class="btn btn-primary">Submit</button>"#));
        assert!(html.ends_with("</form>"));

        config.include_submit_button = false;
        let html = engine
            .render_form(&schema, &Map::new(), &ErrorMap::new(), &config)
            .unwrap();
        assert!(!html.contains(r#"type="submit""#));
    }

    #[test]
    fn test_unknown_layout_kind() {
        let catalog = catalog();
        let engine = LayoutEngine::new(&catalog);
        let node = LayoutNode::new("pages", "carousel").with_child(LayoutChild::schema("pet", "Pet"));

        let err = engine.render_layout(&node, &Map::new()).unwrap_err();
        assert!(matches!(err, FormError::UnknownLayoutKind(ref k) if k == "carousel"));
    }

    #[test]
    fn test_cyclic_schema_refused() {
        let catalog = SchemaCatalog::new()
            .with_schema(Schema::new("Node").with_field(FieldDef::object("next", "Node")))
            .unwrap();
        let engine = LayoutEngine::new(&catalog);
        let schema = catalog.schema("Node").unwrap();

        let err = engine.render_schema(&schema, &Map::new()).unwrap_err();
        assert!(err.is_introspection_error());
    }
}
