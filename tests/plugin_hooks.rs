//! Plugin Hook Tests
//!
//! Third parties extend the engine without touching it:
//! - custom input components by identifier and alias
//! - custom layout kinds receiving the request and the engine
//! - overriding built-ins (last registration wins)
//! - snapshot/restore and reset for isolation between tests

use schemaforms::inputs::{InputContext, InputRegistry};
use schemaforms::render::{LayoutRegistry, RenderContext};
use schemaforms::schema::{FieldDef, LayoutChild, LayoutNode, Schema, SchemaCatalog};
use schemaforms::{FormError, FormResult, LayoutEngine, LayoutRequest};
use serde_json::{json, Map};

// =============================================================================
// Helper Functions
// =============================================================================

fn catalog() -> SchemaCatalog {
    SchemaCatalog::new()
        .with_schema(
            Schema::new("Review")
                .with_field(FieldDef::string("title"))
                .with_field(FieldDef::integer("score").element("stars")),
        )
        .unwrap()
        .with_schema(Schema::new("Note").with_field(FieldDef::string("body")))
        .unwrap()
}

fn star_rating(input: &InputContext<'_>) -> String {
    format!(
        r#"<star-rating name="{}" value="{}"></star-rating>"#,
        input.name,
        input.value_text()
    )
}

fn shouting_text(input: &InputContext<'_>) -> String {
    format!(r#"<input name="{}" class="loud">"#, input.name)
}

/// Renders each child inside a slide, delegating content to the engine.
fn carousel(request: &LayoutRequest<'_>, engine: &LayoutEngine<'_>) -> FormResult<String> {
    let mut out = format!(r#"<div class="{}">"#, request.container_class());
    for child in &request.node.children {
        out.push_str(r#"<div class="slide">"#);
        out.push_str(&engine.render_child(request, child)?);
        out.push_str("</div>");
    }
    out.push_str("</div>");
    Ok(out)
}

// =============================================================================
// Input Components
// =============================================================================

#[test]
fn test_unregistered_element_is_introspection_error() {
    let catalog = catalog();
    let engine = LayoutEngine::new(&catalog);
    let review = catalog.schema("Review").unwrap();

    let err = engine.render_schema(&review, &Map::new()).unwrap_err();
    assert!(matches!(err, FormError::SchemaIntrospection { .. }));
    assert!(err.to_string().contains("stars"));
}

#[test]
fn test_custom_input_component() {
    let catalog = catalog();
    let mut engine = LayoutEngine::new(&catalog);
    engine
        .inputs_mut()
        .register("star_rating", ["stars", "rating"], star_rating);
    let review = catalog.schema("Review").unwrap();

    let value = json!({"score": 4}).as_object().cloned().unwrap();
    let html = engine.render_schema(&review, &value).unwrap();
    assert!(html.contains(r#"<star-rating name="score" value="4"></star-rating>"#));
    assert!(html.contains(r#"name="title""#));
}

#[test]
fn test_override_builtin_then_reset() {
    let catalog = catalog();
    let mut engine = LayoutEngine::new(&catalog);
    let note = catalog.schema("Note").unwrap();

    engine.inputs_mut().register("text", ["string"], shouting_text);
    let html = engine.render_schema(&note, &Map::new()).unwrap();
    assert!(html.contains(r#"<input name="body" class="loud">"#));

    engine.inputs_mut().reset();
    let html = engine.render_schema(&note, &Map::new()).unwrap();
    assert!(!html.contains("loud"));
    assert!(html.contains(r#"type="text""#));
}

#[test]
fn test_snapshot_restore_isolates_registrations() {
    let mut registry = InputRegistry::new();
    let snapshot = registry.snapshot();

    registry.register("star_rating", ["stars"], star_rating);
    assert!(registry.contains("stars"));

    registry.restore(snapshot);
    assert!(!registry.contains("stars"));
    assert!(registry.contains("text"));
}

/// Engines hold independent registries.
#[test]
fn test_engines_do_not_share_registrations() {
    let catalog = catalog();
    let mut first = LayoutEngine::new(&catalog);
    let second = LayoutEngine::new(&catalog);

    first.inputs_mut().register("star_rating", ["stars"], star_rating);
    assert!(first.inputs().contains("stars"));
    assert!(!second.inputs().contains("stars"));
}

#[test]
fn test_empty_input_registry() {
    let catalog = catalog();
    let engine = LayoutEngine::with_registries(&catalog, InputRegistry::empty(), LayoutRegistry::new());
    let note = catalog.schema("Note").unwrap();

    let err = engine.render_schema(&note, &Map::new()).unwrap_err();
    assert!(matches!(err, FormError::UnknownInputKind(ref id) if id == "text"));
}

// =============================================================================
// Layout Renderers
// =============================================================================

#[test]
fn test_custom_layout_kind() {
    let catalog = catalog();
    let mut engine = LayoutEngine::new(&catalog);
    let node = LayoutNode::new("Slides", "carousel")
        .with_class("hero")
        .with_child(LayoutChild::schema("note", "Note"));

    assert!(matches!(
        engine.render_layout(&node, &Map::new()),
        Err(FormError::UnknownLayoutKind(_))
    ));

    engine.layouts_mut().register("carousel", ["slides"], carousel);
    let value = json!({"note": {"body": "hello"}}).as_object().cloned().unwrap();
    let html = engine.render_layout(&node, &value).unwrap();

    assert!(html.starts_with(r#"<div class="carousel-layout hero"><div class="slide">"#));
    assert!(html.contains(r#"name="body""#));
    assert!(html.contains(r#"value="hello""#));

    engine.layouts_mut().reset();
    assert!(engine.render_layout(&node, &Map::new()).is_err());
}

#[test]
fn test_override_builtin_layout() {
    let catalog = catalog();
    let mut engine = LayoutEngine::new(&catalog);
    engine.layouts_mut().register("tabbed", ["tabs"], carousel);

    let node = LayoutNode::tabbed("Tabs").with_child(LayoutChild::schema("note", "Note"));
    let html = engine.render_layout(&node, &Map::new()).unwrap();
    assert!(html.contains(r#"class="slide""#));
    assert!(!html.contains("tab-button"));
}

/// Custom renderers can render schemas directly through the engine.
#[test]
fn test_layout_renderer_uses_engine_building_blocks() {
    fn flat(request: &LayoutRequest<'_>, engine: &LayoutEngine<'_>) -> FormResult<String> {
        let schema = engine.catalog().schema("Note")?;
        let scoped: RenderContext<'_> = request.context.scoped(request.context.prefix().child("inner"));
        engine.render_fields(&schema, &Map::new(), &scoped)
    }

    let catalog = catalog();
    let mut engine = LayoutEngine::new(&catalog);
    engine.layouts_mut().register("flat", Vec::<String>::new(), flat);

    let node = LayoutNode::new("Wrapper", "flat");
    let html = engine.render_layout(&node, &Map::new()).unwrap();
    assert!(html.contains(r#"name="inner.body""#));
}
