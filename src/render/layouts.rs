//! Layout renderers
//!
//! A layout renderer turns one layout node into markup, asking the engine
//! to render each child. Renderers are looked up by the node's `kind` in a
//! [`LayoutRegistry`]; hosts install their own kinds at runtime.
//!
//! Container markup is part of the front-end contract: the outer element
//! carries `<kind>-layout` plus any custom class, tab buttons carry
//! `tab-button`, tab panels `tab-panel`, accordion sections
//! `accordion-section` with `aria-expanded` on their header.

use std::fmt::Write;
use std::sync::Arc;

use super::context::LayoutRequest;
use super::engine::LayoutEngine;
use crate::errors::{FormError, FormResult};
use crate::inputs::html::{error_messages, escape};
use crate::observability::Event;
use crate::registry::{Registry, RegistrySnapshot};
use crate::schema::kinds;

/// Renders one layout node.
pub trait LayoutRenderer: Send + Sync {
    fn render(&self, request: &LayoutRequest<'_>, engine: &LayoutEngine<'_>) -> FormResult<String>;
}

impl<F> LayoutRenderer for F
where
    F: Fn(&LayoutRequest<'_>, &LayoutEngine<'_>) -> FormResult<String> + Send + Sync,
{
    fn render(&self, request: &LayoutRequest<'_>, engine: &LayoutEngine<'_>) -> FormResult<String> {
        self(request, engine)
    }
}

/// Children stacked in one container; the kind picks the orientation class.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stacked;

impl LayoutRenderer for Stacked {
    fn render(&self, request: &LayoutRequest<'_>, engine: &LayoutEngine<'_>) -> FormResult<String> {
        let mut out = open_container(request);
        for child in &request.node.children {
            let _ = write!(
                out,
                r#"<section class="layout-section" data-child="{}"><h3 class="layout-section-title">{}</h3>{}</section>"#,
                escape(&child.name),
                escape(&child.display_title()),
                engine.render_child(request, child)?
            );
        }
        out.push_str("</div>");
        Ok(out)
    }
}

/// One tab button and one panel per child; the first tab starts active.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tabbed;

impl LayoutRenderer for Tabbed {
    fn render(&self, request: &LayoutRequest<'_>, engine: &LayoutEngine<'_>) -> FormResult<String> {
        let base = request.dom_base();
        let mut nav = String::new();
        let mut panels = String::new();

        for (i, child) in request.node.children.iter().enumerate() {
            let active = i == 0;
            let tab_id = format!("{}-tab-{}", base, i);
            let panel_id = format!("{}-panel-{}", base, i);
            let _ = write!(
                nav,
                r#"<button type="button" class="tab-button{}" id="{}" role="tab" aria-selected="{}" aria-controls="{}">{}</button>"#,
                if active { " active" } else { "" },
                tab_id,
                active,
                panel_id,
                escape(&child.display_title())
            );
            let _ = write!(
                panels,
                r#"<div class="tab-panel{}" id="{}" role="tabpanel" aria-labelledby="{}"{}>{}</div>"#,
                if active { " active" } else { "" },
                panel_id,
                tab_id,
                if active { "" } else { " hidden" },
                engine.render_child(request, child)?
            );
        }

        let mut out = open_container(request);
        let _ = write!(
            out,
            r#"<div class="tab-navigation" role="tablist">{}</div><div class="tab-content">{}</div></div>"#,
            nav, panels
        );
        Ok(out)
    }
}

/// One collapsible section per child, opened by the child's `expanded` flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accordion;

impl LayoutRenderer for Accordion {
    fn render(&self, request: &LayoutRequest<'_>, engine: &LayoutEngine<'_>) -> FormResult<String> {
        let base = request.dom_base();
        let mut out = open_container(request);

        for (i, child) in request.node.children.iter().enumerate() {
            let section_id = format!("{}-section-{}", base, i);
            let _ = write!(
                out,
                r#"<div class="accordion-section"><button type="button" class="accordion-header{}" aria-expanded="{}" aria-controls="{}">{}</button><div class="accordion-content" id="{}"{}>{}</div></div>"#,
                if child.expanded { " expanded" } else { "" },
                child.expanded,
                section_id,
                escape(&child.display_title()),
                section_id,
                if child.expanded { "" } else { " hidden" },
                engine.render_child(request, child)?
            );
        }

        out.push_str("</div>");
        Ok(out)
    }
}

/// Repeatable item groups, one per element of each child's list value.
///
/// Items are addressed `child[i].field` so a re-submission decodes to the
/// same positions. When a child has fewer items than `min_items`, empty
/// items pad it so the form always shows the required minimum.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelList;

impl LayoutRenderer for ModelList {
    fn render(&self, request: &LayoutRequest<'_>, engine: &LayoutEngine<'_>) -> FormResult<String> {
        let min_items = request.node.option_usize("min_items").unwrap_or(0);
        let max_items = request.node.option_usize("max_items");
        let mut out = open_container(request);

        for child in &request.node.children {
            let path = request.context.prefix().child(child.name.as_str());
            let wire = path.encode();
            let dom_id = path.to_dom_id();
            let title = child.display_title();
            let items = request.child_items(&child.name);

            let _ = write!(
                out,
                r#"<div class="model-list-container" data-field-name="{}" data-min-items="{}""#,
                escape(&wire),
                min_items
            );
            if let Some(max) = max_items {
                let _ = write!(out, r#" data-max-items="{}""#, max);
            }
            let _ = write!(
                out,
                r#"><label class="form-label">{}</label><div class="model-list-items" id="{}-items">"#,
                escape(&title),
                dom_id
            );

            let empty = serde_json::Map::new();
            for index in 0..items.len().max(min_items) {
                let item = items
                    .get(index)
                    .and_then(|v| v.as_object())
                    .unwrap_or(&empty);
                let _ = write!(
                    out,
                    r#"<div class="model-list-item" data-index="{index}"><div class="model-list-item-header"><span class="model-list-item-title">{} #{}</span><button type="button" class="remove-item-btn" data-index="{index}" aria-label="Remove item">Remove</button></div><div class="model-list-item-body">{}</div></div>"#,
                    escape(&title),
                    index + 1,
                    engine.render_item(request, child, index, item)?,
                );
            }

            let _ = write!(
                out,
                r#"</div>{}<div class="model-list-controls"><button type="button" class="add-item-btn" data-target="{}">Add {}</button></div></div>"#,
                error_messages(&dom_id, request.context.errors_at(&path)),
                escape(&wire),
                escape(&title)
            );
        }

        out.push_str("</div>");
        Ok(out)
    }
}

/// Each child in a titled card.
#[derive(Debug, Clone, Copy, Default)]
pub struct Card;

impl LayoutRenderer for Card {
    fn render(&self, request: &LayoutRequest<'_>, engine: &LayoutEngine<'_>) -> FormResult<String> {
        let mut out = open_container(request);
        for child in &request.node.children {
            let _ = write!(
                out,
                r#"<div class="card"><div class="card-header"><h3 class="card-title">{}</h3></div><div class="card-body">{}</div></div>"#,
                escape(&child.display_title()),
                engine.render_child(request, child)?
            );
        }
        out.push_str("</div>");
        Ok(out)
    }
}

/// Children in a CSS grid of `columns` columns (default 2).
#[derive(Debug, Clone, Copy, Default)]
pub struct Grid;

impl LayoutRenderer for Grid {
    fn render(&self, request: &LayoutRequest<'_>, engine: &LayoutEngine<'_>) -> FormResult<String> {
        let columns = request.node.option_usize("columns").unwrap_or(2).max(1);
        let mut out = format!(
            r#"<div class="{}" data-layout="{}" style="display: grid; grid-template-columns: repeat({}, 1fr)">"#,
            escape(&request.container_class()),
            escape(&request.node.name),
            columns
        );
        for child in &request.node.children {
            let _ = write!(
                out,
                r#"<div class="grid-cell">{}</div>"#,
                engine.render_child(request, child)?
            );
        }
        out.push_str("</div>");
        Ok(out)
    }
}

fn open_container(request: &LayoutRequest<'_>) -> String {
    let mut out = format!(
        r#"<div class="{}" data-layout="{}">"#,
        escape(&request.container_class()),
        escape(&request.node.name)
    );
    if let Some(title) = &request.node.title {
        let _ = write!(out, r#"<h2 class="layout-title">{}</h2>"#, escape(title));
    }
    out
}

/// Maps layout kinds and aliases to renderers.
///
/// `new()` installs the built-in kinds and captures them as the `reset()`
/// target. Registering an existing kind replaces it.
#[derive(Debug, Clone)]
pub struct LayoutRegistry {
    inner: Registry<dyn LayoutRenderer>,
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutRegistry {
    /// Registry with the built-in layout kinds installed.
    pub fn new() -> Self {
        let mut inner: Registry<dyn LayoutRenderer> = Registry::empty();
        inner.register(kinds::VERTICAL, ["stacked"], Arc::new(Stacked));
        inner.register(kinds::HORIZONTAL, ["row"], Arc::new(Stacked));
        inner.register(kinds::TABBED, ["tabs"], Arc::new(Tabbed));
        inner.register(kinds::ACCORDION, ["collapsible"], Arc::new(Accordion));
        inner.register(kinds::LIST, [kinds::MODEL_LIST], Arc::new(ModelList));
        inner.register(kinds::CARD, ["cards"], Arc::new(Card));
        inner.register(kinds::GRID, Vec::<String>::new(), Arc::new(Grid));
        inner.seal_defaults();
        Self { inner }
    }

    /// Registry with nothing installed.
    pub fn empty() -> Self {
        Self {
            inner: Registry::empty(),
        }
    }

    pub fn register<I, S, R>(&mut self, kind: &str, aliases: I, renderer: R)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: LayoutRenderer + 'static,
    {
        self.register_arc(kind, aliases, Arc::new(renderer));
    }

    pub fn register_arc<I, S>(&mut self, kind: &str, aliases: I, renderer: Arc<dyn LayoutRenderer>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let overrides = self.inner.contains(kind);
        self.inner.register(kind, aliases, renderer);
        tracing::debug!(
            event = %Event::LayoutRegistered,
            kind,
            overrides,
            "layout renderer registered"
        );
    }

    /// Renderer for a kind or alias.
    pub fn lookup(&self, kind: &str) -> FormResult<Arc<dyn LayoutRenderer>> {
        self.inner
            .get(kind)
            .ok_or_else(|| FormError::UnknownLayoutKind(kind.to_string()))
    }

    /// Canonical kind for a kind or alias.
    pub fn resolve<'a>(&'a self, kind: &'a str) -> Option<&'a str> {
        self.inner.resolve(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.inner.contains(kind)
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.inner.identifiers()
    }

    pub fn snapshot(&self) -> RegistrySnapshot<dyn LayoutRenderer> {
        self.inner.snapshot()
    }

    pub fn restore(&mut self, snapshot: RegistrySnapshot<dyn LayoutRenderer>) {
        self.inner.restore(snapshot);
    }

    /// Restores the built-in kinds, discarding every runtime registration.
    pub fn reset(&mut self) {
        self.inner.reset();
        tracing::debug!(event = %Event::LayoutRegistryReset, "layout registry reset");
    }
}
