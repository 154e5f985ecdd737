//! Render context and layout requests

use serde_json::{Map, Value};

use crate::path::FieldPath;
use crate::schema::{LayoutNode, UiSpec};
use crate::validate::ErrorMap;

/// Wire scope and error messages for one render pass.
///
/// The prefix is the wire path every field rendered in this scope is
/// appended to. Layouts keep the prefix of their parent; sub-forms and
/// list items extend it.
#[derive(Debug, Clone)]
pub struct RenderContext<'r> {
    prefix: FieldPath,
    errors: &'r ErrorMap,
    depth: usize,
}

impl<'r> RenderContext<'r> {
    /// Root scope
    pub fn new(errors: &'r ErrorMap) -> Self {
        Self {
            prefix: FieldPath::root(),
            errors,
            depth: 0,
        }
    }

    pub fn prefix(&self) -> &FieldPath {
        &self.prefix
    }

    /// Nesting depth below the root scope
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn errors(&self) -> &'r ErrorMap {
        self.errors
    }

    /// Child scope rooted at `prefix`
    pub fn scoped(&self, prefix: FieldPath) -> Self {
        Self {
            prefix,
            errors: self.errors,
            depth: self.depth + 1,
        }
    }

    /// Messages keyed at `path`
    pub fn errors_at(&self, path: &FieldPath) -> &'r [String] {
        self.errors
            .get(&path.encode())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Everything a layout renderer receives besides the engine.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRequest<'r> {
    /// Name of the field (or top-level layout) being rendered
    pub field_name: &'r str,
    pub node: &'r LayoutNode,
    /// Canonical layout kind the renderer was resolved under
    pub kind: &'r str,
    /// Current value; children read their data under their own names
    pub value: &'r Map<String, Value>,
    /// UI hints of the referencing field, if any
    pub ui: Option<&'r UiSpec>,
    pub context: &'r RenderContext<'r>,
}

impl<'r> LayoutRequest<'r> {
    /// `<kind>-layout` plus the node's and the field's extra classes
    pub fn container_class(&self) -> String {
        let mut class = format!("{}-layout", self.kind);
        let extras = [
            self.node.css_class.as_deref(),
            self.ui.and_then(|ui| ui.option_str("class")),
        ];
        for extra in extras.into_iter().flatten() {
            let extra = extra.trim();
            if !extra.is_empty() {
                class.push(' ');
                class.push_str(extra);
            }
        }
        class
    }

    /// DOM id base for elements the layout generates
    pub fn dom_base(&self) -> String {
        self.context.prefix().child(self.field_name).to_dom_id()
    }

    /// Current value of one child, as an object
    pub fn child_value(&self, name: &str) -> Option<&'r Map<String, Value>> {
        self.value.get(name).and_then(Value::as_object)
    }

    /// Current items of one repeating child
    pub fn child_items(&self, name: &str) -> &'r [Value] {
        self.value
            .get(name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_errors_at_full_path() {
        let mut errors = ErrorMap::new();
        errors.insert("pets[0].weight".into(), vec!["Must be at least 0.01".into()]);
        let root = RenderContext::new(&errors);
        let item = root.scoped(FieldPath::root().child("pets").index(0));

        assert_eq!(item.depth(), 1);
        assert_eq!(item.errors_at(&item.prefix().child("weight")).len(), 1);
        assert!(root.errors_at(&root.prefix().child("weight")).is_empty());
    }

    #[test]
    fn test_container_class() {
        let errors = ErrorMap::new();
        let context = RenderContext::new(&errors);
        let node = LayoutNode::tabbed("account").with_class("wide");
        let value = Map::new();
        let ui = UiSpec {
            options: json!({"class": "boxed"}).as_object().cloned().unwrap(),
            ..UiSpec::default()
        };

        let request = LayoutRequest {
            field_name: "account",
            node: &node,
            kind: "tabbed",
            value: &value,
            ui: Some(&ui),
            context: &context,
        };
        assert_eq!(request.container_class(), "tabbed-layout wide boxed");
        assert_eq!(request.dom_base(), "account");

        let bare = LayoutRequest { ui: None, ..request };
        let plain = LayoutNode::vertical("v");
        let bare = LayoutRequest { node: &plain, kind: "vertical", ..bare };
        assert_eq!(bare.container_class(), "vertical-layout");
    }
}
