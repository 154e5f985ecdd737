//! Layout nodes
//!
//! A layout node groups child schemas (or child layouts) for rendering.
//! It owns the order of its children but never field identity: the data
//! each child receives is always derived from that child's own schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::title_case;

/// Built-in layout kinds
pub mod kinds {
    pub const VERTICAL: &str = "vertical";
    pub const HORIZONTAL: &str = "horizontal";
    pub const TABBED: &str = "tabbed";
    pub const ACCORDION: &str = "accordion";
    pub const LIST: &str = "list";
    pub const CARD: &str = "card";
    pub const GRID: &str = "grid";

    /// Alias under which the list kind is also registered
    pub const MODEL_LIST: &str = "model_list";

    /// Whether a kind (or its alias) repeats its children per item
    pub fn is_repeating(kind: &str) -> bool {
        kind == LIST || kind == MODEL_LIST
    }
}

/// What a layout child renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildTarget {
    Schema(String),
    Layout(String),
}

/// One child of a layout node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutChild {
    /// Key of this child's data in the layout's nested value
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub target: ChildTarget,
    /// Initial open state for accordion sections
    #[serde(default)]
    pub expanded: bool,
}

impl LayoutChild {
    pub fn schema(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            target: ChildTarget::Schema(schema.into()),
            expanded: false,
        }
    }

    pub fn layout(name: impl Into<String>, layout: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            target: ChildTarget::Layout(layout.into()),
            expanded: false,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn display_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| title_case(&self.name))
    }
}

/// A grouping of child schemas or layouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    /// Unique name within a catalog
    pub name: String,
    /// Layout kind, resolved through the layout renderer registry
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Extra class appended to the `<kind>-layout` container class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    #[serde(default)]
    pub children: Vec<LayoutChild>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl LayoutNode {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            title: None,
            css_class: None,
            children: Vec::new(),
            options: Map::new(),
        }
    }

    pub fn vertical(name: impl Into<String>) -> Self {
        Self::new(name, kinds::VERTICAL)
    }

    pub fn horizontal(name: impl Into<String>) -> Self {
        Self::new(name, kinds::HORIZONTAL)
    }

    pub fn tabbed(name: impl Into<String>) -> Self {
        Self::new(name, kinds::TABBED)
    }

    pub fn accordion(name: impl Into<String>) -> Self {
        Self::new(name, kinds::ACCORDION)
    }

    /// A repeatable group: each child's data is a list of items
    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, kinds::LIST)
    }

    pub fn with_child(mut self, child: LayoutChild) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.css_class = Some(class.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Whether children hold lists of items rather than single objects
    pub fn is_repeating(&self) -> bool {
        kinds::is_repeating(&self.kind)
    }

    pub fn option_usize(&self, key: &str) -> Option<usize> {
        self.options
            .get(key)
            .and_then(Value::as_u64)
            .map(|n| n as usize)
    }
}
