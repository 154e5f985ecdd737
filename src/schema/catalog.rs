//! Schema catalog
//!
//! Nested fields and layout children reference schemas and layouts by
//! name; the catalog resolves those names. Descriptors can be registered
//! programmatically or loaded from a directory of JSON files:
//!
//! - `<name>.schema.json`: one [`Schema`]
//! - `<name>.layout.json`: one [`LayoutNode`]
//!
//! Registered entries are immutable. Registering the same name twice is
//! rejected so that a running form never changes shape underneath a
//! submission.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;

use super::layout::{ChildTarget, LayoutNode};
use super::types::Schema;
use crate::errors::{FormError, FormResult};
use crate::observability::Event;

/// Name-indexed collection of schemas and layout nodes.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: HashMap<String, Arc<Schema>>,
    layouts: HashMap<String, Arc<LayoutNode>>,
    /// Field patterns compiled at registration, keyed by source text
    patterns: HashMap<String, Regex>,
}

/// A node on the nesting stack during cycle detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit<'a> {
    Schema(&'a str),
    Layout(&'a str),
}

impl Visit<'_> {
    fn label(&self) -> String {
        match self {
            Visit::Schema(name) => (*name).to_string(),
            Visit::Layout(name) => format!("layout:{}", name),
        }
    }
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema after checking its structure.
    pub fn register_schema(&mut self, schema: Schema) -> FormResult<Arc<Schema>> {
        schema.validate_structure()?;

        if self.schemas.contains_key(&schema.name) {
            return Err(FormError::DuplicateSchema(schema.name));
        }

        for (source, regex) in schema.compile_patterns()? {
            self.patterns.entry(source).or_insert(regex);
        }

        let schema = Arc::new(schema);
        self.schemas.insert(schema.name.clone(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Registers a layout node.
    pub fn register_layout(&mut self, layout: LayoutNode) -> FormResult<Arc<LayoutNode>> {
        if self.layouts.contains_key(&layout.name) {
            return Err(FormError::DuplicateSchema(layout.name));
        }

        let layout = Arc::new(layout);
        self.layouts.insert(layout.name.clone(), Arc::clone(&layout));
        Ok(layout)
    }

    /// Builder-style registration for fixtures and setup code.
    pub fn with_schema(mut self, schema: Schema) -> FormResult<Self> {
        self.register_schema(schema)?;
        Ok(self)
    }

    pub fn with_layout(mut self, layout: LayoutNode) -> FormResult<Self> {
        self.register_layout(layout)?;
        Ok(self)
    }

    /// Resolves a schema by name.
    pub fn schema(&self, name: &str) -> FormResult<Arc<Schema>> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| FormError::UnknownSchema(name.to_string()))
    }

    /// Resolves a layout by name.
    pub fn layout(&self, name: &str) -> FormResult<Arc<LayoutNode>> {
        self.layouts
            .get(name)
            .cloned()
            .ok_or_else(|| FormError::UnknownLayout(name.to_string()))
    }

    /// Compiled form of a pattern used by a registered schema.
    pub fn pattern(&self, source: &str) -> Option<&Regex> {
        self.patterns.get(source)
    }

    pub fn contains_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn contains_layout(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// Loads every `*.schema.json` and `*.layout.json` file in `dir`.
    ///
    /// Files are processed in name order so that failures are reproducible.
    /// Returns the number of descriptors loaded.
    pub fn load_dir(&mut self, dir: &Path) -> FormResult<usize> {
        let io_err = |path: &Path, source| FormError::Io {
            path: path.display().to_string(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
            let entry = entry.map_err(|e| io_err(dir, e))?;
            paths.push(entry.path());
        }
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            if file_name.ends_with(".schema.json") {
                let schema: Schema = read_json(&path)?;
                self.register_schema(schema)?;
                loaded += 1;
            } else if file_name.ends_with(".layout.json") {
                let layout: LayoutNode = read_json(&path)?;
                self.register_layout(layout)?;
                loaded += 1;
            }
        }

        tracing::info!(
            event = %Event::CatalogLoaded,
            dir = %dir.display(),
            descriptors = loaded,
            "schema catalog loaded"
        );

        Ok(loaded)
    }

    /// Refuses schemas that nest themselves transitively.
    ///
    /// Walks object, object-list and layout references depth-first. Also
    /// fails with `UnknownSchema` / `UnknownLayout` for dangling references,
    /// so a schema that passes this check can be traversed without lookups
    /// failing.
    pub fn check_acyclic(&self, schema: &Schema) -> FormResult<()> {
        let mut stack = Vec::new();
        self.visit_schema(schema, &mut stack)
    }

    /// Same as [`check_acyclic`](Self::check_acyclic), rooted at a layout.
    pub fn check_layout_acyclic(&self, layout: &LayoutNode) -> FormResult<()> {
        let mut stack = Vec::new();
        self.visit_layout(layout, &mut stack)
    }

    fn visit_schema<'a>(&'a self, schema: &'a Schema, stack: &mut Vec<Visit<'a>>) -> FormResult<()> {
        enter(stack, Visit::Schema(&schema.name))?;

        for field in &schema.fields {
            if let Some(name) = field.kind.schema_ref() {
                let nested = self
                    .schemas
                    .get(name)
                    .ok_or_else(|| FormError::UnknownSchema(name.to_string()))?;
                self.visit_schema(nested, stack)?;
            } else if let Some(name) = field.kind.layout_ref() {
                let nested = self
                    .layouts
                    .get(name)
                    .ok_or_else(|| FormError::UnknownLayout(name.to_string()))?;
                self.visit_layout(nested, stack)?;
            }
        }

        stack.pop();
        Ok(())
    }

    fn visit_layout<'a>(&'a self, layout: &'a LayoutNode, stack: &mut Vec<Visit<'a>>) -> FormResult<()> {
        enter(stack, Visit::Layout(&layout.name))?;

        for child in &layout.children {
            match &child.target {
                ChildTarget::Schema(name) => {
                    let nested = self
                        .schemas
                        .get(name)
                        .ok_or_else(|| FormError::UnknownSchema(name.clone()))?;
                    self.visit_schema(nested, stack)?;
                }
                ChildTarget::Layout(name) => {
                    let nested = self
                        .layouts
                        .get(name)
                        .ok_or_else(|| FormError::UnknownLayout(name.clone()))?;
                    self.visit_layout(nested, stack)?;
                }
            }
        }

        stack.pop();
        Ok(())
    }
}

fn enter<'a>(stack: &mut Vec<Visit<'a>>, node: Visit<'a>) -> FormResult<()> {
    if let Some(start) = stack.iter().position(|v| *v == node) {
        let mut chain: Vec<String> = stack[start..].iter().map(Visit::label).collect();
        chain.push(node.label());
        return Err(FormError::CyclicSchema(chain));
    }
    stack.push(node);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> FormResult<T> {
    let content = fs::read_to_string(path).map_err(|source| FormError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| FormError::Json {
        path: path.display().to_string(),
        source,
    })
}
