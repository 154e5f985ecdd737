//! Flat payload to nested value
//!
//! Extraction walks the schema, never the payload: for every declared field
//! it picks out the keys addressed to that field and recurses into nested
//! schemas. Keys no declared field claims are never copied anywhere.
//!
//! Layout nodes are transparent in wire naming: a child schema reads its
//! fields from the same scope as the layout itself, and its data is nested
//! under the child's name. The one exception is the `list` kind, whose
//! children are repeatable groups addressed as `child[i].field`.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};

use super::payload::FlatPayload;
use crate::errors::FormResult;
use crate::observability::Event;
use crate::path::{decode, FieldPath, Segment};
use crate::schema::{
    ChildTarget, Introspector, LayoutChild, LayoutNode, Schema, SchemaCatalog, TypeCategory,
};

/// Highest list index accepted from a payload.
///
/// Items keep their submitted positions, so an index bounds the length of
/// the list built for it. Keys above this index are dropped.
pub const MAX_ITEM_INDEX: usize = 9_999;

/// A payload entry with the segments not yet consumed by the walk
#[derive(Debug, Clone, Copy)]
struct Entry<'p> {
    id: usize,
    rest: &'p [Segment],
    value: &'p Value,
}

impl<'p> Entry<'p> {
    fn head_field(&self) -> Option<&'p str> {
        self.rest.first().and_then(Segment::as_field)
    }

    fn head_index(&self) -> Option<usize> {
        self.rest.first().and_then(Segment::as_index)
    }

    fn advance(self) -> Self {
        Self {
            rest: &self.rest[1..],
            ..self
        }
    }
}

/// A schema or layout node being extracted
#[derive(Debug, Clone, Copy)]
enum Shape<'s> {
    Schema(&'s Schema),
    Layout(&'s LayoutNode),
}

/// Restructures flat payloads and restricts nested ones.
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'a> {
    introspector: Introspector<'a>,
}

impl<'a> Extractor<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self {
            introspector: Introspector::new(catalog),
        }
    }

    /// Nested value for `schema` from a flat payload.
    pub fn extract(&self, payload: &FlatPayload, schema: &Schema) -> FormResult<Map<String, Value>> {
        self.introspector.check_acyclic(schema)?;
        self.run(payload, Shape::Schema(schema))
    }

    /// Nested value for a layout node: one key per child name.
    pub fn extract_layout(
        &self,
        payload: &FlatPayload,
        layout: &LayoutNode,
    ) -> FormResult<Map<String, Value>> {
        self.introspector.catalog().check_layout_acyclic(layout)?;
        self.run(payload, Shape::Layout(layout))
    }

    /// Copy of a nested value keeping only what `schema` declares.
    pub fn restrict(&self, value: &Value, schema: &Schema) -> FormResult<Map<String, Value>> {
        self.introspector.check_acyclic(schema)?;
        self.restrict_shape(value, Shape::Schema(schema))
    }

    /// Copy of a nested layout value keeping only what its children declare.
    pub fn restrict_layout(&self, value: &Value, layout: &LayoutNode) -> FormResult<Map<String, Value>> {
        self.introspector.catalog().check_layout_acyclic(layout)?;
        self.restrict_shape(value, Shape::Layout(layout))
    }

    fn run(&self, payload: &FlatPayload, shape: Shape<'_>) -> FormResult<Map<String, Value>> {
        let mut decoded: Vec<(usize, FieldPath, &Value)> = Vec::with_capacity(payload.len());
        for (id, (key, value)) in payload.iter().enumerate() {
            match decode(key) {
                Ok(path) => decoded.push((id, path, value)),
                Err(err) => {
                    tracing::debug!(
                        event = %Event::PayloadKeyDropped,
                        key,
                        reason = %err,
                        "undecodable payload key dropped"
                    );
                }
            }
        }

        let entries: Vec<Entry<'_>> = decoded
            .iter()
            .map(|(id, path, value)| Entry {
                id: *id,
                rest: path.segments(),
                value,
            })
            .collect();

        let mut consumed = HashSet::new();
        let nested = self.extract_shape(shape, &entries, &mut consumed)?;

        for (id, path, _) in &decoded {
            if !consumed.contains(id) {
                tracing::debug!(
                    event = %Event::PayloadKeyDropped,
                    key = %path,
                    "payload key matches no declared field"
                );
            }
        }

        Ok(nested)
    }

    fn extract_shape(
        &self,
        shape: Shape<'_>,
        entries: &[Entry<'_>],
        consumed: &mut HashSet<usize>,
    ) -> FormResult<Map<String, Value>> {
        match shape {
            Shape::Schema(schema) => self.extract_schema(schema, entries, consumed),
            Shape::Layout(layout) => self.extract_node(layout, entries, consumed),
        }
    }

    fn extract_schema(
        &self,
        schema: &Schema,
        entries: &[Entry<'_>],
        consumed: &mut HashSet<usize>,
    ) -> FormResult<Map<String, Value>> {
        let mut out = Map::new();

        for field in self.introspector.fields_of(schema)? {
            let name = field.name();
            let matching: Vec<Entry<'_>> = entries
                .iter()
                .filter(|e| e.head_field() == Some(name))
                .map(|e| e.advance())
                .collect();

            let value = match field.category() {
                TypeCategory::Scalar => take_scalar(&matching, consumed),
                TypeCategory::ListOfScalar => take_list(&matching, consumed),
                TypeCategory::NestedObject => match field.schema() {
                    Some(nested) => {
                        let inner: Vec<Entry<'_>> = matching
                            .into_iter()
                            .filter(|e| e.head_field().is_some())
                            .collect();
                        if inner.is_empty() {
                            None
                        } else {
                            Some(Value::Object(self.extract_schema(nested, &inner, consumed)?))
                        }
                    }
                    None => None,
                },
                TypeCategory::ListOfObject => match field.schema() {
                    Some(nested) => self.extract_items(Shape::Schema(nested), &matching, consumed)?,
                    None => None,
                },
                TypeCategory::LayoutReference => match field.layout() {
                    Some(layout) => {
                        let nested = self.extract_node(layout, entries, consumed)?;
                        (!nested.is_empty()).then_some(Value::Object(nested))
                    }
                    None => None,
                },
            };

            if let Some(value) = value {
                out.insert(name.to_string(), value);
            }
        }

        Ok(out)
    }

    fn extract_node(
        &self,
        layout: &LayoutNode,
        entries: &[Entry<'_>],
        consumed: &mut HashSet<usize>,
    ) -> FormResult<Map<String, Value>> {
        let catalog = self.introspector.catalog();
        let mut out = Map::new();

        for child in &layout.children {
            let schema;
            let node;
            let shape = match &child.target {
                ChildTarget::Schema(name) => {
                    schema = catalog.schema(name)?;
                    Shape::Schema(&schema)
                }
                ChildTarget::Layout(name) => {
                    node = catalog.layout(name)?;
                    Shape::Layout(&node)
                }
            };

            let value = if layout.is_repeating() {
                let matching = child_entries(child, entries);
                self.extract_items(shape, &matching, consumed)?
            } else {
                let nested = self.extract_shape(shape, entries, consumed)?;
                (!nested.is_empty()).then_some(Value::Object(nested))
            };

            if let Some(value) = value {
                out.insert(child.name.clone(), value);
            }
        }

        Ok(out)
    }

    /// Groups `[i].rest` entries by index and extracts each group.
    ///
    /// Each item keeps its submitted position: item `i` lands at index `i`
    /// and indices nothing was submitted for hold `null`.
    fn extract_items(
        &self,
        shape: Shape<'_>,
        entries: &[Entry<'_>],
        consumed: &mut HashSet<usize>,
    ) -> FormResult<Option<Value>> {
        let mut groups: BTreeMap<usize, Vec<Entry<'_>>> = BTreeMap::new();
        for entry in entries {
            if let Some(index) = entry.head_index().filter(|i| *i <= MAX_ITEM_INDEX) {
                let rest = entry.advance();
                if rest.head_field().is_some() {
                    groups.entry(index).or_default().push(rest);
                }
            }
        }

        if groups.is_empty() {
            return Ok(None);
        }

        let mut items = Vec::with_capacity(groups.len());
        for (index, group) in &groups {
            items.resize(*index, Value::Null);
            items.push(Value::Object(self.extract_shape(shape, group, consumed)?));
        }
        Ok(Some(Value::Array(items)))
    }

    fn restrict_shape(&self, value: &Value, shape: Shape<'_>) -> FormResult<Map<String, Value>> {
        let Some(object) = value.as_object() else {
            return Ok(Map::new());
        };

        match shape {
            Shape::Schema(schema) => self.restrict_schema(object, schema),
            Shape::Layout(layout) => self.restrict_node(object, layout),
        }
    }

    fn restrict_schema(&self, object: &Map<String, Value>, schema: &Schema) -> FormResult<Map<String, Value>> {
        let mut out = Map::new();

        for field in self.introspector.fields_of(schema)? {
            let Some(value) = object.get(field.name()) else {
                continue;
            };

            let restricted = match field.category() {
                TypeCategory::Scalar => (!is_container(value)).then(|| value.clone()),
                TypeCategory::ListOfScalar => match value {
                    Value::Array(items) => Some(Value::Array(
                        items.iter().filter(|v| !is_container(v)).cloned().collect(),
                    )),
                    Value::Object(_) => None,
                    scalar => Some(Value::Array(vec![scalar.clone()])),
                },
                TypeCategory::NestedObject => match field.schema() {
                    Some(nested) if value.is_object() => {
                        Some(Value::Object(self.restrict_shape(value, Shape::Schema(nested))?))
                    }
                    _ => None,
                },
                TypeCategory::ListOfObject => match (field.schema(), value) {
                    (Some(nested), Value::Array(items)) => {
                        Some(self.restrict_items(items, Shape::Schema(nested))?)
                    }
                    _ => None,
                },
                TypeCategory::LayoutReference => match field.layout() {
                    Some(layout) if value.is_object() => {
                        Some(Value::Object(self.restrict_shape(value, Shape::Layout(layout))?))
                    }
                    _ => None,
                },
            };

            if let Some(restricted) = restricted {
                out.insert(field.name().to_string(), restricted);
            }
        }

        Ok(out)
    }

    fn restrict_node(&self, object: &Map<String, Value>, layout: &LayoutNode) -> FormResult<Map<String, Value>> {
        let catalog = self.introspector.catalog();
        let mut out = Map::new();

        for child in &layout.children {
            let Some(value) = object.get(&child.name) else {
                continue;
            };

            let schema;
            let node;
            let shape = match &child.target {
                ChildTarget::Schema(name) => {
                    schema = catalog.schema(name)?;
                    Shape::Schema(&schema)
                }
                ChildTarget::Layout(name) => {
                    node = catalog.layout(name)?;
                    Shape::Layout(&node)
                }
            };

            let restricted = if layout.is_repeating() {
                match value {
                    Value::Array(items) => Some(self.restrict_items(items, shape)?),
                    _ => None,
                }
            } else if value.is_object() {
                Some(Value::Object(self.restrict_shape(value, shape)?))
            } else {
                None
            };

            if let Some(restricted) = restricted {
                out.insert(child.name.clone(), restricted);
            }
        }

        Ok(out)
    }

    fn restrict_items(&self, items: &[Value], shape: Shape<'_>) -> FormResult<Value> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            // Non-object slots stay as gaps so item positions are unchanged.
            if item.is_object() {
                out.push(Value::Object(self.restrict_shape(item, shape)?));
            } else {
                out.push(Value::Null);
            }
        }
        Ok(Value::Array(out))
    }
}

fn child_entries<'p>(child: &LayoutChild, entries: &[Entry<'p>]) -> Vec<Entry<'p>> {
    entries
        .iter()
        .filter(|e| e.head_field() == Some(child.name.as_str()))
        .map(|e| e.advance())
        .collect()
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Last value addressed to the field itself.
fn take_scalar(entries: &[Entry<'_>], consumed: &mut HashSet<usize>) -> Option<Value> {
    let mut last = None;
    for entry in entries.iter().filter(|e| e.rest.is_empty()) {
        consumed.insert(entry.id);
        last = Some(entry.value.clone());
    }
    last
}

/// Repeated `name` keys in submission order, then `name[i]` keys in index
/// order. Blank items are skipped.
fn take_list(entries: &[Entry<'_>], consumed: &mut HashSet<usize>) -> Option<Value> {
    let mut repeated = Vec::new();
    let mut indexed = BTreeMap::new();
    let mut seen = false;

    for entry in entries {
        match entry.rest {
            [] => {
                seen = true;
                consumed.insert(entry.id);
                match entry.value {
                    Value::Array(items) => repeated.extend(items.iter().cloned()),
                    value => repeated.push(value.clone()),
                }
            }
            [Segment::Index(index)] => {
                seen = true;
                consumed.insert(entry.id);
                indexed.insert(*index, entry.value.clone());
            }
            _ => {}
        }
    }

    if !seen {
        return None;
    }

    let items = repeated
        .into_iter()
        .chain(indexed.into_values())
        .filter(|v| !is_blank(v) && !is_container(v))
        .collect();
    Some(Value::Array(items))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
