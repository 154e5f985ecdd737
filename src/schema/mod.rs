//! Schema descriptors for schemaforms
//!
//! A schema is a read-only declaration of a form's fields: their names,
//! types, constraints and rendering hints. Nested fields and layout
//! children refer to other schemas and layouts by name through a
//! [`SchemaCatalog`].
//!
//! # Design Principles
//!
//! - Field names are unique within a schema
//! - Nesting is acyclic; cycles are refused before traversal
//! - Layouts group schemas but never own field identity
//! - Descriptors are immutable once registered

mod catalog;
mod introspect;
mod layout;
mod rules;
mod types;

pub use catalog::SchemaCatalog;
pub use introspect::{default_element, FieldDescriptor, Introspector, Nested};
pub use layout::{kinds, ChildTarget, LayoutChild, LayoutNode};
pub use rules::{CrossFieldCheck, CrossFieldRule};
pub use types::{
    title_case, Constraints, FieldDef, FieldKind, Format, ScalarKind, Schema, TypeCategory, UiSpec,
    DEFAULT_FIELD_ORDER,
};
