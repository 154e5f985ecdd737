//! schemaforms - Schema-driven HTML forms
//!
//! Renders typed schemas into HTML forms and validates flat form
//! submissions back into nested, schema-conformant data.
//!
//! - `path`: the wire naming codec (`a.b[2].c`)
//! - `schema`: schema descriptors, layout nodes, catalog and introspection
//! - `inputs`: input components and their registry
//! - `extract`: flat payload to nested value
//! - `render`: the layout engine and layout renderers
//! - `validate`: coercion, constraints and cross-field rules
//! - `integration`: axum request and response glue

pub mod errors;
pub mod extract;
pub mod inputs;
pub mod integration;
pub mod observability;
pub mod path;
pub mod registry;
pub mod render;
pub mod schema;
pub mod validate;

pub use errors::{FormError, FormResult};
pub use extract::{Extractor, FlatPayload};
pub use inputs::{InputComponent, InputContext, InputRegistry};
pub use path::{FieldPath, Segment};
pub use render::{FormConfig, LayoutEngine, LayoutRegistry, LayoutRenderer, LayoutRequest};
pub use schema::{FieldDef, LayoutChild, LayoutNode, Schema, SchemaCatalog};
pub use validate::{Submission, ValidationResult, Validator};
