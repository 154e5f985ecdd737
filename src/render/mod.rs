//! Form rendering
//!
//! The [`LayoutEngine`] renders a schema or layout node, together with its
//! current nested value, into HTML. Leaf fields are delegated to the input
//! component registry; layout nodes to the layout renderer registry.
//!
//! Every input's `name` is its full wire path, so the markup submits a
//! flat payload the extractor decodes back into the same shape:
//!
//! - nested object fields render a `subform` fieldset and extend the path
//!   (`address.city`)
//! - lists of objects render a `list` layout whose items are addressed
//!   `pets[0].name`
//! - layout nodes keep the wire scope of their parent; a child's data is
//!   read from the current value under the child's name

mod config;
mod context;
mod engine;
mod layouts;

pub use config::FormConfig;
pub use context::{LayoutRequest, RenderContext};
pub use engine::LayoutEngine;
pub use layouts::{Accordion, Card, Grid, LayoutRegistry, LayoutRenderer, ModelList, Stacked, Tabbed};
