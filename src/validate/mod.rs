//! Submission validation
//!
//! Validation restructures a submission through the extractor, coerces
//! raw wire values to each field's kind, checks field constraints, then
//! evaluates the schema's cross-field rules at every nesting level.
//!
//! # Error keys
//!
//! Errors are keyed by the full wire path of the offending input, list
//! indices included (`departments[0].teams[0].members[0].name`). Inside
//! layouts this is the wire name the layout actually renders, so a
//! re-rendered form can place every message next to its input.
//!
//! # Messages
//!
//! - required: `This field is required`
//! - length: `Must be at least {n} characters long` / `Must be no more than {n} characters long`
//! - numeric: `Must be at least {min}` / `Must be no more than {max}` / `Must be between {min} and {max}`
//! - pattern: `Invalid format`

pub mod coerce;
pub mod constraints;
mod cross_field;
mod result;
mod validator;

pub use result::{ErrorMap, ValidationResult};
pub use validator::{Submission, Validator};
