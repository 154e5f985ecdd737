//! Nested data extraction
//!
//! The extractor is the single choke point between client-submitted keys
//! and application data. It turns a flat wire payload into a nested value
//! shaped by a schema (or layout node), and restricts pre-nested values to
//! what a schema declares.
//!
//! Extraction never fails on user input: malformed or unknown keys are
//! dropped and logged at debug level. It fails only for schema bugs such
//! as dangling references or cyclic nesting.

mod extractor;
mod payload;

pub use extractor::Extractor;
pub use payload::FlatPayload;
