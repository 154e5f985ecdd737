//! Error types for schemaforms
//!
//! Error codes:
//! - FORM_PARSE_ERROR
//! - FORM_UNKNOWN_INPUT_KIND
//! - FORM_UNKNOWN_LAYOUT_KIND
//! - FORM_SCHEMA_INTROSPECTION
//! - FORM_UNKNOWN_SCHEMA
//! - FORM_UNKNOWN_LAYOUT
//! - FORM_CYCLIC_SCHEMA
//! - FORM_DUPLICATE_SCHEMA
//! - FORM_INVALID_PATTERN
//! - FORM_CATALOG_IO
//! - FORM_CATALOG_JSON
//!
//! Every variant signals a schema or configuration bug. End-user input
//! never produces a `FormError`; constraint violations are collected into
//! a [`ValidationResult`](crate::validate::ValidationResult) instead.

use thiserror::Error;

use crate::path::PathError;

/// Result type for form operations
pub type FormResult<T> = Result<T, FormError>;

/// Hard failures raised by the form engine
#[derive(Debug, Error)]
pub enum FormError {
    /// Malformed wire path
    #[error("Malformed wire path: {0}")]
    Parse(#[from] PathError),

    /// UI element identifier with no registered input component
    #[error("Unknown input kind: {0}")]
    UnknownInputKind(String),

    /// Layout kind with no registered layout renderer
    #[error("Unknown layout kind: {0}")]
    UnknownLayoutKind(String),

    /// Schema descriptor is inconsistent
    #[error("Schema '{schema}' is inconsistent: {reason}")]
    SchemaIntrospection { schema: String, reason: String },

    /// Nested schema reference not present in the catalog
    #[error("Schema not found: {0}")]
    UnknownSchema(String),

    /// Layout reference not present in the catalog
    #[error("Layout not found: {0}")]
    UnknownLayout(String),

    /// A schema nests itself transitively
    #[error("Cyclic schema nesting: {}", .0.join(" -> "))]
    CyclicSchema(Vec<String>),

    /// Catalog entries are immutable once registered
    #[error("Schema or layout '{0}' is already registered")]
    DuplicateSchema(String),

    /// A `pattern` constraint that does not compile
    #[error("Invalid pattern '{pattern}' on field '{field}': {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Catalog file could not be read
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not a valid descriptor
    #[error("Invalid descriptor in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FormError {
    /// Shorthand for an introspection error
    pub fn introspection(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        FormError::SchemaIntrospection {
            schema: schema.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FormError::Parse(_) => "FORM_PARSE_ERROR",
            FormError::UnknownInputKind(_) => "FORM_UNKNOWN_INPUT_KIND",
            FormError::UnknownLayoutKind(_) => "FORM_UNKNOWN_LAYOUT_KIND",
            FormError::SchemaIntrospection { .. } => "FORM_SCHEMA_INTROSPECTION",
            FormError::UnknownSchema(_) => "FORM_UNKNOWN_SCHEMA",
            FormError::UnknownLayout(_) => "FORM_UNKNOWN_LAYOUT",
            FormError::CyclicSchema(_) => "FORM_CYCLIC_SCHEMA",
            FormError::DuplicateSchema(_) => "FORM_DUPLICATE_SCHEMA",
            FormError::InvalidPattern { .. } => "FORM_INVALID_PATTERN",
            FormError::Io { .. } => "FORM_CATALOG_IO",
            FormError::Json { .. } => "FORM_CATALOG_JSON",
        }
    }

    /// Whether this error stems from an inconsistent schema descriptor
    pub fn is_introspection_error(&self) -> bool {
        matches!(
            self,
            FormError::SchemaIntrospection { .. }
                | FormError::UnknownSchema(_)
                | FormError::UnknownLayout(_)
                | FormError::CyclicSchema(_)
                | FormError::InvalidPattern { .. }
        )
    }
}
