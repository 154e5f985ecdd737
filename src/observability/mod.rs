//! Observability for the form engine
//!
//! Records go through the `tracing` facade; the library never installs a
//! subscriber. Every record carries a typed [`Event`] name.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. Submitted values are never logged, only wire keys
//!
//! # Usage
//!
//! ```ignore
//! use schemaforms::observability::Event;
//!
//! tracing::info!(event = %Event::FormValidated, schema = "User", "form validated");
//! ```

mod events;

pub use events::Event;
