//! Observable form engine events
//!
//! Events are explicit and typed. They are emitted as the `event` field of
//! `tracing` records so that log pipelines can filter on a stable name.

use std::fmt;

/// Observable events in the form engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Rendering
    /// A schema, layout or form was rendered
    FormRendered,

    // Validation
    /// A submission validated successfully
    FormValidated,
    /// A submission failed validation
    ValidationFailed,
    /// A submitted key matched no declared field and was discarded
    PayloadKeyDropped,

    // Registries
    /// Input component registered or overridden
    InputRegistered,
    /// Input registry restored to its defaults
    InputRegistryReset,
    /// Layout renderer registered or overridden
    LayoutRegistered,
    /// Layout registry restored to its defaults
    LayoutRegistryReset,

    // Catalog
    /// Schema and layout descriptors loaded from disk
    CatalogLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::FormRendered => "FORM_RENDERED",

            Event::FormValidated => "FORM_VALIDATED",
            Event::ValidationFailed => "VALIDATION_FAILED",
            Event::PayloadKeyDropped => "PAYLOAD_KEY_DROPPED",

            Event::InputRegistered => "INPUT_REGISTERED",
            Event::InputRegistryReset => "INPUT_REGISTRY_RESET",
            Event::LayoutRegistered => "LAYOUT_REGISTERED",
            Event::LayoutRegistryReset => "LAYOUT_REGISTRY_RESET",

            Event::CatalogLoaded => "CATALOG_LOADED",
        }
    }

    /// Returns true if the event reflects rejected end-user input
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Event::ValidationFailed | Event::PayloadKeyDropped)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::FormRendered,
            Event::FormValidated,
            Event::ValidationFailed,
            Event::PayloadKeyDropped,
            Event::InputRegistered,
            Event::InputRegistryReset,
            Event::LayoutRegistered,
            Event::LayoutRegistryReset,
            Event::CatalogLoaded,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_user_facing_events() {
        assert!(Event::ValidationFailed.is_user_facing());
        assert!(Event::PayloadKeyDropped.is_user_facing());
        assert!(!Event::FormRendered.is_user_facing());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::CatalogLoaded), "CATALOG_LOADED");
        assert_eq!(
            format!("{}", Event::PayloadKeyDropped),
            "PAYLOAD_KEY_DROPPED"
        );
    }
}
