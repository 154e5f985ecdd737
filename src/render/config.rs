//! Form wrapper configuration
//!
//! Settings for the `<form>` element `render_form` wraps around a rendered
//! schema: target, method, encoding, submit button and CSRF field.

use serde::{Deserialize, Serialize};

/// `<form>` element configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    /// DOM id of the form (default: `form-<uuid>`)
    #[serde(default = "default_form_id")]
    pub form_id: String,

    /// Submission target (default: "/submit")
    #[serde(default = "default_action")]
    pub action: String,

    /// HTTP method (default: "post")
    #[serde(default = "default_method")]
    pub method: String,

    /// Body encoding (default: "application/x-www-form-urlencoded")
    #[serde(default = "default_enctype")]
    pub enctype: String,

    /// Extra class appended to `schema-form`
    #[serde(default)]
    pub css_class: Option<String>,

    /// Submit button text (default: "Submit")
    #[serde(default = "default_submit_label")]
    pub submit_label: String,

    #[serde(default = "default_true")]
    pub include_submit_button: bool,

    /// Rendered as a hidden `csrf_token` input when set
    #[serde(default)]
    pub csrf_token: Option<String>,

    /// Disables browser-side constraint validation
    #[serde(default)]
    pub novalidate: bool,
}

fn default_form_id() -> String {
    format!("form-{}", uuid::Uuid::new_v4().simple())
}

fn default_action() -> String {
    "/submit".to_string()
}

fn default_method() -> String {
    "post".to_string()
}

fn default_enctype() -> String {
    "application/x-www-form-urlencoded".to_string()
}

fn default_submit_label() -> String {
    "Submit".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            form_id: default_form_id(),
            action: default_action(),
            method: default_method(),
            enctype: default_enctype(),
            css_class: None,
            submit_label: default_submit_label(),
            include_submit_button: default_true(),
            csrf_token: None,
            novalidate: false,
        }
    }
}

impl FormConfig {
    /// Config posting to `action`
    pub fn with_action(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }

    /// Load from a JSON document; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Multipart encoding, needed once a form carries file inputs
    pub fn multipart(mut self) -> Self {
        self.enctype = "multipart/form-data".to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FormConfig::default();
        assert!(config.form_id.starts_with("form-"));
        assert_eq!(config.action, "/submit");
        assert_eq!(config.method, "post");
        assert_eq!(config.enctype, "application/x-www-form-urlencoded");
        assert_eq!(config.submit_label, "Submit");
        assert!(config.include_submit_button);
        assert!(config.csrf_token.is_none());
        assert!(!config.novalidate);
    }

    #[test]
    fn test_form_ids_are_unique() {
        assert_ne!(FormConfig::default().form_id, FormConfig::default().form_id);
    }

    #[test]
    fn test_from_json_partial() {
        let config = FormConfig::from_json_str(
            r#"{"form_id": "signup", "action": "/users", "include_submit_button": false}"#,
        )
        .unwrap();
        assert_eq!(config.form_id, "signup");
        assert_eq!(config.action, "/users");
        assert_eq!(config.method, "post");
        assert!(!config.include_submit_button);
    }

    #[test]
    fn test_builders() {
        let config = FormConfig::with_action("/upload").multipart().csrf_token("abc");
        assert_eq!(config.action, "/upload");
        assert_eq!(config.enctype, "multipart/form-data");
        assert_eq!(config.csrf_token.as_deref(), Some("abc"));
    }
}
