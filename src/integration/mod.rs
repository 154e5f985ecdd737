//! # axum integration
//!
//! Glue between form submissions received by an `axum` handler and the
//! validator. No routing is provided; handlers stay in the host.
//!
//! ```ignore
//! async fn submit(form: Form<Vec<(String, String)>>) -> Response {
//!     match validator.validate(&schema, FlatPayload::from(form)) {
//!         Ok(result) => result.into_response(),
//!         Err(err) => err.into_response(),
//!     }
//! }
//! ```
//!
//! A valid submission answers 200 with `{"data": ...}`, a rejected one 422
//! with `{"errors": {path: [messages]}}`. Engine errors are schema bugs and
//! answer 500 with their stable code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::FormError;
use crate::extract::FlatPayload;
use crate::validate::{ErrorMap, ValidationResult};

impl From<Form<Vec<(String, String)>>> for FlatPayload {
    fn from(Form(pairs): Form<Vec<(String, String)>>) -> Self {
        FlatPayload::from(pairs)
    }
}

impl FormError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl From<&FormError> for ErrorResponse {
    fn from(err: &FormError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
        }
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}

/// Body of a successful submission
#[derive(Debug, Serialize)]
struct Accepted {
    data: Map<String, Value>,
}

/// Body of a rejected submission
#[derive(Debug, Serialize)]
struct Rejected<'a> {
    errors: &'a ErrorMap,
}

impl IntoResponse for ValidationResult {
    fn into_response(self) -> Response {
        if self.is_valid() {
            let body = Accepted {
                data: self.into_data(),
            };
            (StatusCode::OK, Json(body)).into_response()
        } else {
            let body = Rejected {
                errors: self.errors(),
            };
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, Schema, SchemaCatalog};
    use crate::validate::Validator;
    use serde_json::json;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new()
            .with_schema(Schema::new("User").with_field(FieldDef::string("name").required()))
            .unwrap()
    }

    #[test]
    fn test_form_into_payload() {
        let form = Form(vec![
            ("name".to_string(), "Ann".to_string()),
            ("tags".to_string(), "a".to_string()),
            ("tags".to_string(), "b".to_string()),
        ]);
        let payload = FlatPayload::from(form);
        assert_eq!(payload.len(), 3);
        assert_eq!(payload.get("name"), Some(&Value::from("Ann")));
    }

    #[tokio::test]
    async fn test_valid_result_is_ok() {
        let catalog = catalog();
        let schema = catalog.schema("User").unwrap();
        let result = Validator::new(&catalog)
            .validate(&schema, FlatPayload::new().with("name", "Ann"))
            .unwrap();

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"data": {"name": "Ann"}}));
    }

    #[tokio::test]
    async fn test_invalid_result_is_unprocessable() {
        let catalog = catalog();
        let schema = catalog.schema("User").unwrap();
        let result = Validator::new(&catalog)
            .validate(&schema, FlatPayload::new())
            .unwrap();

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({"errors": {"name": ["This field is required"]}})
        );
    }

    #[tokio::test]
    async fn test_form_error_response() {
        let response = FormError::UnknownLayoutKind("carousel".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "FORM_UNKNOWN_LAYOUT_KIND");
        assert_eq!(body["error"], "Unknown layout kind: carousel");
    }
}
