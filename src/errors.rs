//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned whenever a write fails after the record was found.
pub const WRITE_FAILED_MESSAGE: &str = "A problem happened while handling your request.";

/// Field-level error messages, keyed by the JSON name of the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let name = camel_case(&field);
            for e in errs {
                fields.add(name.clone(), describe(&name, e));
            }
        }
        fields
    }
}

/// Message for a failed rule, built from the rule's own parameters.
fn describe(field: &str, error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let param = |key: &str| error.params.get(key).and_then(serde_json::Value::as_u64);
    match (error.code.as_ref(), param("min"), param("max")) {
        ("length", Some(min), Some(max)) => {
            format!("The {} field must be {} to {} characters.", field, min, max)
        }
        ("length", None, Some(max)) => {
            format!("The {} field must be at most {} characters.", field, max)
        }
        ("length", Some(min), None) => {
            format!("The {} field must be at least {} characters.", field, min)
        }
        _ => format!("The {} field is invalid.", field),
    }
}

/// `first_name` -> `firstName`
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// Malformed request body
    #[error("{0}")]
    Validation(String),

    /// Well-formed input that violates entity constraints
    #[error("One or more validation errors occurred.")]
    ValidationFailed(FieldErrors),

    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl AppError {
    /// Get error code for client
    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Validation(_) | AppError::ValidationFailed(_) => "VALIDATION_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::ValidationFailed(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                WRITE_FAILED_MESSAGE.to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                WRITE_FAILED_MESSAGE.to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.user_message();
        let code = self.code().to_string();
        let fields = match self {
            AppError::ValidationFailed(fields) => Some(fields),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                fields,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// User-facing "not found" for a user id.
    pub fn user_not_found(id: i32) -> Self {
        AppError::NotFound(format!("User with ID {} not found.", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::user_not_found(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::ValidationFailed(FieldErrors::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Database(sea_orm::DbErr::Custom("gone".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::internal("connection reset by peer");
        assert_eq!(err.user_message(), WRITE_FAILED_MESSAGE);
    }

    #[test]
    fn test_user_not_found_message() {
        assert_eq!(
            AppError::user_not_found(42).to_string(),
            "User with ID 42 not found."
        );
    }

    #[test]
    fn test_field_errors_accumulate() {
        let mut a = FieldErrors::new();
        a.add("username", "too long");
        a.add("username", "required");
        a.add("apiKey", "required");

        assert_eq!(a.get("username").map(<[String]>::len), Some(2));
        assert_eq!(a.fields().collect::<Vec<_>>(), vec!["apiKey", "username"]);
    }

    #[test]
    fn test_length_messages_use_rule_bounds() {
        use validator::Validate;

        #[derive(Validate)]
        struct Form {
            #[validate(length(min = 1, max = 5))]
            user_name: String,
            #[validate(length(max = 3))]
            nick: Option<String>,
        }

        let errors = Form {
            user_name: String::new(),
            nick: Some("toolong".to_string()),
        }
        .validate()
        .unwrap_err();
        let fields = FieldErrors::from(errors);

        assert_eq!(
            fields.get("userName"),
            Some(&["The userName field must be 1 to 5 characters.".to_string()][..])
        );
        assert_eq!(
            fields.get("nick"),
            Some(&["The nick field must be at most 3 characters.".to_string()][..])
        );
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("first_name"), "firstName");
        assert_eq!(camel_case("api_key"), "apiKey");
        assert_eq!(camel_case("username"), "username");
    }
}
