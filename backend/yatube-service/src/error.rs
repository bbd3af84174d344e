/// Error types for Yatube Service
///
/// Every failure a handler can produce maps to exactly one HTTP status and a
/// JSON body of the form `{"error": ..., "status": ...}`. Validation failures
/// additionally carry per-field messages under `"fields"`.
use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type for yatube-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Write attempted without an authenticated identity
    #[error("Authentication credentials were not provided.")]
    AuthenticationRequired,

    /// A bearer token was supplied but could not be verified
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Authenticated identity is not allowed to modify the target object
    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    /// Referenced object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payload failed field-level or cross-field validation
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Verb not supported by the resource
    #[error("Method \"{0}\" not allowed.")]
    MethodNotAllowed(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a single field validation failure.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::single(field, message))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthenticationRequired | AppError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = match self {
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                serde_json::json!({
                    "error": "Internal server error",
                    "status": status.as_u16(),
                })
            }
            AppError::Validation(fields) => serde_json::json!({
                "error": "Validation failed",
                "status": status.as_u16(),
                "fields": fields,
            }),
            _ => serde_json::json!({
                "error": self.to_string(),
                "status": status.as_u16(),
            }),
        };

        let mut builder = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer realm=\"api\""));
        }
        builder.json(body)
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::field(NON_FIELD_ERRORS, err.to_string())
    }
}

/// Field name -> messages, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Append every message of `other`.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, the collected errors otherwise.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                fields.add(&field.to_string(), message);
            }
        }
        fields
    }
}
