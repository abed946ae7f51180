//! Error types for yatube-rs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::form::FormErrors;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(FormErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a validation error on a single field.
    #[must_use]
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FormErrors::single(field, message))
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_)
            | Self::UserNotFound(_)
            | Self::PostNotFound(_)
            | Self::GroupNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Database(_)
            | Self::Cache(_)
            | Self::Storage(_)
            | Self::Config(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::PostNotFound(_) => "POST_NOT_FOUND",
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error is one of the not-found variants.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::UserNotFound(_) | Self::PostNotFound(_) | Self::GroupNotFound(_)
        )
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        // Server error details stay in the log; the page is generic.
        let (template, error) = match &self {
            Self::Validation(errors) => (
                "posts/misc/400.html",
                json!({ "code": code, "fields": errors }),
            ),
            _ if self.is_server_error() => (
                "posts/misc/500.html",
                json!({ "code": code, "message": "Internal server error" }),
            ),
            _ if self.is_not_found() => (
                "posts/misc/404.html",
                json!({ "code": code, "message": self.to_string() }),
            ),
            _ => (
                "posts/misc/error.html",
                json!({ "code": code, "message": self.to_string() }),
            ),
        };
        let body = json!({ "template": template, "context": { "error": error } });

        (status, Json(body)).into_response()
    }
}

// === From implementations ===

impl From<FormErrors> for AppError {
    fn from(err: FormErrors) -> Self {
        Self::Validation(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.into())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_variants_map_to_404() {
        for err in [
            AppError::NotFound("x".into()),
            AppError::UserNotFound("alice".into()),
            AppError::PostNotFound("p1".into()),
            AppError::GroupNotFound("cats".into()),
        ] {
            assert!(err.is_not_found());
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_server_errors() {
        assert!(AppError::Database("boom".into()).is_server_error());
        assert!(AppError::Cache("down".into()).is_server_error());
        assert!(!AppError::Forbidden("no".into()).is_server_error());
    }

    #[test]
    fn test_field_shorthand() {
        let err = AppError::field("text", "This field is required");
        match err {
            AppError::Validation(errors) => assert!(errors.has("text")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_server_error_response_is_generic() {
        let response = AppError::Database("password=secret".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
