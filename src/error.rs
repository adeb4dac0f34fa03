//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! various error conditions, from database issues to validation failures.
//!
//! `AppError` is surfaced two ways:
//! - through `actix_web::error::ResponseError` for failures that happen before a GraphQL
//!   request is executed (for example a malformed `x-user-id` header), and
//! - through `async_graphql::ErrorExtensions` for failures inside resolvers, where each
//!   variant becomes a GraphQL error carrying an `extensions.code`.
//!
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors` and
//! `sqlx::migrate::MigrateError` allow easy conversion using the `?` operator.

use actix_web::{error::ResponseError, HttpResponse};
use async_graphql::ErrorExtensions;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Message shown instead of internal error details when error masking is on.
pub const MASKED_ERROR_MESSAGE: &str = "Unexpected error.";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Clone)]
pub enum AppError {
    /// The request carries no user identity but the operation needs one (HTTP 401).
    Unauthorized(String),
    /// The caller is known but not allowed to perform the operation (HTTP 403).
    Forbidden(String),
    /// A malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// A requested resource was not found (HTTP 404).
    NotFound(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// An error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Failed input validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// Invalid or missing configuration.
    Configuration(String),
}

impl AppError {
    /// The GraphQL `extensions.code` reported for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationError(_) => "BAD_USER_INPUT",
            AppError::InternalServerError(_)
            | AppError::DatabaseError(_)
            | AppError::Configuration(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// The bare message, without the variant prefix used by `Display`.
    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg)
            | AppError::ValidationError(msg)
            | AppError::Configuration(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({ "error": self.message() });
        match self {
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(body),
            AppError::Forbidden(_) => HttpResponse::Forbidden().json(body),
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(body),
            AppError::NotFound(_) => HttpResponse::NotFound().json(body),
            AppError::ValidationError(_) => HttpResponse::UnprocessableEntity().json(body),
            // Database and configuration errors are presented as generic internal server errors.
            AppError::InternalServerError(_)
            | AppError::DatabaseError(_)
            | AppError::Configuration(_) => HttpResponse::InternalServerError().json(body),
        }
    }
}

/// Converts `AppError` into a GraphQL error with an `extensions.code`.
///
/// Resolvers use `ResultExt::extend()` on `Result<_, AppError>` so the code survives the
/// conversion; a plain `?` would go through the blanket `Display` conversion and lose it.
impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        async_graphql::Error::new(self.message()).extend_with(|_, e| e.set("code", code))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `NotFound` and foreign-key violations (an unknown assignee,
/// for example) map to `BadRequest`; everything else becomes `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::BadRequest(format!(
                    "Referenced record does not exist: {}",
                    db_err.constraint().unwrap_or("foreign key")
                ))
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(format!("Migration failed: {}", error))
    }
}

/// Replaces the message of every internal error in `response` with a generic one.
///
/// Errors with any other code (authorization, validation, not found) are left as they are,
/// so clients still learn why their request was rejected.
pub fn mask_internal_errors(response: &mut async_graphql::Response) {
    for error in response.errors.iter_mut() {
        let is_internal = match error.extensions.as_ref().and_then(|ext| ext.get("code")) {
            Some(async_graphql::Value::String(code)) => code == "INTERNAL_SERVER_ERROR",
            Some(_) => false,
            // Errors raised by the engine itself (parse errors, unknown fields) have no code.
            None => false,
        };
        if is_internal {
            error.message = MASKED_ERROR_MESSAGE.to_string();
        }
    }
}
