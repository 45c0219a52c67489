//! Error conversions - From implementations and public messages
//!
//! Unexpected failures are never echoed to clients. [`public_message`]
//! picks a generic phrase from the raw error text and the raw text stays in
//! server logs.

use super::app_error::AppError;
#[cfg(feature = "sqlx")]
use super::kind::ErrorKind;

/// Fallback shown for any failure that does not match a known category.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

const DUPLICATE_MESSAGE: &str =
    "This record already exists. Please check your details and try again.";
const CONNECTION_MESSAGE: &str =
    "We are having trouble reaching our records right now. Please try again in a moment.";
const INVALID_MESSAGE: &str =
    "Some of the information provided is invalid. Please review it and try again.";

/// Map raw (internal) error text to a client-safe message.
///
/// Matching is case-insensitive and checked in order: duplicate/unique,
/// connection/database, validation/invalid.
///
/// ```rust
/// use kernel::error::conversions::{public_message, GENERIC_ERROR_MESSAGE};
///
/// assert!(public_message("duplicate key value violates unique constraint").contains("already exists"));
/// assert_eq!(public_message("stack overflow in worker 3"), GENERIC_ERROR_MESSAGE);
/// ```
pub fn public_message(raw: &str) -> &'static str {
    let lowered = raw.to_lowercase();
    let has = |needle: &str| lowered.contains(needle);

    if has("duplicate") || has("unique") {
        DUPLICATE_MESSAGE
    } else if has("connection") || has("database") {
        CONNECTION_MESSAGE
    } else if has("validation") || has("invalid") {
        INVALID_MESSAGE
    } else {
        GENERIC_ERROR_MESSAGE
    }
}

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

/// Classify a database failure: an unreachable pool is a 503, a unique
/// violation a 409, a missing row a 404, anything else a 500.
#[cfg(feature = "sqlx")]
pub fn sqlx_error_kind(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ErrorKind::ServiceUnavailable
        }
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => ErrorKind::Conflict,
        _ => ErrorKind::InternalServerError,
    }
}

/// Generic public message, original error kept as source for the logs.
#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let message = public_message(&err.to_string());
        AppError::new(sqlx_error_kind(&err), message).with_source(err)
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut body = serde_json::json!({ "error": self.message() });
        if let Some(action) = self.action() {
            body["action"] = serde_json::Value::from(action);
        }
        if let Some(errors) = self.field_errors() {
            body["errors"] = serde_json::json!(errors);
        }

        (status, Json(body)).into_response()
    }
}
