//! RSVP Error Types
//!
//! This module provides RSVP-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::conversions::{public_message, sqlx_error_kind};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::csrf::CsrfRejection;
use platform::rate_limit::RateLimitResult;
use thiserror::Error;

/// RSVP-specific result type alias
pub type RsvpResult<T> = Result<T, RsvpError>;

#[derive(Debug, Error)]
pub enum RsvpError {
    /// Client exceeded the bucket for this endpoint
    #[error("Too many requests. Please try again later.")]
    RateLimitExceeded(RateLimitResult),

    #[error("Missing CSRF token")]
    CsrfMissing,

    #[error("Invalid CSRF token")]
    CsrfInvalid,

    #[error("Request origin not allowed")]
    OriginRejected,

    /// Field errors keyed by request field name
    #[error("Please correct the highlighted fields")]
    ValidationFailed(BTreeMap<String, String>),

    #[error("Invitation not found")]
    InviteNotFound,

    #[error("Invite code is already in use")]
    InviteCodeTaken,

    /// Malformed body or missing parameter
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RsvpError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RsvpError::RateLimitExceeded(_) => ErrorKind::TooManyRequests,
            RsvpError::CsrfMissing | RsvpError::CsrfInvalid | RsvpError::OriginRejected => {
                ErrorKind::Forbidden
            }
            RsvpError::ValidationFailed(_) | RsvpError::InvalidRequest(_) => ErrorKind::BadRequest,
            RsvpError::InviteNotFound => ErrorKind::NotFound,
            RsvpError::InviteCodeTaken => ErrorKind::Conflict,
            RsvpError::Database(e) => sqlx_error_kind(e),
            RsvpError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError. Server-side failures get a generic public
    /// message; their text only goes to the log.
    pub fn into_app_error(self) -> AppError {
        let message = self.to_string();
        match self {
            RsvpError::RateLimitExceeded(_) => AppError::too_many_requests(message),
            RsvpError::CsrfMissing | RsvpError::CsrfInvalid => {
                AppError::forbidden(message).with_action("Refresh the page and try again")
            }
            RsvpError::OriginRejected => AppError::forbidden(message),
            RsvpError::ValidationFailed(errors) => {
                AppError::bad_request(message).with_field_errors(errors)
            }
            RsvpError::InvalidRequest(_) => AppError::bad_request(message),
            RsvpError::InviteNotFound => AppError::not_found(message),
            RsvpError::InviteCodeTaken => AppError::conflict(message),
            RsvpError::Database(e) => AppError::from(e),
            RsvpError::Internal(msg) => AppError::internal(public_message(&msg)),
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            RsvpError::Database(e) if self.kind().is_server_error() => {
                tracing::error!(error = %e, "RSVP database error");
            }
            RsvpError::Internal(msg) => {
                tracing::error!(message = %msg, "RSVP internal error");
            }
            RsvpError::OriginRejected => {
                tracing::warn!("Request origin rejected");
            }
            _ => {
                tracing::debug!(error = %self, "RSVP client error");
            }
        }
    }
}

impl From<CsrfRejection> for RsvpError {
    fn from(rejection: CsrfRejection) -> Self {
        match rejection {
            CsrfRejection::Missing => RsvpError::CsrfMissing,
            CsrfRejection::Invalid => RsvpError::CsrfInvalid,
        }
    }
}

impl From<RsvpError> for AppError {
    fn from(err: RsvpError) -> Self {
        err.into_app_error()
    }
}

impl IntoResponse for RsvpError {
    fn into_response(self) -> Response {
        self.log();
        let rate_limit_headers = match &self {
            RsvpError::RateLimitExceeded(result) => Some(result.headers()),
            _ => None,
        };
        let mut response = self.into_app_error().into_response();
        if let Some(headers) = rate_limit_headers {
            response.headers_mut().extend(headers);
        }
        response
    }
}
