use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::account::StoreError;

pub const MISSING_SIGNUP_FIELDS: &str = "Identifier, password, and display name are required";
pub const MISSING_LOGIN_FIELDS: &str = "Identifier and password are required";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const IDENTIFIER_TAKEN: &str = "Identifier already exists";
/// Shared by the unknown-identifier and wrong-password paths so the two are
/// indistinguishable to a caller probing for registered identifiers.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Failure taxonomy for the account service.
///
/// Every variant carries a user-safe message; the underlying cause of an
/// `Internal` failure is logged at the boundary and never leaves the process.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Malformed or missing input; the caller must resubmit (400)
    #[error("{0}")]
    Validation(&'static str),
    /// Identifier already taken (409)
    #[error("{0}")]
    Conflict(&'static str),
    /// Bad credentials or a bad/expired token (401)
    #[error("{0}")]
    Auth(&'static str),
    /// Store or connectivity failure, surfaced opaquely (500)
    #[error("Internal server error")]
    Internal(color_eyre::Report),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateIdentifier => AccountError::Conflict(IDENTIFIER_TAKEN),
            StoreError::Unavailable(e) => AccountError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AccountError::Validation(message) => (StatusCode::BAD_REQUEST, *message),
            AccountError::Conflict(message) => (StatusCode::CONFLICT, *message),
            AccountError::Auth(message) => (StatusCode::UNAUTHORIZED, *message),
            AccountError::Internal(report) => {
                tracing::error!(error = ?report, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}
