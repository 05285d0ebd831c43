use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;

/// HTTP-facing error taxonomy.
///
/// Status mapping is load-bearing for the auth flow:
/// - 400: the request transport itself is broken (missing cookie, bad payload)
/// - 401: a credential was presented and rejected, or the session is over
/// - 403: authenticated but the capability snapshot denies the action
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    /// Token absent from the expected transport (cookie). Distinct from 401:
    /// the client did not present a credential at all.
    #[error("missing or malformed token")]
    MissingToken,

    /// Signature or structural verification failed.
    #[error("invalid token")]
    InvalidToken,

    /// Both the access token and the refresh token are past expiry.
    /// The message is distinct from signature failure so clients can prompt
    /// a re-login without learning which check rejected them.
    #[error("session ended")]
    SessionEnded,

    /// Login rejection. "email not found" and "wrong password" share this
    /// message to prevent account enumeration.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("permission denied")]
    PermissionDenied,

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

/// Every rejection crosses the boundary as `{"error": true, "msg": "..."}`.
/// Internal error text never does.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: bool,
    pub msg: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingToken => StatusCode::BAD_REQUEST,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::SessionEnded => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: true,
            msg: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            // A role string outside the registry fails closed. It can only
            // come from our own configuration or persisted rows, so it is a
            // server fault, never a client one.
            AuthError::UnknownRole(_) => AppError::Internal,
            AuthError::Malformed | AuthError::InvalidSignature => AppError::InvalidToken,
            AuthError::Signing | AuthError::Entropy | AuthError::PasswordHash => AppError::Internal,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Db(_) => AppError::Internal,
        }
    }
}
