use axum::{response::IntoResponse, Json};
use thiserror::Error;

/// Failure taxonomy for every core operation. All failures leave prior
/// state untouched: operations validate first and perform a single
/// atomic mutation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input, or a dangling category/tag reference.
    /// Rejected before any write.
    #[error("validation error: {0}")]
    Validation(String),
    /// Actor identity was not resolved upstream.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Role or ownership check failed.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Ticket, reply or referenced user absent.
    #[error("not found: {0}")]
    NotFound(String),
    /// Lost a race, e.g. the ticket was already assigned on pickup.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Persistence collaborator failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Internal(msg) => {
                log::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
