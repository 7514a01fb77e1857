use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shiftboard_services::dao::base::DaoError;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    Internal(String),
    Validation(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DaoError> for ApiError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            DaoError::DuplicateSlug(slug) => {
                ApiError::Conflict(format!("slug '{slug}' is already taken"))
            }
            DaoError::Validation(msg) => ApiError::Validation(msg),
            DaoError::InvalidState(msg) => ApiError::Conflict(msg),
            DaoError::TokenExpired
            | DaoError::TokenInvalid
            | DaoError::InvalidCredentials
            | DaoError::InactiveCredential(_) => ApiError::Unauthorized(err.to_string()),
            DaoError::Timeout | DaoError::Blob(_) | DaoError::Json(_) | DaoError::Hash(_) => {
                error!(error = %err, "Storage failure");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
