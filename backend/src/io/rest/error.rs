//! Translation of domain failures into HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::{ErrorResponse, FieldError};
use tracing::{error, warn};

use crate::domain::DomainError;

/// Error returned by every handler. The body is always an [`ErrorResponse`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Vec<FieldError>,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Sign in to continue.")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(details) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "VALIDATION_FAILED",
                message: "Please correct the highlighted fields.".to_string(),
                details,
            },
            DomainError::NotFound { entity, id } => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", format!("{} {} not found", entity, id))
            }
            DomainError::Duplicate(msg) => Self::new(StatusCode::CONFLICT, "DUPLICATE", msg),
            DomainError::Conflict(msg) => Self::new(StatusCode::CONFLICT, "CONFLICT", msg),
            DomainError::InvalidReference(msg) => Self::new(StatusCode::BAD_REQUEST, "INVALID_REFERENCE", msg),
            DomainError::Unauthorized(msg) => Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            DomainError::Storage(err) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", err.to_string())
            }
            DomainError::Internal(err) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", format!("{:#}", err))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("❌ {} {}: {}", self.status.as_u16(), self.code, self.message);
        } else {
            warn!("{} {}: {}", self.status.as_u16(), self.code, self.message);
        }

        let payload = ErrorResponse {
            code: self.code.to_string(),
            message: self.message,
            details: self.details,
        };
        (self.status, Json(payload)).into_response()
    }
}
