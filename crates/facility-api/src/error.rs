//! Error types for the Facility API server.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! body always carries a machine-stable `code` next to the human message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use facility_store::StoreError;
use facility_types::ValidationError;
use tracing::{debug, error};

/// Errors that can occur in the Facility API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// A payload was well-formed but failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The body, query string or path could not be parsed.
    #[error("{0}")]
    MalformedRequest(String),

    /// A write-through to the backing file failed and was rolled back.
    #[error("{0}")]
    Persistence(String),

    /// An internal error occurred.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// The stable code reported to clients.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::MalformedRequest(_) => "malformed_request",
            Self::Persistence(_) => "persistence_failed",
            Self::Internal(_) => "internal_error",
        }
    }

    /// The HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::FacilityNotFound(_) | StoreError::TicketNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            StoreError::Validation(e) => Self::Validation(e),
            StoreError::Io { .. } | StoreError::Parse { .. } => Self::Persistence(err.to_string()),
            StoreError::DuplicateId(_)
            | StoreError::IdExhausted
            | StoreError::Serialization(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!(code = self.code(), error = %message, "request failed");
        } else {
            debug!(code = self.code(), error = %message, "request rejected");
        }

        let body = serde_json::json!({
            "code": self.code(),
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
