//! HTTP error mapping.
//!
//! Every failure leaves through [`ApiError`], which fixes the status code and
//! the JSON body. Storage detail is logged, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pocbench_core::{Error, ErrorCode, TransactionError, ValidationError};
use serde::Serialize;

/// JSON error body: `{"error": ..., "code": ...}`, `code` omitted when none.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, code: Option<ErrorCode>) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Outcome of `CreateInteraction`.
    #[error(transparent)]
    Interaction(#[from] Error),
    /// `/interaction` body was not valid JSON of the expected shape.
    #[error("malformed interaction request: {0}")]
    MalformedInteraction(String),
    /// `/json` body was not a JSON object.
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),
    /// `/cpu` body missing a non-empty `name`.
    #[error("invalid request")]
    InvalidRequest,
    /// `/db` row absent.
    #[error("user not found")]
    UserNotFound,
    /// `/db` read failed.
    #[error("database read failed: {0}")]
    Database(TransactionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Interaction(err @ Error::Validation(ValidationError::InvalidInteractionType { .. })) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(err.public_message(), err.code()),
            ),
            Self::Interaction(Error::Validation(ValidationError::MissingField(field))) => {
                tracing::debug!(field, "Interaction request missing field");
                invalid_interaction_request()
            }
            Self::MalformedInteraction(detail) => {
                tracing::debug!(%detail, "Malformed interaction request");
                invalid_interaction_request()
            }
            Self::Interaction(err @ Error::Validation(_)) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(err.public_message(), err.code()),
            ),
            Self::Interaction(err @ Error::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(err.public_message(), err.code()),
            ),
            Self::Interaction(err @ Error::Transaction(detail)) => {
                tracing::error!(error = %detail, "Interaction transaction failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(err.public_message(), None),
                )
            }
            Self::InvalidJson(detail) => {
                tracing::debug!(%detail, "Rejected /json body");
                (StatusCode::BAD_REQUEST, ErrorBody::new("Invalid JSON", None))
            }
            Self::InvalidRequest => (StatusCode::BAD_REQUEST, ErrorBody::new("Invalid request", None)),
            Self::UserNotFound => (StatusCode::NOT_FOUND, ErrorBody::new("User not found", None)),
            Self::Database(detail) => {
                tracing::error!(error = %detail, "Customer read failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Database error", None),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

fn invalid_interaction_request() -> (StatusCode, ErrorBody) {
    (
        StatusCode::BAD_REQUEST,
        ErrorBody::new("Invalid request", Some(ErrorCode::InvalidRequest)),
    )
}
