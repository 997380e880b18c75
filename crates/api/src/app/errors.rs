use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use salesrelay_core::DomainError;
use salesrelay_infra::ProcessError;

/// Caller-facing failures of a sale request.
///
/// Responses are short plain-text bodies; which sink failed is only logged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Invalid request body")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Partial failure: some operations failed")]
    PartialFailure,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_)
            | ApiError::NotAnObject
            | ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::PartialFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProcessError> for ApiError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Validation(DomainError::MissingField(field)) => {
                ApiError::MissingField(field)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
