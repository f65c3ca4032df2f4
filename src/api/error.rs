use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use freeze_core::thaw::ThawError;
use freeze_core::workflow::WorkflowError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid x-user-id header")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// A durable write failed; nothing moved and the request can be retried.
    #[error("storage unavailable, please try again")]
    Unavailable(#[source] anyhow::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    retryable: bool,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Unavailable(e) => {
                tracing::error!(error = %format!("{e:#}"), "Durable write failed");
            }
            Self::Internal(e) => {
                tracing::error!(error = %format!("{e:#}"), "Request failed");
            }
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_string(),
            retryable: self.is_retryable(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidTransition { .. } => Self::Conflict(err.to_string()),
            WorkflowError::ChecklistIncomplete { .. } => Self::BadRequest(err.to_string()),
            WorkflowError::Persistence(e) => Self::Unavailable(e),
        }
    }
}

impl From<ThawError> for ApiError {
    fn from(err: ThawError) -> Self {
        match err {
            ThawError::InvalidWindow { .. } | ThawError::NoBureaus => Self::BadRequest(err.to_string()),
            ThawError::NotFound(_) => Self::NotFound(err.to_string()),
            ThawError::Storage(e) => Self::Unavailable(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_failures_are_retryable_503s() {
        let err = ApiError::from(WorkflowError::Persistence(anyhow::anyhow!("disk full")));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.is_retryable());
    }

    #[test]
    fn thaw_validation_maps_to_bad_request() {
        let err = ApiError::from(ThawError::NoBureaus);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_retryable());
    }
}
