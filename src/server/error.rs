//! HTTP error mapping for the evaluation endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::error::GraderError;

/// Errors surfaced to HTTP clients.
///
/// Kept separate from [`GraderError`] so the library never depends on HTTP
/// concerns; the `From` impl below decides the status taxonomy in one
/// place. Method-not-allowed (405) is handled by axum's method router and
/// never reaches this type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("server configuration error: {0}")]
    Configuration(String),

    #[error("evaluation failed: {0}")]
    Evaluation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<GraderError> for ApiError {
    fn from(e: GraderError) -> Self {
        match e {
            GraderError::MissingQuestion | GraderError::InvalidMaxMarks { .. } => {
                Self::InvalidRequest(e.to_string())
            }
            GraderError::ProviderNotConfigured { .. } => Self::Configuration(e.to_string()),
            GraderError::ModelCallFailed { .. } => Self::Evaluation(e.to_string()),
            GraderError::InvalidConfig(_) | GraderError::Internal(_) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration(_) | ApiError::Evaluation(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_question_maps_to_400() {
        let api: ApiError = GraderError::MissingQuestion.into();
        let response = api.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn provider_and_model_failures_map_to_500() {
        for e in [
            GraderError::ProviderNotConfigured {
                provider: "openai".into(),
                hint: String::new(),
            },
            GraderError::ModelCallFailed {
                message: "boom".into(),
            },
        ] {
            let api: ApiError = e.into();
            assert_eq!(
                api.into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }
}
