//! Error responses shared by every HTTP adapter.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::InterviewError;
use crate::ports::retry_after_secs;

/// JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&InterviewError> for ErrorResponse {
    fn from(error: &InterviewError) -> Self {
        let details = match error {
            InterviewError::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            InterviewError::RateLimited { limit, reset_in } => Some(serde_json::json!({
                "limit": limit,
                "reset_in_secs": retry_after_secs(*reset_in),
            })),
            _ => None,
        };
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            details,
        }
    }
}

/// Status code for an orchestrator error.
pub fn status_for(error: &InterviewError) -> StatusCode {
    match error {
        InterviewError::NotFound => StatusCode::NOT_FOUND,
        InterviewError::InvalidState(_)
        | InterviewError::SessionClosed
        | InterviewError::AlreadyInProgress => StatusCode::CONFLICT,
        InterviewError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        InterviewError::GenerationFailed { .. } => StatusCode::BAD_GATEWAY,
        InterviewError::InvalidTemplate(_) => StatusCode::UNPROCESSABLE_ENTITY,
        InterviewError::Validation { .. } => StatusCode::BAD_REQUEST,
        InterviewError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Wrapper giving [`InterviewError`] an HTTP representation.
#[derive(Debug)]
pub struct ApiError(pub InterviewError);

impl From<InterviewError> for ApiError {
    fn from(error: InterviewError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "Request failed");
        }

        let mut response = (status, Json(ErrorResponse::from(&self.0))).into_response();
        if let InterviewError::RateLimited { reset_in, .. } = &self.0 {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after_secs(*reset_in)),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        let cases = [
            (InterviewError::NotFound, StatusCode::NOT_FOUND),
            (InterviewError::invalid_state("x"), StatusCode::CONFLICT),
            (InterviewError::SessionClosed, StatusCode::CONFLICT),
            (InterviewError::AlreadyInProgress, StatusCode::CONFLICT),
            (InterviewError::generation_failed("x"), StatusCode::BAD_GATEWAY),
            (
                InterviewError::InvalidTemplate("x".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (InterviewError::validation("content", "x"), StatusCode::BAD_REQUEST),
            (
                InterviewError::Infrastructure("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(status_for(&error), status, "{error:?}");
        }
    }

    #[test]
    fn rate_limited_sets_retry_after_rounded_up() {
        let response = ApiError(InterviewError::RateLimited {
            limit: 5,
            reset_in: Duration::from_millis(2_100),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "3");
    }

    #[test]
    fn body_carries_stable_code_and_field() {
        let body = ErrorResponse::from(&InterviewError::validation("content", "empty"));
        assert_eq!(body.code, "VALIDATION_FAILED");
        assert_eq!(body.details.unwrap()["field"], "content");
    }
}
