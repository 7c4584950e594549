// ABOUTME: Error envelope matching the pinned wire format
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use sentinel_types::{SentinelError, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub field: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub details: Vec<ErrorDetail>,
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// Wraps the domain error taxonomy for the HTTP boundary.
#[derive(Debug)]
pub struct ApiError {
    pub error: SentinelError,
    pub request_id: Uuid,
}

impl ApiError {
    pub fn new(error: SentinelError, request_id: Uuid) -> Self {
        Self { error, request_id }
    }

    pub fn status_code(&self) -> StatusCode {
        match &self.error {
            SentinelError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SentinelError::Model(_) => StatusCode::BAD_GATEWAY,
            SentinelError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            SentinelError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            SentinelError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match &self.error {
            SentinelError::Validation(_) => "validation_error",
            SentinelError::Model(_) => "model_error",
            SentinelError::ServiceUnavailable => "service_unavailable",
            SentinelError::NotReady(_) => "not_ready",
            SentinelError::Internal(_) => "internal_error",
        }
    }

    fn details(&self) -> Vec<ErrorDetail> {
        match &self.error {
            SentinelError::Validation(v) => vec![ErrorDetail {
                code: self.error_code().to_string(),
                message: v.to_string(),
                field: None,
            }],
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.error.to_string(),
            details: self.details(),
            request_id: self.request_id,
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_422() {
        let err = ApiError::new(
            SentinelError::Validation(ValidationError::EmptyMessage),
            Uuid::nil(),
        );
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.details().len(), 1);
    }

    #[test]
    fn service_unavailable_maps_to_503() {
        let err = ApiError::new(SentinelError::ServiceUnavailable, Uuid::nil());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
