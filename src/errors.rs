use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tracing::{log_error, ErrorKind};

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Simplified error structure for OpenAPI documentation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Service Unavailable",
    "message": "Failed to load model: models/ses_model.json: No such file or directory (os error 2)",
    "details": null,
    "request_id": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Bad Request", "Unprocessable Entity")
    #[schema(example = "Service Unavailable")]
    pub error: String,
    /// Human-readable error description
    #[schema(example = "Failed to load model: models/ses_model.json: No such file or directory")]
    pub message: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "req-abc123xyz")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    #[schema(example = "2024-12-09T10:30:00.000Z")]
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The selected model artifact is missing, unreadable or not a model.
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    /// The loaded model rejected the prepared inputs or produced unusable output.
    #[error("Error during forecasting: {0}")]
    Forecast(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The request body could not be read as JSON.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<csv::Error> for ServiceError {
    fn from(err: csv::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ModelLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Forecast(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::SerializationError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::Io(_) | Self::SerializationError(_) | Self::InternalError(_) => {
                "Internal server error".to_string()
            }
            // Load and forecast failures are shown to the user as-is
            _ => self.to_string(),
        }
    }

    /// Log category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ModelLoad(_) => ErrorKind::ModelLoad,
            Self::Forecast(_) => ErrorKind::Forecast,
            Self::ValidationError(_) | Self::BadRequest(_) | Self::NotFound(_) => {
                ErrorKind::Validation
            }
            Self::Io(_) => ErrorKind::IO,
            Self::SerializationError(_) | Self::InternalError(_) => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Model failures are logged where they happen, with the model as context
        if status.is_server_error() && !matches!(self, Self::ModelLoad(_)) {
            log_error(&self, self.kind(), None);
        }
        let error_message = self.response_message();

        let request_id = current_request_id();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: error_message,
            details: None,
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::ModelLoad("missing".into()).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
        assert_eq!(payload.message, "Failed to load model: missing");
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::ModelLoad("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServiceError::Forecast("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::InternalError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn service_error_response_message_hides_internal_details() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/etc/secret");
        assert_eq!(
            ServiceError::Io(io).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::SerializationError("bad row".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::InternalError("invalid header value".into()).response_message(),
            "Internal server error"
        );

        assert_eq!(
            ServiceError::Forecast("X has 3 features".into()).response_message(),
            "Error during forecasting: X has 3 features"
        );
        assert_eq!(
            ServiceError::ValidationError("Invalid email".into()).response_message(),
            "Validation error: Invalid email"
        );
    }

    #[test]
    fn error_kind_follows_the_variant() {
        assert_eq!(ServiceError::ModelLoad("x".into()).kind(), ErrorKind::ModelLoad);
        assert_eq!(ServiceError::BadRequest("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(
            ServiceError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).kind(),
            ErrorKind::IO
        );
        assert_eq!(ServiceError::InternalError("x".into()).kind(), ErrorKind::Internal);
    }
}
