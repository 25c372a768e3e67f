use crate::errors::ServiceError;
use crate::tracing::log_error;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor whose rejections use the service error format.
///
/// Bodies that parse but do not fit the target type are validation errors,
/// anything else about the body is a bad request. Both answer 400 with an
/// `ErrorResponse`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(reject(json_rejection_error(rejection))),
        }
    }
}

fn json_rejection_error(rejection: JsonRejection) -> ServiceError {
    match rejection {
        JsonRejection::JsonDataError(err) => ServiceError::ValidationError(err.body_text()),
        other => ServiceError::BadRequest(other.body_text()),
    }
}

/// Log a request rejected at the handler boundary and pass it on.
pub fn reject(err: ServiceError) -> ServiceError {
    log_error(&err, err.kind(), Some("request rejected"));
    err
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))
}

/// `text/csv` body served as a download named `file_name`
pub fn csv_attachment(body: String, file_name: &str) -> Result<Response, ServiceError> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .map_err(|e| ServiceError::InternalError(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::body::{to_bytes, Body};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        count: u8,
    }

    async fn extract(
        body: &'static str,
        content_type: &str,
    ) -> Result<ApiJson<Sample>, ServiceError> {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        ApiJson::<Sample>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn json_that_does_not_fit_is_a_validation_error() {
        assert_matches!(
            extract(r#"{"count": 300}"#, "application/json").await,
            Err(ServiceError::ValidationError(msg)) if msg.contains("count")
        );
        assert_matches!(
            extract(r#"{}"#, "application/json").await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let err = extract("{not json", "application/json").await.unwrap_err();
        assert_matches!(err, ServiceError::BadRequest(_));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        assert_matches!(
            extract(r#"{"count": 1}"#, "text/plain").await,
            Err(ServiceError::BadRequest(_))
        );
    }

    #[tokio::test]
    async fn well_formed_body_is_extracted() {
        let ApiJson(sample) = extract(r#"{"count": 7}"#, "application/json").await.unwrap();
        assert_eq!(sample.count, 7);
    }

    #[tokio::test]
    async fn csv_attachment_sets_download_headers() {
        let response = csv_attachment("Month,Forecasted Sales\n".into(), "forecast.csv").unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"forecast.csv\""
        );
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Month,Forecasted Sales\n");
    }
}
