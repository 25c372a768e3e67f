use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};

use super::common::ApiJson;
use crate::{
    errors::ServiceError,
    services::{FeedbackReceipt, FeedbackSubmission},
    ApiResponse, AppState,
};

/// Build the feedback Router scoped under `/api/v1/feedback`.
pub fn feedback_routes() -> Router<AppState> {
    Router::new().route("/", post(submit_feedback))
}

/// Leave feedback
#[utoipa::path(
    post,
    path = "/api/v1/feedback",
    request_body = FeedbackSubmission,
    responses(
        (status = 201, description = "Feedback recorded", body = ApiResponse<FeedbackReceipt>),
        (status = 400, description = "Empty message or malformed email", body = crate::errors::ErrorResponse)
    ),
    tag = "Feedback"
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    ApiJson(submission): ApiJson<FeedbackSubmission>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackReceipt>>), ServiceError> {
    let receipt = state.services.feedback.submit(&submission).await?;

    let mut response = ApiResponse::success(receipt);
    response.message = Some("Thank you for your feedback!".to_string());
    Ok((StatusCode::CREATED, Json(response)))
}
