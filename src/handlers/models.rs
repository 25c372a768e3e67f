use axum::{extract::State, response::Json, routing::get, Router};

use crate::{services::ModelInfo, ApiResponse, ApiResult, AppState};

/// Build the model catalogue Router scoped under `/api/v1/models`.
pub fn model_routes() -> Router<AppState> {
    Router::new().route("/", get(list_models))
}

/// List selectable models
#[utoipa::path(
    get,
    path = "/api/v1/models",
    responses(
        (status = 200, description = "Selectable models and artifact availability", body = ApiResponse<Vec<ModelInfo>>)
    ),
    tag = "Models"
)]
pub async fn list_models(State(state): State<AppState>) -> ApiResult<Vec<ModelInfo>> {
    let models = state.services.forecasting.catalogue().await;
    Ok(Json(ApiResponse::success(models)))
}
