use axum::{
    extract::State,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use super::common::{csv_attachment, reject, validate_input, ApiJson};
use crate::{
    errors::ServiceError,
    models::{
        Category, ForecastHorizon, ForecastRequest, ForecastScenario, ModelKind, Platform,
    },
    reports,
    services::{ForecastReport, SampleData},
    ApiResponse, ApiResult, AppState,
};

/// Build the forecast Router scoped under `/api/v1/forecasts`.
pub fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_forecast))
        .route("/csv", post(export_forecast_csv))
        .route("/sample", get(get_sample_forecast))
}

fn default_horizon() -> u32 {
    ForecastHorizon::DEFAULT
}

fn default_category() -> String {
    Category::Sports.to_string()
}

fn default_platform() -> String {
    Platform::Xbox.to_string()
}

/// Forecast form submission
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForecastRequestBody {
    /// `arima`, `holt_winters`, `ses` or `sarima` (display names accepted)
    #[schema(example = "holt_winters")]
    pub model: String,

    /// Months to forecast
    #[serde(default = "default_horizon")]
    #[validate(range(min = 1, max = 12))]
    #[schema(minimum = 1, maximum = 12, example = 4)]
    pub horizon: u32,

    /// Omitted scenario means the first option of every field
    #[serde(default)]
    #[validate]
    pub scenario: Option<ScenarioInput>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ScenarioInput {
    /// 0 = Monday ... 6 = Sunday
    #[serde(default)]
    #[validate(range(max = 6))]
    #[schema(minimum = 0, maximum = 6)]
    pub day_of_week: u8,

    #[serde(default)]
    pub promotion: bool,

    #[serde(default)]
    pub holiday: bool,

    #[serde(default = "default_category")]
    #[schema(example = "RPG")]
    pub category: String,

    #[serde(default = "default_platform")]
    #[schema(example = "PC")]
    pub platform: String,
}

impl ScenarioInput {
    fn into_scenario(self) -> Result<ForecastScenario, ServiceError> {
        ForecastScenario::new(
            self.day_of_week,
            self.promotion,
            self.holiday,
            self.category.parse()?,
            self.platform.parse()?,
        )
    }
}

impl ForecastRequestBody {
    pub fn into_request(self) -> Result<ForecastRequest, ServiceError> {
        validate_input(&self)?;

        let model: ModelKind = self.model.parse()?;
        let horizon = ForecastHorizon::new(self.horizon)?;
        let scenario = match self.scenario {
            Some(input) => input.into_scenario()?,
            None => ForecastScenario::default(),
        };

        Ok(ForecastRequest::new(model, horizon, scenario))
    }
}

/// Run a forecast
#[utoipa::path(
    post,
    path = "/api/v1/forecasts",
    request_body = ForecastRequestBody,
    responses(
        (status = 200, description = "Forecast produced", body = ApiResponse<ForecastReport>),
        (status = 400, description = "Request outside the allowed inputs", body = crate::errors::ErrorResponse),
        (status = 422, description = "Model rejected the prepared inputs", body = crate::errors::ErrorResponse),
        (status = 503, description = "Model artifact missing or unreadable", body = crate::errors::ErrorResponse)
    ),
    tag = "Forecasts"
)]
pub async fn create_forecast(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ForecastRequestBody>,
) -> ApiResult<ForecastReport> {
    let request = body.into_request().map_err(reject)?;
    let report = state.services.forecasting.run(&request).await?;

    Ok(Json(ApiResponse::success(report)))
}

/// Run a forecast and download it as CSV
#[utoipa::path(
    post,
    path = "/api/v1/forecasts/csv",
    request_body = ForecastRequestBody,
    responses(
        (status = 200, description = "CSV with `Month` and `Forecasted Sales` columns", content_type = "text/csv", body = String),
        (status = 400, description = "Request outside the allowed inputs", body = crate::errors::ErrorResponse),
        (status = 422, description = "Model rejected the prepared inputs", body = crate::errors::ErrorResponse),
        (status = 503, description = "Model artifact missing or unreadable", body = crate::errors::ErrorResponse)
    ),
    tag = "Forecasts"
)]
pub async fn export_forecast_csv(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ForecastRequestBody>,
) -> Result<Response, ServiceError> {
    let request = body.into_request().map_err(reject)?;
    let report = state.services.forecasting.run(&request).await?;
    let csv = reports::to_csv(&report.result)?;

    info!(model = %request.model.slug(), rows = report.result.len(), "Forecast exported as CSV");
    csv_attachment(csv, reports::CSV_FILE_NAME)
}

/// Bundled historical forecast
#[utoipa::path(
    get,
    path = "/api/v1/forecasts/sample",
    responses(
        (status = 200, description = "Sample forecast rows", body = ApiResponse<SampleData>),
        (status = 404, description = "Sample file not present", body = crate::errors::ErrorResponse)
    ),
    tag = "Forecasts"
)]
pub async fn get_sample_forecast(
    State(state): State<AppState>,
) -> ApiResult<SampleData> {
    let data = state.services.sample_data.load().await?;
    Ok(Json(ApiResponse::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn body(json: serde_json::Value) -> ForecastRequestBody {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let request = body(serde_json::json!({ "model": "ARIMA" }))
            .into_request()
            .unwrap();
        assert_eq!(request.model, ModelKind::Arima);
        assert_eq!(request.horizon.months(), 4);
        assert_eq!(request.scenario, ForecastScenario::default());
    }

    #[test]
    fn scenario_labels_are_parsed() {
        let request = body(serde_json::json!({
            "model": "sarima",
            "horizon": 12,
            "scenario": { "day_of_week": 6, "promotion": true, "category": "fps", "platform": "PC" }
        }))
        .into_request()
        .unwrap();
        assert_eq!(request.scenario.category(), Category::Fps);
        assert_eq!(request.scenario.platform(), Platform::Pc);
        assert!(!request.scenario.holiday());
    }

    #[test]
    fn out_of_range_inputs_are_validation_errors() {
        for json in [
            serde_json::json!({ "model": "ses", "horizon": 13 }),
            serde_json::json!({ "model": "ses", "horizon": 0 }),
            serde_json::json!({ "model": "ses", "scenario": { "day_of_week": 7 } }),
            serde_json::json!({ "model": "prophet" }),
            serde_json::json!({ "model": "ses", "scenario": { "category": "Racing" } }),
        ] {
            assert_matches!(
                body(json).into_request(),
                Err(ServiceError::ValidationError(_))
            );
        }
    }
}
