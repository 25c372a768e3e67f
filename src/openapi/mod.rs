use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Forecast API",
        version = "0.2.1",
        description = r#"
# Video Game Sales Forecasting API

Runs pre-trained time-series models against a chosen scenario and returns the
forecast as table rows, a chart series, or a CSV download.

## Models

- **ARIMA**, **Holt-Winters (ETS)**, **SES**, **SARIMA**

Each model is a JSON artifact in the configured models directory. Artifacts
declare whether they forecast from their own fitted trajectory (`forecast`)
or score a feature table built from the scenario (`predict`).

## Warnings

Non-fatal conditions, such as a missing expected-feature-columns file or a
scenario selection the model cannot represent, are returned in the
`warnings` array of the forecast report instead of failing the request.

## Error Handling

```json
{
  "error": "Service Unavailable",
  "message": "Failed to load model: models/arima_model.json: No such file or directory (os error 2)",
  "request_id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Forecasts", description = "Forecast generation and export"),
        (name = "Models", description = "Model catalogue"),
        (name = "Feedback", description = "Contact and feedback"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::forecasts::create_forecast,
        crate::handlers::forecasts::export_forecast_csv,
        crate::handlers::forecasts::get_sample_forecast,
        crate::handlers::models::list_models,
        crate::handlers::feedback::submit_feedback,
        crate::handlers::health::health_check,
        crate::handlers::health::api_status,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,

            // Forecast types
            crate::handlers::forecasts::ForecastRequestBody,
            crate::handlers::forecasts::ScenarioInput,
            crate::services::ForecastReport,
            crate::services::ModelInfo,
            crate::services::SampleData,
            crate::models::ForecastWarning,
            crate::models::ScenarioRow,
            crate::models::ForecastScenario,
            crate::models::ModelKind,
            crate::models::Category,
            crate::models::Platform,
            crate::ml::Capability,
            crate::reports::ForecastTableRow,
            crate::reports::LineChart,
            crate::reports::ChartPoint,

            // Feedback types
            crate::services::FeedbackSubmission,
            crate::services::FeedbackReceipt,

            // Health types
            crate::handlers::health::HealthResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_forecast_endpoints() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Forecast API"));
        assert!(json.contains("/api/v1/forecasts/csv"));
        assert!(json.contains("ForecastReport"));
    }
}
