use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use forecast_api::{
    ml::{HorizonForecaster, ModelArtifact},
    models::{Category, ExpectedFeatureSchema, ForecastHorizon, ForecastScenario, Platform},
    services::ForecastRequestBuilder,
};
use std::time::Duration;

fn builder() -> ForecastRequestBuilder {
    ForecastRequestBuilder::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
}

// Dates, encoding and reconciliation for each horizon
fn feature_preparation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_preparation");
    let scenario = ForecastScenario::new(4, true, false, Category::Rpg, Platform::Pc).unwrap();
    let schema = ExpectedFeatureSchema::from(vec![
        "Year",
        "Month",
        "DayOfWeek",
        "Promotion",
        "Holiday",
        "Category_RPG",
        "Platform_PC",
    ]);

    for months in [1u32, 4, 12] {
        let horizon = ForecastHorizon::new(months).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(months), &horizon, |b, horizon| {
            b.iter(|| {
                let builder = builder();
                let dates = builder.build_future_dates(*horizon).unwrap();
                let rows = builder.build_feature_rows(black_box(&scenario), &dates);
                builder.reconcile_schema(rows.table, Some(&schema))
            });
        });
    }

    group.finish();
}

// Seasonal ARIMA recursion over a year of history
fn sarima_forecast_benchmark(c: &mut Criterion) {
    let history: Vec<f64> = (0..48)
        .map(|i| 1000.0 + 10.0 * i as f64 + 150.0 * ((i % 12) as f64 / 12.0))
        .collect();
    let artifact = serde_json::json!({
        "capability": "forecast",
        "model": {
            "type": "sarima",
            "order": [1, 1, 1],
            "seasonal_order": [1, 1, 1, 12],
            "ar": [0.3],
            "ma": [-0.2],
            "seasonal_ar": [0.1],
            "seasonal_ma": [-0.4],
            "history": history,
            "residuals": vec![0.0; 24],
        }
    });
    let artifact = ModelArtifact::from_slice(&serde_json::to_vec(&artifact).unwrap()).unwrap();
    let forecast_api::ml::LoadedModel::Forecast(model) = artifact.model else {
        panic!("sarima artifact must forecast");
    };

    c.bench_function("sarima_forecast_12", |b| {
        b.iter(|| model.forecast(black_box(12)).unwrap());
    });
}

// Benchmark for JSON artifact parsing
fn artifact_parsing_benchmark(c: &mut Criterion) {
    let names = ForecastRequestBuilder::feature_columns();
    let coefficients: Vec<f64> = (0..names.len()).map(|i| i as f64 * 0.5).collect();
    let bytes = serde_json::to_vec(&serde_json::json!({
        "capability": "predict",
        "model": {
            "type": "linear_regression",
            "intercept": 1200.0,
            "feature_names": names,
            "coefficients": coefficients,
        }
    }))
    .unwrap();

    c.bench_function("artifact_parse_regression", |b| {
        b.iter(|| ModelArtifact::from_slice(black_box(&bytes)).unwrap());
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = feature_preparation_benchmark, sarima_forecast_benchmark, artifact_parsing_benchmark
}
criterion_main!(benches);
