#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use forecast_api::{
    config::AppConfig, models::ModelKind, services::FixedClock, AppState,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Helper harness running the full router against a scratch directory of
/// model artifacts, with "today" pinned to 2024-03-15.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    dir: TempDir,
}

impl TestApp {
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date")
    }

    /// Construct a new test application with an empty models directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("models")).expect("models dir");

        let mut cfg = AppConfig::new("127.0.0.1".to_string(), 18_080, "test".to_string());
        cfg.models_dir = dir.path().join("models");
        cfg.feature_schema_file = dir.path().join("models").join("feature_columns.json");
        cfg.sample_data_file = dir.path().join("data").join("ets_forecast.csv");
        cfg.feedback_file = dir.path().join("feedback.txt");

        let state = AppState::new(cfg, Arc::new(FixedClock(Self::today())));
        let router = forecast_api::build_app(state.clone());

        Self { router, state, dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn feedback_file(&self) -> PathBuf {
        self.dir.path().join("feedback.txt")
    }

    /// Write `{kind}_model.json` into the models directory.
    pub fn write_artifact(&self, kind: ModelKind, artifact: &Value) {
        let path = self.dir.path().join("models").join(kind.artifact_file());
        std::fs::write(path, serde_json::to_vec(artifact).expect("serialize artifact"))
            .expect("write artifact");
    }

    pub fn write_schema(&self, columns: &[&str]) {
        let path = self.dir.path().join("models").join("feature_columns.json");
        std::fs::write(path, serde_json::to_vec(columns).expect("serialize schema"))
            .expect("write schema");
    }

    pub fn write_sample_data(&self, contents: &str) {
        let dir = self.dir.path().join("data");
        std::fs::create_dir_all(&dir).expect("data dir");
        std::fs::write(dir.join("ets_forecast.csv"), contents).expect("write sample data");
    }

    /// Send a JSON request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// A level-only model that forecasts the same value for every month.
pub fn flat_artifact(level: f64) -> Value {
    serde_json::json!({
        "name": "flat",
        "capability": "forecast",
        "model": { "type": "ses", "level": level }
    })
}

/// A regression over the given columns scoring every row as `intercept`
/// plus `weight * Promotion` when `Promotion` is present.
pub fn regression_artifact(intercept: f64, columns: &[&str], promotion_weight: f64) -> Value {
    let coefficients: Vec<f64> = columns
        .iter()
        .map(|c| if *c == "Promotion" { promotion_weight } else { 0.0 })
        .collect();
    serde_json::json!({
        "capability": "predict",
        "model": {
            "type": "linear_regression",
            "intercept": intercept,
            "feature_names": columns,
            "coefficients": coefficients,
        }
    })
}
