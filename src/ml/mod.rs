/*!
 * # Model Artifacts
 *
 * Fitted forecasting models are stored as JSON artifacts. Each artifact
 * declares one of two capabilities:
 *
 * - `forecast`: the model projects its own fitted trajectory `steps` periods
 *   ahead (SES, Holt-Winters, ARIMA, SARIMA).
 * - `predict`: the model maps a feature table to one value per row
 *   (linear regression).
 *
 * Dispatch happens on the declared capability, never by probing the model.
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::FeatureTable;

pub mod arima;
pub mod exponential_smoothing;
pub mod loader;
pub mod regression;

pub use arima::{ArimaModel, SarimaModel};
pub use exponential_smoothing::{HoltWintersModel, SeasonalMode, SesModel};
pub use loader::{ModelStore, SchemaUnavailable};
pub use regression::LinearRegressionModel;

/// Failures raised by a fitted model while producing values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("invalid model state: {0}")]
    InvalidState(String),

    #[error("X has {found} features, but the model is expecting {expected} features as input")]
    FeatureCountMismatch { expected: usize, found: usize },

    #[error("feature names must match those seen during fit: expected {expected:?}, got {found:?}")]
    FeatureNamesMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("insufficient history: need at least {needed} observations, have {available}")]
    InsufficientHistory { needed: usize, available: usize },

    #[error("model produced a non-finite value at step {step}")]
    NonFinite { step: usize },
}

/// Step-count based forecasting.
pub trait HorizonForecaster {
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, ModelError>;

    /// Checks the fitted state once, at load time.
    fn validate(&self) -> Result<(), ModelError> {
        Ok(())
    }
}

/// Feature-table based prediction.
pub trait FeaturePredictor {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<f64>, ModelError>;

    fn validate(&self) -> Result<(), ModelError> {
        Ok(())
    }
}

/// Which calling convention an artifact supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Forecast,
    Predict,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HorizonModel {
    Ses(SesModel),
    HoltWinters(HoltWintersModel),
    Arima(ArimaModel),
    Sarima(SarimaModel),
}

impl HorizonModel {
    fn inner(&self) -> &dyn HorizonForecaster {
        match self {
            HorizonModel::Ses(model) => model,
            HorizonModel::HoltWinters(model) => model,
            HorizonModel::Arima(model) => model,
            HorizonModel::Sarima(model) => model,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            HorizonModel::Ses(_) => "ses",
            HorizonModel::HoltWinters(_) => "holt_winters",
            HorizonModel::Arima(_) => "arima",
            HorizonModel::Sarima(_) => "sarima",
        }
    }
}

impl HorizonForecaster for HorizonModel {
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, ModelError> {
        self.inner().forecast(steps)
    }

    fn validate(&self) -> Result<(), ModelError> {
        self.inner().validate()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureModel {
    LinearRegression(LinearRegressionModel),
}

impl FeatureModel {
    pub fn type_name(&self) -> &'static str {
        match self {
            FeatureModel::LinearRegression(_) => "linear_regression",
        }
    }
}

impl FeaturePredictor for FeatureModel {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<f64>, ModelError> {
        match self {
            FeatureModel::LinearRegression(model) => model.predict(table),
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        match self {
            FeatureModel::LinearRegression(model) => model.validate(),
        }
    }
}

/// A fitted model tagged with the capability it declared.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedModel {
    Forecast(HorizonModel),
    Predict(FeatureModel),
}

impl LoadedModel {
    pub fn capability(&self) -> Capability {
        match self {
            LoadedModel::Forecast(_) => Capability::Forecast,
            LoadedModel::Predict(_) => Capability::Predict,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            LoadedModel::Forecast(model) => model.type_name(),
            LoadedModel::Predict(model) => model.type_name(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    #[serde(default)]
    name: Option<String>,
    capability: Capability,
    model: serde_json::Value,
}

/// A deserialized, validated model artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub name: Option<String>,
    pub model: LoadedModel,
}

impl ModelArtifact {
    /// Parses an artifact document. Errors are returned as text so they can be
    /// shown verbatim in a load failure.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, String> {
        let raw: RawArtifact = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;

        let model = match raw.capability {
            Capability::Forecast => {
                let model: HorizonModel =
                    serde_json::from_value(raw.model).map_err(|e| e.to_string())?;
                model.validate().map_err(|e| e.to_string())?;
                LoadedModel::Forecast(model)
            }
            Capability::Predict => {
                let model: FeatureModel =
                    serde_json::from_value(raw.model).map_err(|e| e.to_string())?;
                model.validate().map_err(|e| e.to_string())?;
                LoadedModel::Predict(model)
            }
        };

        Ok(Self {
            name: raw.name,
            model,
        })
    }

    pub fn capability(&self) -> Capability {
        self.model.capability()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_forecast_artifact() {
        let artifact = ModelArtifact::from_slice(
            br#"{"name":"ses-v1","capability":"forecast","model":{"type":"ses","level":12.5}}"#,
        )
        .unwrap();

        assert_eq!(artifact.name.as_deref(), Some("ses-v1"));
        assert_eq!(artifact.capability(), Capability::Forecast);
        assert_eq!(artifact.model.type_name(), "ses");
    }

    #[test]
    fn parses_predict_artifact() {
        let artifact = ModelArtifact::from_slice(
            br#"{"capability":"predict","model":{"type":"linear_regression","intercept":1.0,
                "feature_names":["Year"],"coefficients":[2.0]}}"#,
        )
        .unwrap();

        assert_eq!(artifact.capability(), Capability::Predict);
        assert!(artifact.name.is_none());
    }

    #[test]
    fn capability_must_match_model_family() {
        let err = ModelArtifact::from_slice(
            br#"{"capability":"predict","model":{"type":"ses","level":1.0}}"#,
        )
        .unwrap_err();
        assert!(err.contains("unknown variant"), "{err}");
    }

    #[test]
    fn invalid_state_is_rejected_at_load() {
        let err = ModelArtifact::from_slice(
            br#"{"capability":"predict","model":{"type":"linear_regression","intercept":0.0,
                "feature_names":["Year","Month"],"coefficients":[1.0]}}"#,
        )
        .unwrap_err();
        assert!(err.contains("invalid model state"), "{err}");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(ModelArtifact::from_slice(b"\x80\x04pickle").is_err());
    }
}
