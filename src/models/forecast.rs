use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};
use utoipa::ToSchema;

use super::scenario::ForecastScenario;
use crate::errors::ServiceError;

/// The selectable pre-trained models.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[serde(alias = "ARIMA")]
    Arima,
    #[serde(alias = "Holt-Winters (ETS)", alias = "ets", alias = "hw")]
    HoltWinters,
    #[serde(alias = "SES")]
    Ses,
    #[serde(alias = "SARIMA")]
    Sarima,
}

impl ModelKind {
    /// Name shown in the model selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::Arima => "ARIMA",
            ModelKind::HoltWinters => "Holt-Winters (ETS)",
            ModelKind::Ses => "SES",
            ModelKind::Sarima => "SARIMA",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ModelKind::Arima => "arima",
            ModelKind::HoltWinters => "holt_winters",
            ModelKind::Ses => "ses",
            ModelKind::Sarima => "sarima",
        }
    }

    /// Artifact file name inside the models directory.
    pub fn artifact_file(&self) -> &'static str {
        match self {
            ModelKind::Arima => "arima_model.json",
            ModelKind::HoltWinters => "hw_model.json",
            ModelKind::Ses => "ses_model.json",
            ModelKind::Sarima => "sarima_model.json",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelKind {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        ModelKind::iter()
            .find(|kind| {
                kind.slug().eq_ignore_ascii_case(needle)
                    || kind.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| {
                let options: Vec<&str> = ModelKind::iter().map(|kind| kind.slug()).collect();
                ServiceError::ValidationError(format!(
                    "Selected model '{}' is not available; expected one of: {}",
                    value,
                    options.join(", ")
                ))
            })
    }
}

/// Number of future months to forecast, always within `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ForecastHorizon(u32);

impl ForecastHorizon {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 12;
    pub const DEFAULT: u32 = 4;

    pub fn new(months: u32) -> Result<Self, ServiceError> {
        if !(Self::MIN..=Self::MAX).contains(&months) {
            return Err(ServiceError::ValidationError(format!(
                "Forecast horizon must be between {} and {} months, got {}",
                Self::MIN,
                Self::MAX,
                months
            )));
        }
        Ok(Self(months))
    }

    pub fn months(&self) -> u32 {
        self.0
    }

    pub fn steps(&self) -> usize {
        self.0 as usize
    }
}

impl Default for ForecastHorizon {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Everything one forecast run needs, fixed at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRequest {
    pub model: ModelKind,
    pub horizon: ForecastHorizon,
    pub scenario: ForecastScenario,
}

impl ForecastRequest {
    pub fn new(model: ModelKind, horizon: ForecastHorizon, scenario: ForecastScenario) -> Self {
        Self {
            model,
            horizon,
            scenario,
        }
    }
}

/// One forecast period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Forecast values paired with their month-start dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ForecastResult {
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|point| point.date).collect()
    }
}

/// Raw (unencoded) scenario row, as shown back to the user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ScenarioRow {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub day_of_week: u8,
    pub promotion: u8,
    pub holiday: u8,
    pub category: String,
    pub platform: String,
}

/// Non-fatal conditions raised while preparing a forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ForecastWarning {
    /// No expected feature schema was available; the raw encoding was used
    /// as-is and alignment with training could not be verified.
    SchemaMissing { detail: String },
    /// A column the model expects was absent from the encoding and was
    /// filled with zeros.
    ColumnZeroFilled { column: String },
    /// A non-zero encoded input was dropped because the model's schema has no
    /// such column, so that selection cannot influence the forecast.
    UnrepresentedInput { column: String },
    /// The selected model forecasts from its own trajectory and ignores the
    /// scenario inputs.
    ScenarioIgnored { model: String },
}

impl ForecastWarning {
    pub fn message(&self) -> String {
        match self {
            ForecastWarning::SchemaMissing { detail } => format!(
                "Feature columns file not found. Using the current encoded features. ({})",
                detail
            ),
            ForecastWarning::ColumnZeroFilled { column } => {
                format!("Expected feature '{}' was not produced; filled with 0", column)
            }
            ForecastWarning::UnrepresentedInput { column } => format!(
                "Scenario input '{}' is not a feature of this model and has no effect",
                column
            ),
            ForecastWarning::ScenarioIgnored { model } => format!(
                "{} forecasts from its fitted trajectory; scenario inputs are ignored",
                model
            ),
        }
    }
}

impl fmt::Display for ForecastWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
