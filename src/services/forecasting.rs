use chrono::{DateTime, Datelike, Local, Months, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::ml::{Capability, FeaturePredictor, HorizonForecaster, LoadedModel, ModelStore};
use crate::models::{
    Categorical, Category, ExpectedFeatureSchema, FeatureTable, ForecastHorizon, ForecastPoint,
    ForecastRequest, ForecastResult, ForecastScenario, ForecastWarning, ModelKind, Platform,
    ScenarioRow,
};
use crate::reports::{self, ForecastTableRow, LineChart};
use crate::tracing::{log_error, ErrorKind};

/// Numeric columns that precede the indicator columns, in order.
pub const BASE_COLUMNS: [&str; 5] = ["Year", "Month", "DayOfWeek", "Promotion", "Holiday"];

/// Source of "today" for date generation.
pub trait Clock: Send + Sync + fmt::Debug {
    fn today(&self) -> NaiveDate;

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stopped at midnight UTC of the given day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }

    fn now(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(chrono::NaiveTime::MIN))
    }
}

/// Encoded features plus the raw rows they were built from.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRows {
    pub scenario_rows: Vec<ScenarioRow>,
    pub table: FeatureTable,
}

/// A table aligned to a schema, with whatever had to be adjusted.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub table: FeatureTable,
    pub warnings: Vec<ForecastWarning>,
}

/// Turns a scenario and horizon into model input and model output into a
/// dated result. Holds no state beyond the day it was created for.
#[derive(Debug, Clone, Copy)]
pub struct ForecastRequestBuilder {
    today: NaiveDate,
}

impl ForecastRequestBuilder {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.today())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// `horizon` consecutive month starts, beginning the month after today.
    pub fn build_future_dates(
        &self,
        horizon: ForecastHorizon,
    ) -> Result<Vec<NaiveDate>, ServiceError> {
        let first = NaiveDate::from_ymd_opt(self.today.year(), self.today.month(), 1)
            .and_then(|start| start.checked_add_months(Months::new(1)));

        let dates: Vec<NaiveDate> =
            std::iter::successors(first, |date| date.checked_add_months(Months::new(1)))
                .take(horizon.steps())
                .collect();

        if dates.len() != horizon.steps() {
            return Err(ServiceError::Forecast(format!(
                "cannot build {} monthly periods after {}",
                horizon.months(),
                self.today
            )));
        }
        Ok(dates)
    }

    /// Column order of every table produced by [`Self::build_feature_rows`].
    pub fn feature_columns() -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|column| column.to_string())
            .chain(Category::indicator_columns())
            .chain(Platform::indicator_columns())
            .collect()
    }

    /// One row per date with the scenario copied onto it, categorical fields
    /// expanded against the full vocabulary with the reference level dropped.
    pub fn build_feature_rows(
        &self,
        scenario: &ForecastScenario,
        dates: &[NaiveDate],
    ) -> FeatureRows {
        let mut table = FeatureTable::new(Self::feature_columns());
        let mut scenario_rows = Vec::with_capacity(dates.len());

        let category = indicators(scenario.category());
        let platform = indicators(scenario.platform());

        for date in dates {
            let row = ScenarioRow {
                date: *date,
                year: date.year(),
                month: date.month(),
                day_of_week: scenario.day_of_week(),
                promotion: u8::from(scenario.promotion()),
                holiday: u8::from(scenario.holiday()),
                category: scenario.category().label().to_string(),
                platform: scenario.platform().label().to_string(),
            };

            let mut values = vec![
                f64::from(row.year),
                f64::from(row.month),
                f64::from(row.day_of_week),
                f64::from(row.promotion),
                f64::from(row.holiday),
            ];
            values.extend_from_slice(&category);
            values.extend_from_slice(&platform);
            table.push_row(values);

            scenario_rows.push(row);
        }

        FeatureRows {
            scenario_rows,
            table,
        }
    }

    /// Aligns `table` to `schema`: missing columns become 0, extra columns are
    /// dropped, order follows the schema. Without a schema the table is
    /// returned unchanged with a [`ForecastWarning::SchemaMissing`].
    pub fn reconcile_schema(
        &self,
        table: FeatureTable,
        schema: Option<&ExpectedFeatureSchema>,
    ) -> Reconciliation {
        let Some(schema) = schema else {
            return Reconciliation {
                table,
                warnings: vec![ForecastWarning::SchemaMissing {
                    detail: "no expected feature columns supplied".to_string(),
                }],
            };
        };

        let mut warnings: Vec<ForecastWarning> = schema
            .columns()
            .iter()
            .filter(|column| !table.contains(column))
            .map(|column| ForecastWarning::ColumnZeroFilled {
                column: column.clone(),
            })
            .collect();

        for column in table.columns() {
            if schema.contains(column) {
                continue;
            }
            let carries_value = table
                .column(column)
                .map_or(false, |values| values.iter().any(|v| *v != 0.0));
            if carries_value {
                warnings.push(ForecastWarning::UnrepresentedInput {
                    column: column.clone(),
                });
            }
        }

        Reconciliation {
            table: table.select_with_fill(schema.columns(), 0.0),
            warnings,
        }
    }

    /// Invokes the model through its declared capability and pairs the
    /// output with `dates`.
    pub fn run_forecast(
        &self,
        model: &LoadedModel,
        table: &FeatureTable,
        dates: &[NaiveDate],
    ) -> Result<ForecastResult, ServiceError> {
        let values = match model {
            LoadedModel::Predict(model) => model.predict(table),
            LoadedModel::Forecast(model) => model.forecast(dates.len()),
        }
        .map_err(|e| ServiceError::Forecast(e.to_string()))?;

        if values.len() != dates.len() {
            return Err(ServiceError::Forecast(format!(
                "model returned {} values for {} forecast periods",
                values.len(),
                dates.len()
            )));
        }
        if let Some(step) = values.iter().position(|v| !v.is_finite()) {
            return Err(ServiceError::Forecast(format!(
                "model produced a non-finite value at step {}",
                step + 1
            )));
        }

        let points = dates
            .iter()
            .zip(values)
            .map(|(date, value)| ForecastPoint { date: *date, value })
            .collect();
        Ok(ForecastResult::new(points))
    }
}

fn indicators<C: Categorical + PartialEq>(value: C) -> Vec<f64> {
    C::encoding_levels()
        .into_iter()
        .skip(1)
        .map(|level| if level == value.label() { 1.0 } else { 0.0 })
        .collect()
}

/// Everything shown for one completed forecast.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForecastReport {
    pub model: ModelKind,
    #[schema(example = "Holt-Winters (ETS)")]
    pub model_name: String,
    /// Name recorded in the artifact, if any
    pub artifact_name: Option<String>,
    #[schema(example = "holt_winters")]
    pub model_type: String,
    pub capability: Capability,
    #[schema(value_type = u32, example = 4)]
    pub horizon: ForecastHorizon,
    pub scenario: ForecastScenario,
    /// "Forecast Scenario Inputs": the raw rows before encoding
    pub scenario_inputs: Vec<ScenarioRow>,
    pub forecast: Vec<ForecastTableRow>,
    pub chart: LineChart,
    pub warnings: Vec<ForecastWarning>,
    pub generated_at: DateTime<Utc>,
    #[serde(skip)]
    pub result: ForecastResult,
}

/// One entry of the model selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ModelInfo {
    pub kind: ModelKind,
    #[schema(example = "ARIMA")]
    pub display_name: String,
    #[schema(example = "arima")]
    pub slug: String,
    #[schema(example = "arima_model.json")]
    pub artifact_file: String,
    /// Whether the artifact file currently exists
    pub available: bool,
}

/// Runs forecast requests end to end against the model store.
#[derive(Clone, Debug)]
pub struct ForecastingService {
    store: Arc<ModelStore>,
    clock: Arc<dyn Clock>,
}

impl ForecastingService {
    pub fn new(store: Arc<ModelStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    #[instrument(skip(self), fields(model = %request.model.slug(), horizon = request.horizon.months()))]
    pub async fn run(&self, request: &ForecastRequest) -> Result<ForecastReport, ServiceError> {
        let artifact = self.store.load_artifact(request.model).await.map_err(|e| {
            log_error(&e, ErrorKind::ModelLoad, Some(request.model.slug()));
            e
        })?;

        let builder = ForecastRequestBuilder::from_clock(self.clock.as_ref());
        let dates = builder.build_future_dates(request.horizon)?;
        let FeatureRows {
            scenario_rows,
            table,
        } = builder.build_feature_rows(&request.scenario, &dates);

        let mut warnings = Vec::new();
        let model_input = match artifact.capability() {
            Capability::Predict => {
                let schema = self.store.load_schema().await;
                let mut reconciled = builder.reconcile_schema(table, schema.as_ref().ok());
                if let Err(reason) = &schema {
                    warn!(%reason, "Expected feature columns unavailable; using raw encoding");
                    for warning in &mut reconciled.warnings {
                        if let ForecastWarning::SchemaMissing { detail } = warning {
                            *detail = reason.to_string();
                        }
                    }
                }
                warnings.extend(reconciled.warnings);
                reconciled.table
            }
            Capability::Forecast => {
                if request.scenario != ForecastScenario::default() {
                    warnings.push(ForecastWarning::ScenarioIgnored {
                        model: request.model.display_name().to_string(),
                    });
                }
                table
            }
        };

        let result = builder
            .run_forecast(&artifact.model, &model_input, &dates)
            .map_err(|e| {
                log_error(&e, ErrorKind::Forecast, Some(request.model.slug()));
                e
            })?;

        info!(
            periods = result.len(),
            warnings = warnings.len(),
            "Forecast completed"
        );

        Ok(ForecastReport {
            model: request.model,
            model_name: request.model.display_name().to_string(),
            artifact_name: artifact.name.clone(),
            model_type: artifact.model.type_name().to_string(),
            capability: artifact.capability(),
            horizon: request.horizon,
            scenario: request.scenario,
            scenario_inputs: scenario_rows,
            forecast: reports::table_rows(&result),
            chart: reports::line_chart(&result),
            warnings,
            generated_at: self.clock.now(),
            result,
        })
    }

    /// All selectable models and whether their artifacts are present.
    pub async fn catalogue(&self) -> Vec<ModelInfo> {
        let mut models = Vec::new();
        for kind in ModelKind::iter() {
            models.push(ModelInfo {
                kind,
                display_name: kind.display_name().to_string(),
                slug: kind.slug().to_string(),
                artifact_file: kind.artifact_file().to_string(),
                available: self.store.artifact_exists(kind).await,
            });
        }
        models
    }
}
