// Request, feature and result types for a single forecast run
pub mod feature_table;
pub mod forecast;
pub mod scenario;

pub use feature_table::{ExpectedFeatureSchema, FeatureTable};
pub use forecast::{
    ForecastHorizon, ForecastPoint, ForecastRequest, ForecastResult, ForecastWarning, ModelKind,
    ScenarioRow,
};
pub use scenario::{Categorical, Category, ForecastScenario, Platform};
