use std::sync::Arc;

use crate::{
    config::AppConfig,
    ml::ModelStore,
    services::{Clock, FeedbackService, ForecastingService, SampleDataService},
};

pub mod common;
pub mod feedback;
pub mod forecasts;
pub mod health;
pub mod models;

/// Services shared by all HTTP handlers
#[derive(Clone, Debug)]
pub struct AppServices {
    pub forecasting: Arc<ForecastingService>,
    pub feedback: Arc<FeedbackService>,
    pub sample_data: Arc<SampleDataService>,
}

impl AppServices {
    /// Wire every service from configuration, sharing one clock.
    pub fn new(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let store = ModelStore::new(&config.models_dir, &config.feature_schema_file)
            .with_cache(config.cache_models);

        Self {
            forecasting: Arc::new(ForecastingService::new(Arc::new(store), clock.clone())),
            feedback: Arc::new(FeedbackService::new(&config.feedback_file, clock)),
            sample_data: Arc::new(SampleDataService::new(&config.sample_data_file)),
        }
    }
}
