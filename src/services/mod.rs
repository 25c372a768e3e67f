// Forecast orchestration
pub mod forecasting;

// Supporting pages
pub mod feedback;
pub mod sample_data;

pub use feedback::{FeedbackReceipt, FeedbackService, FeedbackSubmission};
pub use forecasting::{
    Clock, FixedClock, ForecastReport, ForecastRequestBuilder, ForecastingService, ModelInfo,
    SystemClock,
};
pub use sample_data::{SampleData, SampleDataService};
