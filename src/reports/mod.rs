//! Renderings of a forecast result: table rows, a chart series and CSV.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::models::ForecastResult;

pub const CHART_TITLE: &str = "Forecasted Video Game Sales";
pub const CSV_HEADER: [&str; 2] = ["Month", "Forecasted Sales"];
pub const CSV_FILE_NAME: &str = "forecast.csv";

const MONTH_FORMAT: &str = "%Y-%m";
const CHART_LABEL_FORMAT: &str = "%b %Y";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ForecastTableRow {
    pub date: NaiveDate,
    /// `YYYY-MM`
    #[schema(example = "2024-04")]
    pub month: String,
    pub forecasted_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartPoint {
    /// e.g. `Apr 2024`
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: String,
    pub points: Vec<ChartPoint>,
}

pub fn table_rows(result: &ForecastResult) -> Vec<ForecastTableRow> {
    result
        .points()
        .iter()
        .map(|point| ForecastTableRow {
            date: point.date,
            month: point.date.format(MONTH_FORMAT).to_string(),
            forecasted_sales: point.value,
        })
        .collect()
}

pub fn line_chart(result: &ForecastResult) -> LineChart {
    LineChart {
        title: CHART_TITLE.to_string(),
        x_label: "Date".to_string(),
        y_label: "Sales".to_string(),
        series: "Forecast".to_string(),
        points: result
            .points()
            .iter()
            .map(|point| ChartPoint {
                label: point.date.format(CHART_LABEL_FORMAT).to_string(),
                value: point.value,
            })
            .collect(),
    }
}

/// `Month,Forecasted Sales` with one `YYYY-MM` row per period.
pub fn to_csv(result: &ForecastResult) -> Result<String, ServiceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for point in result.points() {
        writer.write_record([
            point.date.format(MONTH_FORMAT).to_string(),
            point.value.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::SerializationError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::SerializationError(e.to_string()))
}
