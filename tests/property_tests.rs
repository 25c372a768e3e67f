//! Property-based tests for forecast request preparation.
//!
//! These tests use proptest to check the date, encoding and reconciliation
//! rules over arbitrary clocks, horizons and scenarios.

use chrono::{Datelike, Months, NaiveDate};
use forecast_api::{
    models::{Category, ExpectedFeatureSchema, ForecastHorizon, ForecastScenario, Platform},
    services::ForecastRequestBuilder,
};
use proptest::prelude::*;

// Strategies for generating test data
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2090, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
}

fn horizon_strategy() -> impl Strategy<Value = ForecastHorizon> {
    (ForecastHorizon::MIN..=ForecastHorizon::MAX)
        .prop_map(|months| ForecastHorizon::new(months).expect("horizon in range"))
}

fn category_strategy() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Sports),
        Just(Category::Rpg),
        Just(Category::Simulation),
        Just(Category::Fps),
        Just(Category::Adventure),
    ]
}

fn platform_strategy() -> impl Strategy<Value = Platform> {
    prop_oneof![
        Just(Platform::Xbox),
        Just(Platform::PlayStation),
        Just(Platform::Nintendo),
        Just(Platform::Pc),
    ]
}

fn scenario_strategy() -> impl Strategy<Value = ForecastScenario> {
    (
        0u8..=6,
        any::<bool>(),
        any::<bool>(),
        category_strategy(),
        platform_strategy(),
    )
        .prop_map(|(dow, promotion, holiday, category, platform)| {
            ForecastScenario::new(dow, promotion, holiday, category, platform)
                .expect("valid scenario")
        })
}

fn schema_strategy() -> impl Strategy<Value = Vec<String>> {
    let pool: Vec<String> = ForecastRequestBuilder::feature_columns()
        .into_iter()
        .chain(["Trend".to_string(), "Region_EU".to_string()])
        .collect();
    proptest::sample::subsequence(pool.clone(), 1..=pool.len()).prop_shuffle()
}

// Property: Future dates are consecutive month starts after today
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn future_dates_are_consecutive_month_starts(today in date_strategy(), horizon in horizon_strategy()) {
        let dates = ForecastRequestBuilder::new(today)
            .build_future_dates(horizon)
            .expect("dates");

        let next_month_start = today
            .with_day(1)
            .and_then(|d| d.checked_add_months(Months::new(1)))
            .expect("next month");

        prop_assert_eq!(dates.len(), horizon.steps());
        prop_assert_eq!(dates[0], next_month_start);
        for date in &dates {
            prop_assert_eq!(date.day(), 1);
        }
        for pair in dates.windows(2) {
            let months_apart = (pair[1].year() - pair[0].year()) * 12
                + pair[1].month() as i32
                - pair[0].month() as i32;
            prop_assert_eq!(months_apart, 1);
        }
    }
}

// Property: Each row carries the scenario and one level per categorical column
proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn encoding_is_one_hot_or_reference(scenario in scenario_strategy(), horizon in horizon_strategy()) {
        let builder = ForecastRequestBuilder::new(NaiveDate::from_ymd_opt(2024, 3, 15).expect("date"));
        let dates = builder.build_future_dates(horizon).expect("dates");
        let rows = builder.build_feature_rows(&scenario, &dates);

        prop_assert_eq!(rows.table.len(), dates.len());
        let columns = rows.table.columns().to_vec();
        prop_assert_eq!(&columns[2..5], &["DayOfWeek", "Promotion", "Holiday"][..]);
        let flag = |on: bool| if on { 1.0 } else { 0.0 };
        for row in rows.table.rows() {
            prop_assert_eq!(row[2], f64::from(scenario.day_of_week()));
            prop_assert_eq!(row[3], flag(scenario.promotion()));
            prop_assert_eq!(row[4], flag(scenario.holiday()));

            let category_hot: f64 = columns
                .iter()
                .zip(row)
                .filter(|(c, _)| c.starts_with("Category_"))
                .map(|(_, v)| *v)
                .sum();
            let platform_hot: f64 = columns
                .iter()
                .zip(row)
                .filter(|(c, _)| c.starts_with("Platform_"))
                .map(|(_, v)| *v)
                .sum();

            let expected_category = if scenario.category() == Category::Adventure { 0.0 } else { 1.0 };
            let expected_platform = if scenario.platform() == Platform::Nintendo { 0.0 } else { 1.0 };
            prop_assert_eq!(category_hot, expected_category);
            prop_assert_eq!(platform_hot, expected_platform);
        }
    }
}

// Property: Reconciliation output matches the expected schema exactly
proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn reconciled_columns_equal_schema(scenario in scenario_strategy(), schema in schema_strategy()) {
        let builder = ForecastRequestBuilder::new(NaiveDate::from_ymd_opt(2024, 3, 15).expect("date"));
        let dates = builder.build_future_dates(ForecastHorizon::default()).expect("dates");
        let raw = builder.build_feature_rows(&scenario, &dates).table;
        let expected = ExpectedFeatureSchema::from(schema.iter().map(String::as_str).collect::<Vec<_>>());

        let reconciled = builder.reconcile_schema(raw.clone(), Some(&expected));

        prop_assert_eq!(reconciled.table.columns(), expected.columns());
        prop_assert_eq!(reconciled.table.len(), raw.len());
        for column in expected.columns() {
            let values = reconciled.table.column(column).expect("column present");
            match raw.column(column) {
                Some(original) => prop_assert_eq!(values, original),
                None => prop_assert!(values.iter().all(|v| *v == 0.0)),
            }
        }
    }
}
