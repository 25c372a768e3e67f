use serde::Deserialize;

use super::{FeaturePredictor, ModelError};
use crate::models::FeatureTable;

/// Ordinary least squares fit over named features.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearRegressionModel {
    pub intercept: f64,
    /// Training columns, in the order `coefficients` follows.
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
}

impl FeaturePredictor for LinearRegressionModel {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<f64>, ModelError> {
        if table.width() != self.feature_names.len() {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.feature_names.len(),
                found: table.width(),
            });
        }
        if table.columns() != self.feature_names.as_slice() {
            return Err(ModelError::FeatureNamesMismatch {
                expected: self.feature_names.clone(),
                found: table.columns().to_vec(),
            });
        }

        table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let value = self.intercept
                    + row
                        .iter()
                        .zip(&self.coefficients)
                        .map(|(x, beta)| x * beta)
                        .sum::<f64>();
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(ModelError::NonFinite { step: i + 1 })
                }
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.len() != self.feature_names.len() {
            return Err(ModelError::InvalidState(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidState(
                "intercept and coefficients must be finite".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LinearRegressionModel {
        LinearRegressionModel {
            intercept: 10.0,
            feature_names: vec!["Year".into(), "Promotion".into()],
            coefficients: vec![0.5, 3.0],
        }
    }

    #[test]
    fn predicts_one_value_per_row() {
        let mut table = FeatureTable::new(vec!["Year".into(), "Promotion".into()]);
        table.push_row(vec![2.0, 0.0]);
        table.push_row(vec![2.0, 1.0]);

        assert_eq!(model().predict(&table).unwrap(), vec![11.0, 14.0]);
    }

    #[test]
    fn rejects_wrong_width() {
        let mut table = FeatureTable::new(vec!["Year".into()]);
        table.push_row(vec![2024.0]);

        assert_eq!(
            model().predict(&table),
            Err(ModelError::FeatureCountMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn rejects_reordered_columns() {
        let mut table = FeatureTable::new(vec!["Promotion".into(), "Year".into()]);
        table.push_row(vec![1.0, 2024.0]);

        assert!(matches!(
            model().predict(&table),
            Err(ModelError::FeatureNamesMismatch { .. })
        ));
    }
}
