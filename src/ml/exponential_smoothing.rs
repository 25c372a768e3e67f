//! Fitted exponential smoothing models (SES and Holt-Winters).

use serde::Deserialize;

use super::{HorizonForecaster, ModelError};

/// Simple exponential smoothing: every future period equals the last
/// smoothed level.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SesModel {
    pub level: f64,
}

impl HorizonForecaster for SesModel {
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, ModelError> {
        Ok(vec![self.level; steps])
    }

    fn validate(&self) -> Result<(), ModelError> {
        if !self.level.is_finite() {
            return Err(ModelError::InvalidState("level must be finite".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalMode {
    #[default]
    Additive,
    Multiplicative,
}

/// Holt-Winters final state.
///
/// `seasonal` holds one full cycle of seasonal components, rotated so that
/// entry 0 applies to the first forecast period.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HoltWintersModel {
    pub level: f64,
    #[serde(default)]
    pub trend: Option<f64>,
    #[serde(default)]
    pub damping: Option<f64>,
    #[serde(default)]
    pub seasonal: Vec<f64>,
    #[serde(default)]
    pub seasonal_mode: SeasonalMode,
}

impl HoltWintersModel {
    fn trend_contribution(&self, step: usize) -> f64 {
        let Some(trend) = self.trend else {
            return 0.0;
        };

        match self.damping {
            Some(phi) => {
                let mut factor = 0.0;
                let mut power = 1.0;
                for _ in 0..step {
                    power *= phi;
                    factor += power;
                }
                trend * factor
            }
            None => trend * step as f64,
        }
    }
}

impl HorizonForecaster for HoltWintersModel {
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, ModelError> {
        let period = self.seasonal.len();

        let values = (1..=steps)
            .map(|h| {
                let base = self.level + self.trend_contribution(h);
                if period == 0 {
                    return base;
                }
                let season = self.seasonal[(h - 1) % period];
                match self.seasonal_mode {
                    SeasonalMode::Additive => base + season,
                    SeasonalMode::Multiplicative => base * season,
                }
            })
            .collect();

        Ok(values)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let finite = self.level.is_finite()
            && self.trend.map_or(true, f64::is_finite)
            && self.seasonal.iter().all(|s| s.is_finite());
        if !finite {
            return Err(ModelError::InvalidState(
                "level, trend and seasonal components must be finite".into(),
            ));
        }

        if let Some(phi) = self.damping {
            if !(phi > 0.0 && phi <= 1.0) {
                return Err(ModelError::InvalidState(format!(
                    "damping must be in (0, 1], got {}",
                    phi
                )));
            }
            if self.trend.is_none() {
                return Err(ModelError::InvalidState(
                    "damping requires a trend component".into(),
                ));
            }
        }

        if self.seasonal_mode == SeasonalMode::Multiplicative && self.seasonal.is_empty() {
            return Err(ModelError::InvalidState(
                "multiplicative seasonality requires seasonal components".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn ses_is_flat() {
        let model = SesModel { level: 42.0 };
        assert_eq!(model.forecast(3).unwrap(), vec![42.0, 42.0, 42.0]);
    }

    #[test]
    fn additive_trend_and_season() {
        let model = HoltWintersModel {
            level: 100.0,
            trend: Some(10.0),
            damping: None,
            seasonal: vec![5.0, -5.0],
            seasonal_mode: SeasonalMode::Additive,
        };
        assert_close(&model.forecast(3).unwrap(), &[115.0, 115.0, 135.0]);
    }

    #[test]
    fn multiplicative_season_without_trend() {
        let model = HoltWintersModel {
            level: 100.0,
            trend: None,
            damping: None,
            seasonal: vec![1.1, 0.9],
            seasonal_mode: SeasonalMode::Multiplicative,
        };
        assert_close(&model.forecast(3).unwrap(), &[110.0, 90.0, 110.0]);
    }

    #[test]
    fn damped_trend_accumulates_geometrically() {
        let model = HoltWintersModel {
            level: 0.0,
            trend: Some(1.0),
            damping: Some(0.5),
            seasonal: vec![],
            seasonal_mode: SeasonalMode::Additive,
        };
        assert_close(&model.forecast(3).unwrap(), &[0.5, 0.75, 0.875]);
    }

    #[test]
    fn rejects_out_of_range_damping() {
        let model = HoltWintersModel {
            level: 0.0,
            trend: Some(1.0),
            damping: Some(1.5),
            seasonal: vec![],
            seasonal_mode: SeasonalMode::Additive,
        };
        assert!(matches!(model.validate(), Err(ModelError::InvalidState(_))));
    }

    #[test]
    fn deserializes_with_defaults() {
        let model: HoltWintersModel =
            serde_json::from_str(r#"{"level": 3.0, "seasonal": [1.0, 2.0]}"#).unwrap();
        assert_eq!(model.seasonal_mode, SeasonalMode::Additive);
        assert!(model.trend.is_none());
    }
}
