//! Fitted ARIMA and seasonal ARIMA models.
//!
//! Both are evaluated by the same recursion: the lag polynomials are expanded
//! into plain coefficient vectors, the history is differenced, the ARMA
//! equation is iterated forward with future shocks set to zero, and the
//! differenced forecasts are integrated back onto the original scale.

use serde::Deserialize;

use super::{HorizonForecaster, ModelError};

/// `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Order(pub usize, pub usize, pub usize);

/// `(P, D, Q, s)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SeasonalOrder(pub usize, pub usize, pub usize, pub usize);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArimaModel {
    pub order: Order,
    #[serde(default)]
    pub constant: f64,
    #[serde(default)]
    pub ar: Vec<f64>,
    #[serde(default)]
    pub ma: Vec<f64>,
    /// Most recent observations, oldest first.
    pub history: Vec<f64>,
    /// Most recent one-step residuals, oldest first.
    #[serde(default)]
    pub residuals: Vec<f64>,
}

impl ArimaModel {
    fn recursion(&self) -> ArmaRecursion {
        let Order(_, d, _) = self.order;
        ArmaRecursion {
            constant: self.constant,
            ar: self.ar.clone(),
            ma: self.ma.clone(),
            difference: difference_polynomial(d, 0, 0),
        }
    }
}

impl HorizonForecaster for ArimaModel {
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, ModelError> {
        self.recursion()
            .forecast(&self.history, &self.residuals, steps)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let Order(p, _, q) = self.order;
        check_len("ar", &self.ar, p)?;
        check_len("ma", &self.ma, q)?;
        check_finite(self.constant, &[&self.ar, &self.ma, &self.history, &self.residuals])
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SarimaModel {
    pub order: Order,
    pub seasonal_order: SeasonalOrder,
    #[serde(default)]
    pub constant: f64,
    #[serde(default)]
    pub ar: Vec<f64>,
    #[serde(default)]
    pub ma: Vec<f64>,
    #[serde(default)]
    pub seasonal_ar: Vec<f64>,
    #[serde(default)]
    pub seasonal_ma: Vec<f64>,
    /// Most recent observations, oldest first.
    pub history: Vec<f64>,
    /// Most recent one-step residuals, oldest first.
    #[serde(default)]
    pub residuals: Vec<f64>,
}

impl SarimaModel {
    fn recursion(&self) -> ArmaRecursion {
        let Order(_, d, _) = self.order;
        let SeasonalOrder(_, seasonal_d, _, period) = self.seasonal_order;

        // (1 - φ(B)) (1 - Φ(B^s))
        let ar_poly = poly_mul(
            &lag_polynomial(&self.ar, 1, -1.0),
            &lag_polynomial(&self.seasonal_ar, period, -1.0),
        );
        // (1 + θ(B)) (1 + Θ(B^s))
        let ma_poly = poly_mul(
            &lag_polynomial(&self.ma, 1, 1.0),
            &lag_polynomial(&self.seasonal_ma, period, 1.0),
        );

        ArmaRecursion {
            constant: self.constant,
            ar: ar_poly.iter().skip(1).map(|c| -c).collect(),
            ma: ma_poly.iter().skip(1).copied().collect(),
            difference: difference_polynomial(d, seasonal_d, period),
        }
    }
}

impl HorizonForecaster for SarimaModel {
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, ModelError> {
        self.recursion()
            .forecast(&self.history, &self.residuals, steps)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let Order(p, _, q) = self.order;
        let SeasonalOrder(big_p, big_d, big_q, period) = self.seasonal_order;
        if period < 2 && (big_p > 0 || big_d > 0 || big_q > 0) {
            return Err(ModelError::InvalidState(format!(
                "seasonal period must be at least 2, got {}",
                period
            )));
        }
        check_len("ar", &self.ar, p)?;
        check_len("ma", &self.ma, q)?;
        check_len("seasonal_ar", &self.seasonal_ar, big_p)?;
        check_len("seasonal_ma", &self.seasonal_ma, big_q)?;
        check_finite(
            self.constant,
            &[
                &self.ar,
                &self.ma,
                &self.seasonal_ar,
                &self.seasonal_ma,
                &self.history,
                &self.residuals,
            ],
        )
    }
}

/// Expanded ARMA on a differenced series.
///
/// `w_t = c + Σ ar[i]·w_{t-1-i} + Σ ma[j]·e_{t-1-j}` where
/// `w_t = Σ difference[k]·y_{t-k}` and `difference[0] == 1`.
struct ArmaRecursion {
    constant: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    difference: Vec<f64>,
}

impl ArmaRecursion {
    fn forecast(
        &self,
        history: &[f64],
        residuals: &[f64],
        steps: usize,
    ) -> Result<Vec<f64>, ModelError> {
        let diff_order = self.difference.len() - 1;
        let needed = diff_order + self.ar.len();
        if history.len() < needed {
            return Err(ModelError::InsufficientHistory {
                needed,
                available: history.len(),
            });
        }
        if residuals.len() < self.ma.len() {
            return Err(ModelError::InvalidState(format!(
                "model needs the last {} residuals, artifact has {}",
                self.ma.len(),
                residuals.len()
            )));
        }

        let mut levels = history.to_vec();
        let mut differenced: Vec<f64> = (diff_order..levels.len())
            .map(|t| self.apply_difference(&levels, t))
            .collect();
        let mut shocks = residuals.to_vec();

        let mut forecasts = Vec::with_capacity(steps);
        for step in 1..=steps {
            let ar_term: f64 = self
                .ar
                .iter()
                .enumerate()
                .map(|(i, coef)| coef * differenced[differenced.len() - 1 - i])
                .sum();
            let ma_term: f64 = self
                .ma
                .iter()
                .enumerate()
                .map(|(j, coef)| coef * shocks[shocks.len() - 1 - j])
                .sum();
            let w = self.constant + ar_term + ma_term;

            // y_t = w_t - Σ_{k≥1} difference[k]·y_{t-k}
            let t = levels.len();
            let lagged: f64 = self
                .difference
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, coef)| coef * levels[t - k])
                .sum();
            let y = w - lagged;
            if !y.is_finite() {
                return Err(ModelError::NonFinite { step });
            }

            differenced.push(w);
            shocks.push(0.0);
            levels.push(y);
            forecasts.push(y);
        }

        Ok(forecasts)
    }

    fn apply_difference(&self, levels: &[f64], t: usize) -> f64 {
        self.difference
            .iter()
            .enumerate()
            .map(|(k, coef)| coef * levels[t - k])
            .sum()
    }
}

/// `1 + sign·Σ coefs[i]·B^{(i+1)·stride}` as a dense coefficient vector.
fn lag_polynomial(coefs: &[f64], stride: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefs.len() * stride + 1];
    poly[0] = 1.0;
    for (i, coef) in coefs.iter().enumerate() {
        poly[(i + 1) * stride] = sign * coef;
    }
    poly
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `(1 - B)^d (1 - B^s)^D`
fn difference_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    for _ in 0..seasonal_d {
        poly = poly_mul(&poly, &lag_polynomial(&[1.0], period, -1.0));
    }
    poly
}

fn check_len(field: &str, coefs: &[f64], order: usize) -> Result<(), ModelError> {
    if coefs.len() != order {
        return Err(ModelError::InvalidState(format!(
            "{} has {} coefficients but the order is {}",
            field,
            coefs.len(),
            order
        )));
    }
    Ok(())
}

fn check_finite(constant: f64, series: &[&[f64]]) -> Result<(), ModelError> {
    let finite = constant.is_finite() && series.iter().all(|s| s.iter().all(|v| v.is_finite()));
    if !finite {
        return Err(ModelError::InvalidState(
            "coefficients, history and residuals must be finite".into(),
        ));
    }
    Ok(())
}
