//! Order selection and interval forecasting.

use serde::{Deserialize, Serialize};

use crate::arima::{ArimaModel, ArimaOrder};
use crate::diagnostics::{self, ljung_box};
use crate::error::{ForecastError, Result};
use crate::stationarity::{adf_test, difference};

/// Minimum observations required regardless of the grid.
const MIN_OBSERVATIONS: usize = 20;

/// Configuration for [`ArimaForecaster`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaConfig {
    /// Largest autoregressive order in the search grid.
    pub max_p: usize,
    /// Largest differencing order.
    pub max_d: usize,
    /// Largest moving-average order in the search grid.
    pub max_q: usize,
    /// ADF significance level for the stationarity decision.
    pub significance: f64,
    /// Confidence level of the forecast interval.
    pub confidence: f64,
    /// Refit on only the trailing window when set.
    pub rolling_window: Option<usize>,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            max_p: 3,
            max_d: 2,
            max_q: 3,
            significance: 0.05,
            confidence: 0.95,
            rolling_window: None,
        }
    }
}

/// Interval forecast with fit metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    /// Selected model order.
    pub order: ArimaOrder,
    /// AIC of the selected fit.
    pub aic: f64,
    /// Point forecasts, one per horizon step.
    pub values: Vec<f64>,
    /// Lower interval bounds.
    pub lower: Vec<f64>,
    /// Upper interval bounds.
    pub upper: Vec<f64>,
    /// Confidence level of the interval.
    pub confidence: f64,
    /// Set when the Ljung-Box test flagged autocorrelated residuals.
    pub ljung_box_warning: bool,
}

/// Fits ARIMA models over an order grid and forecasts with intervals.
#[derive(Debug, Clone, Default)]
pub struct ArimaForecaster {
    config: ArimaConfig,
}

impl ArimaForecaster {
    /// Forecaster with explicit configuration.
    pub fn new(config: ArimaConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ArimaConfig {
        &self.config
    }

    /// Select and fit the best model for a series.
    ///
    /// Differencing order comes from repeated ADF tests up to `max_d`; the
    /// `(p, q)` grid is then ranked by AIC with ties broken toward the
    /// simpler model.
    pub fn fit(&self, series: &[f64]) -> Result<(ArimaModel, bool)> {
        let series = self.windowed(series);

        let required =
            (self.config.max_p.max(self.config.max_q) + self.config.max_d + 10).max(MIN_OBSERVATIONS);
        if series.len() < required {
            return Err(ForecastError::InsufficientHistory {
                required,
                actual: series.len(),
            });
        }

        let d = self.select_differencing(series);

        let mut best: Option<ArimaModel> = None;
        for p in 0..=self.config.max_p {
            for q in 0..=self.config.max_q {
                let order = ArimaOrder { p, d, q };
                let Some(candidate) = ArimaModel::fit(series, order) else {
                    continue;
                };
                let better = match &best {
                    None => true,
                    Some(current) => {
                        candidate.aic < current.aic
                            || (candidate.aic == current.aic
                                && p + q < current.order.p + current.order.q)
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
        }

        let model = best.ok_or(ForecastError::NonConvergent)?;
        let warning = ljung_box(
            model.residuals(),
            diagnostics::default_lags(model.residuals().len()),
        )
        .map(|r| !r.passed)
        .unwrap_or(false);

        Ok((model, warning))
    }

    /// Fit the best model and produce an interval forecast.
    pub fn forecast(&self, series: &[f64], horizon: usize) -> Result<ForecastResult> {
        let (model, ljung_box_warning) = self.fit(series)?;
        let (values, std_errors) = model.forecast(horizon);

        let z = normal_quantile(0.5 + self.config.confidence / 2.0);
        let lower = values
            .iter()
            .zip(&std_errors)
            .map(|(v, s)| v - z * s)
            .collect();
        let upper = values
            .iter()
            .zip(&std_errors)
            .map(|(v, s)| v + z * s)
            .collect();

        Ok(ForecastResult {
            order: model.order,
            aic: model.aic,
            values,
            lower,
            upper,
            confidence: self.config.confidence,
            ljung_box_warning,
        })
    }

    fn windowed<'a>(&self, series: &'a [f64]) -> &'a [f64] {
        match self.config.rolling_window {
            Some(window) if window > 0 && window < series.len() => {
                &series[series.len() - window..]
            }
            _ => series,
        }
    }

    fn select_differencing(&self, series: &[f64]) -> usize {
        let mut working = series.to_vec();
        for d in 0..self.config.max_d {
            match adf_test(&working, self.config.significance) {
                Some(result) if result.stationary => return d,
                // Untestable (constant after differencing) counts as settled.
                None => return d,
                Some(_) => working = difference(&working),
            }
        }
        self.config.max_d
    }
}

/// Standard normal quantile via the Acklam rational approximation.
///
/// Accurate to ~1e-9 over (0, 1), far beyond what interval bounds need.
fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if !(0.0..=1.0).contains(&p) || p == 0.0 || p == 1.0 {
        return f64::NAN;
    }

    if p < P_LOW {
        let u = (-2.0 * p.ln()).sqrt();
        (((((C[0] * u + C[1]) * u + C[2]) * u + C[3]) * u + C[4]) * u + C[5])
            / ((((D[0] * u + D[1]) * u + D[2]) * u + D[3]) * u + 1.0)
    } else if p <= 1.0 - P_LOW {
        let u = p - 0.5;
        let r = u * u;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * u
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -normal_quantile(1.0 - p)
    }
}
