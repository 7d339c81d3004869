//! ARIMA model fitting via the Hannan-Rissanen two-stage regression.

use ndarray::{Array1, Array2};
use serde::Serialize;
use std::fmt;

use crate::linalg;
use crate::stationarity::difference;

/// Horizon used for the explosive-coefficient sanity check.
const STABILITY_HORIZON: usize = 50;
const STABILITY_LIMIT: f64 = 1e6;

/// Model order `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArimaOrder {
    /// Autoregressive order.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// Moving-average order.
    pub q: usize,
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// A fitted ARIMA model.
///
/// Holds the fitted coefficients together with the differenced series and
/// residuals needed to run the forecast recursion.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// The fitted order.
    pub order: ArimaOrder,
    /// Regression intercept on the differenced scale.
    pub intercept: f64,
    /// Autoregressive coefficients `φ_1..φ_p`.
    pub ar: Vec<f64>,
    /// Moving-average coefficients `θ_1..θ_q`.
    pub ma: Vec<f64>,
    /// Innovation variance estimate.
    pub sigma2: f64,
    /// Akaike information criterion of the fit.
    pub aic: f64,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    integration_heads: Vec<f64>,
}

impl ArimaModel {
    /// Fit a model of the given order to a series.
    ///
    /// Returns `None` when the series is too short for the order, the
    /// regression is singular, or the fitted coefficients are explosive.
    pub fn fit(series: &[f64], order: ArimaOrder) -> Option<Self> {
        let mut working = series.to_vec();
        let mut integration_heads = Vec::with_capacity(order.d);
        for _ in 0..order.d {
            let last = *working.last()?;
            integration_heads.push(last);
            working = difference(&working);
        }

        let (intercept, ar, ma, residuals, sigma2, aic) =
            fit_arma(&working, order.p, order.q)?;

        let model = Self {
            order,
            intercept,
            ar,
            ma,
            sigma2,
            aic,
            differenced: working,
            residuals,
            integration_heads,
        };

        let unstable = model
            .psi_weights(STABILITY_HORIZON)
            .iter()
            .any(|psi| !psi.is_finite() || psi.abs() > STABILITY_LIMIT);
        if unstable { None } else { Some(model) }
    }

    /// Fit residuals, aligned to the differenced series (presample zeros).
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// MA(∞) ψ-weights of the ARMA part: `ψ_0 = 1`,
    /// `ψ_j = θ_j + Σ φ_i ψ_{j-i}`.
    pub fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let mut psi = Vec::with_capacity(horizon);
        if horizon == 0 {
            return psi;
        }
        psi.push(1.0);
        for j in 1..horizon {
            let mut value = if j <= self.ma.len() { self.ma[j - 1] } else { 0.0 };
            for (i, &phi) in self.ar.iter().enumerate() {
                let lag = i + 1;
                if j >= lag {
                    value += phi * psi[j - lag];
                }
            }
            psi.push(value);
        }
        psi
    }

    /// H-step forecast on the original scale.
    ///
    /// Returns point forecasts and forecast-error standard deviations. The
    /// ARMA recursion runs on the differenced series; values and ψ-weights
    /// are both integrated back `d` times, so the standard deviation is
    /// non-decreasing in the horizon.
    pub fn forecast(&self, horizon: usize) -> (Vec<f64>, Vec<f64>) {
        if horizon == 0 {
            return (Vec::new(), Vec::new());
        }

        let n = self.differenced.len();
        let mut extended = self.differenced.clone();
        let mut future = Vec::with_capacity(horizon);
        for step in 0..horizon {
            let t = n + step;
            let mut value = self.intercept;
            for (i, &phi) in self.ar.iter().enumerate() {
                let lag = i + 1;
                if t >= lag {
                    value += phi * extended[t - lag];
                }
            }
            for (j, &theta) in self.ma.iter().enumerate() {
                let lag = j + 1;
                if t >= lag && t - lag < n {
                    value += theta * self.residuals[t - lag];
                }
            }
            extended.push(value);
            future.push(value);
        }

        // Integrate the point forecasts back to the original scale.
        for &head in self.integration_heads.iter().rev() {
            let mut running = head;
            for value in future.iter_mut() {
                running += *value;
                *value = running;
            }
        }

        // Integrate ψ-weights the same number of times for the variance.
        let mut psi = self.psi_weights(horizon);
        for _ in 0..self.order.d {
            for j in 1..psi.len() {
                psi[j] += psi[j - 1];
            }
        }
        let mut std_errors = Vec::with_capacity(horizon);
        let mut cumulative = 0.0;
        for &weight in &psi {
            cumulative += weight * weight;
            std_errors.push((self.sigma2 * cumulative).sqrt());
        }

        (future, std_errors)
    }
}

type ArmaFit = (f64, Vec<f64>, Vec<f64>, Vec<f64>, f64, f64);

fn fit_arma(w: &[f64], p: usize, q: usize) -> Option<ArmaFit> {
    let n = w.len();

    if p == 0 && q == 0 {
        if n < 2 {
            return None;
        }
        let mean = w.iter().sum::<f64>() / n as f64;
        let residuals: Vec<f64> = w.iter().map(|v| v - mean).collect();
        let rss: f64 = residuals.iter().map(|r| r * r).sum();
        let sigma2 = rss / n as f64;
        if !(sigma2.is_finite() && sigma2 > 0.0) {
            return None;
        }
        let aic = n as f64 * sigma2.ln() + 2.0;
        return Some((mean, Vec::new(), Vec::new(), residuals, sigma2, aic));
    }

    // Stage 1: long-AR residual proxy, only needed when MA terms exist.
    let proxy = if q > 0 {
        let long_order = ((p + q + 1).max((n as f64).powf(1.0 / 3.0) as usize + 1))
            .min(n.saturating_sub(4) / 3);
        if long_order == 0 {
            return None;
        }
        Some(long_ar_residuals(w, long_order)?)
    } else {
        None
    };

    // Stage 2: OLS of w_t on its own lags and lagged stage-1 residuals.
    let start = p.max(q);
    let num_rows = n.checked_sub(start)?;
    let num_cols = 1 + p + q;
    if num_rows < num_cols + 2 {
        return None;
    }

    let mut x = Array2::<f64>::zeros((num_rows, num_cols));
    let mut y = Array1::<f64>::zeros(num_rows);
    for row in 0..num_rows {
        let t = row + start;
        y[row] = w[t];
        x[[row, 0]] = 1.0;
        for i in 1..=p {
            x[[row, i]] = w[t - i];
        }
        if let Some(ref e) = proxy {
            for j in 1..=q {
                x[[row, p + j]] = e[t - j];
            }
        }
    }

    let (beta, reg_residuals) = linalg::least_squares(&x, &y)?;
    let intercept = beta[0];
    let ar: Vec<f64> = (1..=p).map(|i| beta[i]).collect();
    let ma: Vec<f64> = (1..=q).map(|j| beta[p + j]).collect();

    let rss: f64 = reg_residuals.iter().map(|r| r * r).sum();
    let sigma2 = rss / num_rows as f64;
    if !(sigma2.is_finite() && sigma2 > 0.0) {
        return None;
    }
    let aic = num_rows as f64 * sigma2.ln() + 2.0 * (p + q + 1) as f64;

    let mut residuals = vec![0.0; start];
    residuals.extend(reg_residuals.iter());

    Some((intercept, ar, ma, residuals, sigma2, aic))
}

/// Residuals of a long AR(m) regression, presample entries zero.
fn long_ar_residuals(w: &[f64], m: usize) -> Option<Vec<f64>> {
    let n = w.len();
    let num_rows = n.checked_sub(m)?;
    let num_cols = 1 + m;
    if num_rows < num_cols + 2 {
        return None;
    }

    let mut x = Array2::<f64>::zeros((num_rows, num_cols));
    let mut y = Array1::<f64>::zeros(num_rows);
    for row in 0..num_rows {
        let t = row + m;
        y[row] = w[t];
        x[[row, 0]] = 1.0;
        for i in 1..=m {
            x[[row, i]] = w[t - i];
        }
    }

    let (_, reg_residuals) = linalg::least_squares(&x, &y)?;
    let mut residuals = vec![0.0; m];
    residuals.extend(reg_residuals.iter());
    Some(residuals)
}
