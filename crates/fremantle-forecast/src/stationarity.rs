//! Augmented Dickey-Fuller stationarity test.
//!
//! Constant-only regression with a fixed augmentation lag of ⌊(n-1)^(1/3)⌋,
//! compared against the MacKinnon critical values for the no-trend case.

use ndarray::{Array1, Array2};

use crate::linalg;

/// Outcome of an augmented Dickey-Fuller test.
#[derive(Debug, Clone, Copy)]
pub struct AdfResult {
    /// The t-statistic on the lagged level coefficient.
    pub statistic: f64,
    /// Augmentation lag order used.
    pub lag: usize,
    /// Critical value the statistic was compared against.
    pub critical_value: f64,
    /// Whether the unit-root hypothesis was rejected.
    pub stationary: bool,
}

/// First difference of a series.
pub fn difference(series: &[f64]) -> Vec<f64> {
    series.windows(2).map(|w| w[1] - w[0]).collect()
}

/// MacKinnon critical value (constant, no trend) for a significance level.
///
/// Levels are bucketed to the tabulated 1%, 5%, and 10% values.
pub fn critical_value(significance: f64) -> f64 {
    if significance <= 0.025 {
        -3.43
    } else if significance <= 0.075 {
        -2.86
    } else {
        -2.57
    }
}

/// Run the ADF test at a significance level.
///
/// Returns `None` when the series is too short for the regression or the
/// regression is singular (a constant series, for instance).
pub fn adf_test(series: &[f64], significance: f64) -> Option<AdfResult> {
    let n = series.len();
    if n < 8 {
        return None;
    }

    let lag = ((n - 1) as f64).powf(1.0 / 3.0).floor() as usize;
    let dy = difference(series);
    let num_rows = dy.len().checked_sub(lag)?;
    let num_cols = 2 + lag;
    if num_rows < num_cols + 2 {
        return None;
    }

    // Δy_t = α + β·y_{t-1} + Σ γ_i·Δy_{t-i} + ε_t
    let mut x = Array2::<f64>::zeros((num_rows, num_cols));
    let mut y = Array1::<f64>::zeros(num_rows);
    for row in 0..num_rows {
        let t = row + lag;
        y[row] = dy[t];
        x[[row, 0]] = 1.0;
        x[[row, 1]] = series[t];
        for i in 1..=lag {
            x[[row, 1 + i]] = dy[t - i];
        }
    }

    let (beta, residuals) = linalg::least_squares(&x, &y)?;
    let dof = num_rows.checked_sub(num_cols)?;
    if dof == 0 {
        return None;
    }
    let sigma2 = residuals.iter().map(|r| r * r).sum::<f64>() / dof as f64;
    let variance = sigma2 * linalg::xtx_inverse_diagonal(&x, 1)?;
    if variance <= 0.0 {
        return None;
    }

    let statistic = beta[1] / variance.sqrt();
    let critical = critical_value(significance);
    Some(AdfResult {
        statistic,
        lag,
        critical_value: critical,
        stationary: statistic < critical,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_difference() {
        assert_eq!(difference(&[1.0, 3.0, 6.0, 10.0]), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_critical_value_buckets() {
        assert_abs_diff_eq!(critical_value(0.01), -3.43);
        assert_abs_diff_eq!(critical_value(0.05), -2.86);
        assert_abs_diff_eq!(critical_value(0.10), -2.57);
    }

    #[test]
    fn test_oscillating_series_is_stationary() {
        // Strongly mean-reverting: every value pulls back toward zero.
        let series: Vec<f64> = (0..200).map(|i| (i as f64 * 2.0).sin()).collect();
        let result = adf_test(&series, 0.05).unwrap();
        assert!(result.stationary, "statistic {}", result.statistic);
    }

    #[test]
    fn test_trending_series_is_not_stationary() {
        let series: Vec<f64> = (0..200)
            .map(|i| i as f64 + (i as f64 * 0.9).sin() * 0.5)
            .collect();
        let result = adf_test(&series, 0.05).unwrap();
        assert!(!result.stationary, "statistic {}", result.statistic);
    }

    #[test]
    fn test_short_series_rejected() {
        assert!(adf_test(&[1.0, 2.0, 3.0], 0.05).is_none());
    }

    #[test]
    fn test_constant_series_is_singular() {
        let series = vec![5.0; 100];
        assert!(adf_test(&series, 0.05).is_none());
    }
}
