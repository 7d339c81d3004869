//! Empirical Value-at-Risk and Expected Shortfall.

use serde::Serialize;

use crate::error::{Result, SimError};

/// Empirical quantile with linear interpolation between order statistics.
///
/// `sorted` must be ascending. The quantile index is `h = (n-1)·q`,
/// interpolated between `⌊h⌋` and `⌈h⌉`. Returns NaN on an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let h = (n - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

/// Tail risk metrics at the two standard confidence levels.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RiskMetrics {
    /// Value-at-Risk at 95% confidence, as a non-negative loss fraction.
    pub var_95: f64,
    /// Value-at-Risk at 99% confidence.
    pub var_99: f64,
    /// Expected Shortfall at 95% confidence.
    pub es_95: f64,
    /// Expected Shortfall at 99% confidence.
    pub es_99: f64,
}

/// Computes VaR and ES from a sample of returns.
#[derive(Debug, Clone)]
pub struct RiskMetricsCalculator {
    lower_confidence: f64,
    upper_confidence: f64,
}

impl Default for RiskMetricsCalculator {
    fn default() -> Self {
        Self {
            lower_confidence: 0.95,
            upper_confidence: 0.99,
        }
    }
}

impl RiskMetricsCalculator {
    /// Calculator with explicit confidence levels, ordered ascending.
    pub fn new(lower_confidence: f64, upper_confidence: f64) -> Result<Self> {
        for level in [lower_confidence, upper_confidence] {
            if !(0.0..1.0).contains(&level) || level <= 0.5 {
                return Err(SimError::InvalidConfig(format!(
                    "confidence level {level} outside (0.5, 1)"
                )));
            }
        }
        if lower_confidence > upper_confidence {
            return Err(SimError::InvalidConfig(
                "confidence levels must be ascending".to_string(),
            ));
        }
        Ok(Self {
            lower_confidence,
            upper_confidence,
        })
    }

    /// Compute metrics from a raw return sample.
    ///
    /// Accepts ensemble terminal returns or any other return slice. Fails
    /// with [`SimError::EmptySample`] on empty input.
    pub fn compute(&self, returns: &[f64]) -> Result<RiskMetrics> {
        if returns.is_empty() {
            return Err(SimError::EmptySample);
        }

        let mut sorted = returns.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let (var_95, es_95) = var_es(&sorted, self.lower_confidence);
        let (var_99, es_99) = var_es(&sorted, self.upper_confidence);

        Ok(RiskMetrics {
            var_95,
            var_99,
            es_95,
            es_99,
        })
    }
}

/// VaR and ES at one confidence level from an ascending return sample.
///
/// `VaR(c) = max(0, -quantile(returns, 1-c))`, reported as a non-negative
/// loss. `ES(c)` is the mean of losses strictly exceeding VaR; an empty tail
/// collapses ES to VaR, and ES is never allowed below VaR.
pub fn var_es(sorted_returns: &[f64], confidence: f64) -> (f64, f64) {
    let var = (-quantile(sorted_returns, 1.0 - confidence)).max(0.0);

    let mut tail_sum = 0.0;
    let mut tail_count = 0usize;
    for &r in sorted_returns {
        let loss = -r;
        if loss > var {
            tail_sum += loss;
            tail_count += 1;
        }
    }

    let es = if tail_count == 0 {
        var
    } else {
        (tail_sum / tail_count as f64).max(var)
    };
    (var, es)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(0.25, 1.75)]
    #[case(0.5, 2.5)]
    #[case(1.0, 4.0)]
    fn test_quantile_linear_interpolation(#[case] q: f64, #[case] expected: f64) {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(quantile(&sorted, q), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_quantile_single_element() {
        assert_abs_diff_eq!(quantile(&[3.5], 0.9), 3.5, epsilon = 1e-15);
    }

    #[test]
    fn test_quantile_empty_is_nan() {
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_var_es_known_sample() {
        // quantile at 0.05 of the sorted sample is -0.09, so VaR = 0.09 and
        // the only strictly larger loss is 0.10.
        let sorted = [-0.10, -0.05, 0.0, 0.05, 0.10];
        let (var, es) = var_es(&sorted, 0.95);
        assert_abs_diff_eq!(var, 0.09, epsilon = 1e-12);
        assert_abs_diff_eq!(es, 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_var_clamped_non_negative() {
        // All returns positive: the 5% quantile is a gain, VaR clamps to 0
        // and the loss tail is empty.
        let sorted = [0.01, 0.02, 0.03, 0.04, 0.05];
        let (var, es) = var_es(&sorted, 0.95);
        assert_abs_diff_eq!(var, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(es, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_es_equals_var_on_degenerate_sample() {
        let sorted = [-0.05; 10];
        let (var, es) = var_es(&sorted, 0.95);
        assert_abs_diff_eq!(var, 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(es, var, epsilon = 1e-12);
    }

    #[test]
    fn test_var_monotone_in_confidence() {
        let returns: Vec<f64> = (0..500)
            .map(|i| ((i as f64 * 0.7).sin()) * 0.05)
            .collect();
        let metrics = RiskMetricsCalculator::default().compute(&returns).unwrap();
        assert!(metrics.var_99 >= metrics.var_95);
        assert!(metrics.es_95 >= metrics.var_95);
        assert!(metrics.es_99 >= metrics.var_99);
    }

    #[test]
    fn test_empty_sample_rejected() {
        let err = RiskMetricsCalculator::default().compute(&[]).unwrap_err();
        assert!(matches!(err, SimError::EmptySample));
    }

    #[rstest]
    #[case(0.5, 0.99)]
    #[case(0.95, 1.0)]
    #[case(0.99, 0.95)]
    fn test_invalid_confidence_rejected(#[case] lower: f64, #[case] upper: f64) {
        assert!(RiskMetricsCalculator::new(lower, upper).is_err());
    }
}
