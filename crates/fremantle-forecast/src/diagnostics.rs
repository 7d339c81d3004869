//! Residual diagnostics.

/// Chi-square 95th percentile for 1 to 10 degrees of freedom.
const CHI2_95: [f64; 10] = [
    3.841, 5.991, 7.815, 9.488, 11.070, 12.592, 14.067, 15.507, 16.919, 18.307,
];

/// Outcome of a Ljung-Box whiteness test on fit residuals.
#[derive(Debug, Clone, Copy)]
pub struct LjungBoxResult {
    /// The Q statistic.
    pub statistic: f64,
    /// Number of autocorrelation lags tested.
    pub lags: usize,
    /// Whether the residuals look white at the 5% level.
    pub passed: bool,
}

/// Ljung-Box test for residual autocorrelation.
///
/// `Q = n(n+2) Σ ρ̂²_k / (n-k)` over `lags` autocorrelations, compared to the
/// chi-square 95th percentile. A failed test flags a questionable fit but is
/// never treated as a hard error. Returns `None` when the residual sample is
/// too short to test.
pub fn ljung_box(residuals: &[f64], lags: usize) -> Option<LjungBoxResult> {
    let n = residuals.len();
    if n < 3 || lags == 0 || lags >= n {
        return None;
    }
    let lags = lags.min(CHI2_95.len());

    let mean = residuals.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = residuals.iter().map(|r| r - mean).collect();
    let denom: f64 = centered.iter().map(|r| r * r).sum();
    if denom <= 0.0 {
        return None;
    }

    let mut statistic = 0.0;
    for k in 1..=lags {
        let autocov: f64 = centered[k..]
            .iter()
            .zip(&centered[..n - k])
            .map(|(a, b)| a * b)
            .sum();
        let rho = autocov / denom;
        statistic += rho * rho / (n - k) as f64;
    }
    statistic *= n as f64 * (n as f64 + 2.0);

    Some(LjungBoxResult {
        statistic,
        lags,
        passed: statistic <= CHI2_95[lags - 1],
    })
}

/// Default Ljung-Box lag count for a residual sample: `min(10, n/5)`.
pub fn default_lags(n: usize) -> usize {
    (n / 5).clamp(1, 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_residuals_fail() {
        // Perfect negative lag-1 autocorrelation is as non-white as it gets.
        let residuals: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let result = ljung_box(&residuals, default_lags(residuals.len())).unwrap();
        assert!(!result.passed, "Q = {}", result.statistic);
    }

    #[test]
    fn test_uncorrelated_residuals_pass() {
        // Deterministic low-autocorrelation sequence via an irrational rotation.
        let residuals: Vec<f64> = (0..200)
            .map(|i| ((i as f64 * 2.399963).sin() * 43758.5453).fract() - 0.5)
            .collect();
        let result = ljung_box(&residuals, default_lags(residuals.len())).unwrap();
        assert!(result.passed, "Q = {}", result.statistic);
    }

    #[test]
    fn test_short_sample_untestable() {
        assert!(ljung_box(&[0.1, -0.1], 1).is_none());
    }

    #[test]
    fn test_zero_variance_untestable() {
        assert!(ljung_box(&[0.5; 50], 5).is_none());
    }

    #[test]
    fn test_default_lags_bounds() {
        assert_eq!(default_lags(12), 2);
        assert_eq!(default_lags(500), 10);
        assert_eq!(default_lags(4), 1);
    }
}
