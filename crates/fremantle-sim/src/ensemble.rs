//! Simulated path ensembles and their summary statistics.

use ndarray::Array2;
use serde::Serialize;

use crate::metrics::quantile;

/// Full output of a Monte Carlo run.
///
/// Row `p` holds the portfolio value path of path `p`, column 0 is the
/// starting value 1.0, column `t` the value after `t` steps.
#[derive(Debug, Clone)]
pub struct SimulationEnsemble {
    values: Array2<f64>,
    seed: u64,
}

impl SimulationEnsemble {
    /// Wrap a `(paths × steps+1)` value matrix.
    pub fn new(values: Array2<f64>, seed: u64) -> Self {
        Self { values, seed }
    }

    /// The value matrix, one row per path.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Seed the run was generated with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of simulated paths.
    pub fn num_paths(&self) -> usize {
        self.values.nrows()
    }

    /// Number of time steps per path.
    pub fn horizon_steps(&self) -> usize {
        self.values.ncols().saturating_sub(1)
    }

    /// Terminal portfolio value of every path.
    pub fn terminal_values(&self) -> Vec<f64> {
        self.values
            .column(self.values.ncols() - 1)
            .iter()
            .copied()
            .collect()
    }

    /// Total return over the horizon of every path, relative to 1.0.
    pub fn terminal_returns(&self) -> Vec<f64> {
        self.terminal_values().into_iter().map(|v| v - 1.0).collect()
    }

    /// Maximum peak-to-trough decline of every path, as a fraction.
    pub fn max_drawdowns(&self) -> Vec<f64> {
        self.values
            .rows()
            .into_iter()
            .map(|path| {
                let mut peak = f64::MIN;
                let mut worst = 0.0f64;
                for &value in path.iter() {
                    peak = peak.max(value);
                    if peak > 0.0 {
                        worst = worst.max((peak - value) / peak);
                    }
                }
                worst
            })
            .collect()
    }

    /// Summarize the ensemble for reporting.
    pub fn summary(&self) -> EnsembleSummary {
        let mut terminals = self.terminal_values();
        terminals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mean_terminal = terminals.iter().sum::<f64>() / terminals.len().max(1) as f64;

        let drawdowns = self.max_drawdowns();
        let mean_max_drawdown = drawdowns.iter().sum::<f64>() / drawdowns.len().max(1) as f64;
        let worst_max_drawdown = drawdowns.iter().copied().fold(0.0, f64::max);

        EnsembleSummary {
            num_paths: self.num_paths(),
            horizon_steps: self.horizon_steps(),
            mean_terminal,
            terminal_p5: quantile(&terminals, 0.05),
            terminal_p25: quantile(&terminals, 0.25),
            terminal_p50: quantile(&terminals, 0.50),
            terminal_p75: quantile(&terminals, 0.75),
            terminal_p95: quantile(&terminals, 0.95),
            mean_max_drawdown,
            worst_max_drawdown,
        }
    }
}

/// Reporting summary of a simulated ensemble.
#[derive(Debug, Clone, Serialize)]
pub struct EnsembleSummary {
    /// Number of simulated paths.
    pub num_paths: usize,
    /// Steps per path.
    pub horizon_steps: usize,
    /// Mean terminal portfolio value.
    pub mean_terminal: f64,
    /// 5th percentile of terminal value.
    pub terminal_p5: f64,
    /// 25th percentile of terminal value.
    pub terminal_p25: f64,
    /// Median terminal value.
    pub terminal_p50: f64,
    /// 75th percentile of terminal value.
    pub terminal_p75: f64,
    /// 95th percentile of terminal value.
    pub terminal_p95: f64,
    /// Mean of per-path maximum drawdowns.
    pub mean_max_drawdown: f64,
    /// Largest drawdown across all paths.
    pub worst_max_drawdown: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_terminal_values_and_returns() {
        let ensemble =
            SimulationEnsemble::new(array![[1.0, 1.1, 1.21], [1.0, 0.9, 0.81]], 0);
        let terminals = ensemble.terminal_values();
        assert_abs_diff_eq!(terminals[0], 1.21, epsilon = 1e-12);
        assert_abs_diff_eq!(terminals[1], 0.81, epsilon = 1e-12);

        let returns = ensemble.terminal_returns();
        assert_abs_diff_eq!(returns[0], 0.21, epsilon = 1e-12);
        assert_abs_diff_eq!(returns[1], -0.19, epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown_known_path() {
        // Peak 1.2, trough 0.9 after the peak: drawdown 0.25.
        let ensemble = SimulationEnsemble::new(array![[1.0, 1.2, 0.9, 1.1]], 0);
        let drawdowns = ensemble.max_drawdowns();
        assert_abs_diff_eq!(drawdowns[0], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_monotone_path_has_zero_drawdown() {
        let ensemble = SimulationEnsemble::new(array![[1.0, 1.1, 1.2, 1.3]], 0);
        assert_abs_diff_eq!(ensemble.max_drawdowns()[0], 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_summary_percentiles_ordered() {
        let values = Array2::from_shape_fn((100, 2), |(p, t)| {
            if t == 0 { 1.0 } else { 0.5 + p as f64 * 0.01 }
        });
        let summary = SimulationEnsemble::new(values, 0).summary();
        assert!(summary.terminal_p5 <= summary.terminal_p25);
        assert!(summary.terminal_p25 <= summary.terminal_p50);
        assert!(summary.terminal_p50 <= summary.terminal_p75);
        assert!(summary.terminal_p75 <= summary.terminal_p95);
        assert_eq!(summary.num_paths, 100);
        assert_eq!(summary.horizon_steps, 1);
    }

    #[test]
    fn test_single_path_summary() {
        let summary = SimulationEnsemble::new(array![[1.0, 1.05]], 7).summary();
        assert_abs_diff_eq!(summary.mean_terminal, 1.05, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.terminal_p5, 1.05, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.terminal_p95, 1.05, epsilon = 1e-12);
    }
}
