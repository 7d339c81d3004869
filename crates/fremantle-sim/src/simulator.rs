//! Monte Carlo simulation of correlated portfolio value paths.

use ndarray::{Array1, Array2};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

use fremantle_model::ReturnDistributionParams;
use fremantle_model::matrix;

use crate::ensemble::SimulationEnsemble;
use crate::error::{Result, SimError};
use crate::rng::PathRng;

/// Configuration for a Monte Carlo run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of independent paths to simulate.
    pub num_paths: usize,
    /// Number of time steps per path.
    pub horizon_steps: usize,
    /// Run seed; fixes the full ensemble regardless of thread count.
    pub seed: u64,
    /// Simulate paths across threads. Output is identical either way.
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_paths: 1_000,
            horizon_steps: 252,
            seed: 42,
            parallel: true,
        }
    }
}

/// Simulates portfolio value paths from a return distribution.
///
/// Each path draws correlated per-step log-returns `r = μ + L·z` with `z`
/// standard normal and `L` from the covariance factorization, compounds them
/// per asset, and combines the assets with static weights into a portfolio
/// value path starting at 1.0.
#[derive(Debug, Clone)]
pub struct MonteCarloSimulator {
    config: SimulationConfig,
}

impl MonteCarloSimulator {
    /// Simulator with a validated configuration.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        if config.num_paths == 0 {
            return Err(SimError::InvalidConfig(
                "num_paths must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate the full ensemble.
    pub fn simulate(
        &self,
        params: &ReturnDistributionParams,
        weights: &Array1<f64>,
    ) -> Result<SimulationEnsemble> {
        self.simulate_cancellable(params, weights, None)
    }

    /// Simulate with a cooperative cancellation flag.
    ///
    /// The flag is checked once per path; a set flag aborts the run with
    /// [`SimError::Cancelled`].
    pub fn simulate_cancellable(
        &self,
        params: &ReturnDistributionParams,
        weights: &Array1<f64>,
        cancel: Option<&AtomicBool>,
    ) -> Result<SimulationEnsemble> {
        let n = params.num_assets();
        if weights.len() != n {
            return Err(SimError::InvalidConfig(format!(
                "weight vector has {} entries for {} assets",
                weights.len(),
                n
            )));
        }
        if !weights.iter().all(|w| w.is_finite() && *w >= 0.0) {
            return Err(SimError::InvalidConfig(
                "weights must be finite and non-negative".to_string(),
            ));
        }

        let transform = matrix::correlated_transform(&params.covariance)?;
        if transform.iter().any(|v| !v.is_finite()) {
            return Err(SimError::SingularCovariance);
        }

        let simulate_one = |path_index: usize| -> Result<Vec<f64>> {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(SimError::Cancelled);
                }
            }
            Ok(self.simulate_path(params, weights, &transform, path_index))
        };

        let rows: Vec<Vec<f64>> = if self.config.parallel {
            (0..self.config.num_paths)
                .into_par_iter()
                .map(simulate_one)
                .collect::<Result<_>>()?
        } else {
            (0..self.config.num_paths)
                .map(simulate_one)
                .collect::<Result<_>>()?
        };

        let mut values = Array2::zeros((self.config.num_paths, self.config.horizon_steps + 1));
        for (p, row) in rows.into_iter().enumerate() {
            values.row_mut(p).assign(&Array1::from(row));
        }

        Ok(SimulationEnsemble::new(values, self.config.seed))
    }

    fn simulate_path(
        &self,
        params: &ReturnDistributionParams,
        weights: &Array1<f64>,
        transform: &Array2<f64>,
        path_index: usize,
    ) -> Vec<f64> {
        let n = params.num_assets();
        let steps = self.config.horizon_steps;

        let mut rng = PathRng::for_path(self.config.seed, path_index as u64);
        let mut draws = vec![0.0; n];
        let mut cumulative_log = vec![0.0; n];

        let mut path = Vec::with_capacity(steps + 1);
        path.push(1.0);

        for _ in 0..steps {
            rng.fill_normal(&mut draws);
            for i in 0..n {
                let mut step_return = params.mean[i];
                for j in 0..n {
                    step_return += transform[[i, j]] * draws[j];
                }
                cumulative_log[i] += step_return;
            }
            let value = weights
                .iter()
                .zip(&cumulative_log)
                .map(|(w, log)| w * log.exp())
                .sum();
            path.push(value);
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::sync::atomic::AtomicBool;

    fn params_2() -> ReturnDistributionParams {
        ReturnDistributionParams {
            tickers: vec!["A".into(), "B".into()],
            mean: array![0.0005, 0.0002],
            covariance: array![[4.0e-4, 1.0e-4], [1.0e-4, 2.5e-4]],
        }
    }

    fn simulator(num_paths: usize, steps: usize, parallel: bool) -> MonteCarloSimulator {
        MonteCarloSimulator::new(SimulationConfig {
            num_paths,
            horizon_steps: steps,
            seed: 42,
            parallel,
        })
        .unwrap()
    }

    #[test]
    fn test_paths_start_at_one() {
        let ensemble = simulator(10, 5, false)
            .simulate(&params_2(), &array![0.6, 0.4])
            .unwrap();
        for path in ensemble.values().rows() {
            assert_abs_diff_eq!(path[0], 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_same_seed_identical_ensembles() {
        let weights = array![0.6, 0.4];
        let a = simulator(50, 10, false).simulate(&params_2(), &weights).unwrap();
        let b = simulator(50, 10, false).simulate(&params_2(), &weights).unwrap();
        assert_eq!(
            a.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            b.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_parallel_matches_sequential_bitwise() {
        let weights = array![0.6, 0.4];
        let seq = simulator(64, 10, false).simulate(&params_2(), &weights).unwrap();
        let par = simulator(64, 10, true).simulate(&params_2(), &weights).unwrap();
        assert_eq!(
            seq.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            par.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_single_path_zero_horizon() {
        let ensemble = simulator(1, 0, false)
            .simulate(&params_2(), &array![0.6, 0.4])
            .unwrap();
        assert_eq!(ensemble.num_paths(), 1);
        assert_eq!(ensemble.horizon_steps(), 0);
        assert_abs_diff_eq!(ensemble.values()[[0, 0]], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_zero_variance_is_deterministic_drift() {
        let params = ReturnDistributionParams {
            tickers: vec!["A".into(), "B".into()],
            mean: array![0.001, 0.002],
            covariance: array![[0.0, 0.0], [0.0, 0.0]],
        };
        let weights = array![0.5, 0.5];
        let ensemble = simulator(3, 10, false).simulate(&params, &weights).unwrap();
        let expected = 0.5 * (10.0 * 0.001f64).exp() + 0.5 * (10.0 * 0.002f64).exp();
        for path in ensemble.values().rows() {
            assert_abs_diff_eq!(path[10], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_one_degenerate_asset_among_live_ones() {
        let params = ReturnDistributionParams {
            tickers: vec!["A".into(), "B".into()],
            mean: array![0.0005, 0.0],
            covariance: array![[4.0e-4, 0.0], [0.0, 0.0]],
        };
        let ensemble = simulator(10, 5, false)
            .simulate(&params, &array![0.5, 0.5])
            .unwrap();
        assert!(ensemble.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_weight_length_mismatch_rejected() {
        let err = simulator(10, 5, false)
            .simulate(&params_2(), &array![1.0])
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_paths_rejected() {
        let err = MonteCarloSimulator::new(SimulationConfig {
            num_paths: 0,
            ..SimulationConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_cancellation_aborts_run() {
        let cancel = AtomicBool::new(true);
        let err = simulator(100, 10, false)
            .simulate_cancellable(&params_2(), &array![0.6, 0.4], Some(&cancel))
            .unwrap_err();
        assert!(matches!(err, SimError::Cancelled));
    }

    #[test]
    fn test_mean_terminal_close_to_analytic() {
        // Lognormal expectation: E[V_T] = Σ wᵢ·exp(T·(μᵢ + σᵢ²/2)).
        let params = params_2();
        let weights = array![0.6, 0.4];
        let steps = 20.0;
        let expected: f64 = [0.6, 0.4]
            .iter()
            .zip(0..2)
            .map(|(w, i)| {
                w * (steps * (params.mean[i] + params.covariance[[i, i]] / 2.0)).exp()
            })
            .sum();

        let ensemble = simulator(20_000, 20, true).simulate(&params, &weights).unwrap();
        let mean_terminal = ensemble.terminal_values().iter().sum::<f64>()
            / ensemble.num_paths() as f64;
        assert!(
            (mean_terminal - expected).abs() / expected < 0.01,
            "mean terminal {mean_terminal}, analytic {expected}"
        );
    }
}
