//! Return-distribution estimation from aligned historical prices.

use fremantle_data::AlignedPrices;
use ndarray::{Array1, Array2, Axis};

use crate::error::{ModelError, Result};
use crate::matrix::{self, EIGENVALUE_FLOOR};

/// Estimated per-step log-return distribution for a set of assets.
#[derive(Debug, Clone)]
pub struct ReturnDistributionParams {
    /// Asset tickers, in the order used by `mean` and `covariance`.
    pub tickers: Vec<String>,
    /// Mean log-return per step, one entry per asset.
    pub mean: Array1<f64>,
    /// Covariance of log-returns per step, positive semi-definite.
    pub covariance: Array2<f64>,
}

impl ReturnDistributionParams {
    /// Number of assets in the model.
    pub fn num_assets(&self) -> usize {
        self.tickers.len()
    }

    /// Per-asset log-return standard deviation.
    pub fn volatilities(&self) -> Array1<f64> {
        Array1::from_iter((0..self.num_assets()).map(|i| self.covariance[[i, i]].max(0.0).sqrt()))
    }
}

/// Configuration for [`ReturnModelEstimator`].
#[derive(Debug, Clone)]
pub struct ReturnModelConfig {
    /// Floor applied when clipping eigenvalues during repair.
    pub eigenvalue_floor: f64,
    /// Minimum return observations regardless of asset count.
    pub min_observations: usize,
}

impl Default for ReturnModelConfig {
    fn default() -> Self {
        Self {
            eigenvalue_floor: EIGENVALUE_FLOOR,
            min_observations: 2,
        }
    }
}

/// Estimates the joint log-return distribution of a portfolio's assets.
#[derive(Debug, Clone, Default)]
pub struct ReturnModelEstimator {
    config: ReturnModelConfig,
}

impl ReturnModelEstimator {
    /// Estimator with explicit configuration.
    pub fn new(config: ReturnModelConfig) -> Self {
        Self { config }
    }

    /// Estimate mean and covariance from aligned prices.
    ///
    /// Fails with `InsufficientData` when the number of overlapping return
    /// observations is below `max(min_observations, assets + 1)`. The
    /// returned covariance is symmetric and repaired to the positive
    /// semi-definite cone.
    pub fn estimate(&self, prices: &AlignedPrices) -> Result<ReturnDistributionParams> {
        let returns = log_returns(&prices.prices);
        self.estimate_from_returns(prices.tickers.clone(), &returns)
    }

    /// Estimate directly from a `(observations × assets)` log-return matrix.
    pub fn estimate_from_returns(
        &self,
        tickers: Vec<String>,
        returns: &Array2<f64>,
    ) -> Result<ReturnDistributionParams> {
        let n_assets = tickers.len();
        if n_assets == 0 {
            return Err(ModelError::SingularCovariance);
        }
        if returns.ncols() != n_assets {
            return Err(ModelError::DimensionMismatch {
                expected: n_assets,
                actual: returns.ncols(),
            });
        }

        let n_obs = returns.nrows();
        let required = self.config.min_observations.max(n_assets + 1);
        if n_obs < required {
            return Err(ModelError::InsufficientData {
                required,
                actual: n_obs,
            });
        }

        let mean = returns.mean_axis(Axis(0)).ok_or(ModelError::InsufficientData {
            required,
            actual: 0,
        })?;

        let mut covariance = Array2::<f64>::zeros((n_assets, n_assets));
        let scale = 1.0 / n_obs as f64;
        for row in returns.rows() {
            for i in 0..n_assets {
                let di = row[i] - mean[i];
                for j in i..n_assets {
                    covariance[[i, j]] += di * (row[j] - mean[j]) * scale;
                }
            }
        }
        for i in 0..n_assets {
            for j in 0..i {
                covariance[[i, j]] = covariance[[j, i]];
            }
        }

        let covariance = matrix::clip_to_psd(&covariance, self.config.eigenvalue_floor)?;

        Ok(ReturnDistributionParams {
            tickers,
            mean,
            covariance,
        })
    }
}

/// Per-asset log-returns of a `(dates × assets)` price matrix.
///
/// Output has one fewer row than the input. Prices are validated positive
/// upstream, so the logarithm is always finite here.
pub fn log_returns(prices: &Array2<f64>) -> Array2<f64> {
    let (t, n) = prices.dim();
    if t < 2 {
        return Array2::zeros((0, n));
    }

    let mut returns = Array2::<f64>::zeros((t - 1, n));
    for row in 0..(t - 1) {
        for col in 0..n {
            returns[[row, col]] = (prices[[row + 1, col]] / prices[[row, col]]).ln();
        }
    }
    returns
}
