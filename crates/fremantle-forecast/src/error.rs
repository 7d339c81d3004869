//! Error types for forecasting.

use thiserror::Error;

/// Result type for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur during model fitting and forecasting.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The series is too short for the configured model grid.
    #[error("Insufficient history: need at least {required} observations, got {actual}")]
    InsufficientHistory {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// No candidate in the order grid produced a usable fit.
    #[error("Non-convergent: every candidate model failed to fit")]
    NonConvergent,
}
