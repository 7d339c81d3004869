//! Error types for model estimation and scenario adjustment.

use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur during model estimation and adjustment.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Insufficient overlapping observations for estimation.
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Matrix dimensions are inconsistent.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Covariance is unrecoverable, which only happens with zero assets.
    #[error("Singular covariance: no assets with historical coverage")]
    SingularCovariance,

    /// Scenario identifier does not name a known scenario.
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    /// Sector label does not name a known sector.
    #[error("Invalid sector: {0}")]
    InvalidSector(String),
}
