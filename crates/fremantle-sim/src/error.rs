//! Error types for simulation and risk metrics.

use thiserror::Error;

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can occur during simulation and metric computation.
#[derive(Debug, Error)]
pub enum SimError {
    /// The covariance matrix could not be factorized at all.
    #[error("Singular covariance: no usable factorization")]
    SingularCovariance,

    /// The simulation configuration is structurally invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A sample was required but none was provided.
    #[error("Empty sample: no returns to compute metrics from")]
    EmptySample,

    /// The run was cancelled cooperatively before completion.
    #[error("Simulation cancelled")]
    Cancelled,

    /// An underlying model operation failed.
    #[error(transparent)]
    Model(#[from] fremantle_model::ModelError),
}
