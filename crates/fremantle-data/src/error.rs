//! Error types for portfolio and price-series inputs.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while building or validating inputs.
#[derive(Debug, Error)]
pub enum DataError {
    /// Portfolio violates a structural invariant.
    #[error("Invalid portfolio: {0}")]
    InvalidPortfolio(String),

    /// No historical series is available for a ticker.
    #[error("Missing data for {ticker}: {reason}")]
    MissingData {
        /// Ticker that was queried.
        ticker: String,
        /// Reason for missing data.
        reason: String,
    },

    /// Price series violates the ascending-date invariant.
    #[error("Unsorted series for {ticker}: {detail}")]
    UnsortedSeries {
        /// Ticker whose series is malformed.
        ticker: String,
        /// Offending observation.
        detail: String,
    },

    /// Too few overlapping observations across the portfolio assets.
    #[error("Insufficient data: need at least {required} aligned observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Data parsing error.
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
