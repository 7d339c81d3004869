//! Portfolio definitions: positions, markets, and weight invariants.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Tolerance on the sum of portfolio weights.
pub const WEIGHT_TOLERANCE: f64 = 1e-4;

/// Listing market for a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// United States listings.
    UnitedStates,

    /// Indonesia Stock Exchange listings.
    Jakarta,
}

impl Market {
    /// Returns the full market name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UnitedStates => "United States",
            Self::Jakarta => "Jakarta",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Market {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" | "UNITED STATES" | "NYSE" | "NASDAQ" => Ok(Self::UnitedStates),
            "JK" | "IDX" | "JAKARTA" => Ok(Self::Jakarta),
            other => Err(DataError::Parse(format!("unknown market: {other}"))),
        }
    }
}

/// A single portfolio position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Ticker symbol.
    pub ticker: String,

    /// Listing market.
    pub market: Market,

    /// Portfolio weight, in [0, 1].
    pub weight: f64,
}

impl Position {
    /// Create a new position.
    pub const fn new(ticker: String, market: Market, weight: f64) -> Self {
        Self {
            ticker,
            market,
            weight,
        }
    }
}

/// An ordered set of positions whose weights sum to one.
///
/// Invariants enforced at construction:
/// - every weight is non-negative and finite,
/// - weights sum to 1 within [`WEIGHT_TOLERANCE`],
/// - tickers are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    positions: Vec<Position>,
}

impl Portfolio {
    /// Create a portfolio, validating the weight invariants.
    pub fn new(positions: Vec<Position>) -> Result<Self> {
        if positions.is_empty() {
            return Err(DataError::InvalidPortfolio("no positions".to_string()));
        }

        for pos in &positions {
            if !pos.weight.is_finite() || pos.weight < 0.0 {
                return Err(DataError::InvalidPortfolio(format!(
                    "weight for {} must be a non-negative finite number, got {}",
                    pos.ticker, pos.weight
                )));
            }
        }

        let total: f64 = positions.iter().map(|p| p.weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(DataError::InvalidPortfolio(format!(
                "weights sum to {total}, expected 1.0"
            )));
        }

        for (i, pos) in positions.iter().enumerate() {
            if positions[..i].iter().any(|p| p.ticker == pos.ticker) {
                return Err(DataError::InvalidPortfolio(format!(
                    "duplicate ticker: {}",
                    pos.ticker
                )));
            }
        }

        Ok(Self { positions })
    }

    /// Create a portfolio from raw weights, rescaling them to sum to one.
    ///
    /// Rejects portfolios whose total weight is zero or non-finite.
    pub fn normalized(mut positions: Vec<Position>) -> Result<Self> {
        let total: f64 = positions.iter().map(|p| p.weight).sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(DataError::InvalidPortfolio(format!(
                "total weight {total} cannot be normalized"
            )));
        }
        for pos in &mut positions {
            pos.weight /= total;
        }
        Self::new(positions)
    }

    /// Positions in portfolio order.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Tickers in portfolio order.
    pub fn tickers(&self) -> Vec<&str> {
        self.positions.iter().map(|p| p.ticker.as_str()).collect()
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the portfolio has no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Weight for a ticker, if present.
    pub fn weight_of(&self, ticker: &str) -> Option<f64> {
        self.positions
            .iter()
            .find(|p| p.ticker == ticker)
            .map(|p| p.weight)
    }

    /// Restrict the portfolio to the given tickers and re-normalize weights.
    ///
    /// Used when some positions lack historical coverage. Fails when no
    /// position survives.
    pub fn restricted_to(&self, tickers: &[&str]) -> Result<Self> {
        let kept: Vec<Position> = self
            .positions
            .iter()
            .filter(|p| tickers.contains(&p.ticker.as_str()))
            .cloned()
            .collect();
        if kept.is_empty() {
            return Err(DataError::InvalidPortfolio(
                "no position has historical coverage".to_string(),
            ));
        }
        Self::normalized(kept)
    }
}

#[derive(Debug, Deserialize)]
struct PortfolioRecord {
    ticker: String,
    market: String,
    weight: f64,
}

/// Load a portfolio from a CSV file with columns `ticker,market,weight`.
///
/// Weights are normalized to sum to one, matching the tolerance-and-rescale
/// behavior applied to uploaded portfolios.
pub fn load_portfolio_csv<P: AsRef<Path>>(path: P) -> Result<Portfolio> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut positions = Vec::new();
    for record in reader.deserialize() {
        let record: PortfolioRecord = record?;
        let market = Market::from_str(&record.market)?;
        positions.push(Position::new(record.ticker, market, record.weight));
    }
    Portfolio::normalized(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn position(ticker: &str, weight: f64) -> Position {
        Position::new(ticker.to_string(), Market::UnitedStates, weight)
    }

    #[test]
    fn test_valid_portfolio() {
        let portfolio =
            Portfolio::new(vec![position("AAPL", 0.6), position("JPM", 0.4)]).unwrap();
        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio.tickers(), vec!["AAPL", "JPM"]);
        assert_relative_eq!(portfolio.weight_of("AAPL").unwrap(), 0.6);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let err = Portfolio::new(vec![position("AAPL", 0.6), position("JPM", 0.3)]);
        assert!(matches!(err, Err(DataError::InvalidPortfolio(_))));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = Portfolio::new(vec![position("AAPL", 1.2), position("JPM", -0.2)]);
        assert!(matches!(err, Err(DataError::InvalidPortfolio(_))));
    }

    #[test]
    fn test_duplicate_ticker_rejected() {
        let err = Portfolio::new(vec![position("AAPL", 0.5), position("AAPL", 0.5)]);
        assert!(matches!(err, Err(DataError::InvalidPortfolio(_))));
    }

    #[test]
    fn test_normalized_rescales() {
        let portfolio =
            Portfolio::normalized(vec![position("AAPL", 2.0), position("JPM", 2.0)]).unwrap();
        assert_relative_eq!(portfolio.weight_of("AAPL").unwrap(), 0.5);
        assert_relative_eq!(portfolio.weight_of("JPM").unwrap(), 0.5);
    }

    #[test]
    fn test_normalized_zero_total_rejected() {
        let err = Portfolio::normalized(vec![position("AAPL", 0.0)]);
        assert!(matches!(err, Err(DataError::InvalidPortfolio(_))));
    }

    #[test]
    fn test_restricted_to_renormalizes() {
        let portfolio = Portfolio::new(vec![
            position("AAPL", 0.5),
            position("JPM", 0.3),
            position("XOM", 0.2),
        ])
        .unwrap();

        let restricted = portfolio.restricted_to(&["AAPL", "JPM"]).unwrap();
        assert_eq!(restricted.len(), 2);
        assert_relative_eq!(restricted.weight_of("AAPL").unwrap(), 0.625);
        assert_relative_eq!(restricted.weight_of("JPM").unwrap(), 0.375);
    }

    #[test]
    fn test_restricted_to_empty_fails() {
        let portfolio = Portfolio::new(vec![position("AAPL", 1.0)]).unwrap();
        assert!(portfolio.restricted_to(&["MSFT"]).is_err());
    }

    #[test]
    fn test_market_parsing() {
        assert_eq!(Market::from_str("US").unwrap(), Market::UnitedStates);
        assert_eq!(Market::from_str("jakarta").unwrap(), Market::Jakarta);
        assert_eq!(Market::from_str("IDX").unwrap(), Market::Jakarta);
        assert!(Market::from_str("LSE").is_err());
    }
}
