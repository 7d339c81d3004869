//! Historical price series and cross-asset alignment.
//!
//! Assets listed on different markets trade on different calendars, so the
//! per-asset series rarely share an exact date axis. Alignment makes the
//! policy explicit instead of silently mixing calendars: either drop dates
//! that are not present for every asset, or forward-fill each asset over the
//! union of observed dates inside the common window.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Calendar gaps longer than this many days are flagged by [`AssetSeries::gap_report`].
/// A long weekend plus a holiday is still ordinary; anything beyond it is not.
pub const GAP_FLAG_DAYS: i64 = 5;

/// A single dated price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date.
    pub date: NaiveDate,

    /// Closing price, strictly positive.
    pub price: f64,
}

/// A flagged gap in a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataGap {
    /// Last observation before the gap.
    pub from: NaiveDate,

    /// First observation after the gap.
    pub to: NaiveDate,

    /// Calendar days between the two observations.
    pub calendar_days: i64,
}

/// Policy for reconciling differing trading calendars during alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingValuePolicy {
    /// Carry the last observed price forward onto dates the asset did not trade.
    #[default]
    ForwardFill,

    /// Keep only dates on which every asset traded.
    Drop,
}

/// Historical price series for one asset, sorted ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSeries {
    /// Ticker symbol.
    pub ticker: String,

    points: Vec<PricePoint>,
}

impl AssetSeries {
    /// Create a series, validating ordering and prices.
    ///
    /// Dates must be strictly ascending; prices must be finite and positive
    /// (log-returns are undefined otherwise).
    pub fn new(ticker: String, points: Vec<PricePoint>) -> Result<Self> {
        for (i, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(DataError::Parse(format!(
                    "{ticker}: non-positive price {} on {}",
                    point.price, point.date
                )));
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(DataError::UnsortedSeries {
                    ticker,
                    detail: format!(
                        "{} does not follow {}",
                        point.date,
                        points[i - 1].date
                    ),
                });
            }
        }
        Ok(Self { ticker, points })
    }

    /// Observations in date order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First observation date, if any.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// Last observation date, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Calendar gaps longer than [`GAP_FLAG_DAYS`].
    ///
    /// Gaps are tolerated (alignment handles them per policy) but reported so
    /// the caller can surface data-quality warnings.
    pub fn gap_report(&self) -> Vec<DataGap> {
        self.points
            .windows(2)
            .filter_map(|w| {
                let days = (w[1].date - w[0].date).num_days();
                (days > GAP_FLAG_DAYS).then_some(DataGap {
                    from: w[0].date,
                    to: w[1].date,
                    calendar_days: days,
                })
            })
            .collect()
    }

    /// Price on the latest observation at or before `date`, if any.
    fn price_at_or_before(&self, date: NaiveDate) -> Option<f64> {
        match self.points.partition_point(|p| p.date <= date) {
            0 => None,
            idx => Some(self.points[idx - 1].price),
        }
    }
}

/// Price matrix over a shared date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPrices {
    /// Tickers, one per matrix column.
    pub tickers: Vec<String>,

    /// Shared date axis, one per matrix row.
    pub dates: Vec<NaiveDate>,

    /// Prices, shape (dates × tickers).
    pub prices: Array2<f64>,
}

impl AlignedPrices {
    /// Number of aligned observations.
    pub fn num_observations(&self) -> usize {
        self.dates.len()
    }

    /// Number of assets.
    pub fn num_assets(&self) -> usize {
        self.tickers.len()
    }
}

/// Align several series onto a shared date axis under an explicit policy.
///
/// The axis is restricted to the common window: from the latest first
/// observation to the earliest last observation across assets. Fails with
/// `InsufficientData` when fewer than two shared observations remain (no
/// return can be computed from fewer).
pub fn align(series: &[AssetSeries], policy: MissingValuePolicy) -> Result<AlignedPrices> {
    if series.is_empty() {
        return Err(DataError::InsufficientData {
            required: 2,
            actual: 0,
        });
    }
    for s in series {
        if s.is_empty() {
            return Err(DataError::MissingData {
                ticker: s.ticker.clone(),
                reason: "empty price series".to_string(),
            });
        }
    }

    let window_start = series.iter().filter_map(AssetSeries::first_date).max();
    let window_end = series.iter().filter_map(AssetSeries::last_date).min();
    let (window_start, window_end) = match (window_start, window_end) {
        (Some(start), Some(end)) if start <= end => (start, end),
        _ => {
            return Err(DataError::InsufficientData {
                required: 2,
                actual: 0,
            });
        }
    };

    let dates: Vec<NaiveDate> = match policy {
        MissingValuePolicy::ForwardFill => {
            // Union of observed dates inside the common window.
            let mut axis = BTreeSet::new();
            for s in series {
                axis.extend(
                    s.points()
                        .iter()
                        .map(|p| p.date)
                        .filter(|d| (window_start..=window_end).contains(d)),
                );
            }
            axis.into_iter().collect()
        }
        MissingValuePolicy::Drop => {
            // Intersection: keep dates every asset traded on.
            let mut axis: BTreeSet<NaiveDate> = series[0]
                .points()
                .iter()
                .map(|p| p.date)
                .filter(|d| (window_start..=window_end).contains(d))
                .collect();
            for s in &series[1..] {
                let own: BTreeSet<NaiveDate> = s.points().iter().map(|p| p.date).collect();
                axis.retain(|d| own.contains(d));
            }
            axis.into_iter().collect()
        }
    };

    if dates.len() < 2 {
        return Err(DataError::InsufficientData {
            required: 2,
            actual: dates.len(),
        });
    }

    let mut prices = Array2::<f64>::zeros((dates.len(), series.len()));
    for (col, s) in series.iter().enumerate() {
        for (row, &date) in dates.iter().enumerate() {
            // The window starts at the latest first observation, so a
            // carry-forward value always exists.
            let price = s.price_at_or_before(date).ok_or_else(|| {
                DataError::MissingData {
                    ticker: s.ticker.clone(),
                    reason: format!("no observation at or before {date}"),
                }
            })?;
            prices[[row, col]] = price;
        }
    }

    Ok(AlignedPrices {
        tickers: series.iter().map(|s| s.ticker.clone()).collect(),
        dates,
        prices,
    })
}
