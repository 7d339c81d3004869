//! Historical-series providers.
//!
//! The engine core depends only on the [`HistoricalSeriesProvider`]
//! capability; how prices actually arrive (a network fetcher, a database, a
//! directory of CSV files, a test fixture) is the caller's concern and is
//! injected at the boundary.

use crate::error::{DataError, Result};
use crate::series::{AssetSeries, PricePoint};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::PathBuf;

/// Source of per-ticker historical price series.
pub trait HistoricalSeriesProvider {
    /// Fetch the full available series for a ticker.
    ///
    /// Returns [`DataError::MissingData`] when the provider has no series for
    /// the ticker.
    fn series(&self, ticker: &str) -> Result<AssetSeries>;

    /// Whether the provider can serve the ticker at all.
    fn covers(&self, ticker: &str) -> bool {
        self.series(ticker).is_ok()
    }
}

/// Provider backed by pre-loaded series, used for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, AssetSeries>,
}

impl InMemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a series, replacing any previous series for the same ticker.
    pub fn insert(&mut self, series: AssetSeries) {
        self.series.insert(series.ticker.clone(), series);
    }

    /// Build a provider from a collection of series.
    pub fn from_series(all: impl IntoIterator<Item = AssetSeries>) -> Self {
        let mut provider = Self::new();
        for series in all {
            provider.insert(series);
        }
        provider
    }
}

impl HistoricalSeriesProvider for InMemoryProvider {
    fn series(&self, ticker: &str) -> Result<AssetSeries> {
        self.series
            .get(ticker)
            .cloned()
            .ok_or_else(|| DataError::MissingData {
                ticker: ticker.to_string(),
                reason: "not loaded".to_string(),
            })
    }

    fn covers(&self, ticker: &str) -> bool {
        self.series.contains_key(ticker)
    }
}

#[derive(Debug, serde::Deserialize)]
struct PriceRecord {
    date: NaiveDate,
    price: f64,
}

/// Provider reading `<dir>/<ticker>.csv` files with columns `date,price`.
#[derive(Debug, Clone)]
pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    /// Create a provider rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.csv"))
    }
}

impl HistoricalSeriesProvider for CsvDirProvider {
    fn series(&self, ticker: &str) -> Result<AssetSeries> {
        let path = self.path_for(ticker);
        if !path.is_file() {
            return Err(DataError::MissingData {
                ticker: ticker.to_string(),
                reason: format!("no file at {}", path.display()),
            });
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut points = Vec::new();
        for record in reader.deserialize() {
            let record: PriceRecord = record?;
            points.push(PricePoint {
                date: record.date,
                price: record.price,
            });
        }
        AssetSeries::new(ticker.to_string(), points)
    }

    fn covers(&self, ticker: &str) -> bool {
        self.path_for(ticker).is_file()
    }
}
