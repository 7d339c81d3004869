//! Sector classification for portfolio assets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Economic sector an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    /// Software, hardware, semiconductors, and telecoms.
    Technology,
    /// Banks, insurers, asset managers, and payment networks.
    Financial,
    /// Pharmaceuticals, biotech, and medical devices.
    Healthcare,
    /// Oil, gas, and coal producers and services.
    Energy,
    /// Consumer staples and discretionary.
    Consumer,
    /// Manufacturing, construction, and logistics.
    Industrial,
    /// Mining, metals, and chemicals.
    Materials,
    /// Regulated power and water utilities.
    Utilities,
    /// Property developers and REITs.
    RealEstate,
    /// Assets with no known classification.
    Unknown,
}

impl Sector {
    /// Human-readable sector name.
    pub fn name(&self) -> &'static str {
        match self {
            Sector::Technology => "Technology",
            Sector::Financial => "Financial",
            Sector::Healthcare => "Healthcare",
            Sector::Energy => "Energy",
            Sector::Consumer => "Consumer",
            Sector::Industrial => "Industrial",
            Sector::Materials => "Materials",
            Sector::Utilities => "Utilities",
            Sector::RealEstate => "Real Estate",
            Sector::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sector {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technology" | "tech" => Ok(Sector::Technology),
            "financial" | "financials" => Ok(Sector::Financial),
            "healthcare" | "health care" => Ok(Sector::Healthcare),
            "energy" => Ok(Sector::Energy),
            "consumer" => Ok(Sector::Consumer),
            "industrial" | "industrials" => Ok(Sector::Industrial),
            "materials" => Ok(Sector::Materials),
            "utilities" => Ok(Sector::Utilities),
            "real estate" | "realestate" => Ok(Sector::RealEstate),
            "unknown" => Ok(Sector::Unknown),
            other => Err(ModelError::InvalidSector(other.to_string())),
        }
    }
}

/// Built-in classification for liquid US and Jakarta listings.
const DEFAULT_SECTORS: &[(&str, Sector)] = &[
    // US technology
    ("AAPL", Sector::Technology),
    ("MSFT", Sector::Technology),
    ("GOOGL", Sector::Technology),
    ("GOOG", Sector::Technology),
    ("META", Sector::Technology),
    ("AMZN", Sector::Technology),
    ("NVDA", Sector::Technology),
    ("ADBE", Sector::Technology),
    ("CRM", Sector::Technology),
    ("INTC", Sector::Technology),
    ("CSCO", Sector::Technology),
    ("AMD", Sector::Technology),
    // US financial
    ("JPM", Sector::Financial),
    ("BAC", Sector::Financial),
    ("WFC", Sector::Financial),
    ("C", Sector::Financial),
    ("GS", Sector::Financial),
    ("MS", Sector::Financial),
    ("BLK", Sector::Financial),
    ("AXP", Sector::Financial),
    ("V", Sector::Financial),
    ("MA", Sector::Financial),
    ("BRK-A", Sector::Financial),
    ("BRK-B", Sector::Financial),
    // US healthcare
    ("JNJ", Sector::Healthcare),
    ("PFE", Sector::Healthcare),
    ("MRK", Sector::Healthcare),
    ("ABT", Sector::Healthcare),
    ("UNH", Sector::Healthcare),
    ("ABBV", Sector::Healthcare),
    ("TMO", Sector::Healthcare),
    ("LLY", Sector::Healthcare),
    // US energy
    ("XOM", Sector::Energy),
    ("CVX", Sector::Energy),
    ("COP", Sector::Energy),
    ("EOG", Sector::Energy),
    ("SLB", Sector::Energy),
    ("BP", Sector::Energy),
    // US consumer
    ("PG", Sector::Consumer),
    ("KO", Sector::Consumer),
    ("PEP", Sector::Consumer),
    ("WMT", Sector::Consumer),
    ("COST", Sector::Consumer),
    ("MCD", Sector::Consumer),
    ("NKE", Sector::Consumer),
    ("SBUX", Sector::Consumer),
    // US industrial
    ("GE", Sector::Industrial),
    ("HON", Sector::Industrial),
    ("MMM", Sector::Industrial),
    ("BA", Sector::Industrial),
    ("CAT", Sector::Industrial),
    ("DE", Sector::Industrial),
    ("UPS", Sector::Industrial),
    ("FDX", Sector::Industrial),
    // Jakarta banking
    ("BBRI.JK", Sector::Financial),
    ("BBCA.JK", Sector::Financial),
    ("BMRI.JK", Sector::Financial),
    ("BBNI.JK", Sector::Financial),
    ("BRIS.JK", Sector::Financial),
    ("BJTM.JK", Sector::Financial),
    ("BTPS.JK", Sector::Financial),
    // Jakarta consumer goods
    ("UNVR.JK", Sector::Consumer),
    ("ICBP.JK", Sector::Consumer),
    ("INDF.JK", Sector::Consumer),
    ("KLBF.JK", Sector::Consumer),
    ("SIDO.JK", Sector::Consumer),
    ("MYOR.JK", Sector::Consumer),
    ("GGRM.JK", Sector::Consumer),
    ("HMSP.JK", Sector::Consumer),
    // Jakarta telecommunications
    ("TLKM.JK", Sector::Technology),
    ("ISAT.JK", Sector::Technology),
    ("EXCL.JK", Sector::Technology),
    // Jakarta energy and mining
    ("ADRO.JK", Sector::Energy),
    ("PTBA.JK", Sector::Energy),
    ("ITMG.JK", Sector::Energy),
    ("MEDC.JK", Sector::Energy),
    ("INCO.JK", Sector::Materials),
    ("ANTM.JK", Sector::Materials),
    ("TINS.JK", Sector::Materials),
    // Jakarta property and infrastructure
    ("SMGR.JK", Sector::Industrial),
    ("WIKA.JK", Sector::Industrial),
    ("WSKT.JK", Sector::Industrial),
    ("PTPP.JK", Sector::Industrial),
    ("BSDE.JK", Sector::RealEstate),
    ("CTRA.JK", Sector::RealEstate),
    ("PWON.JK", Sector::RealEstate),
];

/// Ticker-to-sector lookup used by the scenario adjuster.
///
/// Unmapped tickers resolve to [`Sector::Unknown`], which scenario tables
/// treat as carrying no sector-specific shift.
#[derive(Debug, Clone)]
pub struct SectorMap {
    entries: HashMap<String, Sector>,
}

impl SectorMap {
    /// Empty map: every ticker resolves to [`Sector::Unknown`].
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Build a map from explicit ticker/sector pairs.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Sector)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(t, s)| (t.into(), s))
                .collect(),
        }
    }

    /// Insert or replace a single classification.
    pub fn insert(&mut self, ticker: impl Into<String>, sector: Sector) {
        self.entries.insert(ticker.into(), sector);
    }

    /// Sector for a ticker, defaulting to [`Sector::Unknown`].
    pub fn sector_of(&self, ticker: &str) -> Sector {
        self.entries
            .get(ticker)
            .copied()
            .unwrap_or(Sector::Unknown)
    }

    /// Number of classified tickers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SectorMap {
    /// Built-in table covering the liquid US and Jakarta names.
    fn default() -> Self {
        Self::from_entries(DEFAULT_SECTORS.iter().map(|&(t, s)| (t, s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AAPL", Sector::Technology)]
    #[case("JPM", Sector::Financial)]
    #[case("BBCA.JK", Sector::Financial)]
    #[case("ANTM.JK", Sector::Materials)]
    #[case("BSDE.JK", Sector::RealEstate)]
    fn test_default_map_classification(#[case] ticker: &str, #[case] expected: Sector) {
        let map = SectorMap::default();
        assert_eq!(map.sector_of(ticker), expected);
    }

    #[test]
    fn test_unknown_ticker_defaults() {
        let map = SectorMap::default();
        assert_eq!(map.sector_of("ZZZZ"), Sector::Unknown);
    }

    #[test]
    fn test_insert_overrides_default() {
        let mut map = SectorMap::default();
        map.insert("AAPL", Sector::Consumer);
        assert_eq!(map.sector_of("AAPL"), Sector::Consumer);
    }

    #[rstest]
    #[case("Technology", Sector::Technology)]
    #[case("real estate", Sector::RealEstate)]
    #[case("FINANCIALS", Sector::Financial)]
    fn test_sector_from_str(#[case] input: &str, #[case] expected: Sector) {
        assert_eq!(input.parse::<Sector>().unwrap(), expected);
    }

    #[test]
    fn test_sector_from_str_rejects_garbage() {
        assert!("galactic".parse::<Sector>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for sector in [
            Sector::Technology,
            Sector::RealEstate,
            Sector::Utilities,
            Sector::Unknown,
        ] {
            assert_eq!(sector.name().parse::<Sector>().unwrap(), sector);
        }
    }
}
