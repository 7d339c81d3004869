#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fremantle/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod portfolio;
pub mod provider;
pub mod series;

pub use error::{DataError, Result};
pub use portfolio::{Market, Portfolio, Position, load_portfolio_csv};
pub use provider::{CsvDirProvider, HistoricalSeriesProvider, InMemoryProvider};
pub use series::{AlignedPrices, AssetSeries, DataGap, MissingValuePolicy, PricePoint, align};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
