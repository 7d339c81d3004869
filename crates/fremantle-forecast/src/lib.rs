#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fremantle/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod arima;
pub mod diagnostics;
pub mod error;
pub mod forecaster;
mod linalg;
pub mod stationarity;

pub use arima::{ArimaModel, ArimaOrder};
pub use diagnostics::LjungBoxResult;
pub use error::{ForecastError, Result};
pub use forecaster::{ArimaConfig, ArimaForecaster, ForecastResult};
pub use stationarity::AdfResult;
