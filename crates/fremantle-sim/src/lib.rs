#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fremantle/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod ensemble;
pub mod error;
pub mod metrics;
pub mod rng;
pub mod simulator;

pub use ensemble::{EnsembleSummary, SimulationEnsemble};
pub use error::{Result, SimError};
pub use metrics::{RiskMetrics, RiskMetricsCalculator, quantile};
pub use rng::{PathRng, path_seed};
pub use simulator::{MonteCarloSimulator, SimulationConfig};
