#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fremantle/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod estimator;
pub mod matrix;
pub mod scenario;
pub mod sector;

pub use error::{ModelError, Result};
pub use estimator::{ReturnDistributionParams, ReturnModelConfig, ReturnModelEstimator};
pub use matrix::{EigenDecomposition, clip_to_psd, min_eigenvalue, symmetric_eigen};
pub use scenario::{EconomicScenario, ScenarioAdjuster, ScenarioAdjustment};
pub use sector::{Sector, SectorMap};
