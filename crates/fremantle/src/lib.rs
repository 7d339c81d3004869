#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fremantle/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod engine;

// Re-export main types from sub-crates
pub use fremantle_data as data;
pub use fremantle_forecast as forecast;
pub use fremantle_model as model;
pub use fremantle_output as output;
pub use fremantle_sim as sim;

pub use engine::{AnalysisConfig, EngineError, StressTestEngine};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
