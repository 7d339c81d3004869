//! The stress-test engine tying estimation, scenarios, simulation, and
//! forecasting together.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use thiserror::Error;

use fremantle_data::{
    AlignedPrices, DataError, HistoricalSeriesProvider, MissingValuePolicy, Portfolio, align,
};
use fremantle_forecast::{ArimaConfig, ArimaForecaster, ForecastError};
use fremantle_model::{
    EconomicScenario, ModelError, ReturnModelEstimator, ScenarioAdjuster, SectorMap,
};
use fremantle_output::AnalysisReport;
use fremantle_sim::{
    MonteCarloSimulator, RiskMetricsCalculator, SimError, SimulationConfig,
};

/// Portfolio value series is normalized to this at the first aligned date.
const BASE_PORTFOLIO_VALUE: f64 = 100.0;

/// Errors surfaced by a stress-test run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Data loading or alignment failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Model estimation or scenario adjustment failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Simulation or metric computation failed.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// Forecasting failed.
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// Configuration for one stress-test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of Monte Carlo paths.
    pub num_simulations: usize,
    /// Simulation horizon in trading steps.
    pub horizon_steps: usize,
    /// Run seed; fixes the ensemble exactly.
    pub seed: u64,
    /// Simulate paths across threads.
    pub parallel: bool,
    /// Scenario to stress the estimated model with.
    pub scenario: EconomicScenario,
    /// VaR/ES confidence levels, ascending.
    pub confidence_levels: [f64; 2],
    /// ARIMA forecast horizon in steps.
    pub forecast_horizon: usize,
    /// Forecasting configuration.
    pub arima: ArimaConfig,
    /// Calendar reconciliation policy during alignment.
    pub missing_value_policy: MissingValuePolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            num_simulations: 1_000,
            horizon_steps: 252,
            seed: 42,
            parallel: true,
            scenario: EconomicScenario::NormalMarket,
            confidence_levels: [0.95, 0.99],
            forecast_horizon: 30,
            arima: ArimaConfig::default(),
            missing_value_policy: MissingValuePolicy::ForwardFill,
        }
    }
}

/// Runs the full analysis pipeline for one portfolio and scenario.
#[derive(Debug, Clone)]
pub struct StressTestEngine {
    config: AnalysisConfig,
    sectors: SectorMap,
}

impl StressTestEngine {
    /// Engine with the built-in sector classification.
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            sectors: SectorMap::default(),
        }
    }

    /// Engine with an explicit sector classification.
    pub fn with_sectors(config: AnalysisConfig, sectors: SectorMap) -> Self {
        Self { config, sectors }
    }

    /// The active configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the analysis.
    ///
    /// Tickers the provider has no history for are dropped with their weight
    /// redistributed across the rest, and recorded as warnings; a portfolio
    /// with no covered tickers at all is an error.
    pub fn run<P: HistoricalSeriesProvider>(
        &self,
        portfolio: &Portfolio,
        provider: &P,
    ) -> Result<AnalysisReport, EngineError> {
        self.run_cancellable(portfolio, provider, None)
    }

    /// Run the analysis with a cooperative cancellation flag.
    pub fn run_cancellable<P: HistoricalSeriesProvider>(
        &self,
        portfolio: &Portfolio,
        provider: &P,
        cancel: Option<&AtomicBool>,
    ) -> Result<AnalysisReport, EngineError> {
        let mut warnings = Vec::new();

        // Coverage check: drop uncovered tickers, renormalizing the rest.
        let covered: Vec<&str> = portfolio
            .tickers()
            .into_iter()
            .filter(|ticker| {
                let ok = provider.covers(ticker);
                if !ok {
                    warnings.push(format!("dropped {ticker}: no price history"));
                }
                ok
            })
            .collect();
        let portfolio = portfolio.restricted_to(&covered)?;

        let mut series = Vec::with_capacity(covered.len());
        for ticker in portfolio.tickers() {
            let s = provider.series(ticker)?;
            let gaps = s.gap_report();
            if !gaps.is_empty() {
                warnings.push(format!(
                    "{ticker}: {} gap(s) longer than 5 calendar days",
                    gaps.len()
                ));
            }
            series.push(s);
        }

        let aligned = align(&series, self.config.missing_value_policy)?;

        let estimated = ReturnModelEstimator::default().estimate(&aligned)?;
        let adjusted =
            ScenarioAdjuster::default().adjust(&estimated, self.config.scenario, &self.sectors)?;

        let weights = self.weight_vector(&portfolio, &adjusted.tickers);

        let simulator = MonteCarloSimulator::new(SimulationConfig {
            num_paths: self.config.num_simulations,
            horizon_steps: self.config.horizon_steps,
            seed: self.config.seed,
            parallel: self.config.parallel,
        })?;
        let ensemble = simulator.simulate_cancellable(&adjusted, &weights, cancel)?;

        let calculator = RiskMetricsCalculator::new(
            self.config.confidence_levels[0],
            self.config.confidence_levels[1],
        )?;
        let risk = calculator.compute(&ensemble.terminal_returns())?;

        let history = portfolio_value_series(&aligned, &weights);
        let forecast = ArimaForecaster::new(self.config.arima.clone())
            .forecast(&history, self.config.forecast_horizon)?;
        if forecast.ljung_box_warning {
            warnings.push(format!(
                "{} residuals show autocorrelation (Ljung-Box)",
                forecast.order
            ));
        }

        Ok(AnalysisReport {
            scenario: self.config.scenario,
            scenario_description: self.config.scenario.description().to_string(),
            risk,
            ensemble: ensemble.summary(),
            forecast,
            warnings,
        })
    }

    fn weight_vector(&self, portfolio: &Portfolio, tickers: &[String]) -> Array1<f64> {
        Array1::from_iter(
            tickers
                .iter()
                .map(|t| portfolio.weight_of(t).unwrap_or(0.0)),
        )
    }
}

/// Weighted portfolio value over the aligned history, starting at 100.0.
fn portfolio_value_series(aligned: &AlignedPrices, weights: &Array1<f64>) -> Vec<f64> {
    let (t, n) = aligned.prices.dim();
    let mut values = Vec::with_capacity(t);
    for row in 0..t {
        let mut value = 0.0;
        for col in 0..n {
            value += weights[col] * aligned.prices[[row, col]] / aligned.prices[[0, col]];
        }
        values.push(BASE_PORTFOLIO_VALUE * value);
    }
    values
}
