//! Named economic scenarios and their effect on the return model.
//!
//! Each scenario is a fixed table of per-step adjustments: a global mean
//! shift, a volatility multiplier, a correlation delta, and per-sector mean
//! overrides layered on top of the global shift. Annual figures are converted
//! to per-step values at 252 trading days.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};
use crate::estimator::ReturnDistributionParams;
use crate::matrix::{self, EIGENVALUE_FLOOR};
use crate::sector::{Sector, SectorMap};

/// Trading days per year used to scale annual adjustments to per-step.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

const DAYS: f64 = TRADING_DAYS_PER_YEAR;

/// Per-step adjustment a scenario applies to the return model.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioAdjustment {
    /// Additive shift to every asset's mean log-return per step.
    pub return_shift: f64,
    /// Multiplier on per-step standard deviations.
    pub volatility_multiplier: f64,
    /// Additive delta on every off-diagonal correlation entry.
    pub correlation_delta: f64,
    /// Additional per-step mean shift by sector, on top of `return_shift`.
    pub sector_shifts: &'static [(Sector, f64)],
}

impl ScenarioAdjustment {
    /// Per-step mean shift contributed by a sector (zero when unlisted).
    pub fn sector_shift(&self, sector: Sector) -> f64 {
        self.sector_shifts
            .iter()
            .find(|(s, _)| *s == sector)
            .map(|(_, shift)| *shift)
            .unwrap_or(0.0)
    }
}

const NORMAL_MARKET: ScenarioAdjustment = ScenarioAdjustment {
    return_shift: 0.0,
    volatility_multiplier: 1.0,
    correlation_delta: 0.0,
    sector_shifts: &[],
};

const MARKET_CRASH: ScenarioAdjustment = ScenarioAdjustment {
    return_shift: -0.25 / DAYS,
    volatility_multiplier: 2.5,
    correlation_delta: 0.3,
    sector_shifts: &[
        (Sector::Technology, -0.3 / DAYS),
        (Sector::Financial, -0.35 / DAYS),
        (Sector::Healthcare, -0.2 / DAYS),
        (Sector::Energy, -0.25 / DAYS),
        (Sector::Consumer, -0.25 / DAYS),
        (Sector::Industrial, -0.3 / DAYS),
        (Sector::Materials, -0.25 / DAYS),
        (Sector::Utilities, -0.15 / DAYS),
        (Sector::RealEstate, -0.3 / DAYS),
    ],
};

const RECESSION: ScenarioAdjustment = ScenarioAdjustment {
    return_shift: -0.15 / DAYS,
    volatility_multiplier: 1.8,
    correlation_delta: 0.2,
    sector_shifts: &[
        (Sector::Technology, -0.2 / DAYS),
        (Sector::Financial, -0.25 / DAYS),
        (Sector::Healthcare, -0.1 / DAYS),
        (Sector::Energy, -0.2 / DAYS),
        (Sector::Consumer, -0.2 / DAYS),
        (Sector::Industrial, -0.25 / DAYS),
        (Sector::Materials, -0.2 / DAYS),
        (Sector::Utilities, -0.1 / DAYS),
        (Sector::RealEstate, -0.25 / DAYS),
    ],
};

const INFLATION_SURGE: ScenarioAdjustment = ScenarioAdjustment {
    return_shift: -0.05 / DAYS,
    volatility_multiplier: 1.4,
    correlation_delta: 0.1,
    sector_shifts: &[
        (Sector::Technology, -0.15 / DAYS),
        (Sector::Financial, 0.05 / DAYS),
        (Sector::Healthcare, -0.1 / DAYS),
        (Sector::Energy, 0.1 / DAYS),
        (Sector::Consumer, -0.2 / DAYS),
        (Sector::Industrial, -0.1 / DAYS),
        (Sector::Materials, 0.05 / DAYS),
        (Sector::Utilities, -0.05 / DAYS),
        (Sector::RealEstate, -0.2 / DAYS),
    ],
};

const TECH_BUBBLE_BURST: ScenarioAdjustment = ScenarioAdjustment {
    return_shift: -0.1 / DAYS,
    volatility_multiplier: 1.6,
    correlation_delta: 0.1,
    sector_shifts: &[
        (Sector::Technology, -0.4 / DAYS),
        (Sector::Financial, -0.15 / DAYS),
        (Sector::Healthcare, -0.05 / DAYS),
        (Sector::Consumer, -0.1 / DAYS),
        (Sector::Industrial, -0.1 / DAYS),
        (Sector::Materials, -0.05 / DAYS),
        (Sector::Utilities, 0.05 / DAYS),
        (Sector::RealEstate, -0.1 / DAYS),
    ],
};

const PANDEMIC: ScenarioAdjustment = ScenarioAdjustment {
    return_shift: -0.2 / DAYS,
    volatility_multiplier: 2.2,
    correlation_delta: 0.25,
    sector_shifts: &[
        (Sector::Technology, 0.1 / DAYS),
        (Sector::Financial, -0.25 / DAYS),
        (Sector::Healthcare, 0.15 / DAYS),
        (Sector::Energy, -0.3 / DAYS),
        (Sector::Consumer, -0.2 / DAYS),
        (Sector::Industrial, -0.25 / DAYS),
        (Sector::Materials, -0.2 / DAYS),
        (Sector::Utilities, -0.1 / DAYS),
        (Sector::RealEstate, -0.25 / DAYS),
    ],
};

const CURRENCY_DEVALUATION: ScenarioAdjustment = ScenarioAdjustment {
    return_shift: -0.12 / DAYS,
    volatility_multiplier: 1.7,
    correlation_delta: 0.15,
    sector_shifts: &[
        (Sector::Technology, -0.1 / DAYS),
        (Sector::Financial, -0.25 / DAYS),
        (Sector::Healthcare, -0.05 / DAYS),
        (Sector::Energy, 0.1 / DAYS),
        (Sector::Consumer, -0.2 / DAYS),
        (Sector::Industrial, -0.1 / DAYS),
        (Sector::Materials, 0.1 / DAYS),
        (Sector::Utilities, -0.1 / DAYS),
        (Sector::RealEstate, -0.2 / DAYS),
    ],
};

const TIGHT_MONETARY_POLICY: ScenarioAdjustment = ScenarioAdjustment {
    return_shift: -0.08 / DAYS,
    volatility_multiplier: 1.3,
    correlation_delta: 0.1,
    sector_shifts: &[
        (Sector::Technology, -0.2 / DAYS),
        (Sector::Financial, 0.05 / DAYS),
        (Sector::Healthcare, -0.05 / DAYS),
        (Sector::Consumer, -0.15 / DAYS),
        (Sector::Industrial, -0.1 / DAYS),
        (Sector::Materials, -0.05 / DAYS),
        (Sector::Utilities, -0.1 / DAYS),
        (Sector::RealEstate, -0.25 / DAYS),
    ],
};

/// Named stress scenario with a fixed adjustment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EconomicScenario {
    /// Base case with no adjustment.
    NormalMarket,
    /// Severe, sudden downturn across all sectors.
    MarketCrash,
    /// Prolonged economic contraction.
    Recession,
    /// Rapid increase in inflation.
    InflationSurge,
    /// Sharp correction in technology valuations.
    TechBubbleBurst,
    /// Global health crisis suppressing activity.
    Pandemic,
    /// Sharp depreciation of the domestic currency.
    CurrencyDevaluation,
    /// Aggressive rate hikes compressing valuations.
    TightMonetaryPolicy,
}

impl EconomicScenario {
    /// All scenarios, in presentation order.
    pub const ALL: [EconomicScenario; 8] = [
        EconomicScenario::NormalMarket,
        EconomicScenario::MarketCrash,
        EconomicScenario::Recession,
        EconomicScenario::InflationSurge,
        EconomicScenario::TechBubbleBurst,
        EconomicScenario::Pandemic,
        EconomicScenario::CurrencyDevaluation,
        EconomicScenario::TightMonetaryPolicy,
    ];

    /// Human-readable scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            EconomicScenario::NormalMarket => "Normal Market",
            EconomicScenario::MarketCrash => "Market Crash",
            EconomicScenario::Recession => "Recession",
            EconomicScenario::InflationSurge => "Inflation Surge",
            EconomicScenario::TechBubbleBurst => "Tech Bubble Burst",
            EconomicScenario::Pandemic => "Pandemic",
            EconomicScenario::CurrencyDevaluation => "Currency Devaluation",
            EconomicScenario::TightMonetaryPolicy => "Tight Monetary Policy",
        }
    }

    /// One-line description for report output.
    pub fn description(&self) -> &'static str {
        match self {
            EconomicScenario::NormalMarket => "Base case with normal market conditions",
            EconomicScenario::MarketCrash => {
                "Severe and sudden market downturn across all sectors"
            }
            EconomicScenario::Recession => {
                "Economic contraction with prolonged negative growth"
            }
            EconomicScenario::InflationSurge => {
                "Rapid increase in inflation rates affecting purchasing power"
            }
            EconomicScenario::TechBubbleBurst => {
                "Sharp correction in technology sector valuations"
            }
            EconomicScenario::Pandemic => "Global health crisis affecting economic activity",
            EconomicScenario::CurrencyDevaluation => {
                "Sharp currency depreciation favoring exporters over importers"
            }
            EconomicScenario::TightMonetaryPolicy => {
                "Aggressive rate hikes compressing rate-sensitive valuations"
            }
        }
    }

    /// The adjustment table this scenario applies.
    pub fn adjustment(&self) -> &'static ScenarioAdjustment {
        match self {
            EconomicScenario::NormalMarket => &NORMAL_MARKET,
            EconomicScenario::MarketCrash => &MARKET_CRASH,
            EconomicScenario::Recession => &RECESSION,
            EconomicScenario::InflationSurge => &INFLATION_SURGE,
            EconomicScenario::TechBubbleBurst => &TECH_BUBBLE_BURST,
            EconomicScenario::Pandemic => &PANDEMIC,
            EconomicScenario::CurrencyDevaluation => &CURRENCY_DEVALUATION,
            EconomicScenario::TightMonetaryPolicy => &TIGHT_MONETARY_POLICY,
        }
    }
}

impl fmt::Display for EconomicScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EconomicScenario {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "normalmarket" | "normal" => Ok(EconomicScenario::NormalMarket),
            "marketcrash" | "crash" => Ok(EconomicScenario::MarketCrash),
            "recession" => Ok(EconomicScenario::Recession),
            "inflationsurge" | "inflation" => Ok(EconomicScenario::InflationSurge),
            "techbubbleburst" | "techbubble" => Ok(EconomicScenario::TechBubbleBurst),
            "pandemic" => Ok(EconomicScenario::Pandemic),
            "currencydevaluation" | "devaluation" => Ok(EconomicScenario::CurrencyDevaluation),
            "tightmonetarypolicy" | "tightpolicy" => Ok(EconomicScenario::TightMonetaryPolicy),
            _ => Err(ModelError::InvalidScenario(s.to_string())),
        }
    }
}

/// Applies a scenario's adjustment table to an estimated return model.
#[derive(Debug, Clone)]
pub struct ScenarioAdjuster {
    eigenvalue_floor: f64,
}

impl Default for ScenarioAdjuster {
    fn default() -> Self {
        Self {
            eigenvalue_floor: EIGENVALUE_FLOOR,
        }
    }
}

impl ScenarioAdjuster {
    /// Adjuster with an explicit repair floor.
    pub fn new(eigenvalue_floor: f64) -> Self {
        Self { eigenvalue_floor }
    }

    /// Apply a scenario and repair the result to the PSD cone.
    pub fn adjust(
        &self,
        params: &ReturnDistributionParams,
        scenario: EconomicScenario,
        sectors: &SectorMap,
    ) -> Result<ReturnDistributionParams> {
        let adjusted = self.adjust_unrepaired(params, scenario, sectors)?;
        let covariance = matrix::clip_to_psd(&adjusted.covariance, self.eigenvalue_floor)?;
        Ok(ReturnDistributionParams {
            covariance,
            ..adjusted
        })
    }

    /// Apply a scenario without the final PSD repair.
    ///
    /// The correlation delta can push the matrix outside the PSD cone, so
    /// callers other than tests should prefer [`ScenarioAdjuster::adjust`].
    pub fn adjust_unrepaired(
        &self,
        params: &ReturnDistributionParams,
        scenario: EconomicScenario,
        sectors: &SectorMap,
    ) -> Result<ReturnDistributionParams> {
        let adj = scenario.adjustment();
        let n = params.num_assets();

        let mut mean = params.mean.clone();
        for (i, ticker) in params.tickers.iter().enumerate() {
            let sector = sectors.sector_of(ticker);
            mean[i] += adj.return_shift + adj.sector_shift(sector);
        }

        // Scale volatilities: variances by vm², covariances by vm.
        let vm = adj.volatility_multiplier;
        let mut covariance = params.covariance.clone();
        for i in 0..n {
            for j in 0..n {
                covariance[[i, j]] *= if i == j { vm * vm } else { vm };
            }
        }

        if adj.correlation_delta != 0.0 {
            let (std_devs, mut corr) = matrix::correlation_parts(&covariance)?;
            for i in 0..n {
                for j in 0..n {
                    if i != j {
                        corr[[i, j]] = (corr[[i, j]] + adj.correlation_delta).clamp(-1.0, 1.0);
                    }
                }
            }
            covariance = matrix::covariance_from_correlation(&corr, &std_devs)?;
        }

        Ok(ReturnDistributionParams {
            tickers: params.tickers.clone(),
            mean,
            covariance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::min_eigenvalue;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rstest::rstest;

    fn base_params() -> ReturnDistributionParams {
        ReturnDistributionParams {
            tickers: vec!["AAPL".into(), "JPM".into(), "XOM".into()],
            mean: array![0.0005, 0.0003, 0.0002],
            covariance: array![
                [4.0e-4, 1.0e-4, 0.5e-4],
                [1.0e-4, 2.5e-4, 0.8e-4],
                [0.5e-4, 0.8e-4, 3.0e-4],
            ],
        }
    }

    #[test]
    fn test_normal_market_is_identity() {
        let params = base_params();
        let adjuster = ScenarioAdjuster::default();
        let out = adjuster
            .adjust(&params, EconomicScenario::NormalMarket, &SectorMap::default())
            .unwrap();
        for i in 0..3 {
            assert_abs_diff_eq!(out.mean[i], params.mean[i], epsilon = 1e-15);
            for j in 0..3 {
                assert_abs_diff_eq!(
                    out.covariance[[i, j]],
                    params.covariance[[i, j]],
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_market_crash_decreases_every_mean() {
        let params = base_params();
        let adjuster = ScenarioAdjuster::default();
        let out = adjuster
            .adjust(&params, EconomicScenario::MarketCrash, &SectorMap::default())
            .unwrap();
        for i in 0..3 {
            assert!(out.mean[i] < params.mean[i]);
        }
    }

    #[test]
    fn test_crash_scales_variances_before_repair() {
        let params = base_params();
        let adjuster = ScenarioAdjuster::default();
        let out = adjuster
            .adjust_unrepaired(&params, EconomicScenario::MarketCrash, &SectorMap::default())
            .unwrap();
        let vm = EconomicScenario::MarketCrash.adjustment().volatility_multiplier;
        for i in 0..3 {
            assert_abs_diff_eq!(
                out.covariance[[i, i]],
                params.covariance[[i, i]] * vm * vm,
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn test_sector_shift_adds_to_global() {
        let params = base_params();
        let adjuster = ScenarioAdjuster::default();
        let out = adjuster
            .adjust_unrepaired(&params, EconomicScenario::MarketCrash, &SectorMap::default())
            .unwrap();

        let adj = EconomicScenario::MarketCrash.adjustment();
        // AAPL is Technology in the default map.
        let expected = params.mean[0] + adj.return_shift + adj.sector_shift(Sector::Technology);
        assert_abs_diff_eq!(out.mean[0], expected, epsilon = 1e-15);
    }

    #[test]
    fn test_unknown_ticker_gets_global_shift_only() {
        let mut params = base_params();
        params.tickers[0] = "ZZZZ".into();
        let adjuster = ScenarioAdjuster::default();
        let out = adjuster
            .adjust_unrepaired(&params, EconomicScenario::MarketCrash, &SectorMap::default())
            .unwrap();
        let adj = EconomicScenario::MarketCrash.adjustment();
        assert_abs_diff_eq!(
            out.mean[0],
            params.mean[0] + adj.return_shift,
            epsilon = 1e-15
        );
    }

    #[rstest]
    #[case(EconomicScenario::MarketCrash)]
    #[case(EconomicScenario::Pandemic)]
    #[case(EconomicScenario::CurrencyDevaluation)]
    fn test_adjusted_covariance_is_psd(#[case] scenario: EconomicScenario) {
        let params = base_params();
        let adjuster = ScenarioAdjuster::default();
        let out = adjuster
            .adjust(&params, scenario, &SectorMap::default())
            .unwrap();
        assert!(min_eigenvalue(&out.covariance).unwrap() >= -1e-8);
        // Symmetry survives the adjustment pipeline.
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(
                    out.covariance[[i, j]],
                    out.covariance[[j, i]],
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_correlation_delta_clamped() {
        // Two highly correlated assets: the crash delta would push the
        // correlation past 1 without the clamp.
        let params = ReturnDistributionParams {
            tickers: vec!["A".into(), "B".into()],
            mean: array![0.0, 0.0],
            covariance: array![[1.0e-4, 0.9e-4], [0.9e-4, 1.0e-4]],
        };
        let adjuster = ScenarioAdjuster::default();
        let out = adjuster
            .adjust_unrepaired(&params, EconomicScenario::MarketCrash, &SectorMap::empty())
            .unwrap();
        let (std_devs, corr) = matrix::correlation_parts(&out.covariance).unwrap();
        assert!(std_devs.iter().all(|&s| s > 0.0));
        assert_abs_diff_eq!(corr[[0, 1]], 1.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case("Market Crash", EconomicScenario::MarketCrash)]
    #[case("market_crash", EconomicScenario::MarketCrash)]
    #[case("normal", EconomicScenario::NormalMarket)]
    #[case("Tech Bubble Burst", EconomicScenario::TechBubbleBurst)]
    #[case("tight-monetary-policy", EconomicScenario::TightMonetaryPolicy)]
    fn test_scenario_parsing(#[case] input: &str, #[case] expected: EconomicScenario) {
        assert_eq!(input.parse::<EconomicScenario>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_scenario_is_rejected() {
        let err = "asteroid impact".parse::<EconomicScenario>().unwrap_err();
        assert!(matches!(err, ModelError::InvalidScenario(_)));
    }

    #[test]
    fn test_every_scenario_has_description() {
        for scenario in EconomicScenario::ALL {
            assert!(!scenario.description().is_empty());
            assert_eq!(scenario.name().parse::<EconomicScenario>().unwrap(), scenario);
        }
    }
}
