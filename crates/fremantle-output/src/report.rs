//! The assembled stress-test report.

use serde::Serialize;

use fremantle_forecast::ForecastResult;
use fremantle_model::EconomicScenario;
use fremantle_sim::{EnsembleSummary, RiskMetrics};

use crate::export::{ExportError, ExportFormat, Exporter};

/// Full result of one stress-test run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Scenario the analysis was run under.
    pub scenario: EconomicScenario,
    /// Human-readable scenario description.
    pub scenario_description: String,
    /// Tail risk metrics from the simulated ensemble.
    pub risk: RiskMetrics,
    /// Distributional summary of the simulated paths.
    pub ensemble: EnsembleSummary,
    /// ARIMA forecast of the historical portfolio value series.
    pub forecast: ForecastResult,
    /// Non-fatal issues encountered during the run.
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    /// Render a human-readable summary for terminal output.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("Scenario: {}\n", self.scenario));
        out.push_str(&format!("  {}\n\n", self.scenario_description));

        out.push_str("Risk metrics (loss fractions over the horizon)\n");
        out.push_str(&format!(
            "  VaR 95%: {:.4}    ES 95%: {:.4}\n",
            self.risk.var_95, self.risk.es_95
        ));
        out.push_str(&format!(
            "  VaR 99%: {:.4}    ES 99%: {:.4}\n\n",
            self.risk.var_99, self.risk.es_99
        ));

        out.push_str(&format!(
            "Ensemble ({} paths, {} steps)\n",
            self.ensemble.num_paths, self.ensemble.horizon_steps
        ));
        out.push_str(&format!(
            "  terminal value: mean {:.4}, p5 {:.4}, median {:.4}, p95 {:.4}\n",
            self.ensemble.mean_terminal,
            self.ensemble.terminal_p5,
            self.ensemble.terminal_p50,
            self.ensemble.terminal_p95
        ));
        out.push_str(&format!(
            "  max drawdown: mean {:.4}, worst {:.4}\n\n",
            self.ensemble.mean_max_drawdown, self.ensemble.worst_max_drawdown
        ));

        out.push_str(&format!(
            "Forecast: {} (AIC {:.2}, {:.0}% interval)\n",
            self.forecast.order,
            self.forecast.aic,
            self.forecast.confidence * 100.0
        ));
        if let (Some(first), Some(last)) =
            (self.forecast.values.first(), self.forecast.values.last())
        {
            let steps = self.forecast.values.len();
            out.push_str(&format!("  1-step ahead: {first:.2}\n"));
            out.push_str(&format!("  {steps}-step ahead: {last:.2}\n"));
        }
        if self.forecast.ljung_box_warning {
            out.push_str("  note: residual autocorrelation detected (Ljung-Box)\n");
        }

        if !self.warnings.is_empty() {
            out.push_str("\nWarnings\n");
            for warning in &self.warnings {
                out.push_str(&format!("  - {warning}\n"));
            }
        }

        out
    }

    /// Flatten the report to section/metric/value rows for CSV export.
    fn to_flat_records(&self) -> Vec<ReportRecord> {
        let mut records = vec![
            ReportRecord::new("scenario", "name", self.scenario.to_string()),
            ReportRecord::numeric("risk", "var_95", self.risk.var_95),
            ReportRecord::numeric("risk", "var_99", self.risk.var_99),
            ReportRecord::numeric("risk", "es_95", self.risk.es_95),
            ReportRecord::numeric("risk", "es_99", self.risk.es_99),
            ReportRecord::numeric("ensemble", "num_paths", self.ensemble.num_paths as f64),
            ReportRecord::numeric("ensemble", "mean_terminal", self.ensemble.mean_terminal),
            ReportRecord::numeric("ensemble", "terminal_p5", self.ensemble.terminal_p5),
            ReportRecord::numeric("ensemble", "terminal_p25", self.ensemble.terminal_p25),
            ReportRecord::numeric("ensemble", "terminal_p50", self.ensemble.terminal_p50),
            ReportRecord::numeric("ensemble", "terminal_p75", self.ensemble.terminal_p75),
            ReportRecord::numeric("ensemble", "terminal_p95", self.ensemble.terminal_p95),
            ReportRecord::numeric(
                "ensemble",
                "mean_max_drawdown",
                self.ensemble.mean_max_drawdown,
            ),
            ReportRecord::numeric(
                "ensemble",
                "worst_max_drawdown",
                self.ensemble.worst_max_drawdown,
            ),
            ReportRecord::new("forecast", "order", self.forecast.order.to_string()),
            ReportRecord::numeric("forecast", "aic", self.forecast.aic),
        ];

        for (i, value) in self.forecast.values.iter().enumerate() {
            let step = i + 1;
            records.push(ReportRecord::numeric(
                "forecast",
                &format!("step_{step}_value"),
                *value,
            ));
            records.push(ReportRecord::numeric(
                "forecast",
                &format!("step_{step}_lower"),
                self.forecast.lower[i],
            ));
            records.push(ReportRecord::numeric(
                "forecast",
                &format!("step_{step}_upper"),
                self.forecast.upper[i],
            ));
        }

        for (i, warning) in self.warnings.iter().enumerate() {
            records.push(ReportRecord::new(
                "warning",
                &format!("warning_{}", i + 1),
                warning.clone(),
            ));
        }

        records
    }
}

/// Flattened report row for CSV export.
#[derive(Debug, Serialize)]
struct ReportRecord {
    section: String,
    metric: String,
    value: String,
}

impl ReportRecord {
    fn new(section: &str, metric: &str, value: String) -> Self {
        Self {
            section: section.to_string(),
            metric: metric.to_string(),
            value,
        }
    }

    fn numeric(section: &str, metric: &str, value: f64) -> Self {
        Self::new(section, metric, value.to_string())
    }
}

impl Exporter for AnalysisReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in self.to_flat_records() {
                    wtr.serialize(&record)?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
