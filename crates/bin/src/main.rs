//! Command-line interface for the Fremantle stress-testing engine.

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use fremantle::data::{CsvDirProvider, DataError, load_portfolio_csv};
use fremantle::forecast::ArimaConfig;
use fremantle::model::{EconomicScenario, ModelError};
use fremantle::output::{ExportError, ExportFormat, Exporter};
use fremantle::{AnalysisConfig, EngineError, StressTestEngine};

#[derive(Parser)]
#[command(
    name = "fremantle",
    version,
    about = "Portfolio stress testing: scenario-adjusted Monte Carlo simulation, \
             VaR/ES, and ARIMA forecasting"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a stress-test analysis for a portfolio
    Analyze(AnalyzeArgs),

    /// List the available economic scenarios
    Scenarios,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Portfolio CSV with columns ticker,market,weight
    #[arg(long)]
    portfolio: PathBuf,

    /// Directory of per-ticker price CSVs (<ticker>.csv with columns date,price)
    #[arg(long)]
    prices: PathBuf,

    /// Scenario name (see `fremantle scenarios`)
    #[arg(long, default_value = "normal")]
    scenario: String,

    /// Number of Monte Carlo paths
    #[arg(long, default_value_t = 10_000)]
    simulations: usize,

    /// Simulation horizon in trading steps
    #[arg(long, default_value_t = 252)]
    horizon: usize,

    /// Run seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Simulate paths on a single thread
    #[arg(long)]
    sequential: bool,

    /// ARIMA forecast horizon in steps
    #[arg(long, default_value_t = 30)]
    forecast_horizon: usize,

    /// Refit the forecast on only the trailing window of this many observations
    #[arg(long)]
    rolling_window: Option<usize>,

    /// Write the report to a file instead of printing a summary
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format: csv, json, or pretty-json
    #[arg(long, default_value = "pretty-json")]
    format: String,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), CliError> {
    match Cli::parse().command {
        Command::Scenarios => {
            list_scenarios();
            Ok(())
        }
        Command::Analyze(args) => analyze(args),
    }
}

fn list_scenarios() {
    for scenario in EconomicScenario::ALL {
        println!("{:<24}{}", scenario.name(), scenario.description());
    }
}

fn analyze(args: AnalyzeArgs) -> Result<(), CliError> {
    let scenario: EconomicScenario = args.scenario.parse()?;
    let portfolio = load_portfolio_csv(&args.portfolio)?;
    let provider = CsvDirProvider::new(&args.prices);

    let config = AnalysisConfig {
        num_simulations: args.simulations,
        horizon_steps: args.horizon,
        seed: args.seed,
        parallel: !args.sequential,
        scenario,
        forecast_horizon: args.forecast_horizon,
        arima: ArimaConfig {
            rolling_window: args.rolling_window,
            ..ArimaConfig::default()
        },
        ..AnalysisConfig::default()
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "simulating {} paths over {} steps under {scenario}",
        args.simulations, args.horizon
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let report = StressTestEngine::new(config).run(&portfolio, &provider)?;
    spinner.finish_and_clear();

    match args.output {
        Some(path) => {
            let format = ExportFormat::parse(&args.format)?;
            report.export_to_file(&path, format)?;
            println!("report written to {}", path.display());
        }
        None => print!("{}", report.render_text()),
    }

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }

    Ok(())
}
