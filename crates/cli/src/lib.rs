pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use nac_tco_core::config::{AppConfig, LoadOptions, LogFormat};
use rust_decimal::Decimal;
use tracing::Level;

use crate::commands::sensitivity::SensitivityArgs;
use crate::commands::ScenarioOptions;

#[derive(Debug, Parser)]
#[command(
    name = "nac-tco",
    about = "NAC vendor total cost of ownership calculator",
    long_about = "Evaluate TCO, ROI and parameter sensitivity for NAC vendors described in a scenario file.",
    after_help = "Examples:\n  nac-tco tco --scenario scenarios/demo.toml\n  nac-tco compare --scenario scenarios/demo.toml\n  nac-tco tornado --scenario scenarios/demo.toml --vendor portnox"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a nac-tco.toml configuration file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Calculate costs, business value and ROI for one vendor")]
    Tco {
        #[arg(long, help = "Scenario file with inputs, reference tables and vendors")]
        scenario: PathBuf,
        #[arg(long, help = "Vendor id (defaults to the flagship vendor)")]
        vendor: Option<String>,
    },
    #[command(about = "Rank vendors by TCO, payback period and business value")]
    Compare {
        #[arg(long, help = "Scenario file with inputs, reference tables and vendors")]
        scenario: PathBuf,
        #[arg(long = "vendor", help = "Vendor id to include (repeatable, defaults to all)")]
        vendors: Vec<String>,
    },
    #[command(about = "Sweep one or more inputs and report TCO, elasticity and breakeven")]
    Sensitivity {
        #[arg(long, help = "Scenario file with inputs, reference tables and vendors")]
        scenario: PathBuf,
        #[arg(long, help = "Vendor id (defaults to the flagship vendor)")]
        vendor: Option<String>,
        #[arg(long = "parameter", help = "Parameter key to sweep (repeatable)")]
        parameters: Vec<String>,
        #[arg(long, help = "Variation range in percent around the current value")]
        range: Option<Decimal>,
        #[arg(long, help = "Number of evenly spaced values per sweep")]
        steps: Option<usize>,
        #[arg(long, help = "Secondary parameter for a multi-parameter analysis")]
        secondary: Option<String>,
    },
    #[command(about = "Rank parameters by their impact on TCO at fixed low/high extremes")]
    Tornado {
        #[arg(long, help = "Scenario file with inputs, reference tables and vendors")]
        scenario: PathBuf,
        #[arg(long, help = "Vendor id (defaults to the flagship vendor)")]
        vendor: Option<String>,
        #[arg(long, help = "Low/high offset in percent (defaults to model.tornado_range_pct)")]
        range: Option<Decimal>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.config.clone()) {
        eprintln!("{error:#}");
    }

    let options = |scenario_path: PathBuf| ScenarioOptions {
        scenario_path,
        config_path: cli.config.clone(),
    };

    let result = match cli.command {
        Command::Tco { scenario, vendor } => commands::tco::run(&options(scenario), vendor),
        Command::Compare { scenario, vendors } => {
            commands::compare::run(&options(scenario), vendors)
        }
        Command::Sensitivity { scenario, vendor, parameters, range, steps, secondary } => {
            commands::sensitivity::run(
                &options(scenario),
                SensitivityArgs { vendor, parameters, range_pct: range, steps, secondary },
            )
        }
        Command::Tornado { scenario, vendor, range } => {
            commands::tornado::run(&options(scenario), vendor, range)
        }
        Command::Config => commands::CommandResult {
            exit_code: 0,
            output: commands::config::run(cli.config.clone()),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout carries only the JSON payload. A config that
/// fails to load falls back to compact `info`; the command reports the error.
fn init_logging(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (level, format) = AppConfig::load(LoadOptions { config_path, ..LoadOptions::default() })
        .map(|config| {
            (config.logging.level.parse::<Level>().unwrap_or(Level::INFO), config.logging.format)
        })
        .unwrap_or((Level::INFO, LogFormat::Compact));

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}
