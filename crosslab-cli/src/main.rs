//! CrossLab CLI — moving-average crossover backtests from the terminal.
//!
//! Commands:
//! - `run` — one backtest from a TOML config and/or flags
//! - `sweep` — a grid of `(short, long)` windows ranked by total return
//! - `sentiment` — keyword tags for headlines
//!
//! Reports go to stdout; logs go to stderr.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crosslab_core::sentiment::tag_headlines;
use crosslab_runner::{
    export_json, format_summary, format_sweep, load_series, run_from_config, series_csv, sweep,
    BacktestConfig, DataSourceKind, ParamGrid,
};

#[derive(Parser)]
#[command(
    name = "crosslab",
    about = "CrossLab CLI — dual moving-average crossover backtester"
)]
struct Cli {
    /// Verbose logging (debug level) on stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backtest and print a report.
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Short moving-average window.
        #[arg(long)]
        short: Option<usize>,

        /// Long moving-average window.
        #[arg(long)]
        long: Option<usize>,

        /// Report format.
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Run every short/long pair and print a leaderboard.
    Sweep {
        #[command(flatten)]
        common: CommonArgs,

        /// Comma-separated short windows.
        #[arg(long, value_delimiter = ',', default_values_t = [10usize, 20, 30])]
        short: Vec<usize>,

        /// Comma-separated long windows.
        #[arg(long, value_delimiter = ',', default_values_t = [50usize, 100, 200])]
        long: Vec<usize>,

        /// Print the leaderboard as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Tag headlines as Positive, Negative or Neutral (first five only).
    Sentiment {
        #[arg(required = true)]
        headlines: Vec<String>,
    },
}

/// Flags shared by `run` and `sweep`. Flags override the config file.
#[derive(Args)]
struct CommonArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticker symbol.
    #[arg(long)]
    symbol: Option<String>,

    /// Start date (YYYY-MM-DD). Defaults to one year before end.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD), exclusive. Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Initial investment.
    #[arg(long)]
    initial: Option<f64>,

    /// Read closes from a CSV file instead of Yahoo Finance.
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Use seeded synthetic prices (offline).
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Seed for --synthetic.
    #[arg(long, requires = "synthetic")]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            common,
            short,
            long,
            format,
        } => run_cmd(&common, short, long, format),
        Commands::Sweep {
            common,
            short,
            long,
            json,
        } => sweep_cmd(&common, short, long, json),
        Commands::Sentiment { headlines } => {
            for tagged in tag_headlines(headlines.as_slice()) {
                println!("{:<8}  {}", tagged.sentiment, tagged.title);
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(flag: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("--{flag} must be YYYY-MM-DD, got '{value}'"))
}

/// Load the config file (or defaults) and apply flag overrides.
fn build_config(common: &CommonArgs) -> Result<BacktestConfig> {
    let mut config = match &common.config {
        Some(path) => BacktestConfig::from_file(path)?,
        None => BacktestConfig::default(),
    };

    if let Some(symbol) = &common.symbol {
        config.backtest.symbol = symbol.clone();
    }
    if let Some(start) = &common.start {
        config.backtest.start_date = Some(parse_date("start", start)?);
    }
    if let Some(end) = &common.end {
        config.backtest.end_date = Some(parse_date("end", end)?);
    }
    if let Some(initial) = common.initial {
        config.backtest.initial_investment = initial;
    }
    if let Some(path) = &common.csv {
        config.data.source = DataSourceKind::Csv;
        config.data.path = Some(path.clone());
    }
    if common.synthetic {
        config.data.source = DataSourceKind::Synthetic;
        config.data.seed = common.seed;
    }
    Ok(config)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn run_cmd(
    common: &CommonArgs,
    short: Option<usize>,
    long: Option<usize>,
    format: Format,
) -> Result<()> {
    let mut config = build_config(common)?;
    if let Some(short) = short {
        config.strategy.short_window = short;
    }
    if let Some(long) = long {
        config.strategy.long_window = long;
    }
    debug!(run_id = %config.run_id()?, "resolved config");

    let result = run_from_config(&config, today())?;

    match format {
        Format::Text => print!("{}", format_summary(&result)),
        Format::Json => println!("{}", export_json(&result)?),
        Format::Csv => print!("{}", series_csv(&result)?),
    }
    Ok(())
}

fn sweep_cmd(common: &CommonArgs, short: Vec<usize>, long: Vec<usize>, json: bool) -> Result<()> {
    let config = build_config(common)?;
    let grid = ParamGrid {
        short_windows: short,
        long_windows: long,
    };
    if grid.size() == 0 {
        bail!("no (short, long) pair with short < long in the grid");
    }

    config.validate(today())?;
    let loaded = load_series(&config, today())?;
    let results = sweep(&loaded, &grid, config.backtest.initial_investment);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!(
            "{} {}..{} ({} bars)",
            loaded.symbol,
            loaded
                .series
                .first_date()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            loaded
                .series
                .last_date()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            loaded.series.len()
        );
        print!("{}", format_sweep(&results));
    }
    Ok(())
}
