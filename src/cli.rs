//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{write_indicator_csv, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::{write_json, JsonReportAdapter};
use crate::domain::backtest::{
    BacktestConfig, BacktestSummary, DEFAULT_ALLOCATION, DEFAULT_INITIAL_CAPITAL,
};
use crate::domain::config_validation::{self, validate_config};
use crate::domain::error::TickwiseError;
use crate::domain::indicator_frame::IndicatorFrame;
use crate::domain::report::{build_report, signals_and_backtest, AnalysisConfig, AnalysisReport};
use crate::domain::signal::{generate_signals, SignalConfig, TradeSignal};
use crate::domain::temporal::{analyze_temporal_patterns, TemporalPatterns};
use crate::domain::trend::{analyze_trend, TrendAnalysis, TrendConfig};
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "tickwise",
    about = "Trend, signal, backtest and calendar analysis of daily price history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// CSV file, or directory of <SYMBOL>.csv files
    #[arg(short, long)]
    pub data: Option<PathBuf>,
    /// INI configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short, long)]
    pub symbol: Option<String>,
    /// Write output here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify the trend and report best/worst periods and key levels
    Trend(DataArgs),
    /// Generate buy/sell signals
    Signals(DataArgs),
    /// Backtest the generated signals
    Backtest(DataArgs),
    /// Aggregate closes by weekday, week and month
    Temporal(DataArgs),
    /// Export the indicator table as CSV
    Indicators(DataArgs),
    /// Run every analysis and write a single JSON report
    Report(DataArgs),
    /// List the symbols available under a data path
    ListSymbols(DataArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    Trend,
    Signals,
    Backtest,
    Temporal,
    Indicators,
    Report,
}

#[derive(Debug)]
pub enum AnalysisOutput {
    Trend(TrendAnalysis),
    Signals(Vec<TradeSignal>),
    Backtest(BacktestSummary),
    Temporal(TemporalPatterns),
    Indicators(IndicatorFrame),
    Report(Box<AnalysisReport>),
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Trend(args) => run_analysis_command(Analysis::Trend, &args),
        Command::Signals(args) => run_analysis_command(Analysis::Signals, &args),
        Command::Backtest(args) => run_analysis_command(Analysis::Backtest, &args),
        Command::Temporal(args) => run_analysis_command(Analysis::Temporal, &args),
        Command::Indicators(args) => run_analysis_command(Analysis::Indicators, &args),
        Command::Report(args) => run_analysis_command(Analysis::Report, &args),
        Command::ListSymbols(args) => run_list_symbols(&args),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, TickwiseError> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            FileConfigAdapter::from_file(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Validate every section, then build the analysis parameters. Absent keys
/// take their defaults.
pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, TickwiseError> {
    validate_config(config)?;
    Ok(AnalysisConfig {
        trend: build_trend_config(config),
        signals: build_signal_config(config),
        backtest: build_backtest_config(config),
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        initial_capital: config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        allocation: config.get_double("backtest", "allocation", DEFAULT_ALLOCATION),
    }
}

pub fn build_signal_config(config: &dyn ConfigPort) -> SignalConfig {
    let defaults = SignalConfig::default();
    let threshold = config.get_double(
        "signals",
        "threshold",
        defaults.threshold_x100 as f64 / 100.0,
    );
    SignalConfig {
        threshold_x100: config_validation::hundredths(threshold),
        rsi_oversold: config.get_double("signals", "rsi_oversold", defaults.rsi_oversold),
        rsi_overbought: config.get_double("signals", "rsi_overbought", defaults.rsi_overbought),
        volume_surge: config.get_double("signals", "volume_surge", defaults.volume_surge),
    }
}

pub fn build_trend_config(config: &dyn ConfigPort) -> TrendConfig {
    let defaults = TrendConfig::default();
    TrendConfig {
        lookback: config.get_int("trend", "lookback", defaults.lookback as i64).max(1) as usize,
        levels: config.get_int("trend", "levels", defaults.levels as i64).max(1) as usize,
    }
}

/// Data path and symbol: command-line flags override the `[data]` section.
/// Without an explicit symbol, a single-file path names its own symbol.
pub fn resolve_data_source(
    args: &DataArgs,
    config: &dyn ConfigPort,
) -> Result<(PathBuf, String), TickwiseError> {
    let path = args
        .data
        .clone()
        .or_else(|| config.get_string("data", "path").map(PathBuf::from))
        .ok_or_else(|| TickwiseError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;

    let symbol = args
        .symbol
        .clone()
        .or_else(|| config.get_string("data", "symbol"))
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            path.is_file()
                .then_some(&path)
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
        })
        .ok_or_else(|| TickwiseError::ConfigMissing {
            section: "data".into(),
            key: "symbol".into(),
        })?;

    Ok((path, symbol))
}

/// Load `symbol` from `data` and run one analysis over it.
pub fn run_analysis(
    analysis: Analysis,
    data: &dyn DataPort,
    symbol: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, TickwiseError> {
    let series = data.fetch_series(symbol)?;
    eprintln!(
        "Loaded {} bars for {} ({} to {})",
        series.len(),
        symbol,
        series.first().map(|b| b.date.to_string()).unwrap_or_default(),
        series.last().map(|b| b.date.to_string()).unwrap_or_default(),
    );

    Ok(match analysis {
        Analysis::Trend => AnalysisOutput::Trend(analyze_trend(&series, &config.trend)?),
        Analysis::Signals => {
            let frame = IndicatorFrame::compute(&series);
            AnalysisOutput::Signals(generate_signals(&frame, &config.signals))
        }
        Analysis::Backtest => {
            let (signals, summary) = signals_and_backtest(&series, config);
            eprintln!("Generated {} signals", signals.len());
            AnalysisOutput::Backtest(summary)
        }
        Analysis::Temporal => AnalysisOutput::Temporal(analyze_temporal_patterns(&series)?),
        Analysis::Indicators => AnalysisOutput::Indicators(IndicatorFrame::compute(&series)),
        Analysis::Report => {
            AnalysisOutput::Report(Box::new(build_report(symbol, &series, config)?))
        }
    })
}

pub fn write_output(output: &AnalysisOutput, path: Option<&Path>) -> Result<(), TickwiseError> {
    match output {
        AnalysisOutput::Trend(t) => write_json(t, path),
        AnalysisOutput::Signals(s) => write_json(s, path),
        AnalysisOutput::Backtest(b) => {
            print_backtest_summary(b);
            write_json(b, path)
        }
        AnalysisOutput::Temporal(t) => write_json(t, path),
        AnalysisOutput::Indicators(frame) => match path {
            Some(p) => {
                if let Some(parent) = p.parent() {
                    fs::create_dir_all(parent)?;
                }
                write_indicator_csv(frame, File::create(p)?)
            }
            None => write_indicator_csv(frame, io::stdout().lock()),
        },
        AnalysisOutput::Report(r) => {
            print_backtest_summary(&r.backtest);
            JsonReportAdapter::new().write(r, path)
        }
    }
}

fn run_analysis_command(analysis: Analysis, args: &DataArgs) -> Result<(), TickwiseError> {
    // Stage 1: config and logging
    let adapter = load_config(args.config.as_deref())?;
    init_logging(&adapter)?;
    let config = build_analysis_config(&adapter)?;

    // Stage 2: data source
    let (path, symbol) = resolve_data_source(args, &adapter)?;
    eprintln!("Reading {} from {}", symbol, path.display());
    let data = CsvAdapter::new(path);

    // Stage 3: analysis and output
    let output = run_analysis(analysis, &data, &symbol, &config)?;
    write_output(&output, args.output.as_deref())
}

fn run_list_symbols(args: &DataArgs) -> Result<(), TickwiseError> {
    let adapter = load_config(args.config.as_deref())?;
    init_logging(&adapter)?;
    let path = args
        .data
        .clone()
        .or_else(|| adapter.get_string("data", "path").map(PathBuf::from))
        .ok_or_else(|| TickwiseError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;

    let symbols = CsvAdapter::new(path.clone()).list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found under {}", path.display());
    } else {
        for symbol in &symbols {
            println!("{symbol}");
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), TickwiseError> {
    let adapter = load_config(Some(config_path))?;
    let config = build_analysis_config(&adapter)?;

    eprintln!("\nBacktest:");
    eprintln!("  initial_capital: {:.2}", config.backtest.initial_capital);
    eprintln!("  allocation:      {}", config.backtest.allocation);
    eprintln!("\nSignals:");
    eprintln!("  threshold:       {:.2}", config.signals.threshold_x100 as f64 / 100.0);
    eprintln!(
        "  rsi bounds:      {} / {}",
        config.signals.rsi_oversold, config.signals.rsi_overbought
    );
    eprintln!("  volume_surge:    {}", config.signals.volume_surge);
    eprintln!("\nTrend:");
    eprintln!("  lookback:        {}", config.trend.lookback);
    eprintln!("  levels:          {}", config.trend.levels);

    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn init_logging(config: &dyn ConfigPort) -> Result<(), TickwiseError> {
    let filter = logging::resolve_filter(config.get_string("log", "filter").as_deref());
    let format = config
        .get_string("log", "format")
        .unwrap_or_else(|| "text".to_string());
    logging::init_tracing(&filter, &format)
}

fn print_backtest_summary(summary: &BacktestSummary) {
    eprintln!("\n=== Backtest ===");
    eprintln!("Initial capital: {:.2}", summary.initial_capital);
    eprintln!("Final value:     {:.2}", summary.final_value);
    eprintln!("Return:          {:.2}%", summary.return_pct);
    eprintln!(
        "Trades:          {} ({} round trips, {} won, {} lost)",
        summary.trades.len(),
        summary.stats.round_trips,
        summary.stats.wins,
        summary.stats.losses
    );
    if summary.stats.round_trips > 0 {
        eprintln!("Win rate:        {:.1}%", summary.stats.win_rate * 100.0);
        eprintln!("Realized PnL:    {:.2}", summary.stats.realized_pnl);
    }
}
