//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::{CsvBarSource, CsvTradeReport};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sim_broker::{BrokerConfig, SimulatedBroker};
use crate::adapters::tracing_sink::TracingSink;
use crate::domain::backtest::run_backtest;
use crate::domain::config::{build_data_config, build_engine_config, EngineConfig};
use crate::domain::engine::DecisionEngine;
use crate::domain::error::EngineError;
use crate::domain::indicator::{calculate, IndicatorType};
use crate::domain::ohlcv::Bar;
use crate::domain::signal::PolicyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::BarSource;
use crate::ports::report_port::TradeReportPort;

#[derive(Parser, Debug)]
#[command(name = "bartrader", about = "Bar-driven single-asset decision engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a CSV bar file
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar file; overrides [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Write the closed-trade table here
        #[arg(short, long)]
        trades: Option<PathBuf>,
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the True Range / ATR table for a bar file
    Atr {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long, default_value_t = 14)]
        period: usize,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            data,
            trades,
            verbose,
        } => {
            init_tracing(verbose);
            report(run_command(&config, data.as_deref(), trades.as_deref()))
        }
        Command::Validate { config } => report(validate_command(&config)),
        Command::Atr { data, period } => report(atr_command(&data, period)),
    }
}

/// `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn report(result: Result<(), EngineError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn run_command(
    config_path: &Path,
    data_override: Option<&Path>,
    trades_path: Option<&Path>,
) -> Result<(), EngineError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let engine_config = build_engine_config(&adapter)?;
    let data_config = build_data_config(&adapter)?;
    let broker_config = BrokerConfig::from_config(&adapter)?;

    let data_path = match data_override {
        Some(p) => p.to_path_buf(),
        None => data_config.path.clone().ok_or_else(|| EngineError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?,
    };

    let source = CsvBarSource::new(data_path);
    let bars = source.fetch_bars(data_config.start_date, data_config.end_date)?;
    eprintln!("Loaded {} bars from {}", bars.len(), source.path().display());

    let mut engine = DecisionEngine::new(&engine_config)?;
    let mut broker = SimulatedBroker::new(broker_config.clone());
    let mut sink = TracingSink;

    eprintln!(
        "Running {} policy, trend {}, volatility {}",
        engine.policy_name(),
        engine_config.trend_indicator(),
        engine_config.volatility_indicator()
    );
    let summary = run_backtest(&mut engine, &bars, &mut broker, &mut sink)?;

    eprintln!("\n=== Results ===");
    eprintln!("Bars:             {}", summary.bars);
    eprintln!("Closed Trades:    {}", summary.trades);
    eprintln!("Winning Trades:   {}", summary.winning_trades);
    eprintln!("Gross P&L:        {:.2}", summary.gross_pnl);
    eprintln!("Net P&L:          {:.2}", summary.net_pnl);
    eprintln!("Starting Value:   {:.2}", broker_config.cash);
    eprintln!("Final Value:      {:.2}", summary.final_value);

    if let Some(path) = trades_path {
        CsvTradeReport.write_trades(engine.ledger().trades(), path)?;
        eprintln!("\nTrades written to: {}", path.display());
    }
    Ok(())
}

fn describe_policy(config: &EngineConfig) -> String {
    match config.policy {
        PolicyConfig::Trend => "trend".to_string(),
        PolicyConfig::DeclineThenHold {
            decline_bars,
            hold_bars,
        } => format!(
            "decline_hold (decline_bars {}, hold_bars {})",
            decline_bars, hold_bars
        ),
        PolicyConfig::VolatilityBand {
            enter_below,
            exit_above,
        } => format!(
            "volatility (enter below {}, exit above {})",
            enter_below, exit_above
        ),
    }
}

pub fn validate_command(config_path: &Path) -> Result<(), EngineError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let engine_config = build_engine_config(&adapter)?;
    let data_config = build_data_config(&adapter)?;
    let broker_config = BrokerConfig::from_config(&adapter)?;

    for section in ["indicators", "signal", "broker", "data"] {
        if !adapter.has_section(section) {
            eprintln!("  [{}] not present, using defaults", section);
        }
    }

    eprintln!("\nIndicators:");
    eprintln!("  trend:      {}", engine_config.trend_indicator());
    eprintln!("  volatility: {}", engine_config.volatility_indicator());
    eprintln!("\nSignal:");
    eprintln!("  policy:     {}", describe_policy(&engine_config));
    eprintln!("  entry gate: {}", engine_config.entry_probability);
    if let Some(seed) = engine_config.seed {
        eprintln!("  seed:       {}", seed);
    }
    eprintln!("\nBroker:");
    eprintln!("  cash:       {}", broker_config.cash);
    eprintln!("  stake:      {}", broker_config.stake);
    eprintln!(
        "  commission: {} + {}%",
        broker_config.commission_per_trade, broker_config.commission_pct
    );
    if let Some(path) = &data_config.path {
        eprintln!("\nData:");
        eprintln!("  path:       {}", path.display());
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}

/// Writes the `date,high,low,close,tr,atr` table; not-ready values are left empty.
pub fn write_atr_table<W: Write>(
    bars: &[Bar],
    period: usize,
    out: W,
) -> Result<(), EngineError> {
    let tr = calculate(bars, IndicatorType::TrueRange)?;
    let atr = calculate(bars, IndicatorType::Atr(period))?;
    let fixed = |v: Option<f64>| v.map(|v| format!("{:.4}", v)).unwrap_or_default();

    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["date", "high", "low", "close", "tr", "atr"])
        .map_err(|e| EngineError::data(e.to_string()))?;
    for (i, bar) in bars.iter().enumerate() {
        wtr.write_record([
            bar.date.format("%Y-%m-%d").to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            fixed(tr.value_at(i)),
            fixed(atr.value_at(i)),
        ])
        .map_err(|e| EngineError::data(e.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn atr_command(data_path: &Path, period: usize) -> Result<(), EngineError> {
    let bars = CsvBarSource::new(data_path.to_path_buf()).fetch_bars(None, None)?;
    write_atr_table(&bars, period, io::stdout().lock())?;
    eprintln!("{} bars, ATR({})", bars.len(), period);
    Ok(())
}
