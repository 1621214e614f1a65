//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export_adapter::CsvExportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_strategy, BacktestResult};
use crate::domain::config_validation::{parse_windows, validate_config, validate_threshold};
use crate::domain::engine::{compute_indicators, IndicatorConfig};
use crate::domain::error::StockboardError;
use crate::domain::lookback::Lookback;
use crate::domain::metrics::TradeStats;
use crate::domain::ohlcv::{validate_bars, OhlcvBar};
use crate::domain::signal::{SignalStrategy, DEFAULT_RSI_LOWER, DEFAULT_RSI_UPPER};
use crate::domain::snapshot::Snapshot;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "stockboard",
    about = "Technical indicators, signals and backtests over daily price history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators and print the latest snapshot
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: Option<String>,
        /// 1y, 3y, 5y, 10y or max
        #[arg(short, long)]
        lookback: Option<String>,
        /// Write the full indicator table as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a signal strategy through the backtester
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: Option<String>,
        #[arg(short, long)]
        lookback: Option<String>,
        /// macd, rsi or stochastic
        #[arg(short, long)]
        strategy: Option<String>,
        /// Write the trade list as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List tickers available in the data directory
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Indicators {
            config,
            ticker,
            lookback,
            output,
        } => run_indicators(
            &config,
            ticker.as_deref(),
            lookback.as_deref(),
            output.as_ref(),
        ),
        Command::Backtest {
            config,
            ticker,
            lookback,
            strategy,
            output,
        } => run_backtest(
            &config,
            ticker.as_deref(),
            lookback.as_deref(),
            strategy.as_deref(),
            output.as_ref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::ListTickers { config } => run_list_tickers(&config),
    }
}

fn fail(err: &StockboardError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Loads and validates the INI file, printing any error.
pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| fail(&e))?;
    validate_config(&adapter).map_err(|e| fail(&e))?;
    Ok(adapter)
}

pub fn data_dir(config: &dyn ConfigPort) -> Result<PathBuf, StockboardError> {
    config
        .get_string("data", "dir")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| StockboardError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })
}

pub fn resolve_ticker(
    ticker_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, StockboardError> {
    if let Some(t) = ticker_override.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(t.to_string());
    }
    config
        .get_string("data", "ticker")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| StockboardError::ConfigMissing {
            section: "data".into(),
            key: "ticker".into(),
        })
}

pub fn resolve_lookback(
    lookback_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Lookback, StockboardError> {
    match lookback_override {
        Some(s) => s.parse().map_err(|reason| StockboardError::ConfigInvalid {
            section: "data".into(),
            key: "lookback".into(),
            reason,
        }),
        None => match config.get_string("data", "lookback") {
            Some(s) => s.parse().map_err(|reason| StockboardError::ConfigInvalid {
                section: "data".into(),
                key: "lookback".into(),
                reason,
            }),
            None => Ok(Lookback::default()),
        },
    }
}

fn get_period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, StockboardError> {
    let value = config.get_int("indicators", key, default as i64);
    usize::try_from(value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or_else(|| StockboardError::ConfigInvalid {
            section: "indicators".into(),
            key: key.into(),
            reason: format!("{} must be at least 1", key),
        })
}

fn get_windows(
    config: &dyn ConfigPort,
    key: &str,
    default: Vec<usize>,
) -> Result<Vec<usize>, StockboardError> {
    match config.get_string("indicators", key) {
        Some(s) => parse_windows(&s).map_err(|reason| StockboardError::ConfigInvalid {
            section: "indicators".into(),
            key: key.into(),
            reason,
        }),
        None => Ok(default),
    }
}

pub fn build_indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, StockboardError> {
    let defaults = IndicatorConfig::default();
    let built = IndicatorConfig {
        sma_windows: get_windows(config, "sma_windows", defaults.sma_windows)?,
        ema_windows: get_windows(config, "ema_windows", defaults.ema_windows)?,
        macd_fast: get_period(config, "macd_fast", defaults.macd_fast)?,
        macd_slow: get_period(config, "macd_slow", defaults.macd_slow)?,
        macd_signal: get_period(config, "macd_signal", defaults.macd_signal)?,
        rsi_period: get_period(config, "rsi_period", defaults.rsi_period)?,
        stoch_period: get_period(config, "stoch_period", defaults.stoch_period)?,
        stoch_smooth: get_period(config, "stoch_smooth", defaults.stoch_smooth)?,
    };
    built.validate()?;
    Ok(built)
}

/// Strategy from `--strategy` or `[strategy] kind`; RSI bounds always come from config.
pub fn build_strategy(
    strategy_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<SignalStrategy, StockboardError> {
    let kind = strategy_override
        .map(str::to_string)
        .or_else(|| config.get_string("strategy", "kind"))
        .unwrap_or_else(|| "macd".to_string());

    let strategy: SignalStrategy =
        kind.parse()
            .map_err(|reason| StockboardError::ConfigInvalid {
                section: "strategy".into(),
                key: "kind".into(),
                reason,
            })?;

    Ok(match strategy {
        SignalStrategy::RsiThreshold { .. } => SignalStrategy::RsiThreshold {
            lower: validate_threshold(config, "rsi_lower", DEFAULT_RSI_LOWER)?,
            upper: validate_threshold(config, "rsi_upper", DEFAULT_RSI_UPPER)?,
        },
        other => other,
    })
}

/// Everything a data command needs from config plus command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub data_dir: PathBuf,
    pub ticker: String,
    pub lookback: Lookback,
    pub indicators: IndicatorConfig,
}

impl RunSettings {
    pub fn resolve(
        config: &dyn ConfigPort,
        ticker_override: Option<&str>,
        lookback_override: Option<&str>,
    ) -> Result<Self, StockboardError> {
        Ok(Self {
            data_dir: data_dir(config)?,
            ticker: resolve_ticker(ticker_override, config)?,
            lookback: resolve_lookback(lookback_override, config)?,
            indicators: build_indicator_config(config)?,
        })
    }
}

/// Fetches the full history, validates it, then narrows it to the lookback window.
pub fn load_bars(
    data_port: &dyn DataPort,
    ticker: &str,
    lookback: Lookback,
) -> Result<Vec<OhlcvBar>, StockboardError> {
    let history = data_port.fetch_bars(ticker)?;
    validate_bars(&history)?;

    let window = lookback.apply(&history);
    if window.is_empty() {
        return Err(StockboardError::NoData {
            ticker: ticker.to_string(),
        });
    }
    debug!(
        ticker,
        total = history.len(),
        kept = window.len(),
        %lookback,
        "applied lookback window"
    );
    Ok(window.to_vec())
}

fn warn_short_history(bars: &[OhlcvBar], config: &IndicatorConfig) {
    if let Some(&longest) = config.sma_windows.iter().max() {
        if bars.len() < longest {
            warn!(
                bars = bars.len(),
                window = longest,
                "history shorter than longest moving average; it stays undefined"
            );
        }
    }
}

fn run_indicators(
    config_path: &PathBuf,
    ticker_override: Option<&str>,
    lookback_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let settings = match RunSettings::resolve(&adapter, ticker_override, lookback_override) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let data_port = CsvAdapter::new(settings.data_dir);
    let report_port = CsvExportAdapter::new();
    run_indicators_pipeline(
        &data_port,
        &report_port,
        &settings.ticker,
        settings.lookback,
        &settings.indicators,
        output_path,
    )
}

pub fn run_indicators_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    ticker: &str,
    lookback: Lookback,
    indicator_config: &IndicatorConfig,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let bars = match load_bars(data_port, ticker, lookback) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };
    info!(ticker, bars = bars.len(), %lookback, "computing indicators");
    warn_short_history(&bars, indicator_config);

    let indicators = match compute_indicators(&bars, indicator_config) {
        Ok(set) => set,
        Err(e) => return fail(&StockboardError::from(e)),
    };
    let snapshot = match Snapshot::from_indicators(&bars, &indicators) {
        Ok(s) => s,
        Err(e) => return fail(&StockboardError::from(e)),
    };

    println!("=== {} ({}) ===", ticker, lookback);
    println!("{snapshot}");

    if let Some(path) = output_path {
        if let Err(e) = report_port.write_indicators(&bars, &indicators, path) {
            return fail(&e);
        }
        eprintln!("\nIndicators written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn run_backtest(
    config_path: &PathBuf,
    ticker_override: Option<&str>,
    lookback_override: Option<&str>,
    strategy_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let settings = match RunSettings::resolve(&adapter, ticker_override, lookback_override) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let strategy = match build_strategy(strategy_override, &adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let data_port = CsvAdapter::new(settings.data_dir);
    let report_port = CsvExportAdapter::new();
    run_backtest_pipeline(
        &data_port,
        &report_port,
        &settings.ticker,
        settings.lookback,
        &settings.indicators,
        &strategy,
        output_path,
    )
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    ticker: &str,
    lookback: Lookback,
    indicator_config: &IndicatorConfig,
    strategy: &SignalStrategy,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let bars = match load_bars(data_port, ticker, lookback) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };
    info!(ticker, bars = bars.len(), strategy = strategy.name(), "running backtest");

    let result = match compute_indicators(&bars, indicator_config)
        .and_then(|set| run_strategy(&bars, &set, strategy))
    {
        Ok(r) => r,
        Err(e) => return fail(&StockboardError::from(e)),
    };
    let stats = TradeStats::compute(&result);

    println!("=== {} ({}) {} ===", ticker, lookback, strategy);
    print_trades(&bars, &result);
    print_stats(&stats);

    if let Some(open) = &result.open_position {
        warn!(
            entry_index = open.entry_index,
            "position still open at last bar; excluded from statistics"
        );
    }

    if let Some(path) = output_path {
        if let Err(e) = report_port.write_trades(&bars, &result, path) {
            return fail(&e);
        }
        eprintln!("\nTrades written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn print_trades(bars: &[OhlcvBar], result: &BacktestResult) {
    if result.trades.is_empty() {
        println!("No completed trades");
    } else {
        println!(
            "{:<12} {:>10}  {:<12} {:>10} {:>10} {:>8}",
            "Entry", "Price", "Exit", "Price", "PnL", "Return"
        );
        for t in &result.trades {
            println!(
                "{:<12} {:>10.2}  {:<12} {:>10.2} {:>+10.2} {:>+7.2}%",
                bars[t.entry_index].date,
                t.entry_price,
                bars[t.exit_index].date,
                t.exit_price,
                t.pnl(),
                t.return_pct() * 100.0,
            );
        }
    }
    if let Some(open) = &result.open_position {
        println!(
            "{:<12} {:>10.2}  (open)",
            bars[open.entry_index].date, open.entry_price
        );
    }
}

fn print_stats(stats: &TradeStats) {
    println!("\n=== Statistics ===");
    println!("Total Trades:     {}", stats.total_trades);
    println!(
        "Won/Lost/Even:    {}/{}/{}",
        stats.trades_won, stats.trades_lost, stats.trades_breakeven
    );
    println!("Win Rate:         {:.1}%", stats.win_rate * 100.0);
    println!("Total PnL:        {:+.2}", stats.total_pnl);
    println!("Total Return:     {:.2}%", stats.total_return * 100.0);
    println!("Profit Factor:    {:.2}", stats.profit_factor);
    println!("Avg Win:          {:.2}", stats.avg_win);
    println!("Avg Loss:         {:.2}", stats.avg_loss);
    println!("Largest Win:      {:.2}", stats.largest_win);
    println!("Largest Loss:     {:.2}", stats.largest_loss);
    println!("Avg Holding:      {:.1} bars", stats.avg_holding_bars);
}

pub fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let indicator_config = match build_indicator_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let strategy = match build_strategy(None, &adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let lookback = match resolve_lookback(None, &adapter) {
        Ok(l) => l,
        Err(e) => return fail(&e),
    };

    let windows: Vec<String> = indicator_config
        .sma_windows
        .iter()
        .map(|w| w.to_string())
        .collect();
    eprintln!("Config validated successfully");
    eprintln!("  SMA windows: {}", windows.join(", "));
    eprintln!(
        "  MACD:        {}/{}/{}",
        indicator_config.macd_fast, indicator_config.macd_slow, indicator_config.macd_signal
    );
    eprintln!("  RSI period:  {}", indicator_config.rsi_period);
    eprintln!(
        "  Stochastic:  {}/{}",
        indicator_config.stoch_period, indicator_config.stoch_smooth
    );
    eprintln!("  Strategy:    {}", strategy);
    eprintln!("  Lookback:    {}", lookback);
    ExitCode::SUCCESS
}

fn run_list_tickers(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let dir = match data_dir(&adapter) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let data_port = CsvAdapter::new(dir);
    match data_port.list_tickers() {
        Ok(tickers) => {
            if tickers.is_empty() {
                eprintln!("No tickers found");
            }
            for t in &tickers {
                println!("{t}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
