//! Consolidation Signals Main Entry Point

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use consolidation_signals::{CandleRequest, ConsolidationSignalStrategy, JsonFileProvider};
use std::path::PathBuf;
use strategy_config::ServiceSettings;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use types::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Consolidation heatmaps only
    Heatmap,
    /// Signals, price data and summary
    Signals,
    /// Everything
    Report,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment overlay loaded from environments/<name>.toml next to the config file
    #[arg(long, env = "CONSOLIDATION_ENV")]
    environment: Option<String>,

    /// JSON kline snapshot to analyse
    #[arg(long)]
    candles: Option<PathBuf>,

    /// Lookback window in days (clamped to 7..=365)
    #[arg(short, long)]
    days: Option<u32>,

    #[arg(short, long)]
    symbol: Option<String>,

    /// Candle interval, e.g. 1h, 4h, 1d
    #[arg(short, long)]
    interval: Option<String>,

    #[arg(short, long, value_enum, default_value_t = Mode::Report)]
    mode: Mode,

    /// Include engine transition events in the output
    #[arg(long)]
    trace: bool,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = ServiceSettings::load(args.config.as_deref(), args.environment.as_deref())
        .context("Failed to load consolidation settings")?;

    init_logging(&settings.log_level);

    info!("Starting consolidation signal analysis");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    apply_overrides(&mut settings, &args)?;

    let Some(candle_file) = settings.candle_file.clone() else {
        bail!("No candle file configured: pass --candles or set candle_file");
    };

    let strategy = ConsolidationSignalStrategy::new(settings.engine.clone())
        .context("Invalid engine configuration")?;
    let provider = JsonFileProvider::new(candle_file);
    let request = CandleRequest::from_settings(&settings);

    let report = strategy
        .run(&provider, &request)
        .await
        .context("Consolidation analysis failed")?;

    let json = match args.mode {
        Mode::Heatmap => serde_json::to_string_pretty(&report.consolidation)?,
        Mode::Signals => serde_json::to_string_pretty(&report.trading)?,
        Mode::Report => serde_json::to_string_pretty(&report)?,
    };

    match &settings.output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            info!("Report written to {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Logs go to stderr so the JSON on stdout stays machine-readable
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "consolidation_signals={},strategy_config={},warn",
            level, level
        )
        .into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn apply_overrides(settings: &mut ServiceSettings, args: &Args) -> Result<()> {
    if let Some(path) = &args.candles {
        settings.candle_file = Some(path.clone());
    }
    if let Some(days) = args.days {
        settings.lookback_days = days;
    }
    if let Some(symbol) = &args.symbol {
        settings.symbol = symbol.clone();
    }
    if let Some(interval) = &args.interval {
        settings.interval = interval
            .parse::<Interval>()
            .with_context(|| format!("Unsupported interval {:?}", interval))?;
    }
    if let Some(path) = &args.output {
        settings.output = Some(path.clone());
    }
    if args.trace {
        settings.engine.collect_trace = true;
    }
    settings.expand_env_vars()?;
    Ok(())
}
