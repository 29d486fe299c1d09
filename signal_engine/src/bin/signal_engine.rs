use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use market_data::{models::timeframe::TimeFrame, providers::binance_rest::BinanceProvider};
use signal_engine::{analysis::Analyzer, config::AnalyzerConfig, report::Report};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Technical signals for crypto pairs")]
struct Cli {
    /// TOML file overriding the default analyzer settings.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the result as JSON instead of a text report.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Signals across all configured timeframes, with key levels and a trade plan.
    Analyze {
        /// Pair or base asset, e.g. BTC or ETH/USDC.
        symbol: String,
    },
    /// Indicator read-out and signal for one timeframe.
    Single {
        symbol: String,
        /// Bar size, e.g. 15m, 1h, 1d.
        timeframe: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    let provider = BinanceProvider::new(config.provider.to_binance_config())?;
    let analyzer = Analyzer::new(provider, config);

    match cli.cmd {
        Cmd::Analyze { symbol } => {
            let symbol = analyzer.parse_symbol(&symbol)?;
            let result = analyzer.analyze(&symbol).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", Report(&result));
            }
        }
        Cmd::Single { symbol, timeframe } => {
            let symbol = analyzer.parse_symbol(&symbol)?;
            let timeframe: TimeFrame = timeframe
                .parse()
                .map_err(signal_engine::errors::SignalError::from)?;
            let result = analyzer.analyze_timeframe(&symbol, timeframe).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", Report(&result));
            }
        }
    }

    Ok(())
}
