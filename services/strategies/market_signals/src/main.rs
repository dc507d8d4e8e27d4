//! Indodax market signal scanner entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indodax_adapter::IndodaxClient;
use market_signals::console::run_foreground;
use market_signals::logging::init_logging;
use market_signals::{
    CsvAuditLog, InteractiveOutcome, MarketSignalBoard, Scanner, ScannerParts, SignalLedger,
    SignalLog, SignalService, SignalsConfig,
};
use notifier::TelegramNotifier;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::signal;
use tracing::{error, info, warn};
use types::{Pair, Timeframe};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file; `SIGNALS_*` environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scheduled scanner with the interactive console (default)
    Run {
        /// Only run the background jobs
        #[arg(long)]
        no_console: bool,
    },
    /// Scan one pair now and notify if a new signal is found
    Scan {
        pair: Pair,
        #[arg(short, long)]
        timeframe: Option<Timeframe>,
    },
    /// Run one auto-scan batch and exit
    Batch,
    /// Print the classified market overview
    Overview {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Print the effective configuration with secrets redacted
    PrintConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = SignalsConfig::load(args.config.as_deref())
        .context("Failed to load scanner configuration")?;
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    init_logging(&config.log_level)?;

    let command = args.command.unwrap_or(Command::Run { no_console: false });
    if let Command::PrintConfig = command {
        let mut redacted = config.clone();
        if redacted.telegram.token.is_some() {
            redacted.telegram.token = Some("<redacted>".to_string());
        }
        println!("{}", toml::to_string_pretty(&redacted).context("Failed to render configuration")?);
        return Ok(());
    }

    info!("Starting Indodax signal scanner v{}", env!("CARGO_PKG_VERSION"));
    let scanner = Arc::new(build_scanner(&config)?);

    match command {
        Command::Scan { pair, timeframe } => {
            let timeframe = timeframe.unwrap_or(config.scan.interactive_timeframe);
            match scanner.scan_selected(&pair, timeframe).await? {
                InteractiveOutcome::NoSignal => println!("No signal on {} ({})", pair.display_upper(), timeframe),
                InteractiveOutcome::AlreadySent { signal_text } => println!("Already sent: {}", signal_text),
                InteractiveOutcome::Sent { message } => println!("{}", message),
                InteractiveOutcome::DeliveryFailed { message } => {
                    warn!("Telegram delivery failed");
                    println!("{}", message);
                }
            }
        }
        Command::Batch => {
            let report = scanner.run_batch(None).await;
            println!("{:?}", report);
        }
        Command::Overview { top } => {
            let overview = scanner.market_overview(top).await?;
            for row in overview.rows.iter().take(top) {
                println!(
                    "{:<12} {:>20} {:<12} {:<15} {}",
                    row.pair.display_upper(),
                    market_signals::format_price(row.last, &row.pair),
                    row.classification,
                    row.suggestion,
                    row.pressure
                );
            }
        }
        Command::Run { no_console } => run_service(scanner, config, no_console).await?,
        Command::PrintConfig => {}
    }

    Ok(())
}

fn build_scanner(config: &SignalsConfig) -> Result<Scanner> {
    let client = IndodaxClient::new(config.indodax.clone()).context("Failed to build Indodax client")?;
    let notifier = TelegramNotifier::new(config.telegram.clone());
    if !notifier.is_enabled() {
        warn!("Telegram token or chat id missing, alerts will only be logged");
    }

    let parts = ScannerParts {
        source: Arc::new(client),
        notifier: Arc::new(notifier),
        ledger: Arc::new(SignalLedger::new()),
        audit: Arc::new(CsvAuditLog::new(&config.audit.scan_log_path)),
        signal_log: Arc::new(SignalLog::new(&config.audit.signal_log_path)),
        board: Arc::new(MarketSignalBoard::new()),
    };
    Ok(Scanner::new(parts, config))
}

async fn run_service(scanner: Arc<Scanner>, config: SignalsConfig, no_console: bool) -> Result<()> {
    let mut service = SignalService::new(scanner.clone(), config);
    service.start().await;

    if no_console {
        info!("Signal scanner running. Press Ctrl+C to stop.");
        signal::ctrl_c().await.context("Failed to listen for shutdown signal")?;
    } else {
        let stdin = BufReader::new(tokio::io::stdin());
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
        };
        run_foreground(&scanner, stdin, tokio::io::stdout(), ctrl_c)
            .await
            .context("Console failed")?;
    }

    info!("Shutting down signal scanner");
    service.shutdown().await;
    Ok(())
}
