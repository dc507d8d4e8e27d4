//! Interactive console: on-demand scans and ledger maintenance

use crate::error::{Result, ScanError};
use crate::overview::{format_idr, format_price};
use crate::scanner::{InteractiveOutcome, Scanner};
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};
use types::{Pair, Timeframe};

pub const HELP: &str = "\
Commands:
  scan <pair> [timeframe]   scan one pair now (timeframes: 5min 15min 30min 1H 4H 1D)
  overview [n]              classify all tickers, show the top n rows (default 10)
  sent                      list alerts recorded as sent
  reset                     forget sent alerts so they can be sent again
  help                      show this text
  quit                      leave the console";

const DEFAULT_OVERVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scan {
        pair: Pair,
        timeframe: Option<Timeframe>,
    },
    Overview {
        rows: usize,
    },
    Sent,
    Reset,
    Help,
    Quit,
}

/// Parse one console line; blank lines yield `None`
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("scan", [pair]) => Command::Scan {
            pair: pair.parse()?,
            timeframe: None,
        },
        ("scan", [pair, tf]) => Command::Scan {
            pair: pair.parse()?,
            timeframe: Some(tf.parse()?),
        },
        ("overview", []) => Command::Overview {
            rows: DEFAULT_OVERVIEW_ROWS,
        },
        ("overview", [n]) => Command::Overview {
            rows: n
                .parse()
                .map_err(|_| ScanError::InvalidCommand(format!("overview {}", n)))?,
        },
        ("sent", []) => Command::Sent,
        ("reset", []) => Command::Reset,
        ("help" | "?", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(ScanError::InvalidCommand(line.trim().to_string())),
    };
    Ok(Some(command))
}

/// How a console session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Quit,
    EndOfInput,
}

/// Read commands until `quit` or end of input
pub async fn run_console<R, W>(scanner: &Scanner, reader: R, mut writer: W) -> Result<ConsoleExit>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    writer.write_all(b"Type 'help' for commands.\n").await?;
    writer.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writer.write_all(format!("{}\n", e).as_bytes()).await?;
                writer.flush().await?;
                continue;
            }
        };
        if command == Command::Quit {
            return Ok(ConsoleExit::Quit);
        }
        let output = execute(scanner, command).await;
        writer.write_all(output.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(ConsoleExit::EndOfInput)
}

/// Serve the console until `quit` or until `shutdown` resolves
///
/// End of input (a closed or non-interactive stdin) does not stop the
/// process; it keeps waiting on `shutdown`.
pub async fn run_foreground<R, W, S>(scanner: &Scanner, reader: R, writer: W, shutdown: S) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    tokio::select! {
        exit = run_console(scanner, reader, writer) => {
            if exit? == ConsoleExit::Quit {
                return Ok(());
            }
            info!("Console input closed, background jobs keep running");
        }
        _ = &mut shutdown => return Ok(()),
    }
    shutdown.await;
    Ok(())
}

async fn execute(scanner: &Scanner, command: Command) -> String {
    match command {
        Command::Scan { pair, timeframe } => {
            let timeframe = timeframe.unwrap_or(scanner.scan_config().interactive_timeframe);
            match scanner.scan_selected(&pair, timeframe).await {
                Ok(InteractiveOutcome::NoSignal) => {
                    format!("No signal on {} ({})", pair.display_upper(), timeframe)
                }
                Ok(InteractiveOutcome::AlreadySent { signal_text }) => format!(
                    "Already sent for {}: {}",
                    pair.display_upper(),
                    signal_text
                ),
                Ok(InteractiveOutcome::Sent { message }) => format!("Sent:\n{}", message),
                Ok(InteractiveOutcome::DeliveryFailed { message }) => {
                    format!("Delivery failed, not recorded:\n{}", message)
                }
                Err(e) => {
                    warn!("Interactive scan of {} failed: {}", pair, e);
                    format!("Scan failed: {}", e)
                }
            }
        }
        Command::Overview { rows } => match scanner.market_overview(rows).await {
            Ok(overview) => {
                let mut out = format!(
                    "{:<12} {:>20} {:<12} {:<15} {:<16} {:>8}",
                    "PAIR", "LAST", "SIGNAL", "SUGGESTION", "PRESSURE", "SPIKE%"
                );
                for row in overview.rows.iter().take(rows) {
                    out.push_str(&format!(
                        "\n{:<12} {:>20} {:<12} {:<15} {:<16} {:>8}",
                        row.pair.display_upper(),
                        format_price(row.last, &row.pair),
                        row.classification.as_str(),
                        row.suggestion,
                        row.pressure,
                        row.spike_pct.round_dp(2)
                    ));
                }
                if let Some((pair, ticker)) = overview.movers.volume.first() {
                    out.push_str(&format!(
                        "\nTop volume: {} ({} IDR)",
                        pair.display_upper(),
                        format_idr(ticker.vol_idr)
                    ));
                }
                out
            }
            Err(e) => format!("Overview failed: {}", e),
        },
        Command::Sent => {
            let records = scanner.ledger().records();
            if records.is_empty() {
                return "No alerts sent yet".to_string();
            }
            records
                .iter()
                .map(|r| {
                    format!(
                        "{} {} {}",
                        r.sent_at.format("%Y-%m-%d %H:%M:%S"),
                        r.pair.display_upper(),
                        r.signal_text
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Command::Reset => format!("Cleared {} sent alerts", scanner.ledger().reset()),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan() {
        assert_eq!(
            parse_command("scan BTC_IDR").unwrap(),
            Some(Command::Scan {
                pair: Pair::new("btc_idr").unwrap(),
                timeframe: None
            })
        );
        assert_eq!(
            parse_command("  SCAN eth_idr 4h ").unwrap(),
            Some(Command::Scan {
                pair: Pair::new("eth_idr").unwrap(),
                timeframe: Some(Timeframe::FourHours)
            })
        );
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("overview").unwrap(), Some(Command::Overview { rows: 10 }));
        assert_eq!(parse_command("overview 3").unwrap(), Some(Command::Overview { rows: 3 }));
        assert_eq!(parse_command("exit").unwrap(), Some(Command::Quit));
        assert_eq!(parse_command("reset").unwrap(), Some(Command::Reset));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_command("buy btc_idr"), Err(ScanError::InvalidCommand(_))));
        assert!(matches!(parse_command("scan"), Err(ScanError::InvalidCommand(_))));
        assert!(matches!(parse_command("scan btc/idr"), Err(ScanError::Identifier(_))));
        assert!(matches!(parse_command("scan btc_idr 2H"), Err(ScanError::Identifier(_))));
        assert!(matches!(parse_command("overview many"), Err(ScanError::InvalidCommand(_))));
    }
}
