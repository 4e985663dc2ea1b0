// Subcommand handlers

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::{MetaArgs, PushArgs};
use crate::config::Config;
use crate::score::{GameMeta, ScoreBoard, ScorePusher, Side};
use crate::service::{DiscoveryMonitor, MdnsBrowser, StatusEvent, StatusObserver};

fn start_monitor(
    config: &Config,
    observer: Arc<dyn StatusObserver>,
) -> Result<(DiscoveryMonitor, Arc<MdnsBrowser>)> {
    let browser = Arc::new(MdnsBrowser::new().context("Failed to start mDNS browser")?);
    let monitor = DiscoveryMonitor::new(browser.clone(), observer, config.discovery.clone());
    monitor.start();
    Ok((monitor, browser))
}

async fn shutdown(monitor: DiscoveryMonitor, browser: Arc<MdnsBrowser>) {
    monitor.stop().await;
    if let Err(e) = browser.shutdown() {
        tracing::debug!(error = %e, "mDNS daemon shutdown failed");
    }
}

/// `scorelink watch`
pub async fn watch(config: Config) -> Result<()> {
    let observer: Arc<dyn StatusObserver> = Arc::new(|status: &StatusEvent| {
        println!("{}", status);
    });
    let (monitor, browser) = start_monitor(&config, observer)?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    shutdown(monitor, browser).await;
    Ok(())
}

/// `scorelink push`
pub async fn push(config: Config, args: PushArgs) -> Result<()> {
    let pusher = ScorePusher::new(&config.push)?;

    let (found_tx, mut found_rx) = mpsc::unbounded_channel();
    let observer: Arc<dyn StatusObserver> = Arc::new(move |status: &StatusEvent| {
        if let StatusEvent::Connected { address, .. } = status {
            let _ = found_tx.send(address.clone());
        }
    });
    let (monitor, browser) = start_monitor(&config, observer)?;

    let wait = Duration::from_secs(args.wait_secs);
    let address = tokio::time::timeout(wait, found_rx.recv()).await;
    let address = match address {
        Ok(Some(address)) => address,
        _ => {
            shutdown(monitor, browser).await;
            bail!(
                "No display server matching '{}' found within {}s",
                config.discovery.target_name,
                args.wait_secs
            );
        }
    };

    let snapshot = ScoreBoard::new(args.team_a_score, args.team_b_score)
        .snapshot(&args.meta.into_meta(&config.game.event_name));
    println!(
        "Pushing {}:{} to {}",
        snapshot.team_a_score, snapshot.team_b_score, address
    );
    // Outcome is in the log; the push never fails outward.
    let _ = pusher.update_scores(&address, snapshot).await;

    shutdown(monitor, browser).await;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Increment(Side),
    Decrement(Side),
    Reset,
    Status,
    Quit,
}

impl ConsoleCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "a+" => Some(ConsoleCommand::Increment(Side::A)),
            "a-" => Some(ConsoleCommand::Decrement(Side::A)),
            "b+" => Some(ConsoleCommand::Increment(Side::B)),
            "b-" => Some(ConsoleCommand::Decrement(Side::B)),
            "reset" => Some(ConsoleCommand::Reset),
            "status" | "s" => Some(ConsoleCommand::Status),
            "quit" | "q" | "exit" => Some(ConsoleCommand::Quit),
            _ => None,
        }
    }
}

/// Apply a console command. Returns true when the score changed.
pub fn apply_console_command(board: &mut ScoreBoard, command: ConsoleCommand) -> bool {
    match command {
        ConsoleCommand::Increment(side) => {
            board.increment(side);
            true
        }
        ConsoleCommand::Decrement(side) => board.decrement(side),
        ConsoleCommand::Reset => {
            let changed = *board != ScoreBoard::default();
            board.reset();
            changed
        }
        ConsoleCommand::Status | ConsoleCommand::Quit => false,
    }
}

/// `scorelink run`
pub async fn run(config: Config, meta: MetaArgs) -> Result<()> {
    let pusher = ScorePusher::new(&config.push)?;
    let meta: GameMeta = meta.into_meta(&config.game.event_name);

    let observer: Arc<dyn StatusObserver> = Arc::new(|status: &StatusEvent| {
        let dot = if status.is_connected() { "●" } else { "○" };
        println!("{} {}", dot, status);
    });
    let (monitor, browser) = start_monitor(&config, observer)?;

    let mut board = ScoreBoard::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => line.context("Failed to read from stdin")?,
        };
        let Some(line) = line else {
            break;
        };

        let Some(command) = ConsoleCommand::parse(&line) else {
            if !line.trim().is_empty() {
                println!("Unknown command: {} (a+ a- b+ b- reset status quit)", line.trim());
            }
            continue;
        };

        match command {
            ConsoleCommand::Quit => break,
            ConsoleCommand::Status => {
                let connection = monitor
                    .address()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "not connected".to_string());
                println!(
                    "{} {} : {} {} ({})",
                    meta.team_a,
                    board.score(Side::A),
                    board.score(Side::B),
                    meta.team_b,
                    connection
                );
            }
            command => {
                if !apply_console_command(&mut board, command) {
                    continue;
                }
                println!("{} : {}", board.score(Side::A), board.score(Side::B));
                match monitor.address() {
                    // Detached; a newer push supersedes this one anyway.
                    Some(address) => drop(pusher.update_scores(&address, board.snapshot(&meta))),
                    None => tracing::debug!("No display server known, update not sent"),
                }
            }
        }
    }

    shutdown(monitor, browser).await;
    Ok(())
}
