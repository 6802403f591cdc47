//! Warp Deck - Entry Point
//!
//! Initializes logging and configuration, spawns the connection controller
//! worker, and drives it from a line-oriented stdin command interface. State
//! transitions published by the controller are echoed as they happen.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use warp_deck::{
    format_bytes, Config, ConnectionController, ControllerHandle, KeyStore, ModeSelection, WarpCli,
};

fn print_status(handle: &ControllerHandle) {
    let status = handle.status();
    println!(
        "{} [{}]  quota {}  premium data {}  account {}",
        status.connection,
        status.mode.display_label(),
        format_bytes(status.account.quota_bytes),
        format_bytes(status.account.premium_data_bytes),
        if status.account.account_type.is_empty() {
            "-"
        } else {
            status.account.account_type.as_str()
        },
    );
    if let Some(advisory) = status.advisory {
        println!("! {}", advisory);
        // Advisory messages are shown once
        handle.acknowledge_advisory();
    }
}

fn print_help() {
    println!("commands:");
    println!("  toggle            connect or disconnect");
    println!("  status            re-query warp-cli status");
    println!("  account           re-query warp-cli account");
    println!("  show              print the current state");
    println!("  mode warp|proxy   switch operating mode");
    println!("  license <key>     register and save a license key");
    println!("  keys              list saved license keys");
    println!("  keys rm <id>      delete a saved license key");
    println!("  quit              exit");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;
    let data_dir = Config::data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    // Initialize logging: stderr plus the append-only file sink
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("warp-deck.log"))
        .context("Failed to open log file")?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();

    info!("Starting warp-deck companion");

    let keys = KeyStore::open(data_dir.join("keys.json")).context("Failed to open key store")?;

    // Spawn the controller worker and apply the startup mode, then reconcile
    // once with whatever warp-cli currently reports
    let runner = WarpCli::new(&config.warp);
    let handle = ConnectionController::spawn(config.warp.clone(), runner);
    handle.set_mode(config.warp.startup_mode);
    handle.refresh_status();

    // Echo connection transitions as the controller publishes them
    let mut status_rx = handle.subscribe();
    tokio::spawn(async move {
        let mut last = status_rx.borrow().clone();
        while status_rx.changed().await.is_ok() {
            let status = status_rx.borrow().clone();
            if status.connection != last.connection {
                println!("-> {} [{}]", status.connection, status.mode.display_label());
            }
            last = status;
        }
    });

    print_help();
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] => {}
            ["toggle"] => handle.toggle_connection(),
            ["status"] => handle.refresh_status(),
            ["account"] => handle.refresh_account(),
            ["show"] => print_status(&handle),
            ["mode", "warp"] => handle.set_mode(ModeSelection::Warp1111),
            ["mode", "proxy"] => handle.set_mode(ModeSelection::Direct1111),
            ["license", key] => {
                handle.register_license(*key);
                if !keys.add(key) {
                    println!("could not save license key");
                }
            }
            ["keys"] => {
                for key in keys.list() {
                    println!("{:>3}  {}", key.id, key.key_id);
                }
            }
            ["keys", "rm", id] => match id.parse() {
                Ok(id) => {
                    if !keys.delete(id) {
                        println!("no key with id {}", id);
                    }
                }
                Err(_) => println!("usage: keys rm <id>"),
            },
            ["help"] => print_help(),
            ["quit"] | ["exit"] => break,
            _ => println!("unknown command; try 'help'"),
        }
    }

    info!("Shutting down");
    handle.shutdown().await;

    Ok(())
}
