//! Subprocess execution primitive for the external warp-cli tool

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::core::config::WarpCliConfig;

/// The single seam through which the controller reaches the external tool.
///
/// Implementations return captured stdout text. Timeout, launch failure, and
/// non-zero exit all degrade to the empty string: the caller cannot tell
/// "timed out" apart from "tool emitted nothing".
pub trait WarpRunner: Send + Sync {
    /// Run one warp-cli subcommand and capture its stdout
    fn run(&self, args: &[&str]) -> impl Future<Output = String> + Send;
}

/// Production runner that spawns the configured `warp-cli` binary
#[derive(Debug, Clone)]
pub struct WarpCli {
    cli_path: String,
    timeout: Duration,
}

impl WarpCli {
    pub fn new(config: &WarpCliConfig) -> Self {
        Self {
            cli_path: config.cli_path.clone(),
            timeout: config.command_timeout(),
        }
    }
}

impl WarpRunner for WarpCli {
    fn run(&self, args: &[&str]) -> impl Future<Output = String> + Send {
        let cli_path = self.cli_path.clone();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let timeout = self.timeout;
        async move { run_command(&cli_path, &args, timeout).await }
    }
}

async fn run_command(cli_path: &str, args: &[String], timeout: Duration) -> String {
    let mut cmd = Command::new(cli_path);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        // Dropping the in-flight future on timeout must not leave the child
        // running
        .kill_on_drop(true);

    debug!(cli = cli_path, ?args, "running warp-cli");

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(cli = cli_path, "failed to launch warp-cli: {}", e);
            return String::new();
        }
    };

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).into_owned()
        }
        Ok(Ok(output)) => {
            debug!(code = ?output.status.code(), ?args, "warp-cli exited non-zero");
            String::new()
        }
        Ok(Err(e)) => {
            warn!(?args, "failed to collect warp-cli output: {}", e);
            String::new()
        }
        Err(_) => {
            warn!(?args, timeout_ms = timeout.as_millis() as u64, "warp-cli timed out");
            String::new()
        }
    }
}
