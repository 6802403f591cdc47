//! Connection controller worker
//!
//! A single spawned task owns the observable [`WarpStatus`] and processes
//! commands strictly in order, so two operations can never interleave their
//! warp-cli invocations or their state writes. The presentation layer talks
//! to it through a [`ControllerHandle`]: commands go in over an mpsc queue,
//! state comes out over a watch channel.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::cli::WarpRunner;
use super::parser;
use crate::core::config::WarpCliConfig;
use crate::core::events::ControllerCommand;
use crate::core::state::{ConnectionState, ModeSelection, WarpStatus};

/// Owns the connection state and drives warp-cli
pub struct ConnectionController<R: WarpRunner> {
    runner: R,
    config: WarpCliConfig,
    status: WarpStatus,
    status_tx: watch::Sender<WarpStatus>,
    command_rx: mpsc::UnboundedReceiver<ControllerCommand>,
    cancel_rx: watch::Receiver<bool>,
}

/// Handle to a running controller worker
pub struct ControllerHandle {
    command_tx: mpsc::UnboundedSender<ControllerCommand>,
    status_rx: watch::Receiver<WarpStatus>,
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl<R: WarpRunner + 'static> ConnectionController<R> {
    /// Spawn the controller worker and return its handle
    pub fn spawn(config: WarpCliConfig, runner: R) -> ControllerHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(WarpStatus::default());
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let controller = Self {
            runner,
            config,
            status: WarpStatus::default(),
            status_tx,
            command_rx,
            cancel_rx,
        };
        let task = tokio::spawn(controller.run());

        ControllerHandle {
            command_tx,
            status_rx,
            cancel_tx,
            task,
        }
    }

    async fn run(mut self) {
        info!("connection controller worker started");
        while let Some(cmd) = self.command_rx.recv().await {
            let mut cancel_rx = self.cancel_rx.clone();
            tokio::select! {
                biased;
                _ = cancel_rx.changed() => {
                    info!("controller cancelled with a command in flight");
                    break;
                }
                _ = self.run_command(cmd) => {}
            }
        }
        debug!("connection controller worker stopped");
    }

    async fn run_command(&mut self, cmd: ControllerCommand) {
        match cmd {
            ControllerCommand::ToggleConnection => self.toggle_connection().await,
            ControllerCommand::RefreshStatus => self.refresh_status().await,
            ControllerCommand::SetMode(selection) => self.set_mode(selection).await,
            ControllerCommand::RefreshAccount => self.refresh_account().await,
            ControllerCommand::RegisterLicense(key) => self.register_license(&key).await,
            ControllerCommand::AcknowledgeAdvisory => {
                self.status.advisory = None;
                self.publish();
            }
        }
    }

    /// Toggle the connection.
    ///
    /// From Connected this issues a single disconnect with no confirmation
    /// poll. From Disconnected it runs the bounded connect/confirm loop:
    /// connect, wait the fixed delay, query status, up to the configured
    /// attempt limit, stopping on the first confirmed cycle. Either way the
    /// account snapshot is refreshed before the final state is published.
    async fn toggle_connection(&mut self) {
        if self.status.connection == ConnectionState::Connected {
            self.runner.run(&["disconnect"]).await;
            self.set_connection(ConnectionState::Disconnected);
            info!("disconnect issued");
            self.refresh_account().await;
            return;
        }

        self.set_connection(ConnectionState::Connecting);
        let mut confirmed = false;
        for attempt in 1..=self.config.max_connect_attempts {
            self.runner.run(&["connect"]).await;
            tokio::time::sleep(self.config.retry_delay()).await;
            confirmed = parser::status_is_connected(&self.runner.run(&["status"]).await);
            debug!(attempt, confirmed, "connect attempt finished");
            if confirmed {
                break;
            }
        }
        if !confirmed {
            // Retry exhaustion is not an error; state simply stays down
            warn!(
                attempts = self.config.max_connect_attempts,
                "connection not confirmed after retry loop"
            );
            self.status.advisory = Some("Could not confirm WARP connection".to_string());
        }
        self.refresh_account().await;
        self.set_connection(if confirmed {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        });
    }

    /// Query status once and reconcile. Empty output (which is what a
    /// failed subprocess call degrades to) fails closed to Disconnected.
    async fn refresh_status(&mut self) {
        self.set_connection(ConnectionState::Connecting);
        let output = self.runner.run(&["status"]).await;
        let connected = parser::status_is_connected(&output);
        self.set_connection(if connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        });
    }

    async fn set_mode(&mut self, selection: ModeSelection) {
        self.runner.run(&["mode", selection.cli_arg()]).await;
        self.status.mode = selection;
        self.publish();
        info!(mode = selection.label(), "operating mode set");
        self.refresh_status().await;
        self.refresh_account().await;
    }

    /// Refresh the account snapshot. A malformed or empty response keeps
    /// the previous snapshot untouched and leaves a one-shot advisory.
    async fn refresh_account(&mut self) {
        let output = self.runner.run(&["account"]).await;
        match parser::parse_account(&output) {
            Ok(snapshot) => {
                self.status.account = snapshot;
                self.publish();
            }
            Err(e) => {
                warn!("account refresh failed, keeping previous snapshot: {}", e);
                self.status.advisory = Some("Could not read account information".to_string());
                self.publish();
            }
        }
    }

    async fn register_license(&mut self, key: &str) {
        self.runner.run(&["registration", "license", key]).await;
        info!("license registration issued");
    }

    fn set_connection(&mut self, state: ConnectionState) {
        if self.status.connection != state {
            debug!(from = %self.status.connection, to = %state, "connection state change");
        }
        self.status.connection = state;
        self.publish();
    }

    fn publish(&self) {
        // Receivers may all be gone during shutdown; nothing to do then
        let _ = self.status_tx.send(self.status.clone());
    }
}

impl ControllerHandle {
    pub fn toggle_connection(&self) {
        self.send(ControllerCommand::ToggleConnection);
    }

    pub fn refresh_status(&self) {
        self.send(ControllerCommand::RefreshStatus);
    }

    pub fn set_mode(&self, selection: ModeSelection) {
        self.send(ControllerCommand::SetMode(selection));
    }

    pub fn refresh_account(&self) {
        self.send(ControllerCommand::RefreshAccount);
    }

    pub fn register_license(&self, key: impl Into<String>) {
        self.send(ControllerCommand::RegisterLicense(key.into()));
    }

    pub fn acknowledge_advisory(&self) {
        self.send(ControllerCommand::AcknowledgeAdvisory);
    }

    /// Latest published state
    pub fn status(&self) -> WarpStatus {
        self.status_rx.borrow().clone()
    }

    /// Subscribe to state updates
    pub fn subscribe(&self) -> watch::Receiver<WarpStatus> {
        self.status_rx.clone()
    }

    /// Graceful shutdown: stop accepting commands, let the worker drain the
    /// queue, and wait for it to finish
    pub async fn shutdown(self) {
        let Self {
            command_tx,
            cancel_tx,
            status_rx,
            task,
        } = self;
        drop(command_tx);
        if let Err(e) = task.await {
            warn!("controller worker panicked during shutdown: {}", e);
        }
        drop(cancel_tx);
        drop(status_rx);
    }

    /// Hard cancel: interrupt any in-flight retry loop or subprocess wait
    /// and stop without draining queued commands
    pub async fn abort(self) {
        let Self {
            command_tx,
            cancel_tx,
            status_rx,
            task,
        } = self;
        let _ = cancel_tx.send(true);
        drop(command_tx);
        if let Err(e) = task.await {
            warn!("controller worker panicked during abort: {}", e);
        }
        drop(status_rx);
    }

    fn send(&self, cmd: ControllerCommand) {
        if self.command_tx.send(cmd).is_err() {
            warn!("controller worker is gone; dropping command");
        }
    }
}
