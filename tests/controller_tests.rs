//! Controller integration tests
//!
//! Drive the controller worker against a scripted runner and assert on the
//! warp-cli invocations it issues and the states it publishes. Timing tests
//! run on the paused tokio clock, so the fixed retry delays are observed
//! without real waiting.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use warp_deck::{
    ConnectionController, ConnectionState, ControllerHandle, ModeSelection, WarpCliConfig,
    WarpRunner,
};

const ACCOUNT_OK: &str = "Account type: Free\nQuota: 1000\nPremium Data: 500\n";
const STATUS_UP: &str = "Status update: Connected\n";
const STATUS_DOWN: &str = "Status update: Disconnected. Reason: Manual Disconnection\n";

#[derive(Clone, Default)]
struct MockRunner {
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Default)]
struct MockInner {
    status_responses: VecDeque<String>,
    account_response: String,
    calls: Vec<Vec<String>>,
}

impl MockRunner {
    fn new() -> Self {
        Self::default()
    }

    fn push_status(&self, response: &str) {
        self.inner
            .lock()
            .status_responses
            .push_back(response.to_string());
    }

    fn set_account(&self, response: &str) {
        self.inner.lock().account_response = response.to_string();
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.inner.lock().calls.clone()
    }

    fn count(&self, subcommand: &str) -> usize {
        self.calls().iter().filter(|c| c[0] == subcommand).count()
    }
}

impl WarpRunner for MockRunner {
    fn run(&self, args: &[&str]) -> impl Future<Output = String> + Send {
        let inner = self.inner.clone();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        async move {
            let mut mock = inner.lock();
            mock.calls.push(args.clone());
            match args[0].as_str() {
                // Scripted responses; an exhausted script degrades to empty
                // output just like a failed subprocess call
                "status" => mock.status_responses.pop_front().unwrap_or_default(),
                "account" => mock.account_response.clone(),
                _ => String::new(),
            }
        }
    }
}

fn spawn_controller(runner: &MockRunner) -> ControllerHandle {
    ConnectionController::spawn(WarpCliConfig::default(), runner.clone())
}

#[tokio::test]
async fn test_refresh_status_sets_connected_on_marker() {
    let runner = MockRunner::new();
    runner.push_status(STATUS_UP);

    let handle = spawn_controller(&runner);
    let status_rx = handle.subscribe();
    handle.refresh_status();
    handle.shutdown().await;

    assert_eq!(status_rx.borrow().connection, ConnectionState::Connected);
    assert_eq!(runner.count("status"), 1);
}

#[tokio::test]
async fn test_refresh_status_fails_closed_on_empty_output() {
    let runner = MockRunner::new();
    // No scripted response: the status query returns empty output

    let handle = spawn_controller(&runner);
    let status_rx = handle.subscribe();
    handle.refresh_status();
    handle.shutdown().await;

    assert_eq!(status_rx.borrow().connection, ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_refresh_status_is_idempotent() {
    let runner = MockRunner::new();
    runner.push_status(STATUS_UP);
    runner.push_status(STATUS_UP);

    let handle = spawn_controller(&runner);
    let status_rx = handle.subscribe();
    handle.refresh_status();
    handle.refresh_status();
    handle.shutdown().await;

    assert_eq!(status_rx.borrow().connection, ConnectionState::Connected);
    assert_eq!(runner.count("status"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_stops_on_first_confirmed_cycle() {
    let runner = MockRunner::new();
    runner.set_account(ACCOUNT_OK);
    runner.push_status(STATUS_DOWN);
    runner.push_status(STATUS_DOWN);
    runner.push_status(STATUS_UP);

    let handle = spawn_controller(&runner);
    let status_rx = handle.subscribe();
    let started = tokio::time::Instant::now();
    handle.toggle_connection();
    handle.shutdown().await;

    assert_eq!(runner.count("connect"), 3);
    assert_eq!(runner.count("status"), 3);
    // One fixed delay per attempt, no backoff growth
    assert_eq!(started.elapsed(), Duration::from_secs(6));

    let status = status_rx.borrow().clone();
    assert_eq!(status.connection, ConnectionState::Connected);
    assert_eq!(status.account.quota_bytes, 1000);
    assert_eq!(status.account.premium_data_bytes, 500);
    assert_eq!(status.account.account_type, "Free");
    assert!(status.advisory.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_toggle_exhausts_six_attempts() {
    let runner = MockRunner::new();
    runner.set_account(ACCOUNT_OK);
    // Every status query reports down

    let handle = spawn_controller(&runner);
    let status_rx = handle.subscribe();
    let started = tokio::time::Instant::now();
    handle.toggle_connection();
    handle.shutdown().await;

    assert_eq!(runner.count("connect"), 6);
    assert_eq!(runner.count("status"), 6);
    assert_eq!(started.elapsed(), Duration::from_secs(12));

    let status = status_rx.borrow().clone();
    assert_eq!(status.connection, ConnectionState::Disconnected);
    assert_eq!(
        status.advisory.as_deref(),
        Some("Could not confirm WARP connection")
    );
}

#[tokio::test(start_paused = true)]
async fn test_toggle_from_connected_issues_single_disconnect() {
    let runner = MockRunner::new();
    runner.set_account(ACCOUNT_OK);
    runner.push_status(STATUS_UP);

    let handle = spawn_controller(&runner);
    let status_rx = handle.subscribe();
    handle.refresh_status();
    let started = tokio::time::Instant::now();
    handle.toggle_connection();
    handle.shutdown().await;

    assert_eq!(runner.count("disconnect"), 1);
    assert_eq!(runner.count("connect"), 0);
    // No retry loop and no delay on the disconnect path
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(status_rx.borrow().connection, ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_set_mode_issues_mode_then_reconciles() {
    let runner = MockRunner::new();
    runner.set_account(ACCOUNT_OK);
    runner.push_status(STATUS_UP);

    let handle = spawn_controller(&runner);
    let status_rx = handle.subscribe();
    handle.set_mode(ModeSelection::Direct1111);
    handle.shutdown().await;

    let calls = runner.calls();
    assert_eq!(calls[0], vec!["mode".to_string(), "proxy".to_string()]);
    assert_eq!(calls[1][0], "status");
    assert_eq!(calls[2][0], "account");

    let status = status_rx.borrow().clone();
    assert_eq!(status.mode, ModeSelection::Direct1111);
    assert_eq!(status.connection, ConnectionState::Connected);
    assert_eq!(status.account.quota_bytes, 1000);
}

#[tokio::test]
async fn test_account_parse_failure_retains_previous_snapshot() {
    let runner = MockRunner::new();
    runner.set_account(ACCOUNT_OK);

    let handle = spawn_controller(&runner);
    let status_rx = handle.subscribe();
    handle.refresh_account();

    // Wait for the first snapshot before corrupting the script
    let mut wait_rx = handle.subscribe();
    while wait_rx.borrow().account.quota_bytes != 1000 {
        wait_rx.changed().await.unwrap();
    }

    runner.set_account("Quota: unlimited\nAccount type: Free\n");
    handle.refresh_account();
    handle.shutdown().await;

    let status = status_rx.borrow().clone();
    assert_eq!(status.account.quota_bytes, 1000);
    assert_eq!(status.account.account_type, "Free");
    assert_eq!(
        status.advisory.as_deref(),
        Some("Could not read account information")
    );
}

#[tokio::test]
async fn test_acknowledge_clears_advisory_once_shown() {
    let runner = MockRunner::new();
    // Empty account output forces a retained-snapshot advisory

    let handle = spawn_controller(&runner);
    let status_rx = handle.subscribe();
    handle.refresh_account();
    handle.acknowledge_advisory();
    handle.shutdown().await;

    assert!(status_rx.borrow().advisory.is_none());
}

#[tokio::test]
async fn test_register_license_invocation() {
    let runner = MockRunner::new();

    let handle = spawn_controller(&runner);
    handle.register_license("AAAA-BBBB-CCCC");
    handle.shutdown().await;

    assert_eq!(
        runner.calls()[0],
        vec![
            "registration".to_string(),
            "license".to_string(),
            "AAAA-BBBB-CCCC".to_string()
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_abort_interrupts_in_flight_retry_loop() {
    let runner = MockRunner::new();
    // No status response ever confirms, so the retry loop would run its
    // full course if left alone

    let handle = spawn_controller(&runner);
    let status_rx = handle.subscribe();
    handle.toggle_connection();
    handle.abort().await;

    // The worker stopped without completing the toggle
    assert_ne!(status_rx.borrow().connection, ConnectionState::Connected);
    assert!(runner.count("connect") < 6);
}
