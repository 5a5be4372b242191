#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use procvisor::{ReadyNotifier, RunError, Runner, Signal, Signals};
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// Logs go through the test writer, so they only show for failing tests
/// (or with `-- --nocapture`). Levels come from `RUST_LOG`, default `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Upper bound for anything a test waits on.
pub const PATIENCE: Duration = Duration::from_secs(5);

/// Short pause used to show that something does *not* happen.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Runner driven by the test: readiness and exit happen on trigger.
///
/// Every signal it receives is recorded. A `service` fake also returns
/// `Ok(())` on its first signal; a `manual` one keeps running.
pub struct FakeRunner {
    runs: watch::Sender<usize>,
    ready: watch::Sender<bool>,
    exit: watch::Sender<Option<Result<(), RunError>>>,
    received: watch::Sender<Vec<Signal>>,
    exit_on_signal: bool,
}

impl FakeRunner {
    fn build(exit_on_signal: bool) -> Arc<Self> {
        Arc::new(Self {
            runs: watch::Sender::new(0),
            ready: watch::Sender::new(false),
            exit: watch::Sender::new(None),
            received: watch::Sender::new(Vec::new()),
            exit_on_signal,
        })
    }

    /// Exits only through [`FakeRunner::trigger_exit`].
    pub fn manual() -> Arc<Self> {
        Self::build(false)
    }

    /// Exits cleanly on the first signal, or through [`FakeRunner::trigger_exit`].
    pub fn service() -> Arc<Self> {
        Self::build(true)
    }

    /// Service fake that is ready as soon as it runs.
    pub fn ready_service() -> Arc<Self> {
        let fake = Self::service();
        fake.trigger_ready();
        fake
    }

    pub fn trigger_ready(&self) {
        self.ready.send_replace(true);
    }

    pub fn trigger_exit(&self, result: Result<(), RunError>) {
        self.exit.send_replace(Some(result));
    }

    pub fn run_count(&self) -> usize {
        *self.runs.borrow()
    }

    pub fn received(&self) -> Vec<Signal> {
        self.received.borrow().clone()
    }

    /// Waits until the fake has received at least `n` signals.
    pub async fn wait_received(&self, n: usize) {
        let mut rx = self.received.subscribe();
        tokio::time::timeout(PATIENCE, rx.wait_for(|received| received.len() >= n))
            .await
            .expect("fake runner did not receive signals in time")
            .expect("signal log closed");
    }

    /// Waits until the fake has been run at least `n` times.
    pub async fn wait_started(&self, n: usize) {
        let mut rx = self.runs.subscribe();
        tokio::time::timeout(PATIENCE, rx.wait_for(|runs| *runs >= n))
            .await
            .expect("fake runner was not started in time")
            .expect("run counter closed");
    }
}

#[async_trait]
impl Runner for FakeRunner {
    async fn run(&self, mut signals: Signals, ready: ReadyNotifier) -> Result<(), RunError> {
        self.runs.send_modify(|runs| *runs += 1);
        let mut ready_rx = self.ready.subscribe();
        let mut exit_rx = self.exit.subscribe();
        let mut ready = Some(ready);

        loop {
            tokio::select! {
                sig = signals.recv() => {
                    self.received.send_modify(|received| received.push(sig));
                    if self.exit_on_signal {
                        return Ok(());
                    }
                }
                _ = ready_rx.wait_for(|ready| *ready), if ready.is_some() => {
                    if let Some(ready) = ready.take() {
                        ready.notify();
                    }
                }
                exit = exit_rx.wait_for(Option::is_some) => {
                    return exit.ok().and_then(|state| state.clone()).unwrap_or(Ok(()));
                }
            }
        }
    }
}
