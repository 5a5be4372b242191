//! # Restarter: one runner, reloaded after every exit.
//!
//! ```text
//! run ─► Process(runner) ─► exit ─► load(&runner, &result)
//!            ▲                          ├─ Some(next) ─► runner = next ─┐
//!            └──────────────────────────┼───────────────────────────────┘
//!                                       └─ None       ─► return result
//! ```
//!
//! Readiness is reported once, for the first inner runner that becomes
//! ready. Signals go to the current inner process; after a signal the
//! restarter returns with that process's result instead of reloading.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RunError;
use crate::process::{Process, ReadyNotifier, Runner, RunnerRef, Signals};
use crate::signals::Signal;

/// Callback choosing the runner to start after an exit; `None` stops.
pub type LoadFn = Arc<dyn Fn(&RunnerRef, &Result<(), RunError>) -> Option<RunnerRef> + Send + Sync>;

/// Runner that keeps relaunching an inner runner.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use procvisor::{Process, ReadyNotifier, RunFn, Restarter, Signals};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let once = RunFn::arc(|_signals: Signals, ready: ReadyNotifier| async move {
///     ready.notify();
///     Ok(())
/// });
/// let restarter = Restarter::new(once).with_load(|_runner, _exit| None);
/// let process = Process::invoke(Arc::new(restarter)).await;
/// assert!(process.wait().await.is_ok());
/// # }
/// ```
#[derive(Clone)]
pub struct Restarter {
    runner: RunnerRef,
    load: Option<LoadFn>,
}

impl Restarter {
    /// Creates a restarter without a load callback; running it fails until one is set.
    pub fn new(runner: RunnerRef) -> Self {
        Self { runner, load: None }
    }

    /// Returns a restarter using `load` to pick the next runner.
    pub fn with_load<F>(mut self, load: F) -> Self
    where
        F: Fn(&RunnerRef, &Result<(), RunError>) -> Option<RunnerRef> + Send + Sync + 'static,
    {
        self.load = Some(Arc::new(load));
        self
    }
}

#[async_trait]
impl Runner for Restarter {
    async fn run(&self, mut signals: Signals, ready: ReadyNotifier) -> Result<(), RunError> {
        let Some(load) = &self.load else {
            return Err(RunError::NoLoadCallback);
        };

        let mut runner = Arc::clone(&self.runner);
        let mut ready = Some(ready);
        let mut shutdown: Option<Signal> = None;

        loop {
            let process = Process::background(Arc::clone(&runner));
            let result = loop {
                tokio::select! {
                    biased;
                    sig = signals.recv() => {
                        shutdown = Some(sig);
                        process.signal(sig);
                    }
                    _ = process.ready(), if ready.is_some() => {
                        if let Some(ready) = ready.take() {
                            ready.notify();
                        }
                    }
                    result = process.wait() => break result,
                }
            };

            if let Some(sig) = shutdown {
                tracing::debug!(signal = %sig, "restarter signaled; not reloading");
                return result;
            }
            match load(&runner, &result) {
                Some(next) => {
                    tracing::debug!(failed = result.is_err(), "reloading runner");
                    runner = next;
                }
                None => return result,
            }
        }
    }
}
