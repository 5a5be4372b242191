//! # Process: live handle to an invoked runner.
//!
//! ```text
//! Process::background(runner)
//!     ├─► tokio::spawn(runner.run(signals, ready))   (panics caught)
//!     │        ├─ ready.notify()  ──► ready watch = true
//!     │        └─ return result   ──► exit watch = Some(result)
//!     └─► Process { signal tx, ready watch, exit watch }   (cloneable)
//! ```
//!
//! ## Rules
//! - `ready()` resolves once readiness is reported; it never resolves for a
//!   runner that exits without reporting it.
//! - `wait()` may be awaited by any number of callers, before or after exit;
//!   all observe the same result, produced exactly once by the runner task.
//! - `signal()` never blocks and is dropped once the runner has returned.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, watch};

use crate::error::RunError;
use crate::process::runner::{ReadyNotifier, RunnerRef, Signals};
use crate::signals::Signal;

type ExitState = Option<Result<(), RunError>>;

/// Handle to a started runner.
///
/// Cheap to clone; every clone observes the same process.
#[derive(Clone)]
pub struct Process {
    signals: mpsc::UnboundedSender<Signal>,
    ready: Arc<watch::Sender<bool>>,
    exit: Arc<watch::Sender<ExitState>>,
}

impl Process {
    /// Starts `runner` and resolves once it is ready or has exited.
    ///
    /// The returned process is usable either way; a startup failure is
    /// observed through [`Process::wait`].
    pub async fn invoke(runner: RunnerRef) -> Process {
        let process = Self::background(runner);
        tokio::select! {
            _ = process.ready() => {}
            _ = process.wait() => {}
        }
        process
    }

    /// Starts `runner` on its own task and returns immediately.
    pub fn background(runner: RunnerRef) -> Process {
        let (sig_tx, sig_rx) = mpsc::unbounded_channel();
        let ready = Arc::new(watch::Sender::new(false));
        let exit = Arc::new(watch::Sender::new(None));

        let notifier = ReadyNotifier::new(Arc::clone(&ready));
        let exit_tx = Arc::clone(&exit);
        tokio::spawn(async move {
            let fut = runner.run(Signals::new(sig_rx), notifier);
            let result = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => {
                    let reason = panic_reason(panic.as_ref());
                    tracing::error!(%reason, "runner panicked");
                    Err(RunError::Panicked { reason })
                }
            };
            exit_tx.send_replace(Some(result));
        });

        Process {
            signals: sig_tx,
            ready,
            exit,
        }
    }

    /// Resolves once the runner has reported readiness.
    pub async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in `self`, so this can only resolve through readiness.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Resolves with the runner's terminal result.
    pub async fn wait(&self) -> Result<(), RunError> {
        let mut rx = self.exit.subscribe();
        let result = rx
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|state| state.clone());
        match result {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    /// Delivers `signal` without blocking; a no-op once the process has exited.
    pub fn signal(&self, signal: Signal) {
        if self.has_exited() {
            return;
        }
        let _ = self.signals.send(signal);
    }

    /// Returns `true` once readiness has been reported.
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Returns `true` once the runner has returned.
    pub fn has_exited(&self) -> bool {
        self.exit.borrow().is_some()
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("ready", &self.is_ready())
            .field("exited", &self.has_exited())
            .finish()
    }
}

fn panic_reason(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
