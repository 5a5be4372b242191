//! # Runner contract and its two channels.
//!
//! A [`Runner`] is handed a [`Signals`] source and a [`ReadyNotifier`]. It
//! reports readiness once it is serving, then runs until a signal arrives and
//! returns `Ok(())` for a clean stop.
//!
//! A [`Loader`] produces fresh runners for restart logic; returning `None`
//! ends restart attempts.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::error::RunError;
use crate::signals::Signal;

/// Shared handle to a runner.
pub type RunnerRef = Arc<dyn Runner>;

/// Shared handle to a loader.
pub type LoaderRef = Arc<dyn Loader>;

/// # Signal-observing, cancellable unit of work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use procvisor::{ReadyNotifier, RunError, Runner, Signals};
///
/// struct Ticker;
///
/// #[async_trait]
/// impl Runner for Ticker {
///     async fn run(&self, mut signals: Signals, ready: ReadyNotifier) -> Result<(), RunError> {
///         ready.notify();
///         signals.recv().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Runner: Send + Sync + 'static {
    /// Executes until stopped by a signal or until the work is done.
    ///
    /// Implementations must report readiness via `ready` in bounded time (or
    /// exit without it) and must return promptly once a signal is received.
    async fn run(&self, signals: Signals, ready: ReadyNotifier) -> Result<(), RunError>;
}

/// Produces a fresh runner for a restarted member.
pub trait Loader: Send + Sync + 'static {
    /// Returns the next runner, or `None` when no further restarts should happen.
    fn load(&self) -> Option<RunnerRef>;
}

impl<F> Loader for F
where
    F: Fn() -> Option<RunnerRef> + Send + Sync + 'static,
{
    fn load(&self) -> Option<RunnerRef> {
        self()
    }
}

/// Receiving end of the signals delivered to one process.
#[derive(Debug)]
pub struct Signals {
    rx: mpsc::UnboundedReceiver<Signal>,
}

impl Signals {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<Signal>) -> Self {
        Self { rx }
    }

    /// Waits for the next signal.
    ///
    /// Pends forever when nothing can signal this process any more.
    pub async fn recv(&mut self) -> Signal {
        match self.rx.recv().await {
            Some(sig) => sig,
            None => std::future::pending().await,
        }
    }

    /// Returns an already delivered signal without waiting.
    pub fn try_recv(&mut self) -> Option<Signal> {
        self.rx.try_recv().ok()
    }
}

/// One-shot readiness notifier.
///
/// Consumed by [`ReadyNotifier::notify`]; dropping it without notifying
/// means the runner never became ready.
#[derive(Debug)]
pub struct ReadyNotifier {
    tx: Arc<watch::Sender<bool>>,
}

impl ReadyNotifier {
    pub(crate) fn new(tx: Arc<watch::Sender<bool>>) -> Self {
        Self { tx }
    }

    /// Reports readiness.
    pub fn notify(self) {
        self.tx.send_replace(true);
    }
}
