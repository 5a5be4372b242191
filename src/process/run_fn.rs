//! # Function-backed runner (`RunFn`)
//!
//! [`RunFn`] wraps a closure `F: Fn(Signals, ReadyNotifier) -> Fut`, producing a
//! fresh future per invocation. Shared state between invocations has to be an
//! explicit `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use procvisor::{ReadyNotifier, RunError, RunFn, RunnerRef, Signals};
//!
//! let r: RunnerRef = RunFn::arc(|mut signals: Signals, ready: ReadyNotifier| async move {
//!     ready.notify();
//!     signals.recv().await;
//!     Ok::<_, RunError>(())
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RunError;
use crate::process::runner::{ReadyNotifier, Runner, Signals};

/// Function-backed runner implementation.
#[derive(Debug)]
pub struct RunFn<F> {
    f: F,
}

impl<F, Fut> RunFn<F>
where
    F: Fn(Signals, ReadyNotifier) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), RunError>> + Send + 'static,
{
    /// Creates a new function-backed runner.
    ///
    /// Prefer [`RunFn::arc`] when you immediately need a [`RunnerRef`](crate::RunnerRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the runner and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Runner for RunFn<F>
where
    F: Fn(Signals, ReadyNotifier) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), RunError>> + Send + 'static,
{
    async fn run(&self, signals: Signals, ready: ReadyNotifier) -> Result<(), RunError> {
        (self.f)(signals, ready).await
    }
}
