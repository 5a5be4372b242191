//! # Signal vocabulary and OS signal plumbing.
//!
//! [`Signal`] is the value delivered to a running [`Process`] through
//! [`Process::signal`]. Groups use an `Option<Signal>` as their termination
//! signal: `None` means members are independent and an unplanned exit does
//! not shut the rest of the group down.
//!
//! ## OS signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//! - `SIGHUP` (terminal hangup / reload requests)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::fmt;

use crate::error::RunError;
use crate::process::Process;

/// Signal delivered to a running process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Interactive interrupt (`SIGINT`).
    Interrupt,
    /// Polite termination request (`SIGTERM`).
    Terminate,
    /// Quit request (`SIGQUIT`).
    Quit,
    /// Immediate stop (`SIGKILL`); runners should exit without cleanup.
    Kill,
    /// Hangup (`SIGHUP`).
    Hangup,
    /// User-defined signal 1 (`SIGUSR1`).
    User1,
    /// User-defined signal 2 (`SIGUSR2`).
    User2,
}

impl Signal {
    /// Returns the conventional `SIGxxx` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
            Signal::Kill => "SIGKILL",
            Signal::Hangup => "SIGHUP",
            Signal::User1 => "SIGUSR1",
            Signal::User2 => "SIGUSR2",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener for the termination signals of the operating system.
///
/// Streams are registered once in [`OsSignals::new`] and kept for the
/// lifetime of the listener, so signals arriving between two `recv` calls
/// are queued, not lost.
#[cfg(unix)]
pub struct OsSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Registers listeners for `SIGINT`, `SIGTERM`, `SIGQUIT` and `SIGHUP`.
    pub fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            quit: signal(SignalKind::quit())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    /// Waits for the next signal; `None` if the runtime stopped delivering them.
    pub async fn recv(&mut self) -> Option<Signal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(Signal::Interrupt),
            Some(()) = self.terminate.recv() => Some(Signal::Terminate),
            Some(()) = self.quit.recv()      => Some(Signal::Quit),
            Some(()) = self.hangup.recv()    => Some(Signal::Hangup),
            else => None,
        }
    }
}

/// Listener for Ctrl-C, reported as [`Signal::Interrupt`].
#[cfg(not(unix))]
pub struct OsSignals {
    _private: (),
}

#[cfg(not(unix))]
impl OsSignals {
    /// Installs the Ctrl-C handler.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self { _private: () })
    }

    /// Waits for the next Ctrl-C; `None` if listening failed.
    pub async fn recv(&mut self) -> Option<Signal> {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(Signal::Interrupt),
            Err(err) => {
                tracing::warn!(error = %err, "ctrl-c listener failed");
                None
            }
        }
    }
}

/// Waits for a single termination signal from the operating system.
///
/// Returns the received signal, or `Err` if signal registration fails.
pub async fn wait_for_os_signal() -> std::io::Result<Signal> {
    let mut os = OsSignals::new()?;
    os.recv().await.ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::BrokenPipe, "signal stream closed")
    })
}

/// Forwards OS signals to `process` until it exits, then returns its exit result.
///
/// Typically wraps the root of a process tree in `main`:
/// ```no_run
/// use procvisor::{Process, RunFn, RunError, signals};
///
/// # async fn demo() -> Result<(), RunError> {
/// let root = RunFn::arc(|mut signals: procvisor::Signals, ready: procvisor::ReadyNotifier| async move {
///     ready.notify();
///     signals.recv().await;
///     Ok(())
/// });
/// let process = Process::invoke(root).await;
/// signals::monitor(process).await
/// # }
/// ```
///
/// If signal registration fails the error is logged and the process is only
/// waited on.
pub async fn monitor(process: Process) -> Result<(), RunError> {
    match OsSignals::new() {
        Ok(os) => monitor_with(process, os).await,
        Err(err) => {
            tracing::warn!(error = %err, "os signal registration failed");
            process.wait().await
        }
    }
}

/// Like [`monitor`], with listeners the caller registered earlier.
///
/// Every signal received by `os` is forwarded, however quickly they follow
/// each other.
pub async fn monitor_with(process: Process, mut os: OsSignals) -> Result<(), RunError> {
    let mut listening = true;
    loop {
        tokio::select! {
            res = process.wait() => return res,
            sig = os.recv(), if listening => match sig {
                Some(sig) => {
                    tracing::info!(signal = %sig, "forwarding os signal");
                    process.signal(sig);
                }
                None => {
                    tracing::warn!("os signal streams closed");
                    listening = false;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_conventional_names() {
        assert_eq!(Signal::Interrupt.to_string(), "SIGINT");
        assert_eq!(Signal::Terminate.to_string(), "SIGTERM");
        assert_eq!(Signal::Kill.as_str(), "SIGKILL");
    }
}
