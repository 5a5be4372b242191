#![cfg(unix)]

mod common;

use common::{FakeRunner, PATIENCE, init_tracing};
use nix::sys::signal::{Signal as OsSignal, raise};
use procvisor::signals::{OsSignals, monitor, monitor_with};
use procvisor::{Process, RunError, Signal};
use tokio::time::timeout;

#[tokio::test]
async fn monitor_returns_the_exit_result() {
    init_tracing();
    let fake = FakeRunner::manual();
    let process = Process::invoke(fake.clone()).await;

    let monitoring = tokio::spawn(monitor(process));
    fake.wait_started(1).await;
    fake.trigger_exit(Err(RunError::fail("done")));

    let result = timeout(PATIENCE, monitoring).await.unwrap().unwrap();
    assert_eq!(result.unwrap_err().to_string(), "done");
}

#[tokio::test]
async fn raised_signals_are_all_forwarded() {
    init_tracing();
    let os = OsSignals::new().unwrap();
    let fake = FakeRunner::manual();
    fake.trigger_ready();
    let process = Process::invoke(fake.clone()).await;

    let monitoring = tokio::spawn(monitor_with(process, os));
    raise(OsSignal::SIGHUP).unwrap();
    fake.wait_received(1).await;
    raise(OsSignal::SIGHUP).unwrap();
    fake.wait_received(2).await;
    assert_eq!(fake.received(), vec![Signal::Hangup, Signal::Hangup]);

    fake.trigger_exit(Ok(()));
    assert!(timeout(PATIENCE, monitoring).await.unwrap().unwrap().is_ok());
}
