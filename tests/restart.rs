mod common;

use std::sync::{Arc, Mutex};

use common::{FakeRunner, PATIENCE, init_tracing};
use procvisor::{
    LoaderRef, Member, Process, RestartPolicy, Restarter, RunError, RunGroup, RunnerRef, Signal,
};
use tokio::time::timeout;

/// Loader handing out the queued fakes, then `None`.
fn queue_loader(fakes: Vec<Arc<FakeRunner>>) -> LoaderRef {
    let queue = Mutex::new(fakes.into_iter());
    Arc::new(move || {
        queue
            .lock()
            .unwrap()
            .next()
            .map(|fake| fake as RunnerRef)
    })
}

#[tokio::test]
async fn restart_group_interrupts_peers_and_relaunches_the_member() {
    init_tracing();
    let first = FakeRunner::ready_service();
    let second = FakeRunner::ready_service();
    let peer = FakeRunner::ready_service();

    let group = RunGroup::new(vec![
        Member::new("worker", first.clone())
            .with_restart(RestartPolicy::RestartGroup)
            .with_loader(queue_loader(vec![second.clone()])),
        Member::new("peer", peer.clone()),
    ]);
    let process = Process::invoke(Arc::new(group)).await;

    first.trigger_exit(Err(RunError::fail("lost connection")));
    second.wait_started(1).await;

    process.signal(Signal::Terminate);
    assert!(timeout(PATIENCE, process.wait()).await.unwrap().is_ok());
    assert_eq!(peer.received(), vec![Signal::Interrupt]);
    assert_eq!(second.received(), vec![Signal::Terminate]);
}

#[tokio::test]
async fn exhausted_loader_retires_the_member() {
    init_tracing();
    let first = FakeRunner::ready_service();
    let second = FakeRunner::ready_service();

    let group = RunGroup::new(vec![
        Member::new("job", first.clone())
            .with_restart(RestartPolicy::RestartMe)
            .with_loader(queue_loader(vec![second.clone()])),
    ]);
    let process = Process::invoke(Arc::new(group)).await;

    first.trigger_exit(Ok(()));
    second.wait_started(1).await;
    second.trigger_exit(Ok(()));

    assert!(timeout(PATIENCE, process.wait()).await.unwrap().is_ok());
}

#[tokio::test]
async fn stop_group_terminates_peers_and_ends_the_group() {
    init_tracing();
    let leader = FakeRunner::ready_service();
    let follower = FakeRunner::ready_service();

    let group = RunGroup::new(vec![
        Member::new("leader", leader.clone()).with_restart(RestartPolicy::StopGroup),
        Member::new("follower", follower.clone()).with_restart(RestartPolicy::RestartMe),
    ]);
    let process = Process::invoke(Arc::new(group)).await;

    leader.trigger_exit(Ok(()));
    assert!(timeout(PATIENCE, process.wait()).await.unwrap().is_ok());
    assert_eq!(follower.received(), vec![Signal::Terminate]);
}

#[tokio::test]
async fn on_failure_only_relaunches_failed_members() {
    init_tracing();
    let flaky = FakeRunner::ready_service();
    let replacement = FakeRunner::ready_service();
    let steady = FakeRunner::ready_service();

    let group = RunGroup::new(vec![
        Member::new("flaky", flaky.clone())
            .with_restart(RestartPolicy::OnFailure)
            .with_loader(queue_loader(vec![replacement.clone()])),
        Member::new("steady", steady.clone())
            .with_restart(RestartPolicy::OnFailure)
            .with_loader(queue_loader(vec![FakeRunner::ready_service()])),
    ]);
    let process = Process::invoke(Arc::new(group)).await;

    flaky.trigger_exit(Err(RunError::fail("oom")));
    replacement.wait_started(1).await;
    steady.trigger_exit(Ok(()));
    replacement.trigger_exit(Ok(()));

    assert!(timeout(PATIENCE, process.wait()).await.unwrap().is_ok());
}

#[tokio::test]
async fn relaunch_ready_after_group_signal_still_gets_the_signal() {
    init_tracing();
    let first = FakeRunner::ready_service();
    let late = FakeRunner::service();

    let group = RunGroup::new(vec![
        Member::new("worker", first.clone())
            .with_restart(RestartPolicy::RestartMe)
            .with_loader(queue_loader(vec![late.clone()])),
    ]);
    let process = Process::invoke(Arc::new(group)).await;

    first.trigger_exit(Ok(()));
    late.wait_started(1).await;
    process.signal(Signal::Terminate);
    common::settle().await;
    assert!(late.received().is_empty());

    late.trigger_ready();
    assert!(timeout(PATIENCE, process.wait()).await.unwrap().is_ok());
    assert_eq!(late.received(), vec![Signal::Terminate]);
}

#[tokio::test]
async fn restarter_waits_for_the_inner_runner() {
    init_tracing();
    let inner = FakeRunner::service();
    let restarter = Restarter::new(inner.clone()).with_load(|_, _| None);

    let invoking = tokio::spawn(Process::invoke(Arc::new(restarter)));
    inner.wait_started(1).await;
    common::settle().await;
    assert!(!invoking.is_finished());

    inner.trigger_ready();
    let process = timeout(PATIENCE, invoking).await.unwrap().unwrap();
    assert!(process.is_ready());

    inner.trigger_exit(Ok(()));
    assert!(timeout(PATIENCE, process.wait()).await.unwrap().is_ok());
}

#[tokio::test]
async fn restarter_runs_the_loaded_runner() {
    init_tracing();
    let first = FakeRunner::ready_service();
    let next = FakeRunner::ready_service();
    let handed_out = Mutex::new(Some(next.clone()));
    let restarter = Restarter::new(first.clone()).with_load(move |_, _| {
        handed_out.lock().unwrap().take().map(|fake| fake as RunnerRef)
    });

    let process = Process::invoke(Arc::new(restarter)).await;
    first.trigger_exit(Ok(()));
    next.wait_started(1).await;
    next.trigger_exit(Err(RunError::fail("done")));

    let err = timeout(PATIENCE, process.wait()).await.unwrap().unwrap_err();
    assert_eq!(err.to_string(), "done");
}

#[tokio::test]
async fn restarter_without_load_callback_fails() {
    init_tracing();
    let restarter = Restarter::new(FakeRunner::ready_service());
    let process = Process::invoke(Arc::new(restarter)).await;
    assert!(matches!(
        timeout(PATIENCE, process.wait()).await.unwrap(),
        Err(RunError::NoLoadCallback)
    ));
}
