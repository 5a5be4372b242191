mod common;

use std::sync::Arc;

use common::{FakeRunner, PATIENCE, init_tracing, settle};
use procvisor::{InsertError, Member, Pool, PoolConfig, Process, RunError, Signal};
use tokio::time::timeout;

#[tokio::test]
async fn capacity_bounds_running_members() {
    init_tracing();
    let pool = Arc::new(Pool::new(PoolConfig {
        capacity: 2,
        ..PoolConfig::default()
    }));
    let client = pool.client();
    let process = Process::invoke(pool).await;

    let a = FakeRunner::ready_service();
    let b = FakeRunner::ready_service();
    let c = FakeRunner::ready_service();
    client.insert(Member::new("a", a.clone())).await.unwrap();
    client.insert(Member::new("b", b.clone())).await.unwrap();

    let inserting = {
        let client = client.clone();
        let c = c.clone();
        tokio::spawn(async move { client.insert(Member::new("c", c)).await })
    };
    settle().await;
    assert!(!inserting.is_finished());
    assert_eq!(c.run_count(), 0);

    a.trigger_exit(Ok(()));
    timeout(PATIENCE, inserting).await.unwrap().unwrap().unwrap();
    c.wait_started(1).await;

    client.close();
    process.signal(Signal::Terminate);
    assert!(timeout(PATIENCE, process.wait()).await.unwrap().is_ok());
    assert_eq!(b.received(), vec![Signal::Terminate]);
    assert_eq!(c.received(), vec![Signal::Terminate]);
}

#[tokio::test]
async fn late_listener_sees_every_event_in_order() {
    init_tracing();
    let pool = Arc::new(Pool::new(PoolConfig::default()));
    let client = pool.client();
    let process = Process::invoke(pool).await;

    let fakes: Vec<_> = (0..3).map(|_| FakeRunner::manual()).collect();
    for (i, fake) in fakes.iter().enumerate() {
        client.insert(Member::new(format!("m{i}"), fake.clone())).await.unwrap();
        fake.wait_started(1).await;
    }
    for fake in &fakes {
        fake.trigger_exit(Ok(()));
        settle().await;
    }
    client.close();
    assert!(timeout(PATIENCE, process.wait()).await.unwrap().is_ok());

    let mut exits = client.exit_listener();
    let mut seen = Vec::new();
    while let Some(exit) = exits.recv().await {
        seen.push(exit.member.name().to_string());
    }
    assert_eq!(seen, vec!["m0", "m1", "m2"]);

    let mut entrances = client.entrance_listener();
    let mut entered = 0;
    while let Some(entrance) = entrances.recv().await {
        assert!(entrance.process.has_exited());
        entered += 1;
    }
    assert_eq!(entered, 3);
}

#[tokio::test]
async fn duplicate_name_aborts_the_pool() {
    init_tracing();
    let pool = Arc::new(Pool::new(PoolConfig::default()));
    let client = pool.client();
    let process = Process::invoke(pool).await;

    let first = FakeRunner::ready_service();
    let second = FakeRunner::ready_service();
    client.insert(Member::new("dup", first.clone())).await.unwrap();
    let rejected = client.insert(Member::new("dup", second.clone())).await;

    assert!(matches!(rejected, Err(InsertError::Closed { ref name }) if name == "dup"));
    let result = timeout(PATIENCE, process.wait()).await.unwrap();
    assert!(matches!(result, Err(RunError::Panicked { .. })));
    assert_eq!(second.run_count(), 0);

    first.wait_started(1).await;
    let mut exits = client.exit_listener();
    assert!(timeout(PATIENCE, exits.recv()).await.unwrap().is_none());
}

#[tokio::test]
async fn insert_after_close_is_rejected() {
    init_tracing();
    let pool = Arc::new(Pool::new(PoolConfig::default()));
    let client = pool.client();
    let process = Process::invoke(pool).await;

    client.close();
    let rejected = client.insert(Member::new("late", FakeRunner::ready_service())).await;
    assert!(rejected.is_err());
    assert!(timeout(PATIENCE, process.wait()).await.unwrap().is_ok());
}
