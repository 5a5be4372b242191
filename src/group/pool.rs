//! # Pool: bounded-concurrency dynamic group.
//!
//! A [`Pool`] is a [`Runner`]: invoke it as a process, then drive it through
//! its [`DynamicClient`]. Its control loop is the only writer of membership;
//! everything else talks to it through queues.
//!
//! ## Architecture
//! ```text
//!  signals ──────────┐
//!  close token ──────┤
//!  insert queue ─────┼──► control loop ──► ProcessSet (name → Process)
//!  member events ────┘          │
//!       ▲                       ├──► entrance Broadcaster ──► listeners
//!       │                       └──► exit Broadcaster ─────► listeners
//!  watch_member (one per member): ready|exit ─► Entrance, then exit ─► Exit
//! ```
//!
//! ## Rules
//! - At most `capacity` members run at once; the insert queue is not read while full.
//! - Duplicate member names abort the pool (panic), never overwrite.
//! - The first member exit propagates the configured termination signal to
//!   every remaining member, once; with no signal configured members are independent.
//! - With [`StopOrder::Fifo`] a shutdown signal reaches only the oldest member;
//!   each exit passes it on to the next oldest. Repeated signals go to the oldest.
//! - Once signaled, no member is admitted again.
//! - Entrance and exit of one member share a queue, so entrance is always handled first.
//! - The pool finishes when it is empty and either signaled or closed; both
//!   broadcasters are closed at that point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::{PoolConfig, ReusePolicy, StopOrder};
use crate::error::RunError;
use crate::events::{EntranceEvent, ExitEvent};
use crate::group::Member;
use crate::group::client::{DynamicClient, InsertRequest};
use crate::process::{Process, ReadyNotifier, Runner, Signals};
use crate::signals::Signal;

/// Bounded-concurrency engine running a changing set of members.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use procvisor::{Member, Pool, PoolConfig, Process, ReadyNotifier, RunFn, Signals};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pool = Arc::new(Pool::new(PoolConfig { capacity: 2, ..PoolConfig::default() }));
/// let client = pool.client();
/// let process = Process::invoke(pool).await;
///
/// let job = RunFn::arc(|_signals: Signals, ready: ReadyNotifier| async move {
///     ready.notify();
///     Ok(())
/// });
/// client.insert(Member::new("job", job)).await.unwrap();
/// client.close();
/// assert!(process.wait().await.is_ok());
/// # }
/// ```
pub struct Pool {
    config: PoolConfig,
    client: DynamicClient,
    insert_rx: Mutex<Option<mpsc::Receiver<InsertRequest>>>,
}

impl Pool {
    /// Creates a pool; it does nothing until run as a process.
    pub fn new(config: PoolConfig) -> Self {
        let (client, insert_rx) = DynamicClient::new(config.event_buffer_clamped());
        Self {
            config,
            client,
            insert_rx: Mutex::new(Some(insert_rx)),
        }
    }

    /// Returns a client for inserting members and observing events.
    pub fn client(&self) -> DynamicClient {
        self.client.clone()
    }

    /// Returns the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn take_inserts(&self) -> Option<mpsc::Receiver<InsertRequest>> {
        self.insert_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl Runner for Pool {
    async fn run(&self, signals: Signals, ready: ReadyNotifier) -> Result<(), RunError> {
        let Some(insert_rx) = self.take_inserts() else {
            return Err(RunError::AlreadyRunning);
        };
        let control = ControlLoop {
            config: self.config.clone(),
            client: self.client.clone(),
            insert_rx,
            set: ProcessSet::new(self.config.stop_order),
            entering: 0,
        };
        control.run(signals, ready).await
    }
}

enum MemberEvent {
    Entrance(EntranceEvent),
    Exit(ExitEvent),
}

struct ProcessSet {
    processes: HashMap<Arc<str>, Process>,
    started: Vec<Arc<str>>,
    stop_order: StopOrder,
    shutdown: Option<Signal>,
    last_signaled: Option<Arc<str>>,
}

impl ProcessSet {
    fn new(stop_order: StopOrder) -> Self {
        Self {
            processes: HashMap::new(),
            started: Vec::new(),
            stop_order,
            shutdown: None,
            last_signaled: None,
        }
    }

    fn signaled(&self) -> bool {
        self.shutdown.is_some()
    }

    /// Records `signal` as the shutdown signal and delivers it per the stop order.
    fn signal(&mut self, signal: Signal) {
        self.shutdown = Some(signal);
        match self.stop_order {
            StopOrder::Parallel => self.signal_all(signal),
            StopOrder::Fifo => self.signal_oldest(signal),
        }
    }

    fn signal_all(&self, signal: Signal) {
        for process in self.processes.values() {
            process.signal(signal);
        }
    }

    fn signal_oldest(&mut self, signal: Signal) {
        let Some(name) = self.started.first() else {
            return;
        };
        if let Some(process) = self.processes.get(name) {
            tracing::debug!(member = &**name, signal = %signal, "signaling oldest member");
            process.signal(signal);
        }
        self.last_signaled = Some(Arc::clone(name));
    }

    fn len(&self) -> usize {
        self.processes.len()
    }

    fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    fn ensure_absent(&self, name: &str) {
        if self.processes.contains_key(name) {
            tracing::error!(member = name, "member inserted twice");
            panic!("member inserted twice: {name:?}");
        }
    }

    fn add(&mut self, name: &str, process: Process) {
        let name: Arc<str> = Arc::from(name);
        self.started.push(Arc::clone(&name));
        self.processes.insert(name, process);
    }

    /// Removes an exited member; under FIFO shutdown the next oldest member is signaled.
    fn remove(&mut self, name: &str) {
        self.processes.remove(name);
        self.started.retain(|started| &**started != name);

        if let (StopOrder::Fifo, Some(sig)) = (self.stop_order, self.shutdown) {
            let advanced = self.started.first() != self.last_signaled.as_ref();
            if advanced {
                self.signal_oldest(sig);
            }
        }
    }
}

struct ControlLoop {
    config: PoolConfig,
    client: DynamicClient,
    insert_rx: mpsc::Receiver<InsertRequest>,
    set: ProcessSet,
    entering: usize,
}

impl ControlLoop {
    async fn run(mut self, mut signals: Signals, ready: ReadyNotifier) -> Result<(), RunError> {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let closed = self.client.close_token();
        let mut close_pending = true;
        let mut admitting = true;

        ready.notify();

        loop {
            tokio::select! {
                sig = signals.recv() => {
                    tracing::debug!(signal = %sig, members = self.set.len(), "pool signaled");
                    self.set.signal(sig);
                    admitting = false;
                    self.reject_pending();
                    self.client.close();
                }

                _ = closed.cancelled(), if close_pending => {
                    tracing::debug!(members = self.set.len(), "pool closed to inserts");
                    close_pending = false;
                    admitting = false;
                    self.reject_pending();
                    if self.entering == 0 {
                        self.client.entrance.close();
                    }
                    if self.set.is_empty() {
                        return self.finish();
                    }
                }

                Some(request) = self.insert_rx.recv(), if admitting => {
                    self.admit(request, &events_tx);
                    if self.at_capacity() {
                        admitting = false;
                    }
                }

                Some(event) = events_rx.recv() => match event {
                    MemberEvent::Entrance(ev) => {
                        self.entering -= 1;
                        tracing::debug!(member = ev.member.name(), ready = ev.process.is_ready(), "member entered");
                        self.client.entrance.broadcast(ev);
                        if !close_pending && self.entering == 0 {
                            self.client.entrance.close();
                        }
                    }
                    MemberEvent::Exit(ev) => {
                        self.set.remove(ev.member.name());
                        match &ev.result {
                            Ok(()) => tracing::debug!(member = ev.member.name(), "member exited"),
                            Err(err) => tracing::warn!(member = ev.member.name(), error = %err, "member exited with error"),
                        }
                        self.client.exit.broadcast(ev);

                        if !self.set.signaled() {
                            if let Some(sig) = self.config.signal {
                                tracing::debug!(signal = %sig, members = self.set.len(), "propagating termination signal");
                                self.set.signal(sig);
                                admitting = false;
                                self.reject_pending();
                                self.client.close();
                            }
                        }

                        if self.set.is_empty()
                            && (self.set.signaled()
                                || !close_pending
                                || (self.config.reuse == ReusePolicy::Once && !admitting))
                        {
                            return self.finish();
                        }

                        if !self.set.signaled()
                            && close_pending
                            && self.config.reuse == ReusePolicy::Reopen
                            && !self.at_capacity()
                        {
                            admitting = true;
                        }
                    }
                },
            }
        }
    }

    fn at_capacity(&self) -> bool {
        self.config
            .concurrency_limit()
            .is_some_and(|limit| self.set.len() >= limit)
    }

    fn admit(&mut self, request: InsertRequest, events: &mpsc::UnboundedSender<MemberEvent>) {
        let InsertRequest { member, admitted } = request;
        self.set.ensure_absent(member.name());
        let process = Process::background(Arc::clone(member.runner()));
        self.set.add(member.name(), process.clone());
        self.entering += 1;
        tracing::debug!(member = member.name(), members = self.set.len(), "member admitted");

        let _ = admitted.send(());
        tokio::spawn(watch_member(member, process, events.clone()));
    }

    /// Permanently stops admission; queued inserters observe `InsertError::Closed`.
    fn reject_pending(&mut self) {
        self.insert_rx.close();
        while let Ok(request) = self.insert_rx.try_recv() {
            tracing::debug!(member = request.member.name(), "insert rejected");
        }
    }

    fn finish(mut self) -> Result<(), RunError> {
        self.reject_pending();
        tracing::debug!("pool drained");
        Ok(())
    }
}

impl Drop for ControlLoop {
    // Listeners end and orphaned members are killed even when the loop unwinds.
    fn drop(&mut self) {
        if !self.set.is_empty() {
            self.set.signal_all(Signal::Kill);
        }
        self.client.close();
        self.client.entrance.close();
        self.client.exit.close();
    }
}

async fn watch_member(member: Member, process: Process, events: mpsc::UnboundedSender<MemberEvent>) {
    tokio::select! {
        biased;
        _ = process.ready() => {}
        _ = process.wait() => {}
    }
    let entrance = EntranceEvent {
        member: member.clone(),
        process: process.clone(),
    };
    let _ = events.send(MemberEvent::Entrance(entrance));

    let result = process.wait().await;
    let _ = events.send(MemberEvent::Exit(ExitEvent { member, result }));
}
