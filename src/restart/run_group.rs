//! # RunGroup: members replaced in place by their restart policy.
//!
//! Unlike a static group, a [`RunGroup`] does not just record exits: each
//! exit is fed to the member's [`RestartPolicy`] and the member is either
//! relaunched through its loader or retired.
//!
//! ## Control loop
//! ```text
//! invoke all members (concurrently) ─► ready
//! loop until desired == 0:
//!   signal  ─► forward to every running member, stop restarting
//!   launch  ─► relaunched member joins the group
//!   exit    ─► signaled?            retire
//!              evaluate policy ─► signal the rest of the group (optional)
//!              no restart       ─► retire (group stops if the policy signaled)
//!              no loader / None ─► retire
//!              otherwise        ─► invoke loaded runner under the same name
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::mpsc;

use crate::error::RunError;
use crate::group::{self, Member};
use crate::process::{Process, ReadyNotifier, Runner, Signals};
use crate::restart::RestartPolicy;
use crate::signals::Signal;

/// Group that relaunches members according to their [`RestartPolicy`].
///
/// Members without a policy are retired on exit, as with
/// [`RestartPolicy::StopMe`]. A relaunch needs a [`Loader`](crate::Loader)
/// on the member.
pub struct RunGroup {
    members: Vec<Member>,
}

impl RunGroup {
    /// Creates a group from `members`; nothing runs until it is invoked.
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    /// Returns the members.
    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

struct Running {
    member: Member,
    process: Process,
}

type Exit = (u64, Result<(), RunError>);

struct GroupState {
    running: HashMap<u64, Running>,
    next_id: u64,
    exits: mpsc::UnboundedSender<Exit>,
    shutdown: Option<Signal>,
}

impl GroupState {
    fn join(&mut self, member: Member, process: Process) {
        let id = self.next_id;
        self.next_id += 1;

        if let Some(sig) = self.shutdown {
            process.signal(sig);
        }
        let exits = self.exits.clone();
        let watched = process.clone();
        tokio::spawn(async move {
            let result = watched.wait().await;
            let _ = exits.send((id, result));
        });
        self.running.insert(id, Running { member, process });
    }

    fn signal(&self, signal: Signal) {
        for running in self.running.values() {
            running.process.signal(signal);
        }
    }
}

#[async_trait]
impl Runner for RunGroup {
    async fn run(&self, mut signals: Signals, ready: ReadyNotifier) -> Result<(), RunError> {
        group::validate(&self.members)?;

        let (exit_tx, mut exit_rx) = mpsc::unbounded_channel::<Exit>();
        let (launch_tx, mut launch_rx) = mpsc::unbounded_channel::<Running>();

        let processes = join_all(
            self.members
                .iter()
                .map(|m| Process::invoke(Arc::clone(m.runner()))),
        )
        .await;

        let mut state = GroupState {
            running: HashMap::with_capacity(self.members.len()),
            next_id: 0,
            exits: exit_tx,
            shutdown: None,
        };
        for (member, process) in self.members.iter().cloned().zip(processes) {
            state.join(member, process);
        }
        let mut desired = state.running.len();
        let mut stopped: Option<RunError> = None;

        ready.notify();

        while desired > 0 {
            tokio::select! {
                sig = signals.recv() => {
                    tracing::debug!(signal = %sig, members = state.running.len(), "run group signaled");
                    state.shutdown = Some(sig);
                    state.signal(sig);
                }

                Some(launched) = launch_rx.recv() => {
                    tracing::debug!(member = launched.member.name(), "member relaunched");
                    state.join(launched.member, launched.process);
                }

                Some((id, result)) = exit_rx.recv() => {
                    let Some(Running { member, .. }) = state.running.remove(&id) else {
                        continue;
                    };

                    if state.shutdown.is_some() {
                        tracing::debug!(member = member.name(), "member retired after group signal");
                        desired -= 1;
                        continue;
                    }

                    let decision = member
                        .restart()
                        .unwrap_or(&RestartPolicy::StopMe)
                        .evaluate(&result);
                    tracing::debug!(
                        member = member.name(),
                        failed = result.is_err(),
                        restart = decision.attempt_restart,
                        signal = ?decision.signal,
                        grace = ?decision.grace,
                        "member exited"
                    );

                    if let Some(sig) = decision.signal {
                        state.signal(sig);
                    }

                    if !decision.attempt_restart {
                        if decision.stops_group() {
                            state.shutdown = decision.signal;
                            if let Err(err) = result {
                                tracing::warn!(member = member.name(), error = %err, "member failure stopped the group");
                                stopped = Some(RunError::Stopped {
                                    member: member.name().to_string(),
                                    source: Box::new(err),
                                });
                            }
                        }
                        desired -= 1;
                        continue;
                    }

                    let Some(runner) = member.loader().and_then(|loader| loader.load()) else {
                        tracing::debug!(member = member.name(), "nothing to relaunch; member retired");
                        desired -= 1;
                        continue;
                    };

                    let member = member.reloaded(runner);
                    let launch = launch_tx.clone();
                    tokio::spawn(async move {
                        let process = Process::invoke(Arc::clone(member.runner())).await;
                        let _ = launch.send(Running { member, process });
                    });
                }
            }
        }

        match stopped {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
