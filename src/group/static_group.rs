//! # StaticGroup: fixed membership, one startup strategy.
//!
//! ## Lifecycle
//! ```text
//! run()
//!   ├─► validate member names          (duplicate ─► Err, nothing started)
//!   ├─► attach exit listener
//!   ├─► Process::background(pool)      (capacity = members.len())
//!   ├─► spawn: init(members, client) ─► client.close() ─► ready.notify()
//!   └─► loop:
//!         signal   ─► forwarded to pool
//!         exit     ─► ErrorTrace.push
//!         end      ─► Ok(()) if every exit was clean, else Err(Group(trace))
//! ```
//!
//! Members are stopped together, except in a [`StaticGroup::queue_ordered`]
//! group where they are stopped oldest first.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{PoolConfig, StopOrder};
use crate::error::RunError;
use crate::group::member::{self, Member};
use crate::group::strategies::{Init, Ordered, Parallel, Serial};
use crate::group::{ErrorTrace, Pool, StaticClient};
use crate::process::{Process, ReadyNotifier, Runner, RunnerRef, Signals};
use crate::signals::Signal;

/// Group with fixed members started by one [`Init`] strategy.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use procvisor::{Member, Process, ReadyNotifier, RunFn, Signal, Signals, StaticGroup};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let server = || RunFn::arc(|mut signals: Signals, ready: ReadyNotifier| async move {
///     ready.notify();
///     signals.recv().await;
///     Ok(())
/// });
///
/// let group = StaticGroup::ordered(
///     Some(Signal::Interrupt),
///     vec![Member::new("db", server()), Member::new("api", server())],
/// );
/// let process = Process::invoke(Arc::new(group)).await;
/// process.signal(Signal::Terminate);
/// assert!(process.wait().await.is_ok());
/// # }
/// ```
pub struct StaticGroup {
    pool: Arc<Pool>,
    members: Vec<Member>,
    init: Arc<dyn Init>,
}

impl StaticGroup {
    /// Creates a group started by a custom [`Init`].
    ///
    /// Inside `init` the group behaves as a dynamic pool sized to `members`;
    /// once it returns the pool is closed.
    pub fn new(signal: Option<Signal>, members: Vec<Member>, init: impl Init) -> Self {
        let config = PoolConfig::sized(signal, members.len());
        Self::with_config(config, members, init)
    }

    fn with_config(config: PoolConfig, members: Vec<Member>, init: impl Init) -> Self {
        Self {
            pool: Arc::new(Pool::new(config)),
            members,
            init: Arc::new(init),
        }
    }

    /// Starts all members at once. See [`Parallel`].
    pub fn parallel(signal: Option<Signal>, members: Vec<Member>) -> Self {
        Self::new(signal, members, Parallel)
    }

    /// Starts members one after another, each once the previous is ready. See [`Ordered`].
    pub fn ordered(signal: Option<Signal>, members: Vec<Member>) -> Self {
        Self::new(signal, members, Ordered)
    }

    /// Starts members like [`ordered`](Self::ordered) but stops them one at a
    /// time, oldest first.
    ///
    /// A shutdown signal reaches only the oldest running member; the next one
    /// is signaled with the latest shutdown signal once it has exited. Every
    /// repeated signal is forwarded to the current oldest member.
    pub fn queue_ordered(signal: Option<Signal>, members: Vec<Member>) -> Self {
        let config = PoolConfig {
            stop_order: StopOrder::Fifo,
            ..PoolConfig::sized(signal, members.len())
        };
        Self::with_config(config, members, Ordered)
    }

    /// Runs members as a pipeline, each once the previous exited cleanly. See [`Serial`].
    pub fn serial(members: Vec<Member>) -> Self {
        Self::new(None, members, Serial)
    }

    /// Returns the observe-only client of the underlying pool.
    pub fn client(&self) -> StaticClient {
        self.pool.client().as_static()
    }

    /// Returns the members.
    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

#[async_trait]
impl Runner for StaticGroup {
    async fn run(&self, mut signals: Signals, ready: ReadyNotifier) -> Result<(), RunError> {
        member::validate(&self.members)?;

        let client = self.pool.client();
        let mut exits = client.exit_listener();
        let pool: RunnerRef = self.pool.clone();
        let pool = Process::background(pool);

        let init = Arc::clone(&self.init);
        let members = self.members.clone();
        let init_client = client.clone();
        tokio::spawn(async move {
            init.init(&members, &init_client).await;
            init_client.close();
            ready.notify();
        });

        let mut trace = ErrorTrace::with_capacity(self.members.len());
        loop {
            tokio::select! {
                sig = signals.recv() => pool.signal(sig),
                exit = exits.recv() => match exit {
                    Some(exit) => trace.push(exit),
                    None => break,
                },
            }
        }

        pool.wait().await?;
        trace.into_result()
    }
}
