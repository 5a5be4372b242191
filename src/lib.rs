//! # procvisor
//!
//! **Procvisor** composes async runners into supervised process groups.
//!
//! A [`Runner`] is a unit of work that reports readiness, runs until it is
//! signaled and returns a result. Invoking it yields a [`Process`] handle.
//! Groups are runners themselves, so trees of groups compose freely.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Member   Member   Member            (name + runner [+ restart policy, loader])
//!      │        │        │
//!      ▼        ▼        ▼
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │ StaticGroup                  │      │ RunGroup                     │
//! │  Init: Parallel/Ordered/...  │      │  RestartPolicy per exit      │
//! │  ErrorTrace of exits         │      │  Loader for relaunches       │
//! └──────────────┬───────────────┘      └──────────────┬───────────────┘
//!                ▼                                     │
//! ┌──────────────────────────────┐                     │
//! │ Pool (bounded concurrency)   │◄── DynamicClient    │
//! │  control loop: signal/close/ │    (insert, close,  │
//! │  insert/member events        │     listeners)      │
//! └───────┬──────────────┬───────┘                     │
//!         ▼              ▼                             ▼
//!   Broadcaster     Broadcaster               Process (one per member)
//!   (entrance)      (exit)                      ready / wait / signal
//! ```
//!
//! ### Lifecycle of a static group
//! ```text
//! Process::invoke(group)
//!   ├─► validate names
//!   ├─► start pool, init strategy inserts members
//!   ├─► init done ─► pool closed ─► group ready
//!   ├─► first exit ─► configured signal to every other member (once)
//!   └─► last exit  ─► Ok(()) or Err(Group(ErrorTrace))
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                          |
//! |-------------------|------------------------------------------------------------------|---------------------------------------------|
//! | **Processes**     | Start runners, await readiness and exit, deliver signals.        | [`Runner`], [`RunFn`], [`Process`]          |
//! | **Dynamic pools** | Bounded-concurrency groups with insertion and lifecycle events.  | [`Pool`], [`DynamicClient`], [`PoolConfig`] |
//! | **Static groups** | Fixed members started in parallel, in order or serially.         | [`StaticGroup`], [`Init`], [`ErrorTrace`]   |
//! | **Restarts**      | Relaunch members per exit decision, or reload a single runner.   | [`RunGroup`], [`RestartPolicy`], [`Restarter`] |
//! | **Events**        | Replaying fan-out of entrance and exit events.                   | [`Broadcaster`], [`Listener`]               |
//! | **Errors**        | Typed errors for runners and group outcomes.                     | [`RunError`], [`InsertError`]               |
//! | **OS signals**    | Forward process signals to a root process.                       | [`signals::monitor`]                        |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use procvisor::{Member, Process, ReadyNotifier, RunError, RunFn, Signal, Signals, StaticGroup};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), RunError> {
//!     let service = |name: &'static str| {
//!         RunFn::arc(move |mut signals: Signals, ready: ReadyNotifier| async move {
//!             ready.notify();
//!             let sig = signals.recv().await;
//!             tracing::info!(service = name, signal = %sig, "stopping");
//!             Ok(())
//!         })
//!     };
//!
//!     let group = StaticGroup::ordered(
//!         Some(Signal::Terminate),
//!         vec![
//!             Member::new("database", service("database")),
//!             Member::new("api", service("api")),
//!         ],
//!     );
//!
//!     let process = Process::invoke(Arc::new(group)).await;
//!     process.signal(Signal::Interrupt);
//!     process.wait().await
//! }
//! ```
mod config;
mod error;
mod events;
mod group;
mod process;
mod restart;
pub mod signals;

// ---- Public re-exports ----

pub use config::{DEFAULT_EVENT_BUFFER, PoolConfig, ReusePolicy, StopOrder};
pub use error::{InsertError, RunError};
pub use events::{Broadcaster, EntranceEvent, ExitEvent, Listener};
pub use group::{
    DynamicClient, ErrorTrace, Init, Member, Ordered, Parallel, Pool, Serial, StaticClient,
    StaticGroup, validate,
};
pub use process::{
    Loader, LoaderRef, Process, ReadyNotifier, RunFn, Runner, RunnerRef, Signals,
};
pub use restart::{
    DEFAULT_GRACE_TIMEOUT, DEFAULT_STOP_TIMEOUT, DecideFn, LoadFn, NO_TIMEOUT, Restart,
    RestartPolicy, Restarter, RunGroup,
};
pub use signals::Signal;
