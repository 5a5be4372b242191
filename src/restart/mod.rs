//! Restart semantics: policies, the restart-driven run group and the restarter.
//!
//! ## Contents
//! - [`RestartPolicy`] / [`Restart`] per-exit decision (restart? signal? grace?)
//! - [`RunGroup`] members relaunched in place through their loader
//! - [`Restarter`] single runner reloaded by a callback after every exit
//!
//! ## Quick wiring
//! ```text
//! Member { runner, restart: RestartPolicy, loader }
//!      └─► RunGroup: exit ─► policy.evaluate(&result) ─► loader.load() ─► relaunch
//! ```
//!
//! ## Defaults
//! - Members without a policy behave as [`RestartPolicy::StopMe`].
//! - Grace timeouts are advisory; nothing inside the crate enforces them.

mod policy;
mod restarter;
mod run_group;

pub use policy::{
    DEFAULT_GRACE_TIMEOUT, DEFAULT_STOP_TIMEOUT, DecideFn, NO_TIMEOUT, Restart, RestartPolicy,
};
pub use restarter::{LoadFn, Restarter};
pub use run_group::RunGroup;
