//! Process primitive: runners and the handles of invoked runners.
//!
//! ## Contents
//! - [`Runner`], [`Loader`] capability traits and [`RunnerRef`] / [`LoaderRef`] handles
//! - [`Signals`], [`ReadyNotifier`] the two channels a runner is given
//! - [`RunFn`] closure-backed runner
//! - [`Process`] live handle: `ready` / `wait` / `signal`

mod handle;
mod run_fn;
mod runner;

pub use handle::Process;
pub use run_fn::RunFn;
pub use runner::{Loader, LoaderRef, ReadyNotifier, Runner, RunnerRef, Signals};
