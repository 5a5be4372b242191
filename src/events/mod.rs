//! Pool lifecycle events and their broadcaster.
//!
//! ## Contents
//! - [`EntranceEvent`], [`ExitEvent`] per-member lifecycle notifications
//! - [`Broadcaster`] fan-out with bounded replay, [`Listener`] its receiving end
//!
//! ## Quick reference
//! - **Publisher**: the pool control loop (`group::pool`), the only writer.
//! - **Consumers**: static-group strategies, the static group's exit trace,
//!   and any caller holding a client.

mod broadcaster;
mod event;

pub use broadcaster::{Broadcaster, Listener};
pub use event::{EntranceEvent, ExitEvent};
