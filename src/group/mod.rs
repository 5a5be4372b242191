//! Groups of members: the dynamic pool and static groups built on it.
//!
//! ## Contents
//! - [`Member`] named runner, [`validate`] name uniqueness check
//! - [`Pool`] bounded-concurrency dynamic group, driven by a [`DynamicClient`]
//! - [`StaticGroup`] fixed membership started by an [`Init`] strategy
//!   ([`Parallel`], [`Ordered`], [`Serial`]); observed through a [`StaticClient`]
//! - [`ErrorTrace`] ordered exit results, the error of a failed static group
//!
//! ## Quick wiring
//! ```text
//! StaticGroup::run ──► Process(Pool) ◄── DynamicClient ◄── Init
//!        ▲                  │
//!        └── exit listener ◄┘ (ErrorTrace)
//! ```

mod client;
mod member;
mod pool;
mod static_group;
mod strategies;
mod trace;

pub use client::{DynamicClient, StaticClient};
pub use member::{Member, validate};
pub use pool::Pool;
pub use static_group::StaticGroup;
pub use strategies::{Init, Ordered, Parallel, Serial};
pub use trace::ErrorTrace;
