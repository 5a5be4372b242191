//! # Pool configuration.
//!
//! Provides [`PoolConfig`], the settings of one dynamic pool.
//!
//! Config is used in two ways:
//! 1. **Dynamic pools**: `Pool::new(config)`
//! 2. **Static groups**: built internally with `PoolConfig::sized(signal, members.len())`
//!
//! ## Sentinel values
//! - `capacity = 0` → unlimited concurrency
//! - `event_buffer = 0` → replay as many events as `capacity` (1024 when unlimited)

use crate::signals::Signal;

/// Replay buffer size used when neither the buffer nor the capacity is bounded.
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

/// Whether a pool admits new members again after an unplanned exit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReusePolicy {
    /// A freed slot reopens insertion while the pool is neither signaled nor
    /// closed, so the pool can be reused indefinitely (default).
    #[default]
    Reopen,
    /// Once the pool has filled up it never admits again; it terminates when
    /// its last member exits.
    Once,
}

/// How a shutdown signal reaches the members of a pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopOrder {
    /// Every running member is signaled at once (default).
    #[default]
    Parallel,
    /// Only the oldest running member is signaled; the next one is signaled
    /// once it has exited. Repeated signals go to the current oldest member.
    Fifo,
}

/// Configuration of a dynamic pool.
///
/// ## Field semantics
/// - `capacity`: Maximum concurrently running members (`0` = unlimited)
/// - `signal`: Signal sent to every remaining member on the first member exit
///   (`None` = members are independent)
/// - `event_buffer`: Replay buffer size of the entrance/exit broadcasters
///   (`0` = derived from `capacity`)
/// - `reuse`: Admission behavior after an exit, see [`ReusePolicy`]
/// - `stop_order`: Order in which members are signaled, see [`StopOrder`]
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum number of members running at once.
    pub capacity: usize,

    /// Termination signal propagated on the first member exit.
    pub signal: Option<Signal>,

    /// Replay buffer size for entrance and exit listeners.
    pub event_buffer: usize,

    /// Admission behavior after a member exits.
    pub reuse: ReusePolicy,

    /// Order in which shutdown signals reach the members.
    pub stop_order: StopOrder,
}

impl PoolConfig {
    /// Config for a pool holding exactly `capacity` members, replaying all of their events.
    pub fn sized(signal: Option<Signal>, capacity: usize) -> Self {
        Self {
            capacity,
            signal,
            event_buffer: capacity,
            reuse: ReusePolicy::default(),
            stop_order: StopOrder::default(),
        }
    }

    /// Returns the concurrency limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` running members
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.capacity == 0 {
            None
        } else {
            Some(self.capacity)
        }
    }

    /// Returns the replay buffer size, resolving the `0` sentinel and clamping to at least 1.
    #[inline]
    pub fn event_buffer_clamped(&self) -> usize {
        match (self.event_buffer, self.capacity) {
            (0, 0) => DEFAULT_EVENT_BUFFER,
            (0, capacity) => capacity,
            (buffer, _) => buffer,
        }
        .max(1)
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `capacity = 0` (unlimited)
    /// - `signal = None` (independent members)
    /// - `event_buffer = 0` (derived)
    /// - `reuse = ReusePolicy::Reopen`
    /// - `stop_order = StopOrder::Parallel`
    fn default() -> Self {
        Self {
            capacity: 0,
            signal: None,
            event_buffer: 0,
            reuse: ReusePolicy::default(),
            stop_order: StopOrder::default(),
        }
    }
}
