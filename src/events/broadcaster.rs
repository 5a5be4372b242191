//! # Event broadcaster with bounded replay.
//!
//! [`Broadcaster`] fans every event out to all attached [`Listener`]s and keeps
//! the last `capacity` events in a sliding buffer. A listener attached late is
//! seeded with that buffer, so attaching after an event was broadcast does not
//! lose it.
//!
//! ## Architecture
//! ```text
//! broadcast(ev) ──► lock ──┬──► [queue L1] ──► Listener 1
//!                          ├──► [queue L2] ──► Listener 2
//!                          └──► replay buffer (last `capacity` events)
//!
//! attach() ──► lock ──► new queue ◄── copy of replay buffer (oldest first)
//!                       register queue
//! ```
//!
//! ## Rules
//! - Seeding and registration happen under the same lock as broadcasting: a
//!   new listener sees every event exactly once, with no gap or duplicate.
//! - Sends never block; the lock is never held across an `.await`.
//! - `close()` ends every stream; later `attach()` calls get the replay and
//!   then end-of-stream.
//! - Dropped listeners are pruned on the next broadcast.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

struct State<T> {
    subscribers: Vec<mpsc::UnboundedSender<T>>,
    buffer: VecDeque<T>,
    closed: bool,
}

/// Multi-subscriber broadcaster with a bounded replay buffer.
pub struct Broadcaster<T> {
    capacity: usize,
    state: Mutex<State<T>>,
}

impl<T: Clone + Send + 'static> Broadcaster<T> {
    /// Creates a broadcaster replaying up to `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(State {
                subscribers: Vec::new(),
                buffer: VecDeque::with_capacity(capacity),
                closed: false,
            }),
        }
    }

    /// Attaches a new listener seeded with the replay buffer.
    pub fn attach(&self) -> Listener<T> {
        let mut state = self.lock();
        let (tx, rx) = mpsc::unbounded_channel();
        for event in &state.buffer {
            let _ = tx.send(event.clone());
        }
        if !state.closed {
            state.subscribers.push(tx);
        }
        Listener { rx }
    }

    /// Delivers `event` to every live listener and records it for replay.
    pub fn broadcast(&self, event: T) {
        let mut state = self.lock();
        if state.closed {
            tracing::warn!("event broadcast after close dropped");
            return;
        }
        state
            .subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
        if state.buffer.len() == self.capacity {
            state.buffer.pop_front();
        }
        state.buffer.push_back(event);
    }

    /// Ends every listener stream. Idempotent.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.subscribers.clear();
    }

    /// Returns `true` once [`Broadcaster::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Replay buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving end of one broadcaster subscription.
#[derive(Debug)]
pub struct Listener<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Listener<T> {
    /// Waits for the next event; `None` once the broadcaster is closed and drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Returns an already delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}
