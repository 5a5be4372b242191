//! # Group clients.
//!
//! [`DynamicClient`] controls a running pool: it inserts members, closes the
//! pool, and attaches event listeners. [`StaticClient`] is the observe-only
//! subset handed out by static groups.
//!
//! ## Insert handshake
//! ```text
//! insert(member) ──► reserve slot on insert queue (cap 1)
//!                └─► send { member, admitted } ──► pool loop
//!                                                    ├─ admits ─► admitted.send(()) ─► Ok(())
//!                                                    └─ closes ─► request dropped   ─► Err(Closed)
//! ```
//! The pool only reads the queue while it has a free slot, so `insert`
//! resolves when the member is started, not when it is queued.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::error::InsertError;
use crate::events::{Broadcaster, EntranceEvent, ExitEvent, Listener};
use crate::group::Member;

/// Pending insertion, acknowledged by the pool once the member is started.
pub(crate) struct InsertRequest {
    pub(crate) member: Member,
    pub(crate) admitted: oneshot::Sender<()>,
}

/// Control and observation handle of a dynamic pool.
#[derive(Clone)]
pub struct DynamicClient {
    insert_tx: mpsc::Sender<InsertRequest>,
    closed: CancellationToken,
    pub(crate) entrance: Arc<Broadcaster<EntranceEvent>>,
    pub(crate) exit: Arc<Broadcaster<ExitEvent>>,
}

impl DynamicClient {
    pub(crate) fn new(event_buffer: usize) -> (Self, mpsc::Receiver<InsertRequest>) {
        let (insert_tx, insert_rx) = mpsc::channel(1);
        let client = Self {
            insert_tx,
            closed: CancellationToken::new(),
            entrance: Arc::new(Broadcaster::new(event_buffer)),
            exit: Arc::new(Broadcaster::new(event_buffer)),
        };
        (client, insert_rx)
    }

    /// Inserts `member`, waiting for a free slot.
    ///
    /// Resolves once the pool has started the member, or with
    /// [`InsertError::Closed`] if the pool stops admitting first.
    pub async fn insert(&self, member: Member) -> Result<(), InsertError> {
        let name = member.name().to_string();
        let closed = || InsertError::Closed { name: name.clone() };

        if self.closed.is_cancelled() {
            return Err(closed());
        }
        let permit = tokio::select! {
            permit = self.insert_tx.reserve() => permit.map_err(|_| closed())?,
            _ = self.closed.cancelled() => return Err(closed()),
        };

        let (admitted, ack) = oneshot::channel();
        permit.send(InsertRequest { member, admitted });
        ack.await.map_err(|_| closed())
    }

    /// Stops admission; the pool exits once its members have exited. Idempotent.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Resolves once the pool has been closed.
    pub async fn closed(&self) {
        self.closed.cancelled().await;
    }

    /// Returns `true` once the pool has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Attaches a listener for entrance events, seeded with past events.
    pub fn entrance_listener(&self) -> Listener<EntranceEvent> {
        self.entrance.attach()
    }

    /// Attaches a listener for exit events, seeded with past events.
    pub fn exit_listener(&self) -> Listener<ExitEvent> {
        self.exit.attach()
    }

    /// Returns the observe-only view of this client.
    pub fn as_static(&self) -> StaticClient {
        StaticClient {
            inner: self.clone(),
        }
    }

    pub(crate) fn close_token(&self) -> CancellationToken {
        self.closed.clone()
    }
}

/// Observe-only handle of a group.
#[derive(Clone)]
pub struct StaticClient {
    inner: DynamicClient,
}

impl StaticClient {
    /// Attaches a listener for entrance events, seeded with past events.
    pub fn entrance_listener(&self) -> Listener<EntranceEvent> {
        self.inner.entrance_listener()
    }

    /// Attaches a listener for exit events, seeded with past events.
    pub fn exit_listener(&self) -> Listener<ExitEvent> {
        self.inner.exit_listener()
    }

    /// Resolves once the group has been closed to new members.
    pub async fn closed(&self) {
        self.inner.closed().await;
    }

    /// Returns `true` once the group has been closed to new members.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
