//! # Lifecycle events emitted by pools.
//!
//! Every member inserted into a pool produces exactly one [`EntranceEvent`]
//! followed by exactly one [`ExitEvent`]:
//!
//! ```text
//! insert ──► ready ─────────────► EntranceEvent ──► ... ──► exit ──► ExitEvent
//!        └─► exit before ready ─► EntranceEvent ──────────────────► ExitEvent
//! ```

use crate::error::RunError;
use crate::group::Member;
use crate::process::Process;

/// A member became ready, or exited before it ever became ready.
///
/// Use [`Process::is_ready`] on `process` to tell the two apart.
#[derive(Clone, Debug)]
pub struct EntranceEvent {
    /// The member that entered.
    pub member: Member,
    /// Its running (or already exited) process.
    pub process: Process,
}

/// A member's process terminated.
#[derive(Clone, Debug)]
pub struct ExitEvent {
    /// The member that exited.
    pub member: Member,
    /// Its terminal result.
    pub result: Result<(), RunError>,
}

impl ExitEvent {
    /// Returns `true` if the member exited with an error.
    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}
