//! # Exit trace of a group.
//!
//! [`ErrorTrace`] records every [`ExitEvent`] of a group in exit order. It is
//! the error value of a failed static group and renders as one line per member:
//!
//! ```text
//! Exit trace for group:
//! db exited with nil
//! api exited with error: address in use
//! ```

use std::fmt;

use crate::error::RunError;
use crate::events::ExitEvent;

/// Ordered exit events of a group.
#[derive(Clone, Debug, Default)]
pub struct ErrorTrace {
    exits: Vec<ExitEvent>,
}

impl ErrorTrace {
    /// Creates an empty trace with room for `capacity` exits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            exits: Vec::with_capacity(capacity),
        }
    }

    /// Records one exit.
    pub fn push(&mut self, exit: ExitEvent) {
        self.exits.push(exit);
    }

    /// Recorded exits, in exit order.
    pub fn exits(&self) -> &[ExitEvent] {
        &self.exits
    }

    /// Number of recorded exits.
    pub fn len(&self) -> usize {
        self.exits.len()
    }

    /// Returns `true` if nothing exited.
    pub fn is_empty(&self) -> bool {
        self.exits.is_empty()
    }

    /// Returns `true` if any recorded exit failed.
    pub fn has_failure(&self) -> bool {
        self.exits.iter().any(ExitEvent::is_failure)
    }

    /// `Ok(())` when every exit was clean, otherwise the trace as an error.
    pub fn into_result(self) -> Result<(), RunError> {
        if self.has_failure() {
            Err(RunError::Group(self))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ErrorTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Exit trace for group:")?;
        for exit in &self.exits {
            match &exit.result {
                Ok(()) => writeln!(f, "{} exited with nil", exit.member.name())?,
                Err(err) => writeln!(f, "{} exited with error: {err}", exit.member.name())?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for ErrorTrace {}
