//! Error types used by runners, processes and groups.
//!
//! This module defines two error enums:
//!
//! - [`RunError`]: the terminal result of a runner that did not stop cleanly.
//! - [`InsertError`]: raised when a member cannot be inserted into a pool.
//!
//! `RunError` is `Clone` because one exit result is observed by any number of
//! [`Process::wait`](crate::Process::wait) callers and group listeners.

use thiserror::Error;

use crate::group::ErrorTrace;

/// # Terminal error of a runner.
///
/// Returned from [`Runner::run`](crate::Runner::run) and observed through
/// [`Process::wait`](crate::Process::wait) and [`ExitEvent`](crate::ExitEvent)s.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum RunError {
    /// Runner failed with an error message.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Runner panicked; the panic was caught by the process wrapper.
    #[error("runner panicked: {reason}")]
    Panicked {
        /// Panic payload rendered as text.
        reason: String,
    },

    /// Two members of one group share a name; nothing was started.
    #[error("duplicate member name: {name:?}")]
    DuplicateMember {
        /// The offending name.
        name: String,
    },

    /// A runner that may only run once was invoked a second time.
    #[error("runner is already running")]
    AlreadyRunning,

    /// A restarter was run without a load callback.
    #[error("no load callback configured")]
    NoLoadCallback,

    /// At least one member of a static group exited with an error.
    #[error(transparent)]
    Group(ErrorTrace),

    /// A restart policy stopped the group after a member failed.
    #[error("group stopped by {member:?}: {source}")]
    Stopped {
        /// Name of the member whose policy stopped the group.
        member: String,
        /// The member's exit error.
        source: Box<RunError>,
    },
}

impl RunError {
    /// Shorthand for [`RunError::Fail`].
    ///
    /// # Example
    /// ```
    /// use procvisor::RunError;
    ///
    /// let err = RunError::fail("connection refused");
    /// assert_eq!(err.to_string(), "connection refused");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        RunError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use procvisor::RunError;
    ///
    /// assert_eq!(RunError::NoLoadCallback.as_label(), "run_no_load_callback");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::Fail { .. } => "run_failed",
            RunError::Panicked { .. } => "run_panicked",
            RunError::DuplicateMember { .. } => "run_duplicate_member",
            RunError::AlreadyRunning => "run_already_running",
            RunError::NoLoadCallback => "run_no_load_callback",
            RunError::Group(_) => "run_group_failed",
            RunError::Stopped { .. } => "run_group_stopped",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RunError::Fail { error } => format!("error: {error}"),
            RunError::Panicked { reason } => format!("panic: {reason}"),
            RunError::DuplicateMember { name } => format!("duplicate member: {name}"),
            RunError::AlreadyRunning => "already running".to_string(),
            RunError::NoLoadCallback => "no load callback".to_string(),
            RunError::Group(trace) => format!("group failed: {} exits", trace.len()),
            RunError::Stopped { member, source } => {
                format!("stopped by {member}: {}", source.as_message())
            }
        }
    }

    /// Returns the exit trace if this error came from a static group.
    pub fn trace(&self) -> Option<&ErrorTrace> {
        match self {
            RunError::Group(trace) => Some(trace),
            _ => None,
        }
    }
}

/// # Errors produced when inserting into a pool.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum InsertError {
    /// The pool stopped admitting members before this one was started.
    #[error("group is closed to new members (rejected {name:?})")]
    Closed {
        /// Name of the rejected member.
        name: String,
    },
}
