//! # Group members.
//!
//! A [`Member`] is a named runner, optionally carrying a
//! [`RestartPolicy`](crate::RestartPolicy) and a [`Loader`](crate::Loader)
//! used by [`RunGroup`](crate::RunGroup) to replace it after it exits.
//!
//! ## Rules
//! - Names are unique within one group generation; [`validate`] checks a
//!   member list before anything starts.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::RunError;
use crate::process::{LoaderRef, RunnerRef};
use crate::restart::RestartPolicy;

/// A named runner inserted into a group.
#[derive(Clone)]
pub struct Member {
    name: Arc<str>,
    runner: RunnerRef,
    restart: Option<RestartPolicy>,
    loader: Option<LoaderRef>,
}

impl Member {
    /// Creates a member without restart policy or loader.
    pub fn new(name: impl Into<Arc<str>>, runner: RunnerRef) -> Self {
        Self {
            name: name.into(),
            runner,
            restart: None,
            loader: None,
        }
    }

    /// Returns a member with the given restart policy.
    pub fn with_restart(mut self, policy: RestartPolicy) -> Self {
        self.restart = Some(policy);
        self
    }

    /// Returns a member with the given loader.
    pub fn with_loader(mut self, loader: LoaderRef) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Returns the member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the runner.
    pub fn runner(&self) -> &RunnerRef {
        &self.runner
    }

    /// Returns the restart policy, if any.
    pub fn restart(&self) -> Option<&RestartPolicy> {
        self.restart.as_ref()
    }

    /// Returns the loader, if any.
    pub fn loader(&self) -> Option<&LoaderRef> {
        self.loader.as_ref()
    }

    /// Same name, policy and loader with a freshly loaded runner.
    pub(crate) fn reloaded(&self, runner: RunnerRef) -> Self {
        Self {
            runner,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("restart", &self.restart)
            .field("loader", &self.loader.is_some())
            .finish_non_exhaustive()
    }
}

/// Checks that member names are unique.
pub fn validate(members: &[Member]) -> Result<(), RunError> {
    let mut seen = HashSet::with_capacity(members.len());
    for member in members {
        if !seen.insert(member.name()) {
            return Err(RunError::DuplicateMember {
                name: member.name().to_string(),
            });
        }
    }
    Ok(())
}
