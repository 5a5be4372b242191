//! # Restart policies for run-group members.
//!
//! A [`RestartPolicy`] is evaluated once per member exit and yields a
//! [`Restart`] decision: relaunch or retire the member, which signal (if any)
//! to send to the rest of the group first, and an advisory grace period.
//!
//! | Policy                          | Restart | Signal to group | Grace                     |
//! |---------------------------------|---------|-----------------|---------------------------|
//! | [`RestartPolicy::RestartMe`]    | yes     | none            | [`NO_TIMEOUT`]            |
//! | [`RestartPolicy::StopMe`]       | no      | none            | [`NO_TIMEOUT`]            |
//! | [`RestartPolicy::RestartGroup`] | yes     | `SIGINT`        | [`DEFAULT_GRACE_TIMEOUT`] |
//! | [`RestartPolicy::StopGroup`]    | no      | `SIGTERM`       | [`DEFAULT_GRACE_TIMEOUT`] |
//! | [`RestartPolicy::OnFailure`]    | on error| none            | [`NO_TIMEOUT`]            |
//! | [`RestartPolicy::Custom`]       | user    | user            | user                      |
//!
//! A decision that signals the group without restarting stops the group.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::RunError;
use crate::signals::Signal;

/// No grace period.
pub const NO_TIMEOUT: Duration = Duration::ZERO;
/// Suggested bound for a single member to stop after a signal.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);
/// Grace period suggested by the group-wide policies.
pub const DEFAULT_GRACE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Decision produced by evaluating a [`RestartPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Restart {
    /// Relaunch the member through its loader.
    pub attempt_restart: bool,
    /// Signal sent to the rest of the group before acting; `None` sends nothing.
    pub signal: Option<Signal>,
    /// Advisory time the group is given to settle. Not enforced.
    pub grace: Duration,
}

impl Restart {
    /// Returns `true` if this decision ends the whole group.
    pub fn stops_group(&self) -> bool {
        !self.attempt_restart && self.signal.is_some()
    }
}

/// Custom decision function over the member's exit result.
pub type DecideFn = Arc<dyn Fn(&Result<(), RunError>) -> Restart + Send + Sync>;

/// Policy controlling what happens after a member exits.
#[derive(Clone)]
pub enum RestartPolicy {
    /// Relaunch the member, leave the group alone.
    RestartMe,
    /// Retire the member, leave the group alone.
    StopMe,
    /// Interrupt the group, then relaunch the member.
    RestartGroup,
    /// Terminate the group and retire the member.
    StopGroup,
    /// Relaunch only after a failed exit.
    OnFailure,
    /// User-supplied decision.
    Custom(DecideFn),
}

impl RestartPolicy {
    /// Builds a [`RestartPolicy::Custom`] from a closure.
    pub fn custom<F>(decide: F) -> Self
    where
        F: Fn(&Result<(), RunError>) -> Restart + Send + Sync + 'static,
    {
        RestartPolicy::Custom(Arc::new(decide))
    }

    /// Evaluates the policy for one exit.
    pub fn evaluate(&self, exit: &Result<(), RunError>) -> Restart {
        match self {
            RestartPolicy::RestartMe => Restart {
                attempt_restart: true,
                signal: None,
                grace: NO_TIMEOUT,
            },
            RestartPolicy::StopMe => Restart {
                attempt_restart: false,
                signal: None,
                grace: NO_TIMEOUT,
            },
            RestartPolicy::RestartGroup => Restart {
                attempt_restart: true,
                signal: Some(Signal::Interrupt),
                grace: DEFAULT_GRACE_TIMEOUT,
            },
            RestartPolicy::StopGroup => Restart {
                attempt_restart: false,
                signal: Some(Signal::Terminate),
                grace: DEFAULT_GRACE_TIMEOUT,
            },
            RestartPolicy::OnFailure => Restart {
                attempt_restart: exit.is_err(),
                signal: None,
                grace: NO_TIMEOUT,
            },
            RestartPolicy::Custom(decide) => decide(exit),
        }
    }
}

impl Default for RestartPolicy {
    /// Returns [`RestartPolicy::StopMe`].
    fn default() -> Self {
        RestartPolicy::StopMe
    }
}

impl fmt::Debug for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestartPolicy::RestartMe => "RestartMe",
            RestartPolicy::StopMe => "StopMe",
            RestartPolicy::RestartGroup => "RestartGroup",
            RestartPolicy::StopGroup => "StopGroup",
            RestartPolicy::OnFailure => "OnFailure",
            RestartPolicy::Custom(_) => "Custom",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_decisions() {
        let ok = Ok(());
        assert!(RestartPolicy::RestartMe.evaluate(&ok).attempt_restart);
        assert!(!RestartPolicy::StopMe.evaluate(&ok).stops_group());

        let group = RestartPolicy::RestartGroup.evaluate(&ok);
        assert_eq!(group.signal, Some(Signal::Interrupt));
        assert_eq!(group.grace, DEFAULT_GRACE_TIMEOUT);
        assert!(!group.stops_group());

        let stop = RestartPolicy::StopGroup.evaluate(&ok);
        assert_eq!(stop.signal, Some(Signal::Terminate));
        assert!(stop.stops_group());
    }

    #[test]
    fn on_failure_restarts_only_failed_exits() {
        let policy = RestartPolicy::OnFailure;
        assert!(!policy.evaluate(&Ok(())).attempt_restart);
        assert!(policy.evaluate(&Err(RunError::fail("boom"))).attempt_restart);
    }

    #[test]
    fn custom_sees_the_exit() {
        let policy = RestartPolicy::custom(|exit| Restart {
            attempt_restart: false,
            signal: exit.is_err().then_some(Signal::Quit),
            grace: DEFAULT_STOP_TIMEOUT,
        });
        assert_eq!(policy.evaluate(&Ok(())).signal, None);
        assert_eq!(
            policy.evaluate(&Err(RunError::fail("x"))).signal,
            Some(Signal::Quit)
        );
        assert_eq!(format!("{policy:?}"), "Custom");
    }
}
