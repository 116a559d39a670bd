use std::time::Duration;

use crate::foundation::error::{ReelError, ReelResult};

/// Fixed-delay retry budget for a dependency that becomes ready asynchronously.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Delay between polls.
    pub delay_ms: u64,
    /// `None` retries until teardown.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay_ms: 100,
            max_attempts: Some(50),
        }
    }
}

impl RetryPolicy {
    /// Retry every `delay_ms` without limit.
    pub fn unbounded(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            max_attempts: None,
        }
    }

    /// Delay between polls.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Reject a zero delay or a zero attempt budget.
    pub fn validate(&self) -> ReelResult<()> {
        if self.delay_ms == 0 {
            return Err(ReelError::validation("retry delay_ms must be > 0"));
        }
        if self.max_attempts == Some(0) {
            return Err(ReelError::validation("retry max_attempts must be > 0"));
        }
        Ok(())
    }
}

/// Outcome of a [`ReadyGate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateState {
    /// Still polling.
    Pending,
    /// The dependency reported ready.
    Ready,
    /// Gave up after exhausting the retry budget.
    Failed {
        /// Polls made before giving up.
        attempts: u32,
    },
}

impl GateState {
    /// Whether polling has stopped.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One-shot readiness signal polled from the frame loop.
///
/// The check runs at most once per `delay`; the gate settles on the first
/// success or once the attempt budget is spent.
#[derive(Clone, Debug)]
pub struct ReadyGate {
    name: String,
    policy: RetryPolicy,
    attempts: u32,
    next_at: Option<Duration>,
    state: GateState,
}

impl ReadyGate {
    /// Pending gate named `name` for logs.
    pub fn new(name: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            attempts: 0,
            next_at: None,
            state: GateState::Pending,
        }
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Number of checks made.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run `check` when the retry delay has passed and return the new state.
    pub fn poll(&mut self, now: Duration, check: impl FnOnce() -> bool) -> GateState {
        if self.state.is_terminal() {
            return self.state;
        }
        if self.next_at.is_some_and(|at| now < at) {
            return GateState::Pending;
        }

        self.attempts += 1;
        if check() {
            tracing::debug!(gate = %self.name, attempts = self.attempts, "ready");
            self.state = GateState::Ready;
            return self.state;
        }

        if self
            .policy
            .max_attempts
            .is_some_and(|max| self.attempts >= max)
        {
            tracing::error!(
                gate = %self.name,
                attempts = self.attempts,
                "dependency never became ready; giving up"
            );
            self.state = GateState::Failed {
                attempts: self.attempts,
            };
            return self.state;
        }

        if self.attempts == 1 {
            tracing::warn!(
                gate = %self.name,
                delay_ms = self.policy.delay_ms,
                "dependency not ready; retrying"
            );
        }
        self.next_at = Some(now + self.policy.delay());
        GateState::Pending
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/readiness.rs"]
mod tests;
