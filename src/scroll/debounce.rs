use std::time::Duration;

/// Coalesces bursts of events into one, fired after `quiet` without a new event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    /// Idle debouncer firing `quiet` after the last event.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Record an event at `now`, pushing the deadline back.
    pub fn trigger(&mut self, now: Duration) {
        self.deadline = Some(now + self.quiet);
    }

    /// `true` exactly once per burst, on the first poll at or after the deadline.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a burst is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/debounce.rs"]
mod tests;
