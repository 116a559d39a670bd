use std::time::Duration;

use crate::animation::ease::Ease;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Playback {
    Paused,
    Forward,
    Reverse,
}

/// Outcome of advancing a [`Tween`] by one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenStep {
    /// Not playing.
    Idle,
    /// Moved but not finished.
    Running,
    /// Reached the end while playing forward.
    Completed,
    /// Reached the start while playing in reverse.
    ReverseCompleted,
}

/// Time-driven `0 → 1` tween with play/reverse, used by toggle-style reveals.
#[derive(Clone, Debug)]
pub struct Tween {
    duration_secs: f64,
    ease: Ease,
    elapsed_secs: f64,
    playback: Playback,
}

impl Tween {
    /// Paused at the start.
    pub fn new(duration: Duration, ease: Ease) -> Self {
        Self {
            duration_secs: duration.as_secs_f64(),
            ease,
            elapsed_secs: 0.0,
            playback: Playback::Paused,
        }
    }

    /// Run forward from the current position.
    pub fn play(&mut self) {
        self.playback = Playback::Forward;
    }

    /// Run back toward the start.
    pub fn reverse(&mut self) {
        self.playback = Playback::Reverse;
    }

    /// Hold the current position.
    pub fn pause(&mut self) {
        self.playback = Playback::Paused;
    }

    /// Whether the tween is moving in either direction.
    pub fn is_playing(&self) -> bool {
        self.playback != Playback::Paused
    }

    /// Linear time progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            return if self.elapsed_secs > 0.0 { 1.0 } else { 0.0 };
        }
        (self.elapsed_secs / self.duration_secs).clamp(0.0, 1.0)
    }

    /// Eased progress.
    pub fn value(&self) -> f64 {
        self.ease.apply(self.progress())
    }

    /// Move by `dt` in the current direction.
    pub fn advance(&mut self, dt: Duration) -> TweenStep {
        let dt = dt.as_secs_f64();
        match self.playback {
            Playback::Paused => TweenStep::Idle,
            Playback::Forward => {
                let end = self.duration_secs.max(f64::MIN_POSITIVE);
                self.elapsed_secs = (self.elapsed_secs + dt).min(end);
                if self.elapsed_secs >= end {
                    self.playback = Playback::Paused;
                    TweenStep::Completed
                } else {
                    TweenStep::Running
                }
            }
            Playback::Reverse => {
                self.elapsed_secs = (self.elapsed_secs - dt).max(0.0);
                if self.elapsed_secs <= 0.0 {
                    self.playback = Playback::Paused;
                    TweenStep::ReverseCompleted
                } else {
                    TweenStep::Running
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
