use std::time::Duration;

/// How trigger progress follows the raw scroll progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scrub {
    /// Progress is tracked but effects react to enter/leave toggles.
    #[default]
    Off,
    /// Delivered progress equals raw progress on every tick.
    Immediate,
    /// Delivered progress catches up with raw progress over roughly this many seconds.
    Smooth(f64),
}

impl Scrub {
    /// GSAP-style `scrub` value: `true`, `false` or a lag in seconds.
    pub fn from_lag_secs(lag: Option<f64>) -> Self {
        match lag {
            None => Self::Immediate,
            Some(secs) if secs <= 0.0 => Self::Immediate,
            Some(secs) => Self::Smooth(secs),
        }
    }
}

/// Exponential follower used for [`Scrub::Smooth`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrubSmoother {
    value: f64,
}

impl ScrubSmoother {
    const SETTLE_EPS: f64 = 1e-4;
    // e^-4 ~ 0.018: about 98% of the distance is covered after the lag.
    const LAG_RATE: f64 = 4.0;

    /// Jump straight to `target`.
    pub fn snap(&mut self, target: f64) {
        self.value = target;
    }

    /// Move toward `target` by `dt` under `scrub` and return the new value.
    pub fn follow(&mut self, target: f64, dt: Duration, scrub: Scrub) -> f64 {
        match scrub {
            Scrub::Off | Scrub::Immediate => self.value = target,
            Scrub::Smooth(secs) if secs <= 0.0 => self.value = target,
            Scrub::Smooth(secs) => {
                let alpha = 1.0 - (-Self::LAG_RATE * dt.as_secs_f64() / secs).exp();
                self.value += (target - self.value) * alpha;
                if (target - self.value).abs() < Self::SETTLE_EPS {
                    self.value = target;
                }
            }
        }
        self.value
    }

    /// Whether the value has yet to reach `target`.
    pub fn is_settling(self, target: f64) -> bool {
        self.value != target
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scrub.rs"]
mod tests;
