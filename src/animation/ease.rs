use crate::foundation::error::{ReelError, ReelResult};

/// Easing curves. GSAP `power1` is quadratic and `power2` is cubic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// `t`
    #[default]
    #[serde(alias = "none")]
    Linear,
    /// `t²`
    #[serde(alias = "power1.in")]
    InQuad,
    /// `1 - (1 - t)²`
    #[serde(alias = "power1.out")]
    OutQuad,
    /// Quadratic in, then quadratic out.
    #[serde(alias = "power1.inOut")]
    InOutQuad,
    /// `t³`
    #[serde(alias = "power2.in")]
    InCubic,
    /// `1 - (1 - t)³`
    #[serde(alias = "power2.out")]
    OutCubic,
    /// Cubic in, then cubic out.
    #[serde(alias = "power2.inOut")]
    InOutCubic,
}

impl Ease {
    /// Eased value of `t`, clamped to `[0, 1]` first.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }

    /// Resolve a GSAP-style ease name such as `"power2.out"`.
    pub fn from_name(name: &str) -> ReelResult<Self> {
        Ok(match name.trim() {
            "none" | "linear" => Self::Linear,
            "power1.in" => Self::InQuad,
            "power1.out" | "power1" => Self::OutQuad,
            "power1.inOut" => Self::InOutQuad,
            "power2.in" => Self::InCubic,
            "power2.out" | "power2" => Self::OutCubic,
            "power2.inOut" => Self::InOutCubic,
            other => {
                return Err(ReelError::validation(format!("unknown ease '{other}'")));
            }
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
