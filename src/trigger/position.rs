use std::{fmt, str::FromStr};

use crate::{
    foundation::error::{ReelError, ReelResult},
    host::dom::ElementBox,
};

/// A point along an element or the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Fraction of the extent (`top` = 0, `center` = 0.5, `bottom` = 1, `"85%"` = 0.85).
    Fraction(f64),
    /// Absolute px from the leading edge.
    Px(f64),
}

impl Anchor {
    /// Parse `top`, `center`, `bottom`, `left`, `right`, `<n>%`, `<n>px` or a bare number.
    pub fn parse(tok: &str) -> ReelResult<Self> {
        let tok = tok.trim();
        let bad = || ReelError::validation(format!("invalid trigger anchor '{tok}'"));
        let num = |raw: &str| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(bad)
        };
        match tok {
            "top" | "left" => Ok(Self::Fraction(0.0)),
            "center" => Ok(Self::Fraction(0.5)),
            "bottom" | "right" => Ok(Self::Fraction(1.0)),
            _ => {
                if let Some(p) = tok.strip_suffix('%') {
                    Ok(Self::Fraction(num(p)? / 100.0))
                } else if let Some(p) = tok.strip_suffix("px") {
                    Ok(Self::Px(num(p)?))
                } else {
                    Ok(Self::Px(num(tok)?))
                }
            }
        }
    }

    /// Pixels along an extent of `extent`.
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Fraction(f) => f * extent,
            Self::Px(px) => px,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Fraction(v) if v == 0.0 => write!(f, "top"),
            Self::Fraction(v) if v == 0.5 => write!(f, "center"),
            Self::Fraction(v) if v == 1.0 => write!(f, "bottom"),
            Self::Fraction(v) => write!(f, "{}%", v * 100.0),
            Self::Px(v) => write!(f, "{v}px"),
        }
    }
}

/// Start or end of a trigger range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerPosition {
    /// Scroll offset at which `element` meets `viewport`, e.g. `"top 85%"`.
    Edge {
        /// Point on the trigger element.
        element: Anchor,
        /// Point on the viewport.
        viewport: Anchor,
    },
    /// `"+=<px>"` after the resolved start.
    After(f64),
    /// `"+=<n>%"`: a fraction of the viewport height after the resolved start.
    AfterViewport(f64),
    /// `"+=<n>h"`: a multiple of the trigger element's height after the resolved start.
    AfterHeight(f64),
}

impl TriggerPosition {
    /// Offset at which `element` on the trigger meets `viewport`.
    pub fn edge(element: Anchor, viewport: Anchor) -> Self {
        Self::Edge { element, viewport }
    }

    /// `"top top"`.
    pub fn top_top() -> Self {
        Self::edge(Anchor::Fraction(0.0), Anchor::Fraction(0.0))
    }

    /// End `mult × elementHeight` after the start; re-evaluated on every refresh.
    pub fn after_start_by_height(mult: f64) -> Self {
        Self::AfterHeight(mult)
    }

    /// Whether the position is measured from the resolved start.
    pub fn is_relative(self) -> bool {
        !matches!(self, Self::Edge { .. })
    }

    /// Resolve against an element box (already shifted by pin spacing) and the
    /// viewport height. `start` is required for relative positions.
    pub fn resolve(self, el: ElementBox, viewport_height: f64, start: Option<f64>) -> Option<f64> {
        match self {
            Self::Edge { element, viewport } => {
                Some(el.top + element.resolve(el.height) - viewport.resolve(viewport_height))
            }
            Self::After(px) => start.map(|s| s + px),
            Self::AfterViewport(frac) => start.map(|s| s + frac * viewport_height),
            Self::AfterHeight(mult) => start.map(|s| s + mult * el.height),
        }
    }
}

impl FromStr for TriggerPosition {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rel) = s.strip_prefix("+=") {
            let rel = rel.trim();
            let bad = || ReelError::validation(format!("invalid relative position '{s}'"));
            let num = |raw: &str| {
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(bad)
            };
            return if let Some(p) = rel.strip_suffix('%') {
                Ok(Self::AfterViewport(num(p)? / 100.0))
            } else if let Some(m) = rel.strip_suffix('h') {
                Ok(Self::AfterHeight(num(m)?))
            } else {
                Ok(Self::After(num(rel.strip_suffix("px").unwrap_or(rel))?))
            };
        }

        let mut parts = s.split_whitespace();
        let element = parts
            .next()
            .ok_or_else(|| ReelError::validation("trigger position must not be empty"))?;
        let viewport = parts.next().unwrap_or("top");
        if parts.next().is_some() {
            return Err(ReelError::validation(format!(
                "trigger position '{s}' has more than two parts"
            )));
        }
        Ok(Self::edge(Anchor::parse(element)?, Anchor::parse(viewport)?))
    }
}

impl fmt::Display for TriggerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Edge { element, viewport } => write!(f, "{element} {viewport}"),
            Self::After(px) => write!(f, "+={px}"),
            Self::AfterViewport(frac) => write!(f, "+={}%", frac * 100.0),
            Self::AfterHeight(mult) => write!(f, "+={mult}h"),
        }
    }
}

impl serde::Serialize for TriggerPosition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for TriggerPosition {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/position.rs"]
mod tests;
