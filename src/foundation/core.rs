use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Scroll position as owned by the smooth-scroll virtualizer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollState {
    /// Current offset in px, `0 <= offset <= limit`.
    pub offset: f64,
    /// Viewport width in px.
    pub viewport_width: f64,
    /// Viewport height in px.
    pub viewport_height: f64,
}

impl ScrollState {
    /// Viewport dimensions as a [`Size`].
    pub fn viewport(self) -> Size {
        Size::new(self.viewport_width, self.viewport_height)
    }
}

/// Logical viewport rectangle reported to the trigger engine.
///
/// The scrolling surface is the container, so the rect is always anchored at
/// the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportRect {
    /// Always `0`.
    pub top: f64,
    /// Always `0`.
    pub left: f64,
    /// Viewport width in px.
    pub width: f64,
    /// Viewport height in px.
    pub height: f64,
}

impl ViewportRect {
    /// Top-left anchored rect for a viewport of `size`.
    pub fn anchored(size: Size) -> Self {
        Self {
            top: 0.0,
            left: 0.0,
            width: size.width,
            height: size.height,
        }
    }

    /// Dimensions as a [`Size`].
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Coarse device class used by smoothing and zoom calibration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DeviceClass {
    /// Viewport wider than the mobile breakpoint.
    Desktop,
    /// Viewport at or below the mobile breakpoint.
    Mobile,
}

impl DeviceClass {
    /// Default mobile breakpoint in px.
    pub const DEFAULT_BREAKPOINT_PX: f64 = 640.0;

    /// Classify a viewport width against `breakpoint_px` (inclusive).
    pub fn from_width(width: f64, breakpoint_px: f64) -> Self {
        if width <= breakpoint_px {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    /// `true` for [`DeviceClass::Mobile`].
    pub fn is_mobile(self) -> bool {
        matches!(self, Self::Mobile)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red, premultiplied.
    pub r: u8,
    /// Green, premultiplied.
    pub g: u8,
    /// Blue, premultiplied.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8Premul {
    /// All channels zero.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply a straight-alpha colour.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (straight alpha).
    pub fn parse_hex(s: &str) -> ReelResult<Self> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ReelError::validation(format!("color '{s}' must start with '#'")))?;
        let bad = || ReelError::validation(format!("invalid color '{s}'"));
        if !hex.is_ascii() {
            return Err(bad());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());

        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                    let v = ch.to_digit(16).ok_or_else(bad)? as u8;
                    *slot = v * 17;
                }
                Ok(Self::from_straight_rgba(out[0], out[1], out[2], 255))
            }
            6 => Ok(Self::from_straight_rgba(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Ok(Self::from_straight_rgba(
                byte(0)?,
                byte(2)?,
                byte(4)?,
                byte(6)?,
            )),
            _ => Err(bad()),
        }
    }

    /// Channel-wise linear blend, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
