use crate::{foundation::core::ViewportRect, trigger::pin::PinType};

/// The scroller contract the trigger engine reads scroll state through.
///
/// Mirrors a `scrollerProxy` registration: the engine never touches the
/// scrolling surface directly.
pub trait ScrollerProxy {
    /// Current vertical offset.
    fn scroll_top(&self) -> f64;

    /// Jump to `value`.
    fn set_scroll_top(&mut self, value: f64);

    /// Current horizontal offset.
    fn scroll_left(&self) -> f64 {
        0.0
    }

    /// Viewport rect in client coordinates.
    fn bounding_client_rect(&self) -> ViewportRect;

    /// How pinned elements should be held.
    fn pin_type(&self) -> PinType;
}
