use std::time::Duration;

use crate::{
    foundation::core::{DeviceClass, Size, Vec2, ViewportRect},
    foundation::error::{ReelError, ReelResult},
    foundation::math::EPS,
    host::{
        dom::{Document, ElementId, StylePatch, TransformStyle},
        scroller::{ScrollEvent, ScrollToOpts, SmoothScroller},
    },
    scroll::debounce::Debouncer,
    trigger::{
        engine::{RefreshReport, TriggerEngine},
        pin::PinType,
        proxy::ScrollerProxy,
    },
};

/// Options for [`ScrollBridge::set_position`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetPositionOpts {
    /// Jump without interpolation.
    pub instant: bool,
}

impl SetPositionOpts {
    /// Jump without interpolation.
    pub fn instant() -> Self {
        Self { instant: true }
    }
}

/// Gives the trigger engine a consistent view of a scroll position that is
/// owned by a smoothing virtualizer instead of the native viewport.
///
/// The bridge is the only writer of the scroll offset; everything else asks
/// through [`ScrollBridge::set_position`] or the [`ScrollerProxy`] impl.
pub struct ScrollBridge {
    container: ElementId,
    scroller: Box<dyn SmoothScroller>,
    viewport: Size,
    breakpoint_px: f64,
    native_offset: f64,
    container_transformed: bool,
    resize: Debouncer,
    notified: bool,
    content_height: f64,
    pin_spacing: f64,
}

impl std::fmt::Debug for ScrollBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollBridge")
            .field("container", &self.container)
            .field("viewport", &self.viewport)
            .field("offset", &self.scroller.offset())
            .field("pin_spacing", &self.pin_spacing)
            .finish_non_exhaustive()
    }
}

impl ScrollBridge {
    /// Duration requested for non-instant programmatic scrolls.
    pub const SMOOTH_SCROLL_DURATION: Duration = Duration::from_millis(1000);

    /// Bind `scroller` to the container matched by `selector`.
    ///
    /// A missing container is logged and reported; callers do not retry.
    pub fn attach(
        doc: &dyn Document,
        selector: &str,
        scroller: Box<dyn SmoothScroller>,
        resize_quiet: Duration,
    ) -> ReelResult<Self> {
        let Some(container) = doc.query(selector) else {
            tracing::warn!(selector, "scroll container not found; smooth scrolling disabled");
            return Err(ReelError::missing_element(selector));
        };
        let mut bridge = Self {
            container,
            scroller,
            viewport: doc.viewport(),
            breakpoint_px: DeviceClass::DEFAULT_BREAKPOINT_PX,
            native_offset: 0.0,
            container_transformed: false,
            resize: Debouncer::new(resize_quiet),
            notified: false,
            content_height: doc.content_height(),
            pin_spacing: 0.0,
        };
        bridge.observe(doc);
        bridge.sync_device();
        Ok(bridge)
    }

    /// Classify viewports against `breakpoint_px` instead of the default.
    pub fn with_mobile_breakpoint(mut self, breakpoint_px: f64) -> Self {
        self.breakpoint_px = breakpoint_px;
        self.sync_device();
        self
    }

    /// Device class of the current viewport; the scroller smooths per class.
    pub fn device(&self) -> DeviceClass {
        DeviceClass::from_width(self.viewport.width, self.breakpoint_px)
    }

    fn sync_device(&mut self) {
        let device = self.device();
        self.scroller.set_device(device);
    }

    /// The scrolling container.
    pub fn container(&self) -> ElementId {
        self.container
    }

    /// Whether the virtualizer's own dependencies have loaded.
    pub fn is_scroller_ready(&self) -> bool {
        self.scroller.is_ready()
    }

    /// The virtualizer behind the bridge.
    pub fn scroller(&self) -> &dyn SmoothScroller {
        self.scroller.as_ref()
    }

    /// Snapshot the host state the bridge falls back on.
    pub fn observe(&mut self, doc: &dyn Document) {
        self.native_offset = doc.native_scroll_top(self.container);
        self.container_transformed = doc.has_transform(self.container);
    }

    /// Virtualizer offset, or the container's native offset before the first
    /// measurement; never negative.
    pub fn get_position(&self) -> f64 {
        let pos = self.scroller.offset().unwrap_or(self.native_offset);
        if pos.is_nan() { 0.0 } else { pos.max(0.0) }
    }

    /// Move the virtualizer and request a trigger recompute.
    pub fn set_position(&mut self, value: f64, opts: SetPositionOpts) {
        let scroll_opts = if opts.instant {
            ScrollToOpts::instant()
        } else {
            ScrollToOpts {
                duration: Self::SMOOTH_SCROLL_DURATION,
                disable_lerp: false,
            }
        };
        tracing::debug!(value, instant = opts.instant, "scroll to");
        self.scroller.scroll_to(value, scroll_opts);
        self.notified = true;
    }

    /// Top-left anchored: the container, not the document, scrolls.
    pub fn viewport_rect(&self) -> ViewportRect {
        ViewportRect::anchored(self.viewport)
    }

    /// Transform pinning while the container is translated, fixed otherwise.
    pub fn pin_strategy(&self) -> PinType {
        if self.container_transformed || self.scroller.is_smoothing() {
            PinType::Transform
        } else {
            PinType::Fixed
        }
    }

    /// Style the virtualizer applies to the container for the current offset.
    pub fn container_style(&self) -> StylePatch {
        let translate = if self.scroller.is_smoothing() {
            Vec2::new(0.0, -self.get_position())
        } else {
            Vec2::ZERO
        };
        StylePatch::Transform(TransformStyle::translate(translate))
    }

    /// Advance the virtualizer by one animation frame.
    pub fn tick(&mut self, dt: Duration) -> Option<ScrollEvent> {
        let event = self.scroller.tick(dt);
        if let Some(ev) = event {
            tracing::trace!(offset = ev.offset, delta = ev.delta, "scroll tick");
            self.notified = true;
        }
        event
    }

    /// Ask for a trigger recompute before the next paint.
    pub fn notify(&mut self) {
        self.notified = true;
    }

    /// Consume the pending recompute request.
    pub fn take_notified(&mut self) -> bool {
        std::mem::take(&mut self.notified)
    }

    /// Record the new viewport and start (or extend) the resize debounce.
    ///
    /// The device class switches immediately; measurement waits for the
    /// debounced refresh.
    pub fn on_resize(&mut self, now: Duration, viewport: Size) {
        self.viewport = viewport;
        self.sync_device();
        self.resize.trigger(now);
    }

    /// `true` once a resize burst has been quiet long enough to refresh.
    pub fn poll_resize(&mut self, now: Duration) -> bool {
        self.resize.poll(now)
    }

    /// Whether a resize is waiting for its debounce.
    pub fn is_resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    /// Re-measure content, then recompute trigger ranges against it.
    ///
    /// Pin spacing from the engine feeds back into the measured height, so the
    /// scroller is re-measured when it changed.
    pub fn refresh(&mut self, doc: &dyn Document, engine: &mut TriggerEngine) -> RefreshReport {
        self.viewport = doc.viewport();
        self.content_height = doc.content_height();
        self.observe(doc);
        self.sync_device();
        self.scroller
            .update(self.content_height + self.pin_spacing, self.viewport);

        let report = engine.refresh(&*self, doc);
        if (report.pin_spacing - self.pin_spacing).abs() > EPS {
            self.pin_spacing = report.pin_spacing;
            self.scroller
                .update(self.content_height + self.pin_spacing, self.viewport);
        }
        self.notified = true;
        report
    }

    /// Total scrollable height including pin spacing.
    pub fn scroll_height(&self) -> f64 {
        self.content_height + self.pin_spacing
    }

    /// Forward wheel input to the virtualizer.
    pub fn wheel(&mut self, delta: f64) {
        self.scroller.input(delta);
    }

    /// Resume scrolling.
    pub fn start(&mut self) {
        self.scroller.start();
    }

    /// Freeze scrolling.
    pub fn stop(&mut self) {
        self.scroller.stop();
    }

    /// Whether scrolling is frozen.
    pub fn is_stopped(&self) -> bool {
        self.scroller.is_stopped()
    }
}

impl ScrollerProxy for ScrollBridge {
    fn scroll_top(&self) -> f64 {
        self.get_position()
    }

    fn set_scroll_top(&mut self, value: f64) {
        self.set_position(value, SetPositionOpts::instant());
    }

    fn bounding_client_rect(&self) -> ViewportRect {
        self.viewport_rect()
    }

    fn pin_type(&self) -> PinType {
        self.pin_strategy()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/bridge.rs"]
mod tests;
