use std::time::Duration;

use crate::foundation::{
    core::{DeviceClass, ScrollState, Size},
    math::frame_rate_independent_alpha,
};

/// Options for [`SmoothScroller::scroll_to`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollToOpts {
    /// Requested animation duration; zero means "jump".
    pub duration: Duration,
    /// Skip interpolation entirely.
    pub disable_lerp: bool,
}

impl ScrollToOpts {
    /// Jump without interpolation.
    pub fn instant() -> Self {
        Self {
            duration: Duration::ZERO,
            disable_lerp: true,
        }
    }

    /// Whether the move should land this frame.
    pub fn is_instant(self) -> bool {
        self.disable_lerp || self.duration.is_zero()
    }
}

/// Payload of the virtualizer's "scroll" event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEvent {
    /// Offset after the frame.
    pub offset: f64,
    /// Offset change since the previous event.
    pub delta: f64,
}

/// Contract consumed from a smooth-scroll virtualizer.
pub trait SmoothScroller {
    /// `false` while the virtualizer's own dependencies are still loading.
    fn is_ready(&self) -> bool {
        true
    }

    /// Resume reacting to input.
    fn start(&mut self);

    /// Ignore input until [`SmoothScroller::start`].
    fn stop(&mut self);

    /// Whether input is being ignored.
    fn is_stopped(&self) -> bool;

    /// Re-measure content; keeps the offset within the new bounds.
    fn update(&mut self, content_height: f64, viewport: Size);

    /// Move toward `value`, clamped to the content.
    fn scroll_to(&mut self, value: f64, opts: ScrollToOpts);

    /// Current smoothed offset, `None` until the virtualizer has measured once.
    fn offset(&self) -> Option<f64>;

    /// Whether smoothing (and so the container transform) is active.
    fn is_smoothing(&self) -> bool;

    /// Device class decided by the page; selects the smoothing setting.
    fn set_device(&mut self, device: DeviceClass);

    /// Wheel/touch input in px.
    fn input(&mut self, delta: f64);

    /// Advance one animation frame; `Some` is the "scroll" event.
    fn tick(&mut self, dt: Duration) -> Option<ScrollEvent>;
}

/// Options for [`LerpScroller`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LerpScrollerOpts {
    /// Smooth on desktop-class viewports.
    pub smooth: bool,
    /// Smooth on mobile-class viewports.
    pub smooth_mobile: bool,
    /// Input multiplier applied to wheel/touch deltas.
    pub multiplier: f64,
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub lerp: f64,
}

impl Default for LerpScrollerOpts {
    fn default() -> Self {
        Self {
            smooth: true,
            smooth_mobile: false,
            multiplier: 1.0,
            lerp: 0.1,
        }
    }
}

impl LerpScrollerOpts {
    /// Whether `device` gets interpolated scrolling.
    pub fn smoothing_for(&self, device: DeviceClass) -> bool {
        match device {
            DeviceClass::Desktop => self.smooth,
            DeviceClass::Mobile => self.smooth_mobile,
        }
    }
}

/// Lerp-based scroll virtualizer: input moves a target, each frame moves the
/// offset a fraction of the way there.
#[derive(Clone, Debug)]
pub struct LerpScroller {
    opts: LerpScrollerOpts,
    current: f64,
    target: f64,
    limit: f64,
    viewport: Size,
    device: DeviceClass,
    measured: bool,
    stopped: bool,
    last_reported: Option<f64>,
    force_event: bool,
}

impl LerpScroller {
    const SNAP_PX: f64 = 0.1;

    /// Unmeasured scroller at offset 0.
    pub fn new(opts: LerpScrollerOpts) -> Self {
        Self {
            opts,
            current: 0.0,
            target: 0.0,
            limit: 0.0,
            viewport: Size::ZERO,
            device: DeviceClass::Desktop,
            measured: false,
            stopped: false,
            last_reported: None,
            force_event: false,
        }
    }

    /// Options it was built with.
    pub fn opts(&self) -> &LerpScrollerOpts {
        &self.opts
    }

    /// Offset the scroller is moving toward.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Maximum offset: content height minus viewport height.
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Offset and viewport as last measured.
    pub fn state(&self) -> ScrollState {
        ScrollState {
            offset: self.current,
            viewport_width: self.viewport.width,
            viewport_height: self.viewport.height,
        }
    }

    /// Device class last set by the page.
    pub fn device(&self) -> DeviceClass {
        self.device
    }

    fn clamp(&self, v: f64) -> f64 {
        if v.is_nan() { 0.0 } else { v.clamp(0.0, self.limit) }
    }
}

impl SmoothScroller for LerpScroller {
    fn start(&mut self) {
        self.stopped = false;
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.target = self.current;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn update(&mut self, content_height: f64, viewport: Size) {
        self.viewport = viewport;
        self.limit = (content_height - viewport.height).max(0.0);
        self.current = self.clamp(self.current);
        self.target = self.clamp(self.target);
        if !self.measured {
            self.measured = true;
            self.force_event = true;
        }
    }

    fn scroll_to(&mut self, value: f64, opts: ScrollToOpts) {
        let v = self.clamp(value);
        self.target = v;
        if opts.is_instant() || !self.is_smoothing() {
            self.current = v;
            self.force_event = true;
        }
    }

    fn offset(&self) -> Option<f64> {
        self.measured.then_some(self.current)
    }

    fn is_smoothing(&self) -> bool {
        self.opts.smoothing_for(self.device)
    }

    fn set_device(&mut self, device: DeviceClass) {
        self.device = device;
        if !self.is_smoothing() {
            self.current = self.target;
        }
    }

    fn input(&mut self, delta: f64) {
        if self.stopped || !delta.is_finite() {
            return;
        }
        self.target = self.clamp(self.target + delta * self.opts.multiplier);
        if !self.is_smoothing() {
            self.current = self.target;
        }
    }

    fn tick(&mut self, dt: Duration) -> Option<ScrollEvent> {
        if !self.measured {
            return None;
        }
        if self.current != self.target {
            let alpha = frame_rate_independent_alpha(self.opts.lerp, dt);
            self.current += (self.target - self.current) * alpha;
            if (self.target - self.current).abs() < Self::SNAP_PX {
                self.current = self.target;
            }
            self.current = self.clamp(self.current);
        }

        let prev = self.last_reported;
        if prev != Some(self.current) || self.force_event {
            self.force_event = false;
            self.last_reported = Some(self.current);
            return Some(ScrollEvent {
                offset: self.current,
                delta: self.current - prev.unwrap_or(0.0),
            });
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/scroller.rs"]
mod tests;
