use std::any::Any;

use crate::{
    animation::scrub::Scrub,
    assets::frames::{FrameKey, FrameLoad, FramePattern, LoadState},
    effects::{Effect, EffectCx, Setup},
    foundation::core::Size,
    foundation::error::{ReelError, ReelResult},
    foundation::math::clamp01,
    host::dom::{ElementId, require},
    render::{cover::blit_cover, surface::Surface},
    trigger::{
        engine::{TriggerEvent, TriggerEventKind, TriggerId, TriggerSpec},
        position::TriggerPosition,
    },
};

/// Where frame URLs come from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum FrameSource {
    /// Explicit URLs.
    List(Vec<String>),
    /// Numbered URLs.
    Pattern(FramePattern),
}

impl FrameSource {
    /// Frame URLs in playback order.
    pub fn urls(&self) -> ReelResult<Vec<String>> {
        match self {
            Self::List(urls) if urls.is_empty() => {
                Err(ReelError::validation("frame list must not be empty"))
            }
            Self::List(urls) => Ok(urls.clone()),
            Self::Pattern(p) => p.expand(),
        }
    }
}

fn default_pin_range() -> f64 {
    2.5
}

/// Scroll-scrubbed image sequence drawn to a canvas.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameSequenceConfig {
    /// Effect name.
    pub name: String,
    /// Pinned section the sequence plays in.
    pub container: String,
    /// Canvas element inside the container, if any.
    #[serde(default)]
    pub canvas: Option<String>,
    /// Source of the frame images.
    pub frames: FrameSource,
    /// Pin range as a multiple of the container height.
    #[serde(default = "default_pin_range")]
    pub pin_range: f64,
    /// Scrub lag; absent means progress is applied as-is.
    #[serde(default)]
    pub scrub_secs: Option<f64>,
}

impl FrameSequenceConfig {
    /// Reject a non-positive pin range, a bad scrub lag or an unusable frame source.
    pub fn validate(&self) -> ReelResult<()> {
        if !(self.pin_range.is_finite() && self.pin_range > 0.0) {
            return Err(ReelError::validation(format!(
                "sequence '{}': pin_range must be finite and > 0",
                self.name
            )));
        }
        if let Some(s) = self.scrub_secs
            && !(s.is_finite() && s >= 0.0)
        {
            return Err(ReelError::validation(format!(
                "sequence '{}': scrub_secs must be finite and >= 0",
                self.name
            )));
        }
        self.frames.urls().map(|_| ())
    }
}

/// `round(p × (count - 1))`, clamped to the valid index range.
pub fn frame_index(progress: f64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let last = count - 1;
    ((clamp01(progress) * last as f64).round() as usize).min(last)
}

/// Scrubs a still-image sequence on a canvas by scroll progress within a
/// pinned section.
///
/// The progress → frame mapping is stateless; painting is skipped (keeping the
/// previous frame on screen) while the selected frame has not loaded.
#[derive(Debug)]
pub struct FrameSequencePlayer {
    config: FrameSequenceConfig,
    urls: Vec<String>,
    frames: Vec<LoadState>,
    sequence: usize,
    container: Option<ElementId>,
    trigger: Option<TriggerId>,
    surface: Surface,
    progress: f64,
    current: usize,
    painted: Option<usize>,
    paint_count: u64,
}

impl FrameSequencePlayer {
    /// Validated player; nothing loads until setup.
    pub fn new(config: FrameSequenceConfig) -> ReelResult<Self> {
        config.validate()?;
        let urls = config.frames.urls()?;
        let frames = vec![LoadState::Pending; urls.len()];
        Ok(Self {
            config,
            urls,
            frames,
            sequence: 0,
            container: None,
            trigger: None,
            surface: Surface::default(),
            progress: 0.0,
            current: 0,
            painted: None,
            paint_count: 0,
        })
    }

    /// Number of frames in the sequence.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame selected by the latest progress.
    pub fn current_frame(&self) -> usize {
        self.current
    }

    /// Index of the frame currently on the canvas.
    pub fn painted_frame(&self) -> Option<usize> {
        self.painted
    }

    /// Number of canvas repaints so far.
    pub fn paint_count(&self) -> u64 {
        self.paint_count
    }

    /// Pinned scrub trigger, once registered.
    pub fn trigger(&self) -> Option<TriggerId> {
        self.trigger
    }

    /// Load state of frame `index`.
    pub fn frame_state(&self, index: usize) -> Option<&LoadState> {
        self.frames.get(index)
    }

    /// Select the frame for `p`; the repaint happens on the next [`FrameSequencePlayer::paint`].
    pub fn set_progress(&mut self, p: f64) {
        self.progress = clamp01(p);
        self.current = frame_index(self.progress, self.frames.len());
    }

    /// Record a load completion for one of this sequence's frames.
    pub fn accept_load(&mut self, load: &FrameLoad) {
        let Some(slot) = self.frames.get_mut(load.key.index) else {
            return;
        };
        *slot = match &load.result {
            Ok(img) if !img.is_empty() => LoadState::Loaded(img.clone()),
            Ok(_) => {
                tracing::warn!(sequence = %self.config.name, url = %load.url, "frame has zero dimensions");
                LoadState::Failed
            }
            Err(e) => {
                tracing::warn!(sequence = %self.config.name, url = %load.url, error = %e, "failed to load frame");
                LoadState::Failed
            }
        };
    }

    /// Resync the canvas to the viewport. Resizing clears it; the current
    /// frame is repainted on the next paint.
    pub fn resize(&mut self, viewport: Size) {
        self.surface.resize_to_viewport(viewport);
        self.painted = None;
    }

    /// Paint the selected frame if it differs from what is on the canvas and
    /// has loaded. Returns whether a repaint happened.
    pub fn paint(&mut self) -> bool {
        if self.painted == Some(self.current) {
            return false;
        }
        let Some(img) = self.frames.get(self.current).and_then(LoadState::ready) else {
            tracing::trace!(sequence = %self.config.name, frame = self.current, "frame not loaded; keeping previous");
            return false;
        };
        if !blit_cover(&mut self.surface, img) {
            return false;
        }
        self.painted = Some(self.current);
        self.paint_count += 1;
        tracing::trace!(sequence = %self.config.name, frame = self.current, "painted frame");
        true
    }
}

impl Effect for FrameSequencePlayer {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn setup(&mut self, cx: &mut EffectCx<'_>) -> ReelResult<Setup> {
        let container = require(&*cx.doc, &self.config.container)?;
        if let Some(canvas) = &self.config.canvas
            && cx.doc.query_within(container, canvas).is_none()
        {
            tracing::warn!(sequence = %self.config.name, canvas = %canvas, "canvas element not found; painting off-document");
        }

        self.sequence = cx.owner.0;
        for (index, url) in self.urls.iter().enumerate() {
            cx.loader.request(
                FrameKey {
                    sequence: self.sequence,
                    index,
                },
                url,
            );
        }

        let scrub = Scrub::from_lag_secs(self.config.scrub_secs);
        let trigger = cx.register(
            TriggerSpec::new(
                container,
                TriggerPosition::top_top(),
                TriggerPosition::after_start_by_height(self.config.pin_range),
            )
            .with_scrub(scrub)
            .pinned(),
        )?;

        self.container = Some(container);
        self.trigger = Some(trigger);
        self.resize(cx.viewport);
        tracing::debug!(sequence = %self.config.name, frames = self.urls.len(), "frame sequence ready");
        Ok(Setup::Ready)
    }

    fn on_event(&mut self, _cx: &mut EffectCx<'_>, event: &TriggerEvent) {
        if Some(event.id) != self.trigger {
            return;
        }
        match event.kind {
            TriggerEventKind::Update { progress } | TriggerEventKind::Refresh { progress } => {
                self.set_progress(progress);
            }
            _ => {}
        }
    }

    fn on_resize(&mut self, _cx: &mut EffectCx<'_>, viewport: Size) {
        self.resize(viewport);
    }

    fn on_frame_loaded(&mut self, _cx: &mut EffectCx<'_>, load: &FrameLoad) {
        if load.key.sequence == self.sequence {
            self.accept_load(load);
        }
    }

    fn commit(&mut self, _cx: &mut EffectCx<'_>) {
        self.paint();
    }

    fn surface(&self) -> Option<&Surface> {
        Some(&self.surface)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "progress": self.progress,
            "current_frame": self.current,
            "painted_frame": self.painted,
            "paint_count": self.paint_count,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/frame_player.rs"]
mod tests;
