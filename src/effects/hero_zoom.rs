use std::any::Any;

use crate::{
    animation::{ease::Ease, scrub::Scrub},
    effects::{Effect, EffectCx, Setup},
    foundation::core::{DeviceClass, Rect, Size, Vec2},
    foundation::error::{ReelError, ReelResult},
    foundation::math::{clamp01, require_finite},
    host::dom::{Document, ElementBox, ElementId, StylePatch, TransformStyle, require},
    trigger::{
        engine::{TriggerEvent, TriggerEventKind, TriggerId, TriggerSpec},
        position::TriggerPosition,
    },
};

/// Calibration and selectors for the hero zoom.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HeroZoomConfig {
    /// Effect name.
    pub name: String,
    /// Section pinned while the zoom plays.
    pub section: String,
    /// Image that zooms.
    pub image: String,
    /// Wrapper whose stacking order flips during the zoom.
    pub container: String,
    /// Box centred on the zoom target and clamped inside the container.
    pub zoom_target: Option<String>,
    /// Caption positioned below the displayed image.
    pub caption: Option<String>,
    /// Zoom target as fractions of the displayed image.
    pub target: (f64, f64),
    /// Transform origin (percent) used when there is no target box.
    pub fallback_origin_percent: (f64, f64),
    /// Final scale on desktop.
    pub scale_desktop: f64,
    /// Final scale on mobile.
    pub scale_mobile: f64,
    /// Zoom range as a fraction of the section height.
    pub range_fraction: f64,
    /// Scrub lag in seconds.
    pub scrub_secs: f64,
    /// Easing of the scale.
    pub ease: Ease,
    /// Progress past which the container is raised.
    pub raise_after: f64,
    /// Container z-index before the raise.
    pub z_index_base: i32,
    /// Container z-index after the raise.
    pub z_index_raised: i32,
    /// Gap between the image and the caption.
    pub caption_padding_px: f64,
    /// Minimum caption offset on mobile, as a fraction of the section height.
    pub caption_min_fraction_mobile: f64,
    /// Minimum caption offset on desktop, as a fraction of the section height.
    pub caption_min_fraction_desktop: f64,
}

impl Default for HeroZoomConfig {
    fn default() -> Self {
        Self {
            name: "hero".to_string(),
            section: "#page1".to_string(),
            image: "#hero-blastoise".to_string(),
            container: ".hero-blastoise-container".to_string(),
            zoom_target: Some("#zoom-target".to_string()),
            caption: Some(".bottom-page1".to_string()),
            target: (0.3765, 0.408),
            fallback_origin_percent: (38.1, 40.8),
            scale_desktop: 95.0,
            scale_mobile: 950.0,
            range_fraction: 0.017,
            scrub_secs: 1.5,
            ease: Ease::OutQuad,
            raise_after: 0.2,
            z_index_base: 20,
            z_index_raised: 30,
            caption_padding_px: 20.0,
            caption_min_fraction_mobile: 0.25,
            caption_min_fraction_desktop: 0.08,
        }
    }
}

impl HeroZoomConfig {
    /// Reject non-finite calibration, scales below 1 and an empty zoom range.
    pub fn validate(&self) -> ReelResult<()> {
        for (v, field) in [
            (self.target.0, "target.x"),
            (self.target.1, "target.y"),
            (self.fallback_origin_percent.0, "fallback_origin_percent.x"),
            (self.fallback_origin_percent.1, "fallback_origin_percent.y"),
            (self.raise_after, "raise_after"),
            (self.caption_padding_px, "caption_padding_px"),
            (self.caption_min_fraction_mobile, "caption_min_fraction_mobile"),
            (self.caption_min_fraction_desktop, "caption_min_fraction_desktop"),
            (self.scrub_secs, "scrub_secs"),
        ] {
            require_finite(v, field)?;
        }
        for (v, field) in [
            (self.scale_desktop, "scale_desktop"),
            (self.scale_mobile, "scale_mobile"),
        ] {
            if !(require_finite(v, field)? >= 1.0) {
                return Err(ReelError::validation(format!(
                    "hero '{}': {field} must be >= 1",
                    self.name
                )));
            }
        }
        if !(require_finite(self.range_fraction, "range_fraction")? > 0.0) {
            return Err(ReelError::validation(format!(
                "hero '{}': range_fraction must be > 0",
                self.name
            )));
        }
        Ok(())
    }

    /// Scale reached at full progress on `device`.
    pub fn final_scale(&self, device: DeviceClass) -> f64 {
        if device.is_mobile() {
            self.scale_mobile
        } else {
            self.scale_desktop
        }
    }

    fn caption_min_fraction(&self, device: DeviceClass) -> f64 {
        if device.is_mobile() {
            self.caption_min_fraction_mobile
        } else {
            self.caption_min_fraction_desktop
        }
    }
}

/// Transform applied to the hero image.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct HeroZoomState {
    /// Uniform scale.
    pub scale: f64,
    /// Horizontal translation.
    pub translate_x: f64,
    /// Vertical translation.
    pub translate_y: f64,
    /// Scale origin as percentages of the image box.
    pub transform_origin_percent: (f64, f64),
}

impl HeroZoomState {
    /// State at `progress` toward `final_scale`.
    pub fn at(progress: f64, final_scale: f64, ease: Ease, origin_percent: (f64, f64)) -> Self {
        Self {
            scale: 1.0 + (final_scale - 1.0) * ease.apply(clamp01(progress)),
            translate_x: 0.0,
            translate_y: 0.0,
            transform_origin_percent: origin_percent,
        }
    }

    /// As a style transform.
    pub fn transform(&self) -> TransformStyle {
        TransformStyle {
            translate: Vec2::new(self.translate_x, self.translate_y),
            scale: self.scale,
            origin_percent: Some(self.transform_origin_percent),
        }
    }
}

/// Displayed image rect for `object-fit: contain` inside a box of `frame`,
/// in box-local coordinates. `position` is the `object-position` as fractions.
pub fn contain_rect(frame: Size, natural: Size, position: (f64, f64)) -> Option<Rect> {
    if !(frame.width > 0.0 && frame.height > 0.0 && natural.width > 0.0 && natural.height > 0.0) {
        return None;
    }
    let scale = (frame.width / natural.width).min(frame.height / natural.height);
    let w = natural.width * scale;
    let h = natural.height * scale;
    let x = (frame.width - w) * position.0;
    let y = (frame.height - h) * position.1;
    Some(Rect::new(x, y, x + w, y + h))
}

/// Resolved geometry for one layout.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct HeroLayout {
    /// Scale reached at full progress.
    pub final_scale: f64,
    /// Scale origin as percentages of the image box.
    pub origin_percent: (f64, f64),
    /// Zoom-target box offset inside the container.
    pub target_position: Option<(f64, f64)>,
    /// Caption distance from the section's bottom edge.
    pub caption_bottom: f64,
}

struct Measure {
    section: ElementBox,
    image: ElementBox,
    container: ElementBox,
    target: Option<ElementBox>,
    natural: Size,
    object_position: (f64, f64),
}

fn resolve_layout(cfg: &HeroZoomConfig, m: &Measure, device: DeviceClass) -> Option<HeroLayout> {
    let shown = contain_rect(m.image.size(), m.natural, m.object_position)?;
    let point = Vec2::new(
        shown.x0 + shown.width() * cfg.target.0,
        shown.y0 + shown.height() * cfg.target.1,
    );

    let (origin_percent, target_position) = match m.target {
        Some(target) => {
            let clamp_axis = |centre: f64, size: f64, extent: f64| {
                (centre - size / 2.0).clamp(0.0, (extent - size).max(0.0))
            };
            let left = clamp_axis(
                m.image.left - m.container.left + point.x,
                target.width,
                m.container.width,
            );
            let top = clamp_axis(
                m.image.top - m.container.top + point.y,
                target.height,
                m.container.height,
            );
            let centre_x = m.container.left + left + target.width / 2.0 - m.image.left;
            let centre_y = m.container.top + top + target.height / 2.0 - m.image.top;
            let origin = if m.image.width > 0.0 && m.image.height > 0.0 {
                (
                    (centre_x / m.image.width * 100.0).clamp(0.0, 100.0),
                    (centre_y / m.image.height * 100.0).clamp(0.0, 100.0),
                )
            } else {
                cfg.fallback_origin_percent
            };
            (origin, Some((left, top)))
        }
        None => (cfg.fallback_origin_percent, None),
    };

    let image_bottom = m.image.top + shown.y1 - m.section.top;
    let caption_bottom = (cfg.caption_min_fraction(device) * m.section.height)
        .max(m.section.height - image_bottom + cfg.caption_padding_px);

    Some(HeroLayout {
        final_scale: cfg.final_scale(device),
        origin_percent,
        target_position,
        caption_bottom,
    })
}

fn measure(doc: &dyn Document, els: Elements) -> Option<Measure> {
    Some(Measure {
        section: doc.layout(els.section)?,
        image: doc.layout(els.image)?,
        container: doc.layout(els.container)?,
        target: els.target.and_then(|t| doc.layout(t)),
        natural: doc.image_natural_size(els.image)?,
        object_position: doc.object_position(els.image),
    })
}

#[derive(Clone, Copy, Debug)]
struct Elements {
    section: ElementId,
    image: ElementId,
    container: ElementId,
    target: Option<ElementId>,
    caption: Option<ElementId>,
}

/// Zooms the hero image into a calibrated point while its section is pinned.
#[derive(Debug)]
pub struct HeroZoom {
    config: HeroZoomConfig,
    elements: Option<Elements>,
    zoom: Option<TriggerId>,
    pin: Option<TriggerId>,
    layout: Option<HeroLayout>,
    progress: f64,
    raised: bool,
    dirty: bool,
}

impl HeroZoom {
    /// Validated zoom; nothing is resolved until setup.
    pub fn new(config: HeroZoomConfig) -> ReelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            elements: None,
            zoom: None,
            pin: None,
            layout: None,
            progress: 0.0,
            raised: false,
            dirty: false,
        })
    }

    /// Current transform, once the layout is known.
    pub fn state(&self) -> Option<HeroZoomState> {
        let layout = self.layout?;
        Some(HeroZoomState::at(
            self.progress,
            layout.final_scale,
            self.config.ease,
            layout.origin_percent,
        ))
    }

    /// Geometry resolved for the current viewport.
    pub fn layout(&self) -> Option<HeroLayout> {
        self.layout
    }

    /// Stacking order currently applied to the container.
    pub fn z_index(&self) -> i32 {
        if self.raised {
            self.config.z_index_raised
        } else {
            self.config.z_index_base
        }
    }

    /// Scrubbed zoom trigger.
    pub fn zoom_trigger(&self) -> Option<TriggerId> {
        self.zoom
    }

    /// Trigger pinning the section.
    pub fn pin_trigger(&self) -> Option<TriggerId> {
        self.pin
    }

    fn remeasure(&mut self, doc: &dyn Document, device: DeviceClass) {
        let Some(els) = self.elements else {
            return;
        };
        let layout = measure(doc, els).and_then(|m| resolve_layout(&self.config, &m, device));
        if layout.is_none() {
            tracing::warn!(hero = %self.config.name, "hero geometry unavailable; keeping previous layout");
            return;
        }
        self.layout = layout;
        self.dirty = true;
    }
}

impl Effect for HeroZoom {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn setup(&mut self, cx: &mut EffectCx<'_>) -> ReelResult<Setup> {
        let doc = &*cx.doc;
        let section = require(doc, &self.config.section)?;
        let image = require(doc, &self.config.image)?;
        let container = require(doc, &self.config.container)?;
        let optional = |selector: &Option<String>, what: &str| {
            let sel = selector.as_deref()?;
            let found = doc.query(sel);
            if found.is_none() {
                tracing::warn!(selector = sel, "hero {what} not found; skipping it");
            }
            found
        };
        let target = optional(&self.config.zoom_target, "zoom target");
        let caption = optional(&self.config.caption, "caption");

        if doc.image_natural_size(image).is_none() {
            return Ok(Setup::Deferred(format!(
                "hero image '{}' has not loaded",
                self.config.image
            )));
        }

        let end = TriggerPosition::after_start_by_height(self.config.range_fraction);
        let zoom = cx.register(
            TriggerSpec::new(section, TriggerPosition::top_top(), end)
                .with_scrub(Scrub::from_lag_secs(Some(self.config.scrub_secs))),
        )?;
        let pin = cx.register(TriggerSpec::new(section, TriggerPosition::top_top(), end).pinned())?;

        self.elements = Some(Elements {
            section,
            image,
            container,
            target,
            caption,
        });
        self.zoom = Some(zoom);
        self.pin = Some(pin);
        self.remeasure(&*cx.doc, cx.device);
        tracing::debug!(hero = %self.config.name, layout = ?self.layout, "hero zoom ready");
        Ok(Setup::Ready)
    }

    fn on_event(&mut self, _cx: &mut EffectCx<'_>, event: &TriggerEvent) {
        let progress = match event.kind {
            TriggerEventKind::Update { progress } | TriggerEventKind::Refresh { progress } => {
                progress
            }
            _ => return,
        };
        if Some(event.id) == self.zoom {
            self.progress = progress;
            self.dirty = true;
        } else if Some(event.id) == self.pin {
            let raised = progress > self.config.raise_after;
            if raised != self.raised {
                self.raised = raised;
                self.dirty = true;
            }
        }
    }

    fn on_refresh(&mut self, cx: &mut EffectCx<'_>) {
        self.remeasure(&*cx.doc, cx.device);
    }

    fn on_resize(&mut self, cx: &mut EffectCx<'_>, _viewport: Size) {
        self.remeasure(&*cx.doc, cx.device);
    }

    fn commit(&mut self, cx: &mut EffectCx<'_>) {
        if !std::mem::take(&mut self.dirty) {
            return;
        }
        let (Some(els), Some(layout), Some(state)) = (self.elements, self.layout, self.state())
        else {
            return;
        };
        cx.doc.apply(els.image, StylePatch::Transform(state.transform()));
        cx.doc.apply(els.container, StylePatch::ZIndex(self.z_index()));
        if let (Some(id), Some((left, top))) = (els.target, layout.target_position) {
            cx.doc.apply(id, StylePatch::Position { left, top });
        }
        if let Some(id) = els.caption {
            cx.doc.apply(id, StylePatch::Bottom(layout.caption_bottom));
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "progress": self.progress,
            "state": self.state(),
            "z_index": self.z_index(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/hero_zoom.rs"]
mod tests;
