use std::{any::Any, time::Duration};

use crate::{
    animation::{
        ease::Ease,
        scrub::Scrub,
        tween::{Tween, TweenStep},
    },
    effects::{Effect, EffectCx, ScrollCommand, Setup},
    foundation::core::Vec2,
    foundation::error::{ReelError, ReelResult},
    foundation::math::{EPS, clamp01, require_finite},
    host::dom::{ElementId, StylePatch, TransformStyle, require},
    trigger::{
        engine::{TriggerEvent, TriggerEventKind, TriggerId, TriggerSpec},
        position::{Anchor, TriggerPosition},
    },
};

/// Sections that fade in and rise as they enter the viewport.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Effect name.
    pub name: String,
    /// Sections to reveal.
    pub selector: String,
    /// Where each section's trigger starts.
    pub start: TriggerPosition,
    /// Where each section's trigger ends.
    pub end: TriggerPosition,
    /// Length of the fade.
    pub duration_ms: u64,
    /// Easing of the fade.
    pub ease: Ease,
    /// Initial downward offset in px.
    pub offset_y: f64,
    /// Heading text marking the section that gates scrolling until it has faded in.
    pub gate_heading: Option<String>,
    /// Selector of the heading inside each section.
    pub heading_selector: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            name: "reveal".to_string(),
            selector: ".entry-section".to_string(),
            start: TriggerPosition::edge(Anchor::Fraction(0.0), Anchor::Fraction(0.85)),
            end: TriggerPosition::edge(Anchor::Fraction(0.0), Anchor::Fraction(0.4)),
            duration_ms: 1000,
            ease: Ease::OutCubic,
            offset_y: 50.0,
            gate_heading: Some("Enter the Shell".to_string()),
            heading_selector: "h2".to_string(),
        }
    }
}

impl RevealConfig {
    /// Reject a non-finite offset or a relative start.
    pub fn validate(&self) -> ReelResult<()> {
        require_finite(self.offset_y, "offset_y")?;
        if self.start.is_relative() {
            return Err(ReelError::validation(format!(
                "reveal '{}': start must not be relative",
                self.name
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Applied {
    opacity: f64,
    offset: f64,
    visible: bool,
}

#[derive(Debug)]
struct Section {
    element: ElementId,
    trigger: TriggerId,
    tween: Tween,
    gate: bool,
    applied: Option<Applied>,
}

impl Section {
    fn target(&self, offset_y: f64) -> Applied {
        let v = self.tween.value();
        Applied {
            opacity: v,
            offset: offset_y * (1.0 - v),
            visible: self.gate || v > 0.0 || self.tween.is_playing(),
        }
    }
}

/// Fades sections in as they scroll into view and back out when scrolled
/// above their start.
///
/// A gate section plays once and holds the scroller until its fade finishes.
#[derive(Debug)]
pub struct Reveal {
    config: RevealConfig,
    sections: Vec<Section>,
    gate_done: bool,
}

impl Reveal {
    /// Validated reveal; sections are found at setup.
    pub fn new(config: RevealConfig) -> ReelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sections: Vec::new(),
            gate_done: false,
        })
    }

    /// Number of sections found.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Eased reveal value of the section on `element`.
    pub fn value(&self, element: ElementId) -> Option<f64> {
        self.sections
            .iter()
            .find(|s| s.element == element)
            .map(|s| s.tween.value())
    }

    /// Section that gates scrolling, if one matched.
    pub fn gate(&self) -> Option<ElementId> {
        self.sections.iter().find(|s| s.gate).map(|s| s.element)
    }

    /// `true` once the gate fade has completed and scrolling was released.
    pub fn gate_released(&self) -> bool {
        self.gate_done
    }
}

impl Effect for Reveal {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn setup(&mut self, cx: &mut EffectCx<'_>) -> ReelResult<Setup> {
        let elements = cx.doc.query_all(&self.config.selector);
        if elements.is_empty() {
            tracing::warn!(reveal = %self.config.name, selector = %self.config.selector, "no sections to reveal");
            return Ok(Setup::Ready);
        }

        let duration = Duration::from_millis(self.config.duration_ms);
        let mut gate_seen = false;
        for element in elements {
            let gate = !gate_seen
                && self.config.gate_heading.as_deref().is_some_and(|want| {
                    cx.doc
                        .query_within(element, &self.config.heading_selector)
                        .and_then(|h| cx.doc.text(h))
                        .is_some_and(|text| text.trim() == want)
                });
            gate_seen |= gate;

            let spec = if gate {
                let center = TriggerPosition::edge(Anchor::Fraction(0.5), Anchor::Fraction(0.5));
                TriggerSpec::new(element, center, center).once()
            } else {
                TriggerSpec::new(element, self.config.start, self.config.end)
            };
            let trigger = cx.register(spec)?;
            self.sections.push(Section {
                element,
                trigger,
                tween: Tween::new(duration, self.config.ease),
                gate,
                applied: None,
            });
        }
        if self.config.gate_heading.is_some() && !gate_seen {
            tracing::warn!(reveal = %self.config.name, "gate section not found");
        }
        tracing::debug!(reveal = %self.config.name, sections = self.sections.len(), "reveal ready");
        Ok(Setup::Ready)
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &TriggerEvent) {
        let Some(section) = self.sections.iter_mut().find(|s| s.trigger == event.id) else {
            return;
        };
        match (event.kind, section.gate) {
            (TriggerEventKind::Enter, true) => {
                tracing::debug!(reveal = %self.config.name, "gate reached; holding scroll");
                cx.command(ScrollCommand::Stop);
                section.tween.play();
            }
            (TriggerEventKind::Enter, false) => section.tween.play(),
            (TriggerEventKind::LeaveBack, false) => section.tween.reverse(),
            _ => {}
        }
    }

    fn advance(&mut self, cx: &mut EffectCx<'_>, dt: Duration) {
        for section in &mut self.sections {
            if section.tween.advance(dt) == TweenStep::Completed && section.gate && !self.gate_done {
                self.gate_done = true;
                tracing::debug!(reveal = %self.config.name, "gate faded in; releasing scroll");
                cx.command(ScrollCommand::Start);
                cx.command(ScrollCommand::Update);
            }
        }
    }

    fn commit(&mut self, cx: &mut EffectCx<'_>) {
        for section in &mut self.sections {
            let next = section.target(self.config.offset_y);
            if section.applied == Some(next) {
                continue;
            }
            cx.doc.apply(section.element, StylePatch::Opacity(next.opacity));
            cx.doc.apply(section.element, StylePatch::Visible(next.visible));
            cx.doc.apply(
                section.element,
                StylePatch::Transform(TransformStyle::translate(Vec2::new(0.0, next.offset))),
            );
            section.applied = Some(next);
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        let values: Vec<f64> = self.sections.iter().map(|s| s.tween.value()).collect();
        serde_json::json!({
            "values": values,
            "gate_released": self.gate_done,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Opacity that falls from 1 to 0 across a trigger range.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FadeOutConfig {
    /// Effect name.
    pub name: String,
    /// Element whose opacity follows the trigger.
    pub target: String,
    /// Element whose position drives the trigger.
    pub trigger: String,
    /// Start of the fade.
    #[serde(default = "default_fade_start")]
    pub start: TriggerPosition,
    /// End of the fade.
    #[serde(default = "default_fade_end")]
    pub end: TriggerPosition,
}

fn default_fade_start() -> TriggerPosition {
    TriggerPosition::edge(Anchor::Fraction(0.0), Anchor::Fraction(1.0))
}

fn default_fade_end() -> TriggerPosition {
    TriggerPosition::edge(Anchor::Fraction(0.0), Anchor::Fraction(0.5))
}

/// Opacity `1 - progress` over a scrubbed trigger.
#[derive(Debug)]
pub struct FadeOut {
    config: FadeOutConfig,
    target: Option<ElementId>,
    trigger: Option<TriggerId>,
    opacity: f64,
    applied: Option<f64>,
}

impl FadeOut {
    /// Validated fade.
    pub fn new(config: FadeOutConfig) -> ReelResult<Self> {
        if config.start.is_relative() {
            return Err(ReelError::validation(format!(
                "fade '{}': start must not be relative",
                config.name
            )));
        }
        Ok(Self {
            config,
            target: None,
            trigger: None,
            opacity: 1.0,
            applied: None,
        })
    }

    /// Opacity last applied.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }
}

impl Effect for FadeOut {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn setup(&mut self, cx: &mut EffectCx<'_>) -> ReelResult<Setup> {
        let target = require(&*cx.doc, &self.config.target)?;
        let trigger_el = require(&*cx.doc, &self.config.trigger)?;
        let trigger = cx.register(
            TriggerSpec::new(trigger_el, self.config.start, self.config.end)
                .with_scrub(Scrub::Immediate),
        )?;
        self.target = Some(target);
        self.trigger = Some(trigger);
        Ok(Setup::Ready)
    }

    fn on_event(&mut self, _cx: &mut EffectCx<'_>, event: &TriggerEvent) {
        if Some(event.id) != self.trigger {
            return;
        }
        if let TriggerEventKind::Update { progress } | TriggerEventKind::Refresh { progress } =
            event.kind
        {
            self.opacity = 1.0 - clamp01(progress);
        }
    }

    fn commit(&mut self, cx: &mut EffectCx<'_>) {
        let Some(target) = self.target else {
            return;
        };
        if self.applied.is_some_and(|a| (a - self.opacity).abs() < EPS) {
            return;
        }
        cx.doc.apply(target, StylePatch::Opacity(self.opacity));
        self.applied = Some(self.opacity);
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({ "opacity": self.opacity })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/reveal.rs"]
mod tests;
