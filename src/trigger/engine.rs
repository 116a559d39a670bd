use std::time::Duration;

use crate::{
    animation::scrub::{Scrub, ScrubSmoother},
    foundation::error::{ReelError, ReelResult},
    foundation::math::clamp01,
    host::dom::{Document, ElementBox, ElementId},
    trigger::{
        pin::{PinPhase, PinPlacement, PinType},
        position::TriggerPosition,
        proxy::ScrollerProxy,
    },
};

/// Handle returned by [`TriggerEngine::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct TriggerId(pub u64);

/// Identifies the effect that registered a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct OwnerId(pub usize);

/// Registration request for one trigger.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerSpec {
    /// Element whose layout positions the range.
    pub trigger: ElementId,
    /// Start of the range; must not be relative.
    pub start: TriggerPosition,
    /// End of the range.
    pub end: TriggerPosition,
    /// How progress follows the offset.
    pub scrub: Scrub,
    /// Pin the trigger element across the range.
    pub pin: bool,
    /// Push following content down by the pin range.
    pub pin_spacing: bool,
    /// Remove the registration after its first enter.
    pub once: bool,
}

impl TriggerSpec {
    /// Unpinned, unscrubbed trigger on `trigger`.
    pub fn new(trigger: ElementId, start: TriggerPosition, end: TriggerPosition) -> Self {
        Self {
            trigger,
            start,
            end,
            scrub: Scrub::Off,
            pin: false,
            pin_spacing: true,
            once: false,
        }
    }

    /// Set the scrub mode.
    pub fn with_scrub(mut self, scrub: Scrub) -> Self {
        self.scrub = scrub;
        self
    }

    /// Pin the trigger element.
    pub fn pinned(mut self) -> Self {
        self.pin = true;
        self
    }

    /// Pin without pushing following content down.
    pub fn without_pin_spacing(mut self) -> Self {
        self.pin_spacing = false;
        self
    }

    /// Remove after the first enter.
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }
}

/// Resolved scroll range of a trigger.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Bounds {
    /// Offset where the range starts.
    pub start: f64,
    /// Offset where the range ends.
    pub end: f64,
}

impl Bounds {
    /// `end - start`, never negative.
    pub fn len(self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Whether `pos` lies in `start..=end`.
    pub fn contains(self, pos: f64) -> bool {
        pos >= self.start && pos <= self.end
    }

    /// `clamp((pos - start) / (end - start))`; a degenerate range is a step at `start`.
    pub fn progress_at(self, pos: f64) -> f64 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return if pos >= self.start { 1.0 } else { 0.0 };
        }
        clamp01((pos - self.start) / span)
    }

    fn region(self, pos: f64) -> Region {
        if pos < self.start {
            Region::Before
        } else if pos > self.end {
            Region::After
        } else {
            Region::Inside
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    Before,
    Inside,
    After,
}

/// What happened to a trigger.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerEventKind {
    /// Crossed the start going forward.
    Enter,
    /// Crossed the end going forward.
    Leave,
    /// Crossed the end going back.
    EnterBack,
    /// Crossed the start going back.
    LeaveBack,
    /// Progress changed while the range is active.
    Update {
        /// Smoothed progress in `0..=1`.
        progress: f64,
    },
    /// Bounds were recomputed.
    Refresh {
        /// Progress after the refresh.
        progress: f64,
    },
}

/// Event delivered to the owning effect.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TriggerEvent {
    /// Trigger that fired.
    pub id: TriggerId,
    /// Effect that registered it.
    pub owner: OwnerId,
    /// What happened.
    pub kind: TriggerEventKind,
}

/// Result of [`TriggerEngine::refresh`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RefreshReport {
    /// Total space added below pinned elements.
    pub pin_spacing: f64,
    /// Events emitted by the refresh.
    pub events: Vec<TriggerEvent>,
}

#[derive(Clone, Debug)]
struct Registration {
    id: TriggerId,
    owner: OwnerId,
    spec: TriggerSpec,
    order: usize,
    bounds: Option<Bounds>,
    // Viewport offset of the element at the moment it pins.
    pin_viewport_top: f64,
    raw: f64,
    smoother: ScrubSmoother,
    delivered: Option<f64>,
    region: Option<Region>,
    phase: PinPhase,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PinShift {
    element: ElementId,
    below: f64,
    amount: f64,
}

/// In-crate scroll-trigger engine. Scroll state is only ever read through a
/// [`ScrollerProxy`].
#[derive(Debug, Default)]
pub struct TriggerEngine {
    next_id: u64,
    next_order: usize,
    triggers: Vec<Registration>,
    shifts: Vec<PinShift>,
    last_pos: Option<f64>,
}

impl TriggerEngine {
    /// Empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Live trigger ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = TriggerId> + '_ {
        self.triggers.iter().map(|t| t.id)
    }

    /// Unresolved until the next [`TriggerEngine::refresh`].
    pub fn register(&mut self, owner: OwnerId, spec: TriggerSpec) -> ReelResult<TriggerId> {
        if spec.start.is_relative() {
            return Err(ReelError::validation(format!(
                "trigger start '{}' must not be relative",
                spec.start
            )));
        }
        if let Scrub::Smooth(secs) = spec.scrub
            && !(secs.is_finite() && secs >= 0.0)
        {
            return Err(ReelError::validation("scrub lag must be finite and >= 0"));
        }

        let id = TriggerId(self.next_id);
        self.next_id += 1;
        let order = self.next_order;
        self.next_order += 1;
        tracing::trace!(id = id.0, owner = owner.0, start = %spec.start, end = %spec.end, "register trigger");
        self.triggers.push(Registration {
            id,
            owner,
            spec,
            order,
            bounds: None,
            pin_viewport_top: 0.0,
            raw: 0.0,
            smoother: ScrubSmoother::default(),
            delivered: None,
            region: None,
            phase: PinPhase::Unpinned,
        });
        Ok(id)
    }

    /// Remove one trigger; `false` if it was already gone.
    pub fn kill(&mut self, id: TriggerId) -> bool {
        let before = self.triggers.len();
        self.triggers.retain(|t| t.id != id);
        before != self.triggers.len()
    }

    /// Remove every trigger of `owner` and return how many.
    pub fn kill_owner(&mut self, owner: OwnerId) -> usize {
        let before = self.triggers.len();
        self.triggers.retain(|t| t.owner != owner);
        before - self.triggers.len()
    }

    /// Remove every trigger and its pin spacing.
    pub fn kill_all(&mut self) {
        self.triggers.clear();
        self.shifts.clear();
    }

    /// Recompute every start/end against the current layout and viewport.
    ///
    /// Registrations are resolved in layout order so that each pin pushes the
    /// content below it before later ranges are measured.
    #[tracing::instrument(level = "debug", skip_all, fields(triggers = self.triggers.len()))]
    pub fn refresh(&mut self, proxy: &dyn ScrollerProxy, doc: &dyn Document) -> RefreshReport {
        let viewport_height = proxy.bounding_client_rect().height;
        let pos = proxy.scroll_top();
        self.shifts.clear();

        let mut order: Vec<(usize, Option<ElementBox>)> = self
            .triggers
            .iter()
            .enumerate()
            .map(|(i, t)| (i, doc.layout(t.spec.trigger)))
            .collect();
        order.sort_by(|(ia, a), (ib, b)| {
            let ta = a.map_or(f64::INFINITY, |l| l.top);
            let tb = b.map_or(f64::INFINITY, |l| l.top);
            ta.total_cmp(&tb)
                .then(self.triggers[*ia].order.cmp(&self.triggers[*ib].order))
        });

        for (idx, layout) in order {
            let Some(el) = layout else {
                let t = &mut self.triggers[idx];
                if t.bounds.take().is_some() || t.delivered.is_none() {
                    tracing::warn!(id = t.id.0, "trigger element has no layout; range cleared");
                }
                continue;
            };

            let shifted = ElementBox {
                top: el.top + shift_for(&self.shifts, el.top, Some(self.triggers[idx].spec.trigger)),
                ..el
            };
            let spec = &self.triggers[idx].spec;
            let start = spec
                .start
                .resolve(shifted, viewport_height, None)
                .unwrap_or(shifted.top);
            let end = spec
                .end
                .resolve(shifted, viewport_height, Some(start))
                .unwrap_or(start);
            let bounds = Bounds {
                start,
                end: end.max(start),
            };

            if spec.pin && spec.pin_spacing && bounds.len() > 0.0 {
                let element = spec.trigger;
                match self.shifts.iter_mut().find(|s| s.element == element) {
                    Some(s) => s.amount = s.amount.max(bounds.len()),
                    None => self.shifts.push(PinShift {
                        element,
                        below: el.bottom(),
                        amount: bounds.len(),
                    }),
                }
            }

            let t = &mut self.triggers[idx];
            t.pin_viewport_top = shifted.top - bounds.start;
            t.bounds = Some(bounds);
        }

        let mut events = Vec::with_capacity(self.triggers.len());
        for t in &mut self.triggers {
            let Some(bounds) = t.bounds else {
                continue;
            };
            t.raw = bounds.progress_at(pos);
            t.smoother.snap(t.raw);
            t.delivered = Some(t.raw);
            events.push(TriggerEvent {
                id: t.id,
                owner: t.owner,
                kind: TriggerEventKind::Refresh { progress: t.raw },
            });
        }

        let pin_spacing = self.pin_spacing();
        tracing::debug!(pin_spacing, pos, "refreshed triggers");
        RefreshReport {
            pin_spacing,
            events,
        }
    }

    /// Recompute progress from the proxy's scroll position.
    pub fn update(&mut self, proxy: &dyn ScrollerProxy, dt: Duration) -> Vec<TriggerEvent> {
        let pos = proxy.scroll_top();
        let mut events = Vec::new();
        let mut finished = Vec::new();

        for t in &mut self.triggers {
            let Some(bounds) = t.bounds else {
                continue;
            };
            let region = bounds.region(pos);
            let crossed = crossings(t.region, region);
            t.region = Some(region);

            let mut entered_once = false;
            for kind in crossed {
                events.push(TriggerEvent {
                    id: t.id,
                    owner: t.owner,
                    kind: *kind,
                });
                if t.spec.once && *kind == TriggerEventKind::Enter {
                    entered_once = true;
                    break;
                }
            }

            if t.spec.pin {
                t.phase = t.phase.advance(region == Region::Inside);
            }
            if entered_once {
                finished.push(t.id);
                continue;
            }

            t.raw = bounds.progress_at(pos);
            let progress = t.smoother.follow(t.raw, dt, t.spec.scrub);
            if t.delivered != Some(progress) {
                t.delivered = Some(progress);
                events.push(TriggerEvent {
                    id: t.id,
                    owner: t.owner,
                    kind: TriggerEventKind::Update { progress },
                });
            }
        }

        if !finished.is_empty() {
            self.triggers.retain(|t| !finished.contains(&t.id));
        }
        self.last_pos = Some(pos);
        events
    }

    /// `true` while another update would change state without any scrolling:
    /// a smoothed scrub still trails its raw progress, or a pin is mid-transition.
    pub fn is_settling(&self) -> bool {
        self.triggers.iter().any(|t| {
            t.bounds.is_some()
                && (t.smoother.is_settling(t.raw)
                    || matches!(t.phase, PinPhase::Pinning | PinPhase::Unpinning))
        })
    }

    /// Total space added below pinned elements.
    pub fn pin_spacing(&self) -> f64 {
        self.shifts.iter().map(|s| s.amount).sum()
    }

    /// Pin spacing that pushes content at layout offset `top`.
    pub fn flow_offset(&self, top: f64) -> f64 {
        shift_for(&self.shifts, top, None)
    }

    /// Resolved range, after the first refresh.
    pub fn bounds(&self, id: TriggerId) -> Option<Bounds> {
        self.get(id).and_then(|t| t.bounds)
    }

    /// Delivered (possibly smoothed) progress.
    pub fn progress(&self, id: TriggerId) -> Option<f64> {
        self.get(id).and_then(|t| t.delivered)
    }

    /// Progress of the current offset, before smoothing.
    pub fn raw_progress(&self, id: TriggerId) -> Option<f64> {
        self.get(id).filter(|t| t.bounds.is_some()).map(|t| t.raw)
    }

    /// Whether the offset is inside the range.
    pub fn is_active(&self, id: TriggerId) -> bool {
        self.get(id)
            .is_some_and(|t| t.region == Some(Region::Inside))
    }

    /// Phase of a pinned trigger; `None` for unpinned ones.
    pub fn pin_phase(&self, id: TriggerId) -> Option<PinPhase> {
        self.get(id).filter(|t| t.spec.pin).map(|t| t.phase)
    }

    /// Registration request of `id`.
    pub fn spec(&self, id: TriggerId) -> Option<&TriggerSpec> {
        self.get(id).map(|t| &t.spec)
    }

    /// Effect that registered `id`.
    pub fn owner(&self, id: TriggerId) -> Option<OwnerId> {
        self.get(id).map(|t| t.owner)
    }

    /// Pinned registrations with their trigger element.
    pub fn pinned(&self) -> impl Iterator<Item = (TriggerId, ElementId)> + '_ {
        self.triggers
            .iter()
            .filter(|t| t.spec.pin)
            .map(|t| (t.id, t.spec.trigger))
    }

    /// Placement of a pinned element at the last updated scroll position.
    pub fn pin_placement(&self, id: TriggerId, pin_type: PinType) -> PinPlacement {
        let Some(t) = self.get(id).filter(|t| t.spec.pin) else {
            return PinPlacement::Static;
        };
        let (Some(bounds), Some(pos)) = (t.bounds, self.last_pos) else {
            return PinPlacement::Static;
        };
        match bounds.region(pos) {
            Region::Before => PinPlacement::Static,
            Region::Inside => PinPlacement::Pinned {
                pin_type,
                translate_y: pos - bounds.start,
                viewport_top: t.pin_viewport_top,
            },
            Region::After => PinPlacement::Released {
                translate_y: bounds.len(),
            },
        }
    }

    /// Jump the scroller to the start of a trigger's range.
    pub fn scroll_to_start(&self, id: TriggerId, proxy: &mut dyn ScrollerProxy) -> ReelResult<()> {
        let bounds = self
            .bounds(id)
            .ok_or_else(|| ReelError::not_ready(format!("trigger {} is not resolved", id.0)))?;
        proxy.set_scroll_top(bounds.start);
        Ok(())
    }

    fn get(&self, id: TriggerId) -> Option<&Registration> {
        self.triggers.iter().find(|t| t.id == id)
    }
}

fn shift_for(shifts: &[PinShift], top: f64, element: Option<ElementId>) -> f64 {
    shifts
        .iter()
        .filter(|s| Some(s.element) != element && top >= s.below)
        .map(|s| s.amount)
        .sum()
}

fn crossings(prev: Option<Region>, next: Region) -> &'static [TriggerEventKind] {
    use Region::*;
    use TriggerEventKind::*;
    match (prev, next) {
        (None, Inside) | (Some(Before), Inside) => &[Enter],
        (None, After) | (Some(Before), After) => &[Enter, Leave],
        (Some(Inside), After) => &[Leave],
        (Some(Inside), Before) => &[LeaveBack],
        (Some(After), Inside) => &[EnterBack],
        (Some(After), Before) => &[EnterBack, LeaveBack],
        (None, Before) | (Some(Before), Before) | (Some(Inside), Inside) | (Some(After), After) => {
            &[]
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/engine.rs"]
mod tests;
