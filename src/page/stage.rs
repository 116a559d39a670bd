use std::{collections::BTreeMap, time::Duration};

use crate::{
    assets::frames::{FrameLoad, FrameLoader},
    effects::{Effect, EffectCx, ScrollCommand, Setup},
    foundation::core::{DeviceClass, Size},
    foundation::error::{ReelError, ReelResult},
    host::{
        dom::{Document, StylePatch},
        scroller::SmoothScroller,
    },
    page::config::PageConfig,
    render::surface::Surface,
    scroll::{
        bridge::{ScrollBridge, SetPositionOpts},
        readiness::{GateState, ReadyGate, RetryPolicy},
    },
    trigger::engine::{OwnerId, TriggerEngine, TriggerEvent, TriggerId},
};

/// Lifecycle of a [`Stage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootState {
    /// Waiting for the scroller to report ready.
    Booting,
    /// The scroller is ready and effects are running.
    Running,
    /// The scroller never became ready within the retry budget.
    Failed,
    /// The scroll container is missing; nothing runs.
    NoContainer,
    /// After [`Stage::teardown`].
    TornDown,
}

/// Lifecycle of one configured effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectState {
    /// Waiting on its elements or images.
    Pending,
    /// Set up and running.
    Ready,
    /// Setup failed or never completed; the effect no longer runs.
    Dropped,
}

struct Slot {
    effect: Box<dyn Effect>,
    state: EffectState,
    gate: Option<ReadyGate>,
}

/// Resolved range and progress of one trigger.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TriggerSnapshot {
    /// Trigger id.
    pub id: TriggerId,
    /// Name of the owning effect.
    pub owner: String,
    /// Resolved start offset.
    pub start: f64,
    /// Resolved end offset.
    pub end: f64,
    /// Progress as delivered to the owner, after scrub smoothing.
    pub progress: Option<f64>,
    /// Progress of the current offset within `start..end`.
    pub raw_progress: Option<f64>,
    /// Whether the offset is inside the range.
    pub active: bool,
}

/// Serializable view of a stage at one instant.
#[derive(Clone, Debug, serde::Serialize)]
pub struct StageSnapshot {
    /// Time of the latest frame.
    pub time_ms: u128,
    /// Lifecycle state.
    pub boot: BootState,
    /// Scroll offset.
    pub offset: f64,
    /// Scrollable height including pin spacing.
    pub scroll_height: f64,
    /// Every resolved trigger.
    pub triggers: Vec<TriggerSnapshot>,
    /// Per-effect state, keyed by name.
    pub effects: BTreeMap<String, serde_json::Value>,
}

/// Owns the document, the scroll bridge, the trigger engine, the frame loader
/// and every effect, and runs them in explicit per-frame phases.
///
/// Time is supplied by the caller as the offset since the stage started, so
/// runs are reproducible.
pub struct Stage<D: Document> {
    doc: D,
    bridge: Option<ScrollBridge>,
    engine: TriggerEngine,
    loader: Box<dyn FrameLoader>,
    slots: Vec<Slot>,
    commands: Vec<ScrollCommand>,
    settled: Vec<FrameLoad>,
    boot: BootState,
    boot_gate: ReadyGate,
    setup_retry: RetryPolicy,
    breakpoint_px: f64,
    needs_refresh: bool,
    last_now: Option<Duration>,
}

impl<D: Document> std::fmt::Debug for Stage<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("boot", &self.boot)
            .field("bridge", &self.bridge)
            .field("effects", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl<D: Document> Stage<D> {
    /// Build a stage for `config` over `doc`.
    ///
    /// Invalid configuration is an error. A missing scroll container is not:
    /// the stage is created in [`BootState::NoContainer`] and never runs.
    pub fn new(
        config: &PageConfig,
        doc: D,
        scroller: Box<dyn SmoothScroller>,
        loader: Box<dyn FrameLoader>,
    ) -> ReelResult<Self> {
        config.validate()?;
        let slots = config
            .effects
            .iter()
            .map(|c| {
                Ok(Slot {
                    effect: c.build()?,
                    state: EffectState::Pending,
                    gate: None,
                })
            })
            .collect::<ReelResult<Vec<_>>>()?;

        let (bridge, boot) = match ScrollBridge::attach(
            &doc,
            &config.container,
            scroller,
            Duration::from_millis(config.resize_debounce_ms),
        ) {
            Ok(b) => (
                Some(b.with_mobile_breakpoint(config.mobile_breakpoint_px)),
                BootState::Booting,
            ),
            Err(ReelError::MissingElement(_)) => (None, BootState::NoContainer),
            Err(e) => return Err(e),
        };

        Ok(Self {
            doc,
            bridge,
            engine: TriggerEngine::new(),
            loader,
            slots,
            commands: Vec::new(),
            settled: Vec::new(),
            boot,
            boot_gate: ReadyGate::new("scroller", config.init_retry),
            setup_retry: config.setup_retry,
            breakpoint_px: config.mobile_breakpoint_px,
            needs_refresh: false,
            last_now: None,
        })
    }

    /// Time of the most recent frame.
    pub fn time(&self) -> Duration {
        self.last_now.unwrap_or_default()
    }

    /// Current lifecycle state.
    pub fn boot_state(&self) -> BootState {
        self.boot
    }

    /// The page.
    pub fn doc(&self) -> &D {
        &self.doc
    }

    /// Mutable page, for host-side changes.
    pub fn doc_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    /// Scroll bridge, once the container was found.
    pub fn bridge(&self) -> Option<&ScrollBridge> {
        self.bridge.as_ref()
    }

    /// Trigger engine.
    pub fn engine(&self) -> &TriggerEngine {
        &self.engine
    }

    /// Device class of the current viewport.
    pub fn device(&self) -> DeviceClass {
        DeviceClass::from_width(self.doc.viewport().width, self.breakpoint_px)
    }

    /// Current scroll offset (0 without a bridge).
    pub fn position(&self) -> f64 {
        self.bridge.as_ref().map_or(0.0, ScrollBridge::get_position)
    }

    /// Lifecycle state of the effect named `name`.
    pub fn effect_state(&self, name: &str) -> Option<EffectState> {
        self.slots
            .iter()
            .find(|s| s.effect.name() == name)
            .map(|s| s.state)
    }

    /// Typed access to an effect by name.
    pub fn effect<T: 'static>(&self, name: &str) -> Option<&T> {
        self.slots
            .iter()
            .find(|s| s.effect.name() == name)
            .and_then(|s| s.effect.as_any().downcast_ref::<T>())
    }

    /// Canvases of running effects, in configuration order.
    pub fn surfaces(&self) -> impl Iterator<Item = (&str, &Surface)> + '_ {
        self.slots
            .iter()
            .filter(|s| s.state == EffectState::Ready)
            .filter_map(|s| s.effect.surface().map(|surf| (s.effect.name(), surf)))
    }

    /// Wheel input in pixels; positive scrolls down.
    pub fn wheel(&mut self, delta: f64) {
        if let Some(bridge) = &mut self.bridge {
            bridge.wheel(delta);
        }
    }

    /// Viewport change. Effects resize immediately; the refresh is debounced.
    pub fn resize(&mut self, now: Duration, size: Size) {
        self.doc.set_viewport(size);
        if let Some(bridge) = &mut self.bridge {
            bridge.on_resize(now, self.doc.viewport());
        }
        let device = self.device();
        let viewport = self.doc.viewport();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.state != EffectState::Ready {
                continue;
            }
            let mut cx = EffectCx::new(
                &mut self.doc,
                &mut self.engine,
                self.loader.as_mut(),
                OwnerId(i),
                device,
                &mut self.commands,
            );
            slot.effect.on_resize(&mut cx, viewport);
        }
    }

    /// The host scrolled the container natively; the virtualizer adopts the offset.
    pub fn native_scroll(&mut self, offset: f64) {
        if let Some(bridge) = &mut self.bridge {
            bridge.set_position(offset, SetPositionOpts::instant());
        }
    }

    /// Scroll to `value`; `instant` skips interpolation.
    pub fn scroll_to(&mut self, value: f64, instant: bool) {
        if let Some(bridge) = &mut self.bridge {
            bridge.set_position(value, SetPositionOpts { instant });
        }
    }

    /// Block until outstanding frame loads finish or `timeout` elapses. The
    /// completions are delivered on the next frame.
    pub fn settle_loads(&mut self, timeout: Duration) {
        let loads = self.loader.settle(timeout);
        self.settled.extend(loads);
    }

    /// Kill every trigger and drop all effects. In-flight loads are left to finish.
    pub fn teardown(&mut self) {
        self.engine.kill_all();
        self.slots.clear();
        self.commands.clear();
        self.boot = BootState::TornDown;
        tracing::debug!(in_flight = self.loader.in_flight(), "stage torn down");
    }

    /// Run one animation frame at `now`.
    pub fn frame(&mut self, now: Duration) {
        let dt = self
            .last_now
            .map_or(Duration::ZERO, |prev| now.saturating_sub(prev));
        self.last_now = Some(now);

        if self.boot == BootState::Booting {
            self.poll_boot(now);
        }
        if self.boot != BootState::Running {
            return;
        }
        self.poll_deferred(now);

        let loads = self.read(now, dt);
        self.recompute(dt, loads);
        self.commit();
    }

    fn poll_boot(&mut self, now: Duration) {
        let Some(bridge) = &self.bridge else {
            return;
        };
        let ready = bridge.is_scroller_ready();
        match self.boot_gate.poll(now, || ready) {
            GateState::Pending => {}
            GateState::Failed { .. } => self.boot = BootState::Failed,
            GateState::Ready => {
                // Start from the top whatever offset the host restored.
                self.commands.push(ScrollCommand::ScrollTo {
                    value: 0.0,
                    instant: true,
                });
                for i in 0..self.slots.len() {
                    self.try_setup(i);
                }
                self.boot = BootState::Running;
                self.needs_refresh = true;
                tracing::info!(effects = self.slots.len(), "stage running");
            }
        }
    }

    fn try_setup(&mut self, i: usize) {
        let device = self.device();
        let Some(slot) = self.slots.get_mut(i) else {
            return;
        };
        let mut cx = EffectCx::new(
            &mut self.doc,
            &mut self.engine,
            self.loader.as_mut(),
            OwnerId(i),
            device,
            &mut self.commands,
        );
        match slot.effect.setup(&mut cx) {
            Ok(Setup::Ready) => {
                slot.state = EffectState::Ready;
                slot.gate = None;
                self.needs_refresh = true;
            }
            Ok(Setup::Deferred(reason)) => {
                tracing::debug!(effect = slot.effect.name(), %reason, "effect setup deferred");
                if slot.gate.is_none() {
                    slot.gate = Some(ReadyGate::new(slot.effect.name(), self.setup_retry));
                }
            }
            Err(e) => {
                tracing::warn!(effect = slot.effect.name(), error = %e, "effect setup failed; effect disabled");
                slot.state = EffectState::Dropped;
                self.engine.kill_owner(OwnerId(i));
            }
        }
    }

    fn poll_deferred(&mut self, now: Duration) {
        for i in 0..self.slots.len() {
            let slot = &mut self.slots[i];
            if slot.state != EffectState::Pending {
                continue;
            }
            let Some(gate) = &mut slot.gate else {
                continue;
            };
            // The check only reports "time to retry"; setup itself runs below.
            let mut due = false;
            match gate.poll(now, || {
                due = true;
                false
            }) {
                GateState::Failed { .. } => {
                    slot.state = EffectState::Dropped;
                    self.engine.kill_owner(OwnerId(i));
                }
                _ if due => self.try_setup(i),
                _ => {}
            }
        }
    }

    /// Read phase: host snapshot, loader completions, scroller tick, debounced resize.
    fn read(&mut self, now: Duration, dt: Duration) -> Vec<FrameLoad> {
        let mut loads = std::mem::take(&mut self.settled);
        loads.extend(self.loader.poll());
        let Some(bridge) = &mut self.bridge else {
            return loads;
        };
        bridge.observe(&self.doc);
        bridge.tick(dt);
        let resized = bridge.poll_resize(now);
        if resized || std::mem::take(&mut self.needs_refresh) {
            self.refresh();
        }
        loads
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn refresh(&mut self) {
        let Some(bridge) = &mut self.bridge else {
            return;
        };
        let report = bridge.refresh(&self.doc, &mut self.engine);
        let device = self.device();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.state != EffectState::Ready {
                continue;
            }
            let mut cx = EffectCx::new(
                &mut self.doc,
                &mut self.engine,
                self.loader.as_mut(),
                OwnerId(i),
                device,
                &mut self.commands,
            );
            slot.effect.on_refresh(&mut cx);
        }
        self.dispatch(&report.events);
    }

    /// Recompute phase: trigger progress, events, loads, time-based tweens.
    fn recompute(&mut self, dt: Duration, loads: Vec<FrameLoad>) {
        if let Some(bridge) = &mut self.bridge
            && (bridge.take_notified() || self.engine.is_settling())
        {
            let events = self.engine.update(&*bridge, dt);
            self.dispatch(&events);
        }

        let device = self.device();
        for load in &loads {
            let i = load.key.sequence;
            let Some(slot) = self.slots.get_mut(i) else {
                continue;
            };
            if slot.state == EffectState::Dropped {
                continue;
            }
            let mut cx = EffectCx::new(
                &mut self.doc,
                &mut self.engine,
                self.loader.as_mut(),
                OwnerId(i),
                device,
                &mut self.commands,
            );
            slot.effect.on_frame_loaded(&mut cx, load);
        }

        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.state != EffectState::Ready {
                continue;
            }
            let mut cx = EffectCx::new(
                &mut self.doc,
                &mut self.engine,
                self.loader.as_mut(),
                OwnerId(i),
                device,
                &mut self.commands,
            );
            slot.effect.advance(&mut cx, dt);
        }
    }

    fn dispatch(&mut self, events: &[TriggerEvent]) {
        let device = self.device();
        for event in events {
            let i = event.owner.0;
            let Some(slot) = self.slots.get_mut(i) else {
                continue;
            };
            if slot.state != EffectState::Ready {
                continue;
            }
            let mut cx = EffectCx::new(
                &mut self.doc,
                &mut self.engine,
                self.loader.as_mut(),
                OwnerId(i),
                device,
                &mut self.commands,
            );
            slot.effect.on_event(&mut cx, event);
        }
    }

    /// Commit phase: container transform, pins, effect styles and paints, scroll commands.
    fn commit(&mut self) {
        let device = self.device();
        let Some(bridge) = &mut self.bridge else {
            return;
        };
        self.doc.apply(bridge.container(), bridge.container_style());
        let pin_type = bridge.pin_strategy();
        for (id, element) in self.engine.pinned() {
            self.doc
                .apply(element, StylePatch::Pin(self.engine.pin_placement(id, pin_type)));
        }

        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.state != EffectState::Ready {
                continue;
            }
            let mut cx = EffectCx::new(
                &mut self.doc,
                &mut self.engine,
                self.loader.as_mut(),
                OwnerId(i),
                device,
                &mut self.commands,
            );
            slot.effect.commit(&mut cx);
        }

        for command in std::mem::take(&mut self.commands) {
            tracing::debug!(?command, "scroll command");
            match command {
                ScrollCommand::Stop => bridge.stop(),
                ScrollCommand::Start => bridge.start(),
                ScrollCommand::Update => self.needs_refresh = true,
                ScrollCommand::ScrollTo { value, instant } => {
                    bridge.set_position(value, SetPositionOpts { instant });
                }
            }
        }
    }

    /// Serializable state for traces.
    pub fn snapshot(&self) -> StageSnapshot {
        let owner_name = |owner: OwnerId| {
            self.slots
                .get(owner.0)
                .map_or_else(String::new, |s| s.effect.name().to_string())
        };
        let triggers = self
            .engine
            .ids()
            .filter_map(|id| {
                let bounds = self.engine.bounds(id)?;
                Some(TriggerSnapshot {
                    id,
                    owner: self.engine.owner(id).map(&owner_name).unwrap_or_default(),
                    start: bounds.start,
                    end: bounds.end,
                    progress: self.engine.progress(id),
                    raw_progress: self.engine.raw_progress(id),
                    active: self.engine.is_active(id),
                })
            })
            .collect();
        let effects = self
            .slots
            .iter()
            .filter(|s| s.state == EffectState::Ready)
            .map(|s| (s.effect.name().to_string(), s.effect.snapshot()))
            .collect();
        StageSnapshot {
            time_ms: self.time().as_millis(),
            boot: self.boot,
            offset: self.position(),
            scroll_height: self
                .bridge
                .as_ref()
                .map_or(0.0, ScrollBridge::scroll_height),
            triggers,
            effects,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/stage.rs"]
mod tests;
