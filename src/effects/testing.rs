use std::time::Duration;

use crate::{
    assets::frames::{FrameLoad, FrameLoader, MemoryFrameLoader},
    effects::{Effect, EffectCx, ScrollCommand, Setup},
    foundation::core::{DeviceClass, Size, ViewportRect},
    foundation::error::ReelResult,
    host::dom::{Document, StaticDocument},
    trigger::{
        engine::{OwnerId, TriggerEngine, TriggerEvent},
        pin::PinType,
        proxy::ScrollerProxy,
    },
};

struct FixedProxy {
    top: f64,
    viewport: Size,
}

impl ScrollerProxy for FixedProxy {
    fn scroll_top(&self) -> f64 {
        self.top
    }

    fn set_scroll_top(&mut self, value: f64) {
        self.top = value;
    }

    fn bounding_client_rect(&self) -> ViewportRect {
        ViewportRect::anchored(self.viewport)
    }

    fn pin_type(&self) -> PinType {
        PinType::Transform
    }
}

/// Drives one effect without a stage: fixed scroll offset, in-memory loader.
pub(crate) struct Harness {
    pub doc: StaticDocument,
    pub engine: TriggerEngine,
    pub loader: MemoryFrameLoader,
    pub commands: Vec<ScrollCommand>,
    pub pos: f64,
}

impl Harness {
    pub fn new(doc: StaticDocument) -> Self {
        Self {
            doc,
            engine: TriggerEngine::new(),
            loader: MemoryFrameLoader::new(),
            commands: Vec::new(),
            pos: 0.0,
        }
    }

    fn cx(&mut self) -> EffectCx<'_> {
        let device = DeviceClass::from_width(
            self.doc.viewport().width,
            DeviceClass::DEFAULT_BREAKPOINT_PX,
        );
        EffectCx::new(
            &mut self.doc,
            &mut self.engine,
            &mut self.loader,
            OwnerId(0),
            device,
            &mut self.commands,
        )
    }

    fn proxy(&self) -> FixedProxy {
        FixedProxy {
            top: self.pos,
            viewport: self.doc.viewport(),
        }
    }

    pub fn setup(&mut self, effect: &mut dyn Effect) -> ReelResult<Setup> {
        effect.setup(&mut self.cx())
    }

    fn dispatch(&mut self, effect: &mut dyn Effect, events: Vec<TriggerEvent>) {
        let mut cx = self.cx();
        for ev in &events {
            effect.on_event(&mut cx, ev);
        }
    }

    pub fn deliver_loads(&mut self, effect: &mut dyn Effect) {
        let loads = self.loader.poll();
        let mut cx = self.cx();
        for load in &loads {
            effect.on_frame_loaded(&mut cx, load);
        }
    }

    pub fn deliver(&mut self, effect: &mut dyn Effect, load: &FrameLoad) {
        effect.on_frame_loaded(&mut self.cx(), load);
    }

    pub fn refresh(&mut self, effect: &mut dyn Effect) {
        let proxy = self.proxy();
        let report = self.engine.refresh(&proxy, &self.doc);
        effect.on_refresh(&mut self.cx());
        self.dispatch(effect, report.events);
    }

    pub fn resize(&mut self, effect: &mut dyn Effect, viewport: Size) {
        self.doc.set_viewport(viewport);
        effect.on_resize(&mut self.cx(), viewport);
    }

    /// One frame at scroll offset `pos`: update, loads, advance, commit.
    pub fn frame(&mut self, effect: &mut dyn Effect, pos: f64, dt: Duration) {
        self.pos = pos;
        let proxy = self.proxy();
        let events = self.engine.update(&proxy, dt);
        self.dispatch(effect, events);
        self.deliver_loads(effect);
        let mut cx = self.cx();
        effect.advance(&mut cx, dt);
        effect.commit(&mut cx);
    }

    pub fn commit(&mut self, effect: &mut dyn Effect) {
        effect.commit(&mut self.cx());
    }
}
