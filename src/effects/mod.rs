use std::{any::Any, time::Duration};

use crate::{
    assets::frames::{FrameLoad, FrameLoader},
    foundation::core::{DeviceClass, Size},
    foundation::error::ReelResult,
    host::dom::Document,
    render::surface::Surface,
    trigger::engine::{OwnerId, TriggerEngine, TriggerEvent, TriggerId, TriggerSpec},
};

pub(crate) mod frame_player;
pub(crate) mod hero_zoom;
pub(crate) mod reveal;
pub(crate) mod stagger;

/// Scroll requests issued by effects (and by the stage on boot). Only the
/// bridge applies them.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScrollCommand {
    /// Freeze the scroller.
    Stop,
    /// Resume the scroller.
    Start,
    /// Re-measure content and recompute trigger ranges.
    Update,
    /// Move the scroller.
    ScrollTo {
        /// Destination offset.
        value: f64,
        /// Skip interpolation.
        instant: bool,
    },
}

/// Outcome of [`Effect::setup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Setup {
    /// Triggers are registered; the effect is live.
    Ready,
    /// A dependency is not loaded yet; setup is retried later.
    Deferred(String),
}

/// What an effect may touch during one callback.
pub struct EffectCx<'a> {
    /// Page the effect styles.
    pub doc: &'a mut dyn Document,
    /// Engine for registering and killing triggers.
    pub engine: &'a mut TriggerEngine,
    /// Image loader for frame requests.
    pub loader: &'a mut dyn FrameLoader,
    /// Owner of triggers registered through this context.
    pub owner: OwnerId,
    /// Current viewport.
    pub viewport: Size,
    /// Device class of the current viewport.
    pub device: DeviceClass,
    pub(crate) commands: &'a mut Vec<ScrollCommand>,
}

impl<'a> EffectCx<'a> {
    /// Context for the effect in slot `owner`.
    pub fn new(
        doc: &'a mut dyn Document,
        engine: &'a mut TriggerEngine,
        loader: &'a mut dyn FrameLoader,
        owner: OwnerId,
        device: DeviceClass,
        commands: &'a mut Vec<ScrollCommand>,
    ) -> Self {
        let viewport = doc.viewport();
        Self {
            doc,
            engine,
            loader,
            owner,
            viewport,
            device,
            commands,
        }
    }

    /// Register a trigger owned by the current effect.
    pub fn register(&mut self, spec: TriggerSpec) -> ReelResult<TriggerId> {
        self.engine.register(self.owner, spec)
    }

    /// Queue a scroll request for the bridge.
    pub fn command(&mut self, command: ScrollCommand) {
        self.commands.push(command);
    }
}

/// A scroll-driven effect owned by the stage.
///
/// Callbacks run inside the stage's frame phases: events and loads during
/// recompute, [`Effect::commit`] once per frame after all of them.
pub trait Effect {
    /// Unique name from the configuration.
    fn name(&self) -> &str;

    /// Resolve elements and register triggers. A missing element is an error
    /// and the effect is dropped.
    fn setup(&mut self, cx: &mut EffectCx<'_>) -> ReelResult<Setup>;

    /// A trigger owned by this effect changed.
    fn on_event(&mut self, _cx: &mut EffectCx<'_>, _event: &TriggerEvent) {}

    /// Trigger ranges were recomputed.
    fn on_refresh(&mut self, _cx: &mut EffectCx<'_>) {}

    /// Viewport changed (not debounced).
    fn on_resize(&mut self, _cx: &mut EffectCx<'_>, _viewport: Size) {}

    /// A frame requested by this effect completed.
    fn on_frame_loaded(&mut self, _cx: &mut EffectCx<'_>, _load: &FrameLoad) {}

    /// Time-based animation step.
    fn advance(&mut self, _cx: &mut EffectCx<'_>, _dt: Duration) {}

    /// Write styles and paint.
    fn commit(&mut self, _cx: &mut EffectCx<'_>) {}

    /// Canvas the effect draws to, if any.
    fn surface(&self) -> Option<&Surface> {
        None
    }

    /// Serializable snapshot for traces.
    fn snapshot(&self) -> serde_json::Value;

    /// For typed access through [`crate::Stage::effect`].
    fn as_any(&self) -> &dyn Any;
}

pub use frame_player::{FrameSequenceConfig, FrameSequencePlayer, FrameSource};
pub use hero_zoom::{HeroZoom, HeroZoomConfig, HeroZoomState};
pub use reveal::{FadeOut, FadeOutConfig, Reveal, RevealConfig};
pub use stagger::{WordStagger, WordStaggerConfig};

#[cfg(test)]
pub(crate) mod testing;
