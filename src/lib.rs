//! Scrollreel is a headless scroll-choreography engine.
//!
//! A [`Stage`] owns a page ([`Document`]), a smoothing scroll virtualizer
//! behind a [`ScrollBridge`], a [`TriggerEngine`] and a set of scroll-driven
//! effects, and advances them one animation frame at a time:
//!
//! - Describe the page with a [`PageConfig`] (effects, scroller, boot policy)
//! - Feed input with [`Stage::wheel`], [`Stage::resize`] and [`Stage::scroll_to`]
//! - Call [`Stage::frame`] per frame and read back styles, canvases and snapshots
//!
//! [`replay()`] drives a stage from a timed gesture script.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub(crate) mod animation;
pub(crate) mod assets;
pub(crate) mod effects;
pub(crate) mod foundation;
pub(crate) mod host;
pub(crate) mod page;
pub(crate) mod render;
pub(crate) mod replay;
pub(crate) mod scroll;
pub(crate) mod trigger;

pub use crate::foundation::core::{
    Affine, DeviceClass, Point, Rect, Rgba8Premul, ScrollState, Size, Vec2, ViewportRect,
};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::scrub::Scrub;
pub use crate::animation::tween::{Tween, TweenStep};
pub use crate::assets::decode::{PreparedImage, decode_image, read_image};
pub use crate::assets::frames::{
    FrameKey, FrameLoad, FrameLoader, FramePattern, FsFrameLoader, LoadState, MemoryFrameLoader,
};
pub use crate::effects::frame_player::frame_index;
pub use crate::effects::hero_zoom::{HeroLayout, contain_rect};
pub use crate::effects::stagger::word_progress;
pub use crate::effects::{
    Effect, EffectCx, FadeOut, FadeOutConfig, FrameSequenceConfig, FrameSequencePlayer,
    FrameSource, HeroZoom, HeroZoomConfig, HeroZoomState, Reveal, RevealConfig, ScrollCommand,
    Setup, WordStagger, WordStaggerConfig,
};
pub use crate::host::dom::{
    ComputedStyle, Document, ElementBox, ElementId, ElementSpec, ImageSpec, LayoutSpec, Length,
    StaticDocument, StylePatch, TransformStyle,
};
pub use crate::host::scroller::{
    LerpScroller, LerpScrollerOpts, ScrollEvent, ScrollToOpts, SmoothScroller,
};
pub use crate::page::config::{EffectConfig, PageConfig};
pub use crate::page::stage::{BootState, EffectState, Stage, StageSnapshot, TriggerSnapshot};
pub use crate::render::cover::{CoverFit, cover_fit};
pub use crate::render::surface::Surface;
pub use crate::replay::{
    Capture, CapturedSurface, ReplayScript, ReplayStep, ReplayTrace, Sample, replay,
    stage_from_config, stage_with_loader,
};
pub use crate::scroll::bridge::{ScrollBridge, SetPositionOpts};
pub use crate::scroll::readiness::{GateState, ReadyGate, RetryPolicy};
pub use crate::trigger::engine::{
    Bounds, OwnerId, RefreshReport, TriggerEngine, TriggerEvent, TriggerEventKind, TriggerId,
    TriggerSpec,
};
pub use crate::trigger::pin::{PinPhase, PinPlacement, PinType};
pub use crate::trigger::position::{Anchor, TriggerPosition};
pub use crate::trigger::proxy::ScrollerProxy;
