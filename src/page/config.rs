use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use crate::{
    effects::{
        Effect, FadeOut, FadeOutConfig, FrameSequenceConfig, FrameSequencePlayer, HeroZoom,
        HeroZoomConfig, Reveal, RevealConfig, WordStagger, WordStaggerConfig,
    },
    foundation::core::DeviceClass,
    foundation::error::{ReelError, ReelResult},
    foundation::math::require_finite,
    host::{dom::LayoutSpec, scroller::LerpScrollerOpts},
    scroll::readiness::RetryPolicy,
};

/// One configured effect.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectConfig {
    /// Scrubbed, pinned image sequence.
    FrameSequence(FrameSequenceConfig),
    /// Pinned hero image zoom.
    HeroZoom(HeroZoomConfig),
    /// Section fade-in.
    Reveal(RevealConfig),
    /// Scroll-linked fade-out.
    FadeOut(FadeOutConfig),
    /// Word-by-word colour change.
    WordStagger(WordStaggerConfig),
}

impl EffectConfig {
    /// Name of the configured effect.
    pub fn name(&self) -> &str {
        match self {
            Self::FrameSequence(c) => &c.name,
            Self::HeroZoom(c) => &c.name,
            Self::Reveal(c) => &c.name,
            Self::FadeOut(c) => &c.name,
            Self::WordStagger(c) => &c.name,
        }
    }

    /// Construct the effect; fails on invalid configuration.
    pub fn build(&self) -> ReelResult<Box<dyn Effect>> {
        Ok(match self {
            Self::FrameSequence(c) => Box::new(FrameSequencePlayer::new(c.clone())?),
            Self::HeroZoom(c) => Box::new(HeroZoom::new(c.clone())?),
            Self::Reveal(c) => Box::new(Reveal::new(c.clone())?),
            Self::FadeOut(c) => Box::new(FadeOut::new(c.clone())?),
            Self::WordStagger(c) => Box::new(WordStagger::new(c.clone())?),
        })
    }
}

fn default_container() -> String {
    "#main".to_string()
}

fn default_resize_debounce_ms() -> u64 {
    150
}

fn default_breakpoint() -> f64 {
    DeviceClass::DEFAULT_BREAKPOINT_PX
}

/// Page description: scroller, boot policy, effects and (optionally) a static layout.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PageConfig {
    /// Selector of the scrolling container.
    #[serde(default = "default_container")]
    pub container: String,
    /// Smooth-scroller options.
    #[serde(default)]
    pub scroller: LerpScrollerOpts,
    /// Quiet time before a resize burst triggers a refresh.
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
    /// Budget for the scroller to report ready.
    #[serde(default)]
    pub init_retry: RetryPolicy,
    /// Budget for each deferred effect setup.
    #[serde(default)]
    pub setup_retry: RetryPolicy,
    /// Viewport width below which the page is treated as mobile.
    #[serde(default = "default_breakpoint")]
    pub mobile_breakpoint_px: f64,
    /// Effects to set up on the page.
    #[serde(default)]
    pub effects: Vec<EffectConfig>,
    /// Optional page layout.
    #[serde(default)]
    pub layout: Option<LayoutSpec>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            container: default_container(),
            scroller: LerpScrollerOpts::default(),
            resize_debounce_ms: default_resize_debounce_ms(),
            init_retry: RetryPolicy::default(),
            setup_retry: RetryPolicy::default(),
            mobile_breakpoint_px: default_breakpoint(),
            effects: Vec::new(),
            layout: None,
        }
    }
}

impl PageConfig {
    /// Parse JSON from a reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("parse page config JSON: {e}")))
    }

    /// Parse a JSON string.
    pub fn from_json(s: &str) -> ReelResult<Self> {
        serde_json::from_str(s).map_err(|e| ReelError::serde(format!("parse page config JSON: {e}")))
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open page config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check the scroller, retry policies, effect names and every effect's calibration.
    pub fn validate(&self) -> ReelResult<()> {
        if self.container.trim().is_empty() {
            return Err(ReelError::validation("container selector must be non-empty"));
        }
        let s = &self.scroller;
        if !(require_finite(s.lerp, "scroller.lerp")? > 0.0 && s.lerp <= 1.0) {
            return Err(ReelError::validation("scroller.lerp must be in (0, 1]"));
        }
        require_finite(s.multiplier, "scroller.multiplier")?;
        if !(require_finite(self.mobile_breakpoint_px, "mobile_breakpoint_px")? > 0.0) {
            return Err(ReelError::validation("mobile_breakpoint_px must be > 0"));
        }
        self.init_retry.validate()?;
        self.setup_retry.validate()?;

        let mut names = HashSet::new();
        for effect in &self.effects {
            if !names.insert(effect.name()) {
                return Err(ReelError::validation(format!(
                    "duplicate effect name '{}'",
                    effect.name()
                )));
            }
            effect.build()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/config.rs"]
mod tests;
