use std::any::Any;

use crate::{
    animation::{ease::Ease, scrub::Scrub},
    effects::{Effect, EffectCx, Setup},
    foundation::core::Rgba8Premul,
    foundation::error::{ReelError, ReelResult},
    foundation::math::{clamp01, require_finite},
    host::dom::{ElementId, StylePatch, require},
    trigger::{
        engine::{TriggerEvent, TriggerEventKind, TriggerId, TriggerSpec},
        position::{Anchor, TriggerPosition},
    },
};

/// Heading whose words change colour one after another as it scrolls by.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WordStaggerConfig {
    /// Effect name.
    pub name: String,
    /// Heading to split into words.
    pub heading: String,
    /// `#rrggbb` colour words start from.
    pub from_color: String,
    /// `#rrggbb` colour words end at.
    pub to_color: String,
    /// Trigger start.
    pub start: TriggerPosition,
    /// Trigger end.
    pub end: TriggerPosition,
    /// Scrub lag in seconds.
    pub scrub_secs: f64,
    /// Offset between consecutive words, in timeline units.
    pub stagger: f64,
    /// Length of one word's colour change, in timeline units.
    pub word_duration: f64,
    /// Easing of each word.
    pub ease: Ease,
}

impl Default for WordStaggerConfig {
    fn default() -> Self {
        Self {
            name: "stagger".to_string(),
            heading: "#page2>h1".to_string(),
            from_color: "#3a3a3a".to_string(),
            to_color: "#ffffff".to_string(),
            start: TriggerPosition::edge(Anchor::Fraction(0.0), Anchor::Fraction(1.0)),
            end: TriggerPosition::edge(Anchor::Fraction(1.0), Anchor::Fraction(0.0)),
            scrub_secs: 0.5,
            stagger: 0.2,
            word_duration: 0.5,
            ease: Ease::OutQuad,
        }
    }
}

/// Per-word progress for a staggered timeline at overall progress `p`.
///
/// Word `i` starts at `i × stagger` and runs for `word_duration`; the whole
/// timeline is normalised so that `p = 1` completes the last word.
pub fn word_progress(p: f64, index: usize, count: usize, stagger: f64, word_duration: f64) -> f64 {
    if count == 0 || word_duration <= 0.0 {
        return clamp01(p);
    }
    let total = word_duration + stagger * (count - 1) as f64;
    clamp01((clamp01(p) * total - index as f64 * stagger) / word_duration)
}

/// Colours a heading word by word as it scrolls through the viewport.
#[derive(Debug)]
pub struct WordStagger {
    config: WordStaggerConfig,
    from: Rgba8Premul,
    to: Rgba8Premul,
    words: Vec<ElementId>,
    applied: Vec<Option<Rgba8Premul>>,
    trigger: Option<TriggerId>,
    progress: f64,
}

impl WordStagger {
    /// Validated stagger with its colours parsed.
    pub fn new(config: WordStaggerConfig) -> ReelResult<Self> {
        let from = Rgba8Premul::parse_hex(&config.from_color)?;
        let to = Rgba8Premul::parse_hex(&config.to_color)?;
        require_finite(config.scrub_secs, "scrub_secs")?;
        if !(require_finite(config.stagger, "stagger")? >= 0.0
            && require_finite(config.word_duration, "word_duration")? > 0.0)
        {
            return Err(ReelError::validation(format!(
                "stagger '{}': stagger must be >= 0 and word_duration > 0",
                config.name
            )));
        }
        if config.start.is_relative() {
            return Err(ReelError::validation(format!(
                "stagger '{}': start must not be relative",
                config.name
            )));
        }
        Ok(Self {
            config,
            from,
            to,
            words: Vec::new(),
            applied: Vec::new(),
            trigger: None,
            progress: 0.0,
        })
    }

    /// Word spans, in reading order.
    pub fn words(&self) -> &[ElementId] {
        &self.words
    }

    /// Scrubbed timeline progress.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Colour of word `index` at the current progress.
    pub fn word_color(&self, index: usize) -> Rgba8Premul {
        let t = word_progress(
            self.progress,
            index,
            self.words.len(),
            self.config.stagger,
            self.config.word_duration,
        );
        self.from.lerp(self.to, self.config.ease.apply(t))
    }
}

impl Effect for WordStagger {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn setup(&mut self, cx: &mut EffectCx<'_>) -> ReelResult<Setup> {
        let heading = require(&*cx.doc, &self.config.heading)?;
        self.words = cx.doc.split_words(heading);
        if self.words.is_empty() {
            tracing::warn!(stagger = %self.config.name, "heading has no words");
        }
        self.applied = vec![None; self.words.len()];
        self.trigger = Some(cx.register(
            TriggerSpec::new(heading, self.config.start, self.config.end)
                .with_scrub(Scrub::from_lag_secs(Some(self.config.scrub_secs))),
        )?);
        Ok(Setup::Ready)
    }

    fn on_event(&mut self, _cx: &mut EffectCx<'_>, event: &TriggerEvent) {
        if Some(event.id) != self.trigger {
            return;
        }
        if let TriggerEventKind::Update { progress } | TriggerEventKind::Refresh { progress } =
            event.kind
        {
            self.progress = progress;
        }
    }

    fn commit(&mut self, cx: &mut EffectCx<'_>) {
        for i in 0..self.words.len() {
            let color = self.word_color(i);
            if self.applied[i] != Some(color) {
                cx.doc.apply(self.words[i], StylePatch::Color(color));
                self.applied[i] = Some(color);
            }
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "progress": self.progress,
            "words": self.words.len(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/stagger.rs"]
mod tests;
