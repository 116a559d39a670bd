use std::{fs::File, io::BufReader, path::Path, time::Duration};

use crate::{
    assets::frames::{FrameLoader, FsFrameLoader},
    foundation::core::Size,
    foundation::error::{ReelError, ReelResult},
    foundation::math::require_finite,
    host::{
        dom::{Document, StaticDocument},
        scroller::LerpScroller,
    },
    page::{
        config::PageConfig,
        stage::{BootState, Stage, StageSnapshot},
    },
    render::surface::Surface,
};

fn one() -> u32 {
    1
}

/// One scripted gesture or observation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayStep {
    /// Let frames run for `ms` milliseconds.
    WaitMs {
        /// Duration to wait.
        ms: u64,
    },
    /// `repeat` wheel ticks, `interval_ms` apart.
    Wheel {
        /// Pixels per tick; positive scrolls down.
        delta: f64,
        /// Number of ticks.
        #[serde(default = "one")]
        repeat: u32,
        /// Spacing between ticks.
        #[serde(default)]
        interval_ms: u64,
    },
    /// Resize the viewport.
    Resize {
        /// New viewport width.
        width: f64,
        /// New viewport height.
        height: f64,
    },
    /// Jump or glide to an offset.
    ScrollTo {
        /// Destination offset.
        value: f64,
        /// Skip interpolation.
        #[serde(default)]
        instant: bool,
    },
    /// Record a snapshot and every canvas under `name`.
    Capture {
        /// Label of the capture.
        name: String,
    },
}

fn default_fps() -> f64 {
    60.0
}

fn default_settle_ms() -> u64 {
    5000
}

/// A timed gesture script replayed against a [`Stage`] at a fixed frame rate.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReplayScript {
    /// Frames per second of the replay clock.
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Upper bound on waiting for frame loads before each frame.
    #[serde(default = "default_settle_ms")]
    pub settle_timeout_ms: u64,
    /// Steps of the replay.
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    /// Parse a JSON string.
    pub fn from_json(s: &str) -> ReelResult<Self> {
        serde_json::from_str(s).map_err(|e| ReelError::serde(format!("parse replay script JSON: {e}")))
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open replay script '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(f))
            .map_err(|e| ReelError::serde(format!("parse replay script JSON: {e}")))
    }

    /// Reject non-finite values, bad dimensions and empty capture names.
    pub fn validate(&self) -> ReelResult<()> {
        if !(require_finite(self.fps, "fps")? > 0.0 && self.fps <= 1000.0) {
            return Err(ReelError::validation("fps must be in (0, 1000]"));
        }
        for step in &self.steps {
            match step {
                ReplayStep::Wheel { delta, .. } => {
                    require_finite(*delta, "wheel.delta")?;
                }
                ReplayStep::Resize { width, height } => {
                    if !(require_finite(*width, "resize.width")? > 0.0
                        && require_finite(*height, "resize.height")? > 0.0)
                    {
                        return Err(ReelError::validation("resize dimensions must be > 0"));
                    }
                }
                ReplayStep::ScrollTo { value, .. } => {
                    require_finite(*value, "scroll_to.value")?;
                }
                ReplayStep::Capture { name } if name.trim().is_empty() => {
                    return Err(ReelError::validation("capture name must be non-empty"));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Time between two frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps)
    }
}

/// Canvas contents of one effect at capture time.
#[derive(Clone, Debug)]
pub struct CapturedSurface {
    /// Name of the effect that owns the canvas.
    pub effect: String,
    /// Copy of the canvas.
    pub surface: Surface,
}

/// State recorded by a [`ReplayStep::Capture`].
#[derive(Clone, Debug, serde::Serialize)]
pub struct Capture {
    /// Capture label.
    pub name: String,
    /// Stage state at capture time.
    pub snapshot: StageSnapshot,
    /// Canvases at capture time.
    #[serde(skip)]
    pub surfaces: Vec<CapturedSurface>,
}

/// Scroll offset after each step.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Sample {
    /// Index of the step.
    pub step: usize,
    /// Clock after the step.
    pub time_ms: u128,
    /// Scroll offset after the step.
    pub offset: f64,
}

/// Outcome of a replay.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ReplayTrace {
    /// Frames rendered.
    pub frames: u64,
    /// One sample per step.
    pub samples: Vec<Sample>,
    /// Captures in script order.
    pub captures: Vec<Capture>,
}

/// Longest simulated time spent waiting for the scroller before giving up.
const MAX_BOOT: Duration = Duration::from_secs(600);

struct Clock {
    now: Duration,
    interval: Duration,
    frames: u64,
    settle: Duration,
}

impl Clock {
    fn tick<D: Document>(&mut self, stage: &mut Stage<D>) {
        stage.settle_loads(self.settle);
        stage.frame(self.now);
        self.frames += 1;
        self.now += self.interval;
    }

    /// Run frames covering `span` of simulated time, at least one.
    fn run<D: Document>(&mut self, stage: &mut Stage<D>, span: Duration) {
        let until = self.now + span;
        self.tick(stage);
        while self.now < until {
            self.tick(stage);
        }
    }
}

/// Replay `script` against `stage`.
///
/// Loads are settled before every frame, so the result depends only on the
/// script and the page.
pub fn replay<D: Document>(stage: &mut Stage<D>, script: &ReplayScript) -> ReelResult<ReplayTrace> {
    script.validate()?;
    let mut clock = Clock {
        now: Duration::ZERO,
        interval: script.frame_interval(),
        frames: 0,
        settle: Duration::from_millis(script.settle_timeout_ms),
    };

    clock.tick(stage);
    while stage.boot_state() == BootState::Booting && clock.now < MAX_BOOT {
        clock.tick(stage);
    }
    if stage.boot_state() != BootState::Running {
        return Err(ReelError::not_ready(format!(
            "stage did not start: {:?}",
            stage.boot_state()
        )));
    }
    tracing::info!(steps = script.steps.len(), fps = script.fps, "replaying");

    let mut trace = ReplayTrace {
        frames: 0,
        samples: Vec::with_capacity(script.steps.len()),
        captures: Vec::new(),
    };
    for (i, step) in script.steps.iter().enumerate() {
        match step {
            ReplayStep::WaitMs { ms } => clock.run(stage, Duration::from_millis(*ms)),
            ReplayStep::Wheel {
                delta,
                repeat,
                interval_ms,
            } => {
                for _ in 0..*repeat {
                    stage.wheel(*delta);
                    clock.run(stage, Duration::from_millis(*interval_ms));
                }
            }
            ReplayStep::Resize { width, height } => {
                stage.resize(clock.now, Size::new(*width, *height));
                clock.tick(stage);
            }
            ReplayStep::ScrollTo { value, instant } => {
                stage.scroll_to(*value, *instant);
                clock.tick(stage);
            }
            ReplayStep::Capture { name } => {
                tracing::debug!(capture = %name, offset = stage.position(), "capture");
                trace.captures.push(Capture {
                    name: name.clone(),
                    snapshot: stage.snapshot(),
                    surfaces: stage
                        .surfaces()
                        .map(|(effect, surface)| CapturedSurface {
                            effect: effect.to_string(),
                            surface: surface.clone(),
                        })
                        .collect(),
                });
            }
        }
        trace.samples.push(Sample {
            step: i,
            time_ms: stage.time().as_millis(),
            offset: stage.position(),
        });
    }
    trace.frames = clock.frames;
    Ok(trace)
}

/// Stage over the page's static layout, with frames read from `assets`.
pub fn stage_from_config(
    config: &PageConfig,
    assets: &Path,
    threads: Option<usize>,
) -> ReelResult<Stage<StaticDocument>> {
    let Some(layout) = config.layout.clone() else {
        return Err(ReelError::validation("page config has no layout"));
    };
    let loader: Box<dyn FrameLoader> = Box::new(FsFrameLoader::new(assets, threads)?);
    stage_with_loader(config, StaticDocument::new(layout)?, loader)
}

/// Stage over `doc` with the configured scroller and the given loader.
pub fn stage_with_loader(
    config: &PageConfig,
    doc: StaticDocument,
    loader: Box<dyn FrameLoader>,
) -> ReelResult<Stage<StaticDocument>> {
    let scroller = Box::new(LerpScroller::new(config.scroller.clone()));
    Stage::new(config, doc, scroller, loader)
}

#[cfg(test)]
#[path = "../tests/unit/replay.rs"]
mod tests;
