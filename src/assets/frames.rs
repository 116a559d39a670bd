use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    time::{Duration, Instant},
};

use crate::{
    assets::decode::{PreparedImage, read_image},
    foundation::error::{ReelError, ReelResult},
};

/// Identifies one frame slot of one sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct FrameKey {
    /// Sequence the frame belongs to.
    pub sequence: usize,
    /// Frame position within the sequence.
    pub index: usize,
}

/// Completion of a frame request.
#[derive(Clone, Debug)]
pub struct FrameLoad {
    /// Slot the request was made for.
    pub key: FrameKey,
    /// URL as requested.
    pub url: String,
    /// Decoded image or the load error.
    pub result: Result<PreparedImage, String>,
}

/// Per-slot load state held by a sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Requested, not completed yet.
    #[default]
    Pending,
    /// Decoded and ready to draw.
    Loaded(PreparedImage),
    /// Left unloaded for the lifetime of the sequence.
    Failed,
}

impl LoadState {
    /// The image, if it finished loading with non-zero dimensions.
    pub fn ready(&self) -> Option<&PreparedImage> {
        match self {
            Self::Loaded(img) if !img.is_empty() => Some(img),
            _ => None,
        }
    }
}

/// Image loading subsystem: requests are independent, unordered and never
/// cancelled. Completions are observed through [`FrameLoader::poll`].
pub trait FrameLoader {
    /// Start loading `url` for `key`.
    fn request(&mut self, key: FrameKey, url: &str);

    /// Completions since the previous poll.
    fn poll(&mut self) -> Vec<FrameLoad>;

    /// Requests not yet returned by [`FrameLoader::poll`].
    fn in_flight(&self) -> usize;

    /// Block until every in-flight request completes or `timeout` elapses.
    fn settle(&mut self, _timeout: Duration) -> Vec<FrameLoad> {
        self.poll()
    }
}

/// Reads and decodes frames from a directory on a rayon pool.
pub struct FsFrameLoader {
    root: PathBuf,
    pool: Arc<rayon::ThreadPool>,
    tx: Sender<FrameLoad>,
    rx: Receiver<FrameLoad>,
    ready: Vec<FrameLoad>,
    in_flight: usize,
}

impl std::fmt::Debug for FsFrameLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsFrameLoader")
            .field("root", &self.root)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl FsFrameLoader {
    /// Loader resolving URLs under `root`, decoding on `threads` workers (rayon's default when `None`).
    pub fn new(root: impl Into<PathBuf>, threads: Option<usize>) -> ReelResult<Self> {
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            root: root.into(),
            pool: Arc::new(build_thread_pool(threads)?),
            tx,
            rx,
            ready: Vec::new(),
            in_flight: 0,
        })
    }

    /// Directory URLs are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FrameLoader for FsFrameLoader {
    fn request(&mut self, key: FrameKey, url: &str) {
        let rel = match normalize_rel_path(url) {
            Ok(rel) => rel,
            Err(e) => {
                self.ready.push(FrameLoad {
                    key,
                    url: url.to_string(),
                    result: Err(e.to_string()),
                });
                return;
            }
        };
        let path = self.root.join(&rel);
        let tx = self.tx.clone();
        let url = url.to_string();
        self.in_flight += 1;
        self.pool.spawn(move || {
            let result = read_image(&path).map_err(|e| e.to_string());
            // The receiver is gone after teardown; the load is simply dropped.
            let _ = tx.send(FrameLoad { key, url, result });
        });
    }

    fn poll(&mut self) -> Vec<FrameLoad> {
        let mut out = std::mem::take(&mut self.ready);
        for load in self.rx.try_iter() {
            self.in_flight = self.in_flight.saturating_sub(1);
            out.push(load);
        }
        out
    }

    fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn settle(&mut self, timeout: Duration) -> Vec<FrameLoad> {
        let deadline = Instant::now() + timeout;
        let mut out = self.poll();
        while self.in_flight > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                tracing::warn!(in_flight = self.in_flight, "frame loads still in flight after timeout");
                break;
            }
            match self.rx.recv_timeout(left) {
                Ok(load) => {
                    self.in_flight -= 1;
                    out.push(load);
                }
                Err(_) => break,
            }
        }
        out
    }
}

/// Serves pre-decoded images keyed by URL.
///
/// URLs can be held back (completing on [`MemoryFrameLoader::release`]) or
/// forced to fail.
#[derive(Clone, Debug, Default)]
pub struct MemoryFrameLoader {
    images: HashMap<String, PreparedImage>,
    held: HashSet<String>,
    failing: HashSet<String>,
    parked: Vec<(FrameKey, String)>,
    ready: Vec<FrameLoad>,
    requested: Vec<String>,
}

impl MemoryFrameLoader {
    /// Empty loader; unregistered URLs fail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `image` for `url`.
    pub fn insert(&mut self, url: impl Into<String>, image: PreparedImage) {
        self.images.insert(url.into(), image);
    }

    /// Park requests for `url` until [`MemoryFrameLoader::release`].
    pub fn hold(&mut self, url: impl Into<String>) {
        self.held.insert(url.into());
    }

    /// Complete requests for `url` with an error.
    pub fn fail(&mut self, url: impl Into<String>) {
        self.failing.insert(url.into());
    }

    /// Complete every parked request for `url`.
    pub fn release(&mut self, url: &str) {
        self.held.remove(url);
        let (now, still): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.parked).into_iter().partition(|(_, u)| u == url);
        self.parked = still;
        for (key, url) in now {
            let load = self.complete(key, url);
            self.ready.push(load);
        }
    }

    /// URLs in request order.
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    fn complete(&self, key: FrameKey, url: String) -> FrameLoad {
        let result = if self.failing.contains(&url) {
            Err(format!("failed to load '{url}'"))
        } else {
            self.images
                .get(&url)
                .cloned()
                .ok_or_else(|| format!("no image registered for '{url}'"))
        };
        FrameLoad { key, url, result }
    }
}

impl FrameLoader for MemoryFrameLoader {
    fn request(&mut self, key: FrameKey, url: &str) {
        self.requested.push(url.to_string());
        if self.held.contains(url) {
            self.parked.push((key, url.to_string()));
            return;
        }
        let load = self.complete(key, url.to_string());
        self.ready.push(load);
    }

    fn poll(&mut self) -> Vec<FrameLoad> {
        std::mem::take(&mut self.ready)
    }

    fn in_flight(&self) -> usize {
        self.parked.len() + self.ready.len()
    }
}

/// Numbered frame URLs, e.g. `assets/images/frames{index:05}.png` with
/// `start = 7, step = 3`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FramePattern {
    /// Path template with an `{index}` or `{index:0N}` placeholder.
    pub pattern: String,
    /// First index.
    #[serde(default)]
    pub start: u32,
    /// Increment between frames.
    #[serde(default = "default_step")]
    pub step: u32,
    /// Number of frames.
    pub count: usize,
}

fn default_step() -> u32 {
    1
}

impl FramePattern {
    /// Concrete URLs, in playback order.
    pub fn expand(&self) -> ReelResult<Vec<String>> {
        if self.count == 0 {
            return Err(ReelError::validation("frame pattern count must be > 0"));
        }
        if self.step == 0 {
            return Err(ReelError::validation("frame pattern step must be > 0"));
        }
        let (prefix, width, suffix) = split_placeholder(&self.pattern)?;
        (0..self.count)
            .map(|i| {
                let n = u64::from(self.start) + (i as u64) * u64::from(self.step);
                Ok(format!("{prefix}{n:0width$}{suffix}"))
            })
            .collect()
    }
}

fn split_placeholder(pattern: &str) -> ReelResult<(&str, usize, &str)> {
    let open = pattern
        .find("{index")
        .ok_or_else(|| ReelError::validation("frame pattern must contain '{index}'"))?;
    let rest = &pattern[open + "{index".len()..];
    let close = rest
        .find('}')
        .ok_or_else(|| ReelError::validation("unterminated '{index' placeholder"))?;
    let spec = &rest[..close];
    let bad = || ReelError::validation(format!("invalid placeholder '{{index{spec}}}'"));
    let width = match spec.strip_prefix(':') {
        None if spec.is_empty() => 0,
        None => return Err(bad()),
        Some(w) if !w.is_empty() && w.chars().all(|c| c.is_ascii_digit()) => {
            let w = w.trim_start_matches('0');
            if w.is_empty() {
                0
            } else {
                w.parse::<usize>().map_err(|_| bad())?
            }
        }
        Some(_) => return Err(bad()),
    };
    Ok((&pattern[..open], width, &rest[close + 1..]))
}

/// Relative, `/`-separated path without `.`/`..` components.
pub(crate) fn normalize_rel_path(source: &str) -> ReelResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(ReelError::validation("frame paths must be relative"));
    }
    if s.is_empty() {
        return Err(ReelError::validation("frame path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ReelError::validation("frame paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ReelError::validation("frame path must contain a file name"));
    }

    Ok(out.join("/"))
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::validation(
            "loader 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::asset(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/frames.rs"]
mod tests;
