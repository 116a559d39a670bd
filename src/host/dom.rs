use std::collections::HashMap;

use crate::{
    foundation::core::{Affine, Rect, Rgba8Premul, Size, Vec2},
    foundation::error::{ReelError, ReelResult},
    trigger::pin::PinPlacement,
};

/// Opaque handle to an element of a [`Document`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ElementId(pub u32);

/// Layout box in scroll-content coordinates (unaffected by pinning or transforms).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementBox {
    /// Offset from the top of the content.
    pub top: f64,
    /// Offset from the left of the content.
    pub left: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
}

impl ElementBox {
    /// `top + height`.
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    /// Width and height.
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// As a rect in content coordinates.
    pub fn rect(self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.width,
            self.top + self.height,
        )
    }
}

/// CSS-like transform: `translate(...) scale(...)` around a percentage origin.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformStyle {
    /// Translation in px.
    pub translate: Vec2,
    /// Uniform scale.
    pub scale: f64,
    /// Transform origin as percentages of the element box; `None` means `50% 50%`.
    pub origin_percent: Option<(f64, f64)>,
}

impl Default for TransformStyle {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
            origin_percent: None,
        }
    }
}

impl TransformStyle {
    /// Pure translation.
    pub fn translate(translate: Vec2) -> Self {
        Self {
            translate,
            ..Self::default()
        }
    }

    /// No translation and unit scale.
    pub fn is_identity(&self) -> bool {
        self.translate == Vec2::ZERO && self.scale == 1.0
    }

    /// Affine in element-local coordinates for a box of `size`.
    pub fn to_affine(&self, size: Size) -> Affine {
        let (ox, oy) = self.origin_percent.unwrap_or((50.0, 50.0));
        let origin = Vec2::new(size.width * ox / 100.0, size.height * oy / 100.0);
        Affine::translate(self.translate)
            * Affine::translate(origin)
            * Affine::scale(self.scale)
            * Affine::translate(-origin)
    }
}

/// A single style mutation requested by the stage or an effect.
#[derive(Clone, Debug, PartialEq)]
pub enum StylePatch {
    /// Replace the transform.
    Transform(TransformStyle),
    /// Set opacity, clamped to `[0, 1]`.
    Opacity(f64),
    /// Show or hide.
    Visible(bool),
    /// Set the stacking order.
    ZIndex(i32),
    /// Set the text colour.
    Color(Rgba8Premul),
    /// Absolute offset inside the parent box.
    Position {
        /// Offset from the parent's left edge.
        left: f64,
        /// Offset from the parent's top edge.
        top: f64,
    },
    /// Distance from the parent's bottom edge.
    Bottom(f64),
    /// Place a pinned element.
    Pin(PinPlacement),
}

/// Accumulated style of one element.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedStyle {
    /// Current transform.
    pub transform: TransformStyle,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Whether the element is shown.
    pub visible: bool,
    /// Stacking order, if set.
    pub z_index: Option<i32>,
    /// Text colour, if set.
    pub color: Option<Rgba8Premul>,
    /// Absolute `(left, top)` inside the parent, if set.
    pub position: Option<(f64, f64)>,
    /// Distance from the parent's bottom edge, if set.
    pub bottom: Option<f64>,
    /// Pin placement.
    pub pin: PinPlacement,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            transform: TransformStyle::default(),
            opacity: 1.0,
            visible: true,
            z_index: None,
            color: None,
            position: None,
            bottom: None,
            pin: PinPlacement::Static,
        }
    }
}

impl ComputedStyle {
    /// Fold `patch` into the style.
    pub fn apply(&mut self, patch: StylePatch) {
        match patch {
            StylePatch::Transform(t) => self.transform = t,
            StylePatch::Opacity(v) => self.opacity = v.clamp(0.0, 1.0),
            StylePatch::Visible(v) => self.visible = v,
            StylePatch::ZIndex(z) => self.z_index = Some(z),
            StylePatch::Color(c) => self.color = Some(c),
            StylePatch::Position { left, top } => self.position = Some((left, top)),
            StylePatch::Bottom(b) => self.bottom = Some(b),
            StylePatch::Pin(p) => self.pin = p,
        }
    }
}

/// The page as seen by the stage: element lookup, layout, and a style sink.
///
/// Every lookup returns `Option`; callers decide what an absent element means.
pub trait Document {
    /// First element matching `selector` in document order.
    fn query(&self, selector: &str) -> Option<ElementId>;

    /// All elements matching `selector` in document order.
    fn query_all(&self, selector: &str) -> Vec<ElementId>;

    /// First descendant of `scope` matching `selector`.
    fn query_within(&self, scope: ElementId, selector: &str) -> Option<ElementId>;

    /// Layout box, unaffected by transforms.
    fn layout(&self, id: ElementId) -> Option<ElementBox>;

    /// Current viewport size.
    fn viewport(&self) -> Size;

    /// Resize the viewport and re-run layout.
    fn set_viewport(&mut self, size: Size);

    /// Height of the scrollable content, excluding pin spacing.
    fn content_height(&self) -> f64;

    /// Text content.
    fn text(&self, id: ElementId) -> Option<String>;

    /// Natural size of an image element; `None` until it has loaded with non-zero dimensions.
    fn image_natural_size(&self, id: ElementId) -> Option<Size>;

    /// `object-position` as fractions; `(0.5, 0.5)` when unspecified.
    fn object_position(&self, _id: ElementId) -> (f64, f64) {
        (0.5, 0.5)
    }

    /// Native `scrollTop` of a scrolling container.
    fn native_scroll_top(&self, id: ElementId) -> f64;

    /// Whether the element carries a non-identity transform.
    fn has_transform(&self, id: ElementId) -> bool;

    /// Wrap each word of the element's text in a child span and return the spans.
    fn split_words(&mut self, id: ElementId) -> Vec<ElementId>;

    /// Apply a style mutation.
    fn apply(&mut self, id: ElementId, patch: StylePatch);
}

/// Resolve `selector` or fail with [`ReelError::MissingElement`].
pub fn require(doc: &dyn Document, selector: &str) -> ReelResult<ElementId> {
    doc.query(selector)
        .ok_or_else(|| ReelError::missing_element(selector))
}

/// CSS length as used by the static layout description.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "LengthRepr", into = "LengthRepr")]
pub enum Length {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the viewport height.
    Vh(f64),
    /// Percentage of the viewport width.
    Vw(f64),
    /// Percentage of the parent's extent on the same axis.
    Percent(f64),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Num(f64),
    Str(String),
}

impl TryFrom<LengthRepr> for Length {
    type Error = String;

    fn try_from(value: LengthRepr) -> Result<Self, Self::Error> {
        match value {
            LengthRepr::Num(v) => Ok(Self::Px(v)),
            LengthRepr::Str(s) => Self::parse(&s).map_err(|e| e.to_string()),
        }
    }
}

impl From<Length> for LengthRepr {
    fn from(value: Length) -> Self {
        match value {
            Length::Px(v) => LengthRepr::Num(v),
            Length::Vh(v) => LengthRepr::Str(format!("{v}vh")),
            Length::Vw(v) => LengthRepr::Str(format!("{v}vw")),
            Length::Percent(v) => LengthRepr::Str(format!("{v}%")),
        }
    }
}

impl Length {
    /// Parse `"120"`, `"120px"`, `"100vh"`, `"50vw"` or `"25%"`.
    pub fn parse(s: &str) -> ReelResult<Self> {
        let s = s.trim();
        let num = |raw: &str| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ReelError::validation(format!("invalid length '{s}'")))
        };
        if let Some(v) = s.strip_suffix("vh") {
            Ok(Self::Vh(num(v)?))
        } else if let Some(v) = s.strip_suffix("vw") {
            Ok(Self::Vw(num(v)?))
        } else if let Some(v) = s.strip_suffix('%') {
            Ok(Self::Percent(num(v)?))
        } else if let Some(v) = s.strip_suffix("px") {
            Ok(Self::Px(num(v)?))
        } else {
            Ok(Self::Px(num(s)?))
        }
    }

    /// Pixels for `viewport` and a parent of `parent_extent`.
    pub fn resolve(self, viewport: Size, parent_extent: f64) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Vh(v) => viewport.height * v / 100.0,
            Self::Vw(v) => viewport.width * v / 100.0,
            Self::Percent(v) => parent_extent * v / 100.0,
        }
    }
}

fn default_tag() -> String {
    "div".to_string()
}

fn default_width() -> Length {
    Length::Percent(100.0)
}

fn default_loaded() -> bool {
    true
}

/// Image metadata for an `<img>` element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageSpec {
    /// Intrinsic width.
    pub natural_width: f64,
    /// Intrinsic height.
    pub natural_height: f64,
    /// Whether the image has finished loading.
    #[serde(default = "default_loaded")]
    pub loaded: bool,
    /// CSS `object-position`, e.g. `"50% 30%"` or `"center top"`.
    #[serde(default)]
    pub object_position: Option<String>,
}

/// One element of a static layout.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ElementSpec {
    /// `id` attribute.
    #[serde(default)]
    pub id: Option<String>,
    /// `class` attribute, split.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Tag name.
    #[serde(default = "default_tag")]
    pub tag: String,
    /// `id` of the parent element; top-level elements flow in the document.
    #[serde(default)]
    pub parent: Option<String>,
    /// Offset from the parent's top; absent means "stack after the previous sibling".
    #[serde(default)]
    pub top: Option<Length>,
    /// Offset from the parent's left edge.
    #[serde(default = "zero_length")]
    pub left: Length,
    /// Element width.
    #[serde(default = "default_width")]
    pub width: Length,
    /// Element height.
    pub height: Length,
    /// Text content, if any.
    #[serde(default)]
    pub text: Option<String>,
    /// Image content, if any.
    #[serde(default)]
    pub image: Option<ImageSpec>,
}

fn zero_length() -> Length {
    Length::Px(0.0)
}

impl ElementSpec {
    /// Convenience constructor for a flowing block.
    pub fn block(id: &str, height: Length) -> Self {
        Self {
            id: Some(id.to_string()),
            classes: Vec::new(),
            tag: default_tag(),
            parent: None,
            top: None,
            left: zero_length(),
            width: default_width(),
            height,
            text: None,
            image: None,
        }
    }

    /// Nest under the element with id `parent`.
    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    /// Set the tag name.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    /// Absolute top inside the parent.
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Add a class.
    pub fn with_top(mut self, top: Length) -> Self {
        self.top = Some(top);
        self
    }

    /// Set the text content.
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Make this an image element.
    pub fn with_image(mut self, image: ImageSpec) -> Self {
        self.image = Some(image);
        self
    }
}

/// Serializable description of a page layout.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LayoutSpec {
    /// Initial viewport width.
    pub viewport_width: f64,
    /// Initial viewport height.
    pub viewport_height: f64,
    /// Elements in document order; parents precede children.
    pub elements: Vec<ElementSpec>,
}

#[derive(Clone, Debug)]
struct Node {
    spec: ElementSpec,
    parent: Option<ElementId>,
    layout: ElementBox,
    image_loaded: bool,
    style: ComputedStyle,
    native_scroll_top: f64,
    words: Option<Vec<ElementId>>,
}

/// In-memory [`Document`] built from a [`LayoutSpec`].
#[derive(Clone, Debug)]
pub struct StaticDocument {
    viewport: Size,
    nodes: Vec<Node>,
    by_id: HashMap<String, ElementId>,
}

impl StaticDocument {
    /// Build and lay out the page.
    pub fn new(spec: LayoutSpec) -> ReelResult<Self> {
        let viewport = Size::new(spec.viewport_width, spec.viewport_height);
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            return Err(ReelError::validation("viewport width/height must be > 0"));
        }

        let mut doc = Self {
            viewport,
            nodes: Vec::with_capacity(spec.elements.len()),
            by_id: HashMap::new(),
        };
        for el in spec.elements {
            doc.push(el)?;
        }
        doc.relayout();
        Ok(doc)
    }

    fn push(&mut self, el: ElementSpec) -> ReelResult<ElementId> {
        let id = ElementId(
            self.nodes
                .len()
                .try_into()
                .map_err(|_| ReelError::validation("too many elements"))?,
        );
        let parent = match &el.parent {
            Some(p) => Some(*self.by_id.get(p).ok_or_else(|| {
                ReelError::validation(format!(
                    "parent '{p}' must be declared before its children"
                ))
            })?),
            None => None,
        };
        if let Some(name) = &el.id {
            if self.by_id.insert(name.clone(), id).is_some() {
                return Err(ReelError::validation(format!("duplicate element id '{name}'")));
            }
        }
        let image_loaded = el.image.as_ref().is_some_and(|i| i.loaded);
        self.nodes.push(Node {
            spec: el,
            parent,
            layout: ElementBox::default(),
            image_loaded,
            style: ComputedStyle::default(),
            native_scroll_top: 0.0,
            words: None,
        });
        Ok(id)
    }

    /// Recompute every layout box for the current viewport.
    fn relayout(&mut self) {
        let root = ElementBox {
            top: 0.0,
            left: 0.0,
            width: self.viewport.width,
            height: self.viewport.height,
        };
        let mut cursors: HashMap<Option<ElementId>, f64> = HashMap::new();
        for idx in 0..self.nodes.len() {
            let parent = self.nodes[idx].parent;
            let parent_box = parent.map_or(root, |p| self.nodes[p.0 as usize].layout);
            let spec = &self.nodes[idx].spec;

            let width = spec.width.resolve(self.viewport, parent_box.width);
            let height = spec.height.resolve(self.viewport, parent_box.height);
            let left = parent_box.left + spec.left.resolve(self.viewport, parent_box.width);
            let cursor = cursors.entry(parent).or_insert(0.0);
            let rel_top = match spec.top {
                Some(t) => t.resolve(self.viewport, parent_box.height),
                None => *cursor,
            };
            *cursor = cursor.max(rel_top + height);
            let base_top = if parent.is_some() { parent_box.top } else { 0.0 };

            self.nodes[idx].layout = ElementBox {
                top: base_top + rel_top,
                left,
                width,
                height,
            };
        }
    }

    /// Element id by its `id` attribute.
    pub fn element(&self, name: &str) -> Option<ElementId> {
        self.by_id.get(name).copied()
    }

    /// Accumulated style of `id`.
    pub fn style(&self, id: ElementId) -> Option<&ComputedStyle> {
        self.nodes.get(id.0 as usize).map(|n| &n.style)
    }

    /// Simulate the host scrolling `id` natively.
    pub fn set_native_scroll_top(&mut self, id: ElementId, value: f64) {
        if let Some(n) = self.nodes.get_mut(id.0 as usize) {
            n.native_scroll_top = value.max(0.0);
        }
    }

    /// Flip the load state of an image element.
    pub fn set_image_loaded(&mut self, id: ElementId, loaded: bool) {
        if let Some(n) = self.nodes.get_mut(id.0 as usize) {
            n.image_loaded = loaded;
        }
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn matches(&self, id: ElementId, selector: &Selector) -> bool {
        let Some((last, rest)) = selector.parts.split_last() else {
            return false;
        };
        if !self.matches_compound(id, &last.1) {
            return false;
        }
        self.matches_ancestors(id, rest)
    }

    fn matches_ancestors(&self, id: ElementId, rest: &[(Combinator, Compound)]) -> bool {
        // The combinator stored on `head` links it to the compound already matched.
        let Some((head, tail)) = rest.split_last() else {
            return true;
        };
        let mut cur = self.node(id).and_then(|n| n.parent);
        while let Some(p) = cur {
            if self.matches_compound(p, &head.1) && self.matches_ancestors(p, tail) {
                return true;
            }
            if head.0 == Combinator::Child {
                return false;
            }
            cur = self.node(p).and_then(|n| n.parent);
        }
        false
    }

    fn matches_compound(&self, id: ElementId, c: &Compound) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if let Some(want) = &c.id {
            if node.spec.id.as_deref() != Some(want.as_str()) {
                return false;
            }
        }
        if let Some(tag) = &c.tag {
            if !node.spec.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        c.classes.iter().all(|cls| node.spec.classes.contains(cls))
    }

    fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.nodes.len()).map(|i| ElementId(i as u32))
    }

    fn is_descendant(&self, id: ElementId, scope: ElementId) -> bool {
        let mut cur = self.node(id).and_then(|n| n.parent);
        while let Some(p) = cur {
            if p == scope {
                return true;
            }
            cur = self.node(p).and_then(|n| n.parent);
        }
        false
    }
}

impl Document for StaticDocument {
    fn query(&self, selector: &str) -> Option<ElementId> {
        let sel = Selector::parse(selector)?;
        self.ids().find(|&id| self.matches(id, &sel))
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let Some(sel) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.ids().filter(|&id| self.matches(id, &sel)).collect()
    }

    fn query_within(&self, scope: ElementId, selector: &str) -> Option<ElementId> {
        let sel = Selector::parse(selector)?;
        self.ids()
            .find(|&id| self.is_descendant(id, scope) && self.matches(id, &sel))
    }

    fn layout(&self, id: ElementId) -> Option<ElementBox> {
        self.node(id).map(|n| n.layout)
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn set_viewport(&mut self, size: Size) {
        if size.width > 0.0 && size.height > 0.0 {
            self.viewport = size;
            self.relayout();
        }
    }

    fn content_height(&self) -> f64 {
        self.nodes
            .iter()
            .map(|n| n.layout.bottom())
            .fold(0.0, f64::max)
    }

    fn text(&self, id: ElementId) -> Option<String> {
        self.node(id).and_then(|n| n.spec.text.clone())
    }

    fn image_natural_size(&self, id: ElementId) -> Option<Size> {
        let node = self.node(id)?;
        let img = node.spec.image.as_ref()?;
        if !node.image_loaded || img.natural_width <= 0.0 || img.natural_height <= 0.0 {
            return None;
        }
        Some(Size::new(img.natural_width, img.natural_height))
    }

    fn object_position(&self, id: ElementId) -> (f64, f64) {
        self.node(id)
            .and_then(|n| n.spec.image.as_ref())
            .and_then(|i| i.object_position.as_deref())
            .map(parse_object_position)
            .unwrap_or((0.5, 0.5))
    }

    fn native_scroll_top(&self, id: ElementId) -> f64 {
        self.node(id).map_or(0.0, |n| n.native_scroll_top)
    }

    fn has_transform(&self, id: ElementId) -> bool {
        self.node(id).is_some_and(|n| {
            !n.style.transform.is_identity() || n.style.pin.translate_y() != 0.0
        })
    }

    fn split_words(&mut self, id: ElementId) -> Vec<ElementId> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        if let Some(words) = &node.words {
            return words.clone();
        }
        let text = node.spec.text.clone().unwrap_or_default();
        let parent_name = node.spec.id.clone();
        let layout = node.layout;

        let mut spans = Vec::new();
        for word in text.split_whitespace() {
            let span_id = ElementId(self.nodes.len() as u32);
            self.nodes.push(Node {
                spec: ElementSpec {
                    id: None,
                    classes: Vec::new(),
                    tag: "span".to_string(),
                    parent: parent_name.clone(),
                    top: Some(Length::Px(0.0)),
                    left: Length::Px(0.0),
                    width: Length::Percent(100.0),
                    height: Length::Percent(100.0),
                    text: Some(word.to_string()),
                    image: None,
                },
                parent: Some(id),
                layout,
                image_loaded: false,
                style: ComputedStyle::default(),
                native_scroll_top: 0.0,
                words: None,
            });
            spans.push(span_id);
        }
        if let Some(n) = self.nodes.get_mut(id.0 as usize) {
            n.words = Some(spans.clone());
        }
        spans
    }

    fn apply(&mut self, id: ElementId, patch: StylePatch) {
        if let Some(n) = self.nodes.get_mut(id.0 as usize) {
            n.style.apply(patch);
        }
    }
}

/// Parse a CSS `object-position` pair into fractions.
pub fn parse_object_position(value: &str) -> (f64, f64) {
    fn one(raw: Option<&str>) -> f64 {
        match raw {
            Some(v) if v.ends_with('%') => v
                .trim_end_matches('%')
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map_or(0.5, |n| n / 100.0),
            Some("left") | Some("top") => 0.0,
            Some("right") | Some("bottom") => 1.0,
            _ => 0.5,
        }
    }
    let mut parts = value.split_whitespace();
    let x = one(parts.next());
    let y = one(parts.next());
    (x, y)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    id: Option<String>,
    tag: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(raw: &str) -> Option<Self> {
        let mut out = Self::default();
        let mut kind = 't';
        let mut buf = String::new();
        let flush = |kind: char, buf: &mut String, out: &mut Self| {
            if buf.is_empty() {
                return;
            }
            let v = std::mem::take(buf);
            match kind {
                '#' => out.id = Some(v),
                '.' => out.classes.push(v),
                _ => out.tag = Some(v),
            }
        };
        for ch in raw.chars() {
            match ch {
                '#' | '.' => {
                    flush(kind, &mut buf, &mut out);
                    kind = ch;
                }
                _ => buf.push(ch),
            }
        }
        flush(kind, &mut buf, &mut out);
        if out == Self::default() {
            None
        } else {
            Some(out)
        }
    }
}

/// Minimal selector: compounds (`tag#id.class`) joined by descendant or `>` combinators.
#[derive(Clone, Debug)]
struct Selector {
    /// Each compound with the combinator linking it to the compound on its right.
    parts: Vec<(Combinator, Compound)>,
}

impl Selector {
    fn parse(raw: &str) -> Option<Self> {
        let spaced = raw.replace('>', " > ");
        let mut parts: Vec<(Combinator, Compound)> = Vec::new();
        let mut pending_child = false;
        for tok in spaced.split_whitespace() {
            if tok == ">" {
                pending_child = true;
                continue;
            }
            let compound = Compound::parse(tok)?;
            if pending_child {
                if let Some(prev) = parts.last_mut() {
                    prev.0 = Combinator::Child;
                }
                pending_child = false;
            }
            parts.push((Combinator::Descendant, compound));
        }
        if parts.is_empty() || pending_child {
            return None;
        }
        Some(Self { parts })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/dom.rs"]
mod tests;
