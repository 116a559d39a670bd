/// How the engine pins elements inside the scroller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinType {
    /// Counter-translate inside a transformed container.
    Transform,
    /// `position: fixed` against the viewport.
    Fixed,
}

/// Pin lifecycle of one pinned trigger.
///
/// `Pinning` and `Unpinning` last exactly one update; the engine keeps updating until they settle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub enum PinPhase {
    /// Outside the pin range.
    #[default]
    Unpinned,
    /// Entered the range this update.
    Pinning,
    /// Held inside the range.
    Pinned,
    /// Left the range this update.
    Unpinning,
}

impl PinPhase {
    /// Next phase given whether the offset is inside the range.
    pub fn advance(self, active: bool) -> Self {
        match (self, active) {
            (Self::Unpinned, false) => Self::Unpinned,
            (Self::Unpinned, true) => Self::Pinning,
            (Self::Pinning, true) | (Self::Pinned, true) => Self::Pinned,
            (Self::Pinning, false) | (Self::Pinned, false) => Self::Unpinning,
            (Self::Unpinning, true) => Self::Pinning,
            (Self::Unpinning, false) => Self::Unpinned,
        }
    }

    /// Whether the element is held in place.
    pub fn is_pinned(self) -> bool {
        matches!(self, Self::Pinning | Self::Pinned)
    }
}

/// Where a pinned element is drawn for the current scroll offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub enum PinPlacement {
    /// Before the pin range: normal flow.
    #[default]
    Static,
    /// Inside the pin range.
    Pinned {
        /// Strategy the bridge selected.
        pin_type: PinType,
        /// Counter-translation for [`PinType::Transform`].
        translate_y: f64,
        /// Viewport offset for [`PinType::Fixed`].
        viewport_top: f64,
    },
    /// After the pin range: held at the end of its pin spacer.
    Released {
        /// Offset to the end of the spacer.
        translate_y: f64,
    },
}

impl PinPlacement {
    /// Vertical translation applied to the element box.
    pub fn translate_y(self) -> f64 {
        match self {
            Self::Static => 0.0,
            Self::Pinned {
                pin_type: PinType::Transform,
                translate_y,
                ..
            } => translate_y,
            Self::Pinned {
                pin_type: PinType::Fixed,
                ..
            } => 0.0,
            Self::Released { translate_y } => translate_y,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/pin.rs"]
mod tests;
