pub(crate) mod ease;
pub(crate) mod scrub;
pub(crate) mod tween;
