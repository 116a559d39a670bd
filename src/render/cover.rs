use crate::{
    assets::decode::PreparedImage,
    foundation::core::{Size, Vec2},
    render::surface::Surface,
};

/// Placement of an image scaled to fill a canvas ("object-fit: cover").
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform scale applied to the image.
    pub scale: f64,
    /// Top-left of the scaled image in canvas pixels (non-positive on the cropped axis).
    pub offset: Vec2,
}

/// `scale = max(cw/iw, ch/ih)`, centred by `(c - i·scale) / 2` on both axes.
///
/// `None` when either size has a zero or non-finite dimension.
pub fn cover_fit(canvas: Size, image: Size) -> Option<CoverFit> {
    let ok = |v: f64| v.is_finite() && v > 0.0;
    if !(ok(canvas.width) && ok(canvas.height) && ok(image.width) && ok(image.height)) {
        return None;
    }
    let scale = (canvas.width / image.width).max(canvas.height / image.height);
    Some(CoverFit {
        scale,
        offset: Vec2::new(
            (canvas.width - image.width * scale) / 2.0,
            (canvas.height - image.height * scale) / 2.0,
        ),
    })
}

/// Clear `dst` and draw `img` cover-fitted, clipped to the canvas.
///
/// Nearest-neighbour sampling. Returns `false` without touching `dst` when the
/// image cannot be placed.
pub fn blit_cover(dst: &mut Surface, img: &PreparedImage) -> bool {
    let Some(fit) = cover_fit(dst.size(), img.size()) else {
        return false;
    };
    let (dw, iw, ih) = (dst.width() as usize, img.width, img.height);
    let src = img.rgba8_premul.as_slice();
    if src.len() < (iw as usize) * (ih as usize) * 4 {
        tracing::warn!(width = iw, height = ih, "image buffer shorter than its dimensions");
        return false;
    }

    let sample = |d: usize, off: f64, extent: u32| -> usize {
        let s = ((d as f64 + 0.5 - off) / fit.scale).floor();
        s.clamp(0.0, f64::from(extent - 1)) as usize
    };
    let cols: Vec<usize> = (0..dw).map(|x| sample(x, fit.offset.x, iw)).collect();

    let out = dst.data_mut();
    for (y, row) in out.chunks_exact_mut(dw * 4).enumerate() {
        let sy = sample(y, fit.offset.y, ih);
        let src_row = &src[sy * (iw as usize) * 4..(sy + 1) * (iw as usize) * 4];
        for (px, &sx) in row.chunks_exact_mut(4).zip(&cols) {
            px.copy_from_slice(&src_row[sx * 4..sx * 4 + 4]);
        }
    }
    true
}

#[cfg(test)]
#[path = "../../tests/unit/render/cover.rs"]
mod tests;
