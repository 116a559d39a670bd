use std::path::Path;

use crate::foundation::core::{Rgba8Premul, Size};
use crate::foundation::error::{ReelError, ReelResult};

/// Canvas backing store: premultiplied RGBA8, tightly packed, row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Transparent surface of `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Backing store for a viewport; fractional sizes round to whole pixels.
    pub fn for_viewport(viewport: Size) -> Self {
        let (w, h) = pixel_dims(viewport);
        Self::new(w, h)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width and height as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Premultiplied RGBA8 rows.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Resize the backing store. Like a canvas, resizing discards the content.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data
            .resize((width as usize) * (height as usize) * 4, 0);
    }

    /// Resize to whole pixels of `viewport`.
    pub fn resize_to_viewport(&mut self, viewport: Size) {
        let (w, h) = pixel_dims(viewport);
        self.resize(w, h);
    }

    /// Make every pixel transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Premultiplied RGBA at `(x, y)`, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// `true` when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Straight-alpha copy for encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    /// Write the surface as a straight-alpha PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ReelResult<()> {
        let path = path.as_ref();
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::render(format!(
                "cannot encode empty surface to '{}'",
                path.display()
            )));
        }
        image::save_buffer_with_format(
            path,
            &self.to_straight_rgba8(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| ReelError::render(format!("write png '{}': {e}", path.display())))
    }
}

fn pixel_dims(viewport: Size) -> (u32, u32) {
    let dim = |v: f64| {
        if v.is_finite() && v > 0.0 {
            v.round().min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    };
    (dim(viewport.width), dim(viewport.height))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
