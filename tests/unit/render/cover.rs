use std::sync::Arc;

use super::*;
use crate::foundation::core::Rgba8Premul;

#[test]
fn wide_canvas_crops_vertically() {
    let fit = cover_fit(Size::new(1920.0, 1080.0), Size::new(1000.0, 1000.0)).unwrap();
    assert_eq!(fit.scale, 1.92);
    assert_eq!(fit.offset.x, 0.0);
    assert!((fit.offset.y - (1080.0 - 1920.0) / 2.0).abs() < 1e-9);
}

#[test]
fn tall_canvas_crops_horizontally() {
    let fit = cover_fit(Size::new(400.0, 800.0), Size::new(1600.0, 900.0)).unwrap();
    let scale = 800.0 / 900.0;
    assert!((fit.scale - scale).abs() < 1e-12);
    assert!((fit.offset.x - (400.0 - 1600.0 * scale) / 2.0).abs() < 1e-9);
    assert!(fit.offset.y.abs() < 1e-9);
}

#[test]
fn degenerate_sizes_do_not_fit() {
    assert!(cover_fit(Size::new(0.0, 10.0), Size::new(10.0, 10.0)).is_none());
    assert!(cover_fit(Size::new(10.0, 10.0), Size::new(10.0, 0.0)).is_none());
    assert!(cover_fit(Size::new(f64::NAN, 10.0), Size::new(10.0, 10.0)).is_none());
}

#[test]
fn blit_fills_the_whole_canvas() {
    let img = PreparedImage::solid(3, 5, Rgba8Premul::from_straight_rgba(0, 255, 0, 255));
    let mut dst = Surface::new(16, 9);
    assert!(blit_cover(&mut dst, &img));
    for y in 0..9 {
        for x in 0..16 {
            assert_eq!(dst.pixel(x, y), Some([0, 255, 0, 255]));
        }
    }
}

#[test]
fn blit_centres_and_crops() {
    // 2×1 image: left red, right blue; a square canvas shows both halves.
    let data = vec![255, 0, 0, 255, 0, 0, 255, 255];
    let img = PreparedImage {
        width: 2,
        height: 1,
        rgba8_premul: Arc::new(data),
    };
    let mut dst = Surface::new(4, 4);
    assert!(blit_cover(&mut dst, &img));
    // scale 4, drawn 8 wide starting at x = -2.
    assert_eq!(dst.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(dst.pixel(1, 3), Some([255, 0, 0, 255]));
    assert_eq!(dst.pixel(2, 0), Some([0, 0, 255, 255]));
    assert_eq!(dst.pixel(3, 3), Some([0, 0, 255, 255]));
}

#[test]
fn unplaceable_image_leaves_canvas_untouched() {
    let mut dst = Surface::new(2, 2);
    dst.fill(Rgba8Premul::from_straight_rgba(1, 1, 1, 255));
    let before = dst.clone();
    assert!(!blit_cover(&mut dst, &PreparedImage::solid(0, 0, Rgba8Premul::transparent())));
    assert_eq!(dst, before);
}
