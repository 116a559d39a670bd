use super::*;

#[test]
fn new_surfaces_are_blank() {
    let s = Surface::new(4, 2);
    assert_eq!(s.data().len(), 4 * 2 * 4);
    assert!(s.is_blank());
    assert_eq!(s.size(), Size::new(4.0, 2.0));
}

#[test]
fn resize_discards_content() {
    let mut s = Surface::new(2, 2);
    s.fill(Rgba8Premul::from_straight_rgba(1, 2, 3, 255));
    assert!(!s.is_blank());
    s.resize(3, 1);
    assert_eq!((s.width(), s.height()), (3, 1));
    assert!(s.is_blank());
}

#[test]
fn viewport_sizes_round_to_pixels() {
    let s = Surface::for_viewport(Size::new(390.4, 843.6));
    assert_eq!((s.width(), s.height()), (390, 844));
    let mut s = Surface::new(1, 1);
    s.resize_to_viewport(Size::new(f64::NAN, -1.0));
    assert_eq!((s.width(), s.height()), (0, 0));
}

#[test]
fn pixel_access_is_bounds_checked() {
    let mut s = Surface::new(2, 1);
    s.fill(Rgba8Premul::from_straight_rgba(9, 8, 7, 255));
    assert_eq!(s.pixel(1, 0), Some([9, 8, 7, 255]));
    assert_eq!(s.pixel(2, 0), None);
    s.clear();
    assert_eq!(s.pixel(1, 0), Some([0, 0, 0, 0]));
}

#[test]
fn straight_alpha_export_unpremultiplies() {
    let mut s = Surface::new(1, 1);
    s.fill(Rgba8Premul::from_straight_rgba(200, 100, 0, 128));
    let out = s.to_straight_rgba8();
    assert_eq!(out[3], 128);
    assert!((i32::from(out[0]) - 200).abs() <= 1);
    assert!((i32::from(out[1]) - 100).abs() <= 1);
    assert_eq!(out[2], 0);
}

#[test]
fn save_png_writes_straight_alpha() {
    let dir = std::path::PathBuf::from("target").join("unit_surface_png");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("half.png");

    let mut s = Surface::new(3, 2);
    s.fill(Rgba8Premul::from_straight_rgba(200, 100, 0, 128));
    s.save_png(&path).unwrap();

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(2, 1).0, s.to_straight_rgba8()[20..24]);
}

#[test]
fn save_png_rejects_empty_surfaces() {
    let err = Surface::new(0, 4).save_png("target/never.png").unwrap_err();
    assert!(matches!(err, ReelError::Render(_)));
}
