use std::io::Cursor;

use super::*;

fn png_bytes(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 128u8]).unwrap();
    let prepared = decode_image(&png_bytes(img)).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn fully_transparent_pixels_clear_colour() {
    let img = image::RgbaImage::from_raw(1, 1, vec![255, 255, 255, 0]).unwrap();
    let prepared = decode_image(&png_bytes(img)).unwrap();
    assert_eq!(prepared.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn garbage_bytes_are_an_error() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn read_image_reports_missing_files() {
    let err = read_image(Path::new("/definitely/not/here.png")).unwrap_err();
    assert!(err.to_string().contains("here.png"));
}

#[test]
fn solid_images_and_pixel_access() {
    let img = PreparedImage::solid(3, 2, Rgba8Premul::from_straight_rgba(10, 20, 30, 255));
    assert_eq!(img.rgba8_premul.len(), 3 * 2 * 4);
    assert_eq!(img.pixel(2, 1), Some([10, 20, 30, 255]));
    assert_eq!(img.pixel(3, 0), None);
    assert_eq!(img.size(), Size::new(3.0, 2.0));
    assert!(!img.is_empty());
    assert!(PreparedImage::solid(0, 4, Rgba8Premul::transparent()).is_empty());
}
