use super::*;

#[test]
fn viewport_rect_is_top_left_anchored() {
    let r = ViewportRect::anchored(Size::new(1280.0, 720.0));
    assert_eq!(r.top, 0.0);
    assert_eq!(r.left, 0.0);
    assert_eq!(r.size(), Size::new(1280.0, 720.0));
}

#[test]
fn device_class_breakpoint_is_inclusive() {
    assert_eq!(DeviceClass::from_width(640.0, 640.0), DeviceClass::Mobile);
    assert_eq!(DeviceClass::from_width(641.0, 640.0), DeviceClass::Desktop);
    assert!(DeviceClass::Mobile.is_mobile());
}

#[test]
fn parse_hex_forms() {
    assert_eq!(
        Rgba8Premul::parse_hex("#fff").unwrap(),
        Rgba8Premul::from_straight_rgba(255, 255, 255, 255)
    );
    assert_eq!(
        Rgba8Premul::parse_hex("#ff3366").unwrap(),
        Rgba8Premul::from_straight_rgba(0xff, 0x33, 0x66, 255)
    );
    let c = Rgba8Premul::parse_hex("#0a3bce91").unwrap();
    assert_eq!(c.a, 0x91);
    assert!(Rgba8Premul::parse_hex("fff").is_err());
    assert!(Rgba8Premul::parse_hex("#ggg").is_err());
    assert!(Rgba8Premul::parse_hex("#12345").is_err());
    assert!(Rgba8Premul::parse_hex("#ééé").is_err());
}

#[test]
fn lerp_endpoints_and_midpoint() {
    let a = Rgba8Premul::from_straight_rgba(0, 0, 0, 255);
    let b = Rgba8Premul::from_straight_rgba(200, 100, 50, 255);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
    assert_eq!(a.lerp(b, 0.5).to_array(), [100, 50, 25, 255]);
    assert_eq!(a.lerp(b, 7.0), b);
}
