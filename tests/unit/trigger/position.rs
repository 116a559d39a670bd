use super::*;

fn el(top: f64, height: f64) -> ElementBox {
    ElementBox {
        top,
        left: 0.0,
        width: 1280.0,
        height,
    }
}

#[test]
fn keywords_and_percentages_parse() {
    assert_eq!(Anchor::parse("top").unwrap(), Anchor::Fraction(0.0));
    assert_eq!(Anchor::parse("center").unwrap(), Anchor::Fraction(0.5));
    assert_eq!(Anchor::parse("bottom").unwrap(), Anchor::Fraction(1.0));
    assert_eq!(Anchor::parse("85%").unwrap(), Anchor::Fraction(0.85));
    assert_eq!(Anchor::parse("40px").unwrap(), Anchor::Px(40.0));
    assert_eq!(Anchor::parse("12").unwrap(), Anchor::Px(12.0));
    assert!(Anchor::parse("middle").is_err());
    assert!(Anchor::parse("NaN%").is_err());
}

#[test]
fn edge_positions_resolve_against_element_and_viewport() {
    let vh = 800.0;
    let top_top: TriggerPosition = "top top".parse().unwrap();
    assert_eq!(top_top, TriggerPosition::top_top());
    assert_eq!(top_top.resolve(el(1000.0, 800.0), vh, None), Some(1000.0));

    let top_85: TriggerPosition = "top 85%".parse().unwrap();
    let v = top_85.resolve(el(1000.0, 800.0), vh, None).unwrap();
    assert!((v - 320.0).abs() < 1e-9);

    let center: TriggerPosition = "center center".parse().unwrap();
    assert_eq!(center.resolve(el(1000.0, 400.0), vh, None), Some(800.0));

    let bottom_top: TriggerPosition = "bottom top".parse().unwrap();
    assert_eq!(bottom_top.resolve(el(1000.0, 400.0), vh, None), Some(1400.0));
}

#[test]
fn single_token_defaults_viewport_to_top() {
    let p: TriggerPosition = "center".parse().unwrap();
    assert_eq!(
        p,
        TriggerPosition::edge(Anchor::Fraction(0.5), Anchor::Fraction(0.0))
    );
}

#[test]
fn relative_positions_need_a_start() {
    let vh = 800.0;
    let px: TriggerPosition = "+=300".parse().unwrap();
    assert_eq!(px, TriggerPosition::After(300.0));
    assert_eq!(px.resolve(el(0.0, 100.0), vh, Some(50.0)), Some(350.0));
    assert_eq!(px.resolve(el(0.0, 100.0), vh, None), None);

    let pct: TriggerPosition = "+=250%".parse().unwrap();
    assert_eq!(pct, TriggerPosition::AfterViewport(2.5));
    assert_eq!(pct.resolve(el(0.0, 100.0), vh, Some(0.0)), Some(2000.0));

    let h = TriggerPosition::after_start_by_height(2.5);
    assert!(h.is_relative());
    assert_eq!(h.resolve(el(1000.0, 1000.0), vh, Some(1000.0)), Some(3500.0));
}

#[test]
fn malformed_positions_are_rejected() {
    assert!("".parse::<TriggerPosition>().is_err());
    assert!("top top top".parse::<TriggerPosition>().is_err());
    assert!("+=abc".parse::<TriggerPosition>().is_err());
    assert!("+=inf".parse::<TriggerPosition>().is_err());
}

#[test]
fn relative_offsets_must_be_finite_in_every_unit() {
    for raw in ["+=inf%", "+=NaN%", "+=infh", "+=-inf h", "+=NaNh", "+=infpx"] {
        assert!(raw.parse::<TriggerPosition>().is_err(), "{raw}");
    }
    assert_eq!(
        "+=1.5h".parse::<TriggerPosition>().unwrap(),
        TriggerPosition::AfterHeight(1.5)
    );
}

#[test]
fn serde_uses_the_string_form() {
    let p: TriggerPosition = serde_json::from_str("\"top 85%\"").unwrap();
    assert_eq!(
        p,
        TriggerPosition::edge(Anchor::Fraction(0.0), Anchor::Fraction(0.85))
    );
    let h: TriggerPosition = serde_json::from_str("\"+=2.5h\"").unwrap();
    assert_eq!(h, TriggerPosition::AfterHeight(2.5));
    let s = serde_json::to_string(&TriggerPosition::top_top()).unwrap();
    assert_eq!(s, "\"top top\"");
}
