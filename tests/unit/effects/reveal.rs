use super::*;
use crate::{
    effects::testing::Harness,
    host::dom::{ElementSpec, LayoutSpec, Length, StaticDocument},
};

const DT: Duration = Duration::from_millis(16);

fn page() -> StaticDocument {
    StaticDocument::new(LayoutSpec {
        viewport_width: 1280.0,
        viewport_height: 800.0,
        elements: vec![
            ElementSpec::block("intro", Length::Px(1000.0)),
            ElementSpec::block("s1", Length::Px(400.0)).with_class("entry-section"),
            ElementSpec::block("s2", Length::Px(400.0)).with_class("entry-section"),
            ElementSpec::block("s2-title", Length::Px(50.0))
                .with_parent("s2")
                .with_tag("h2")
                .with_text("  Enter the Shell "),
            ElementSpec::block("tail", Length::Px(2000.0)),
        ],
    })
    .unwrap()
}

fn ready(h: &mut Harness) -> Reveal {
    let mut reveal = Reveal::new(RevealConfig::default()).unwrap();
    assert_eq!(h.setup(&mut reveal).unwrap(), Setup::Ready);
    h.refresh(&mut reveal);
    h.frame(&mut reveal, 0.0, DT);
    reveal
}

fn run(h: &mut Harness, reveal: &mut Reveal, pos: f64, frames: usize) {
    for _ in 0..frames {
        h.frame(reveal, pos, DT);
    }
}

#[test]
fn sections_start_hidden_and_offset() {
    let mut h = Harness::new(page());
    let reveal = ready(&mut h);
    assert_eq!(reveal.section_count(), 2);

    let s1 = h.doc.element("s1").unwrap();
    let style = h.doc.style(s1).unwrap();
    assert_eq!(style.opacity, 0.0);
    assert!(!style.visible);
    assert_eq!(style.transform.translate, Vec2::new(0.0, 50.0));

    let s2 = h.doc.element("s2").unwrap();
    assert_eq!(reveal.gate(), Some(s2));
    let gate = h.doc.style(s2).unwrap();
    assert_eq!(gate.opacity, 0.0);
    assert!(gate.visible);
    assert_eq!(gate.transform.translate, Vec2::new(0.0, 50.0));
}

#[test]
fn enter_plays_and_leave_back_reverses() {
    let mut h = Harness::new(page());
    let mut reveal = ready(&mut h);
    let s1 = h.doc.element("s1").unwrap();

    h.frame(&mut reveal, 400.0, DT);
    let v = reveal.value(s1).unwrap();
    assert!(v > 0.0 && v < 1.0, "{v}");
    assert!(h.doc.style(s1).unwrap().visible);

    run(&mut h, &mut reveal, 400.0, 80);
    assert_eq!(reveal.value(s1), Some(1.0));
    let style = h.doc.style(s1).unwrap();
    assert_eq!(style.opacity, 1.0);
    assert_eq!(style.transform.translate, Vec2::ZERO);

    // Leaving past the end keeps the section shown.
    run(&mut h, &mut reveal, 900.0, 10);
    assert_eq!(reveal.value(s1), Some(1.0));

    run(&mut h, &mut reveal, 100.0, 80);
    assert_eq!(reveal.value(s1), Some(0.0));
    let style = h.doc.style(s1).unwrap();
    assert!(!style.visible);
    assert_eq!(style.transform.translate, Vec2::new(0.0, 50.0));
}

#[test]
fn gate_holds_scroll_until_faded_in() {
    let mut h = Harness::new(page());
    let mut reveal = ready(&mut h);
    let s2 = h.doc.element("s2").unwrap();
    assert!(h.commands.is_empty());

    h.frame(&mut reveal, 1300.0, DT);
    assert_eq!(h.commands, vec![ScrollCommand::Stop]);
    assert!(!reveal.gate_released());

    run(&mut h, &mut reveal, 1300.0, 80);
    assert!(reveal.gate_released());
    assert_eq!(
        h.commands,
        vec![
            ScrollCommand::Stop,
            ScrollCommand::Start,
            ScrollCommand::Update
        ]
    );
    let gate = h.doc.style(s2).unwrap();
    assert_eq!(gate.opacity, 1.0);
    assert_eq!(gate.transform.translate, Vec2::ZERO);

    // Played once: scrolling back does not hide it again.
    run(&mut h, &mut reveal, 0.0, 80);
    assert_eq!(reveal.value(s2), Some(1.0));
    assert_eq!(h.commands.len(), 3);
}

#[test]
fn missing_sections_are_not_an_error() {
    let mut h = Harness::new(page());
    let mut reveal = Reveal::new(RevealConfig {
        selector: ".nothing-here".to_string(),
        ..RevealConfig::default()
    })
    .unwrap();
    assert_eq!(h.setup(&mut reveal).unwrap(), Setup::Ready);
    assert_eq!(reveal.section_count(), 0);
    assert!(h.engine.is_empty());
}

#[test]
fn config_accepts_position_strings() {
    let cfg: RevealConfig =
        serde_json::from_str(r#"{"selector": ".card", "start": "top 90%", "gate_heading": null}"#)
            .unwrap();
    assert_eq!(
        cfg.start,
        TriggerPosition::edge(Anchor::Fraction(0.0), Anchor::Fraction(0.9))
    );
    assert_eq!(cfg.end, RevealConfig::default().end);
    assert_eq!(cfg.gate_heading, None);

    assert!(
        Reveal::new(RevealConfig {
            start: "+=10".parse().unwrap(),
            ..RevealConfig::default()
        })
        .is_err()
    );
}

fn fade_page() -> StaticDocument {
    StaticDocument::new(LayoutSpec {
        viewport_width: 1280.0,
        viewport_height: 800.0,
        elements: vec![
            ElementSpec::block("page1", Length::Px(800.0)),
            ElementSpec::block("caption", Length::Px(60.0))
                .with_parent("page1")
                .with_class("bottom-page1"),
            ElementSpec::block("page1-5-entry", Length::Px(800.0)),
        ],
    })
    .unwrap()
}

fn fade_config() -> FadeOutConfig {
    serde_json::from_str(
        r##"{"name": "caption-fade", "target": ".bottom-page1", "trigger": "#page1-5-entry"}"##,
    )
    .unwrap()
}

#[test]
fn fade_out_follows_progress() {
    let mut h = Harness::new(fade_page());
    let mut fade = FadeOut::new(fade_config()).unwrap();
    h.setup(&mut fade).unwrap();
    h.refresh(&mut fade);
    h.frame(&mut fade, 0.0, DT);
    let caption = h.doc.element("caption").unwrap();
    assert_eq!(h.doc.style(caption).unwrap().opacity, 1.0);

    h.frame(&mut fade, 200.0, DT);
    assert_eq!(fade.opacity(), 0.5);
    assert_eq!(h.doc.style(caption).unwrap().opacity, 0.5);

    h.frame(&mut fade, 1000.0, DT);
    assert_eq!(h.doc.style(caption).unwrap().opacity, 0.0);
}

#[test]
fn fade_out_requires_both_elements() {
    let mut h = Harness::new(fade_page());
    let mut fade = FadeOut::new(FadeOutConfig {
        trigger: "#missing".to_string(),
        ..fade_config()
    })
    .unwrap();
    assert!(matches!(
        h.setup(&mut fade).unwrap_err(),
        ReelError::MissingElement(_)
    ));
}
