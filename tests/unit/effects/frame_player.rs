use std::time::Duration;

use super::*;
use crate::{
    assets::decode::PreparedImage,
    effects::testing::Harness,
    foundation::core::Rgba8Premul,
    host::dom::{ElementSpec, LayoutSpec, Length, StaticDocument},
};

const COUNT: usize = 67;
const DT: Duration = Duration::from_millis(16);

fn color(i: usize) -> Rgba8Premul {
    Rgba8Premul::from_straight_rgba((i * 3) as u8, 10, 20, 255)
}

fn harness() -> Harness {
    let doc = StaticDocument::new(LayoutSpec {
        viewport_width: 320.0,
        viewport_height: 200.0,
        elements: vec![
            ElementSpec::block("intro", Length::Px(200.0)),
            ElementSpec::block("seq", Length::Px(200.0)),
            ElementSpec::block("canvas", Length::Px(200.0))
                .with_parent("seq")
                .with_tag("canvas"),
            ElementSpec::block("after", Length::Px(400.0)),
        ],
    })
    .unwrap();
    let mut h = Harness::new(doc);
    for i in 0..COUNT {
        h.loader
            .insert(format!("f{i}"), PreparedImage::solid(8, 6, color(i)));
    }
    h
}

fn config() -> FrameSequenceConfig {
    FrameSequenceConfig {
        name: "seq".to_string(),
        container: "#seq".to_string(),
        canvas: Some("canvas".to_string()),
        frames: FrameSource::List((0..COUNT).map(|i| format!("f{i}")).collect()),
        pin_range: 2.5,
        scrub_secs: None,
    }
}

/// Scroll offset that selects frame `i`; the pin range is [200, 700].
fn pos_for(i: usize) -> f64 {
    200.0 + 500.0 * i as f64 / (COUNT - 1) as f64
}

fn ready(h: &mut Harness) -> FrameSequencePlayer {
    let mut player = FrameSequencePlayer::new(config()).unwrap();
    assert_eq!(h.setup(&mut player).unwrap(), Setup::Ready);
    h.refresh(&mut player);
    h.frame(&mut player, 0.0, DT);
    player
}

fn shown(player: &FrameSequencePlayer) -> [u8; 4] {
    player.surface().unwrap().pixel(0, 0).unwrap()
}

#[test]
fn frame_index_is_monotonic_and_bounded() {
    assert_eq!(frame_index(0.0, COUNT), 0);
    assert_eq!(frame_index(1.0, COUNT), 66);
    assert_eq!(frame_index(0.5, COUNT), 33);
    assert_eq!(frame_index(-3.0, COUNT), 0);
    assert_eq!(frame_index(7.0, COUNT), 66);
    assert_eq!(frame_index(0.5, 0), 0);
    assert_eq!(frame_index(0.9, 1), 0);

    let mut prev = 0;
    for step in 0..=1000 {
        let i = frame_index(step as f64 / 1000.0, COUNT);
        assert!(i >= prev && i < COUNT);
        prev = i;
    }
}

#[test]
fn setup_requests_every_frame_and_pins_the_container() {
    let mut h = harness();
    let player = ready(&mut h);
    assert_eq!(h.loader.requested().len(), COUNT);
    assert_eq!(h.loader.requested()[0], "f0");
    assert_eq!(h.loader.requested()[66], "f66");

    let id = player.trigger().unwrap();
    assert_eq!(
        h.engine.bounds(id),
        Some(crate::trigger::engine::Bounds {
            start: 200.0,
            end: 700.0
        })
    );
    assert_eq!(player.surface().unwrap().size(), Size::new(320.0, 200.0));
    assert_eq!(player.painted_frame(), Some(0));
    assert_eq!(shown(&player), color(0).to_array());
}

#[test]
fn missing_container_fails_setup() {
    let mut h = harness();
    let mut player = FrameSequencePlayer::new(FrameSequenceConfig {
        container: "#nope".to_string(),
        ..config()
    })
    .unwrap();
    let err = h.setup(&mut player).unwrap_err();
    assert!(matches!(err, ReelError::MissingElement(_)));
    assert!(h.engine.is_empty());
}

#[test]
fn jump_from_start_to_end_paints_last_frame_once() {
    let mut h = harness();
    let mut player = ready(&mut h);
    let before = player.paint_count();

    h.frame(&mut player, 10_000.0, DT);
    assert_eq!(player.current_frame(), 66);
    assert_eq!(player.painted_frame(), Some(66));
    assert_eq!(player.paint_count(), before + 1);
    assert_eq!(shown(&player), color(66).to_array());
}

#[test]
fn unchanged_progress_does_not_repaint() {
    let mut h = harness();
    let mut player = ready(&mut h);
    h.frame(&mut player, pos_for(20), DT);
    let count = player.paint_count();

    h.frame(&mut player, pos_for(20), DT);
    player.set_progress(20.0 / 66.0);
    h.commit(&mut player);
    assert_eq!(player.current_frame(), 20);
    assert_eq!(player.paint_count(), count);
}

#[test]
fn unloaded_frame_keeps_previous_paint_until_it_arrives() {
    let mut h = harness();
    h.loader.hold("f40");
    let mut player = ready(&mut h);

    h.frame(&mut player, pos_for(10), DT);
    assert_eq!(player.painted_frame(), Some(10));

    h.frame(&mut player, pos_for(40), DT);
    assert_eq!(player.current_frame(), 40);
    assert_eq!(player.painted_frame(), Some(10));
    assert_eq!(shown(&player), color(10).to_array());
    assert_eq!(player.frame_state(40), Some(&LoadState::Pending));

    h.loader.release("f40");
    h.frame(&mut player, pos_for(40), DT);
    assert_eq!(player.painted_frame(), Some(40));
    assert_eq!(shown(&player), color(40).to_array());
}

#[test]
fn failed_frame_stays_a_gap() {
    let mut h = harness();
    h.loader.fail("f5");
    let mut player = ready(&mut h);
    assert_eq!(player.frame_state(5), Some(&LoadState::Failed));

    h.frame(&mut player, pos_for(5), DT);
    assert_eq!(player.current_frame(), 5);
    assert_eq!(player.painted_frame(), Some(0));

    h.frame(&mut player, pos_for(6), DT);
    assert_eq!(player.painted_frame(), Some(6));
}

#[test]
fn resize_clears_and_repaints_current_frame() {
    let mut h = harness();
    let mut player = ready(&mut h);
    h.frame(&mut player, pos_for(30), DT);
    let count = player.paint_count();

    h.resize(&mut player, Size::new(160.0, 100.0));
    let surface = player.surface().unwrap();
    assert_eq!(surface.size(), Size::new(160.0, 100.0));
    assert!(surface.is_blank());
    assert_eq!(player.painted_frame(), None);

    h.commit(&mut player);
    assert_eq!(player.painted_frame(), Some(30));
    assert_eq!(player.paint_count(), count + 1);
    assert_eq!(shown(&player), color(30).to_array());
}

#[test]
fn loads_for_other_sequences_are_ignored() {
    let mut h = harness();
    let mut player = ready(&mut h);
    let stray = FrameLoad {
        key: FrameKey {
            sequence: 9,
            index: 3,
        },
        url: "f3".to_string(),
        result: Err("boom".to_string()),
    };
    h.deliver(&mut player, &stray);
    assert!(player.frame_state(3).and_then(LoadState::ready).is_some());
}

#[test]
fn config_parses_frame_patterns() {
    let cfg: FrameSequenceConfig = serde_json::from_str(
        r##"{
            "name": "shell",
            "container": "#page",
            "frames": {
                "pattern": "assets/images/frames{index:05}.png",
                "start": 7,
                "step": 3,
                "count": 67
            },
            "scrub_secs": 0.5
        }"##,
    )
    .unwrap();
    assert_eq!(cfg.pin_range, 2.5);
    let urls = cfg.frames.urls().unwrap();
    assert_eq!(urls.len(), 67);
    assert_eq!(urls[0], "assets/images/frames00007.png");
    assert_eq!(urls[66], "assets/images/frames00205.png");

    let bad = FrameSequenceConfig {
        pin_range: 0.0,
        ..cfg
    };
    assert!(FrameSequencePlayer::new(bad).is_err());
}
