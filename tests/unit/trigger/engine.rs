use super::*;
use crate::{
    foundation::core::ViewportRect,
    host::dom::{ElementSpec, LayoutSpec, Length, StaticDocument},
};

struct TestProxy {
    top: f64,
    pin_type: PinType,
}

impl TestProxy {
    fn at(top: f64) -> Self {
        Self {
            top,
            pin_type: PinType::Transform,
        }
    }
}

impl ScrollerProxy for TestProxy {
    fn scroll_top(&self) -> f64 {
        self.top
    }

    fn set_scroll_top(&mut self, value: f64) {
        self.top = value;
    }

    fn bounding_client_rect(&self) -> ViewportRect {
        ViewportRect {
            top: 0.0,
            left: 0.0,
            width: 1280.0,
            height: 800.0,
        }
    }

    fn pin_type(&self) -> PinType {
        self.pin_type
    }
}

fn doc() -> StaticDocument {
    StaticDocument::new(LayoutSpec {
        viewport_width: 1280.0,
        viewport_height: 800.0,
        elements: vec![
            ElementSpec::block("intro", Length::Px(1000.0)),
            ElementSpec::block("seq", Length::Px(1000.0)),
            ElementSpec::block("after", Length::Px(600.0)),
        ],
    })
    .unwrap()
}

fn pinned_seq(engine: &mut TriggerEngine, doc: &StaticDocument) -> TriggerId {
    let seq = doc.element("seq").unwrap();
    engine
        .register(
            OwnerId(0),
            TriggerSpec::new(
                seq,
                TriggerPosition::top_top(),
                TriggerPosition::after_start_by_height(2.5),
            )
            .with_scrub(Scrub::Immediate)
            .pinned(),
        )
        .unwrap()
}

fn kinds(events: &[TriggerEvent]) -> Vec<TriggerEventKind> {
    events.iter().map(|e| e.kind).collect()
}

#[test]
fn pin_range_spans_height_multiple() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    let id = pinned_seq(&mut engine, &doc);

    let report = engine.refresh(&TestProxy::at(0.0), &doc);
    assert_eq!(
        engine.bounds(id),
        Some(Bounds {
            start: 1000.0,
            end: 3500.0
        })
    );
    assert_eq!(report.pin_spacing, 2500.0);

    for (pos, active) in [
        (999.0, false),
        (1000.0, true),
        (2200.0, true),
        (3500.0, true),
        (3501.0, false),
    ] {
        engine.update(&TestProxy::at(pos), Duration::from_millis(16));
        assert_eq!(engine.is_active(id), active, "pos {pos}");
    }
}

#[test]
fn pins_push_following_triggers_down() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    pinned_seq(&mut engine, &doc);
    let after = engine
        .register(
            OwnerId(1),
            TriggerSpec::new(
                doc.element("after").unwrap(),
                "top top".parse().unwrap(),
                "bottom top".parse().unwrap(),
            ),
        )
        .unwrap();

    engine.refresh(&TestProxy::at(0.0), &doc);
    assert_eq!(
        engine.bounds(after),
        Some(Bounds {
            start: 4500.0,
            end: 5100.0
        })
    );
    assert_eq!(engine.flow_offset(2000.0), 2500.0);
    assert_eq!(engine.flow_offset(1999.0), 0.0);
}

#[test]
fn boundary_events_follow_scroll_direction() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    let id = pinned_seq(&mut engine, &doc);
    engine.refresh(&TestProxy::at(0.0), &doc);
    let dt = Duration::from_millis(16);

    assert!(kinds(&engine.update(&TestProxy::at(0.0), dt)).is_empty());
    assert_eq!(
        kinds(&engine.update(&TestProxy::at(1500.0), dt)),
        vec![
            TriggerEventKind::Enter,
            TriggerEventKind::Update { progress: 0.2 }
        ]
    );
    assert_eq!(
        kinds(&engine.update(&TestProxy::at(4000.0), dt)),
        vec![
            TriggerEventKind::Leave,
            TriggerEventKind::Update { progress: 1.0 }
        ]
    );
    assert_eq!(
        kinds(&engine.update(&TestProxy::at(3000.0), dt)),
        vec![
            TriggerEventKind::EnterBack,
            TriggerEventKind::Update { progress: 0.8 }
        ]
    );
    let back = engine.update(&TestProxy::at(0.0), dt);
    assert_eq!(
        kinds(&back),
        vec![
            TriggerEventKind::LeaveBack,
            TriggerEventKind::Update { progress: 0.0 }
        ]
    );
    assert!(back.iter().all(|e| e.id == id && e.owner == OwnerId(0)));
}

#[test]
fn jumping_over_a_range_emits_both_boundaries() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    pinned_seq(&mut engine, &doc);
    engine.refresh(&TestProxy::at(0.0), &doc);
    let dt = Duration::from_millis(16);
    engine.update(&TestProxy::at(0.0), dt);

    assert_eq!(
        kinds(&engine.update(&TestProxy::at(9000.0), dt)),
        vec![
            TriggerEventKind::Enter,
            TriggerEventKind::Leave,
            TriggerEventKind::Update { progress: 1.0 }
        ]
    );
    assert_eq!(
        kinds(&engine.update(&TestProxy::at(0.0), dt)),
        vec![
            TriggerEventKind::EnterBack,
            TriggerEventKind::LeaveBack,
            TriggerEventKind::Update { progress: 0.0 }
        ]
    );
}

#[test]
fn unchanged_progress_is_not_redelivered() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    pinned_seq(&mut engine, &doc);
    engine.refresh(&TestProxy::at(2000.0), &doc);
    let dt = Duration::from_millis(16);
    let first = engine.update(&TestProxy::at(2000.0), dt);
    assert_eq!(kinds(&first), vec![TriggerEventKind::Enter]);
    assert!(engine.update(&TestProxy::at(2000.0), dt).is_empty());
}

#[test]
fn refresh_snaps_progress_and_reports_it() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    let id = pinned_seq(&mut engine, &doc);
    let report = engine.refresh(&TestProxy::at(3500.0), &doc);
    assert_eq!(
        report.events,
        vec![TriggerEvent {
            id,
            owner: OwnerId(0),
            kind: TriggerEventKind::Refresh { progress: 1.0 },
        }]
    );
    assert_eq!(engine.progress(id), Some(1.0));
}

#[test]
fn once_triggers_are_removed_after_enter() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    let id = engine
        .register(
            OwnerId(3),
            TriggerSpec::new(
                doc.element("seq").unwrap(),
                "center center".parse().unwrap(),
                "bottom top".parse().unwrap(),
            )
            .once(),
        )
        .unwrap();
    engine.refresh(&TestProxy::at(0.0), &doc);
    let dt = Duration::from_millis(16);
    engine.update(&TestProxy::at(0.0), dt);

    let events = engine.update(&TestProxy::at(1200.0), dt);
    assert_eq!(kinds(&events), vec![TriggerEventKind::Enter]);
    assert!(engine.bounds(id).is_none());
    assert!(engine.update(&TestProxy::at(0.0), dt).is_empty());
}

#[test]
fn smooth_scrub_trails_then_settles() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    let id = engine
        .register(
            OwnerId(0),
            TriggerSpec::new(
                doc.element("seq").unwrap(),
                TriggerPosition::top_top(),
                "+=1000".parse().unwrap(),
            )
            .with_scrub(Scrub::Smooth(0.5)),
        )
        .unwrap();
    engine.refresh(&TestProxy::at(1000.0), &doc);

    let proxy = TestProxy::at(2000.0);
    engine.update(&proxy, Duration::from_millis(16));
    let first = engine.progress(id).unwrap();
    assert!(first > 0.0 && first < 0.5, "{first}");
    assert!(engine.is_settling());

    for _ in 0..240 {
        engine.update(&proxy, Duration::from_millis(16));
    }
    assert_eq!(engine.progress(id), Some(1.0));
    assert!(!engine.is_settling());
}

#[test]
fn pin_placement_tracks_phase() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    let id = pinned_seq(&mut engine, &doc);
    engine.refresh(&TestProxy::at(0.0), &doc);
    let dt = Duration::from_millis(16);

    engine.update(&TestProxy::at(500.0), dt);
    assert_eq!(engine.pin_placement(id, PinType::Transform), PinPlacement::Static);
    assert_eq!(engine.pin_phase(id), Some(PinPhase::Unpinned));

    engine.update(&TestProxy::at(2000.0), dt);
    assert_eq!(engine.pin_phase(id), Some(PinPhase::Pinning));
    assert_eq!(
        engine.pin_placement(id, PinType::Transform),
        PinPlacement::Pinned {
            pin_type: PinType::Transform,
            translate_y: 1000.0,
            viewport_top: 0.0,
        }
    );
    engine.update(&TestProxy::at(2100.0), dt);
    assert_eq!(engine.pin_phase(id), Some(PinPhase::Pinned));
    assert_eq!(
        engine.pin_placement(id, PinType::Fixed).translate_y(),
        0.0
    );

    engine.update(&TestProxy::at(5000.0), dt);
    assert_eq!(engine.pin_phase(id), Some(PinPhase::Unpinning));
    assert_eq!(
        engine.pin_placement(id, PinType::Transform),
        PinPlacement::Released {
            translate_y: 2500.0
        }
    );
    engine.update(&TestProxy::at(5000.0), dt);
    assert_eq!(engine.pin_phase(id), Some(PinPhase::Unpinned));
}

#[test]
fn pin_transitions_keep_the_engine_settling() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    let id = pinned_seq(&mut engine, &doc);
    engine.refresh(&TestProxy::at(0.0), &doc);
    let dt = Duration::from_millis(16);
    engine.update(&TestProxy::at(0.0), dt);
    assert!(!engine.is_settling());

    engine.update(&TestProxy::at(2000.0), dt);
    assert_eq!(engine.pin_phase(id), Some(PinPhase::Pinning));
    assert!(engine.is_settling());
    engine.update(&TestProxy::at(2000.0), dt);
    assert_eq!(engine.pin_phase(id), Some(PinPhase::Pinned));
    assert!(!engine.is_settling());

    engine.update(&TestProxy::at(5000.0), dt);
    assert!(engine.is_settling());
    engine.update(&TestProxy::at(5000.0), dt);
    assert_eq!(engine.pin_phase(id), Some(PinPhase::Unpinned));
    assert!(!engine.is_settling());
}

#[test]
fn relative_start_is_rejected() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    let err = engine
        .register(
            OwnerId(0),
            TriggerSpec::new(
                doc.element("seq").unwrap(),
                "+=100".parse().unwrap(),
                "+=100".parse().unwrap(),
            ),
        )
        .unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}

#[test]
fn kill_owner_removes_only_that_owner() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    pinned_seq(&mut engine, &doc);
    let other = engine
        .register(
            OwnerId(7),
            TriggerSpec::new(
                doc.element("after").unwrap(),
                TriggerPosition::top_top(),
                "bottom top".parse().unwrap(),
            ),
        )
        .unwrap();
    assert_eq!(engine.kill_owner(OwnerId(0)), 1);
    assert_eq!(engine.ids().collect::<Vec<_>>(), vec![other]);
    assert!(engine.kill(other));
    assert!(!engine.kill(other));
    assert!(engine.is_empty());
}

#[test]
fn scroll_to_start_writes_through_the_proxy() {
    let doc = doc();
    let mut engine = TriggerEngine::new();
    let id = pinned_seq(&mut engine, &doc);
    let mut proxy = TestProxy::at(0.0);
    assert!(engine.scroll_to_start(id, &mut proxy).is_err());
    engine.refresh(&proxy, &doc);
    engine.scroll_to_start(id, &mut proxy).unwrap();
    assert_eq!(proxy.top, 1000.0);
}

#[test]
fn degenerate_range_is_a_step() {
    let b = Bounds {
        start: 100.0,
        end: 100.0,
    };
    assert_eq!(b.progress_at(99.0), 0.0);
    assert_eq!(b.progress_at(100.0), 1.0);
    assert!(b.contains(100.0));
    assert_eq!(b.len(), 0.0);
}
