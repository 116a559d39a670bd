use super::*;

#[test]
fn paused_tween_does_not_move() {
    let mut t = Tween::new(Duration::from_secs(1), Ease::Linear);
    assert_eq!(t.advance(Duration::from_millis(100)), TweenStep::Idle);
    assert_eq!(t.progress(), 0.0);
}

#[test]
fn play_completes_then_reverse_returns() {
    let mut t = Tween::new(Duration::from_secs(1), Ease::OutCubic);
    t.play();
    assert_eq!(t.advance(Duration::from_millis(500)), TweenStep::Running);
    assert!((t.progress() - 0.5).abs() < 1e-9);
    assert!(t.value() > 0.5);
    assert_eq!(t.advance(Duration::from_millis(600)), TweenStep::Completed);
    assert_eq!(t.value(), 1.0);
    assert!(!t.is_playing());

    t.reverse();
    assert_eq!(t.advance(Duration::from_millis(400)), TweenStep::Running);
    assert_eq!(
        t.advance(Duration::from_millis(700)),
        TweenStep::ReverseCompleted
    );
    assert_eq!(t.value(), 0.0);
}
