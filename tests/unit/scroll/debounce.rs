use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn burst_fires_once_after_quiet_period() {
    let mut d = Debouncer::new(ms(150));
    assert!(!d.poll(ms(0)));

    d.trigger(ms(0));
    d.trigger(ms(40));
    d.trigger(ms(100));
    assert!(d.is_pending());
    assert!(!d.poll(ms(200)));
    assert!(d.poll(ms(250)));
    assert!(!d.poll(ms(400)));
    assert!(!d.is_pending());
}

#[test]
fn late_event_extends_the_deadline() {
    let mut d = Debouncer::new(ms(150));
    d.trigger(ms(10));
    assert!(!d.poll(ms(100)));
    d.trigger(ms(150));
    assert!(!d.poll(ms(200)));
    assert!(d.poll(ms(300)));
}
