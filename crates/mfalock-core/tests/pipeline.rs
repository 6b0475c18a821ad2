//! End-to-end flow: sensor ticks produce a factor result, the result rides
//! the wire form through the event parser, and the session coordinator
//! decides on actuation.

use mfalock_core::arbiter::{SensorArbiter, SensorEvent, SensorInput};
use mfalock_core::config::LockConfig;
use mfalock_core::event::AuthEvent;
use mfalock_core::session::{SessionCoordinator, SessionOutcome};
use mfalock_core::template;
use mfalock_core::types::AuthStatus;

fn tick(a: &mut SensorArbiter, now: u64, touch: bool) -> Vec<SensorEvent> {
    a.tick(
        SensorInput {
            touch_level: touch,
            rotary_raw: 0,
        },
        now,
    )
}

/// Drive the default tap/hold(1000)/tap gesture through the arbiter and
/// collect everything it emits.
fn perform_default_gesture(a: &mut SensorArbiter) -> Vec<SensorEvent> {
    let mut events = Vec::new();
    let presses = [(10u64, 300u64), (600, 1200), (2100, 200)];
    for (start, duration) in presses {
        events.extend(tick(a, start, true));
        events.extend(tick(a, start + 60, true));
        events.extend(tick(a, start + 60 + duration, false));
        events.extend(tick(a, start + 120 + duration, false));
    }
    events
}

#[test]
fn gesture_to_unlock_decision() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = LockConfig::default();

    // No runtime or persisted template: the built-in default is active.
    let resolution = template::resolve(None, tmp.path(), config.min_hold_ms);
    let mut arbiter = SensorArbiter::new(&config, resolution.template);
    tick(&mut arbiter, 0, false);

    let events = perform_default_gesture(&mut arbiter);
    let completed: Vec<&AuthEvent> = events
        .iter()
        .filter_map(|e| match e {
            SensorEvent::Completed(event) => Some(event),
            _ => None,
        })
        .collect();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].method, "TOUCH");
    assert_eq!(completed[0].status, AuthStatus::Success);

    // The wire line round-trips through the bus parser.
    let line = completed[0].to_string();
    assert_eq!(line, "TOUCH - SUCCESS");
    let parsed = AuthEvent::parse(&line).unwrap();

    // Coordinator: the touch factor plus one more distinct method unlocks.
    let mut coordinator = SessionCoordinator::from_config(&config);
    assert_eq!(
        coordinator.observe(&parsed, 3_000),
        SessionOutcome::Recorded { verified: 1 }
    );
    let second = AuthEvent::parse("FACIAL RECOGNITION - SUCCESS").unwrap();
    assert!(matches!(
        coordinator.observe(&second, 8_000),
        SessionOutcome::QuorumReached { .. }
    ));
    assert_eq!(coordinator.unlock_count(), 1);
}

#[test]
fn failed_gesture_feeds_failure_without_unlock() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = LockConfig::default();
    let resolution = template::resolve(None, tmp.path(), config.min_hold_ms);
    let mut arbiter = SensorArbiter::new(&config, resolution.template);
    tick(&mut arbiter, 0, false);

    // Tap, then release the hold far too early.
    let mut events = Vec::new();
    for (start, duration) in [(10u64, 300u64), (600, 200)] {
        events.extend(tick(&mut arbiter, start, true));
        events.extend(tick(&mut arbiter, start + 60, true));
        events.extend(tick(&mut arbiter, start + 60 + duration, false));
        events.extend(tick(&mut arbiter, start + 120 + duration, false));
    }

    let failure = events
        .iter()
        .find_map(|e| match e {
            SensorEvent::Completed(event) if event.status == AuthStatus::Failure => Some(event),
            _ => None,
        })
        .expect("short hold should complete as a failure");

    let mut coordinator = SessionCoordinator::from_config(&config);
    assert_eq!(
        coordinator.observe(failure, 1_000),
        SessionOutcome::FailureLogged
    );
    assert_eq!(coordinator.unlock_count(), 0);
}
