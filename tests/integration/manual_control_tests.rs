//! Integration tests for the manual control panel.

use barbot::adapters::time::SimClock;
use barbot::app::events::AppEvent;
use barbot::drivers::pump::PumpMode;
use barbot::error::{FaultKind, PourError};

use crate::mock_hw::{ch, ms, rig, test_config};

const SHOT: [f32; 8] = [10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];

#[test]
fn manual_command_drives_one_pump_and_is_announced() {
    let r = rig(test_config(), SimClock::auto());
    r.coordinator.manual(ch(4), PumpMode::Reverse).unwrap();

    assert_eq!(r.driver.mode(ch(4)), PumpMode::Reverse);
    assert_eq!(
        r.sink.events(),
        vec![AppEvent::ManualCommand {
            channel: ch(4),
            mode: PumpMode::Reverse
        }]
    );
}

#[test]
fn manual_command_on_missing_pump_is_a_driver_error() {
    let r = rig(test_config(), SimClock::auto());
    match r.coordinator.manual(ch(9), PumpMode::Forward) {
        Err(PourError::Driver(f)) => assert_eq!(f.kind, FaultKind::NoSuchChannel),
        other => panic!("expected driver error, got {other:?}"),
    }
    assert!(r.sink.events().is_empty());
}

#[test]
fn manual_commands_blocked_while_pouring() {
    let r = rig(test_config(), SimClock::stepped());
    let h = r.coordinator.request("shot", &SHOT, 1.0).unwrap();
    r.clock.wait_for_sleepers(1);
    let calls_before = r.driver.calls().len();

    assert_eq!(
        r.coordinator.manual(ch(3), PumpMode::Forward),
        Err(PourError::ManualBlocked)
    );
    assert_eq!(r.coordinator.all_forward(), Err(PourError::ManualBlocked));
    assert_eq!(r.coordinator.all_reverse(), Err(PourError::ManualBlocked));
    assert_eq!(r.driver.calls().len(), calls_before);

    r.clock.advance_to(ms(2860));
    h.join().unwrap();
    r.coordinator.wait_idle();
    r.coordinator.manual(ch(3), PumpMode::Forward).unwrap();
}

#[test]
fn all_off_cancels_the_pour_and_stops_everything() {
    let r = rig(test_config(), SimClock::stepped());
    r.coordinator.manual(ch(5), PumpMode::Reverse).unwrap();

    let h = r.coordinator.request("shot", &SHOT, 1.0).unwrap();
    r.clock.wait_for_sleepers(1);
    assert_eq!(r.driver.running(), vec![1, 5]);

    r.coordinator.all_off().unwrap();
    assert!(r.driver.running().is_empty());

    r.clock.advance_to(ms(10));
    let outcome = h.join().unwrap();
    assert!(outcome.cancelled);
    assert!(!r.coordinator.is_busy());
}

#[test]
fn manual_state_survives_a_pour() {
    let r = rig(test_config(), SimClock::auto());
    r.coordinator.manual(ch(6), PumpMode::Forward).unwrap();

    let h = r.coordinator.request("shot", &SHOT, 1.0).unwrap();
    h.join().unwrap();

    assert_eq!(r.driver.mode(ch(6)), PumpMode::Forward);
    assert_eq!(r.driver.mode(ch(1)), PumpMode::Off);
}

#[test]
fn all_reverse_releases_then_settles_then_reverses() {
    let r = rig(test_config(), SimClock::auto());
    r.coordinator.manual(ch(2), PumpMode::Forward).unwrap();
    let start = r.driver.calls().len();

    r.coordinator.all_reverse().unwrap();

    let calls = &r.driver.calls()[start..];
    assert_eq!(calls.len(), 16);
    assert!(calls[..8].iter().all(|c| c.mode == PumpMode::Off && c.at == ms(0)));
    assert!(calls[8..].iter().all(|c| c.mode == PumpMode::Reverse && c.at == ms(50)));
    assert_eq!(r.driver.running(), (1..=8).collect::<Vec<u8>>());
}

#[test]
fn all_forward_primes_every_line() {
    let r = rig(test_config(), SimClock::auto());
    r.coordinator.all_forward().unwrap();
    for n in 1..=8 {
        assert_eq!(r.driver.mode(ch(n)), PumpMode::Forward);
    }
    let announced = r.sink.count(|e| {
        matches!(e, AppEvent::ManualCommand { mode: PumpMode::Forward, .. })
    });
    assert_eq!(announced, 8);
}
