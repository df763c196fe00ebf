//! Integration tests for request admission and the pour worker lifecycle.
//!
//! Timing-sensitive cases use the stepped [`SimClock`]: the pour worker
//! parks in its tick sleep until the test advances virtual time, so
//! "a request arriving mid-pour" is a deterministic sequence, not a race.

use barbot::adapters::time::SimClock;
use barbot::app::events::AppEvent;
use barbot::config::RigConfig;
use barbot::drivers::pump::PumpMode;
use barbot::error::{FaultKind, PourError, RecipeError};

use crate::mock_hw::{ch, ms, rig, test_config};

const SHOT: [f32; 8] = [10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];

/// 100 ms per tenth so a quantity of 2 pours for exactly 200 ms.
fn fast_config() -> RigConfig {
    RigConfig {
        pour_rate_ms: 100,
        ..test_config()
    }
}

// ── Busy, debounce, and the window edge ─────────────────────

#[test]
fn busy_then_debounced_then_accepted_at_edge() {
    let r = rig(fast_config(), SimClock::stepped());
    let quick = [2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];

    // t = 0: accepted, worker parks in its first tick.
    let first = r.coordinator.request("quick", &quick, 1.0).unwrap();
    r.clock.wait_for_sleepers(1);
    assert!(r.coordinator.is_busy());

    // t = 0.1 s: still pouring.
    r.clock.advance_to(ms(100));
    assert_eq!(
        r.coordinator.request("again", &quick, 1.0).err(),
        Some(PourError::SessionBusy)
    );

    // t = 0.2 s: the pour completes and re-arms the window.
    r.clock.advance_to(ms(200));
    let outcome = first.join().unwrap();
    assert_eq!(outcome.elapsed(), ms(200));
    assert!(!r.coordinator.is_busy());

    // t = 0.5 s and 1.199 s: inside completion + 1 s.
    r.clock.advance_to(ms(500));
    assert_eq!(
        r.coordinator.request("again", &quick, 1.0).err(),
        Some(PourError::DebounceRejected)
    );
    r.clock.advance_to(ms(1199));
    assert_eq!(
        r.coordinator.request("again", &quick, 1.0).err(),
        Some(PourError::DebounceRejected)
    );

    // t = 1.2 s: exactly at the edge, accepted.
    r.clock.advance_to(ms(1200));
    let second = r.coordinator.request("again", &quick, 1.0).unwrap();
    r.clock.wait_for_sleepers(1);
    r.clock.advance_to(ms(1400));
    let outcome = second.join().unwrap();
    assert_eq!(outcome.drink, "again");
    assert_eq!(r.coordinator.completed_pours(), 2);
}

#[test]
fn request_well_after_window_accepted() {
    let r = rig(fast_config(), SimClock::stepped());
    let quick = [2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];

    let first = r.coordinator.request("quick", &quick, 1.0).unwrap();
    r.clock.wait_for_sleepers(1);
    r.clock.advance_to(ms(200));
    first.join().unwrap();

    r.clock.advance_to(ms(1500));
    let second = r.coordinator.request("later", &quick, 1.0).unwrap();
    r.clock.wait_for_sleepers(1);
    r.clock.advance_to(ms(1700));
    assert!(second.join().unwrap().is_clean());
}

// ── Rejections have no side effects ──────────────────────────

#[test]
fn busy_rejection_touches_nothing() {
    let r = rig(test_config(), SimClock::stepped());
    let handle = r.coordinator.request("shot", &SHOT, 1.0).unwrap();
    r.clock.wait_for_sleepers(1);

    let calls_before = r.driver.calls().len();
    let events_before = r.sink.events().len();
    assert_eq!(
        r.coordinator.request("other", &[0.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 1.0).err(),
        Some(PourError::SessionBusy)
    );
    assert_eq!(r.driver.calls().len(), calls_before);
    assert_eq!(r.sink.events().len(), events_before);
    assert!(r.driver.calls_for(ch(2)).is_empty());
    assert_eq!(r.coordinator.active_drink().as_deref(), Some("shot"));

    r.clock.advance_to(ms(2860));
    handle.join().unwrap();
}

#[test]
fn invalid_recipes_rejected_synchronously() {
    let r = rig(test_config(), SimClock::auto());

    assert_eq!(
        r.coordinator.request("short", &[1.0; 7], 1.0).err(),
        Some(PourError::InvalidRecipe(RecipeError::WrongLength {
            expected: 8,
            actual: 7
        }))
    );
    assert_eq!(
        r.coordinator
            .request("neg", &[1.0, 1.0, -0.5, 0.0, 0.0, 0.0, 0.0, 0.0], 1.0)
            .err(),
        Some(PourError::InvalidRecipe(RecipeError::NegativeEntry { index: 2 }))
    );
    assert!(r.driver.calls().is_empty());
    assert!(r.sink.events().is_empty());

    // The debounce stamp was not taken: a valid request goes straight in.
    let h = r.coordinator.request("ok", &SHOT, 1.0).unwrap();
    assert!(h.join().unwrap().is_clean());
}

// ── Notifications ────────────────────────────────────────────

#[test]
fn events_follow_the_pour_lifecycle() {
    let r = rig(test_config(), SimClock::auto());
    let h = r
        .coordinator
        .request("mix", &[10.0, 20.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 1.0)
        .unwrap();
    h.join().unwrap();
    r.coordinator.wait_idle();

    let events = r.sink.events();
    assert_eq!(events.len(), 4, "{events:?}");
    assert_eq!(events[0], AppEvent::SelectionChanged(false));
    assert_eq!(
        events[1],
        AppEvent::PourStarted {
            drink: "mix".into()
        }
    );
    match &events[2] {
        AppEvent::PourFinished {
            drink,
            elapsed,
            faults,
            cancelled,
        } => {
            assert_eq!(drink, "mix");
            assert_eq!(*elapsed, ms(5720));
            assert!(faults.is_empty());
            assert!(!cancelled);
        }
        other => panic!("expected PourFinished, got {other:?}"),
    }
    assert_eq!(events[3], AppEvent::SelectionChanged(true));
}

#[test]
fn channel_timings_on_the_driver() {
    let r = rig(test_config(), SimClock::auto());
    let h = r
        .coordinator
        .request("mix", &[10.0, 20.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 1.0)
        .unwrap();
    let outcome = h.join().unwrap();

    let c1 = r.driver.calls_for(ch(1));
    let c2 = r.driver.calls_for(ch(2));
    assert_eq!(c1.len(), 2);
    assert_eq!(c1[1].mode, PumpMode::Off);
    assert_eq!(c1[1].at - c1[0].at, ms(2860));
    assert_eq!(c2[1].at - c2[0].at, ms(5720));
    assert_eq!(outcome.started_at, c1[0].at);
    for n in 3..=8 {
        assert!(r.driver.calls_for(ch(n)).is_empty(), "pump {n} driven");
    }
}

#[test]
fn announce_delay_precedes_the_first_pump() {
    let config = RigConfig {
        announce_delay_ms: 200,
        ..test_config()
    };
    let r = rig(config, SimClock::auto());
    let h = r.coordinator.request("shot", &SHOT, 1.0).unwrap();
    let outcome = h.join().unwrap();

    assert_eq!(r.driver.calls_for(ch(1))[0].at, ms(200));
    assert_eq!(outcome.elapsed(), ms(2860));
}

// ── Faults ───────────────────────────────────────────────────

#[test]
fn driver_fault_is_reported_and_session_completes() {
    let r = rig(test_config(), SimClock::auto());
    r.driver.fail(ch(2));

    let h = r
        .coordinator
        .request("mix", &[10.0, 10.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0], 1.0)
        .unwrap();
    let outcome = h.join().unwrap();
    r.coordinator.wait_idle();

    assert_eq!(outcome.faults.len(), 2);
    assert!(outcome.faults.iter().all(|f| f.channel == ch(2)));
    assert_eq!(outcome.faults[0].kind, FaultKind::Rejected);
    assert_eq!(outcome.faults[0].mode, PumpMode::Forward);
    assert_eq!(outcome.faults[1].mode, PumpMode::Off);
    assert_eq!(outcome.stop_time(ch(1)), Some(ms(2860)));
    assert_eq!(outcome.stop_time(ch(3)), Some(ms(2860)));
    assert!(r.driver.running().is_empty());

    let reported = r.sink.count(|e| {
        matches!(e, AppEvent::PourFinished { faults, .. } if faults.len() == 2)
    });
    assert_eq!(reported, 1);
    assert_eq!(r.sink.events().last(), Some(&AppEvent::SelectionChanged(true)));
}

#[test]
fn worker_panic_forces_every_pump_off() {
    let r = rig(test_config(), SimClock::auto());
    r.driver.panic_on_forward(ch(2));

    let h = r
        .coordinator
        .request("boom", &[10.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 1.0)
        .unwrap();
    let outcome = h.join().unwrap();
    r.coordinator.wait_idle();

    assert!(outcome.cancelled);
    assert!(r.driver.running().is_empty());
    assert!(!r.coordinator.is_busy());
    assert_eq!(r.sink.events().last(), Some(&AppEvent::SelectionChanged(true)));
}

// ── Cancellation ─────────────────────────────────────────────

#[test]
fn cancel_stops_every_pouring_channel() {
    let r = rig(test_config(), SimClock::stepped());
    let h = r
        .coordinator
        .request("mix", &[10.0, 20.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 1.0)
        .unwrap();
    r.clock.wait_for_sleepers(1);
    assert_eq!(r.driver.running(), vec![1, 2]);

    assert!(r.coordinator.cancel());
    r.clock.advance_to(ms(10));
    let outcome = h.join().unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.stop_time(ch(1)), Some(ms(10)));
    assert_eq!(outcome.stop_time(ch(2)), Some(ms(10)));
    assert!(r.driver.running().is_empty());
    assert!(!r.coordinator.is_busy());
}

#[test]
fn cancel_during_announce_delay_never_starts_a_pump() {
    let config = RigConfig {
        announce_delay_ms: 200,
        ..test_config()
    };
    let r = rig(config, SimClock::stepped());
    let h = r.coordinator.request("shot", &SHOT, 1.0).unwrap();

    // Worker is parked in the announce delay.
    r.clock.wait_for_sleepers(1);
    assert!(r.coordinator.cancel());
    r.clock.advance_to(ms(200));
    let outcome = h.join().unwrap();
    r.coordinator.wait_idle();

    assert!(outcome.cancelled);
    assert!(outcome.stops.is_empty());
    assert!(r.driver.calls().is_empty(), "{:?}", r.driver.calls());
    assert!(!r.coordinator.is_busy());

    let events = r.sink.events();
    assert_eq!(r.sink.count(|e| matches!(e, AppEvent::PourStarted { .. })), 0);
    assert_eq!(
        r.sink.count(|e| matches!(e, AppEvent::PourFinished { cancelled: true, .. })),
        1
    );
    assert_eq!(events.last(), Some(&AppEvent::SelectionChanged(true)));
}
