//! Pour engine — turns a planned [`PourSession`] into timed pump commands.
//!
//! ```text
//!   t0 ──▶ energize all planned channels (FORWARD)
//!          │
//!          ▼
//!   ┌──▶ elapsed = now - t0
//!   │    for each due channel (shortest target first): OFF
//!   │    nothing left pouring? ──▶ done
//!   └─── sleep(min(tick, next deadline - elapsed))
//! ```
//!
//! One loop watches every channel against one shared origin; a channel's
//! OFF decision depends only on its own target. A driver fault clears
//! that channel's flag and is recorded; the other channels carry on.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use log::{debug, info, warn};

use crate::app::notifier::SessionNotifier;
use crate::app::ports::{ActuatorDriver, Clock};
use crate::drivers::pump::PumpMode;
use crate::error::DriverFault;
use crate::recipe::{Channel, MAX_CHANNELS};
use crate::session::{ChannelState, PourSession};

/// Room for a failed start and failed release per channel, plus one per
/// channel from a follow-up shutoff sweep.
pub const FAULT_CAP: usize = 3 * MAX_CHANNELS;

/// Faults collected during one pour.
pub type FaultSet = heapless::Vec<DriverFault, FAULT_CAP>;

/// When a channel was turned off, relative to the session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStop {
    pub channel: Channel,
    pub at: Duration,
}

/// Result of one pour.
#[derive(Debug, Clone, PartialEq)]
pub struct PourOutcome {
    pub drink: String,
    pub started_at: Duration,
    pub finished_at: Duration,
    /// OFF transitions in the order they were issued.
    pub stops: heapless::Vec<ChannelStop, MAX_CHANNELS>,
    pub faults: FaultSet,
    pub cancelled: bool,
}

impl PourOutcome {
    pub(crate) fn new(drink: &str, started_at: Duration) -> Self {
        Self {
            drink: drink.to_owned(),
            started_at,
            finished_at: started_at,
            stops: heapless::Vec::new(),
            faults: FaultSet::new(),
            cancelled: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_at.saturating_sub(self.started_at)
    }

    pub fn is_clean(&self) -> bool {
        self.faults.is_empty() && !self.cancelled
    }

    /// Elapsed time at which `channel` was turned off.
    pub fn stop_time(&self, channel: Channel) -> Option<Duration> {
        self.stops
            .iter()
            .find(|s| s.channel == channel)
            .map(|s| s.at)
    }

    pub(crate) fn record_fault(&mut self, fault: DriverFault) {
        if self.faults.push(fault).is_err() {
            warn!("Engine: fault set full, dropping {}", fault);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Engine
// ═══════════════════════════════════════════════════════════════

pub struct PourEngine<'a> {
    driver: &'a mut dyn ActuatorDriver,
    clock: &'a dyn Clock,
    notifier: Option<&'a SessionNotifier>,
    cancel: Option<&'a AtomicBool>,
    tick: Duration,
}

impl<'a> PourEngine<'a> {
    pub fn new(driver: &'a mut dyn ActuatorDriver, clock: &'a dyn Clock, tick: Duration) -> Self {
        Self {
            driver,
            clock,
            notifier: None,
            cancel: None,
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    /// Announce pour start through `notifier`.
    pub fn with_notifier(mut self, notifier: &'a SessionNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Stop early when `flag` is raised.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Run `session` to completion. Every energized channel is OFF (or
    /// faulted) when this returns.
    pub fn pour(&mut self, session: &mut PourSession) -> PourOutcome {
        if self.cancel_requested() {
            info!("Engine: '{}' cancelled before start", session.drink());
            let mut outcome = PourOutcome::new(session.drink(), self.clock.now());
            outcome.cancelled = true;
            return outcome;
        }

        if let Some(n) = self.notifier {
            n.on_start(session.drink());
        }

        let t0 = self.clock.now();
        session.mark_started(t0);
        let mut outcome = PourOutcome::new(session.drink(), t0);
        info!(
            "Engine: pouring '{}' on {} pumps (~{} ms)",
            session.drink(),
            session.plans().len(),
            session.nominal_length().as_millis()
        );

        // ── Start every planned channel before any timing check ───
        for index in 0..session.plans().len() {
            let channel = session.plans()[index].channel;
            match self.driver.set_state(channel, PumpMode::Forward) {
                Ok(()) => session.set_state(index, ChannelState::Pouring),
                Err(fault) => {
                    warn!("Engine: {} failed to start: {}", channel, fault);
                    // The relay may be half-switched.
                    session.set_state(index, ChannelState::Faulted);
                    outcome.record_fault(fault);
                    if let Err(release) = self.driver.set_state(channel, PumpMode::Off) {
                        warn!("Engine: {} left half-switched: {}", channel, release);
                        outcome.record_fault(release);
                    }
                }
            }
        }

        // ── Poll until every channel is off ───────────────────────
        loop {
            let elapsed = self.clock.now().saturating_sub(t0);

            for index in session.due(elapsed) {
                self.stop(session, index, elapsed, &mut outcome);
            }

            if self.cancel_requested() && !session.is_finished() {
                info!("Engine: '{}' cancelled at {} ms", session.drink(), elapsed.as_millis());
                for index in session.pouring() {
                    self.stop(session, index, elapsed, &mut outcome);
                }
                outcome.cancelled = true;
            }

            let Some(deadline) = session.next_deadline() else {
                break;
            };
            self.clock.sleep(self.tick.min(deadline - elapsed));
        }

        outcome.finished_at = self.clock.now();
        info!(
            "Engine: '{}' finished in {} ms ({} faults)",
            outcome.drink,
            outcome.elapsed().as_millis(),
            outcome.faults.len()
        );
        outcome
    }

    fn stop(&mut self, session: &mut PourSession, index: usize, elapsed: Duration, outcome: &mut PourOutcome) {
        let channel = session.plans()[index].channel;
        match self.driver.set_state(channel, PumpMode::Off) {
            Ok(()) => {
                debug!("Engine: {} off at {} ms", channel, elapsed.as_millis());
                session.set_state(index, ChannelState::Done);
                let _ = outcome.stops.push(ChannelStop {
                    channel,
                    at: elapsed,
                });
            }
            Err(fault) => {
                warn!("Engine: {} failed to stop: {}", channel, fault);
                session.set_state(index, ChannelState::Faulted);
                outcome.record_fault(fault);
            }
        }
    }

    fn cancel_requested(&self) -> bool {
        self.cancel.is_some_and(|f| f.load(Ordering::Acquire))
    }
}
