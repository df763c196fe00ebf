//! Two-relay H-bridge pump driver over `embedded-hal` output pins.
//!
//! Each pump sits behind a pair of relays. The relay boards are
//! active-low: driving a line LOW energizes its relay.
//!
//! | Mode    | Line A | Line B |
//! |---------|--------|--------|
//! | Off     | HIGH   | HIGH   |
//! | Forward | LOW    | HIGH   |
//! | Reverse | HIGH   | LOW    |
//!
//! On a direction change the line being released is written before the
//! line being energized, so both relays are never on together.

use embedded_hal::digital::{OutputPin, PinState};
use log::{info, warn};

use crate::app::ports::ActuatorDriver;
use crate::drivers::pump::PumpMode;
use crate::error::{DriverFault, FaultKind};
use crate::recipe::{Channel, MAX_CHANNELS};

/// Line levels for a mode, `(a, b)`.
const fn levels(mode: PumpMode) -> (PinState, PinState) {
    match mode {
        PumpMode::Off => (PinState::High, PinState::High),
        PumpMode::Forward => (PinState::Low, PinState::High),
        PumpMode::Reverse => (PinState::High, PinState::Low),
    }
}

struct RelayPair<P> {
    a: P,
    b: P,
}

pub struct RelayBank<P: OutputPin> {
    pairs: heapless::Vec<RelayPair<P>, MAX_CHANNELS>,
}

impl<P: OutputPin> RelayBank<P> {
    /// Build a bank from pins in wiring order: `[p1a, p1b, p2a, p2b, ...]`.
    /// An odd trailing pin is ignored.
    pub fn new(pins: impl IntoIterator<Item = P>) -> Self {
        let mut pairs = heapless::Vec::new();
        let mut iter = pins.into_iter();
        while let (Some(a), Some(b)) = (iter.next(), iter.next()) {
            if pairs.push(RelayPair { a, b }).is_err() {
                warn!("RelayBank: more than {} pumps wired, extra ignored", MAX_CHANNELS);
                break;
            }
        }
        info!("RelayBank: {} pumps", pairs.len());
        Self { pairs }
    }

    /// De-energize every relay. Returns the first fault but attempts all.
    pub fn all_off(&mut self) -> Result<(), DriverFault> {
        let mut first = None;
        for channel in Channel::all(self.channel_count()) {
            if let Err(e) = self.set_state(channel, PumpMode::Off) {
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}

impl<P: OutputPin> ActuatorDriver for RelayBank<P> {
    fn set_state(&mut self, channel: Channel, mode: PumpMode) -> Result<(), DriverFault> {
        let fault = |kind| DriverFault::new(channel, mode, kind);
        let pair = self
            .pairs
            .get_mut(channel.index())
            .ok_or(fault(FaultKind::NoSuchChannel))?;

        let (a, b) = levels(mode);
        // Release before energize.
        let result = if a == PinState::High {
            pair.a.set_state(a).and_then(|()| pair.b.set_state(b))
        } else {
            pair.b.set_state(b).and_then(|()| pair.a.set_state(a))
        };
        result.map_err(|_| fault(FaultKind::GpioWriteFailed))
    }

    fn channel_count(&self) -> u8 {
        self.pairs.len() as u8
    }
}
