//! Pump modes and the in-memory pump bank.
//!
//! Each pump is a DC motor behind an H-bridge of two relays, so a channel
//! can run forward (dispense), reverse (purge back into the bottle), or
//! be off.
//!
//! ## Dual-target design
//!
//! On ESP-IDF the rig uses [`RelayBank`](super::relay::RelayBank) over real
//! GPIO. On host/test, [`PumpBank`] tracks state in memory only and can
//! be told to fail specific channels.

use crate::app::ports::ActuatorDriver;
use crate::error::{DriverFault, FaultKind};
use crate::recipe::{Channel, MAX_CHANNELS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PumpMode {
    #[default]
    Off,
    Forward,
    Reverse,
}

impl PumpMode {
    pub fn is_running(self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// Maximum transitions kept in the bank's history ring.
const HISTORY_CAP: usize = 64;

/// Simulated pump bank.
pub struct PumpBank {
    modes: [PumpMode; MAX_CHANNELS],
    channel_count: u8,
    /// Bitmask of channels whose next commands fail (bit 0 = channel 1).
    failing: u16,
    history: heapless::Deque<(Channel, PumpMode), HISTORY_CAP>,
}

impl PumpBank {
    pub fn new(channel_count: u8) -> Self {
        Self {
            modes: [PumpMode::Off; MAX_CHANNELS],
            channel_count: channel_count.min(MAX_CHANNELS as u8),
            failing: 0,
            history: heapless::Deque::new(),
        }
    }

    /// Make every command to `channel` fail until cleared.
    pub fn inject_fault(&mut self, channel: Channel) {
        self.failing |= 1 << channel.index();
    }

    pub fn clear_faults(&mut self) {
        self.failing = 0;
    }

    pub fn mode(&self, channel: Channel) -> PumpMode {
        self.modes
            .get(channel.index())
            .copied()
            .unwrap_or(PumpMode::Off)
    }

    pub fn running_count(&self) -> usize {
        self.modes[..self.channel_count as usize]
            .iter()
            .filter(|m| m.is_running())
            .count()
    }

    /// Most recent state changes, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &(Channel, PumpMode)> {
        self.history.iter()
    }

    fn record(&mut self, channel: Channel, mode: PumpMode) {
        if self.history.is_full() {
            self.history.pop_front();
        }
        let _ = self.history.push_back((channel, mode));
    }
}

impl ActuatorDriver for PumpBank {
    fn set_state(&mut self, channel: Channel, mode: PumpMode) -> Result<(), DriverFault> {
        if channel.number() > self.channel_count {
            return Err(DriverFault::new(channel, mode, FaultKind::NoSuchChannel));
        }
        if self.failing & (1 << channel.index()) != 0 {
            return Err(DriverFault::new(channel, mode, FaultKind::Rejected));
        }

        let slot = &mut self.modes[channel.index()];
        if *slot != mode {
            *slot = mode;
            self.record(channel, mode);
        }
        Ok(())
    }

    fn channel_count(&self) -> u8 {
        self.channel_count
    }
}
