//! Outbound application events.
//!
//! The [`PourCoordinator`](super::coordinator::PourCoordinator) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them — log to serial, update a
//! touchscreen banner, grey out the drink list, etc.

use core::time::Duration;

use crate::drivers::pump::PumpMode;
use crate::engine::FaultSet;
use crate::recipe::Channel;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Drink selection was enabled or disabled on the interactive surface.
    SelectionChanged(bool),

    /// A pour is about to energize its first pump.
    PourStarted { drink: String },

    /// Every pump of the pour is off. `faults` is empty on a clean pour.
    PourFinished {
        drink: String,
        elapsed: Duration,
        faults: FaultSet,
        cancelled: bool,
    },

    /// A manual control-panel command was applied.
    ManualCommand { channel: Channel, mode: PumpMode },

    /// The operator switched to another menu.
    MenuSelected { index: usize, name: String },

    /// The service has started (carries the configured channel count).
    Started { channels: u8 },
}
