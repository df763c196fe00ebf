//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PourCoordinator / PourEngine (domain)
//! ```
//!
//! Driven adapters (pump drivers, display sinks, clocks, config sources)
//! implement these traits. The domain core never touches GPIO, wall-clock
//! time, or a screen directly.

use core::time::Duration;

use crate::config::RigConfig;
use crate::drivers::pump::PumpMode;
use crate::error::{ConfigError, DriverFault};
use crate::recipe::Channel;

// ───────────────────────────────────────────────────────────────
// Actuator driver (driven adapter: domain → pumps)
// ───────────────────────────────────────────────────────────────

/// Sets one pump channel to forward, reverse, or off.
///
/// Wiring and relay polarity live entirely behind this trait.
/// Implementations must treat `Off` on an already-off channel as a no-op.
pub trait ActuatorDriver {
    /// Drive `channel` into `mode`.
    fn set_state(&mut self, channel: Channel, mode: PumpMode) -> Result<(), DriverFault>;

    /// Number of channels this driver can address.
    fn channel_count(&self) -> u8;
}

impl<T: ActuatorDriver + ?Sized> ActuatorDriver for Box<T> {
    fn set_state(&mut self, channel: Channel, mode: PumpMode) -> Result<(), DriverFault> {
        (**self).set_state(channel, mode)
    }

    fn channel_count(&self) -> u8 {
        (**self).channel_count()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: domain → display / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. The display collaborator implements it to show
/// "now pouring" banners and to gate drink selection.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock (driven adapter: domain ↔ monotonic time)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source shared by the request path and the pour worker.
pub trait Clock: Send + Sync {
    /// Time since an arbitrary fixed origin. Never goes backwards.
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ config document)
// ───────────────────────────────────────────────────────────────

/// Loads rig configuration.
///
/// Implementations MUST call [`RigConfig::validate`] and reject invalid
/// documents with [`ConfigError::ValidationFailed`], not silently clamp.
pub trait ConfigPort {
    fn load(&self) -> Result<RigConfig, ConfigError>;
}
