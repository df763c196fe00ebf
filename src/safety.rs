//! Safety shutoff.
//!
//! The one guarantee the rig must always keep: no pump is left energized
//! when nothing is supposed to be pouring. [`shutoff_all`] is run
//!
//! 1. at boot, before the first request is accepted;
//! 2. when a pour worker panics, before the session is torn down;
//! 3. on an operator "all off" with no pour in progress.
//!
//! Every channel is attempted even if earlier ones fail, so a single
//! stuck relay cannot keep the others running.

use log::{error, info};

use crate::app::ports::ActuatorDriver;
use crate::drivers::pump::PumpMode;
use crate::engine::FaultSet;
use crate::recipe::Channel;

/// Drive channels `1..=channel_count` OFF, collecting every fault.
pub fn shutoff_all(driver: &mut dyn ActuatorDriver, channel_count: u8) -> FaultSet {
    let mut faults = FaultSet::new();
    for channel in Channel::all(channel_count) {
        if let Err(fault) = driver.set_state(channel, PumpMode::Off) {
            error!("SAFETY SHUTOFF FAILED: {fault}");
            let _ = faults.push(fault);
        }
    }
    if faults.is_empty() {
        info!("Safety: all {} pumps off", channel_count);
    }
    faults
}
