//! Hardware adapter — the relay board behind [`ActuatorDriver`].
//!
//! Claims every relay GPIO listed in [`crate::pins`] as a push-pull
//! output, parks it high (relay released), and hands the pins to a
//! [`RelayBank`]. This is the only module that touches real GPIO.
//!
//! [`ActuatorDriver`]: crate::app::ports::ActuatorDriver

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_sys::EspError;
use log::info;

use crate::drivers::relay::RelayBank;
use crate::pins;

pub type RelayPin = PinDriver<'static, AnyOutputPin, Output>;

/// Build the relay bank with every line released.
pub fn relay_bank() -> Result<RelayBank<RelayPin>, EspError> {
    let mut lines = Vec::with_capacity(pins::RELAY_GPIOS.len());
    for &gpio in &pins::RELAY_GPIOS {
        // SAFETY: each relay GPIO is listed once in RELAY_GPIOS and is
        // claimed only here, during single-threaded startup.
        let pin = unsafe { AnyOutputPin::new(gpio) };
        let mut line = PinDriver::output(pin)?;
        line.set_high()?;
        lines.push(line);
    }
    info!("Hardware: {} relay lines claimed", lines.len());
    Ok(RelayBank::new(lines))
}
