//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (serial
//! console, touchscreen) that the [`BarService`](super::service::BarService)
//! interprets and acts upon.

use crate::drivers::pump::PumpMode;
use crate::recipe::Channel;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Pour a drink from the selected menu by name.
    Pour(String),

    /// Drive one pump directly (control panel).
    Manual { channel: Channel, mode: PumpMode },

    /// Every pump forward (priming lines).
    AllForward,

    /// Every pump in reverse (draining lines back to the bottles).
    AllReverse,

    /// Every pump off. Cancels a pour in progress.
    AllOff,

    /// Stop the pour in progress, if any.
    Cancel,

    /// Switch the drink list to another menu.
    SelectMenu(usize),

    /// Log the available menus.
    ListMenus,
}
