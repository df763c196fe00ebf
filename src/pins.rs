//! GPIO pin assignments for the barbot relay board.
//!
//! Single source of truth. Every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Pump relays (two per pump, active-low)
// ---------------------------------------------------------------------------

/// Relay lines in wiring order: `[p1a, p1b, p2a, p2b, ...]`.
///
/// Line `a` pulled low runs the pump forward, line `b` pulled low runs it
/// in reverse. Both high is off.
pub const RELAY_GPIOS: [i32; 16] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17];

/// Pumps the relay board can drive.
pub const RELAY_PUMPS: usize = RELAY_GPIOS.len() / 2;
