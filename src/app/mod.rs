//! Application core — pour admission and sequencing, zero direct I/O.
//!
//! This module contains the business rules for the dispenser: request
//! admission, the pour worker lifecycle, manual overrides, and command
//! dispatch. All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod commands;
pub mod coordinator;
pub mod events;
pub mod notifier;
pub mod ports;
pub mod service;
