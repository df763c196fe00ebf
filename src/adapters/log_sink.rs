//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A touchscreen adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::SelectionChanged(enabled) => {
                info!("SELECT | {}", if *enabled { "enabled" } else { "disabled" });
            }
            AppEvent::PourStarted { drink } => {
                info!("POUR | start | '{}'", drink);
            }
            AppEvent::PourFinished {
                drink,
                elapsed,
                faults,
                cancelled,
            } => {
                info!(
                    "POUR | end | '{}' | {} ms | faults={} | {}",
                    drink,
                    elapsed.as_millis(),
                    faults.len(),
                    if *cancelled { "cancelled" } else { "complete" },
                );
                for fault in faults {
                    warn!("POUR | fault | {}", fault);
                }
            }
            AppEvent::ManualCommand { channel, mode } => {
                info!("MANUAL | pump {} -> {:?}", channel, mode);
            }
            AppEvent::MenuSelected { index, name } => {
                info!("MENU | {} '{}'", index, name);
            }
            AppEvent::Started { channels } => {
                info!("START | pumps={}", channels);
            }
        }
    }
}
