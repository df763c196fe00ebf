//! Pour session notifier.
//!
//! One-shot start/end notifications and the "selection enabled" toggle
//! for the display collaborator. Each call emits a single
//! [`AppEvent`] and returns; nothing here is polled.

use std::sync::{Arc, Mutex, PoisonError};

use log::warn;

use super::events::AppEvent;
use super::ports::EventSink;
use crate::engine::PourOutcome;

/// Event sink shared between the request path and the pour worker.
pub type SharedSink = Arc<Mutex<Box<dyn EventSink + Send>>>;

/// Wrap a sink for sharing.
pub fn shared_sink(sink: impl EventSink + Send + 'static) -> SharedSink {
    Arc::new(Mutex::new(Box::new(sink)))
}

#[derive(Clone)]
pub struct SessionNotifier {
    sink: SharedSink,
}

impl SessionNotifier {
    pub fn new(sink: SharedSink) -> Self {
        Self { sink }
    }

    /// Before the first pump is energized.
    pub fn on_start(&self, drink: &str) {
        self.emit(&AppEvent::PourStarted {
            drink: drink.to_owned(),
        });
    }

    /// After every pump of the pour is off. Faults ride along as a warning.
    pub fn on_end(&self, outcome: &PourOutcome) {
        if !outcome.faults.is_empty() {
            warn!(
                "Notifier: '{}' finished with {} pump faults",
                outcome.drink,
                outcome.faults.len()
            );
        }
        self.emit(&AppEvent::PourFinished {
            drink: outcome.drink.clone(),
            elapsed: outcome.elapsed(),
            faults: outcome.faults.clone(),
            cancelled: outcome.cancelled,
        });
    }

    pub fn selection(&self, enabled: bool) {
        self.emit(&AppEvent::SelectionChanged(enabled));
    }

    pub fn emit(&self, event: &AppEvent) {
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(event);
    }
}
