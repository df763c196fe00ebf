//! Pour-request debounce guard.
//!
//! A touchscreen tap can bounce, and an impatient guest taps twice. The
//! guard keeps one timestamp, "last trigger or release", and refuses any
//! request earlier than that timestamp plus the window.
//!
//! The timestamp is stamped twice per pour:
//!
//! ```text
//!   tap ──▶ try_acquire(now) ── stamp ──▶ pour … ──▶ rearm(done) ── stamp
//!            ▲                                                        │
//!            └──────── rejected until done + window ◀─────────────────┘
//! ```
//!
//! so the window effectively runs from the *end* of the previous pour.
//! It is checked only at trigger time.

use core::time::Duration;

#[derive(Debug, Clone)]
pub struct DebounceGuard {
    window: Duration,
    /// `None` until the first accepted request.
    last_event: Option<Duration>,
}

impl DebounceGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_event: None,
        }
    }

    /// Accept and stamp `now`, or reject with no state change.
    ///
    /// A request exactly at `last + window` is accepted.
    pub fn try_acquire(&mut self, now: Duration) -> bool {
        if !self.would_accept(now) {
            return false;
        }
        self.last_event = Some(now);
        true
    }

    /// Whether `try_acquire(now)` would succeed. Does not stamp.
    pub fn would_accept(&self, now: Duration) -> bool {
        match self.last_event {
            Some(last) => now >= last + self.window,
            None => true,
        }
    }

    /// Restart the window at `now` (called when a pour completes).
    pub fn rearm(&mut self, now: Duration) {
        self.last_event = Some(now);
    }

    pub fn last_event(&self) -> Option<Duration> {
        self.last_event
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
