//! Time adapters.
//!
//! - [`MonotonicClock`] wraps `std::time::Instant`. ESP-IDF backs `Instant`
//!   with `esp_timer_get_time()`, so the same code runs on device and host.
//! - [`SimClock`] is a virtual clock for host-side tests and simulation.
//!   In *auto* mode `sleep` advances virtual time immediately; in *stepped*
//!   mode `sleep` blocks until a test calls [`SimClock::advance`].

use core::time::Duration;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::app::ports::Clock;

/// Wall-clock monotonic time since construction.
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Simulated clock
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimMode {
    Auto,
    Stepped,
}

struct SimState {
    now: Duration,
    /// Threads currently blocked in a stepped `sleep`.
    sleepers: usize,
}

pub struct SimClock {
    mode: SimMode,
    state: Mutex<SimState>,
    changed: Condvar,
}

impl SimClock {
    /// `sleep` returns at once, moving virtual time forward.
    pub fn auto() -> Self {
        Self::with_mode(SimMode::Auto)
    }

    /// `sleep` blocks until [`advance`](Self::advance) reaches its deadline.
    pub fn stepped() -> Self {
        Self::with_mode(SimMode::Stepped)
    }

    fn with_mode(mode: SimMode) -> Self {
        Self {
            mode,
            state: Mutex::new(SimState {
                now: Duration::ZERO,
                sleepers: 0,
            }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move virtual time forward and wake sleepers whose deadline passed.
    pub fn advance(&self, by: Duration) {
        self.lock().now += by;
        self.changed.notify_all();
    }

    /// Jump to absolute time `t`. Earlier values are ignored.
    pub fn advance_to(&self, t: Duration) {
        {
            let mut s = self.lock();
            if t > s.now {
                s.now = t;
            }
        }
        self.changed.notify_all();
    }

    /// Block until at least `count` threads are parked in `sleep`.
    pub fn wait_for_sleepers(&self, count: usize) {
        let mut s = self.lock();
        while s.sleepers < count {
            s = self
                .changed
                .wait(s)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Clock for SimClock {
    fn now(&self) -> Duration {
        self.lock().now
    }

    fn sleep(&self, duration: Duration) {
        match self.mode {
            SimMode::Auto => self.lock().now += duration,
            SimMode::Stepped => {
                let mut s = self.lock();
                let deadline = s.now + duration;
                s.sleepers += 1;
                self.changed.notify_all();
                while s.now < deadline {
                    s = self
                        .changed
                        .wait(s)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                s.sleepers -= 1;
            }
        }
    }
}
