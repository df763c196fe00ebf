//! Pour coordinator — the one place pour requests are admitted.
//!
//! ```text
//!   request ──▶ validate ──▶ session active? ──▶ debounce ──▶ accept
//!                  │              │ SessionBusy     │ DebounceRejected
//!                  ▼              ▼                 ▼
//!             InvalidRecipe   (no side effects on any rejection)
//!
//!   accept ──▶ selection off ──▶ spawn worker ──▶ [announce delay]
//!                                                   │
//!          ┌────────────────────────────────────────┘
//!          ▼
//!   PourEngine::pour ──▶ rearm debounce ──▶ onEnd ──▶ selection on ──▶ idle
//! ```
//!
//! At most one session is alive. The session slot and the debounce guard
//! share one mutex, so the busy check, the guard check, and the stamp are
//! a single atomic step. The actuator driver sits behind its own mutex
//! and is locked per command, which lets an operator "all off" reach the
//! relays while a pour worker is running.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use log::{debug, error, info, warn};

use super::events::AppEvent;
use super::notifier::{SessionNotifier, SharedSink};
use super::ports::{ActuatorDriver, Clock};
use crate::config::RigConfig;
use crate::debounce::DebounceGuard;
use crate::drivers::pump::PumpMode;
use crate::drivers::task_pin::{Core, POUR_WORKER_PRIORITY, spawn_on_core};
use crate::engine::{PourEngine, PourOutcome};
use crate::error::{DriverFault, PourError, RecipeError, Result};
use crate::recipe::{Channel, Recipe};
use crate::safety;
use crate::session::PourSession;

type SharedDriver = Mutex<Box<dyn ActuatorDriver + Send>>;

struct ActiveSession {
    id: u32,
    drink: String,
    cancel: Arc<AtomicBool>,
}

struct CoordState {
    active: Option<ActiveSession>,
    guard: DebounceGuard,
    next_id: u32,
    completed: u32,
}

struct Shared {
    config: RigConfig,
    clock: Arc<dyn Clock>,
    driver: SharedDriver,
    notifier: SessionNotifier,
    state: Mutex<CoordState>,
    idle: Condvar,
}

/// Locks the shared driver for each command instead of for the whole pour.
struct LockedDriver<'a>(&'a SharedDriver);

impl ActuatorDriver for LockedDriver<'_> {
    fn set_state(&mut self, channel: Channel, mode: PumpMode) -> core::result::Result<(), DriverFault> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_state(channel, mode)
    }

    fn channel_count(&self) -> u8 {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .channel_count()
    }
}

/// Handle to an accepted pour.
pub struct PourHandle {
    id: u32,
    drink: String,
    worker: JoinHandle<PourOutcome>,
}

impl PourHandle {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn drink(&self) -> &str {
        &self.drink
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker. `None` only if the worker thread itself died.
    pub fn join(self) -> Option<PourOutcome> {
        self.worker.join().ok()
    }
}

#[derive(Clone)]
pub struct PourCoordinator {
    shared: Arc<Shared>,
}

impl PourCoordinator {
    pub fn new(
        config: RigConfig,
        driver: impl ActuatorDriver + Send + 'static,
        clock: Arc<dyn Clock>,
        sink: SharedSink,
    ) -> Self {
        if driver.channel_count() < config.channel_count {
            warn!(
                "Coordinator: driver has {} channels, config expects {}",
                driver.channel_count(),
                config.channel_count
            );
        }
        let guard = DebounceGuard::new(config.debounce_window());
        Self {
            shared: Arc::new(Shared {
                config,
                clock,
                driver: Mutex::new(Box::new(driver)),
                notifier: SessionNotifier::new(sink),
                state: Mutex::new(CoordState {
                    active: None,
                    guard,
                    next_id: 1,
                    completed: 0,
                }),
                idle: Condvar::new(),
            }),
        }
    }

    pub fn config(&self) -> &RigConfig {
        &self.shared.config
    }

    pub fn notifier(&self) -> &SessionNotifier {
        &self.shared.notifier
    }

    // ── Pour requests ─────────────────────────────────────────

    /// Validate `quantities` and request a pour.
    pub fn request(&self, drink: &str, quantities: &[f32], scale: f32) -> Result<PourHandle> {
        let recipe = Recipe::new(quantities, self.shared.config.channel_count)?;
        self.request_recipe(drink, recipe, scale)
    }

    /// Request a pour of an already-validated recipe.
    ///
    /// Any `Err` leaves the pumps, the debounce stamp, and the selection
    /// state exactly as they were.
    pub fn request_recipe(&self, drink: &str, recipe: Recipe, scale: f32) -> Result<PourHandle> {
        let cfg = &self.shared.config;
        if recipe.len() != cfg.channel_count as usize {
            return Err(RecipeError::WrongLength {
                expected: cfg.channel_count,
                actual: recipe.len(),
            }
            .into());
        }
        let session = PourSession::new(drink, recipe, scale, cfg.pour_rate_ms)?;

        // ── Admission: busy check + debounce, one critical section ──
        let (id, cancel, previous_guard) = {
            let mut state = self.shared.lock_state();
            if let Some(active) = &state.active {
                debug!("Coordinator: '{}' dropped, '{}' still pouring", drink, active.drink);
                return Err(PourError::SessionBusy);
            }
            let previous_guard = state.guard.clone();
            let now = self.shared.clock.now();
            if !state.guard.try_acquire(now) {
                debug!("Coordinator: '{}' debounced at {} ms", drink, now.as_millis());
                return Err(PourError::DebounceRejected);
            }
            let id = state.next_id;
            state.next_id = state.next_id.wrapping_add(1);
            let cancel = Arc::new(AtomicBool::new(false));
            state.active = Some(ActiveSession {
                id,
                drink: drink.to_owned(),
                cancel: Arc::clone(&cancel),
            });
            (id, cancel, previous_guard)
        };

        info!("Coordinator: accepted '{}' (session {})", drink, id);
        self.shared.notifier.selection(false);

        let shared = Arc::clone(&self.shared);
        let spawned = spawn_on_core(
            Core::App,
            POUR_WORKER_PRIORITY,
            cfg.worker_stack_kb,
            "pour\0",
            move || shared.run_session(id, session, &cancel),
        );

        match spawned {
            Ok(worker) => Ok(PourHandle {
                id,
                drink: drink.to_owned(),
                worker,
            }),
            Err(e) => {
                error!("Coordinator: pour worker spawn failed: {e}");
                {
                    let mut state = self.shared.lock_state();
                    state.guard = previous_guard;
                    state.active = None;
                }
                self.shared.notifier.selection(true);
                self.shared.idle.notify_all();
                Err(PourError::SpawnFailed)
            }
        }
    }

    // ── Session queries ───────────────────────────────────────

    pub fn is_busy(&self) -> bool {
        self.shared.lock_state().active.is_some()
    }

    pub fn active_drink(&self) -> Option<String> {
        self.shared
            .lock_state()
            .active
            .as_ref()
            .map(|a| a.drink.clone())
    }

    /// Number of pours that have run to completion (clean, faulted or
    /// cancelled).
    pub fn completed_pours(&self) -> u32 {
        self.shared.lock_state().completed
    }

    /// Block until no session is active.
    pub fn wait_idle(&self) {
        let mut state = self.shared.lock_state();
        while state.active.is_some() {
            state = self
                .shared
                .idle
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Ask the active session to stop. Returns `false` when idle.
    pub fn cancel(&self) -> bool {
        let state = self.shared.lock_state();
        match &state.active {
            Some(active) => {
                info!("Coordinator: cancelling '{}'", active.drink);
                active.cancel.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }

    // ── Manual control panel ──────────────────────────────────

    /// Drive one pump directly. Blocked while a pour is running.
    pub fn manual(&self, channel: Channel, mode: PumpMode) -> Result<()> {
        let state = self.shared.lock_state();
        if state.active.is_some() {
            return Err(PourError::ManualBlocked);
        }
        self.shared.lock_driver().set_state(channel, mode)?;
        drop(state);

        info!("Coordinator: manual {} -> {:?}", channel, mode);
        self.shared
            .notifier
            .emit(&AppEvent::ManualCommand { channel, mode });
        Ok(())
    }

    pub fn all_forward(&self) -> Result<()> {
        self.sweep(PumpMode::Forward)
    }

    pub fn all_reverse(&self) -> Result<()> {
        self.sweep(PumpMode::Reverse)
    }

    /// Stop every pump. Cancels an active pour instead of being blocked.
    pub fn all_off(&self) -> Result<()> {
        let count = self.shared.config.channel_count;
        let state = self.shared.lock_state();
        if let Some(active) = &state.active {
            info!("Coordinator: all off, cancelling '{}'", active.drink);
            active.cancel.store(true, Ordering::Release);
        }
        let faults = safety::shutoff_all(&mut LockedDriver(&self.shared.driver), count);
        drop(state);

        for channel in Channel::all(count) {
            self.shared.notifier.emit(&AppEvent::ManualCommand {
                channel,
                mode: PumpMode::Off,
            });
        }
        faults.first().map_or(Ok(()), |f| Err(PourError::Driver(*f)))
    }

    /// All off, settle, then every channel in `mode`.
    fn sweep(&self, mode: PumpMode) -> Result<()> {
        let count = self.shared.config.channel_count;
        let state = self.shared.lock_state();
        if state.active.is_some() {
            return Err(PourError::ManualBlocked);
        }

        let faults = safety::shutoff_all(&mut LockedDriver(&self.shared.driver), count);
        if let Some(f) = faults.first() {
            return Err(PourError::Driver(*f));
        }
        self.shared.clock.sleep(self.shared.config.reverse_settle());

        let mut first_fault = None;
        {
            let mut driver = self.shared.lock_driver();
            for channel in Channel::all(count) {
                if let Err(f) = driver.set_state(channel, mode) {
                    warn!("Coordinator: {}", f);
                    first_fault.get_or_insert(f);
                }
            }
        }
        drop(state);

        info!("Coordinator: all {} pumps -> {:?}", count, mode);
        for channel in Channel::all(count) {
            self.shared
                .notifier
                .emit(&AppEvent::ManualCommand { channel, mode });
        }
        first_fault.map_or(Ok(()), |f| Err(PourError::Driver(f)))
    }
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, CoordState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_driver(&self) -> MutexGuard<'_, Box<dyn ActuatorDriver + Send>> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Worker body. Never unwinds past this frame.
    fn run_session(&self, id: u32, mut session: PourSession, cancel: &AtomicBool) -> PourOutcome {
        let delay = self.config.announce_delay();
        if delay > Duration::ZERO {
            self.clock.sleep(delay);
        }

        if cancel.load(Ordering::Acquire) {
            info!("Coordinator: '{}' cancelled during announce delay", session.drink());
            let mut outcome = PourOutcome::new(session.drink(), self.clock.now());
            outcome.cancelled = true;
            self.finish(id, &outcome);
            return outcome;
        }

        let poured = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut driver = LockedDriver(&self.driver);
            PourEngine::new(&mut driver, &*self.clock, self.config.poll_tick())
                .with_notifier(&self.notifier)
                .with_cancel(cancel)
                .pour(&mut session)
        }));

        let outcome = poured.unwrap_or_else(|_| {
            error!("Coordinator: pour worker panicked, forcing all pumps off");
            let started = session.started_at().unwrap_or_else(|| self.clock.now());
            let mut outcome = PourOutcome::new(session.drink(), started);
            let mut driver = LockedDriver(&self.driver);
            for fault in safety::shutoff_all(&mut driver, self.config.channel_count) {
                outcome.record_fault(fault);
            }
            outcome.cancelled = true;
            outcome.finished_at = self.clock.now();
            outcome
        });

        self.finish(id, &outcome);
        outcome
    }

    fn finish(&self, id: u32, outcome: &PourOutcome) {
        self.lock_state().guard.rearm(self.clock.now());
        self.notifier.on_end(outcome);
        self.notifier.selection(true);
        {
            let mut state = self.lock_state();
            if state.active.as_ref().is_some_and(|a| a.id == id) {
                state.active = None;
            }
            state.completed = state.completed.wrapping_add(1);
        }
        self.idle.notify_all();
        debug!("Coordinator: session {} closed", id);
    }
}
