//! Barbot Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RelayBank         LogEventSink   JsonConfigSource             │
//! │  (ActuatorDriver)  (EventSink)    (ConfigPort)                 │
//! │  MonotonicClock    console::parse_command                      │
//! │  (Clock)           (serial command input)                      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   BarService ─▶ PourCoordinator ─▶ pour worker         │    │
//! │  │   Catalog        DebounceGuard       PourEngine        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::{self, BufRead};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};

use barbot::adapters::config_source::JsonConfigSource;
use barbot::adapters::console::{ParseError, parse_command};
use barbot::adapters::hardware;
use barbot::adapters::log_sink::LogEventSink;
use barbot::adapters::time::MonotonicClock;
use barbot::app::coordinator::PourCoordinator;
use barbot::app::notifier::shared_sink;
use barbot::app::ports::ConfigPort;
use barbot::app::service::BarService;
use barbot::catalog::Catalog;
use barbot::config::RigConfig;
use barbot::pins;

const RIG_CONFIG: &str = include_str!("../config/rig.json");
const MENU_JSON: &str = include_str!("../menus/Menu.json");

/// Idle wait between console reads when no input is pending.
const CONSOLE_POLL: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Barbot v{}                          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Relays released before anything else ──────────────
    let mut relays = hardware::relay_bank()?;
    if let Err(e) = relays.all_off() {
        warn!("Startup relay release incomplete: {}", e);
    }

    // ── 3. Config + catalog ───────────────────────────────────
    let config = JsonConfigSource::new(RIG_CONFIG)
        .load()
        .unwrap_or_else(|e| {
            warn!("Config load failed ({}), using defaults", e);
            RigConfig::default()
        });
    anyhow::ensure!(
        usize::from(config.channel_count) <= pins::RELAY_PUMPS,
        "config wants {} pumps, relay board has {}",
        config.channel_count,
        pins::RELAY_PUMPS
    );
    let catalog = Catalog::from_json(MENU_JSON)?;

    // ── 4. Wire the core ──────────────────────────────────────
    let coordinator = PourCoordinator::new(
        config,
        relays,
        Arc::new(MonotonicClock::new()),
        shared_sink(LogEventSink::new()),
    );
    let mut service = BarService::new(catalog, coordinator);
    service.start();

    // ── 5. Serial console loop ────────────────────────────────
    info!("Console ready. Commands: pour <drink> | pump <n> fwd|rev|off | all fwd|rev|off | cancel | menu <i> | menus");
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        match stdin.lock().read_line(&mut line) {
            Ok(0) => std::thread::sleep(CONSOLE_POLL),
            Ok(_) if !line.ends_with('\n') => {}
            Ok(_) => {
                dispatch(&mut service, &line);
                line.clear();
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => std::thread::sleep(CONSOLE_POLL),
            Err(e) => {
                warn!("Console read error: {}", e);
                line.clear();
                std::thread::sleep(CONSOLE_POLL);
            }
        }
    }
}

fn dispatch(service: &mut BarService, line: &str) {
    match parse_command(line) {
        Ok(cmd) => {
            if let Err(e) = service.handle_command(cmd) {
                if e.is_silent() {
                    debug!("Console: ignored ({})", e);
                } else {
                    warn!("Console: {}", e);
                }
            }
        }
        Err(ParseError::Empty) => {}
        Err(e) => warn!("Console: {} in '{}'", e, line.trim()),
    }
}
