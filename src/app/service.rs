//! Application service — the hexagonal core.
//!
//! [`BarService`] owns the drink catalog, the selected menu, and the
//! [`PourCoordinator`]. It maps [`AppCommand`]s from any surface onto
//! coordinator calls and keeps no pump state of its own.
//!
//! ```text
//!  console / touch ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                      │       BarService        │
//!   ActuatorDriver ◀── │  Catalog · Coordinator  │
//!                      └────────────────────────┘
//! ```

use log::{info, warn};

use crate::catalog::Catalog;
use crate::error::Result;

use super::commands::AppCommand;
use super::coordinator::PourCoordinator;
use super::events::AppEvent;

pub struct BarService {
    catalog: Catalog,
    coordinator: PourCoordinator,
    menu: usize,
}

impl BarService {
    /// Construct the service with the first menu selected.
    pub fn new(catalog: Catalog, coordinator: PourCoordinator) -> Self {
        Self {
            catalog,
            coordinator,
            menu: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every pump off and announce readiness.
    pub fn start(&self) {
        if let Err(e) = self.coordinator.all_off() {
            warn!("BarService: startup shutoff incomplete: {}", e);
        }
        let channels = self.coordinator.config().channel_count;
        self.coordinator
            .notifier()
            .emit(&AppEvent::Started { channels });
        self.coordinator.notifier().selection(true);
        info!(
            "BarService started: {} pumps, menu '{}'",
            channels,
            self.menu_name()
        );
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (serial console, touchscreen, ...).
    pub fn handle_command(&mut self, cmd: AppCommand) -> Result<()> {
        match cmd {
            AppCommand::Pour(drink) => {
                let count = self.coordinator.config().channel_count;
                let recipe = self.catalog.recipe(self.menu, &drink, count)?;
                let scale = self.coordinator.config().scale_factor;
                self.coordinator.request_recipe(&drink, recipe, scale)?;
            }
            AppCommand::Manual { channel, mode } => self.coordinator.manual(channel, mode)?,
            AppCommand::AllForward => self.coordinator.all_forward()?,
            AppCommand::AllReverse => self.coordinator.all_reverse()?,
            AppCommand::AllOff => self.coordinator.all_off()?,
            AppCommand::Cancel => {
                if !self.coordinator.cancel() {
                    info!("BarService: nothing to cancel");
                }
            }
            AppCommand::SelectMenu(index) => {
                let name = self.catalog.menu(index)?.name.clone();
                self.menu = index;
                info!("BarService: menu {} '{}'", index, name);
                self.coordinator
                    .notifier()
                    .emit(&AppEvent::MenuSelected { index, name });
            }
            AppCommand::ListMenus => {
                for (i, menu) in self.catalog.menus().iter().enumerate() {
                    let marker = if i == self.menu { '*' } else { ' ' };
                    info!("MENU {}{} | {} | bottles: {}", marker, i, menu.name, menu.bottles);
                    for name in menu.drink_names() {
                        info!("       - {}", name);
                    }
                }
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn menu_index(&self) -> usize {
        self.menu
    }

    pub fn menu_name(&self) -> &str {
        self.catalog
            .menu(self.menu)
            .map(|m| m.name.as_str())
            .unwrap_or_default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn coordinator(&self) -> &PourCoordinator {
        &self.coordinator
    }
}
