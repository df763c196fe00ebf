//! Integration tests for the BarService → coordinator → driver pipeline.
//!
//! These run on the host (x86_64) and verify that the full chain from a
//! console line down to relay commands works without any real hardware.

use std::sync::Arc;

use barbot::adapters::config_source::JsonConfigSource;
use barbot::adapters::console::parse_command;
use barbot::adapters::time::SimClock;
use barbot::app::commands::AppCommand;
use barbot::app::coordinator::PourCoordinator;
use barbot::app::events::AppEvent;
use barbot::app::notifier::shared_sink;
use barbot::app::ports::ConfigPort;
use barbot::app::service::BarService;
use barbot::catalog::Catalog;
use barbot::drivers::pump::PumpMode;
use barbot::error::PourError;

use crate::mock_hw::{MockDriver, RecordingSink, ch, ms};

const MENU_JSON: &str = include_str!("../../menus/Menu.json");
const RIG_JSON: &str = include_str!("../../config/rig.json");

fn make_service() -> (BarService, MockDriver, RecordingSink) {
    let mut config = JsonConfigSource::new(RIG_JSON).load().unwrap();
    config.announce_delay_ms = 0;
    let clock = Arc::new(SimClock::auto());
    let driver = MockDriver::new(config.channel_count, clock.clone());
    let sink = RecordingSink::default();
    let coordinator = PourCoordinator::new(config, driver.clone(), clock, shared_sink(sink.clone()));
    let service = BarService::new(Catalog::from_json(MENU_JSON).unwrap(), coordinator);
    (service, driver, sink)
}

#[test]
fn shipped_menu_recipes_fit_the_rig() {
    let catalog = Catalog::from_json(MENU_JSON).unwrap();
    for (i, menu) in catalog.menus().iter().enumerate() {
        for name in menu.drink_names() {
            assert!(catalog.recipe(i, name, 8).is_ok(), "{}: {}", menu.name, name);
        }
    }
}

#[test]
fn start_releases_pumps_and_enables_selection() {
    let (service, driver, sink) = make_service();
    service.start();

    assert!(driver.running().is_empty());
    assert_eq!(driver.calls().len(), 8);
    let events = sink.events();
    assert!(events.contains(&AppEvent::Started { channels: 8 }));
    assert_eq!(events.last(), Some(&AppEvent::SelectionChanged(true)));
}

#[test]
fn console_pour_runs_the_named_recipe() {
    let (mut service, driver, _sink) = make_service();
    let cmd = parse_command("pour Gin & Tonic").unwrap();
    service.handle_command(cmd).unwrap();
    service.coordinator().wait_idle();

    // [0, 15, 0, 0, 0, 45, 0, 0] at 286 ms per tenth.
    let gin = driver.calls_for(ch(2));
    let tonic = driver.calls_for(ch(6));
    assert_eq!(gin[1].at - gin[0].at, ms(4290));
    assert_eq!(tonic[1].at - tonic[0].at, ms(12870));
    assert!(driver.calls_for(ch(1)).is_empty());
}

#[test]
fn unknown_drink_and_menu_are_reported() {
    let (mut service, driver, _sink) = make_service();
    assert_eq!(
        service.handle_command(AppCommand::Pour("Mojito".into())),
        Err(PourError::UnknownDrink)
    );
    assert_eq!(
        service.handle_command(AppCommand::SelectMenu(9)),
        Err(PourError::UnknownMenu(9))
    );
    assert!(driver.calls().is_empty());
}

#[test]
fn menu_selection_changes_the_drink_list() {
    let (mut service, _driver, sink) = make_service();
    service.handle_command(AppCommand::SelectMenu(1)).unwrap();
    assert_eq!(service.menu_name(), "Zero Proof");
    assert!(sink.events().contains(&AppEvent::MenuSelected {
        index: 1,
        name: "Zero Proof".into()
    }));

    service.handle_command(AppCommand::Pour("Cola".into())).unwrap();
    service.coordinator().wait_idle();
    assert_eq!(service.coordinator().completed_pours(), 1);
}

#[test]
fn second_pour_right_after_the_first_is_debounced() {
    let (mut service, _driver, _sink) = make_service();
    service.handle_command(AppCommand::SelectMenu(1)).unwrap();
    service.handle_command(AppCommand::Pour("Cola".into())).unwrap();
    service.coordinator().wait_idle();

    // Virtual time has not moved since the pour finished.
    let err = service
        .handle_command(AppCommand::Pour("Cola".into()))
        .unwrap_err();
    assert_eq!(err, PourError::DebounceRejected);
    assert!(err.is_silent());
}

#[test]
fn console_manual_commands_reach_the_driver() {
    let (mut service, driver, _sink) = make_service();
    service.handle_command(parse_command("pump 3 fwd").unwrap()).unwrap();
    assert_eq!(driver.mode(ch(3)), PumpMode::Forward);

    service.handle_command(parse_command("all off").unwrap()).unwrap();
    assert!(driver.running().is_empty());

    service.handle_command(parse_command("cancel").unwrap()).unwrap();
}
