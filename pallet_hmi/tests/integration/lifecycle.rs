//! Integration test: presence polling across mount, swap and teardown.

use std::sync::Arc;
use std::time::Duration;

use pallet_common::io::{Direction, RegisterAddress, RegisterKind, RegisterMap};
use pallet_common::side::Side;
use pallet_hmi::panel::{Collaborators, Panel, PanelError, PanelSettings};
use pallet_hmi::publisher::PublishStrategy;
use pallet_hmi::sim::{BoolSpelling, SimulatedPlc};
use pallet_hmi::state::presence::Presence;

use super::{Cell, wait_for_presence};

#[tokio::test(start_paused = true)]
async fn presence_follows_sensor_every_tick() {
    let cell = Cell::mount(PublishStrategy::Registers);
    assert!(cell.panel.is_polling());
    assert_eq!(cell.panel.presence(), Presence::default());

    cell.sense(true, false).await;
    cell.sense(true, true).await;
    cell.sense(false, true).await;
}

#[tokio::test(start_paused = true)]
async fn tolerant_spellings_are_decoded() {
    for spelling in [BoolSpelling::Numeric, BoolSpelling::Word, BoolSpelling::OnOff] {
        let plc = Arc::new(SimulatedPlc::with_spelling(RegisterMap::default(), spelling));
        plc.set_pallet_present(Side::Right, true);
        let panel = Panel::mount(
            PanelSettings::default(),
            Collaborators {
                fieldbus: Some(plc.clone()),
                programs: None,
            },
        );
        wait_for_presence(&panel, Presence::new(false, true)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn unrecognized_literal_reads_as_absent() {
    let cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(true, false).await;

    cell.plc.set_raw(
        RegisterAddress::new(RegisterKind::Bit, 8, Direction::In),
        "yes",
    );
    wait_for_presence(&cell.panel, Presence::new(false, false)).await;
}

#[tokio::test(start_paused = true)]
async fn read_faults_keep_last_presence() {
    let cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(true, true).await;

    cell.plc.set_fail_reads(true);
    cell.plc.set_pallet_present(Side::Left, false);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(cell.panel.presence(), Presence::new(true, true));
    assert!(cell.panel.is_polling(), "poller survives read faults");

    cell.plc.set_fail_reads(false);
    wait_for_presence(&cell.panel, Presence::new(false, true)).await;
}

#[tokio::test(start_paused = true)]
async fn teardown_stops_polling_for_good() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(true, false).await;

    cell.panel.teardown();
    let reads = cell.plc.read_count();
    cell.plc.set_pallet_present(Side::Left, false);
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(cell.plc.read_count(), reads);
    assert_eq!(cell.panel.presence(), Presence::new(true, false));
    assert_eq!(cell.panel.set_config().await, Err(PanelError::TornDown));

    cell.panel.teardown();
    assert!(cell.panel.is_torn_down());
}

#[tokio::test(start_paused = true)]
async fn in_flight_read_is_discarded_after_teardown() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.plc.set_read_delay(Duration::from_millis(200));
    cell.plc.set_pallet_present(Side::Left, true);

    // Let the first tick start its (slow) reads, then tear down mid-read.
    tokio::time::sleep(Duration::from_millis(50)).await;
    cell.panel.teardown();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(cell.panel.presence(), Presence::default());
}

#[tokio::test(start_paused = true)]
async fn replacing_the_fieldbus_supersedes_the_old_poller() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(true, false).await;

    let replacement = Arc::new(SimulatedPlc::default());
    replacement.set_pallet_present(Side::Right, true);
    cell.panel.replace_fieldbus(Some(replacement.clone())).unwrap();
    wait_for_presence(&cell.panel, Presence::new(false, true)).await;

    let old_reads = cell.plc.read_count();
    cell.plc.set_pallet_present(Side::Left, true);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(cell.plc.read_count(), old_reads);
    assert_eq!(cell.panel.presence(), Presence::new(false, true));
    assert!(replacement.read_count() > 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_panel_stops_polling() {
    let cell = Cell::mount(PublishStrategy::Registers);
    let plc = cell.plc.clone();
    drop(cell);

    let reads = plc.read_count();
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(plc.read_count(), reads);
}

#[tokio::test]
async fn mount_without_fieldbus_does_not_poll() {
    let panel = Panel::mount(PanelSettings::default(), Collaborators::default());
    assert!(!panel.is_polling());
    assert_eq!(panel.presence(), Presence::default());
}
