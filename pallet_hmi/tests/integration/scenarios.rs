//! Integration test: operator workflows from mount to stop.

use pallet_common::side::Side;
use pallet_hmi::event_log::Severity;
use pallet_hmi::interlock::Control;
use pallet_hmi::panel::PanelError;
use pallet_hmi::publisher::PublishStrategy;
use pallet_hmi::sim::ProgramCall;
use pallet_hmi::state::config::SelectedSide;
use pallet_hmi::state::run::RunState;

use super::Cell;

#[tokio::test]
async fn happy_path_publish_start_stop() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(true, false).await;

    let snap = cell.panel.snapshot();
    assert_eq!(snap.selected_side, SelectedSide::Left);
    assert!(snap.config_valid);
    assert!(snap.controls.set_config);
    assert!(!snap.controls.start);

    cell.panel.set_config().await.unwrap();
    assert!(cell.panel.config().config_sent());
    let controls = cell.panel.controls();
    assert!(!controls.set_config);
    assert!(controls.start);

    assert_eq!(cell.panel.start().unwrap(), RunState::Running);
    let controls = cell.panel.controls();
    assert!(controls.pause && controls.stop);
    assert!(!controls.edit && !controls.go_home && !controls.start);

    assert_eq!(cell.panel.stop().await.unwrap(), RunState::Idle);
    assert!(cell.panel.config().config_sent(), "stop keeps config-sent");
    assert!(cell.panel.controls().start);

    assert_eq!(
        cell.robot.calls(),
        vec![
            ProgramCall::Start {
                program: "palletizing.drl".into(),
                args: vec![],
            },
            ProgramCall::Stop(Default::default()),
        ]
    );
    assert_eq!(cell.panel.event_log().count(Severity::Error), 0);
}

#[tokio::test]
async fn presence_interlock_blocks_start() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(false, true).await;

    for (layer, slot) in [(1, 1), (5, 5), (9, 9)] {
        cell.panel.set_layer(Side::Left, layer).unwrap();
        cell.panel.set_slot(Side::Left, slot).unwrap();
        let snap = cell.panel.snapshot();
        assert!(!snap.config_valid);
        assert!(!snap.controls.set_config);
        assert!(!snap.controls.start);
    }

    assert_eq!(
        cell.panel.set_config().await,
        Err(PanelError::Interlocked(Control::SetConfig))
    );
    assert_eq!(
        cell.panel.start(),
        Err(PanelError::Interlocked(Control::Start))
    );
    assert!(cell.plc.writes().is_empty());
    assert!(cell.robot.calls().is_empty());
}

#[tokio::test]
async fn switching_to_the_loaded_side_restores_validity() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(false, true).await;
    assert!(!cell.panel.config_valid());

    cell.panel.set_enabled(Side::Left, false).unwrap();
    assert!(!cell.panel.config_valid(), "no side selected");

    cell.panel.toggle(Side::Right).unwrap();
    assert_eq!(cell.panel.snapshot().selected_side, SelectedSide::Right);
    assert!(cell.panel.config_valid());
}

#[tokio::test]
async fn edit_after_publish_requires_republish() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(true, true).await;
    cell.panel.set_config().await.unwrap();
    assert!(cell.panel.controls().start);

    cell.panel.set_layer(Side::Left, 4).unwrap();
    assert!(!cell.panel.config().config_sent());
    assert!(!cell.panel.controls().start);
    assert!(cell.panel.controls().set_config);

    cell.panel.set_config().await.unwrap();
    assert!(cell.panel.controls().start);
}

#[tokio::test]
async fn same_value_edit_still_clears_sent() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(true, false).await;
    cell.panel.set_config().await.unwrap();

    cell.panel.set_slot(Side::Left, 1).unwrap();
    assert!(!cell.panel.config().config_sent());

    cell.panel.set_config().await.unwrap();
    cell.panel.reset(Side::Right).unwrap();
    assert!(!cell.panel.config().config_sent());
}

#[tokio::test]
async fn losing_a_pallet_after_publish_disables_start() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(true, false).await;
    cell.panel.set_config().await.unwrap();
    assert!(cell.panel.controls().start);

    cell.sense(false, false).await;
    assert!(cell.panel.config().config_sent());
    assert!(!cell.panel.controls().start);
    assert_eq!(
        cell.panel.start(),
        Err(PanelError::Interlocked(Control::Start))
    );
}
