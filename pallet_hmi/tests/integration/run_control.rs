//! Integration test: run control and the configuration lock.

use pallet_common::bus::StopKind;
use pallet_common::side::Side;
use pallet_hmi::event_log::Severity;
use pallet_hmi::interlock::{Control, PauseToggle};
use pallet_hmi::panel::PanelError;
use pallet_hmi::publisher::PublishStrategy;
use pallet_hmi::sim::{Operation, ProgramCall};
use pallet_hmi::state::run::RunState;

use super::Cell;

async fn running_cell() -> Cell {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(true, false).await;
    cell.panel.set_config().await.unwrap();
    cell.panel.start().unwrap();
    cell
}

#[tokio::test]
async fn configuration_locked_while_running() {
    let mut cell = running_cell().await;
    let before = cell.panel.config().clone();

    assert_eq!(
        cell.panel.set_layer(Side::Left, 5),
        Err(PanelError::Interlocked(Control::EditLayer(Side::Left)))
    );
    assert!(cell.panel.set_slot(Side::Right, 3).is_err());
    assert!(cell.panel.set_enabled(Side::Right, true).is_err());
    assert!(cell.panel.toggle(Side::Left).is_err());
    assert!(cell.panel.commit_layer_text(Side::Left, "4").is_err());
    assert!(cell.panel.reset(Side::Left).is_err());
    assert_eq!(cell.panel.config(), &before);

    cell.panel.pause().await.unwrap();
    assert!(cell.panel.set_slot(Side::Left, 2).is_err());
    assert_eq!(cell.panel.config(), &before);
    assert!(cell.panel.go_home().await.is_err());
}

#[tokio::test]
async fn shared_pause_button_flips_label() {
    let mut cell = running_cell().await;
    let controls = cell.panel.controls();
    assert_eq!(controls.pause_toggle, PauseToggle::Pause);
    assert!(controls.pause_toggle_enabled());

    assert_eq!(cell.panel.pause_or_continue().await, Ok(RunState::Paused));
    let controls = cell.panel.controls();
    assert_eq!(controls.pause_toggle, PauseToggle::Continue);
    assert!(controls.resume && !controls.pause && controls.stop);

    assert_eq!(cell.panel.pause_or_continue().await, Ok(RunState::Running));
    assert_eq!(
        cell.robot.calls()[1..],
        [ProgramCall::Pause, ProgramCall::Resume]
    );
}

#[tokio::test]
async fn stop_from_paused_reopens_editing() {
    let mut cell = running_cell().await;
    cell.panel.pause().await.unwrap();
    assert_eq!(cell.panel.stop().await, Ok(RunState::Idle));
    assert_eq!(cell.robot.calls().last(), Some(&ProgramCall::Stop(StopKind::Quick)));

    assert!(cell.panel.controls().edit);
    cell.panel.set_layer(Side::Left, 2).unwrap();
    assert!(!cell.panel.config().config_sent());
}

#[tokio::test]
async fn robot_failures_keep_run_state() {
    let mut cell = running_cell().await;

    cell.robot.set_failing(Operation::Pause, true);
    assert!(matches!(cell.panel.pause().await, Err(PanelError::Run(_))));
    assert_eq!(cell.panel.run_state(), RunState::Running);

    cell.robot.set_failing(Operation::Stop, true);
    assert!(cell.panel.stop().await.is_err());
    assert_eq!(cell.panel.run_state(), RunState::Running);
    assert_eq!(cell.panel.event_log().count(Severity::Error), 2);

    cell.robot.set_failing(Operation::Stop, false);
    assert_eq!(cell.panel.stop().await, Ok(RunState::Idle));
}

#[tokio::test]
async fn failed_launch_stays_idle() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(true, false).await;
    cell.panel.set_config().await.unwrap();
    cell.robot.set_failing(Operation::Start, true);

    assert!(cell.panel.start().is_err());
    assert_eq!(cell.panel.run_state(), RunState::Idle);
    assert!(cell.panel.controls().start, "operator may retry");
}

#[tokio::test]
async fn go_home_forwards_request_and_logs() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.panel.go_home().await.unwrap();

    assert_eq!(cell.robot.calls(), vec![ProgramCall::Home]);
    assert_eq!(cell.panel.run_state(), RunState::Idle);
    let latest = cell.panel.event_log().latest().unwrap();
    assert_eq!(latest.severity, Severity::Info);
    assert!(latest.message.contains("home"));
}
