//! Integration test: delivering the configuration to the PLC.

use std::collections::HashSet;

use pallet_common::bus::BusError;
use pallet_common::io::{RegisterKind, Signal};
use pallet_common::side::Side;
use pallet_hmi::event_log::Severity;
use pallet_hmi::panel::PanelError;
use pallet_hmi::publisher::{PublishError, PublishStrategy};
use pallet_hmi::sim::{Operation, ProgramCall};

use super::Cell;

async fn both_sides_loaded(strategy: PublishStrategy) -> Cell {
    let mut cell = Cell::mount(strategy);
    cell.sense(true, true).await;
    let panel = &mut cell.panel;
    panel.set_enabled(Side::Right, true).unwrap();
    panel.set_layer(Side::Left, 3).unwrap();
    panel.set_slot(Side::Left, 5).unwrap();
    panel.set_layer(Side::Right, 2).unwrap();
    panel.set_slot(Side::Right, 7).unwrap();
    cell
}

#[tokio::test]
async fn both_sides_write_exact_registers() {
    let mut cell = both_sides_loaded(PublishStrategy::Registers).await;
    cell.panel.set_config().await.unwrap();

    let writes = cell.plc.writes();
    assert_eq!(writes.len(), 7);
    let written: HashSet<_> = writes.into_iter().collect();
    let expected: HashSet<(RegisterKind, u16, String)> = [
        (RegisterKind::Bit, 0, "1"),
        (RegisterKind::Bit, 1, "1"),
        (RegisterKind::Int, 0, "2"),
        (RegisterKind::Int, 1, "3"),
        (RegisterKind::Int, 2, "5"),
        (RegisterKind::Int, 3, "2"),
        (RegisterKind::Int, 4, "7"),
    ]
    .into_iter()
    .map(|(kind, index, value)| (kind, index, value.to_string()))
    .collect();
    assert_eq!(written, expected);
    assert!(cell.panel.config().config_sent());

    let latest = cell.panel.event_log().latest().unwrap();
    assert_eq!(latest.severity, Severity::Info);
    assert!(latest.message.contains("side=2"));
}

#[tokio::test]
async fn one_rejected_write_fails_the_publish() {
    let mut cell = both_sides_loaded(PublishStrategy::Registers).await;
    cell.plc.set_failing_write(RegisterKind::Int, 3, true);
    let errors_before = cell.panel.event_log().count(Severity::Error);

    let err = cell.panel.set_config().await.unwrap_err();
    assert!(matches!(
        err,
        PanelError::Publish(PublishError::Write(BusError::WriteFailed { index: 3, .. }))
    ));
    assert!(!cell.panel.config().config_sent());
    assert_eq!(
        cell.panel.event_log().count(Severity::Error),
        errors_before + 1
    );
    assert!(!cell.panel.controls().start);
    assert!(cell.panel.controls().set_config, "operator may retry");

    cell.plc.set_failing_write(RegisterKind::Int, 3, false);
    cell.panel.set_config().await.unwrap();
    assert!(cell.panel.config().config_sent());
    assert_eq!(cell.plc.signal_output(Signal::RightLayer).as_deref(), Some("2"));
}

#[tokio::test]
async fn republish_overwrites_all_registers() {
    let mut cell = both_sides_loaded(PublishStrategy::Registers).await;
    cell.panel.set_config().await.unwrap();
    cell.panel.set_enabled(Side::Right, false).unwrap();
    cell.panel.set_config().await.unwrap();

    assert_eq!(cell.plc.writes().len(), 14);
    assert_eq!(cell.plc.signal_output(Signal::RightEnabled).as_deref(), Some("0"));
    assert_eq!(cell.plc.signal_output(Signal::SideCode).as_deref(), Some("0"));
    // Disabled side still carries its stored target.
    assert_eq!(cell.plc.signal_output(Signal::RightSlot).as_deref(), Some("7"));
}

#[tokio::test]
async fn program_strategy_passes_ordered_arguments() {
    let mut cell = both_sides_loaded(PublishStrategy::Program).await;
    cell.panel.set_config().await.unwrap();

    assert!(cell.plc.writes().is_empty());
    assert_eq!(
        cell.robot.calls(),
        vec![ProgramCall::Start {
            program: "set_config.drl".into(),
            args: ["1", "1", "2", "3", "5", "2", "7"]
                .map(String::from)
                .to_vec(),
        }]
    );
    assert!(cell.panel.config().config_sent());
}

#[tokio::test]
async fn program_strategy_launch_failure() {
    let mut cell = both_sides_loaded(PublishStrategy::Program).await;
    cell.robot.set_failing(Operation::Start, true);

    assert!(matches!(
        cell.panel.set_config().await,
        Err(PanelError::Publish(PublishError::Program(_)))
    ));
    assert!(!cell.panel.config().config_sent());
    assert_eq!(cell.panel.event_log().count(Severity::Error), 1);
}

#[tokio::test]
async fn register_publish_without_fieldbus_is_inert() {
    let mut cell = Cell::mount(PublishStrategy::Registers);
    cell.sense(true, false).await;
    cell.panel.replace_fieldbus(None).unwrap();

    assert_eq!(
        cell.panel.set_config().await,
        Err(PanelError::Publish(PublishError::FieldbusUnavailable))
    );
    assert!(!cell.panel.config().config_sent());
    assert_eq!(cell.panel.event_log().count(Severity::Error), 1);
}
