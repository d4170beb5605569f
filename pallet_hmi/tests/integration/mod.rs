//! Shared fixtures for the integration tests.

mod lifecycle;
mod publish;
mod run_control;
mod scenarios;

use std::sync::Arc;
use std::time::Duration;

use pallet_common::side::Side;
use pallet_hmi::panel::{Collaborators, Panel, PanelSettings};
use pallet_hmi::publisher::PublishStrategy;
use pallet_hmi::sim::{SimulatedPlc, SimulatedProgramRunner};
use pallet_hmi::state::presence::Presence;

/// A mounted panel plus handles to its simulated collaborators.
pub struct Cell {
    pub panel: Panel,
    pub plc: Arc<SimulatedPlc>,
    pub robot: Arc<SimulatedProgramRunner>,
}

impl Cell {
    pub fn mount(strategy: PublishStrategy) -> Self {
        let plc = Arc::new(SimulatedPlc::default());
        let robot = Arc::new(SimulatedProgramRunner::new());
        let settings = PanelSettings {
            strategy,
            ..PanelSettings::default()
        };
        let panel = Panel::mount(
            settings,
            Collaborators {
                fieldbus: Some(plc.clone()),
                programs: Some(robot.clone()),
            },
        );
        Self { panel, plc, robot }
    }

    /// Drive both presence sensors and wait until the poller reported them.
    pub async fn sense(&self, left: bool, right: bool) {
        self.plc.set_pallet_present(Side::Left, left);
        self.plc.set_pallet_present(Side::Right, right);
        wait_for_presence(&self.panel, Presence::new(left, right)).await;
    }
}

pub async fn wait_for_presence(panel: &Panel, expected: Presence) {
    let mut rx = panel.subscribe_presence();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|p| *p == expected))
        .await
        .expect("poller did not report presence in time")
        .expect("presence channel closed");
}
