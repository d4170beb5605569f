//! Config Publisher: push the operator configuration to the PLC.
//!
//! The configuration travels as seven values, always in this order:
//!
//! | # | Value | Encoding | Register |
//! |---|-------|----------|----------|
//! | 1 | left enabled | `1`/`0` | BIT0 |
//! | 2 | right enabled | `1`/`0` | BIT1 |
//! | 3 | side code (L=0, R=1, both=2) | decimal | INT0 |
//! | 4 | left layer | decimal | INT1 |
//! | 5 | left slot | decimal | INT2 |
//! | 6 | right layer | decimal | INT3 |
//! | 7 | right slot | decimal | INT4 |
//!
//! Two delivery strategies:
//! - **registers**: seven concurrent register writes; any failure fails the
//!   publish. Writes that already landed stay landed until the next
//!   successful publish overwrites all seven.
//! - **program**: the values are handed as ordered string arguments to a
//!   configuration program launched through Program Control. Launch is
//!   fire-and-forget; only a refused launch counts as failure.

use futures::future::try_join_all;
use pallet_common::bus::{BusError, FieldbusIo, ProgramControl, ProgramError, ProgramRef};
use pallet_common::io::{RegisterAddress, RegisterMap, Signal, encode_bool, encode_int};
use pallet_common::side::Side;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::state::config::ConfigState;

/// Publish failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// Neither side enabled, so there is no side code to send.
    #[error("no pallet side selected")]
    NoSideSelected,

    /// Register strategy without a fieldbus collaborator.
    #[error("fieldbus I/O unavailable")]
    FieldbusUnavailable,

    /// Program strategy without a program collaborator.
    #[error("program control unavailable")]
    ProgramControlUnavailable,

    /// A register write was rejected.
    #[error(transparent)]
    Write(#[from] BusError),

    /// The configuration program could not be launched.
    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// How the configuration reaches the PLC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStrategy {
    /// Direct register writes over the fieldbus.
    #[default]
    Registers,
    /// Arguments to a configuration program.
    Program,
}

/// The seven values of one publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigFrame {
    pub left_enabled: bool,
    pub right_enabled: bool,
    pub side_code: u32,
    pub left_layer: u32,
    pub left_slot: u32,
    pub right_layer: u32,
    pub right_slot: u32,
}

impl ConfigFrame {
    /// Snapshot the configuration. Fails when no side is selected.
    ///
    /// Each side's own layer/slot is sent, also when both sides are
    /// enabled and the left target drives the selection.
    pub fn from_state(config: &ConfigState) -> Result<Self, PublishError> {
        let side_code = config
            .selected_side()
            .code()
            .ok_or(PublishError::NoSideSelected)?;
        let left = config.side(Side::Left);
        let right = config.side(Side::Right);
        Ok(Self {
            left_enabled: left.enabled,
            right_enabled: right.enabled,
            side_code,
            left_layer: left.layer,
            left_slot: left.slot,
            right_layer: right.layer,
            right_slot: right.slot,
        })
    }

    /// Wire text of one output signal.
    pub fn encode(&self, signal: Signal) -> Option<String> {
        Some(match signal {
            Signal::LeftEnabled => encode_bool(self.left_enabled),
            Signal::RightEnabled => encode_bool(self.right_enabled),
            Signal::SideCode => encode_int(self.side_code),
            Signal::LeftLayer => encode_int(self.left_layer),
            Signal::LeftSlot => encode_int(self.left_slot),
            Signal::RightLayer => encode_int(self.right_layer),
            Signal::RightSlot => encode_int(self.right_slot),
            Signal::LeftPalletPresent | Signal::RightPalletPresent => return None,
        })
    }

    /// `(address, value)` for each of the seven output registers.
    pub fn register_writes(&self, map: &RegisterMap) -> Vec<(RegisterAddress, String)> {
        Signal::CONFIG_OUTPUTS
            .into_iter()
            .filter_map(|signal| Some((map.resolve(signal), self.encode(signal)?)))
            .collect()
    }

    /// Ordered arguments for the configuration program.
    pub fn program_args(&self) -> Vec<String> {
        Signal::CONFIG_OUTPUTS
            .into_iter()
            .filter_map(|signal| self.encode(signal))
            .collect()
    }
}

impl core::fmt::Display for ConfigFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "side={} left[{} L{} S{}] right[{} L{} S{}]",
            self.side_code,
            if self.left_enabled { "on" } else { "off" },
            self.left_layer,
            self.left_slot,
            if self.right_enabled { "on" } else { "off" },
            self.right_layer,
            self.right_slot,
        )
    }
}

/// Delivers a [`ConfigFrame`] with the configured strategy.
#[derive(Debug, Clone)]
pub struct ConfigPublisher {
    strategy: PublishStrategy,
    map: RegisterMap,
    config_program: ProgramRef,
}

impl ConfigPublisher {
    pub fn new(strategy: PublishStrategy, map: RegisterMap, config_program: ProgramRef) -> Self {
        Self {
            strategy,
            map,
            config_program,
        }
    }

    pub fn strategy(&self) -> PublishStrategy {
        self.strategy
    }

    /// Deliver `frame`. Returns once every write completed or the first failed.
    pub async fn publish(
        &self,
        frame: &ConfigFrame,
        fieldbus: Option<&dyn FieldbusIo>,
        programs: Option<&dyn ProgramControl>,
    ) -> Result<(), PublishError> {
        match self.strategy {
            PublishStrategy::Registers => {
                let fieldbus = fieldbus.ok_or(PublishError::FieldbusUnavailable)?;
                self.write_registers(frame, fieldbus).await
            }
            PublishStrategy::Program => {
                let programs = programs.ok_or(PublishError::ProgramControlUnavailable)?;
                let args = frame.program_args();
                debug!(program = %self.config_program, ?args, "launching configuration program");
                programs.start_program(&self.config_program, &args)?;
                Ok(())
            }
        }
    }

    async fn write_registers(
        &self,
        frame: &ConfigFrame,
        fieldbus: &dyn FieldbusIo,
    ) -> Result<(), PublishError> {
        let writes = frame.register_writes(&self.map);
        debug!(bus = fieldbus.name(), count = writes.len(), "writing configuration registers");
        try_join_all(
            writes
                .iter()
                .map(|(addr, value)| fieldbus.write_register(addr.kind, addr.index, value)),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::run::RunState;

    fn both_sides() -> ConfigState {
        let mut cfg = ConfigState::default();
        cfg.set_enabled(Side::Right, true, RunState::Idle);
        cfg.set_layer(Side::Left, 3, RunState::Idle);
        cfg.set_slot(Side::Left, 5, RunState::Idle);
        cfg.set_layer(Side::Right, 2, RunState::Idle);
        cfg.set_slot(Side::Right, 7, RunState::Idle);
        cfg
    }

    #[test]
    fn frame_from_both_sides() {
        let frame = ConfigFrame::from_state(&both_sides()).unwrap();
        assert_eq!(
            frame,
            ConfigFrame {
                left_enabled: true,
                right_enabled: true,
                side_code: 2,
                left_layer: 3,
                left_slot: 5,
                right_layer: 2,
                right_slot: 7,
            }
        );
    }

    #[test]
    fn no_selection_is_rejected() {
        let mut cfg = ConfigState::default();
        cfg.set_enabled(Side::Left, false, RunState::Idle);
        assert_eq!(
            ConfigFrame::from_state(&cfg),
            Err(PublishError::NoSideSelected)
        );
    }

    #[test]
    fn register_writes_follow_map() {
        let frame = ConfigFrame::from_state(&both_sides()).unwrap();
        let writes: Vec<String> = frame
            .register_writes(&RegisterMap::default())
            .into_iter()
            .map(|(addr, value)| format!("{}{}={}", addr.kind, addr.index, value))
            .collect();
        assert_eq!(
            writes,
            ["BIT0=1", "BIT1=1", "INT0=2", "INT1=3", "INT2=5", "INT3=2", "INT4=7"]
        );
    }

    #[test]
    fn program_args_in_publish_order() {
        let mut cfg = ConfigState::default();
        cfg.set_layer(Side::Left, 4, RunState::Idle);
        let frame = ConfigFrame::from_state(&cfg).unwrap();
        assert_eq!(frame.program_args(), ["1", "0", "0", "4", "1", "1", "1"]);
    }

    #[test]
    fn inputs_have_no_encoding() {
        let frame = ConfigFrame::from_state(&ConfigState::default()).unwrap();
        assert_eq!(frame.encode(Signal::LeftPalletPresent), None);
    }

    #[test]
    fn strategy_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            strategy: PublishStrategy,
        }
        let w: Wrapper = toml::from_str("strategy = \"program\"").unwrap();
        assert_eq!(w.strategy, PublishStrategy::Program);
        assert_eq!(PublishStrategy::default(), PublishStrategy::Registers);
    }
}
