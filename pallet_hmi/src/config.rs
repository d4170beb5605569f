//! Panel configuration file.
//!
//! ```toml
//! [shared]
//! service_name = "pallet-hmi-01"
//!
//! [limits]
//! max_layers = 9
//! max_slots = 9
//!
//! [programs]
//! palletizing = "palletizing.drl"
//! configuration = "set_config.drl"
//!
//! [publish]
//! strategy = "registers"
//!
//! [[registers]]
//! signal = "LeftPalletPresent"
//! kind = "bit"
//! index = 12
//! direction = "in"
//! ```
//!
//! Every section is optional. Validation happens once, before the panel
//! is mounted; the resulting [`PanelSettings`] are immutable afterwards.

use serde::{Deserialize, Serialize};

use pallet_common::bus::ProgramRef;
use pallet_common::config::{ConfigError, SharedConfig};
use pallet_common::consts::{
    DEFAULT_CONFIGURATION_PROGRAM, DEFAULT_PALLETIZING_PROGRAM, MIN_POSITION, POLL_INTERVAL,
};
use pallet_common::io::{RegisterMap, RegisterOverride};

use crate::panel::PanelSettings;
use crate::publisher::PublishStrategy;
use crate::state::config::Limits;

// ─── Sections ───────────────────────────────────────────────────────

/// Robot program names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramsConfig {
    /// Program launched by Start.
    #[serde(default = "default_palletizing")]
    pub palletizing: String,
    /// Program that receives the configuration as arguments.
    #[serde(default = "default_configuration")]
    pub configuration: String,
}

fn default_palletizing() -> String {
    DEFAULT_PALLETIZING_PROGRAM.to_string()
}
fn default_configuration() -> String {
    DEFAULT_CONFIGURATION_PROGRAM.to_string()
}

impl Default for ProgramsConfig {
    fn default() -> Self {
        Self {
            palletizing: default_palletizing(),
            configuration: default_configuration(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default)]
    pub strategy: PublishStrategy,
}

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete panel configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HmiConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub programs: ProgramsConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    /// Register map overrides, applied on top of the default table.
    #[serde(default)]
    pub registers: Vec<RegisterOverride>,
}

impl HmiConfig {
    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.limits.max_layers < MIN_POSITION {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_layers must be at least {MIN_POSITION}, got {}",
                self.limits.max_layers
            )));
        }
        if self.limits.max_slots < MIN_POSITION {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_slots must be at least {MIN_POSITION}, got {}",
                self.limits.max_slots
            )));
        }
        for (key, name) in [
            ("programs.palletizing", &self.programs.palletizing),
            ("programs.configuration", &self.programs.configuration),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{key} cannot be empty"
                )));
            }
        }
        self.register_map()?;
        Ok(())
    }

    /// Default register table with `[[registers]]` applied.
    pub fn register_map(&self) -> Result<RegisterMap, ConfigError> {
        RegisterMap::with_overrides(&self.registers)
            .map_err(|e| ConfigError::ValidationError(format!("registers: {e}")))
    }

    /// Validate and convert into mount settings.
    pub fn panel_settings(&self) -> Result<PanelSettings, ConfigError> {
        self.validate()?;
        Ok(PanelSettings {
            limits: self.limits,
            palletizing_program: ProgramRef::new(self.programs.palletizing.trim()),
            configuration_program: ProgramRef::new(self.programs.configuration.trim()),
            strategy: self.publish.strategy,
            register_map: self.register_map()?,
            poll_interval: POLL_INTERVAL,
        })
    }
}
