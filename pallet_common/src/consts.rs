//! Workspace-wide constants for the palletizing HMI.
//!
//! Single source of truth for numeric defaults. Anything an integrator
//! may tune lives in the TOML config instead; these are the fallbacks.

use std::time::Duration;

/// Default upper bound for the layer index of a pallet side.
pub const DEFAULT_MAX_LAYERS: u32 = 9;

/// Default upper bound for the slot index of a pallet side.
pub const DEFAULT_MAX_SLOTS: u32 = 9;

/// Lowest valid layer/slot index. Malformed input falls back to this.
pub const MIN_POSITION: u32 = 1;

/// Fixed presence poll period.
pub const POLL_INTERVAL: Duration = Duration::from_millis(300);

/// Maximum number of entries kept in the operator event log.
pub const EVENT_LOG_CAPACITY: usize = 80;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/pallet_hmi/config.toml";

/// Default palletizing program started by the Start control.
pub const DEFAULT_PALLETIZING_PROGRAM: &str = "palletizing.drl";

/// Default configuration program used by the program-invocation publish strategy.
pub const DEFAULT_CONFIGURATION_PROGRAM: &str = "set_config.drl";
