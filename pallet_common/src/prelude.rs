//! Prelude module for common re-exports.
//!
//! ```rust
//! use pallet_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{
    DEFAULT_MAX_LAYERS, DEFAULT_MAX_SLOTS, EVENT_LOG_CAPACITY, MIN_POSITION, POLL_INTERVAL,
};

// ─── Register map ───────────────────────────────────────────────────
pub use crate::io::{
    Direction, RegisterAddress, RegisterKind, RegisterMap, RegisterMapError, Signal, decode_bool,
};

// ─── Collaborators ──────────────────────────────────────────────────
pub use crate::bus::{
    BusError, FieldbusIo, ProgramControl, ProgramError, ProgramRef, RegisterValue, StopKind,
};

pub use crate::side::Side;
