//! Panel state module root.
//!
//! Operator-owned configuration, poller-owned presence and the run state
//! machine. Everything derived from these (selected side, validity,
//! control enablement) is recomputed on demand, never stored.

pub mod config;
pub mod presence;
pub mod run;
