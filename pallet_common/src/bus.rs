//! Collaborator contracts and error types.
//!
//! This module defines:
//! - `FieldbusIo` trait - register read/write against the PLC
//! - `ProgramControl` trait - start/pause/resume/stop of robot programs
//! - `BusError` / `ProgramError` - failures reported by those collaborators
//!
//! Both traits are object-safe and used as `Arc<dyn ...>` handles owned by
//! whoever owns the panel. Every call is asynchronous and may fail; callers
//! log and carry on, they never panic on a collaborator error.

use async_trait::async_trait;
use core::fmt;
use thiserror::Error;

use crate::io::{Direction, RegisterAddress, RegisterKind};

// ─── Errors ─────────────────────────────────────────────────────────

/// Fieldbus I/O failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The collaborator is not (or no longer) available.
    #[error("fieldbus I/O unavailable")]
    Unavailable,

    /// Read was rejected by the gateway or PLC.
    #[error("read {address} failed: {reason}")]
    ReadFailed {
        address: RegisterAddress,
        reason: String,
    },

    /// Write was rejected by the gateway or PLC.
    #[error("write {kind}{index} failed: {reason}")]
    WriteFailed {
        kind: RegisterKind,
        index: u16,
        reason: String,
    },
}

/// Program Control failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// The collaborator is not available.
    #[error("program control unavailable")]
    Unavailable,

    /// Program could not be launched.
    #[error("failed to launch {program}: {reason}")]
    LaunchFailed { program: String, reason: String },

    /// Pause/resume/stop/home request was rejected.
    #[error("{operation} rejected: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },
}

// ─── Program Control ────────────────────────────────────────────────

/// Reference to a robot program by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramRef(pub String);

impl ProgramRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProgramRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a running program is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopKind {
    /// Immediate stop. The only kind the panel requests.
    #[default]
    Quick,
    /// Controlled ramp-down.
    Slow,
}

/// Robot program lifecycle.
///
/// # Contract
///
/// | Operation | Blocking | Notes |
/// |-----------|----------|-------|
/// | `start_program()` | no | fire-and-forget; `Err` only if launch is refused |
/// | `pause_program()` | awaits ack | |
/// | `resume_program()` | awaits ack | |
/// | `stop_program()` | awaits ack | panel always passes `StopKind::Quick` |
/// | `request_home()` | awaits ack | hook, default no-op |
#[async_trait]
pub trait ProgramControl: Send + Sync {
    /// Launch `program` with positional string arguments.
    fn start_program(&self, program: &ProgramRef, args: &[String]) -> Result<(), ProgramError>;

    /// Pause the running program.
    async fn pause_program(&self) -> Result<(), ProgramError>;

    /// Resume a paused program.
    async fn resume_program(&self) -> Result<(), ProgramError>;

    /// Stop the running program.
    async fn stop_program(&self, kind: StopKind) -> Result<(), ProgramError>;

    /// Send the robot to its home pose.
    ///
    /// Default implementation does nothing; integrations that own a
    /// homing routine override it.
    async fn request_home(&self) -> Result<(), ProgramError> {
        Ok(())
    }
}

// ─── Fieldbus I/O ───────────────────────────────────────────────────

/// Register value as delivered by the I/O layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterValue {
    pub value: String,
}

impl RegisterValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Typed register access on the PLC fieldbus.
#[async_trait]
pub trait FieldbusIo: Send + Sync {
    /// Identifier used in logs (e.g. "modbus-gw", "simulation").
    fn name(&self) -> &str;

    /// Read one register.
    async fn read_register(
        &self,
        kind: RegisterKind,
        index: u16,
        direction: Direction,
    ) -> Result<RegisterValue, BusError>;

    /// Write one output register.
    async fn write_register(
        &self,
        kind: RegisterKind,
        index: u16,
        value: &str,
    ) -> Result<(), BusError>;

    /// Read by resolved address.
    async fn read_address(&self, address: RegisterAddress) -> Result<RegisterValue, BusError> {
        self.read_register(address.kind, address.index, address.direction)
            .await
    }
}
