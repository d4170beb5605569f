//! Simulated robot program runner.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::debug;

use pallet_common::bus::{ProgramControl, ProgramError, ProgramRef, StopKind};

/// Program Control operation, for fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Start,
    Pause,
    Resume,
    Stop,
    Home,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
            Self::Home => "home",
        }
    }
}

/// A call the runner accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramCall {
    Start { program: String, args: Vec<String> },
    Pause,
    Resume,
    Stop(StopKind),
    Home,
}

#[derive(Debug, Default)]
struct Inner {
    calls: Vec<ProgramCall>,
    failing: HashSet<Operation>,
}

/// In-memory [`ProgramControl`] that records accepted calls.
#[derive(Debug, Default)]
pub struct SimulatedProgramRunner {
    inner: Mutex<Inner>,
}

impl SimulatedProgramRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `op` fail until cleared.
    pub fn set_failing(&self, op: Operation, fail: bool) {
        let mut inner = self.inner.lock();
        if fail {
            inner.failing.insert(op);
        } else {
            inner.failing.remove(&op);
        }
    }

    /// Accepted calls, oldest first.
    pub fn calls(&self) -> Vec<ProgramCall> {
        self.inner.lock().calls.clone()
    }

    fn record(&self, op: Operation, call: ProgramCall) -> Result<(), ProgramError> {
        let mut inner = self.inner.lock();
        if inner.failing.contains(&op) {
            debug!(operation = op.name(), "sim program call rejected");
            return Err(match call {
                ProgramCall::Start { program, .. } => ProgramError::LaunchFailed {
                    program,
                    reason: "simulated launch fault".to_string(),
                },
                _ => ProgramError::Rejected {
                    operation: op.name(),
                    reason: "simulated fault".to_string(),
                },
            });
        }
        debug!(?call, "sim program call");
        inner.calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl ProgramControl for SimulatedProgramRunner {
    fn start_program(&self, program: &ProgramRef, args: &[String]) -> Result<(), ProgramError> {
        self.record(
            Operation::Start,
            ProgramCall::Start {
                program: program.name().to_string(),
                args: args.to_vec(),
            },
        )
    }

    async fn pause_program(&self) -> Result<(), ProgramError> {
        self.record(Operation::Pause, ProgramCall::Pause)
    }

    async fn resume_program(&self) -> Result<(), ProgramError> {
        self.record(Operation::Resume, ProgramCall::Resume)
    }

    async fn stop_program(&self, kind: StopKind) -> Result<(), ProgramError> {
        self.record(Operation::Stop, ProgramCall::Stop(kind))
    }

    async fn request_home(&self) -> Result<(), ProgramError> {
        self.record(Operation::Home, ProgramCall::Home)
    }
}
