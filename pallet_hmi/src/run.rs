//! Run Controller: drive the palletizing program through Program Control.
//!
//! Each operation first checks the RunState table, then calls the robot,
//! and commits the new state only after the call succeeded. A failed call
//! leaves the state exactly as it was so the operator can retry.

use pallet_common::bus::{ProgramControl, ProgramError, ProgramRef, StopKind};
use thiserror::Error;
use tracing::{debug, info};

use crate::state::run::{RunEvent, RunState, RunStateMachine, TransitionResult};

/// Run Controller failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Not a legal transition from the current run state.
    #[error("cannot {event} while {state}: {reason}")]
    InvalidTransition {
        event: RunEvent,
        state: RunState,
        reason: &'static str,
    },

    /// Go-Home outside Idle.
    #[error("go home is only permitted while idle")]
    HomeWhileRunning,

    /// The robot refused or Program Control is missing.
    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// Owns the run state and the palletizing program reference.
#[derive(Debug, Clone)]
pub struct RunController {
    machine: RunStateMachine,
    program: ProgramRef,
}

impl RunController {
    pub fn new(program: ProgramRef) -> Self {
        Self {
            machine: RunStateMachine::new(),
            program,
        }
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.machine.state()
    }

    pub fn program(&self) -> &ProgramRef {
        &self.program
    }

    fn precheck(&self, event: RunEvent) -> Result<RunState, RunError> {
        match self.machine.check(event) {
            TransitionResult::Ok(next) => Ok(next),
            TransitionResult::Rejected(reason) => Err(RunError::InvalidTransition {
                event,
                state: self.state(),
                reason,
            }),
        }
    }

    fn commit(&mut self, event: RunEvent) -> RunState {
        let before = self.state();
        self.machine.handle_event(event);
        let after = self.state();
        info!(%event, from = %before, to = %after, "run state changed");
        after
    }

    /// Launch the palletizing program. No arguments: the configuration
    /// was already delivered by the publisher.
    pub fn start(&mut self, programs: Option<&dyn ProgramControl>) -> Result<RunState, RunError> {
        self.precheck(RunEvent::Start)?;
        let programs = programs.ok_or(ProgramError::Unavailable)?;
        debug!(program = %self.program, "starting palletizing program");
        programs.start_program(&self.program, &[])?;
        Ok(self.commit(RunEvent::Start))
    }

    pub async fn pause(
        &mut self,
        programs: Option<&dyn ProgramControl>,
    ) -> Result<RunState, RunError> {
        self.precheck(RunEvent::Pause)?;
        programs
            .ok_or(ProgramError::Unavailable)?
            .pause_program()
            .await?;
        Ok(self.commit(RunEvent::Pause))
    }

    pub async fn resume(
        &mut self,
        programs: Option<&dyn ProgramControl>,
    ) -> Result<RunState, RunError> {
        self.precheck(RunEvent::Continue)?;
        programs
            .ok_or(ProgramError::Unavailable)?
            .resume_program()
            .await?;
        Ok(self.commit(RunEvent::Continue))
    }

    /// Quick-stop the program. Reopens configuration editing.
    pub async fn stop(
        &mut self,
        programs: Option<&dyn ProgramControl>,
    ) -> Result<RunState, RunError> {
        self.precheck(RunEvent::Stop)?;
        programs
            .ok_or(ProgramError::Unavailable)?
            .stop_program(StopKind::Quick)
            .await?;
        Ok(self.commit(RunEvent::Stop))
    }

    /// Forward a homing request. Run state is not affected.
    pub async fn go_home(&self, programs: Option<&dyn ProgramControl>) -> Result<(), RunError> {
        if !self.state().is_idle() {
            return Err(RunError::HomeWhileRunning);
        }
        programs
            .ok_or(ProgramError::Unavailable)?
            .request_home()
            .await?;
        Ok(())
    }
}
