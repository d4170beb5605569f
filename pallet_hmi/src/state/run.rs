//! RunState transitions.
//!
//! Idle → Running ↔ Paused → Idle. `Paused` only exists inside a run, so
//! the pause flag is folded into the state instead of stored beside it.
//!
//! The table is pure: [`RunStateMachine::check`] answers whether an event
//! is legal without touching state, so the Run Controller can ask first,
//! call the robot, and only commit once the robot acknowledged.

use core::fmt;

/// Robot program run state as tracked by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No palletizing program running. Configuration is editable.
    #[default]
    Idle,
    /// Program running.
    Running,
    /// Program running but paused.
    Paused,
}

impl RunState {
    /// Running, paused or not.
    #[inline]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    #[inline]
    pub const fn is_paused(self) -> bool {
        matches!(self, Self::Paused)
    }

    #[inline]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Running => write!(f, "RUNNING"),
            Self::Paused => write!(f, "RUNNING (paused)"),
        }
    }
}

/// Operator request that changes the run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    Start,
    Pause,
    Continue,
    Stop,
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Pause => write!(f, "pause"),
            Self::Continue => write!(f, "continue"),
            Self::Stop => write!(f, "stop"),
        }
    }
}

/// Result of a RunState transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition legal: resulting state.
    Ok(RunState),
    /// Transition rejected: reason.
    Rejected(&'static str),
}

/// RunState holder.
#[derive(Debug, Clone, Default)]
pub struct RunStateMachine {
    state: RunState,
}

impl RunStateMachine {
    /// Start in Idle.
    pub const fn new() -> Self {
        Self {
            state: RunState::Idle,
        }
    }

    #[inline]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Where `event` would lead from the current state.
    pub fn check(&self, event: RunEvent) -> TransitionResult {
        use RunEvent::*;
        use RunState::*;

        match (self.state, event) {
            (Idle, Start) => TransitionResult::Ok(Running),
            (Running, Pause) => TransitionResult::Ok(Paused),
            (Paused, Continue) => TransitionResult::Ok(Running),
            (Running | Paused, Stop) => TransitionResult::Ok(Idle),

            (Running | Paused, Start) => TransitionResult::Rejected("program already running"),
            (Idle, Pause | Continue | Stop) => TransitionResult::Rejected("no program running"),
            (Paused, Pause) => TransitionResult::Rejected("program already paused"),
            (Running, Continue) => TransitionResult::Rejected("program is not paused"),
        }
    }

    /// Check and commit in one step.
    pub fn handle_event(&mut self, event: RunEvent) -> TransitionResult {
        let result = self.check(event);
        if let TransitionResult::Ok(next) = result {
            self.state = next;
        }
        result
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
