//! Interlock Engine: which operator controls are enabled right now.
//!
//! Pure derivation from the run state, the config-sent flag and config
//! validity. Recomputed on every query; nothing here is cached.
//!
//! | Control | Enabled iff |
//! |---------|-------------|
//! | Set-Config | valid ∧ idle ∧ ¬sent |
//! | Start | valid ∧ sent ∧ idle |
//! | Pause | running ∧ ¬paused |
//! | Continue | running ∧ paused |
//! | Stop | running |
//! | Go-Home | idle |
//! | Reset / toggle / layer / slot | idle |

use core::fmt;
use pallet_common::side::Side;

use crate::state::run::RunState;

/// Everything the engine looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterlockInputs {
    pub run_state: RunState,
    pub config_sent: bool,
    pub config_valid: bool,
}

/// An operator control on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    SetConfig,
    Start,
    Pause,
    Continue,
    Stop,
    GoHome,
    Reset(Side),
    Toggle(Side),
    EditLayer(Side),
    EditSlot(Side),
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetConfig => write!(f, "Set config"),
            Self::Start => write!(f, "Start"),
            Self::Pause => write!(f, "Pause"),
            Self::Continue => write!(f, "Continue"),
            Self::Stop => write!(f, "Stop"),
            Self::GoHome => write!(f, "Go home"),
            Self::Reset(side) => write!(f, "Reset {side}"),
            Self::Toggle(side) => write!(f, "Toggle {side}"),
            Self::EditLayer(side) => write!(f, "Edit {side} layer"),
            Self::EditSlot(side) => write!(f, "Edit {side} slot"),
        }
    }
}

/// The single Pause/Continue button and what pressing it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseToggle {
    Pause,
    Continue,
}

/// Enablement of every control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub set_config: bool,
    pub start: bool,
    pub pause: bool,
    pub resume: bool,
    pub stop: bool,
    pub go_home: bool,
    /// Reset, enable toggle and layer/slot edits on either side.
    pub edit: bool,
    /// Label of the shared Pause/Continue button.
    pub pause_toggle: PauseToggle,
}

impl Controls {
    /// Whether `control` may be triggered.
    pub fn allows(&self, control: Control) -> bool {
        match control {
            Control::SetConfig => self.set_config,
            Control::Start => self.start,
            Control::Pause => self.pause,
            Control::Continue => self.resume,
            Control::Stop => self.stop,
            Control::GoHome => self.go_home,
            Control::Reset(_)
            | Control::Toggle(_)
            | Control::EditLayer(_)
            | Control::EditSlot(_) => self.edit,
        }
    }

    /// Whether the shared Pause/Continue button is enabled.
    pub fn pause_toggle_enabled(&self) -> bool {
        match self.pause_toggle {
            PauseToggle::Pause => self.pause,
            PauseToggle::Continue => self.resume,
        }
    }
}

/// Derive control enablement.
pub fn evaluate(inputs: InterlockInputs) -> Controls {
    let InterlockInputs {
        run_state,
        config_sent,
        config_valid,
    } = inputs;
    let idle = run_state.is_idle();
    let running = run_state.is_running();
    let paused = run_state.is_paused();

    Controls {
        set_config: config_valid && idle && !config_sent,
        start: config_valid && config_sent && idle,
        pause: running && !paused,
        resume: running && paused,
        stop: running,
        go_home: idle,
        edit: idle,
        pause_toggle: if paused {
            PauseToggle::Continue
        } else {
            PauseToggle::Pause
        },
    }
}
