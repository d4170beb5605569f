//! Line-oriented operator console.
//!
//! One command per line:
//!
//! | Command | Action |
//! |---------|--------|
//! | `left on` / `right off` | enable or disable a side |
//! | `left layer 3` / `right slot 7` | commit a layer/slot field |
//! | `reset left` | layer and slot back to 1 |
//! | `set` | send the configuration to the PLC |
//! | `start` / `pause` / `continue` / `stop` / `home` | run control |
//! | `toggle` | the shared Pause/Continue button |
//! | `status` / `log` / `help` / `quit` | console |
//! | `sim present left on` | drive a simulated presence sensor |

use core::fmt::Write as _;
use core::str::FromStr;
use thiserror::Error;

use pallet_common::side::Side;

use crate::event_log::EventLog;
use crate::interlock::PauseToggle;
use crate::panel::{Panel, PanelError, PanelSnapshot};

/// Number of log lines `log` prints.
pub const LOG_LINES: usize = 20;

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Enable(Side, bool),
    Layer(Side, String),
    Slot(Side, String),
    Reset(Side),
    SetConfig,
    Start,
    Pause,
    Continue,
    PauseToggle,
    Stop,
    Home,
    Status,
    Log,
    Help,
    Quit,
    /// Simulation only: drive a presence sensor.
    SimPresent(Side, bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

fn parse_switch(word: Option<&str>, usage: &'static str) -> Result<bool, ParseCommandError> {
    match word.map(str::to_ascii_lowercase).as_deref() {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(ParseCommandError::Usage(usage)),
    }
}

fn parse_side(word: Option<&str>, usage: &'static str) -> Result<Side, ParseCommandError> {
    word.and_then(|w| w.parse().ok())
        .ok_or(ParseCommandError::Usage(usage))
}

impl FromStr for OperatorCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(ParseCommandError::Empty);
        };

        let cmd = match head.to_ascii_lowercase().as_str() {
            "left" | "right" | "l" | "r" => {
                const USAGE: &str = "<left|right> <on|off|layer N|slot N>";
                let side = parse_side(Some(head), USAGE)?;
                match words.next().map(str::to_ascii_lowercase).as_deref() {
                    Some("layer") => {
                        Self::Layer(side, words.collect::<Vec<_>>().join(" "))
                    }
                    Some("slot") => Self::Slot(side, words.collect::<Vec<_>>().join(" ")),
                    Some(switch) => Self::Enable(side, parse_switch(Some(switch), USAGE)?),
                    None => return Err(ParseCommandError::Usage(USAGE)),
                }
            }
            "reset" => Self::Reset(parse_side(words.next(), "reset <left|right>")?),
            "set" => Self::SetConfig,
            "start" => Self::Start,
            "pause" => Self::Pause,
            "continue" | "resume" => Self::Continue,
            "toggle" => Self::PauseToggle,
            "stop" => Self::Stop,
            "home" => Self::Home,
            "status" => Self::Status,
            "log" => Self::Log,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "sim" => {
                const USAGE: &str = "sim present <left|right> <on|off>";
                if words.next().map(str::to_ascii_lowercase).as_deref() != Some("present") {
                    return Err(ParseCommandError::Usage(USAGE));
                }
                let side = parse_side(words.next(), USAGE)?;
                Self::SimPresent(side, parse_switch(words.next(), USAGE)?)
            }
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(cmd)
    }
}

/// What the console loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this and show the panel status.
    Done(String),
    /// Print this verbatim.
    Text(String),
    Quit,
}

/// Run a panel command. `SimPresent` is the caller's business and is
/// answered with an error text here.
pub async fn execute(panel: &mut Panel, cmd: OperatorCommand) -> Result<Reply, PanelError> {
    use OperatorCommand as C;
    let reply = match cmd {
        C::Enable(side, on) => {
            panel.set_enabled(side, on)?;
            Reply::Done(format!("{side} side {}", if on { "enabled" } else { "disabled" }))
        }
        C::Layer(side, text) => {
            panel.commit_layer_text(side, &text)?;
            Reply::Done(format!("{side} layer = {}", panel.config().side(side).layer))
        }
        C::Slot(side, text) => {
            panel.commit_slot_text(side, &text)?;
            Reply::Done(format!("{side} slot = {}", panel.config().side(side).slot))
        }
        C::Reset(side) => {
            panel.reset(side)?;
            Reply::Done(format!("{side} side reset"))
        }
        C::SetConfig => {
            panel.set_config().await?;
            Reply::Done("configuration sent".to_string())
        }
        C::Start => Reply::Done(format!("run state: {}", panel.start()?)),
        C::Pause => Reply::Done(format!("run state: {}", panel.pause().await?)),
        C::Continue => Reply::Done(format!("run state: {}", panel.resume().await?)),
        C::PauseToggle => Reply::Done(format!("run state: {}", panel.pause_or_continue().await?)),
        C::Stop => Reply::Done(format!("run state: {}", panel.stop().await?)),
        C::Home => {
            panel.go_home().await?;
            Reply::Done("go home requested".to_string())
        }
        C::Status => Reply::Text(render_status(&panel.snapshot())),
        C::Log => Reply::Text(render_log(panel.event_log(), LOG_LINES)),
        C::Help => Reply::Text(HELP.to_string()),
        C::Quit => Reply::Quit,
        C::SimPresent(..) => Reply::Text("simulation commands need --simulate".to_string()),
    };
    Ok(reply)
}

pub const HELP: &str = "\
commands:
  left|right on|off        enable or disable a side
  left|right layer N       set target layer
  left|right slot N        set target slot
  reset left|right         layer and slot back to 1
  set                      send configuration to PLC
  start | stop | home      run control
  pause | continue | toggle
  status | log | quit
  sim present left|right on|off   (with --simulate)";

// ─── Rendering ──────────────────────────────────────────────────────

fn mark(enabled: bool) -> char {
    if enabled { '*' } else { '-' }
}

/// Multi-line panel status.
pub fn render_status(snap: &PanelSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "state: {}  selection: {}  valid: {}  sent: {}",
        snap.run_state, snap.selected_side, snap.config_valid, snap.config_sent
    );
    for view in &snap.sides {
        let _ = writeln!(
            out,
            "  {:<5} [{}] layer {:>2} slot {:>2}  {}",
            view.side,
            if view.enabled { "on " } else { "off" },
            view.layer,
            view.slot,
            view.presence_label()
        );
    }
    let c = snap.controls;
    let toggle = match c.pause_toggle {
        PauseToggle::Pause => "Pause",
        PauseToggle::Continue => "Continue",
    };
    let _ = write!(
        out,
        "  {}set {}start {}{} {}stop {}home {}edit",
        mark(c.set_config),
        mark(c.start),
        mark(c.pause_toggle_enabled()),
        toggle,
        mark(c.stop),
        mark(c.go_home),
        mark(c.edit),
    );
    out
}

/// Newest `limit` log entries, newest first, with local time of day.
pub fn render_log(log: &EventLog, limit: usize) -> String {
    if log.is_empty() {
        return "(log empty)".to_string();
    }
    log.iter()
        .take(limit)
        .map(|e| {
            format!(
                "{} {:<5} {}",
                e.timestamp.format("%H:%M:%S"),
                e.severity,
                e.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
