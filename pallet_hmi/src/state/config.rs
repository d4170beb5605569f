//! Configuration State: operator-entered per-side pallet targets.
//!
//! Holds, per side, the enabled flag and the layer/slot target, plus the
//! config-sent flag that tracks whether the PLC holds exactly this
//! configuration.
//!
//! Rules enforced here:
//! - layer and slot are always clamped into `[1, max]`; text input without
//!   a leading number commits as `1`
//! - every applied mutation (enable, layer, slot, reset) clears config-sent
//! - every mutation is rejected while a program is running

use pallet_common::consts::{DEFAULT_MAX_LAYERS, DEFAULT_MAX_SLOTS, MIN_POSITION};
use pallet_common::side::Side;
use serde::{Deserialize, Serialize};

use super::presence::Presence;
use super::run::RunState;

// ─── Limits ─────────────────────────────────────────────────────────

/// Upper bounds for layer and slot indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_layers")]
    pub max_layers: u32,
    #[serde(default = "default_max_slots")]
    pub max_slots: u32,
}

fn default_max_layers() -> u32 {
    DEFAULT_MAX_LAYERS
}

fn default_max_slots() -> u32 {
    DEFAULT_MAX_SLOTS
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_layers: DEFAULT_MAX_LAYERS,
            max_slots: DEFAULT_MAX_SLOTS,
        }
    }
}

// ─── Clamping / parsing ─────────────────────────────────────────────

/// Clamp a requested position into `[1, max]`.
///
/// Idempotent: `clamp_position(clamp_position(x) as i64, max) == clamp_position(x, max)`.
#[inline]
pub fn clamp_position(value: i64, max: u32) -> u32 {
    let max = max.max(MIN_POSITION);
    value.clamp(MIN_POSITION as i64, max as i64) as u32
}

/// Parse the leading base-10 integer of an input field.
///
/// Leading whitespace and one sign are accepted; parsing stops at the
/// first non-digit. `None` when no digit is found. Out-of-range values
/// saturate so clamping still yields the nearest bound.
pub fn parse_position(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut any = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        any = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    if !any {
        return None;
    }
    Some(if negative { -value } else { value })
}

// ─── Side configuration ─────────────────────────────────────────────

/// Operator target for one pallet station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideConfig {
    pub enabled: bool,
    pub layer: u32,
    pub slot: u32,
}

impl SideConfig {
    const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            layer: MIN_POSITION,
            slot: MIN_POSITION,
        }
    }
}

/// Derived side selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedSide {
    None,
    Left,
    Right,
    Both,
}

impl SelectedSide {
    /// PLC side code: Left = 0, Right = 1, Both = 2. `None` has no code.
    pub const fn code(self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::Left => Some(0),
            Self::Right => Some(1),
            Self::Both => Some(2),
        }
    }
}

impl core::fmt::Display for SelectedSide {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// Outcome of a configuration mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Applied; config-sent was cleared.
    Applied,
    /// Ignored, state untouched.
    Rejected(&'static str),
}

impl Mutation {
    #[inline]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

const LOCKED: &str = "configuration locked while program running";

// ─── ConfigState ────────────────────────────────────────────────────

/// Mutable operator configuration plus the config-sent flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigState {
    sides: [SideConfig; 2],
    limits: Limits,
    config_sent: bool,
}

impl Default for ConfigState {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl ConfigState {
    /// Mount-time configuration: left enabled, right disabled, all targets at 1.
    pub fn new(limits: Limits) -> Self {
        Self {
            sides: [SideConfig::new(true), SideConfig::new(false)],
            limits,
            config_sent: false,
        }
    }

    #[inline]
    pub fn side(&self, side: Side) -> &SideConfig {
        &self.sides[side.index()]
    }

    #[inline]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// True only between a successful publish and the next mutation.
    #[inline]
    pub fn config_sent(&self) -> bool {
        self.config_sent
    }

    // ─── Mutators ───────────────────────────────────────────────────

    fn mutate(&mut self, run: RunState, apply: impl FnOnce(&mut Self)) -> Mutation {
        if run.is_running() {
            return Mutation::Rejected(LOCKED);
        }
        apply(self);
        self.config_sent = false;
        Mutation::Applied
    }

    /// Enable or disable a side.
    pub fn set_enabled(&mut self, side: Side, enabled: bool, run: RunState) -> Mutation {
        self.mutate(run, |s| s.sides[side.index()].enabled = enabled)
    }

    /// Set the target layer, clamped into `[1, max_layers]`.
    pub fn set_layer(&mut self, side: Side, layer: i64, run: RunState) -> Mutation {
        let layer = clamp_position(layer, self.limits.max_layers);
        self.mutate(run, |s| s.sides[side.index()].layer = layer)
    }

    /// Set the target slot, clamped into `[1, max_slots]`.
    pub fn set_slot(&mut self, side: Side, slot: i64, run: RunState) -> Mutation {
        let slot = clamp_position(slot, self.limits.max_slots);
        self.mutate(run, |s| s.sides[side.index()].slot = slot)
    }

    /// Commit the text of a layer field.
    pub fn commit_layer_text(&mut self, side: Side, text: &str, run: RunState) -> Mutation {
        let layer = parse_position(text).unwrap_or(MIN_POSITION as i64);
        self.set_layer(side, layer, run)
    }

    /// Commit the text of a slot field.
    pub fn commit_slot_text(&mut self, side: Side, text: &str, run: RunState) -> Mutation {
        let slot = parse_position(text).unwrap_or(MIN_POSITION as i64);
        self.set_slot(side, slot, run)
    }

    /// Return a side's layer and slot to 1. The enabled flag is kept.
    pub fn reset(&mut self, side: Side, run: RunState) -> Mutation {
        self.mutate(run, |s| {
            let cfg = &mut s.sides[side.index()];
            cfg.layer = MIN_POSITION;
            cfg.slot = MIN_POSITION;
        })
    }

    /// Record a successful publish of the current configuration.
    pub(crate) fn mark_sent(&mut self) {
        self.config_sent = true;
    }

    /// Record a failed publish.
    pub(crate) fn mark_unsent(&mut self) {
        self.config_sent = false;
    }

    // ─── Derived ────────────────────────────────────────────────────

    /// Which sides the operator intends to palletize.
    pub fn selected_side(&self) -> SelectedSide {
        match (self.side(Side::Left).enabled, self.side(Side::Right).enabled) {
            (true, true) => SelectedSide::Both,
            (true, false) => SelectedSide::Left,
            (false, true) => SelectedSide::Right,
            (false, false) => SelectedSide::None,
        }
    }

    /// Effective `(layer, slot)` of the selection.
    ///
    /// With both sides enabled the left target is authoritative; the right
    /// side's stored values are kept as they are.
    pub fn selected_target(&self) -> Option<(u32, u32)> {
        let side = match self.selected_side() {
            SelectedSide::None => return None,
            SelectedSide::Left | SelectedSide::Both => Side::Left,
            SelectedSide::Right => Side::Right,
        };
        let cfg = self.side(side);
        Some((cfg.layer, cfg.slot))
    }

    /// Presence interlock: every enabled side must report a pallet.
    pub fn presence_satisfied(&self, presence: Presence) -> bool {
        Side::ALL
            .into_iter()
            .all(|side| !self.side(side).enabled || presence.get(side))
    }

    /// Whether this configuration may be published or run.
    pub fn is_valid(&self, presence: Presence) -> bool {
        match self.selected_target() {
            Some((layer, slot)) => {
                layer >= MIN_POSITION && slot >= MIN_POSITION && self.presence_satisfied(presence)
            }
            None => false,
        }
    }
}
