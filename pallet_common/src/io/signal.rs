//! Signal and register address types.
//!
//! `Signal` names what a register means to the panel; `RegisterAddress`
//! says where it lives on the fieldbus.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::side::Side;

// ─── RegisterKind ───────────────────────────────────────────────────

/// Register width on the fieldbus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterKind {
    /// Single-bit register.
    Bit,
    /// Integer register.
    Int,
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit => write!(f, "BIT"),
            Self::Int => write!(f, "INT"),
        }
    }
}

// ─── Direction ──────────────────────────────────────────────────────

/// Data direction, seen from the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// PLC → panel.
    In,
    /// Panel → PLC.
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "IN"),
            Self::Out => write!(f, "OUT"),
        }
    }
}

// ─── RegisterAddress ────────────────────────────────────────────────

/// Fully-qualified fieldbus register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterAddress {
    pub kind: RegisterKind,
    pub index: u16,
    pub direction: Direction,
}

impl RegisterAddress {
    pub const fn new(kind: RegisterKind, index: u16, direction: Direction) -> Self {
        Self {
            kind,
            index,
            direction,
        }
    }
}

impl fmt::Display for RegisterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} ({})", self.kind, self.index, self.direction)
    }
}

// ─── Signal ─────────────────────────────────────────────────────────

/// Functional meaning of a register exchanged with the PLC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    // ── Inputs ──────────────────────
    LeftPalletPresent,
    RightPalletPresent,

    // ── Configuration outputs ───────
    LeftEnabled,
    RightEnabled,
    SideCode,
    LeftLayer,
    LeftSlot,
    RightLayer,
    RightSlot,
}

impl Signal {
    /// Every signal, in table order.
    pub const ALL: [Signal; 9] = [
        Signal::LeftPalletPresent,
        Signal::RightPalletPresent,
        Signal::LeftEnabled,
        Signal::RightEnabled,
        Signal::SideCode,
        Signal::LeftLayer,
        Signal::LeftSlot,
        Signal::RightLayer,
        Signal::RightSlot,
    ];

    /// The seven configuration outputs, in publish order.
    pub const CONFIG_OUTPUTS: [Signal; 7] = [
        Signal::LeftEnabled,
        Signal::RightEnabled,
        Signal::SideCode,
        Signal::LeftLayer,
        Signal::LeftSlot,
        Signal::RightLayer,
        Signal::RightSlot,
    ];

    /// Position in [`Signal::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Register width this signal requires.
    pub const fn expected_kind(self) -> RegisterKind {
        match self {
            Self::LeftPalletPresent
            | Self::RightPalletPresent
            | Self::LeftEnabled
            | Self::RightEnabled => RegisterKind::Bit,
            Self::SideCode
            | Self::LeftLayer
            | Self::LeftSlot
            | Self::RightLayer
            | Self::RightSlot => RegisterKind::Int,
        }
    }

    /// Direction this signal requires.
    pub const fn expected_direction(self) -> Direction {
        match self {
            Self::LeftPalletPresent | Self::RightPalletPresent => Direction::In,
            _ => Direction::Out,
        }
    }

    /// Presence sensor signal for a side.
    pub const fn pallet_present(side: Side) -> Signal {
        match side {
            Side::Left => Self::LeftPalletPresent,
            Side::Right => Self::RightPalletPresent,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LeftPalletPresent => "LeftPalletPresent",
            Self::RightPalletPresent => "RightPalletPresent",
            Self::LeftEnabled => "LeftEnabled",
            Self::RightEnabled => "RightEnabled",
            Self::SideCode => "SideCode",
            Self::LeftLayer => "LeftLayer",
            Self::LeftSlot => "LeftSlot",
            Self::RightLayer => "RightLayer",
            Self::RightSlot => "RightSlot",
        };
        f.write_str(name)
    }
}

impl FromStr for Signal {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signal::ALL
            .into_iter()
            .find(|sig| sig.to_string() == s)
            .ok_or_else(|| format!("unknown signal: {s:?}"))
    }
}
