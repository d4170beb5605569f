//! Pallet side identifiers.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// One of the two pallet stations the robot can build onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides, in publish order.
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// Array index (Left = 0, Right = 1).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.pad("left"),
            Self::Right => f.pad("right"),
        }
    }
}

impl FromStr for Side {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            _ => Err(format!(
                "unknown side: {s:?}, expected \"left\" or \"right\""
            )),
        }
    }
}
