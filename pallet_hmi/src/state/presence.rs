//! Pallet presence as last reported by the fieldbus poller.

use pallet_common::side::Side;

/// Presence sensor readings for both stations.
///
/// Written only by the poller; everything else reads a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Presence {
    sides: [bool; 2],
}

impl Presence {
    pub const fn new(left: bool, right: bool) -> Self {
        Self {
            sides: [left, right],
        }
    }

    #[inline]
    pub const fn get(&self, side: Side) -> bool {
        self.sides[side.index()]
    }

    /// Update one side. Returns `true` if the value changed.
    #[inline]
    pub fn set(&mut self, side: Side, present: bool) -> bool {
        let slot = &mut self.sides[side.index()];
        let changed = *slot != present;
        *slot = present;
        changed
    }
}
