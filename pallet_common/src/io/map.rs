//! Register Map: signal → fieldbus address table.
//!
//! The default table is the PLC contract. Integrators may move individual
//! signals through `[[registers]]` entries in the config file; overrides
//! are validated once at startup and the map is immutable afterwards, so
//! [`RegisterMap::resolve`] cannot fail at runtime.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use super::signal::{Direction, RegisterAddress, RegisterKind, Signal};

// ─── Error Types ────────────────────────────────────────────────────

/// Register map validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterMapError {
    /// Override assigns the wrong register width to a signal.
    #[error("signal {signal} must use a {expected} register, got {actual}")]
    KindMismatch {
        signal: Signal,
        expected: RegisterKind,
        actual: RegisterKind,
    },
    /// Override flips the direction of a signal.
    #[error("signal {signal} must be {expected}, got {actual}")]
    DirectionMismatch {
        signal: Signal,
        expected: Direction,
        actual: Direction,
    },
    /// The same signal is overridden twice.
    #[error("signal {0} overridden more than once")]
    DuplicateOverride(Signal),
    /// Two signals resolve to the same register.
    #[error("signals {first} and {second} both map to {address}")]
    AddressAlias {
        address: RegisterAddress,
        first: Signal,
        second: Signal,
    },
}

// ─── RegisterOverride ───────────────────────────────────────────────

/// One `[[registers]]` entry from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterOverride {
    pub signal: Signal,
    pub kind: RegisterKind,
    pub index: u16,
    pub direction: Direction,
}

// ─── RegisterMap ────────────────────────────────────────────────────

/// Immutable signal → address table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterMap {
    addresses: [RegisterAddress; Signal::ALL.len()],
}

impl Default for RegisterMap {
    fn default() -> Self {
        use Direction::{In, Out};
        use RegisterKind::{Bit, Int};
        Self {
            addresses: [
                RegisterAddress::new(Bit, 8, In),  // LeftPalletPresent
                RegisterAddress::new(Bit, 9, In),  // RightPalletPresent
                RegisterAddress::new(Bit, 0, Out), // LeftEnabled
                RegisterAddress::new(Bit, 1, Out), // RightEnabled
                RegisterAddress::new(Int, 0, Out), // SideCode
                RegisterAddress::new(Int, 1, Out), // LeftLayer
                RegisterAddress::new(Int, 2, Out), // LeftSlot
                RegisterAddress::new(Int, 3, Out), // RightLayer
                RegisterAddress::new(Int, 4, Out), // RightSlot
            ],
        }
    }
}

impl RegisterMap {
    /// Build the map from the default table plus config overrides.
    ///
    /// Returns the first validation error encountered.
    pub fn with_overrides(overrides: &[RegisterOverride]) -> Result<Self, RegisterMapError> {
        let mut map = Self::default();
        let mut seen: Vec<Signal> = Vec::with_capacity(overrides.len());

        for ov in overrides {
            if seen.contains(&ov.signal) {
                return Err(RegisterMapError::DuplicateOverride(ov.signal));
            }
            seen.push(ov.signal);

            let expected_kind = ov.signal.expected_kind();
            if ov.kind != expected_kind {
                return Err(RegisterMapError::KindMismatch {
                    signal: ov.signal,
                    expected: expected_kind,
                    actual: ov.kind,
                });
            }
            let expected_dir = ov.signal.expected_direction();
            if ov.direction != expected_dir {
                return Err(RegisterMapError::DirectionMismatch {
                    signal: ov.signal,
                    expected: expected_dir,
                    actual: ov.direction,
                });
            }

            let address = RegisterAddress::new(ov.kind, ov.index, ov.direction);
            debug!(signal = ?ov.signal, ?address, "register override applied");
            map.addresses[ov.signal.index()] = address;
        }

        map.check_aliases()?;
        Ok(map)
    }

    fn check_aliases(&self) -> Result<(), RegisterMapError> {
        let mut owners: HashMap<RegisterAddress, Signal> = HashMap::new();
        for signal in Signal::ALL {
            let address = self.resolve(signal);
            if let Some(first) = owners.insert(address, signal) {
                return Err(RegisterMapError::AddressAlias {
                    address,
                    first,
                    second: signal,
                });
            }
        }
        Ok(())
    }

    /// Address of `signal`.
    #[inline]
    pub fn resolve(&self, signal: Signal) -> RegisterAddress {
        self.addresses[signal.index()]
    }

    /// Reverse lookup: the signal mapped at `address`, if any.
    pub fn signal_at(&self, address: RegisterAddress) -> Option<Signal> {
        Signal::ALL
            .into_iter()
            .find(|sig| self.resolve(*sig) == address)
    }
}
