//! Fieldbus register addressing.
//!
//! The panel and the PLC agree on a fixed table of bit and integer
//! registers. [`RegisterMap`] resolves a functional [`Signal`] to its
//! address; [`codec`] turns values into the text the I/O layer carries.

pub mod codec;
pub mod map;
pub mod signal;

pub use codec::{decode_bool, encode_bool, encode_int};
pub use map::{RegisterMap, RegisterMapError, RegisterOverride};
pub use signal::{Direction, RegisterAddress, RegisterKind, Signal};
