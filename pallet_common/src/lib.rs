//! Palletizing HMI Common Library
//!
//! Shared constants, configuration loading and the contracts the panel
//! core uses to talk to the outside world.
//!
//! # Module Structure
//!
//! - [`consts`] - Numeric defaults (limits, poll period, log capacity)
//! - [`config`] - Configuration loading traits and types
//! - [`side`] - Pallet side identifiers
//! - [`io`] - Fieldbus register addressing and the wire text codec
//! - [`bus`] - Fieldbus I/O and Program Control collaborator traits
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use pallet_common::prelude::*;
//!
//! let map = RegisterMap::default();
//! let addr = map.resolve(Signal::SideCode);
//! assert_eq!(addr.index, 0);
//! ```

pub mod bus;
pub mod config;
pub mod consts;
pub mod io;
pub mod prelude;
pub mod side;
