//! # Palletizing HMI core
//!
//! Operator panel logic for a two-sided palletizing robot cell.
//!
//! ## Module Structure
//!
//! - [`state`] - Configuration state, pallet presence and run state
//! - [`interlock`] - Which controls are enabled, derived on every query
//! - [`publisher`] - Send the configuration to the PLC (registers or program)
//! - [`run`] - Start / pause / continue / stop / go-home through Program Control
//! - [`poller`] - Periodic presence sensor readout
//! - [`event_log`] - Capped operator event log
//! - [`panel`] - Mount/teardown owner and operator actions
//! - [`config`] - TOML configuration file
//! - [`console`] - Line-oriented operator console
//! - [`sim`] - Simulated PLC and robot program runner
//!
//! ## Example
//!
//! ```rust
//! use pallet_hmi::panel::{Collaborators, Panel, PanelSettings};
//! use pallet_common::side::Side;
//!
//! let mut panel = Panel::mount(PanelSettings::default(), Collaborators::default());
//! panel.set_layer(Side::Left, 12).unwrap();
//! assert_eq!(panel.config().side(Side::Left).layer, 9);
//! assert!(!panel.controls().start);
//! ```

pub mod config;
pub mod console;
pub mod event_log;
pub mod interlock;
pub mod logging;
pub mod panel;
pub mod poller;
pub mod publisher;
pub mod run;
pub mod sim;
pub mod state;
