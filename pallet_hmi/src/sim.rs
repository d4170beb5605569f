//! In-process stand-ins for the PLC and the robot controller.
//!
//! Used by the console binary in `--simulate` mode and by the tests.
//! Both simulators record what they were asked to do and can be told to
//! fail specific operations.

pub mod plc;
pub mod program;

pub use plc::{BoolSpelling, SimulatedPlc};
pub use program::{Operation, ProgramCall, SimulatedProgramRunner};
