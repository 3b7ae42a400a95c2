//! # Vehicle control library.
//!
//! This library allows other crates in the workspace to access items defined
//! inside the vehicle control executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - the control context threaded through every component call
pub mod data_store;

/// Executable parameters
pub mod params;

/// Safety monitor - fuses the link staleness watchdogs into the safe-to-drive verdict
pub mod safety;

/// State shared with the speed control context - lock-free single-writer cells
pub mod shared;

/// Simulated equipment used when no hardware is attached
pub mod sim;

/// Closed-loop speed control module - drives the motor towards the ramp target
pub mod speed_ctrl;

/// Steering mappers - convert steering demands into calibrated wheel angles
pub mod steer_ctrl;

/// Mode control module - selects the active command source every cycle
pub mod mode_ctrl;
