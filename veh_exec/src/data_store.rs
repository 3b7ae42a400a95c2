//! # Data Store
//!
//! The explicitly owned control context for the vehicle control task. One
//! instance is constructed at task start and threaded through every
//! component call; there is no file-scope mutable state.
//!
//! Fields are mutated by exactly one place each: command and calibration
//! state by the bus dispatch handlers, cycle counters by the main loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::mode_ctrl;
use bus_if::remote::RemoteCommand;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The most recently received supervisory wheel angle targets.
///
/// Angles are absolute and already calibrated by the sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LateralCommand {
    /// Units: radians
    pub front_angle_rad: f64,

    /// Units: radians
    pub rear_angle_rad: f64,

    /// Units: radians
    pub extra_angle_rad: f64,
}

/// The most recently received supervisory speed target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LongitudinalCommand {
    /// Units: meters/second
    pub target_speed_ms: f64,

    /// Whether the safety-enable interlock is required. Decoded and stored
    /// as received; the mode state machine does not consult it.
    pub use_safety_enable: bool,

    /// Requested ramp duration.
    ///
    /// Units: seconds
    pub ramp_time_s: f64,
}

/// A wheel calibration pair. Always written whole by a single bus command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WheelCalib {
    /// Calibrated neutral position.
    ///
    /// Units: radians
    pub offset_rad: f64,

    /// Maximum deflection either side of neutral.
    ///
    /// Units: radians
    pub max_delta_rad: f64,
}

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    // Command state
    /// Latest remote controller state. Persistent across cycles - staleness
    /// is the safety monitor's concern, not the store's.
    pub remote: RemoteCommand,

    /// Latest supervisory lateral command
    pub lateral: LateralCommand,

    /// Latest supervisory longitudinal command
    pub longitudinal: LongitudinalCommand,

    // Calibration
    pub front_calib: WheelCalib,
    pub rear_calib: WheelCalib,

    /// Extra servo calibration pair. Carried in the store although no
    /// mapper actuates it and no bus command updates it.
    pub extra_calib: WheelCalib,

    // ModeCtrl
    pub mode_ctrl: mode_ctrl::ModeCtrl,
    pub mode_ctrl_input: mode_ctrl::InputData,
    pub mode_ctrl_output: mode_ctrl::OutputData,
    pub mode_ctrl_status_rpt: mode_ctrl::StatusReport,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the per-cycle module data. Command and calibration state is
    /// deliberately left alone - it persists until overwritten by the bus.
    pub fn cycle_start(&mut self) {
        self.mode_ctrl_input = mode_ctrl::InputData::default();
        self.mode_ctrl_output = mode_ctrl::OutputData::default();
        self.mode_ctrl_status_rpt = mode_ctrl::StatusReport::default();
    }
}
