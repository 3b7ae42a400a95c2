//! Parameters structure for SpeedCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the closed-loop speed controller.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Period of the speed control task. Must be shorter than the main
    /// control cycle.
    ///
    /// Units: seconds
    pub period_s: f64,

    /// Distance travelled per encoder increment.
    ///
    /// Units: meters
    pub encoder_incr_distance_m: f64,

    /// Symmetric limit on the motor duty output.
    pub motor_max_duty: f64,

    /// Motor controller proportional gain at startup. Retunable over the bus
    /// at runtime.
    pub initial_gain_p: f32,

    /// Motor controller integral gain at startup. Retunable over the bus at
    /// runtime.
    pub initial_gain_i: f32,
}
