//! Parameters structure for ModeCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for mode control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    // ---- DIRECT CONTROL ----

    /// Speed commanded at full forward acceleration under direct control.
    /// Full reverse commands the negative of this value.
    ///
    /// Units: meters/second
    pub direct_control_max_speed_ms: f64,

    // ---- SAFETY ENABLE ----

    /// Lower bound of the armed dead-man band on the acceleration channel,
    /// inclusive.
    pub interlock_accel_min: f64,

    /// Upper bound of the armed dead-man band on the acceleration channel,
    /// inclusive.
    pub interlock_accel_max: f64,

    /// Duration of the ramp forced when the interlock is not satisfied.
    ///
    /// Units: seconds
    pub emergency_brake_duration_s: f64,
}
