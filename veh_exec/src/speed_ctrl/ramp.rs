//! Speed ramp descriptor and interpolation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A time-bounded linear transition between two speeds.
///
/// The ramp is armed by the mode control module and evaluated by the speed
/// controller. All times are seconds on the session clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedRamp {
    /// Speed at the start of the ramp.
    ///
    /// Units: meters/second
    pub start_speed_ms: f64,

    /// Speed to reach by the end of the ramp.
    ///
    /// Units: meters/second
    pub target_speed_ms: f64,

    /// Session time at which the ramp was armed.
    ///
    /// Units: seconds
    pub start_time_s: f64,

    /// Length of the transition. Zero means an instantaneous step.
    ///
    /// Units: seconds
    pub duration_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SpeedRamp {
    /// The zero ramp armed at task start.
    fn default() -> Self {
        Self {
            start_speed_ms: 0.0,
            target_speed_ms: 0.0,
            start_time_s: 0.0,
            duration_s: 0.0,
        }
    }
}

impl SpeedRamp {
    /// An instantaneous step to the given speed.
    pub fn step(speed_ms: f64, time_s: f64) -> Self {
        Self {
            start_speed_ms: speed_ms,
            target_speed_ms: speed_ms,
            start_time_s: time_s,
            duration_s: 0.0,
        }
    }

    /// The instantaneous speed target at the given time.
    ///
    /// The interpolation saturates: before the start of the ramp the start
    /// speed is returned, at or beyond its end the target speed. It never
    /// extrapolates past the ramp window - an unsaturated mapping would keep
    /// the actuator moving after ramp completion.
    pub fn target_at(&self, time_s: f64) -> f64 {
        if time_s < self.start_time_s {
            return self.start_speed_ms;
        }

        if self.duration_s <= 0.0 || time_s >= self.start_time_s + self.duration_s {
            return self.target_speed_ms;
        }

        lin_map(
            (self.start_time_s, self.start_time_s + self.duration_s),
            (self.start_speed_ms, self.target_speed_ms),
            time_s,
        )
    }
}
