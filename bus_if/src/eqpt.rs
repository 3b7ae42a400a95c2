//! # Equipment interfaces
//!
//! Traits for the actuation and sensing subsystems the control task drives.
//! The hardware drivers implementing these (motor PWM bridge, quadrature
//! decoder, steering servo PWM) live outside this software; the simulated
//! implementations used for development live in `veh_exec::sim`.

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Interface to the drive motor driver.
pub trait MotorDriver {
    /// Set the motor duty cycle.
    ///
    /// Positive duty drives the vehicle forwards, negative in reverse. The
    /// driver clamps the value to its own duty limit.
    fn write(&mut self, duty: f64);
}

/// Interface to the drive shaft quadrature encoder decoder.
pub trait Encoder {
    /// Latch the counters. Must be called once per sampling period, before
    /// the two query functions.
    fn update(&mut self);

    /// Signed number of increments accumulated since the previous
    /// [`Encoder::update`] call.
    fn last_increment_delta(&self) -> i64;

    /// Signed total number of increments since startup.
    fn total_increments(&self) -> i64;
}

/// Interface to a steering servo actuator.
pub trait SteeringActuator {
    /// Command the actuator to the given angle in radians.
    fn write_angle(&mut self, angle_rad: f64);
}
