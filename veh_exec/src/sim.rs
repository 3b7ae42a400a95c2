//! # Simulated equipment
//!
//! In-process stand-ins for the motor driver, encoder and steering servos,
//! used when the executable runs without hardware attached and as doubles in
//! unit tests. The drivetrain pair shares a first-order speed model so the
//! closed speed loop is observable in simulation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::Arc;
use std::time::Instant;

// Internal
use bus_if::eqpt::{Encoder, MotorDriver, SteeringActuator};
use crate::shared::AtomicF64;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Steady-state speed of the simulated vehicle at full duty.
///
/// Units: meters/second
const SIM_MAX_SPEED_MS: f64 = 5.0;

/// Time constant of the simulated drivetrain.
///
/// Units: seconds
const SIM_DRIVE_TAU_S: f64 = 0.4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated steering servo, recording the last commanded angle.
pub struct SimSteering {
    angle_rad: Arc<AtomicF64>,
}

/// Simulated drive motor. The written duty feeds the drivetrain model.
pub struct SimMotor {
    duty: Arc<AtomicF64>,
}

/// Simulated drive shaft encoder, integrating the drivetrain model.
pub struct SimEncoder {
    duty: Arc<AtomicF64>,

    incr_distance_m: f64,
    speed_ms: f64,
    residual_incr: f64,

    total: i64,
    last_delta: i64,
    last_update: Instant,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimSteering {
    pub fn new() -> Self {
        Self {
            angle_rad: Arc::new(AtomicF64::new(0.0)),
        }
    }

    /// Handle for observing the commanded angle after the servo has been
    /// boxed into a mapper.
    pub fn angle_handle(&self) -> Arc<AtomicF64> {
        Arc::clone(&self.angle_rad)
    }
}

impl SteeringActuator for SimSteering {
    fn write_angle(&mut self, angle_rad: f64) {
        self.angle_rad.store(angle_rad);
    }
}

impl MotorDriver for SimMotor {
    fn write(&mut self, duty: f64) {
        self.duty.store(duty);
    }
}

impl SimEncoder {
    /// Integrate the drivetrain model over `dt_s` seconds.
    fn advance(&mut self, dt_s: f64) {
        let target_ms = self.duty.load() * SIM_MAX_SPEED_MS;
        let blend = (dt_s / SIM_DRIVE_TAU_S).min(1.0);
        self.speed_ms += (target_ms - self.speed_ms) * blend;

        let incr = self.speed_ms * dt_s / self.incr_distance_m + self.residual_incr;
        let whole = incr.trunc();

        self.residual_incr = incr - whole;
        self.last_delta = whole as i64;
        self.total += self.last_delta;
    }
}

impl Encoder for SimEncoder {
    fn update(&mut self) {
        let now = Instant::now();
        let dt_s = now.duration_since(self.last_update).as_secs_f64();
        self.last_update = now;

        self.advance(dt_s);
    }

    fn last_increment_delta(&self) -> i64 {
        self.last_delta
    }

    fn total_increments(&self) -> i64 {
        self.total
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Create a connected simulated motor/encoder pair.
pub fn drivetrain(incr_distance_m: f64) -> (SimMotor, SimEncoder) {
    let duty = Arc::new(AtomicF64::new(0.0));

    (
        SimMotor {
            duty: Arc::clone(&duty),
        },
        SimEncoder {
            duty,
            incr_distance_m,
            speed_ms: 0.0,
            residual_incr: 0.0,
            total: 0,
            last_delta: 0,
            last_update: Instant::now(),
        },
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_drivetrain_model() {
        let (mut motor, mut encoder) = drivetrain(0.001);

        // Full forward duty spins the encoder up
        motor.write(1.0);
        encoder.advance(0.5);
        encoder.advance(0.5);
        assert!(encoder.last_increment_delta() > 0);
        assert!(encoder.total_increments() > encoder.last_increment_delta());

        // Cutting the duty decays the model back towards rest
        motor.write(0.0);
        let spinning = encoder.last_increment_delta();
        for _ in 0..20 {
            encoder.advance(0.5);
        }
        assert!(encoder.last_increment_delta() < spinning);
    }

    #[test]
    fn test_steering_records_angle() {
        let mut servo = SimSteering::new();
        let readout = servo.angle_handle();

        servo.write_angle(-0.25);
        assert_eq!(readout.load(), -0.25);
    }
}
