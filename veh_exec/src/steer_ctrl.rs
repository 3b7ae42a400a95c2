//! # Steering control
//!
//! One [`SteeringMapper`] exists per steerable axle. Each owns its actuator
//! and its live calibration (wheel offset and maximum deflection), and
//! converts steering demands into calibrated absolute wheel angles.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use bus_if::eqpt::SteeringActuator;
use util::maths::{clamp, lin_map};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A steering demand produced by the mode control module, applied to both
/// axles by [`apply_demand`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SteeringDemand {
    /// Normalised joystick value in `[-1, 1]` driving both axles, the rear
    /// opposite to the front for a four-wheel-steer effect.
    Coupled(f64),

    /// Independent absolute wheel angles, already calibrated by the sender.
    Absolute {
        front_angle_rad: f64,
        rear_angle_rad: f64,
    },

    /// Both axles straight ahead.
    Centre,

    /// No actuator update this cycle - the axles hold their last angles.
    Hold,
}

impl Default for SteeringDemand {
    fn default() -> Self {
        Self::Hold
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Steering mapper for a single axle.
pub struct SteeringMapper {
    actuator: Box<dyn SteeringActuator + Send>,

    /// Calibrated neutral position of the actuator.
    ///
    /// Units: radians
    offset_rad: f64,

    /// Maximum wheel deflection either side of straight ahead.
    ///
    /// Units: radians
    max_delta_rad: f64,

    /// The last commanded wheel angle.
    ///
    /// Units: radians
    wheel_angle_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteeringMapper {
    /// Create a mapper with zero calibration. Calibration arrives over the
    /// bus and is applied with [`SteeringMapper::set_calib`].
    pub fn new(actuator: Box<dyn SteeringActuator + Send>) -> Self {
        Self {
            actuator,
            offset_rad: 0.0,
            max_delta_rad: 0.0,
            wheel_angle_rad: 0.0,
        }
    }

    /// Apply a calibration pair. Safe to call between any two cycles - the
    /// next write uses the new values with no discontinuity handling needed.
    pub fn set_calib(&mut self, offset_rad: f64, max_delta_rad: f64) {
        self.offset_rad = offset_rad;
        self.max_delta_rad = max_delta_rad;
    }

    /// The maximum wheel deflection of this axle.
    pub fn wheel_max_delta(&self) -> f64 {
        self.max_delta_rad
    }

    /// The last commanded wheel angle.
    pub fn wheel_angle(&self) -> f64 {
        self.wheel_angle_rad
    }

    /// Command an absolute wheel angle.
    ///
    /// The angle is clamped to the calibrated deflection range, recorded,
    /// and written to the actuator with the calibration offset applied.
    pub fn write_wheel_angle(&mut self, angle_rad: f64) {
        let angle_rad = clamp(&angle_rad, &-self.max_delta_rad, &self.max_delta_rad);

        self.wheel_angle_rad = angle_rad;
        self.actuator.write_angle(self.offset_rad + angle_rad);
    }

    /// Map a normalised steering value in `[-1, 1]` onto this axle's
    /// deflection range.
    ///
    /// The mapping is affine and unclamped - the remote receiver guarantees
    /// the input domain.
    pub fn map_normalised_steering(&self, value: f64) -> f64 {
        lin_map(
            (-1.0, 1.0),
            (-self.max_delta_rad, self.max_delta_rad),
            value,
        )
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Apply a steering demand to both axles.
pub fn apply_demand(
    front: &mut SteeringMapper,
    rear: &mut SteeringMapper,
    demand: &SteeringDemand,
) {
    match *demand {
        SteeringDemand::Coupled(value) => {
            front.write_wheel_angle(front.map_normalised_steering(value));

            // The rear axle turns opposite to the front when driven from a
            // single joystick value
            rear.write_wheel_angle(rear.map_normalised_steering(-value));
        }
        SteeringDemand::Absolute {
            front_angle_rad,
            rear_angle_rad,
        } => {
            front.write_wheel_angle(front_angle_rad);
            rear.write_wheel_angle(rear_angle_rad);
        }
        SteeringDemand::Centre => {
            front.write_wheel_angle(0.0);
            rear.write_wheel_angle(0.0);
        }
        SteeringDemand::Hold => (),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::SimSteering;

    fn mapper(offset_rad: f64, max_delta_rad: f64) -> SteeringMapper {
        let mut m = SteeringMapper::new(Box::new(SimSteering::new()));
        m.set_calib(offset_rad, max_delta_rad);
        m
    }

    #[test]
    fn test_write_wheel_angle_clamps() {
        let mut m = mapper(0.0, 0.3);

        m.write_wheel_angle(0.2);
        assert_eq!(m.wheel_angle(), 0.2);

        m.write_wheel_angle(1.0);
        assert_eq!(m.wheel_angle(), 0.3);

        m.write_wheel_angle(-1.0);
        assert_eq!(m.wheel_angle(), -0.3);
    }

    #[test]
    fn test_actuator_receives_offset_angle() {
        let servo = SimSteering::new();
        let readout = servo.angle_handle();

        let mut m = SteeringMapper::new(Box::new(servo));
        m.set_calib(0.05, 0.3);

        m.write_wheel_angle(0.1);
        assert!((readout.load() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_coupled_demand_is_opposed() {
        let mut front = mapper(0.0, 0.3);
        let mut rear = mapper(0.0, 0.3);

        // Full right lock: front at +max delta, rear at -max delta
        apply_demand(&mut front, &mut rear, &SteeringDemand::Coupled(1.0));
        assert_eq!(front.wheel_angle(), 0.3);
        assert_eq!(rear.wheel_angle(), -0.3);

        // Any nonzero input keeps the axles opposite in sign
        apply_demand(&mut front, &mut rear, &SteeringDemand::Coupled(0.25));
        assert!(front.wheel_angle() > 0.0);
        assert!(rear.wheel_angle() < 0.0);
        assert_eq!(front.wheel_angle(), -rear.wheel_angle());
    }

    #[test]
    fn test_absolute_demand_is_uncoupled() {
        let mut front = mapper(0.0, 0.5);
        let mut rear = mapper(0.0, 0.5);

        apply_demand(
            &mut front,
            &mut rear,
            &SteeringDemand::Absolute {
                front_angle_rad: 0.1,
                rear_angle_rad: 0.2,
            },
        );
        assert_eq!(front.wheel_angle(), 0.1);
        assert_eq!(rear.wheel_angle(), 0.2);
    }

    #[test]
    fn test_centre_and_hold() {
        let mut front = mapper(0.0, 0.3);
        let mut rear = mapper(0.0, 0.3);

        apply_demand(&mut front, &mut rear, &SteeringDemand::Coupled(1.0));
        apply_demand(&mut front, &mut rear, &SteeringDemand::Centre);
        assert_eq!(front.wheel_angle(), 0.0);
        assert_eq!(rear.wheel_angle(), 0.0);

        apply_demand(&mut front, &mut rear, &SteeringDemand::Coupled(-1.0));
        let held = (front.wheel_angle(), rear.wheel_angle());

        // Hold leaves the last commanded angles in place
        apply_demand(&mut front, &mut rear, &SteeringDemand::Hold);
        assert_eq!((front.wheel_angle(), rear.wheel_angle()), held);
    }

    #[test]
    fn test_live_calibration_update() {
        let mut m = mapper(0.0, 0.3);
        assert_eq!(m.map_normalised_steering(1.0), 0.3);

        // A new calibration applies to the very next computation
        m.set_calib(0.0, 0.4);
        assert_eq!(m.map_normalised_steering(1.0), 0.4);
        m.write_wheel_angle(0.35);
        assert_eq!(m.wheel_angle(), 0.35);
    }
}
