//! Speed control PI law

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PI controller producing a motor duty from a speed error.
///
/// Gains are passed into every update rather than stored, so retunes applied
/// over the bus take effect on the very next invocation.
pub struct SpeedPid {
    /// Symmetric output limit
    max_output: f64,

    /// Accumulated integral of the error
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SpeedPid {
    pub fn new(max_output: f64) -> Self {
        Self {
            max_output,
            integral: 0.0,
        }
    }

    /// Run one update of the control law and return the commanded duty.
    ///
    /// The integral is clamped so that the integral term alone can never
    /// exceed the output limit, preventing windup while the vehicle is held
    /// back from its target.
    pub fn update(
        &mut self,
        desired: f64,
        measured: f64,
        gain_p: f64,
        gain_i: f64,
        dt_s: f64,
    ) -> f64 {
        let error = desired - measured;

        self.integral += error * dt_s;
        if gain_i != 0.0 {
            let integral_limit = self.max_output / gain_i.abs();
            self.integral = clamp(&self.integral, &-integral_limit, &integral_limit);
        }

        clamp(
            &(gain_p * error + gain_i * self.integral),
            &-self.max_output,
            &self.max_output,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_proportional_action() {
        let mut pid = SpeedPid::new(1.0);

        // Pure P: output tracks the error
        assert_eq!(pid.update(1.0, 0.0, 0.5, 0.0, 0.01), 0.5);
        assert_eq!(pid.update(1.0, 2.0, 0.5, 0.0, 0.01), -0.5);
    }

    #[test]
    fn test_output_is_clamped() {
        let mut pid = SpeedPid::new(0.85);
        assert_eq!(pid.update(100.0, 0.0, 1.0, 0.0, 0.01), 0.85);
        assert_eq!(pid.update(-100.0, 0.0, 1.0, 0.0, 0.01), -0.85);
    }

    #[test]
    fn test_integral_windup_is_limited() {
        let mut pid = SpeedPid::new(1.0);

        // Hold a large error for many updates with a strong integral gain
        for _ in 0..10_000 {
            pid.update(10.0, 0.0, 0.0, 2.0, 0.01);
        }

        // Once the error clears, the integral term alone cannot exceed the
        // output limit, so the controller recovers immediately
        let output = pid.update(0.0, 0.0, 0.0, 2.0, 0.01);
        assert!(output <= 1.0);
        assert!(output >= 0.99);
    }

    #[test]
    fn test_gains_apply_immediately() {
        let mut pid = SpeedPid::new(1.0);

        assert_eq!(pid.update(1.0, 0.0, 0.1, 0.0, 0.01), 0.1);

        // A retune changes the output on the next update, no reset needed
        assert_eq!(pid.update(1.0, 0.0, 0.5, 0.0, 0.01), 0.5);
    }
}
