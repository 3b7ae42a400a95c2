//! Implementations for the SpeedCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use bus_if::eqpt::{Encoder, MotorDriver};

// Internal
use super::Params;
use crate::shared::SharedState;
use crate::speed_ctrl::pid::SpeedPid;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Closed-loop speed controller state.
///
/// One instance lives on the speed control task. Each [`SpeedCtrl::step`]
/// samples the encoder, refreshes the vehicle speed/distance estimate and
/// drives the motor towards the ramp target published by the control loop.
pub struct SpeedCtrl {
    params: Params,
    pid: SpeedPid,

    /// Session time of the previous step, `None` before the first step.
    last_update_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SpeedCtrl {
    pub fn new(params: Params) -> Self {
        let pid = SpeedPid::new(params.motor_max_duty);

        Self {
            params,
            pid,
            last_update_s: None,
        }
    }

    /// Run one invocation of the speed control law.
    ///
    /// The first invocation establishes the timing baseline and leaves the
    /// motor unpowered, since no speed estimate exists yet.
    pub fn step(
        &mut self,
        shared: &SharedState,
        encoder: &mut dyn Encoder,
        motor: &mut dyn MotorDriver,
        time_s: f64,
    ) {
        encoder.update();

        // Total distance is exact regardless of timing
        let distance_m = encoder.total_increments() as f64 * self.params.encoder_incr_distance_m;
        shared.veh.distance_m.store(distance_m);

        let last_update_s = match self.last_update_s {
            Some(t) => t,
            None => {
                self.last_update_s = Some(time_s);
                motor.write(0.0);
                return;
            }
        };

        let dt_s = time_s - last_update_s;
        self.last_update_s = Some(time_s);
        if dt_s <= 0.0 {
            return;
        }

        let delta_m = encoder.last_increment_delta() as f64 * self.params.encoder_incr_distance_m;
        let speed_ms = delta_m / dt_s;
        shared.veh.speed_ms.store(speed_ms);

        // Evaluate the ramp with the descriptor as armed right now - the
        // target keeps moving between control loop cycles
        let desired_ms = shared.ramp.load().target_at(time_s);

        // Gains are read fresh so bus retunes apply without a restart
        let (gain_p, gain_i) = shared.motor_gains.load();

        let duty = self.pid.update(
            desired_ms,
            speed_ms,
            gain_p as f64,
            gain_i as f64,
            dt_s,
        );
        motor.write(duty);
    }
}
