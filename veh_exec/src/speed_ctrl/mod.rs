//! Closed-loop speed control module
//!
//! Runs on its own fixed-period task, faster than and fully asynchronous to
//! the main control loop. Each invocation samples the encoder, refreshes the
//! vehicle speed and distance estimate, and drives the motor towards the
//! instantaneous target of the speed ramp armed by the mode control module.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod pid;
mod ramp;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
pub use params::*;
pub use pid::*;
pub use ramp::*;
pub use state::*;

use bus_if::eqpt::{Encoder, MotorDriver};
use crate::shared::SharedState;
use util::session;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the speed control task until the shutdown flag is raised.
///
/// Intended to be spawned on its own thread. The task steps the controller
/// on a fixed deadline schedule; overruns are logged but do not shift the
/// schedule.
pub fn run(
    params: Params,
    shared: Arc<SharedState>,
    mut encoder: Box<dyn Encoder + Send>,
    mut motor: Box<dyn MotorDriver + Send>,
    shutdown: Arc<AtomicBool>,
) {
    let period = Duration::from_secs_f64(params.period_s);
    let mut ctrl = SpeedCtrl::new(params);

    info!("Speed control task started, period {:?}", period);

    let mut next_deadline = Instant::now() + period;

    while !shutdown.load(Ordering::Relaxed) {
        ctrl.step(
            &shared,
            encoder.as_mut(),
            motor.as_mut(),
            session::get_elapsed_seconds(),
        );

        match next_deadline.checked_duration_since(Instant::now()) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Speed control step overran its {:?} period",
                period
            ),
        }

        next_deadline += period;
    }

    // Leave the motor unpowered on the way out
    motor.write(0.0);

    info!("Speed control task stopped");
}
