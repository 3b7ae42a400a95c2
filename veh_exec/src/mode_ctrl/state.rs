//! Implementations for the ModeCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{ModeCtrlError, Params};
use crate::data_store::{LateralCommand, LongitudinalCommand};
use crate::speed_ctrl::SpeedRamp;
use crate::steer_ctrl::SteeringDemand;
use bus_if::remote::{RemoteChannel, RemoteCommand};
use util::maths::lin_map;
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Mode control module state
#[derive(Default)]
pub struct ModeCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    /// The armed speed ramp. This descriptor is the module's only state
    /// that survives between cycles.
    pub(crate) ramp: SpeedRamp,
}

/// Input data to mode control, assembled fresh every cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Latest remote controller state
    pub remote: RemoteCommand,

    /// Latest supervisory lateral command
    pub lateral: LateralCommand,

    /// Latest supervisory longitudinal command
    pub longitudinal: LongitudinalCommand,

    /// The safety monitor's verdict for this cycle
    pub safe_to_drive: bool,

    /// Current measured speed, used as the start point of re-armed ramps.
    ///
    /// Units: meters/second
    pub current_speed_ms: f64,

    /// Current session time.
    ///
    /// Units: seconds
    pub time_s: f64,
}

/// Output demands from ModeCtrl for this cycle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct OutputData {
    /// Demand for both steering axles
    pub steering: SteeringDemand,

    /// The ramp as armed after this cycle
    pub ramp: SpeedRamp,
}

/// Status report for ModeCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The ramp was re-armed this cycle
    pub ramp_rearmed: bool,

    /// The emergency-brake branch was active this cycle
    pub emergency_brake: bool,

    /// The dead-man interlock was satisfied this cycle
    pub interlock_satisfied: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ModeCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ModeCtrlError;

    /// Initialise the ModeCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;

        // The ramp starts as the zero ramp, which `Default` already provides

        Ok(())
    }

    /// Perform cyclic processing of mode control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let steering = match input_data.remote.channel {
            RemoteChannel::DirectControl => self.proc_direct_control(input_data),
            RemoteChannel::SafetyEnable => self.proc_safety_enable(input_data),
            // Any other channel leaves the actuators holding their last
            // demands
            RemoteChannel::Unassigned => SteeringDemand::Hold,
        };

        let output = OutputData {
            steering,
            ramp: self.ramp,
        };

        trace!(
            "ModeCtrl output:\n    steering: {:?}\n    ramp: {:?}",
            output.steering,
            output.ramp
        );

        Ok((output, self.report))
    }
}

impl ModeCtrl {
    /// Process the direct control branch.
    ///
    /// The acceleration stick maps straight onto a speed and the ramp
    /// collapses to an instantaneous step - manual throttle is never ramped.
    /// Steering couples both axles from the single stick value.
    fn proc_direct_control(&mut self, input: &InputData) -> SteeringDemand {
        let speed_ms = lin_map(
            (-1.0, 1.0),
            (
                -self.params.direct_control_max_speed_ms,
                self.params.direct_control_max_speed_ms,
            ),
            input.remote.acceleration,
        );

        self.ramp = SpeedRamp::step(speed_ms, input.time_s);

        SteeringDemand::Coupled(input.remote.steering)
    }

    /// Process the safety enable branch.
    ///
    /// Supervised driving requires the safety verdict AND the operator
    /// holding the acceleration channel inside the armed dead-man band.
    /// Without both, the vehicle is forced onto the emergency-brake ramp
    /// with centred steering, re-evaluated every cycle until the condition
    /// clears.
    fn proc_safety_enable(&mut self, input: &InputData) -> SteeringDemand {
        let armed = input.safe_to_drive
            && input.remote.acceleration >= self.params.interlock_accel_min
            && input.remote.acceleration <= self.params.interlock_accel_max;

        self.report.interlock_satisfied = armed;

        if armed {
            self.arm_ramp(
                input.longitudinal.target_speed_ms,
                input.longitudinal.ramp_time_s,
                input,
            );

            SteeringDemand::Absolute {
                front_angle_rad: input.lateral.front_angle_rad,
                rear_angle_rad: input.lateral.rear_angle_rad,
            }
        } else {
            self.report.emergency_brake = true;

            self.arm_ramp(0.0, self.params.emergency_brake_duration_s, input);

            SteeringDemand::Centre
        }
    }

    /// Re-arm the ramp from the current measured speed, if and only if the
    /// demanded (target, duration) pair differs from the armed one.
    ///
    /// The guard keeps a repeated identical command from restarting the
    /// ramp every cycle while still responding immediately to new commands.
    fn arm_ramp(&mut self, target_speed_ms: f64, duration_s: f64, input: &InputData) {
        if self.ramp.target_speed_ms == target_speed_ms && self.ramp.duration_s == duration_s {
            return;
        }

        self.ramp = SpeedRamp {
            start_speed_ms: input.current_speed_ms,
            target_speed_ms,
            start_time_s: input.time_s,
            duration_s,
        };
        self.report.ramp_rearmed = true;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bus_if::remote::RemoteChannel;

    fn mode_ctrl() -> ModeCtrl {
        ModeCtrl {
            params: Params {
                direct_control_max_speed_ms: 3.0,
                interlock_accel_min: 0.5,
                interlock_accel_max: 1.0,
                emergency_brake_duration_s: 0.4,
            },
            report: StatusReport::default(),
            ramp: SpeedRamp::default(),
        }
    }

    fn supervised_input(acceleration: f64, safe_to_drive: bool) -> InputData {
        InputData {
            remote: RemoteCommand {
                acceleration,
                steering: 0.0,
                channel: RemoteChannel::SafetyEnable,
            },
            lateral: LateralCommand {
                front_angle_rad: 0.1,
                rear_angle_rad: -0.05,
                extra_angle_rad: 0.0,
            },
            longitudinal: LongitudinalCommand {
                target_speed_ms: 2.0,
                use_safety_enable: true,
                ramp_time_s: 0.5,
            },
            safe_to_drive,
            current_speed_ms: 0.0,
            time_s: 10.0,
        }
    }

    #[test]
    fn test_direct_control() {
        let mut mc = mode_ctrl();

        let input = InputData {
            remote: RemoteCommand {
                acceleration: 0.5,
                steering: 1.0,
                channel: RemoteChannel::DirectControl,
            },
            time_s: 10.0,
            ..InputData::default()
        };

        let (output, _) = mc.proc(&input).unwrap();

        // Steering couples both axles from the stick
        assert_eq!(output.steering, SteeringDemand::Coupled(1.0));

        // Half stick onto a 3 m/s maximum is an instantaneous 1.5 m/s
        assert_eq!(output.ramp.target_speed_ms, 1.5);
        assert_eq!(output.ramp.start_speed_ms, 1.5);
        assert_eq!(output.ramp.duration_s, 0.0);
        assert_eq!(output.ramp.target_at(input.time_s), 1.5);
    }

    #[test]
    fn test_supervised_ramp_arming() {
        let mut mc = mode_ctrl();

        let input = supervised_input(0.7, true);
        let (output, report) = mc.proc(&input).unwrap();

        // New (target, duration) pair arms the ramp from the measured speed
        assert!(report.ramp_rearmed);
        assert!(report.interlock_satisfied);
        assert_eq!(output.ramp.start_speed_ms, 0.0);
        assert_eq!(output.ramp.target_speed_ms, 2.0);
        assert_eq!(output.ramp.start_time_s, 10.0);
        assert_eq!(output.ramp.duration_s, 0.5);

        // Wheel angles pass through uncoupled
        assert_eq!(
            output.steering,
            SteeringDemand::Absolute {
                front_angle_rad: 0.1,
                rear_angle_rad: -0.05,
            }
        );

        // Halfway through the ramp the interpolated target is 1 m/s
        assert!((output.ramp.target_at(10.25) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_command_does_not_rearm() {
        let mut mc = mode_ctrl();

        mc.proc(&supervised_input(0.7, true)).unwrap();

        // The identical command arrives again later, with the vehicle moving
        let mut repeat = supervised_input(0.7, true);
        repeat.time_s = 10.3;
        repeat.current_speed_ms = 1.2;

        let (output, report) = mc.proc(&repeat).unwrap();
        assert!(!report.ramp_rearmed);
        assert_eq!(output.ramp.start_time_s, 10.0);
        assert_eq!(output.ramp.start_speed_ms, 0.0);

        // A changed duration re-arms immediately
        let mut changed = repeat;
        changed.longitudinal.ramp_time_s = 1.0;
        let (output, report) = mc.proc(&changed).unwrap();
        assert!(report.ramp_rearmed);
        assert_eq!(output.ramp.start_time_s, 10.3);
        assert_eq!(output.ramp.start_speed_ms, 1.2);
    }

    #[test]
    fn test_interlock_band_boundaries() {
        let mut mc = mode_ctrl();

        // Both band edges count as armed
        let (_, report) = mc.proc(&supervised_input(0.5, true)).unwrap();
        assert!(report.interlock_satisfied);
        let (_, report) = mc.proc(&supervised_input(1.0, true)).unwrap();
        assert!(report.interlock_satisfied);

        // Outside the band the trigger is released
        let (_, report) = mc.proc(&supervised_input(0.49, true)).unwrap();
        assert!(!report.interlock_satisfied);
        assert!(report.emergency_brake);
    }

    #[test]
    fn test_emergency_brake() {
        let mut mc = mode_ctrl();

        // Get the vehicle into supervised driving first
        mc.proc(&supervised_input(0.7, true)).unwrap();

        // Safety verdict drops: steering centres and the brake ramp arms,
        // whatever the pending supervisory commands say
        let mut input = supervised_input(0.7, false);
        input.time_s = 10.2;
        input.current_speed_ms = 1.5;

        let (output, report) = mc.proc(&input).unwrap();
        assert!(report.emergency_brake);
        assert!(report.ramp_rearmed);
        assert_eq!(output.steering, SteeringDemand::Centre);
        assert_eq!(output.ramp.target_speed_ms, 0.0);
        assert_eq!(output.ramp.duration_s, 0.4);
        assert_eq!(output.ramp.start_speed_ms, 1.5);

        // The brake ramp is not re-armed while it is already active
        let mut next = input;
        next.time_s = 10.3;
        next.current_speed_ms = 1.0;
        let (output, report) = mc.proc(&next).unwrap();
        assert!(report.emergency_brake);
        assert!(!report.ramp_rearmed);
        assert_eq!(output.ramp.start_time_s, 10.2);
    }

    #[test]
    fn test_unassigned_channel_holds() {
        let mut mc = mode_ctrl();

        mc.proc(&supervised_input(0.7, true)).unwrap();
        let armed = mc.ramp;

        let input = InputData {
            remote: RemoteCommand::default(),
            time_s: 11.0,
            ..InputData::default()
        };

        // No actuator update and no ramp change on an unassigned channel
        let (output, _) = mc.proc(&input).unwrap();
        assert_eq!(output.steering, SteeringDemand::Hold);
        assert_eq!(output.ramp, armed);
    }
}
