//! # Bus command dispatch module
//!
//! Decodes frames drained from the vehicle bus and applies each one to the
//! control context. Handlers are plain mutations so unit tests can invoke
//! them without a live bus; the two wheel-parameter setters additionally
//! return an acknowledgement frame echoing the applied calibration, which
//! the main loop sends back out on the same link.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};

// Internal
use bus_if::frame::BusFrame;
use bus_if::veh::VehicleFrame;
use veh_lib::data_store::{DataStore, LateralCommand, LongitudinalCommand, WheelCalib};
use veh_lib::shared::SharedState;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a single bus frame.
///
/// Mutates the data store (or the shared motor gains) according to the
/// decoded message. Returns the acknowledgement frame to transmit, if the
/// message demands one.
///
/// Unknown identifiers are silently ignored for forward compatibility, and
/// known identifiers with malformed payloads are rejected without effect.
pub(crate) fn exec(ds: &mut DataStore, shared: &SharedState, frame: &BusFrame) -> Option<BusFrame> {
    // Decode the raw frame into a typed message
    let msg = match VehicleFrame::decode(frame) {
        Ok(Some(m)) => m,
        Ok(None) => {
            trace!("Ignoring unknown bus frame 0x{:03X}", frame.id);
            return None;
        }
        Err(e) => {
            warn!("Rejecting bus frame: {}", e);
            return None;
        }
    };

    // Handle the different messages
    match msg {
        VehicleFrame::LateralControl {
            front_angle_rad,
            rear_angle_rad,
            extra_angle_rad,
        } => {
            ds.lateral = LateralCommand {
                front_angle_rad,
                rear_angle_rad,
                extra_angle_rad,
            };
            None
        }

        VehicleFrame::LongitudinalControl {
            target_speed_ms,
            use_safety_enable,
            ramp_time_s,
        } => {
            ds.longitudinal = LongitudinalCommand {
                target_speed_ms,
                use_safety_enable,
                ramp_time_s,
            };
            None
        }

        VehicleFrame::SetMotorControlParams { gain_p, gain_i } => {
            debug!("Motor gains retuned: P = {}, I = {}", gain_p, gain_i);
            shared.motor_gains.store(gain_p, gain_i);
            None
        }

        VehicleFrame::SetFrontWheelParams {
            offset_rad,
            max_delta_rad,
        } => {
            ds.front_calib = WheelCalib {
                offset_rad,
                max_delta_rad,
            };

            // Echo the applied calibration so observers on the bus converge
            Some(
                VehicleFrame::FrontWheelParams {
                    offset_rad,
                    max_delta_rad,
                }
                .encode(),
            )
        }

        VehicleFrame::SetRearWheelParams {
            offset_rad,
            max_delta_rad,
        } => {
            ds.rear_calib = WheelCalib {
                offset_rad,
                max_delta_rad,
            };

            Some(
                VehicleFrame::RearWheelParams {
                    offset_rad,
                    max_delta_rad,
                }
                .encode(),
            )
        }

        // Our own outbound acknowledgements looped back by the bus
        VehicleFrame::FrontWheelParams { .. } | VehicleFrame::RearWheelParams { .. } => {
            trace!("Ignoring looped-back acknowledgement frame");
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_calibration_update_and_ack() {
        let mut ds = DataStore::default();
        let shared = SharedState::new(0.0, 0.0);

        let set = VehicleFrame::SetFrontWheelParams {
            offset_rad: 0.05,
            max_delta_rad: 0.3,
        };

        let ack = exec(&mut ds, &shared, &set.encode());

        // The calibration pair is applied whole
        assert_eq!(ds.front_calib.offset_rad, 0.05);
        assert_eq!(ds.front_calib.max_delta_rad, 0.3);
        assert_eq!(ds.rear_calib, WheelCalib::default());

        // Exactly one acknowledgement, echoing the applied values
        let ack = ack.expect("expected an acknowledgement frame");
        assert_eq!(
            VehicleFrame::decode(&ack).unwrap(),
            Some(VehicleFrame::FrontWheelParams {
                offset_rad: 0.05,
                max_delta_rad: 0.3,
            })
        );
    }

    #[test]
    fn test_command_updates() {
        let mut ds = DataStore::default();
        let shared = SharedState::new(0.0, 0.0);

        let lateral = VehicleFrame::LateralControl {
            front_angle_rad: 0.1,
            rear_angle_rad: -0.1,
            extra_angle_rad: 0.0,
        };
        assert!(exec(&mut ds, &shared, &lateral.encode()).is_none());
        assert_eq!(ds.lateral.front_angle_rad, 0.1);
        assert_eq!(ds.lateral.rear_angle_rad, -0.1);

        let longitudinal = VehicleFrame::LongitudinalControl {
            target_speed_ms: 2.0,
            use_safety_enable: true,
            ramp_time_s: 0.5,
        };
        assert!(exec(&mut ds, &shared, &longitudinal.encode()).is_none());
        assert_eq!(ds.longitudinal.target_speed_ms, 2.0);
        assert!(ds.longitudinal.use_safety_enable);
        assert_eq!(ds.longitudinal.ramp_time_s, 0.5);
    }

    #[test]
    fn test_motor_gains_go_to_shared_state() {
        let mut ds = DataStore::default();
        let shared = SharedState::new(0.0, 0.0);

        let retune = VehicleFrame::SetMotorControlParams {
            gain_p: 2.0,
            gain_i: 0.5,
        };
        assert!(exec(&mut ds, &shared, &retune.encode()).is_none());
        assert_eq!(shared.motor_gains.load(), (2.0, 0.5));
    }

    #[test]
    fn test_unknown_frame_is_ignored() {
        let mut ds = DataStore::default();
        let shared = SharedState::new(0.0, 0.0);

        let unknown = BusFrame::new(0x7FF, vec![0xAA; 8]).unwrap();
        assert!(exec(&mut ds, &shared, &unknown).is_none());

        // Nothing was mutated
        assert_eq!(ds.lateral, LateralCommand::default());
        assert_eq!(ds.longitudinal, LongitudinalCommand::default());
    }

    #[test]
    fn test_malformed_payload_is_rejected() {
        let mut ds = DataStore::default();
        let shared = SharedState::new(0.0, 0.0);

        // A lateral control frame two bytes short
        let truncated = BusFrame::new(bus_if::frame::id::LATERAL_CONTROL, vec![0; 4]).unwrap();
        assert!(exec(&mut ds, &shared, &truncated).is_none());
        assert_eq!(ds.lateral, LateralCommand::default());
    }
}
