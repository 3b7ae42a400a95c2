//! # Vehicle message set
//!
//! Typed view of the frames carried on the vehicle bus. Each message is a
//! fixed-size little-endian binary record: angles are transmitted as signed
//! milliradians, speeds as signed millimetres per second, ramp times as
//! unsigned milliseconds and motor gains as IEEE-754 single precision.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use thiserror::Error;

// Internal
use crate::frame::{id, BusFrame};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Bit of the longitudinal control flags byte carrying the safety-enable
/// requirement.
const LONG_CTRL_FLAG_USE_SAFETY_ENABLE: u8 = 0x01;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A decoded message from the vehicle bus.
///
/// Inbound messages command the control task, the two `*WheelParams`
/// variants are the outbound acknowledgements echoing a just-applied wheel
/// calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VehicleFrame {
    /// Supervisory absolute wheel angle targets.
    LateralControl {
        front_angle_rad: f64,
        rear_angle_rad: f64,
        extra_angle_rad: f64,
    },

    /// Supervisory speed target with ramp time.
    LongitudinalControl {
        target_speed_ms: f64,
        use_safety_enable: bool,
        ramp_time_s: f64,
    },

    /// Motor controller gain update.
    SetMotorControlParams { gain_p: f32, gain_i: f32 },

    /// Front wheel calibration update.
    SetFrontWheelParams {
        offset_rad: f64,
        max_delta_rad: f64,
    },

    /// Rear wheel calibration update.
    SetRearWheelParams {
        offset_rad: f64,
        max_delta_rad: f64,
    },

    /// Acknowledgement of the applied front wheel calibration.
    FrontWheelParams {
        offset_rad: f64,
        max_delta_rad: f64,
    },

    /// Acknowledgement of the applied rear wheel calibration.
    RearWheelParams {
        offset_rad: f64,
        max_delta_rad: f64,
    },
}

/// Possible decoding errors.
///
/// An unrecognised identifier is not an error, see [`VehicleFrame::decode`].
#[derive(Debug, Error)]
pub enum VehicleFrameError {
    #[error("Frame 0x{id:03X} has a {actual} byte payload, expected {expected} bytes")]
    PayloadSize {
        id: u16,
        expected: usize,
        actual: usize,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VehicleFrame {
    /// Decode a raw frame into a typed message.
    ///
    /// Returns `Ok(None)` if the identifier is not part of the vehicle
    /// message set - unknown identifiers are expected on a shared bus and
    /// must be ignored by the receiver. A recognised identifier with a
    /// payload of the wrong size is rejected.
    pub fn decode(frame: &BusFrame) -> Result<Option<Self>, VehicleFrameError> {
        let p = frame.payload();

        let msg = match frame.id {
            id::LATERAL_CONTROL => {
                check_len(frame.id, p, 6)?;
                Self::LateralControl {
                    front_angle_rad: mrad_to_rad(LittleEndian::read_i16(&p[0..2])),
                    rear_angle_rad: mrad_to_rad(LittleEndian::read_i16(&p[2..4])),
                    extra_angle_rad: mrad_to_rad(LittleEndian::read_i16(&p[4..6])),
                }
            }
            id::LONGITUDINAL_CONTROL => {
                check_len(frame.id, p, 5)?;
                Self::LongitudinalControl {
                    target_speed_ms: LittleEndian::read_i16(&p[0..2]) as f64 * 1e-3,
                    use_safety_enable: p[2] & LONG_CTRL_FLAG_USE_SAFETY_ENABLE != 0,
                    ramp_time_s: LittleEndian::read_u16(&p[3..5]) as f64 * 1e-3,
                }
            }
            id::SET_MOTOR_CONTROL_PARAMS => {
                check_len(frame.id, p, 8)?;
                Self::SetMotorControlParams {
                    gain_p: LittleEndian::read_f32(&p[0..4]),
                    gain_i: LittleEndian::read_f32(&p[4..8]),
                }
            }
            id::SET_FRONT_WHEEL_PARAMS => {
                let (offset_rad, max_delta_rad) = decode_wheel_params(frame.id, p)?;
                Self::SetFrontWheelParams {
                    offset_rad,
                    max_delta_rad,
                }
            }
            id::SET_REAR_WHEEL_PARAMS => {
                let (offset_rad, max_delta_rad) = decode_wheel_params(frame.id, p)?;
                Self::SetRearWheelParams {
                    offset_rad,
                    max_delta_rad,
                }
            }
            id::FRONT_WHEEL_PARAMS => {
                let (offset_rad, max_delta_rad) = decode_wheel_params(frame.id, p)?;
                Self::FrontWheelParams {
                    offset_rad,
                    max_delta_rad,
                }
            }
            id::REAR_WHEEL_PARAMS => {
                let (offset_rad, max_delta_rad) = decode_wheel_params(frame.id, p)?;
                Self::RearWheelParams {
                    offset_rad,
                    max_delta_rad,
                }
            }
            _ => return Ok(None),
        };

        Ok(Some(msg))
    }

    /// Encode the message into a raw frame.
    pub fn encode(&self) -> BusFrame {
        match *self {
            Self::LateralControl {
                front_angle_rad,
                rear_angle_rad,
                extra_angle_rad,
            } => {
                let mut p = Vec::with_capacity(6);
                write_mrad(&mut p, front_angle_rad);
                write_mrad(&mut p, rear_angle_rad);
                write_mrad(&mut p, extra_angle_rad);
                raw(id::LATERAL_CONTROL, p)
            }
            Self::LongitudinalControl {
                target_speed_ms,
                use_safety_enable,
                ramp_time_s,
            } => {
                let mut p = Vec::with_capacity(5);
                p.write_i16::<LittleEndian>((target_speed_ms * 1e3).round() as i16)
                    .unwrap();
                p.push(if use_safety_enable {
                    LONG_CTRL_FLAG_USE_SAFETY_ENABLE
                } else {
                    0
                });
                p.write_u16::<LittleEndian>((ramp_time_s * 1e3).round() as u16)
                    .unwrap();
                raw(id::LONGITUDINAL_CONTROL, p)
            }
            Self::SetMotorControlParams { gain_p, gain_i } => {
                let mut p = Vec::with_capacity(8);
                p.write_f32::<LittleEndian>(gain_p).unwrap();
                p.write_f32::<LittleEndian>(gain_i).unwrap();
                raw(id::SET_MOTOR_CONTROL_PARAMS, p)
            }
            Self::SetFrontWheelParams {
                offset_rad,
                max_delta_rad,
            } => raw(
                id::SET_FRONT_WHEEL_PARAMS,
                encode_wheel_params(offset_rad, max_delta_rad),
            ),
            Self::SetRearWheelParams {
                offset_rad,
                max_delta_rad,
            } => raw(
                id::SET_REAR_WHEEL_PARAMS,
                encode_wheel_params(offset_rad, max_delta_rad),
            ),
            Self::FrontWheelParams {
                offset_rad,
                max_delta_rad,
            } => raw(
                id::FRONT_WHEEL_PARAMS,
                encode_wheel_params(offset_rad, max_delta_rad),
            ),
            Self::RearWheelParams {
                offset_rad,
                max_delta_rad,
            } => raw(
                id::REAR_WHEEL_PARAMS,
                encode_wheel_params(offset_rad, max_delta_rad),
            ),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check_len(id: u16, payload: &[u8], expected: usize) -> Result<(), VehicleFrameError> {
    if payload.len() != expected {
        return Err(VehicleFrameError::PayloadSize {
            id,
            expected,
            actual: payload.len(),
        });
    }

    Ok(())
}

fn decode_wheel_params(id: u16, payload: &[u8]) -> Result<(f64, f64), VehicleFrameError> {
    check_len(id, payload, 4)?;

    Ok((
        mrad_to_rad(LittleEndian::read_i16(&payload[0..2])),
        mrad_to_rad(LittleEndian::read_i16(&payload[2..4])),
    ))
}

fn encode_wheel_params(offset_rad: f64, max_delta_rad: f64) -> Vec<u8> {
    let mut p = Vec::with_capacity(4);
    write_mrad(&mut p, offset_rad);
    write_mrad(&mut p, max_delta_rad);
    p
}

fn mrad_to_rad(mrad: i16) -> f64 {
    mrad as f64 * 1e-3
}

fn write_mrad(payload: &mut Vec<u8>, angle_rad: f64) {
    // Writing to a Vec cannot fail
    payload
        .write_i16::<LittleEndian>((angle_rad * 1e3).round() as i16)
        .unwrap();
}

fn raw(id: u16, payload: Vec<u8>) -> BusFrame {
    BusFrame { id, payload }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode_lateral_control() {
        // 300 mrad front, -300 mrad rear, 0 extra
        let frame = BusFrame::new(
            id::LATERAL_CONTROL,
            vec![0x2C, 0x01, 0xD4, 0xFE, 0x00, 0x00],
        )
        .unwrap();

        match VehicleFrame::decode(&frame).unwrap() {
            Some(VehicleFrame::LateralControl {
                front_angle_rad,
                rear_angle_rad,
                extra_angle_rad,
            }) => {
                assert!((front_angle_rad - 0.3).abs() < 1e-9);
                assert!((rear_angle_rad + 0.3).abs() < 1e-9);
                assert_eq!(extra_angle_rad, 0.0);
            }
            other => panic!("unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn test_decode_longitudinal_control() {
        // 2000 mm/s, safety enable required, 500 ms ramp
        let frame = BusFrame::new(
            id::LONGITUDINAL_CONTROL,
            vec![0xD0, 0x07, 0x01, 0xF4, 0x01],
        )
        .unwrap();

        match VehicleFrame::decode(&frame).unwrap() {
            Some(VehicleFrame::LongitudinalControl {
                target_speed_ms,
                use_safety_enable,
                ramp_time_s,
            }) => {
                assert!((target_speed_ms - 2.0).abs() < 1e-9);
                assert!(use_safety_enable);
                assert!((ramp_time_s - 0.5).abs() < 1e-9);
            }
            other => panic!("unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn test_motor_gains_are_exact() {
        let sent = VehicleFrame::SetMotorControlParams {
            gain_p: 0.125,
            gain_i: 0.0625,
        };

        // f32 gains cross the bus without loss
        assert_eq!(
            VehicleFrame::decode(&sent.encode()).unwrap(),
            Some(sent)
        );
    }

    #[test]
    fn test_wheel_params_ack_roundtrip() {
        let ack = VehicleFrame::FrontWheelParams {
            offset_rad: 0.05,
            max_delta_rad: 0.3,
        };

        assert_eq!(VehicleFrame::decode(&ack.encode()).unwrap(), Some(ack));
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let frame = BusFrame::new(0x7FF, vec![1, 2, 3]).unwrap();
        assert!(VehicleFrame::decode(&frame).unwrap().is_none());
    }

    #[test]
    fn test_bad_payload_size_is_rejected() {
        let frame = BusFrame::new(id::SET_FRONT_WHEEL_PARAMS, vec![0x00, 0x01]).unwrap();

        assert!(matches!(
            VehicleFrame::decode(&frame),
            Err(VehicleFrameError::PayloadSize {
                id: id::SET_FRONT_WHEEL_PARAMS,
                expected: 4,
                actual: 2,
            })
        ));
    }
}
