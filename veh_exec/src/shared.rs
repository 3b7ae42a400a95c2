//! # Shared control state
//!
//! State crossing between the control-loop task and the speed-control task.
//! Every field has exactly one writing context, so plain atomic cells are
//! enough to keep readers from ever blocking a writer:
//!
//! - vehicle speed and distance are written only by the speed controller,
//! - wheel angles are written only by the control loop,
//! - motor gains and the speed ramp are written only by the control loop.
//!
//! The motor gain pair is packed into a single atomic word and the four-field
//! ramp descriptor sits behind a version-counted snapshot cell, so neither
//! can be observed half-updated.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::atomic::{AtomicU64, Ordering};

use crate::speed_ctrl::SpeedRamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An `f64` stored in an atomic word.
pub struct AtomicF64(AtomicU64);

/// The motor controller (P, I) gain pair, packed into one atomic word so a
/// reader can never see a half-applied retune.
pub struct MotorGains(AtomicU64);

/// Snapshot cell holding the active [`SpeedRamp`].
///
/// The writer bumps the version counter to an odd value, stores the fields
/// and bumps it even again; a reader retries until it sees a stable even
/// version. The single writer never waits.
pub struct RampCell {
    version: AtomicU64,
    fields: [AtomicU64; 4],
}

/// Physical state of the vehicle.
pub struct VehicleState {
    /// Current speed. Written only by the speed controller.
    ///
    /// Units: meters/second
    pub speed_ms: AtomicF64,

    /// Distance travelled since startup. Written only by the speed controller.
    ///
    /// Units: meters
    pub distance_m: AtomicF64,

    /// Achieved front wheel angle. Written only by the control loop.
    ///
    /// Units: radians
    pub front_wheel_angle_rad: AtomicF64,

    /// Achieved rear wheel angle. Written only by the control loop.
    ///
    /// Units: radians
    pub rear_wheel_angle_rad: AtomicF64,
}

/// All state shared between the two control contexts.
pub struct SharedState {
    pub veh: VehicleState,
    pub motor_gains: MotorGains,
    pub ramp: RampCell,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release)
    }
}

impl MotorGains {
    pub fn new(gain_p: f32, gain_i: f32) -> Self {
        Self(AtomicU64::new(Self::pack(gain_p, gain_i)))
    }

    /// Store a new gain pair atomically.
    pub fn store(&self, gain_p: f32, gain_i: f32) {
        self.0.store(Self::pack(gain_p, gain_i), Ordering::Release)
    }

    /// Load the current (P, I) pair.
    pub fn load(&self) -> (f32, f32) {
        let packed = self.0.load(Ordering::Acquire);
        (
            f32::from_bits((packed >> 32) as u32),
            f32::from_bits(packed as u32),
        )
    }

    fn pack(gain_p: f32, gain_i: f32) -> u64 {
        ((gain_p.to_bits() as u64) << 32) | gain_i.to_bits() as u64
    }
}

impl RampCell {
    pub fn new(ramp: SpeedRamp) -> Self {
        Self {
            version: AtomicU64::new(0),
            fields: [
                AtomicU64::new(ramp.start_speed_ms.to_bits()),
                AtomicU64::new(ramp.target_speed_ms.to_bits()),
                AtomicU64::new(ramp.start_time_s.to_bits()),
                AtomicU64::new(ramp.duration_s.to_bits()),
            ],
        }
    }

    /// Publish a new ramp. Must only be called from the control loop.
    pub fn store(&self, ramp: &SpeedRamp) {
        self.version.fetch_add(1, Ordering::AcqRel);

        self.fields[0].store(ramp.start_speed_ms.to_bits(), Ordering::Relaxed);
        self.fields[1].store(ramp.target_speed_ms.to_bits(), Ordering::Relaxed);
        self.fields[2].store(ramp.start_time_s.to_bits(), Ordering::Relaxed);
        self.fields[3].store(ramp.duration_s.to_bits(), Ordering::Relaxed);

        self.version.fetch_add(1, Ordering::Release);
    }

    /// Read a consistent snapshot of the ramp, retrying over any concurrent
    /// store.
    pub fn load(&self) -> SpeedRamp {
        loop {
            let before = self.version.load(Ordering::Acquire);
            if before % 2 != 0 {
                // A store is in flight
                std::hint::spin_loop();
                continue;
            }

            let ramp = SpeedRamp {
                start_speed_ms: f64::from_bits(self.fields[0].load(Ordering::Acquire)),
                target_speed_ms: f64::from_bits(self.fields[1].load(Ordering::Acquire)),
                start_time_s: f64::from_bits(self.fields[2].load(Ordering::Acquire)),
                duration_s: f64::from_bits(self.fields[3].load(Ordering::Acquire)),
            };

            if self.version.load(Ordering::Acquire) == before {
                return ramp;
            }
        }
    }
}

impl SharedState {
    /// Build the shared state with the given initial motor gains, a zero
    /// ramp and the vehicle at rest.
    pub fn new(gain_p: f32, gain_i: f32) -> Self {
        Self {
            veh: VehicleState {
                speed_ms: AtomicF64::new(0.0),
                distance_m: AtomicF64::new(0.0),
                front_wheel_angle_rad: AtomicF64::new(0.0),
                rear_wheel_angle_rad: AtomicF64::new(0.0),
            },
            motor_gains: MotorGains::new(gain_p, gain_i),
            ramp: RampCell::new(SpeedRamp::default()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_atomic_f64() {
        let a = AtomicF64::new(0.0);
        a.store(-2.5);
        assert_eq!(a.load(), -2.5);
    }

    #[test]
    fn test_motor_gains_pair() {
        let gains = MotorGains::new(2.0, 0.5);
        assert_eq!(gains.load(), (2.0, 0.5));

        gains.store(1.25, 0.0625);
        assert_eq!(gains.load(), (1.25, 0.0625));
    }

    #[test]
    fn test_ramp_cell_snapshot() {
        let cell = RampCell::new(SpeedRamp::default());

        let armed = SpeedRamp {
            start_speed_ms: 0.5,
            target_speed_ms: 2.0,
            start_time_s: 10.0,
            duration_s: 0.5,
        };
        cell.store(&armed);
        assert_eq!(cell.load(), armed);
    }

    #[test]
    fn test_ramp_cell_concurrent_reads() {
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;

        let cell = Arc::new(RampCell::new(SpeedRamp::default()));
        let stop = Arc::new(AtomicBool::new(false));

        // Reader checks every snapshot is one of the two published ramps -
        // never a mixture of both
        let reader = {
            let cell = Arc::clone(&cell);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let r = cell.load();
                    assert!(
                        r == SpeedRamp::default()
                            || r == SpeedRamp {
                                start_speed_ms: 1.0,
                                target_speed_ms: 2.0,
                                start_time_s: 3.0,
                                duration_s: 4.0,
                            },
                        "torn ramp snapshot: {:?}",
                        r
                    );
                }
            })
        };

        for _ in 0..10_000 {
            cell.store(&SpeedRamp {
                start_speed_ms: 1.0,
                target_speed_ms: 2.0,
                start_time_s: 3.0,
                duration_s: 4.0,
            });
            cell.store(&SpeedRamp::default());
        }

        stop.store(true, Ordering::Relaxed);
        reader.join().unwrap();
    }
}
