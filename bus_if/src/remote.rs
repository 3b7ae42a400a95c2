//! # Remote controller command definitions

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The most recent state decoded from the remote controller receiver.
///
/// Channel values are normalised by the receiver before they reach the
/// control software: the control task may assume both sticks lie in
/// `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemoteCommand {
    /// Normalised acceleration demand in `[-1.0, 1.0]`
    pub acceleration: f64,

    /// Normalised steering demand in `[-1.0, 1.0]`
    pub steering: f64,

    /// The channel the operator currently has active
    pub channel: RemoteChannel,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The remote controller channel selecting the control mode.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum RemoteChannel {
    /// Manual driving - sticks map directly onto the actuators
    DirectControl,

    /// Supervised driving - the operator holds the dead-man trigger while
    /// commands come in over the bus
    SafetyEnable,

    /// No recognised channel active
    Unassigned,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RemoteCommand {
    fn default() -> Self {
        Self {
            acceleration: 0.0,
            steering: 0.0,
            channel: RemoteChannel::Unassigned,
        }
    }
}
