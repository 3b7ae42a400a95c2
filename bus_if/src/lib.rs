//! # Bus interface crate.
//!
//! Provides the vehicle bus wire definitions and the equipment interfaces
//! shared between the control software and the subsystems it commands.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Raw bus frames and the stable message identifiers
pub mod frame;

/// Typed vehicle messages and their binary payload codecs
pub mod veh;

/// Remote controller command definitions
pub mod remote;

/// Bus link abstraction - non-blocking receive plus staleness query
pub mod link;

/// Equipment interfaces (motor, encoder, steering actuator)
pub mod eqpt;
