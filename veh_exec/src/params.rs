//! # Vehicle Control Executable Parameters
//!
//! This module provides parameters for the vehicle control executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Top level executable parameters.
#[derive(Debug, Deserialize)]
pub struct VehExecParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Receive staleness window of the vehicle bus link.
    ///
    /// Units: seconds
    pub bus_rx_timeout_s: f64,

    /// Staleness window of the remote controller link.
    ///
    /// Units: seconds
    pub remote_timeout_s: f64,
}
