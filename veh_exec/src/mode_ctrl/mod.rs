//! Mode control module
//!
//! Selects, once per control cycle, which command source drives the
//! actuators: direct manual control from the remote sticks, supervised
//! driving from the bus commands while the operator holds the dead-man
//! trigger, or the emergency-brake fallback whenever the interlock is not
//! satisfied.
//!
//! The module is level-triggered - every cycle re-derives the outputs from
//! the current inputs. Its only persistent state is the armed speed ramp.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ModeCtrl operation.
///
/// Cyclic processing itself cannot fail - every combination of inputs maps
/// onto a defined branch - so this enum is currently empty.
#[derive(Debug, thiserror::Error)]
pub enum ModeCtrlError {}
