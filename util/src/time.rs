//! General time utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A staleness watchdog.
///
/// The watchdog is considered timed out once the time since the last reset
/// strictly exceeds the configured timeout. An elapsed time exactly equal to
/// the timeout does not count as a timeout.
#[derive(Clone, Copy, Debug)]
pub struct WatchdogTimer {
    last_reset: Instant,
    timeout: Duration,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WatchdogTimer {
    /// Create a new watchdog with the given timeout, starting from now.
    pub fn new(timeout: Duration) -> Self {
        Self {
            last_reset: Instant::now(),
            timeout,
        }
    }

    /// Reset the watchdog, marking the monitored signal as fresh.
    pub fn reset(&mut self) {
        self.last_reset = Instant::now();
    }

    /// True if the monitored signal has gone stale.
    pub fn has_timed_out(&self) -> bool {
        self.has_timed_out_at(Instant::now())
    }

    /// True if the monitored signal would be stale at the given instant.
    ///
    /// Split out from [`WatchdogTimer::has_timed_out`] so that the boundary
    /// behaviour can be exercised deterministically.
    pub fn has_timed_out_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_reset) > self.timeout
    }

    /// The time since the last reset.
    pub fn elapsed(&self) -> Duration {
        self.last_reset.elapsed()
    }
}
