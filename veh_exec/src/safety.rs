//! # Safety monitor
//!
//! Tracks the freshness of the two upstream control links and fuses them
//! into the single safe-to-drive verdict consumed by the mode state machine.
//!
//! The verdict is recomputed on every cycle and never cached: one late frame
//! revokes safety immediately, and safety returns the instant both links are
//! fresh again. There is no hysteresis.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::{Duration, Instant};

use util::time::WatchdogTimer;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Safety monitor state.
///
/// The bus link tracks its own receive staleness, so the monitor owns only
/// the remote controller watchdog and takes the bus verdict as an input.
pub struct SafetyMonitor {
    remote_wd: WatchdogTimer,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SafetyMonitor {
    pub fn new(remote_timeout: Duration) -> Self {
        Self {
            remote_wd: WatchdogTimer::new(remote_timeout),
        }
    }

    /// Record that a remote controller update was received this cycle.
    pub fn note_remote_update(&mut self) {
        self.remote_wd.reset();
    }

    /// Compute the safe-to-drive verdict.
    pub fn verdict(&self, bus_rx_stale: bool) -> bool {
        self.verdict_at(bus_rx_stale, Instant::now())
    }

    /// The verdict as it would be at the given instant.
    fn verdict_at(&self, bus_rx_stale: bool, now: Instant) -> bool {
        !bus_rx_stale && !self.remote_wd.has_timed_out_at(now)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_verdict_requires_both_links() {
        let monitor = SafetyMonitor::new(Duration::from_millis(50));
        let now = Instant::now();

        // Both fresh
        assert!(monitor.verdict_at(false, now));

        // Stale bus revokes safety even with a fresh remote link
        assert!(!monitor.verdict_at(true, now));

        // Stale remote revokes safety even with a fresh bus
        let later = now + Duration::from_millis(51);
        assert!(!monitor.verdict_at(false, later));
        assert!(!monitor.verdict_at(true, later));
    }

    #[test]
    fn test_remote_update_restores_verdict() {
        let mut monitor = SafetyMonitor::new(Duration::from_millis(5));

        std::thread::sleep(Duration::from_millis(10));
        assert!(!monitor.verdict(false));

        // The verdict recovers the moment the link resumes
        monitor.note_remote_update();
        assert!(monitor.verdict(false));
    }
}
