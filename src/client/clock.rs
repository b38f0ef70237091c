//! Shared round time base

/// Maps the local wall clock onto the round's simulation clock.
///
/// Skew is measured once, when `round_start` arrives; elapsed time is then
/// derived from the wall clock on every call instead of summing frame
/// deltas, so clients with different frame rates stay on one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSync {
    /// local clock minus server clock, ms
    skew_ms: i64,
    /// Round time zero on the server clock, ms since the Unix epoch
    start_time: i64,
}

impl ClockSync {
    pub fn new(server_time: i64, start_time: i64, local_receipt: i64) -> Self {
        Self {
            skew_ms: local_receipt - server_time,
            start_time,
        }
    }

    pub fn skew_ms(&self) -> i64 {
        self.skew_ms
    }

    /// Local instant translated to the server clock
    pub fn server_now(&self, local_now: i64) -> i64 {
        local_now - self.skew_ms
    }

    /// Milliseconds until time zero, negative once started
    pub fn countdown_ms(&self, local_now: i64) -> i64 {
        self.start_time - self.server_now(local_now)
    }

    pub fn started(&self, local_now: i64) -> bool {
        self.countdown_ms(local_now) <= 0
    }

    /// Simulation seconds since time zero, clamped at zero
    pub fn elapsed(&self, local_now: i64) -> f64 {
        ((self.server_now(local_now) - self.start_time) as f64 / 1000.0).max(0.0)
    }
}
