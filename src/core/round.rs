//! Round scheduling: the seed and time base every client in a room shares

use chrono::Utc;
use rand::Rng;

/// Parameters of one round, fixed from acceptance until `round_end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSchedule {
    /// Seed for the clients' hazard generators
    pub seed: u32,
    /// Server clock when the round was accepted, ms since the Unix epoch
    pub server_time: i64,
    /// Simulation time zero, ms since the Unix epoch
    pub start_time: i64,
}

impl RoundSchedule {
    pub fn new(seed: u32, server_time: i64, lead_ms: i64) -> Self {
        Self {
            seed,
            server_time,
            start_time: server_time + lead_ms,
        }
    }

    /// Draw a uniform seed and schedule time zero `lead_ms` after `now`
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, now: i64, lead_ms: i64) -> Self {
        Self::new(rng.gen::<u32>(), now, lead_ms)
    }
}

/// Current wall clock in ms since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
