//! Smoothing of remote player positions

use std::collections::HashMap;

use crate::constants::{INTERPOLATION_FACTOR, POSITION_SEND_INTERVAL_MS};
use crate::core::message_types::PositionSample;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Track {
    x: f64,
    last_t: i64,
}

/// Exponential smoothing per remote player, stepped once per received
/// sample rather than per frame. No extrapolation.
#[derive(Debug, Clone)]
pub struct RemoteInterpolator {
    factor: f64,
    tracks: HashMap<String, Track>,
}

impl Default for RemoteInterpolator {
    fn default() -> Self {
        Self::new(INTERPOLATION_FACTOR)
    }
}

impl RemoteInterpolator {
    pub fn new(factor: f64) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
            tracks: HashMap::new(),
        }
    }

    /// Fold in one sample. The first sample for a player snaps.
    pub fn apply(&mut self, sample: &PositionSample) {
        let factor = self.factor;
        self.tracks
            .entry(sample.id.clone())
            .and_modify(|track| {
                track.x += (sample.x - track.x) * factor;
                track.last_t = sample.t;
            })
            .or_insert(Track { x: sample.x, last_t: sample.t });
    }

    pub fn position(&self, player_id: &str) -> Option<f64> {
        self.tracks.get(player_id).map(|t| t.x)
    }

    /// Server time of the newest sample for a player
    pub fn last_sample_time(&self, player_id: &str) -> Option<i64> {
        self.tracks.get(player_id).map(|t| t.last_t)
    }

    /// Forget players not in `keep`
    pub fn retain<'a, I>(&mut self, keep: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: Vec<&str> = keep.into_iter().collect();
        self.tracks.retain(|id, _| keep.contains(&id.as_str()));
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Rate limit for outbound `pos`, independent of the render loop
#[derive(Debug, Clone)]
pub struct PositionThrottle {
    interval_ms: i64,
    last_sent: Option<i64>,
}

impl Default for PositionThrottle {
    fn default() -> Self {
        Self::new(POSITION_SEND_INTERVAL_MS)
    }
}

impl PositionThrottle {
    pub fn new(interval_ms: i64) -> Self {
        Self { interval_ms, last_sent: None }
    }

    /// True at most once per interval; records the send when true
    pub fn should_send(&mut self, now: i64) -> bool {
        match self.last_sent {
            Some(last) if now - last < self.interval_ms => false,
            _ => {
                self.last_sent = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}
