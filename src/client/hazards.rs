//! Deterministic hazard schedule
//!
//! Spawn times depend only on the seed, the difficulty and a spawn cursor,
//! never on frame timing. Advancing to a given elapsed time always performs
//! the same generator draws, however that time was reached.

use crate::client::random::SeededRandom;
use crate::constants::{
    ARENA_HEIGHT, ARENA_MAX_X, ARENA_MIN_X, ARENA_WIDTH, PLAYER_SIZE, PLAYER_Y,
};
use crate::core::message_types::Difficulty;

const BASE_INTERVAL: f64 = 0.9;
const INTERVAL_FLOOR: f64 = 0.28;
const INTERVAL_TIGHTEN_PER_SEC: f64 = 0.025;
const SPEED_GAIN_PER_SEC: f64 = 6.0;
const OFF_SCREEN_PADDING: f64 = 60.0;

/// Axis-aligned box, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn centered(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self { x: cx - w / 2.0, y: cy - h / 2.0, w, h }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

/// Clamp local movement into the playable strip
pub fn clamp_to_arena(x: f64) -> f64 {
    x.clamp(ARENA_MIN_X, ARENA_MAX_X)
}

/// The local player's box at horizontal position `x`
pub fn player_bounds(x: f64) -> Rect {
    Rect::centered(x, PLAYER_Y, PLAYER_SIZE, PLAYER_SIZE)
}

/// Pacing multipliers per difficulty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub interval_scale: f64,
    pub speed_scale: f64,
}

impl From<Difficulty> for DifficultyProfile {
    fn from(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self { interval_scale: 1.25, speed_scale: 0.85 },
            Difficulty::Normal => Self { interval_scale: 1.0, speed_scale: 1.0 },
            Difficulty::Hard => Self { interval_scale: 0.75, speed_scale: 1.2 },
        }
    }
}

/// Seconds until the next spawn when the previous one happened at `t`
pub fn spawn_interval(t: f64, profile: DifficultyProfile) -> f64 {
    (BASE_INTERVAL - t * INTERVAL_TIGHTEN_PER_SEC).max(INTERVAL_FLOOR) * profile.interval_scale
}

/// One falling hazard. Its position is a pure function of elapsed time.
#[derive(Debug, Clone, PartialEq)]
pub struct Hazard {
    /// Elapsed seconds at spawn
    pub spawned_at: f64,
    pub x: f64,
    pub size: f64,
    /// Fall speed, px/s
    pub speed: f64,
    pub rotation: f64,
}

impl Hazard {
    pub fn y_at(&self, elapsed: f64) -> f64 {
        -self.size + self.speed * (elapsed - self.spawned_at)
    }

    pub fn bounds_at(&self, elapsed: f64) -> Rect {
        Rect::centered(self.x, self.y_at(elapsed), self.size, self.size)
    }

    pub fn off_screen(&self, elapsed: f64) -> bool {
        self.y_at(elapsed) - self.size / 2.0 > ARENA_HEIGHT + OFF_SCREEN_PADDING
    }
}

/// Seeded hazard generator for one round
#[derive(Debug, Clone)]
pub struct HazardSpawner {
    rng: SeededRandom,
    profile: DifficultyProfile,
    /// Elapsed time of the next scheduled spawn
    next_spawn_at: f64,
    spawned: u64,
    hazards: Vec<Hazard>,
}

impl HazardSpawner {
    pub fn new(seed: u32, difficulty: Difficulty) -> Self {
        Self {
            rng: SeededRandom::new(seed),
            profile: difficulty.into(),
            next_spawn_at: 0.0,
            spawned: 0,
            hazards: Vec::new(),
        }
    }

    /// Catch up to `elapsed`, spawning every hazard due by then.
    /// Returns how many were spawned by this call.
    pub fn advance(&mut self, elapsed: f64) -> usize {
        let mut count = 0;
        while elapsed >= self.next_spawn_at {
            let at = self.next_spawn_at;
            let hazard = self.draw(at);
            self.hazards.push(hazard);
            self.next_spawn_at = at + spawn_interval(at, self.profile);
            self.spawned += 1;
            count += 1;
        }
        self.hazards.retain(|h| !h.off_screen(elapsed));
        count
    }

    // Draw order is part of the cross-client contract
    fn draw(&mut self, at: f64) -> Hazard {
        let size = self.rng.next_range(26.0, 44.0);
        let x = self.rng.next_range(size / 2.0, ARENA_WIDTH - size / 2.0);
        let speed =
            (self.rng.next_range(130.0, 220.0) + at * SPEED_GAIN_PER_SEC) * self.profile.speed_scale;
        let rotation = self.rng.next_range(-0.8, 0.8);
        Hazard { spawned_at: at, x, size, speed, rotation }
    }

    /// Total spawned this round
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Hazards still on screen as of the last `advance`
    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    /// Whether any live hazard overlaps the player at `player_x`
    pub fn hits(&self, player_x: f64, elapsed: f64) -> bool {
        let player = player_bounds(player_x);
        self.hazards
            .iter()
            .any(|h| h.bounds_at(elapsed).intersects(&player))
    }
}
