// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const WS_PATH: &str = "ws";

// Room constants
pub const MAX_ROOM_PLAYERS: usize = 4;
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const ROOM_CODE_LENGTH: usize = 6;
pub const MAX_NAME_LENGTH: usize = 16;
pub const DEFAULT_PLAYER_NAME: &str = "Player";

// Round timing
pub const DEFAULT_ROUND_LEAD_MS: i64 = 1500;
pub const MAX_ROUND_LEAD_MS: i64 = 10_000;

// Arena geometry (logical pixels)
pub const ARENA_WIDTH: f64 = 480.0;
pub const ARENA_HEIGHT: f64 = 720.0;
pub const PLAYER_SIZE: f64 = 42.0;
pub const PLAYER_Y: f64 = ARENA_HEIGHT - 60.0;
pub const ARENA_MARGIN: f64 = 10.0;
// Server-side bounds for relayed positions: player fully inside the walls
pub const RELAY_MIN_X: f64 = PLAYER_SIZE / 2.0;
pub const RELAY_MAX_X: f64 = ARENA_WIDTH - PLAYER_SIZE / 2.0;
// Client movement bounds, kept a margin off the walls
pub const ARENA_MIN_X: f64 = ARENA_MARGIN + PLAYER_SIZE / 2.0;
pub const ARENA_MAX_X: f64 = ARENA_WIDTH - ARENA_MARGIN - PLAYER_SIZE / 2.0;
pub const PLAYER_START_X: f64 = ARENA_WIDTH / 2.0;

// Client sync
pub const POSITION_SEND_INTERVAL_MS: i64 = 50;
pub const INTERPOLATION_FACTOR: f64 = 0.4;
