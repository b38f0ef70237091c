//! Unchi Party - authoritative room server for multiplayer dodge rounds
//!
//! The server groups clients into rooms of up to four, runs the
//! lobby/round cycle and hands every round a shared seed and start time.
//! The `client` module holds the matching client-side pieces: clock skew
//! compensation, deterministic hazard spawning and remote smoothing.

pub mod client;
pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod handlers;

// Re-export main components
pub use config::*;
pub use constants::*;
pub use handlers::routes;
