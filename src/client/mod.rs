//! Client-side synchronization core
//!
//! Everything a client needs to turn server events into a simulation that
//! matches every other client in the room: the shared time base, the
//! seeded hazard schedule and smoothing of remote positions.

pub mod clock;
pub mod hazards;
pub mod interpolation;
pub mod random;
pub mod session;

pub use clock::ClockSync;
pub use hazards::{HazardSpawner, Rect};
pub use interpolation::{PositionThrottle, RemoteInterpolator};
pub use random::SeededRandom;
pub use session::{ClientSession, LocalPhase, LocalRole, RenderState};
