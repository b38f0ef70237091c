//! Core functionality for the room server

pub mod actor;
pub mod code;
pub mod connection;
pub mod message_types;
pub mod registry;
pub mod room;
pub mod round;

// Re-export main components for convenience
pub use actor::{RoomAction, RoomHandle};
pub use connection::Connection;
pub use message_types::{ClientMessage, ServerMessage};
pub use registry::RoomRegistry;
pub use room::{Room, Target};
pub use round::RoundSchedule;
