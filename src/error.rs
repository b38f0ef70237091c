use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnchiError {
    // Protocol errors (reported to the offending connection)
    BadJson,
    UnrecognizedMessage(String),
    RoomNotFound,
    NotInRoom,
    RoundInProgress,
    RoomFull,
    PlayerNotFound,
    NotHost(HostAction),
    NotReady,
    AlreadyInRoom,

    // Connection errors
    ConnectionError(String),
    ConnectionClosed,

    // System errors
    SystemError(String),

    // Configuration errors
    ConfigError(String),
}

/// Privileged action a non-host attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    ChangeOptions,
    StartRound,
}

impl UnchiError {
    /// Wire code sent in `error{code,msg}`
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadJson | Self::UnrecognizedMessage(_) => "bad_json",
            Self::RoomNotFound | Self::NotInRoom => "no_room",
            Self::RoundInProgress => "in_progress",
            Self::RoomFull => "full",
            Self::PlayerNotFound => "no_player",
            Self::NotHost(_) => "not_host",
            Self::NotReady => "not_ready",
            Self::AlreadyInRoom => "in_room",
            Self::ConnectionError(_) | Self::ConnectionClosed => "connection",
            Self::SystemError(_) => "system",
            Self::ConfigError(_) => "config",
        }
    }

    /// Whether this error is part of the client-facing protocol
    pub fn is_protocol(&self) -> bool {
        !matches!(
            self,
            Self::ConnectionError(_)
                | Self::ConnectionClosed
                | Self::SystemError(_)
                | Self::ConfigError(_)
        )
    }
}

impl fmt::Display for UnchiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadJson => write!(f, "Invalid JSON"),
            Self::UnrecognizedMessage(_) => write!(f, "Unrecognized message"),
            Self::RoomNotFound => write!(f, "Room not found"),
            Self::NotInRoom => write!(f, "Not in room"),
            Self::RoundInProgress => write!(f, "Round in progress"),
            Self::RoomFull => write!(f, "Room full"),
            Self::PlayerNotFound => write!(f, "Player not found"),
            Self::NotHost(HostAction::ChangeOptions) => write!(f, "Only host can change options"),
            Self::NotHost(HostAction::StartRound) => write!(f, "Only host can start"),
            Self::NotReady => write!(f, "All players must be ready"),
            Self::AlreadyInRoom => write!(f, "Already in a room"),
            Self::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            Self::ConnectionClosed => write!(f, "Connection closed unexpectedly"),
            Self::SystemError(msg) => write!(f, "System error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for UnchiError {}

// Generic result type for the crate
pub type Result<T> = std::result::Result<T, UnchiError>;
