//! Message types for room-based play

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, UnchiError};

/// Client-to-server message types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a room and become its host
    CreateRoom {
        #[serde(default)]
        name: Option<String>,
    },

    /// Join an existing room by code
    JoinRoom {
        #[serde(rename = "roomId", default)]
        room_id: String,
        #[serde(default)]
        name: Option<String>,
    },

    /// Mark the sender ready or not ready
    SetReady {
        #[serde(default)]
        ready: bool,
    },

    /// Change room options (host only, lobby only). Invalid fields are
    /// ignored rather than rejected.
    #[serde(rename_all = "camelCase")]
    SetOptions {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        difficulty: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_collision: Option<serde_json::Value>,
    },

    /// Start a round (host only)
    StartRound {},

    /// Local position sample
    Pos {
        #[serde(default)]
        x: Option<f64>,
    },

    /// Local player died
    Dead {},

    /// Leave the room and close the connection
    Leave {},
}

impl ClientMessage {
    /// Message type name as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "create_room",
            Self::JoinRoom { .. } => "join_room",
            Self::SetReady { .. } => "set_ready",
            Self::SetOptions { .. } => "set_options",
            Self::StartRound {} => "start_round",
            Self::Pos { .. } => "pos",
            Self::Dead {} => "dead",
            Self::Leave {} => "leave",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| UnchiError::SystemError(e.to_string()))
    }
}

/// Decode one inbound text frame.
///
/// Frames that are not JSON at all are `BadJson`; JSON whose `type` is
/// unknown or whose fields have the wrong shape is `UnrecognizedMessage`.
/// Both go out as `bad_json`.
pub fn decode_client_message(text: &str) -> Result<ClientMessage> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| UnchiError::BadJson)?;
    serde_json::from_value(value).map_err(|e| UnchiError::UnrecognizedMessage(e.to_string()))
}

/// Server-to-client message types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Assigned player identity, sent once after room entry
    Hello { id: String },

    /// Full room snapshot
    RoomState(RoomSnapshot),

    /// Round parameters shared by every member
    #[serde(rename_all = "camelCase")]
    RoundStart {
        seed: u32,
        start_time: i64,
        server_time: i64,
        options: RoomOptions,
    },

    /// Relayed position samples of other players
    Positions { positions: Vec<PositionSample> },

    /// A player died this round
    PlayerDead { id: String },

    /// Round finished
    #[serde(rename_all = "camelCase")]
    RoundEnd {
        winner_id: Option<String>,
        ranks: Vec<RankEntry>,
    },

    /// Rejected command
    Error { code: String, msg: String },
}

impl ServerMessage {
    pub fn error(err: &UnchiError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "hello",
            Self::RoomState(_) => "room_state",
            Self::RoundStart { .. } => "round_start",
            Self::Positions { .. } => "positions",
            Self::PlayerDead { .. } => "player_dead",
            Self::RoundEnd { .. } => "round_end",
            Self::Error { .. } => "error",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| UnchiError::SystemError(e.to_string()))
    }
}

/// Room lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Lobby,
    Playing,
}

/// Hazard pacing preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl FromStr for Difficulty {
    type Err = UnchiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            other => Err(UnchiError::UnrecognizedMessage(format!(
                "unknown difficulty '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// Host-controlled room options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOptions {
    pub difficulty: Difficulty,
    pub player_collision: bool,
}

/// Room snapshot sent as `room_state`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: String,
    pub host_id: Option<String>,
    pub status: RoomStatus,
    pub options: RoomOptions,
    pub players: Vec<PlayerInfo>,
}

/// Player entry of a room snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: String,
    pub name: String,
    pub ready: bool,
    pub alive: bool,
}

/// One relayed position sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub id: String,
    pub x: f64,
    /// Server receive instant, ms since the Unix epoch
    pub t: i64,
}

/// Final placement of one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub id: String,
    pub rank: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_client_messages() {
        assert_eq!(
            decode_client_message(r#"{"type":"join_room","roomId":"ABC234","name":"bo"}"#).unwrap(),
            ClientMessage::JoinRoom {
                room_id: "ABC234".to_string(),
                name: Some("bo".to_string()),
            }
        );
        assert_eq!(
            decode_client_message(r#"{"type":"start_round","extra":1}"#).unwrap(),
            ClientMessage::StartRound {}
        );
        assert_eq!(
            decode_client_message(r#"{"type":"create_room"}"#).unwrap(),
            ClientMessage::CreateRoom { name: None }
        );
        match decode_client_message(r#"{"type":"set_options","playerCollision":true}"#).unwrap() {
            ClientMessage::SetOptions { difficulty, player_collision } => {
                assert_eq!(difficulty, None);
                assert_eq!(player_collision, Some(json!(true)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejections() {
        assert_eq!(decode_client_message("{nope"), Err(UnchiError::BadJson));
        let err = decode_client_message(r#"{"type":"teleport"}"#).unwrap_err();
        assert_eq!(err.code(), "bad_json");
        assert_eq!(err.to_string(), "Unrecognized message");
        let err = decode_client_message(r#"{"type":"set_ready","ready":"yes"}"#).unwrap_err();
        assert!(matches!(err, UnchiError::UnrecognizedMessage(_)));
    }

    #[test]
    fn test_server_message_wire_shape() {
        let msg = ServerMessage::RoomState(RoomSnapshot {
            room_id: "ABCDEF".to_string(),
            host_id: None,
            status: RoomStatus::Lobby,
            options: RoomOptions::default(),
            players: vec![],
        });
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "room_state",
                "roomId": "ABCDEF",
                "hostId": null,
                "status": "lobby",
                "options": {"difficulty": "normal", "playerCollision": false},
                "players": []
            })
        );

        let end = ServerMessage::RoundEnd { winner_id: None, ranks: vec![] };
        let value: serde_json::Value = serde_json::from_str(&end.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"type": "round_end", "winnerId": null, "ranks": []}));

        let start = ServerMessage::RoundStart {
            seed: 7,
            start_time: 1500,
            server_time: 0,
            options: RoomOptions::default(),
        };
        let value: serde_json::Value = serde_json::from_str(&start.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "round_start");
        assert_eq!(value["startTime"], 1500);
        assert_eq!(value["serverTime"], 0);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("insane".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Easy.to_string(), "easy");
    }
}
