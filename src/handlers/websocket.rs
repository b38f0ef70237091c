use futures_util::sink::SinkExt;
use futures_util::stream::StreamExt;
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use uuid::Uuid;
use warp::ws::{Message, WebSocket};

use crate::core::actor::{RoomAction, RoomHandle};
use crate::core::connection::Connection;
use crate::core::message_types::{decode_client_message, ClientMessage};
use crate::core::registry::RoomRegistry;
use crate::core::room::OptionsPatch;
use crate::error::{Result, UnchiError};

/// What the read loop should do after a frame
enum Flow {
    Continue,
    Leave,
}

/// Per-connection state: the player identity and, once joined, its room
struct Session {
    connection: Connection,
    room: Option<RoomHandle>,
}

// Handle a WebSocket connection
pub async fn handle_ws_client(ws: WebSocket, registry: RoomRegistry) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    // Spawn a task to forward messages from our channel to the WebSocket
    tokio::task::spawn(async move {
        let mut rx = rx;
        while let Some(message) = rx.recv().await {
            let closing = message.is_close();
            if let Err(e) = ws_tx.send(message).await {
                debug!("Failed to send WebSocket message: {}", e);
                break;
            }
            if closing {
                break;
            }
        }
    });

    // The connection id doubles as the player id for its lifetime
    let player_id = Uuid::new_v4().to_string();
    info!("Client connected: {}", player_id);

    let mut session = Session {
        connection: Connection::new(player_id.clone(), tx),
        room: None,
    };

    // Handle incoming messages
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(msg) => {
                if msg.is_close() {
                    break;
                }
                // Only text frames carry commands
                let Ok(text) = msg.to_str() else {
                    continue;
                };
                if let Flow::Leave = process_message(text, &mut session, &registry).await {
                    session.connection.close();
                    break;
                }
            }
            Err(e) => {
                warn!("WebSocket error for {}: {}", player_id, e);
                break;
            }
        }
    }

    // Client disconnected
    if let Some(room) = session.room.take() {
        if let Err(e) = room.leave(&player_id) {
            debug!("Room {} already gone for {}: {}", room.id, player_id, e);
        }
    }
    info!(
        "Client disconnected: {} after {:?}",
        player_id,
        session.connection.connection_duration()
    );
}

// Process an incoming text frame
async fn process_message(text: &str, session: &mut Session, registry: &RoomRegistry) -> Flow {
    let message = match decode_client_message(text) {
        Ok(message) => message,
        Err(e) => {
            if let UnchiError::UnrecognizedMessage(detail) = &e {
                warn!("Unrecognized message from {}: {}", session.connection.id, detail);
            } else {
                warn!("Unparseable frame from {}", session.connection.id);
            }
            session.connection.send_error(&e);
            return Flow::Continue;
        }
    };

    debug!("{} from {}", message.kind(), session.connection.id);
    if let ClientMessage::Leave {} = message {
        return Flow::Leave;
    }

    if let Err(e) = route(message, session, registry).await {
        if e.is_protocol() {
            session.connection.send_error(&e);
        } else {
            error!("Failed to handle message from {}: {}", session.connection.id, e);
        }
    }
    Flow::Continue
}

// Route a decoded command to the registry or the bound room
async fn route(message: ClientMessage, session: &mut Session, registry: &RoomRegistry) -> Result<()> {
    let action = match message {
        ClientMessage::CreateRoom { name } => {
            if session.room.is_some() {
                return Err(UnchiError::AlreadyInRoom);
            }
            let room = registry.create().await;
            return enter(room, name, session).await;
        }
        ClientMessage::JoinRoom { room_id, name } => {
            if session.room.is_some() {
                return Err(UnchiError::AlreadyInRoom);
            }
            let room = registry
                .lookup(&room_id)
                .await
                .ok_or(UnchiError::RoomNotFound)?;
            return enter(room, name, session).await;
        }
        ClientMessage::SetReady { ready } => RoomAction::SetReady(ready),
        ClientMessage::SetOptions { difficulty, player_collision } => RoomAction::SetOptions(
            OptionsPatch::from_wire(difficulty.as_deref(), player_collision.as_ref()),
        ),
        ClientMessage::StartRound {} => RoomAction::StartRound,
        ClientMessage::Pos { x } => RoomAction::Position(x),
        ClientMessage::Dead {} => RoomAction::Dead,
        ClientMessage::Leave {} => return Ok(()),
    };

    let room = session.room.as_ref().ok_or(UnchiError::NotInRoom)?;
    room.act(&session.connection.id, action)
}

async fn enter(room: RoomHandle, name: Option<String>, session: &mut Session) -> Result<()> {
    let player_id = room.join(name.unwrap_or_default(), session.connection.clone()).await?;
    debug!("{} bound to room {}", player_id, room.id);
    session.room = Some(room);
    Ok(())
}
