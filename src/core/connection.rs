//! Outbound half of one client connection

use log::{debug, warn};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use warp::ws::Message;

use crate::core::message_types::ServerMessage;
use crate::error::UnchiError;

/// Sending side of a single WebSocket connection, keyed by player id
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: String,
    pub sender: mpsc::UnboundedSender<Message>,
    pub connected_at: Instant,
}

impl Connection {
    pub fn new(id: String, sender: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id,
            sender,
            connected_at: Instant::now(),
        }
    }

    /// Send a text frame through this connection
    pub fn send_text(&self, text: &str) -> bool {
        match self.sender.send(Message::text(text)) {
            Ok(_) => true,
            Err(_) => {
                warn!("Failed to send message to client {}", self.id);
                false
            }
        }
    }

    /// Serialize and send a server event
    pub fn send(&self, message: &ServerMessage) -> bool {
        match message.to_json() {
            Ok(text) => self.send_text(&text),
            Err(e) => {
                warn!("Failed to serialize {} for {}: {}", message.kind(), self.id, e);
                false
            }
        }
    }

    /// Report a rejected command to this client only
    pub fn send_error(&self, err: &UnchiError) -> bool {
        debug!("Rejecting command from {}: {} ({})", self.id, err.code(), err);
        self.send(&ServerMessage::error(err))
    }

    /// Ask the writer task to close the socket
    pub fn close(&self) -> bool {
        self.sender.send(Message::close()).is_ok()
    }

    /// Calculate the connection duration
    pub fn connection_duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
