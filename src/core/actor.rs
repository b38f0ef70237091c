//! Per-room actor
//!
//! Each room runs as its own task. Commands arrive on one queue and are
//! applied to the room to completion before the next one is read, so room
//! state needs no lock and unrelated rooms progress independently.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};

use crate::core::connection::Connection;
use crate::core::registry::RoomRegistry;
use crate::core::room::{Dispatch, OptionsPatch, Room, Target};
use crate::core::round::{now_millis, RoundSchedule};
use crate::error::{Result, UnchiError};

/// A command a bound connection can issue to its room
#[derive(Debug, Clone, PartialEq)]
pub enum RoomAction {
    SetReady(bool),
    SetOptions(OptionsPatch),
    StartRound,
    Position(Option<f64>),
    Dead,
}

/// Messages processed by a room actor
#[derive(Debug)]
pub enum RoomCommand {
    Join {
        name: String,
        connection: Connection,
        reply: oneshot::Sender<Result<String>>,
    },
    Action {
        player_id: String,
        action: RoomAction,
    },
    Leave {
        player_id: String,
    },
}

/// Cloneable address of a running room
#[derive(Debug, Clone)]
pub struct RoomHandle {
    pub id: String,
    sender: mpsc::UnboundedSender<RoomCommand>,
    members: Arc<AtomicUsize>,
}

impl RoomHandle {
    /// Members as of the last processed command
    pub fn member_count(&self) -> usize {
        self.members.load(Ordering::Acquire)
    }

    /// Join with the connection's identity and return the assigned player id.
    /// A room that shut down before handling the request reports `RoomNotFound`.
    pub async fn join(&self, name: String, connection: Connection) -> Result<String> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join { name, connection, reply })
            .map_err(|_| UnchiError::RoomNotFound)?;
        response.await.map_err(|_| UnchiError::RoomNotFound)?
    }

    /// Queue an action; fails only if the room is gone
    pub fn act(&self, player_id: &str, action: RoomAction) -> Result<()> {
        self.sender
            .send(RoomCommand::Action { player_id: player_id.to_string(), action })
            .map_err(|_| UnchiError::NotInRoom)
    }

    pub fn leave(&self, player_id: &str) -> Result<()> {
        self.sender
            .send(RoomCommand::Leave { player_id: player_id.to_string() })
            .map_err(|_| UnchiError::NotInRoom)
    }
}

struct RoomActor {
    room: Room,
    connections: HashMap<String, Connection>,
    members: Arc<AtomicUsize>,
    registry: RoomRegistry,
    round_lead_ms: i64,
    rng: StdRng,
}

/// Start the actor for `room` and return its handle
pub fn spawn_room(room: Room, registry: RoomRegistry, round_lead_ms: i64) -> RoomHandle {
    let (sender, receiver) = mpsc::unbounded_channel();
    let members = Arc::new(AtomicUsize::new(room.member_count()));
    let handle = RoomHandle {
        id: room.id.clone(),
        sender,
        members: members.clone(),
    };

    let actor = RoomActor {
        room,
        connections: HashMap::new(),
        members,
        registry,
        round_lead_ms,
        rng: StdRng::from_entropy(),
    };
    tokio::spawn(actor.run(receiver));

    handle
}

impl RoomActor {
    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<RoomCommand>) {
        debug!("Room {} actor started", self.room.id);

        while let Some(command) = receiver.recv().await {
            self.handle(command);
            self.members.store(self.room.member_count(), Ordering::Release);

            if self.room.is_empty() {
                break;
            }
        }

        // Drop the queue first so late commands fail instead of waiting
        drop(receiver);
        if self.registry.destroy_if_empty(&self.room.id).await {
            info!("Room {} destroyed", self.room.id);
        }
    }

    fn handle(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Join { name, connection, reply } => {
                let player_id = connection.id.clone();
                match self.room.join(&player_id, &name) {
                    Ok(events) => {
                        info!(
                            "Player {} joined room {} ({} members)",
                            player_id,
                            self.room.id,
                            self.room.member_count()
                        );
                        self.connections.insert(player_id.clone(), connection);
                        self.deliver(events);
                        let _ = reply.send(Ok(player_id));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }
            RoomCommand::Action { player_id, action } => {
                let now = now_millis();
                let result = match action {
                    RoomAction::SetReady(ready) => self.room.set_ready(&player_id, ready),
                    RoomAction::SetOptions(patch) => self.room.set_options(&player_id, patch),
                    RoomAction::StartRound => {
                        let schedule = RoundSchedule::draw(&mut self.rng, now, self.round_lead_ms);
                        let result = self.room.start_round(&player_id, schedule);
                        if result.is_ok() {
                            info!(
                                "Round started in room {} (seed {}, t0 {})",
                                self.room.id, schedule.seed, schedule.start_time
                            );
                        }
                        result
                    }
                    RoomAction::Position(x) => self.room.update_position(&player_id, x, now),
                    RoomAction::Dead => self.room.mark_dead(&player_id, now),
                };

                match result {
                    Ok(events) => self.deliver(events),
                    Err(e) => match self.connections.get(&player_id) {
                        Some(connection) => {
                            connection.send_error(&e);
                        }
                        None => warn!("Dropping {} for unknown player {}", e.code(), player_id),
                    },
                }
            }
            RoomCommand::Leave { player_id } => {
                self.connections.remove(&player_id);
                match self.room.remove_player(&player_id) {
                    Ok(events) => {
                        info!("Player {} left room {}", player_id, self.room.id);
                        self.deliver(events);
                    }
                    Err(e) => debug!("Leave from {} ignored: {}", player_id, e),
                }
            }
        }
    }

    /// Send each event to its recipients in membership order
    fn deliver(&self, events: Vec<Dispatch>) {
        for event in events {
            let text = match event.message.to_json() {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to serialize {}: {}", event.message.kind(), e);
                    continue;
                }
            };

            let mut sent = 0;
            for player in self.room.players() {
                if !event.reaches(&player.id) {
                    continue;
                }
                if let Some(connection) = self.connections.get(&player.id) {
                    if connection.send_text(&text) {
                        sent += 1;
                    }
                }
            }

            if let Target::AllExcept(sender) = &event.target {
                debug!("Relayed {} from {} to {} peers", event.message.kind(), sender, sent);
            } else {
                debug!("Sent {} to {} clients in room {}", event.message.kind(), sent, self.room.id);
            }
        }
    }
}
