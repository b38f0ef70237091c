//! Room registry: code -> running room

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::constants::DEFAULT_ROUND_LEAD_MS;
use crate::core::actor::{spawn_room, RoomHandle};
use crate::core::code::generate_unique_room_code;
use crate::core::room::Room;

/// Manages all live rooms. This is the only state shared across rooms;
/// room contents live inside each room's actor.
#[derive(Clone)]
pub struct RoomRegistry {
    /// Map of room code to room handle
    rooms: Arc<RwLock<HashMap<String, RoomHandle>>>,
    round_lead_ms: i64,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_ROUND_LEAD_MS)
    }
}

impl RoomRegistry {
    pub fn new(round_lead_ms: i64) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            round_lead_ms,
        }
    }

    /// Allocate an empty lobby under a code no live room uses
    pub async fn create(&self) -> RoomHandle {
        let mut rooms = self.rooms.write().await;
        let code = {
            let mut rng = rand::thread_rng();
            generate_unique_room_code(&mut rng, |c| rooms.contains_key(c))
        };

        let handle = spawn_room(Room::new(code.clone()), self.clone(), self.round_lead_ms);
        rooms.insert(code.clone(), handle.clone());
        log::info!("Room {} created ({} live)", code, rooms.len());

        handle
    }

    pub async fn lookup(&self, room_id: &str) -> Option<RoomHandle> {
        self.rooms.read().await.get(room_id).cloned()
    }

    /// Remove a room whose membership has reached zero.
    /// Returns whether a room was removed.
    pub async fn destroy_if_empty(&self, room_id: &str) -> bool {
        let mut rooms = self.rooms.write().await;
        match rooms.get(room_id) {
            Some(handle) if handle.member_count() == 0 => {
                rooms.remove(room_id);
                true
            }
            _ => false,
        }
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Lists live rooms with their member counts
    pub async fn list_rooms(&self) -> Vec<(String, usize)> {
        self.rooms
            .read()
            .await
            .values()
            .map(|handle| (handle.id.clone(), handle.member_count()))
            .collect()
    }
}
