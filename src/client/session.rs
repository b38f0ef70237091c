//! Client-side view of a room
//!
//! Consumes server events, runs the local simulation clock and hazard
//! schedule, and produces the commands a client UI would send.

use crate::client::clock::ClockSync;
use crate::client::hazards::{clamp_to_arena, HazardSpawner, Rect};
use crate::client::interpolation::{PositionThrottle, RemoteInterpolator};
use crate::core::message_types::{
    ClientMessage, Difficulty, RankEntry, RoomOptions, RoomSnapshot, RoomStatus, ServerMessage,
};
use crate::constants::PLAYER_START_X;

/// Authority of the local client within its room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalRole {
    Host,
    Guest,
}

/// What the local client is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalPhase {
    /// Not in a room yet
    Detached,
    Lobby,
    /// Round accepted, time zero not reached
    Countdown,
    Alive,
    /// Dead for the rest of the round
    Spectating,
}

/// Outcome of the last finished round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub winner_id: Option<String>,
    pub ranks: Vec<RankEntry>,
}

#[derive(Debug, Clone)]
struct ActiveRound {
    clock: ClockSync,
    spawner: HazardSpawner,
    options: RoomOptions,
}

/// A remote player as the renderer sees it
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlayer {
    pub id: String,
    pub name: String,
    pub x: Option<f64>,
    pub alive: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub phase: LocalPhase,
    pub elapsed: f64,
    pub local_x: f64,
    pub local_alive: bool,
    pub remotes: Vec<RemotePlayer>,
    pub hazards: Vec<Rect>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientSession {
    player_id: Option<String>,
    room: Option<RoomSnapshot>,
    round: Option<ActiveRound>,
    local_alive: bool,
    local_x: f64,
    remotes: RemoteInterpolator,
    throttle: PositionThrottle,
    last_result: Option<RoundResult>,
    last_error: Option<(String, String)>,
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            local_alive: true,
            local_x: PLAYER_START_X,
            ..Self::default()
        }
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    pub fn room(&self) -> Option<&RoomSnapshot> {
        self.room.as_ref()
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    /// Most recent `error{code,msg}` from the server
    pub fn last_error(&self) -> Option<(&str, &str)> {
        self.last_error.as_ref().map(|(c, m)| (c.as_str(), m.as_str()))
    }

    pub fn role(&self) -> Option<LocalRole> {
        let room = self.room.as_ref()?;
        let me = self.player_id.as_deref()?;
        if room.host_id.as_deref() == Some(me) {
            Some(LocalRole::Host)
        } else {
            Some(LocalRole::Guest)
        }
    }

    pub fn phase(&self, local_now: i64) -> LocalPhase {
        if self.player_id.is_none() || self.room.is_none() {
            return LocalPhase::Detached;
        }
        match &self.round {
            None => LocalPhase::Lobby,
            Some(_) if !self.local_alive => LocalPhase::Spectating,
            Some(round) if !round.clock.started(local_now) => LocalPhase::Countdown,
            Some(_) => LocalPhase::Alive,
        }
    }

    /// Options of the running round, or the lobby's current options
    pub fn options(&self) -> Option<RoomOptions> {
        self.round
            .as_ref()
            .map(|r| r.options)
            .or_else(|| self.room.as_ref().map(|r| r.options))
    }

    /// Fold one server event into local state
    pub fn apply(&mut self, message: ServerMessage, local_now: i64) {
        match message {
            ServerMessage::Hello { id } => self.player_id = Some(id),
            ServerMessage::RoomState(snapshot) => {
                if snapshot.status == RoomStatus::Lobby {
                    self.round = None;
                    self.local_alive = true;
                }
                self.remotes.retain(snapshot.players.iter().map(|p| p.id.as_str()));
                self.room = Some(snapshot);
            }
            ServerMessage::RoundStart { seed, start_time, server_time, options } => {
                self.round = Some(ActiveRound {
                    clock: ClockSync::new(server_time, start_time, local_now),
                    spawner: HazardSpawner::new(seed, options.difficulty),
                    options,
                });
                self.local_alive = true;
                self.local_x = PLAYER_START_X;
                self.remotes.clear();
                self.throttle.reset();
                self.last_result = None;
            }
            ServerMessage::Positions { positions } => {
                let me = self.player_id.clone();
                for sample in positions.iter().filter(|s| Some(&s.id) != me.as_ref()) {
                    self.remotes.apply(sample);
                }
            }
            ServerMessage::PlayerDead { id } => {
                if Some(id.as_str()) == self.player_id.as_deref() {
                    self.local_alive = false;
                }
                if let Some(player) = self
                    .room
                    .as_mut()
                    .and_then(|r| r.players.iter_mut().find(|p| p.id == id))
                {
                    player.alive = false;
                }
            }
            ServerMessage::RoundEnd { winner_id, ranks } => {
                self.round = None;
                self.last_result = Some(RoundResult { winner_id, ranks });
            }
            ServerMessage::Error { code, msg } => {
                log::warn!("Server rejected command: {} ({})", code, msg);
                self.last_error = Some((code, msg));
            }
        }
    }

    pub fn create_room(&self, name: &str) -> ClientMessage {
        ClientMessage::CreateRoom { name: Some(name.to_string()) }
    }

    pub fn join_room(&self, room_id: &str, name: &str) -> ClientMessage {
        ClientMessage::JoinRoom {
            room_id: room_id.trim().to_uppercase(),
            name: Some(name.to_string()),
        }
    }

    pub fn set_ready(&self, ready: bool) -> Option<ClientMessage> {
        self.room.as_ref()?;
        Some(ClientMessage::SetReady { ready })
    }

    /// Host-only, lobby-only
    pub fn set_options(
        &self,
        difficulty: Option<Difficulty>,
        player_collision: Option<bool>,
    ) -> Option<ClientMessage> {
        if self.role() != Some(LocalRole::Host) || self.round.is_some() {
            return None;
        }
        Some(ClientMessage::SetOptions {
            difficulty: difficulty.map(|d| d.to_string()),
            player_collision: player_collision.map(serde_json::Value::Bool),
        })
    }

    /// Host-only, and only once everyone is ready
    pub fn start_round(&self) -> Option<ClientMessage> {
        if self.role() != Some(LocalRole::Host) || self.round.is_some() {
            return None;
        }
        let room = self.room.as_ref()?;
        if room.players.iter().all(|p| p.ready) {
            Some(ClientMessage::StartRound {})
        } else {
            None
        }
    }

    pub fn leave(&self) -> ClientMessage {
        ClientMessage::Leave {}
    }

    /// Step the local simulation to `local_now` with the player at `local_x`.
    ///
    /// Returns a `dead` when a hazard hits, otherwise at most one `pos`
    /// per send interval while alive.
    pub fn tick(&mut self, local_now: i64, local_x: f64) -> Vec<ClientMessage> {
        let mut outbound = Vec::new();
        let Some(round) = self.round.as_mut() else {
            return outbound;
        };
        if !self.local_alive {
            return outbound;
        }

        self.local_x = clamp_to_arena(local_x);
        if round.clock.started(local_now) {
            let elapsed = round.clock.elapsed(local_now);
            round.spawner.advance(elapsed);
            if round.spawner.hits(self.local_x, elapsed) {
                self.local_alive = false;
                outbound.push(ClientMessage::Dead {});
                return outbound;
            }
        }

        if self.throttle.should_send(local_now) {
            outbound.push(ClientMessage::Pos { x: Some(self.local_x) });
        }
        outbound
    }

    pub fn render_state(&self, local_now: i64) -> RenderState {
        let elapsed = self
            .round
            .as_ref()
            .map(|r| r.clock.elapsed(local_now))
            .unwrap_or(0.0);
        let hazards = self
            .round
            .as_ref()
            .map(|r| r.spawner.hazards().iter().map(|h| h.bounds_at(elapsed)).collect())
            .unwrap_or_default();
        let remotes = self
            .room
            .as_ref()
            .map(|room| {
                room.players
                    .iter()
                    .filter(|p| Some(p.id.as_str()) != self.player_id.as_deref())
                    .map(|p| RemotePlayer {
                        id: p.id.clone(),
                        name: p.name.clone(),
                        x: self.remotes.position(&p.id),
                        alive: p.alive,
                    })
                    .collect()
            })
            .unwrap_or_default();

        RenderState {
            phase: self.phase(local_now),
            elapsed,
            local_x: self.local_x,
            local_alive: self.local_alive,
            remotes,
            hazards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message_types::{PlayerInfo, PositionSample};

    fn snapshot(host: &str, players: &[(&str, bool)], status: RoomStatus) -> ServerMessage {
        ServerMessage::RoomState(RoomSnapshot {
            room_id: "ABCDEF".to_string(),
            host_id: Some(host.to_string()),
            status,
            options: RoomOptions::default(),
            players: players
                .iter()
                .map(|(id, ready)| PlayerInfo {
                    id: id.to_string(),
                    name: id.to_string(),
                    ready: *ready,
                    alive: true,
                })
                .collect(),
        })
    }

    fn round_start(seed: u32) -> ServerMessage {
        ServerMessage::RoundStart {
            seed,
            start_time: 1_500,
            server_time: 0,
            options: RoomOptions::default(),
        }
    }

    #[test]
    fn test_roles_and_host_gating() {
        let mut session = ClientSession::new();
        assert_eq!(session.phase(0), LocalPhase::Detached);
        session.apply(snapshot("me", &[("me", false), ("you", true)], RoomStatus::Lobby), 0);
        session.apply(ServerMessage::Hello { id: "me".to_string() }, 0);

        assert_eq!(session.role(), Some(LocalRole::Host));
        assert_eq!(session.phase(0), LocalPhase::Lobby);
        assert!(session.start_round().is_none());
        assert!(session.set_options(Some(Difficulty::Hard), None).is_some());

        session.apply(snapshot("you", &[("me", true), ("you", true)], RoomStatus::Lobby), 0);
        assert_eq!(session.role(), Some(LocalRole::Guest));
        assert!(session.start_round().is_none());
        assert!(session.set_options(None, Some(true)).is_none());
    }

    #[test]
    fn test_round_lifecycle() {
        let mut session = ClientSession::new();
        session.apply(ServerMessage::Hello { id: "me".to_string() }, 0);
        session.apply(snapshot("me", &[("me", true), ("you", true)], RoomStatus::Lobby), 0);
        session.apply(round_start(7), 10_000);

        assert_eq!(session.phase(10_100), LocalPhase::Countdown);
        assert_eq!(session.phase(11_500), LocalPhase::Alive);

        // Countdown: positions flow, no hazards yet
        let out = session.tick(10_100, 9_999.0);
        assert_eq!(out.len(), 1);
        match &out[0] {
            ClientMessage::Pos { x: Some(x) } => assert_eq!(*x, crate::constants::ARENA_MAX_X),
            other => panic!("unexpected {:?}", other),
        }
        assert!(session.tick(10_120, 100.0).is_empty());

        session.apply(ServerMessage::PlayerDead { id: "me".to_string() }, 12_000);
        assert_eq!(session.phase(12_000), LocalPhase::Spectating);
        assert!(session.tick(12_100, 100.0).is_empty());

        session.apply(
            ServerMessage::RoundEnd {
                winner_id: Some("you".to_string()),
                ranks: vec![],
            },
            12_200,
        );
        session.apply(snapshot("me", &[("me", false), ("you", false)], RoomStatus::Lobby), 12_200);
        assert_eq!(session.phase(12_300), LocalPhase::Lobby);
        assert_eq!(
            session.last_result().and_then(|r| r.winner_id.as_deref()),
            Some("you")
        );
    }

    #[test]
    fn test_remote_positions_smoothed() {
        let mut session = ClientSession::new();
        session.apply(ServerMessage::Hello { id: "me".to_string() }, 0);
        session.apply(snapshot("me", &[("me", true), ("you", true)], RoomStatus::Playing), 0);
        session.apply(round_start(1), 0);

        for x in [100.0, 200.0] {
            session.apply(
                ServerMessage::Positions {
                    positions: vec![PositionSample { id: "you".to_string(), x, t: 0 }],
                },
                0,
            );
        }
        let state = session.render_state(0);
        assert_eq!(state.remotes.len(), 1);
        let x = state.remotes[0].x.unwrap();
        assert!((x - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_skewed_clients_see_same_hazards() {
        let mut a = ClientSession::new();
        let mut b = ClientSession::new();
        // Same server message, very different local clocks
        a.apply(round_start(99), 5_000);
        b.apply(round_start(99), 90_000);

        let start_a = 5_000 + 1_500;
        let start_b = 90_000 + 1_500;
        for offset in [0, 700, 1_800, 2_950, 4_800] {
            let out_a = a.tick(start_a + offset, 120.0);
            let out_b = b.tick(start_b + offset, 120.0);
            assert_eq!(out_a, out_b);

            let state_a = a.render_state(start_a + offset);
            let state_b = b.render_state(start_b + offset);
            assert_eq!(state_a.elapsed, offset as f64 / 1000.0);
            assert_eq!(state_a.elapsed, state_b.elapsed);
            assert_eq!(state_a.hazards, state_b.hazards);
            assert_eq!(state_a.local_alive, state_b.local_alive);
        }
    }
}
