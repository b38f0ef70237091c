//! Room state machine
//!
//! A room cycles Lobby -> Playing -> Lobby. Every operation validates
//! before it mutates, so a rejected command leaves the room untouched.
//! Operations return the events to deliver instead of sending them, the
//! owning actor resolves targets to connections.

use crate::constants::{
    DEFAULT_PLAYER_NAME, MAX_NAME_LENGTH, MAX_ROOM_PLAYERS, PLAYER_START_X, RELAY_MAX_X,
    RELAY_MIN_X,
};
use crate::core::message_types::{
    Difficulty, PlayerInfo, PositionSample, RankEntry, RoomOptions, RoomSnapshot, RoomStatus,
    ServerMessage,
};
use crate::core::round::RoundSchedule;
use crate::error::{HostAction, Result, UnchiError};

/// A member of a room
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub ready: bool,
    pub alive: bool,
    /// Last known horizontal position, always within arena bounds
    pub x: f64,
    /// When the player died this round, ms since the Unix epoch
    pub death_time: Option<i64>,
}

impl Player {
    pub fn new(id: String, name: &str) -> Self {
        Self {
            id,
            name: sanitize_name(name),
            ready: false,
            alive: true,
            x: PLAYER_START_X,
            death_time: None,
        }
    }

    fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            ready: self.ready,
            alive: self.alive,
        }
    }
}

/// Trim, cap at 16 characters, fall back to "Player"
pub fn sanitize_name(raw: &str) -> String {
    let name: String = raw.trim().chars().take(MAX_NAME_LENGTH).collect();
    if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name
    }
}

/// Clamp a reported position to where a player can physically be
pub fn clamp_relayed(x: f64) -> f64 {
    x.clamp(RELAY_MIN_X, RELAY_MAX_X)
}

/// Validated subset of a `set_options` request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionsPatch {
    pub difficulty: Option<Difficulty>,
    pub player_collision: Option<bool>,
}

impl OptionsPatch {
    /// Keep only well-formed fields: a known difficulty name and a real boolean
    pub fn from_wire(
        difficulty: Option<&str>,
        player_collision: Option<&serde_json::Value>,
    ) -> Self {
        Self {
            difficulty: difficulty.and_then(|d| d.parse().ok()),
            player_collision: player_collision.and_then(|v| v.as_bool()),
        }
    }

    fn apply(&self, options: &mut RoomOptions) {
        if let Some(difficulty) = self.difficulty {
            options.difficulty = difficulty;
        }
        if let Some(player_collision) = self.player_collision {
            options.player_collision = player_collision;
        }
    }
}

/// Who receives an outbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    Player(String),
    AllExcept(String),
}

/// An event produced by a room operation
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub target: Target,
    pub message: ServerMessage,
}

impl Dispatch {
    pub fn all(message: ServerMessage) -> Self {
        Self { target: Target::All, message }
    }

    pub fn to(player_id: &str, message: ServerMessage) -> Self {
        Self { target: Target::Player(player_id.to_string()), message }
    }

    pub fn all_except(player_id: &str, message: ServerMessage) -> Self {
        Self { target: Target::AllExcept(player_id.to_string()), message }
    }

    /// Whether `player_id` is among the recipients
    pub fn reaches(&self, player_id: &str) -> bool {
        match &self.target {
            Target::All => true,
            Target::Player(id) => id == player_id,
            Target::AllExcept(id) => id != player_id,
        }
    }
}

/// One multiplayer session with bounded membership
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    status: RoomStatus,
    host_id: Option<String>,
    /// Join order is kept; it decides host succession
    players: Vec<Player>,
    options: RoomOptions,
    round: Option<RoundSchedule>,
}

impl Room {
    pub fn new(id: String) -> Self {
        Self {
            id,
            status: RoomStatus::Lobby,
            host_id: None,
            players: Vec::new(),
            options: RoomOptions::default(),
            round: None,
        }
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn host_id(&self) -> Option<&str> {
        self.host_id.as_deref()
    }

    pub fn options(&self) -> RoomOptions {
        self.options
    }

    pub fn round(&self) -> Option<RoundSchedule> {
        self.round
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn member_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    fn player_mut(&mut self, player_id: &str) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(UnchiError::PlayerNotFound)
    }

    fn require_host(&self, player_id: &str, action: HostAction) -> Result<()> {
        if self.player(player_id).is_none() {
            return Err(UnchiError::PlayerNotFound);
        }
        if self.host_id.as_deref() != Some(player_id) {
            return Err(UnchiError::NotHost(action));
        }
        Ok(())
    }

    fn require_lobby(&self) -> Result<()> {
        match self.status {
            RoomStatus::Lobby => Ok(()),
            RoomStatus::Playing => Err(UnchiError::RoundInProgress),
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id.clone(),
            host_id: self.host_id.clone(),
            status: self.status,
            options: self.options,
            players: self.players.iter().map(Player::info).collect(),
        }
    }

    fn state_event(&self) -> Dispatch {
        Dispatch::all(ServerMessage::RoomState(self.snapshot()))
    }

    /// Add a player. The first member becomes host.
    pub fn join(&mut self, player_id: &str, name: &str) -> Result<Vec<Dispatch>> {
        self.require_lobby()?;
        if self.players.len() >= MAX_ROOM_PLAYERS {
            return Err(UnchiError::RoomFull);
        }

        self.players.push(Player::new(player_id.to_string(), name));
        if self.host_id.is_none() {
            self.host_id = Some(player_id.to_string());
        }

        Ok(vec![
            self.state_event(),
            Dispatch::to(player_id, ServerMessage::Hello { id: player_id.to_string() }),
        ])
    }

    pub fn set_ready(&mut self, player_id: &str, ready: bool) -> Result<Vec<Dispatch>> {
        self.player_mut(player_id)?.ready = ready;
        Ok(vec![self.state_event()])
    }

    pub fn set_options(&mut self, player_id: &str, patch: OptionsPatch) -> Result<Vec<Dispatch>> {
        self.require_host(player_id, HostAction::ChangeOptions)?;
        self.require_lobby()?;
        patch.apply(&mut self.options);
        Ok(vec![self.state_event()])
    }

    /// Begin a round with the given schedule once every member is ready
    pub fn start_round(
        &mut self,
        player_id: &str,
        schedule: RoundSchedule,
    ) -> Result<Vec<Dispatch>> {
        self.require_host(player_id, HostAction::StartRound)?;
        self.require_lobby()?;
        if !self.players.iter().all(|p| p.ready) {
            return Err(UnchiError::NotReady);
        }

        self.status = RoomStatus::Playing;
        self.round = Some(schedule);
        for player in &mut self.players {
            player.alive = true;
            player.death_time = None;
        }

        Ok(vec![
            Dispatch::all(ServerMessage::RoundStart {
                seed: schedule.seed,
                start_time: schedule.start_time,
                server_time: schedule.server_time,
                options: self.options,
            }),
            self.state_event(),
        ])
    }

    /// Record a position sample and relay it to everyone else.
    /// Ignored outside Playing or from a dead player.
    pub fn update_position(
        &mut self,
        player_id: &str,
        x: Option<f64>,
        now: i64,
    ) -> Result<Vec<Dispatch>> {
        let playing = self.status == RoomStatus::Playing;
        let player = self.player_mut(player_id)?;
        if !playing || !player.alive {
            return Ok(Vec::new());
        }

        if let Some(x) = x.filter(|x| x.is_finite()) {
            player.x = clamp_relayed(x);
        }

        let sample = PositionSample {
            id: player.id.clone(),
            x: player.x,
            t: now,
        };
        Ok(vec![Dispatch::all_except(
            player_id,
            ServerMessage::Positions { positions: vec![sample] },
        )])
    }

    /// Mark a player dead. Ignored outside Playing or when already dead.
    pub fn mark_dead(&mut self, player_id: &str, now: i64) -> Result<Vec<Dispatch>> {
        let playing = self.status == RoomStatus::Playing;
        let player = self.player_mut(player_id)?;
        if !playing || !player.alive {
            return Ok(Vec::new());
        }

        player.alive = false;
        player.death_time = Some(now);

        let mut events = vec![Dispatch::all(ServerMessage::PlayerDead { id: player_id.to_string() })];
        events.extend(self.evaluate_round_end());
        Ok(events)
    }

    /// Remove a player for good (leave or dropped connection).
    ///
    /// Host passes to the earliest remaining member. An alive player
    /// leaving mid-round counts as a death for round-end purposes.
    /// Nothing is emitted when the room becomes empty.
    pub fn remove_player(&mut self, player_id: &str) -> Result<Vec<Dispatch>> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(UnchiError::PlayerNotFound)?;
        let removed = self.players.remove(index);

        if self.players.is_empty() {
            self.host_id = None;
            return Ok(Vec::new());
        }

        if self.host_id.as_deref() == Some(player_id) {
            self.host_id = self.players.first().map(|p| p.id.clone());
        }

        let mut events = Vec::new();
        if self.status == RoomStatus::Playing && removed.alive {
            events.push(Dispatch::all(ServerMessage::PlayerDead { id: removed.id }));
            events.extend(self.evaluate_round_end());
        }
        events.push(self.state_event());
        Ok(events)
    }

    /// Alive players first, then by death time, unknown death time last.
    /// Ties keep join order.
    pub fn ranking(&self) -> Vec<RankEntry> {
        let mut order: Vec<&Player> = self.players.iter().collect();
        order.sort_by_key(|p| (!p.alive, p.death_time.unwrap_or(i64::MAX)));
        order
            .into_iter()
            .enumerate()
            .map(|(i, p)| RankEntry { id: p.id.clone(), rank: i + 1 })
            .collect()
    }

    /// End the round once at most one player is alive
    pub fn evaluate_round_end(&mut self) -> Vec<Dispatch> {
        if self.status != RoomStatus::Playing || self.alive_count() > 1 {
            return Vec::new();
        }

        let winner_id = self.players.iter().find(|p| p.alive).map(|p| p.id.clone());
        let ranks = self.ranking();
        log::info!(
            "Round over in room {}: winner {:?}",
            self.id,
            winner_id.as_deref().unwrap_or("none")
        );

        self.status = RoomStatus::Lobby;
        self.round = None;
        for player in &mut self.players {
            player.ready = false;
            player.alive = true;
        }

        vec![
            Dispatch::all(ServerMessage::RoundEnd { winner_id, ranks }),
            self.state_event(),
        ]
    }
}
