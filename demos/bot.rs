//! Headless bot client
//!
//! Drives a `ClientSession` over a real WebSocket connection. Creates a room
//! (or joins the one given as the first argument), readies up, starts rounds
//! when it is host and dodges hazards with a naive strategy.
//!
//! Usage: cargo run --example bot [ROOM_CODE]
//! Server URL comes from `UNCHI_URL` (default ws://127.0.0.1:8080/ws).

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use unchi_party::client::{ClientSession, LocalPhase};
use unchi_party::core::message_types::{ClientMessage, ServerMessage};
use unchi_party::core::round::now_millis;
use unchi_party::{ARENA_MAX_X, ARENA_MIN_X, PLAYER_SIZE, PLAYER_Y};

const FRAME: Duration = Duration::from_millis(16);
const STEP_PX: f64 = 6.0;

/// Move away from the closest hazard falling towards the player's row
fn steer(session: &ClientSession, now: i64, x: f64) -> f64 {
    let frame = session.render_state(now);
    let threat = frame
        .hazards
        .iter()
        .filter(|h| h.y + h.h > PLAYER_Y - 200.0 && h.y < PLAYER_Y)
        .filter(|h| h.x - PLAYER_SIZE < x && x < h.x + h.w + PLAYER_SIZE)
        .min_by(|a, b| (PLAYER_Y - a.y).total_cmp(&(PLAYER_Y - b.y)));

    match threat {
        Some(hazard) => {
            let centre = hazard.x + hazard.w / 2.0;
            let dir = if x < centre { -1.0 } else { 1.0 };
            // Flip when pinned against a wall
            let dir = if (x <= ARENA_MIN_X && dir < 0.0) || (x >= ARENA_MAX_X && dir > 0.0) {
                -dir
            } else {
                dir
            };
            x + dir * STEP_PX
        }
        None => x,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let url = std::env::var("UNCHI_URL").unwrap_or_else(|_| "ws://127.0.0.1:8080/ws".to_string());
    let room_code = std::env::args().nth(1);

    println!("Connecting to {}", url);
    let (ws_stream, _) = connect_async(url.as_str()).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let mut session = ClientSession::new();
    let hello = match &room_code {
        Some(code) => session.join_room(code, "bot"),
        None => session.create_room("bot"),
    };
    ws_sender.send(Message::Text(hello.to_json()?)).await?;

    let mut ticker = tokio::time::interval(FRAME);
    let mut x = unchi_party::PLAYER_START_X;
    let mut rounds_seen = 0u32;

    loop {
        tokio::select! {
            ws_message = ws_receiver.next() => {
                let text = match ws_message {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => {
                        println!("Connection closed by server");
                        break;
                    }
                    Some(Err(e)) => {
                        println!("WebSocket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => continue,
                };
                let message: ServerMessage = match serde_json::from_str(&text) {
                    Ok(message) => message,
                    Err(e) => {
                        println!("Unreadable server message: {}", e);
                        continue;
                    }
                };

                let now = now_millis();
                let kind = message.kind();
                session.apply(message, now);

                match kind {
                    "room_state" => {
                        if let Some(room) = session.room() {
                            println!(
                                "Room {} ({} players, {:?})",
                                room.room_id,
                                room.players.len(),
                                room.status
                            );
                        }
                        let me_ready = session
                            .room()
                            .zip(session.player_id())
                            .and_then(|(room, me)| room.players.iter().find(|p| p.id == me))
                            .map(|p| p.ready)
                            .unwrap_or(true);
                        if !me_ready && session.phase(now) == LocalPhase::Lobby {
                            if let Some(cmd) = session.set_ready(true) {
                                ws_sender.send(Message::Text(cmd.to_json()?)).await?;
                            }
                        }
                        if let Some(cmd) = session.start_round() {
                            ws_sender.send(Message::Text(cmd.to_json()?)).await?;
                        }
                    }
                    "round_start" => {
                        rounds_seen += 1;
                        x = unchi_party::PLAYER_START_X;
                        println!("Round {} starting", rounds_seen);
                    }
                    "round_end" => {
                        if let Some(result) = session.last_result() {
                            let mine = session
                                .player_id()
                                .and_then(|me| result.ranks.iter().find(|r| r.id == me))
                                .map(|r| r.rank);
                            println!("Round over, winner {:?}, our rank {:?}", result.winner_id, mine);
                        }
                    }
                    "error" => {
                        if let Some((code, msg)) = session.last_error() {
                            println!("Server error {}: {}", code, msg);
                            if code == "no_room" || code == "full" || code == "in_progress" {
                                break;
                            }
                        }
                    }
                    _ => {}
                }
            }
            _ = ticker.tick() => {
                let now = now_millis();
                if session.phase(now) != LocalPhase::Alive {
                    continue;
                }
                x = steer(&session, now, x).clamp(ARENA_MIN_X, ARENA_MAX_X);
                for cmd in session.tick(now, x) {
                    if matches!(cmd, ClientMessage::Dead {}) {
                        println!("Hit after {:.1}s", session.render_state(now).elapsed);
                    }
                    ws_sender.send(Message::Text(cmd.to_json()?)).await?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = ws_sender.send(Message::Text(session.leave().to_json()?)).await;
                break;
            }
        }
    }

    Ok(())
}
