use unchi_party::core::message_types::{Difficulty, RoomStatus, ServerMessage};
use unchi_party::core::room::{OptionsPatch, Room, Target};
use unchi_party::core::RoundSchedule;
use unchi_party::error::UnchiError;

fn room_with(ids: &[&str]) -> Room {
    let mut room = Room::new("TEST22".to_string());
    for id in ids {
        room.join(id, id).unwrap();
    }
    room
}

fn ready(room: &mut Room, ids: &[&str]) {
    for id in ids {
        room.set_ready(id, true).unwrap();
    }
}

fn playing(ids: &[&str]) -> Room {
    let mut room = room_with(ids);
    ready(&mut room, ids);
    room.start_round(ids[0], RoundSchedule::new(1234, 0, 1500)).unwrap();
    room
}

#[test]
fn test_room_creation() {
    let room = Room::new("ABCDEF".to_string());
    assert_eq!(room.id, "ABCDEF");
    assert_eq!(room.status(), RoomStatus::Lobby);
    assert_eq!(room.member_count(), 0);
    assert_eq!(room.host_id(), None);
    assert!(room.round().is_none());
    assert_eq!(room.options().difficulty, Difficulty::Normal);
    assert!(!room.options().player_collision);
}

#[test]
fn test_room_always_has_host_while_occupied() {
    let mut room = room_with(&["a", "b", "c", "d"]);
    for leaving in ["c", "a", "d"] {
        room.remove_player(leaving).unwrap();
        let host = room.host_id().expect("occupied room must have a host");
        assert!(room.player(host).is_some());
    }
    room.remove_player("b").unwrap();
    assert_eq!(room.host_id(), None);
}

#[test]
fn test_host_migrates_to_earliest_joiner() {
    let mut room = room_with(&["first", "second", "third"]);
    assert_eq!(room.host_id(), Some("first"));

    let events = room.remove_player("first").unwrap();
    assert_eq!(room.host_id(), Some("second"));
    match &events.last().unwrap().message {
        ServerMessage::RoomState(snapshot) => {
            assert_eq!(snapshot.host_id.as_deref(), Some("second"));
            assert_eq!(snapshot.players.len(), 2);
        }
        other => panic!("expected room_state, got {:?}", other),
    }
}

#[test]
fn test_room_capacity_limit() {
    let mut room = room_with(&["a", "b", "c", "d"]);
    assert_eq!(room.join("e", "e"), Err(UnchiError::RoomFull));
    assert_eq!(room.member_count(), 4);
    assert!(room.player("e").is_none());
}

#[test]
fn test_start_requires_everyone_ready() {
    let mut room = room_with(&["a", "b", "c", "d"]);
    ready(&mut room, &["a", "b", "c"]);

    let result = room.start_round("a", RoundSchedule::new(1, 0, 1500));
    assert_eq!(result, Err(UnchiError::NotReady));
    assert_eq!(result.unwrap_err().code(), "not_ready");
    assert_eq!(room.status(), RoomStatus::Lobby);
    assert!(room.round().is_none());
}

#[test]
fn test_start_round_privileges_and_status() {
    let mut room = room_with(&["a", "b"]);
    ready(&mut room, &["a", "b"]);

    assert_eq!(
        room.start_round("b", RoundSchedule::new(1, 0, 1500)).unwrap_err().code(),
        "not_host"
    );
    room.start_round("a", RoundSchedule::new(1, 0, 1500)).unwrap();
    assert_eq!(
        room.start_round("a", RoundSchedule::new(2, 0, 1500)),
        Err(UnchiError::RoundInProgress)
    );
    assert_eq!(room.round().map(|r| r.seed), Some(1));
}

#[test]
fn test_two_player_round_ends_on_first_death() {
    let mut room = playing(&["a", "b"]);
    assert_eq!(room.status(), RoomStatus::Playing);

    let events = room.mark_dead("b", 5_000).unwrap();
    let kinds: Vec<&str> = events.iter().map(|e| e.message.kind()).collect();
    assert_eq!(kinds, vec!["player_dead", "round_end", "room_state"]);

    match &events[1].message {
        ServerMessage::RoundEnd { winner_id, ranks } => {
            assert_eq!(winner_id.as_deref(), Some("a"));
            assert_eq!(ranks[0].id, "a");
            assert_eq!(ranks[0].rank, 1);
            assert_eq!(ranks[1].id, "b");
            assert_eq!(ranks[1].rank, 2);
        }
        other => panic!("expected round_end, got {:?}", other),
    }

    assert_eq!(room.status(), RoomStatus::Lobby);
    assert!(room.round().is_none());
    assert!(room.players().iter().all(|p| !p.ready && p.alive));
}

#[test]
fn test_death_order_ranking() {
    let mut room = playing(&["a", "b", "c", "d"]);
    room.mark_dead("c", 100).unwrap();
    room.mark_dead("a", 200).unwrap();
    let events = room.mark_dead("d", 300).unwrap();

    match &events[1].message {
        ServerMessage::RoundEnd { winner_id, ranks } => {
            assert_eq!(winner_id.as_deref(), Some("b"));
            let order: Vec<&str> = ranks.iter().map(|r| r.id.as_str()).collect();
            // Survivor first, then earliest death first
            assert_eq!(order, vec!["b", "c", "a", "d"]);
        }
        other => panic!("expected round_end, got {:?}", other),
    }
}

#[test]
fn test_non_host_cannot_change_options() {
    let mut room = room_with(&["host", "guest"]);
    let patch = OptionsPatch {
        difficulty: Some(Difficulty::Hard),
        player_collision: Some(true),
    };

    assert_eq!(
        room.set_options("guest", patch),
        Err(UnchiError::NotHost(unchi_party::error::HostAction::ChangeOptions))
    );
    assert_eq!(room.options().difficulty, Difficulty::Normal);
    assert!(!room.options().player_collision);

    room.set_options("host", patch).unwrap();
    assert_eq!(room.options().difficulty, Difficulty::Hard);
    assert!(room.options().player_collision);

    // Partial patches merge
    room.set_options("host", OptionsPatch { difficulty: Some(Difficulty::Easy), player_collision: None })
        .unwrap();
    assert_eq!(room.options().difficulty, Difficulty::Easy);
    assert!(room.options().player_collision);
}

#[test]
fn test_options_locked_during_round() {
    let mut room = playing(&["host", "guest"]);
    let patch = OptionsPatch { difficulty: Some(Difficulty::Hard), player_collision: None };
    assert_eq!(room.set_options("host", patch), Err(UnchiError::RoundInProgress));
    // Host check comes first
    assert_eq!(room.set_options("guest", patch).unwrap_err().code(), "not_host");
}

#[test]
fn test_unknown_player_is_reported() {
    let mut room = room_with(&["a"]);
    assert_eq!(room.set_ready("ghost", true), Err(UnchiError::PlayerNotFound));
    assert_eq!(room.mark_dead("ghost", 1), Err(UnchiError::PlayerNotFound));
    assert_eq!(
        room.start_round("ghost", RoundSchedule::new(1, 0, 1500)),
        Err(UnchiError::PlayerNotFound)
    );
}

#[test]
fn test_disconnect_of_alive_player_counts_as_death() {
    let mut room = playing(&["a", "b", "c"]);
    let events = room.remove_player("b").unwrap();
    let kinds: Vec<&str> = events.iter().map(|e| e.message.kind()).collect();
    // Two still alive, so the round continues
    assert_eq!(kinds, vec!["player_dead", "room_state"]);
    assert_eq!(room.status(), RoomStatus::Playing);

    room.mark_dead("c", 10).unwrap();
    assert_eq!(room.status(), RoomStatus::Lobby);
}

#[test]
fn test_disconnect_of_dead_player_does_not_reannounce() {
    let mut room = playing(&["a", "b", "c"]);
    room.mark_dead("c", 10).unwrap();
    let events = room.remove_player("c").unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message.kind(), "room_state");
    assert_eq!(events[0].target, Target::All);
}

#[test]
fn test_position_relay_goes_to_peers_only() {
    let mut room = playing(&["a", "b", "c"]);
    let events = room.update_position("b", Some(-500.0), 42).unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].reaches("a"));
    assert!(events[0].reaches("c"));
    assert!(!events[0].reaches("b"));
    assert_eq!(room.player("b").map(|p| p.x), Some(21.0));
}

#[test]
fn test_relayed_positions_use_wall_bounds() {
    let mut room = playing(&["a", "b"]);
    for (sent, expected) in [(25.0, 25.0), (455.0, 455.0), (0.0, 21.0), (1000.0, 459.0)] {
        let events = room.update_position("b", Some(sent), 1).unwrap();
        match &events[0].message {
            ServerMessage::Positions { positions } => assert_eq!(positions[0].x, expected),
            other => panic!("expected positions, got {:?}", other),
        }
    }
}
