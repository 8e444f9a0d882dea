#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Protocol serialization tests for the Game Sync Client.
//!
//! Verifies the wire shape of every `ClientMessage` and decodes JSON fixtures
//! that match what the game server actually sends.

use game_sync_client::codec;
use game_sync_client::protocol::{ClientMessage, Player, Position, ServerMessage};
use game_sync_client::SyncError;

// ════════════════════════════════════════════════════════════════════
// Helper
// ════════════════════════════════════════════════════════════════════

fn encode_value(msg: &ClientMessage) -> serde_json::Value {
    let json = codec::encode(msg).expect("encode");
    serde_json::from_str(&json).expect("encoded frame is JSON")
}

// ════════════════════════════════════════════════════════════════════
// ClientMessage wire shape
// ════════════════════════════════════════════════════════════════════

#[test]
fn join_wire_shape() {
    let msg = ClientMessage::Join {
        player_name: "Ann".into(),
    };
    assert_eq!(
        codec::encode(&msg).unwrap(),
        r#"{"type":"join","player_name":"Ann"}"#
    );
}

#[test]
fn player_move_wire_shape() {
    let msg = ClientMessage::PlayerMove {
        position: Position::new(10.0, 1.0, -3.5),
    };
    assert_eq!(
        encode_value(&msg),
        serde_json::json!({
            "type": "player_move",
            "position": { "x": 10.0, "y": 1.0, "z": -3.5 }
        })
    );
}

#[test]
fn chat_message_wire_shape() {
    let msg = ClientMessage::ChatMessage {
        message: "gg \"all\"".into(),
    };
    assert_eq!(
        encode_value(&msg),
        serde_json::json!({ "type": "chat_message", "message": "gg \"all\"" })
    );
}

#[test]
fn client_message_kinds_match_wire_tags() {
    let messages = [
        ClientMessage::Join {
            player_name: "a".into(),
        },
        ClientMessage::PlayerMove {
            position: Position::default(),
        },
        ClientMessage::ChatMessage {
            message: "b".into(),
        },
    ];
    for msg in &messages {
        assert_eq!(encode_value(msg)["type"], msg.kind());
    }
}

// ════════════════════════════════════════════════════════════════════
// ServerMessage fixtures
// ════════════════════════════════════════════════════════════════════

const BOB_ID: &str = "5f0c6a8e-3b1d-4c2e-9f4a-0d2b7c9e1a33";

fn bob() -> Player {
    Player {
        id: BOB_ID.into(),
        name: "Bob".into(),
        position: Position::new(0.0, 1.0, 0.0),
        level: 1,
        health: 100,
        max_health: 100,
    }
}

#[test]
fn decode_player_joined_fixture() {
    let json = r#"{
        "type": "player_joined",
        "player": {
            "id": "5f0c6a8e-3b1d-4c2e-9f4a-0d2b7c9e1a33",
            "name": "Bob",
            "position": { "x": 0.0, "y": 1.0, "z": 0.0 },
            "level": 1,
            "health": 100,
            "max_health": 100
        }
    }"#;
    assert_eq!(
        codec::decode(json).unwrap(),
        ServerMessage::PlayerJoined { player: bob() }
    );
}

#[test]
fn decode_player_left_fixture() {
    let json = format!(r#"{{"type":"player_left","player_id":"{BOB_ID}"}}"#);
    assert_eq!(
        codec::decode(&json).unwrap(),
        ServerMessage::PlayerLeft {
            player_id: BOB_ID.into()
        }
    );
}

#[test]
fn decode_player_moved_fixture() {
    let json = format!(
        r#"{{"type":"player_moved","player_id":"{BOB_ID}","position":{{"x":2.5,"y":1,"z":-4}}}}"#
    );
    assert_eq!(
        codec::decode(&json).unwrap(),
        ServerMessage::PlayerMoved {
            player_id: BOB_ID.into(),
            position: Position::new(2.5, 1.0, -4.0),
        }
    );
}

#[test]
fn decode_chat_message_fixture() {
    let json = r#"{"type":"chat_message","player_name":"Bob","message":"hello"}"#;
    assert_eq!(
        codec::decode(json).unwrap(),
        ServerMessage::ChatMessage {
            player_name: "Bob".into(),
            message: "hello".into(),
        }
    );
}

#[test]
fn decode_game_state_fixture() {
    let json = format!(
        r#"{{
            "type": "game_state",
            "players": {{
                "{BOB_ID}": {{
                    "id": "{BOB_ID}",
                    "name": "Bob",
                    "position": {{ "x": 0.0, "y": 1.0, "z": 0.0 }},
                    "level": 1,
                    "health": 100,
                    "max_health": 100
                }}
            }}
        }}"#
    );
    match codec::decode(&json).unwrap() {
        ServerMessage::GameState { players } => {
            assert_eq!(players.len(), 1);
            assert_eq!(players.get(BOB_ID), Some(&bob()));
        }
        other => panic!("expected GameState, got {other:?}"),
    }
}

#[test]
fn decode_empty_game_state() {
    let msg = codec::decode(r#"{"type":"game_state","players":{}}"#).unwrap();
    assert_eq!(
        msg,
        ServerMessage::GameState {
            players: Default::default()
        }
    );
}

#[test]
fn decode_ignores_unknown_fields() {
    let json = r#"{"type":"chat_message","player_name":"Bob","message":"hi","ts":1712000000}"#;
    assert!(matches!(
        codec::decode(json).unwrap(),
        ServerMessage::ChatMessage { .. }
    ));
}

#[test]
fn decode_rejects_negative_health() {
    let json = r#"{
        "type": "player_joined",
        "player": {
            "id": "x", "name": "X",
            "position": { "x": 0, "y": 0, "z": 0 },
            "level": 1, "health": -5, "max_health": 100
        }
    }"#;
    assert!(matches!(
        codec::decode(json),
        Err(SyncError::MalformedMessage(_))
    ));
}

#[test]
fn decode_rejects_client_only_messages() {
    for json in [
        r#"{"type":"join","player_name":"Ann"}"#,
        r#"{"type":"player_move","position":{"x":0,"y":0,"z":0}}"#,
    ] {
        assert!(
            matches!(codec::decode(json), Err(SyncError::MalformedMessage(_))),
            "should reject {json}"
        );
    }
}
